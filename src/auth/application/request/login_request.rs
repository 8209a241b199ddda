use serde::Serialize;

/// Form body of `POST /access/ticket`.
///
/// The realm is sent separately as well as inside `username`; Proxmox uses
/// the explicit field when the username carries no `@realm` suffix.
#[derive(Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub realm: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .field("realm", &self.realm)
            .finish()
    }
}
