pub mod api_client;
pub mod request_body;
