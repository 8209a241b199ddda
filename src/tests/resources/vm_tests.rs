use super::{CSRF, create_authenticated_client};
use crate::{CreateVmParams, ProxmoxError, VmConfigUpdate};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string, header, method, path},
};

const UPID: &str = "UPID:pve1:0000C530:0020B6AD:64B0F1A3:qmstart:100:root@pam:";

#[tokio::test]
async fn test_vms_list_success() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/qemu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "vmid": 100,
                    "name": "ubuntu-vm",
                    "status": "running",
                    "cpu": 0.23,
                    "cpus": 4,
                    "mem": 4294967296_i64,
                    "maxmem": 8589934592_i64,
                    "uptime": 3600
                },
                {
                    "vmid": 9000,
                    "name": "debian-template",
                    "status": "stopped",
                    "template": 1
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let vms = client.vms("pve1").await.unwrap();
    assert_eq!(vms.len(), 2);
    assert_eq!(vms[0].vmid, 100);
    assert_eq!(vms[0].name.as_deref(), Some("ubuntu-vm"));
    assert!(!vms[0].template);
    assert!(vms[1].template);
}

#[tokio::test]
async fn test_vm_config_keeps_device_keys() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/qemu/100/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "name": "ubuntu-vm",
                "memory": "4096",
                "cores": 2,
                "net0": "virtio=BC:24:11:2A:3B:4C,bridge=vmbr0",
                "scsi0": "local-lvm:vm-100-disk-0,size=32G",
                "digest": "3f1a9c"
            }
        })))
        .mount(&mock_server)
        .await;

    let config = client.vm_config("pve1", 100).await.unwrap();
    assert_eq!(config.cores, Some(2));
    assert_eq!(config.memory, Some(json!("4096")));
    assert_eq!(config.digest.as_deref(), Some("3f1a9c"));
    assert_eq!(
        config.devices.get("net0"),
        Some(&json!("virtio=BC:24:11:2A:3B:4C,bridge=vmbr0"))
    );
    assert!(config.devices.contains_key("scsi0"));
    assert!(!config.devices.contains_key("cores"));
}

#[tokio::test]
async fn test_create_vm_returns_task_handle() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu"))
        .and(header("CSRFPreventionToken", CSRF))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string("vmid=200&name=web-01&memory=2048&cores=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": UPID })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let params = CreateVmParams {
        vmid: 200,
        name: Some("web-01".to_string()),
        memory: Some(2048),
        cores: Some(2),
        ..Default::default()
    };
    let handle = client.create_vm("pve1", &params).await.unwrap();
    assert_eq!(handle.as_str(), UPID);
    assert_eq!(handle.node(), Some("pve1"));
}

#[tokio::test]
async fn test_create_vm_envelope_errors() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/pve1/qemu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": { "memory": "value must have a minimum value of 16" }
        })))
        .mount(&mock_server)
        .await;

    let params = CreateVmParams {
        vmid: 200,
        memory: Some(1),
        ..Default::default()
    };
    match client.create_vm("pve1", &params).await {
        Err(ProxmoxError::Envelope(errors)) => {
            assert_eq!(
                errors.get("memory").map(String::as_str),
                Some("value must have a minimum value of 16")
            );
        }
        other => panic!("expected envelope error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_vm_config_sets_and_deletes() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("PUT"))
        .and(path("/api2/json/nodes/pve1/qemu/100/config"))
        .and(header("CSRFPreventionToken", CSRF))
        .and(body_string("description=&memory=4096&delete=ide2%2Cnet1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let update = VmConfigUpdate::new()
        .description("")
        .memory(4096)
        .unset("ide2")
        .unset("net1");
    client.update_vm_config("pve1", 100, &update).await.unwrap();
}

#[tokio::test]
async fn test_update_vm_config_rejects_empty_update() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    let result = client
        .update_vm_config("pve1", 100, &VmConfigUpdate::new())
        .await;
    assert!(matches!(result, Err(ProxmoxError::Validation { .. })));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_power_actions_hit_status_endpoints() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    for action in ["start", "stop", "shutdown", "reboot"] {
        Mock::given(method("POST"))
            .and(path(format!("/api2/json/nodes/pve1/qemu/100/status/{}", action)))
            .and(header("CSRFPreventionToken", CSRF))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": format!("UPID:pve1:00001234:00ABCDEF:65000000:qm{}:100:root@pam:", action)
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let started = client.start_vm("pve1", 100).await.unwrap();
    assert!(started.as_str().contains(":qmstart:"));
    let stopped = client.stop_vm("pve1", 100).await.unwrap();
    assert!(stopped.as_str().contains(":qmstop:"));
    let shut_down = client.shutdown_vm("pve1", 100).await.unwrap();
    assert!(shut_down.as_str().contains(":qmshutdown:"));
    let rebooted = client.reboot_vm("pve1", 100).await.unwrap();
    assert!(rebooted.as_str().contains(":qmreboot:"));
}

#[tokio::test]
async fn test_vm_helpers_reject_bad_vmid_locally() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    assert!(matches!(
        client.vm_config("pve1", 42).await,
        Err(ProxmoxError::Validation { .. })
    ));
    assert!(matches!(
        client.start_vm("pve1", 0).await,
        Err(ProxmoxError::Validation { .. })
    ));
    assert!(matches!(
        client.create_vm("", &CreateVmParams { vmid: 200, ..Default::default() }).await,
        Err(ProxmoxError::Validation { .. })
    ));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_vm_exists() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/qemu/100/status/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "vmid": 100, "status": "running", "qmpstatus": "running" }
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/qemu/101/status/current"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("Configuration file 'nodes/pve1/qemu-server/101.conf' does not exist"),
        )
        .mount(&mock_server)
        .await;

    assert!(client.vm_exists("pve1", 100).await);
    assert!(!client.vm_exists("pve1", 101).await);
    assert!(!client.vm_exists("pve1", 7).await);
    assert!(!client.vm_exists(" ", 100).await);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}
