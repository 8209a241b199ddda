use super::create_authenticated_client;
use crate::ProxmoxError;
use reqwest::StatusCode;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

#[tokio::test]
async fn test_nodes_list_success() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {
                    "node": "pve1",
                    "status": "online",
                    "cpu": 0.15,
                    "maxcpu": 8,
                    "mem": 8589934592_i64,
                    "maxmem": 17179869184_i64,
                    "uptime": 1234567,
                    "id": "node/pve1",
                    "ssl_fingerprint": "AA:BB:CC:DD:EE:FF"
                },
                {
                    "node": "pve2",
                    "status": "offline",
                    "id": "node/pve2"
                }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let nodes = client.nodes().await.unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].node, "pve1");
    assert!(nodes[0].is_online());
    assert_eq!(nodes[0].maxcpu, Some(8));
    assert!(!nodes[1].is_online());
    assert_eq!(nodes[1].cpu, None);
}

#[tokio::test]
async fn test_node_status_success() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/pve1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "cpu": 0.05,
                "wait": 0.001,
                "uptime": 86400,
                "loadavg": ["0.15", "0.20", "0.18"],
                "kversion": "Linux 6.8.12-4-pve",
                "pveversion": "pve-manager/8.3.0/c1689ccb1065a83b",
                "memory": { "total": 16000000000_u64, "used": 4000000000_u64, "free": 12000000000_u64 },
                "swap": { "total": 0, "used": 0, "free": 0 },
                "cpuinfo": { "model": "AMD EPYC 7302P", "cpus": 32, "sockets": 1 }
            }
        })))
        .mount(&mock_server)
        .await;

    let status = client.node_status("pve1").await.unwrap();
    assert_eq!(status.uptime, 86400);
    assert_eq!(status.loadavg.len(), 3);
    assert!((status.memory.usage() - 0.25).abs() < f64::EPSILON);
    assert_eq!(status.swap.as_ref().map(|s| s.usage()), Some(0.0));

    let cpuinfo = status.cpuinfo.unwrap();
    let keys: Vec<&str> = cpuinfo.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["model", "cpus", "sockets"]);
}

#[tokio::test]
async fn test_node_status_rejects_blank_node_locally() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    for node in ["", "   ", "pve1/status"] {
        let result = client.node_status(node).await;
        assert!(matches!(result, Err(ProxmoxError::Validation { .. })));
    }
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_nodes_permission_denied() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes"))
        .respond_with(
            ResponseTemplate::new(403).set_body_string("Permission check failed (/, Sys.Audit)"),
        )
        .mount(&mock_server)
        .await;

    match client.nodes().await {
        Err(ProxmoxError::Api { status, body }) => {
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body, "Permission check failed (/, Sys.Audit)");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}
