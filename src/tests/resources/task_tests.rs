use super::create_authenticated_client;
use crate::{CancellationToken, ProxmoxError};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{method, path},
};

const UPID: &str = "UPID:pve1:000B5F1E:0254E0A8:66A1B2C3:vzdump:100:root@pam:";

fn status_path() -> String {
    format!("/api2/json/nodes/pve1/tasks/{}/status", UPID)
}

fn task_body(status: &str, exit: Option<&str>) -> serde_json::Value {
    let mut data = json!({
        "upid": UPID,
        "node": "pve1",
        "user": "root@pam",
        "type": "vzdump",
        "id": "100",
        "status": status,
        "starttime": 1721873091,
        "pid": 745246,
        "pstart": 39117992
    });
    if let Some(exit) = exit {
        data["exitstatus"] = json!(exit);
        data["endtime"] = json!(1721873151);
    }
    json!({ "data": data })
}

#[tokio::test]
async fn test_task_status_success() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body("stopped", Some("OK"))))
        .mount(&mock_server)
        .await;

    let status = client.task_status("pve1", UPID).await.unwrap();
    assert_eq!(status.task_type, "vzdump");
    assert_eq!(status.id.as_deref(), Some("100"));
    assert!(status.is_successful());
    assert!(status.end_time.unwrap() > status.start_time.unwrap());
}

#[tokio::test]
async fn test_wait_for_task_polls_until_stopped() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(move |_: &Request| {
            let body = match counter.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => task_body("running", None),
                _ => task_body("stopped", Some("OK")),
            };
            ResponseTemplate::new(200).set_body_json(body)
        })
        .expect(3)
        .mount(&mock_server)
        .await;

    let status = client
        .wait_for_task("pve1", UPID, Duration::from_secs(10), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(status.status, "stopped");
    assert_eq!(status.exit_status.as_deref(), Some("OK"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_wait_for_task_reports_failed_task() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(task_body("stopped", Some("job errors"))),
        )
        .mount(&mock_server)
        .await;

    let status = client
        .wait_for_task("pve1", UPID, Duration::from_secs(10), &CancellationToken::new())
        .await
        .unwrap();
    assert!(!status.is_successful());
    assert_eq!(status.exit_status.as_deref(), Some("job errors"));
}

#[tokio::test]
async fn test_wait_for_task_times_out() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body("running", None)))
        .mount(&mock_server)
        .await;

    let start = Instant::now();
    let result = client
        .wait_for_task("pve1", UPID, Duration::from_millis(300), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(ProxmoxError::Timeout { .. })));
    assert!(start.elapsed() < Duration::from_secs(2));

    let polled = mock_server.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(mock_server.received_requests().await.unwrap().len(), polled);
}

#[tokio::test]
async fn test_wait_for_task_propagates_status_errors() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(status_path()))
        .respond_with(ResponseTemplate::new(500).set_body_string("no such task"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client
        .wait_for_task("pve1", UPID, Duration::from_secs(10), &CancellationToken::new())
        .await;
    match result {
        Err(ProxmoxError::Api { status, body }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "no such task");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wait_for_task_cancelled_before_start() {
    let mock_server = MockServer::start().await;
    let client = create_authenticated_client(&mock_server).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = client
        .wait_for_task("pve1", UPID, Duration::from_secs(10), &cancel)
        .await;
    assert!(matches!(result, Err(ProxmoxError::Cancelled)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
