//! 클라이언트 통합 테스트.
//!
//! mockito 서버를 상대로 생성 → 메트릭 추가 → 푸시 → 종료 흐름을 검증한다.

use assert_matches::assert_matches;
use async_trait::async_trait;
use mockito::{Matcher, Mock, ServerGuard};
use servermetric_core::config::ClientConfig;
use servermetric_core::error::CoreError;
use servermetric_core::models::event::PushEvent;
use servermetric_core::ports::transport::{MetricTransport, TransportResponse};
use servermetric_network::client::{PusherState, ServerMetricClient};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn config(server: &ServerGuard, interval: Duration) -> ClientConfig {
    ClientConfig::new(server.url(), "test-key", "web-1", "10.0.0.1", interval)
}

fn key(value: &str) -> Matcher {
    Matcher::UrlEncoded("key".to_string(), value.to_string())
}

/// ping + connect 성공 mock
async fn healthy_service(server: &mut ServerGuard, id: i64) -> (Mock, Mock) {
    let ping = server
        .mock("GET", "/api/ping")
        .match_query(key("test-key"))
        .with_status(200)
        .create_async()
        .await;
    let connect = server
        .mock("POST", "/api/connect")
        .match_query(key("test-key"))
        .match_header("content-type", "application/json; charset=utf-8")
        .match_body(Matcher::Json(json!({"name": "web-1", "host": "10.0.0.1"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"status":"ok","id":{id}}}"#))
        .create_async()
        .await;
    (ping, connect)
}

#[tokio::test]
async fn construct_push_and_reject_bad_key() {
    let mut server = mockito::Server::new_async().await;
    let (ping, connect) = healthy_service(&mut server, 42).await;

    let client = ServerMetricClient::open(config(&server, Duration::from_secs(60)))
        .await
        .unwrap();
    assert_eq!(client.server_id().await, Some(42));
    ping.assert_async().await;
    connect.assert_async().await;

    // 정상 푸시 → 버퍼 비워짐
    client.append_metric("cpu", vec![json!(42)]).await;
    let ok_push = server
        .mock("POST", "/api/metric")
        .match_query(key("test-key"))
        .match_body(Matcher::PartialJson(json!({
            "serverId": 42,
            "name": "web-1",
            "metrics": {"cpu": {"data": [[42]]}}
        })))
        .with_status(200)
        .create_async()
        .await;

    client.push_metrics().await.unwrap();
    assert!(client.is_buffer_empty().await);
    ok_push.assert_async().await;
    ok_push.remove_async().await;

    // 403 → BadKey, 버퍼 유지
    client.append_metric("cpu", vec![json!(43)]).await;
    let forbidden = server
        .mock("POST", "/api/metric")
        .match_query(key("test-key"))
        .with_status(403)
        .create_async()
        .await;

    assert_matches!(client.push_metrics().await, Err(CoreError::BadKey));
    assert_eq!(
        client.series("cpu").await.unwrap().data,
        vec![vec![json!(43)]]
    );
    forbidden.assert_async().await;
}

#[tokio::test]
async fn construction_fails_when_ping_rejected() {
    let mut server = mockito::Server::new_async().await;
    let ping = server
        .mock("GET", "/api/ping")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;
    let connect = server
        .mock("POST", "/api/connect")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let result = ServerMetricClient::open(config(&server, Duration::from_secs(60))).await;

    assert_matches!(result, Err(CoreError::BadKey));
    ping.assert_async().await;
    connect.assert_async().await;
}

#[tokio::test]
async fn construction_fails_on_unexpected_connect_status() {
    let mut server = mockito::Server::new_async().await;
    let _ping = server
        .mock("GET", "/api/ping")
        .match_query(Matcher::Any)
        .with_status(200)
        .create_async()
        .await;
    let _connect = server
        .mock("POST", "/api/connect")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let result = ServerMetricClient::open(config(&server, Duration::from_secs(60))).await;
    assert_matches!(
        result,
        Err(CoreError::UnexpectedStatus {
            status: 500,
            message: None
        })
    );
}

#[tokio::test]
async fn connect_twice_keeps_first_session() {
    let mut server = mockito::Server::new_async().await;
    let (_ping, connect) = healthy_service(&mut server, 7).await;

    let client = ServerMetricClient::open(config(&server, Duration::from_secs(60)))
        .await
        .unwrap();

    assert_matches!(client.connect().await, Err(CoreError::AlreadyConnected));
    assert_eq!(client.server_id().await, Some(7));
    // 두 번째 호출은 서버에 도달하지 않음
    connect.assert_async().await;
}

#[tokio::test]
async fn disconnect_then_disconnect_again() {
    let mut server = mockito::Server::new_async().await;
    let _service = healthy_service(&mut server, 7).await;
    let disconnect = server
        .mock("GET", "/api/disconnect")
        .match_query(Matcher::AllOf(vec![
            key("test-key"),
            Matcher::UrlEncoded("id".to_string(), "7".to_string()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let client = ServerMetricClient::open(config(&server, Duration::from_secs(60)))
        .await
        .unwrap();

    client.disconnect().await.unwrap();
    assert!(!client.is_connected().await);
    assert_matches!(client.disconnect().await, Err(CoreError::NotConnected));
    disconnect.assert_async().await;

    // 연결 해제 후 푸시는 요청 없이 실패
    client.append_metric("cpu", vec![json!(1)]).await;
    assert_matches!(client.push_metrics().await, Err(CoreError::NotConnected));
    assert_eq!(client.buffered_samples().await, 1);
}

#[tokio::test]
async fn update_key_rejected_keeps_old_key() {
    let mut server = mockito::Server::new_async().await;
    let ping_old = server
        .mock("GET", "/api/ping")
        .match_query(key("test-key"))
        .with_status(200)
        .expect(2)
        .create_async()
        .await;
    let _connect = server
        .mock("POST", "/api/connect")
        .match_query(key("test-key"))
        .with_status(200)
        .with_body(r#"{"status":"ok","id":7}"#)
        .create_async()
        .await;
    let ping_new = server
        .mock("GET", "/api/ping")
        .match_query(key("rotated"))
        .with_status(403)
        .create_async()
        .await;

    let client = ServerMetricClient::open(config(&server, Duration::from_secs(60)))
        .await
        .unwrap();

    assert_matches!(client.update_key("rotated").await, Err(CoreError::BadKey));
    // 기존 키는 계속 동작
    client.ping().await.unwrap();

    ping_new.assert_async().await;
    ping_old.assert_async().await;
}

#[tokio::test]
async fn pusher_reports_events_and_terminates() {
    let mut server = mockito::Server::new_async().await;
    let _service = healthy_service(&mut server, 9).await;
    let metric = server
        .mock("POST", "/api/metric")
        .match_query(key("test-key"))
        .with_status(200)
        .expect_at_least(1)
        .create_async()
        .await;
    let disconnect = server
        .mock("GET", "/api/disconnect")
        .match_query(Matcher::Any)
        .with_status(200)
        .create_async()
        .await;

    let client = Arc::new(
        ServerMetricClient::open(config(&server, Duration::from_millis(100)))
            .await
            .unwrap(),
    );
    client
        .append_typed_metric("system", "cpu,mem", "float64, uint64", vec![json!(0.5), json!(1024)])
        .await;

    let (tx, mut rx) = mpsc::unbounded_channel::<PushEvent>();
    let handle = client.spawn_pusher(Some(Box::new(move |ev| {
        let _ = tx.send(ev);
    })));

    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(first.is_success());
    assert!(!first.terminal);
    assert!(client.is_buffer_empty().await);

    client.stop();
    handle.await.unwrap().unwrap();

    let mut terminal = None;
    while let Some(ev) = rx.recv().await {
        if ev.terminal {
            terminal = Some(ev);
        }
    }
    let terminal = terminal.unwrap();
    assert_matches!(terminal.error, Some(CoreError::Cancelled));
    assert_eq!(client.pusher_state(), PusherState::Terminated);
    assert!(!client.is_connected().await);

    metric.assert_async().await;
    disconnect.assert_async().await;
}

/// 첫 호출은 전송 실패, 이후는 스크립트대로 응답하는 전송 계층
struct FlakyTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl MetricTransport for FlakyTransport {
    async fn get(&self, _url: &str) -> Result<TransportResponse, CoreError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n == 1 {
            Err(CoreError::Network("connection refused".to_string()))
        } else {
            Ok(TransportResponse::new(200, ""))
        }
    }

    async fn post_json(&self, _url: &str, _body: &[u8]) -> Result<TransportResponse, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TransportResponse::new(200, r#"{"status":"ok","id":1}"#))
    }
}

#[tokio::test(start_paused = true)]
async fn single_retry_on_transport_failure() {
    let transport = Arc::new(FlakyTransport {
        calls: AtomicUsize::new(0),
    });
    let config = ClientConfig::new(
        "http://unused.local",
        "k",
        "web-1",
        "h",
        Duration::from_secs(60),
    );

    let client = ServerMetricClient::builder(config)
        .transport(transport.clone())
        .open()
        .await
        .unwrap();

    // ping 2회 (실패 + 재시도) + connect 1회
    assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    assert_eq!(client.server_id().await, Some(1));
}
