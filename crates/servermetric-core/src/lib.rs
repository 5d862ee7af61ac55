//! # servermetric-core
//!
//! Servermetric 클라이언트 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 네트워크 어댑터와 에이전트 바이너리가 공유하는 핵심 타입을 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 세션, 메트릭 버퍼, 푸시 이벤트, API 요청/응답 구조체
//! - [`ports`] — 전송 계층 포트 인터페이스 (async_trait)
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 클라이언트 설정 구조체
//! - [`config_manager`] — 설정 파일 관리 (로드/저장)

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;

#[cfg(test)]
mod tests {
    use crate::models::api::PushMetricsRequest;
    use crate::models::metric::MetricBuffer;

    #[test]
    fn push_request_wire_shape() {
        let mut buffer = MetricBuffer::default();
        buffer.append("cpu", vec![serde_json::json!(42)]);
        buffer.append_typed(
            "mem",
            "used,total",
            "uint64, uint64",
            vec![serde_json::json!(1), serde_json::json!(2)],
        );

        let request = PushMetricsRequest {
            server_id: 7,
            name: "web-1",
            metrics: &buffer,
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["serverId"], 7);
        assert_eq!(value["name"], "web-1");
        assert_eq!(value["metrics"]["cpu"]["data"], serde_json::json!([[42]]));
        assert_eq!(value["metrics"]["cpu"]["types"], serde_json::json!([]));
        assert_eq!(value["metrics"]["mem"]["fields"], "used,total");
        assert_eq!(
            value["metrics"]["mem"]["types"],
            serde_json::json!(["uint64", "uint64"])
        );
    }

    #[test]
    fn config_defaults() {
        let config = crate::config::ClientConfig::default_config();
        assert_eq!(config.push_interval_ms, 10_000);
        assert_eq!(config.request_timeout_ms, 30_000);
        assert!(config.validate().is_err()); // 키가 비어 있음
    }
}
