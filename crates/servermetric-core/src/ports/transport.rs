//! 전송 계층 포트.
//!
//! 구현: `servermetric-network` crate (reqwest)

use async_trait::async_trait;

use crate::error::CoreError;

/// 전송 계층 응답 — 상태 코드와 본문만 노출
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP 상태 코드
    pub status: u16,
    /// 응답 본문
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// 새 응답 생성
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Servermetric 서버와 통신하는 HTTP 전송 계층
///
/// 연결 실패/타임아웃은 [`CoreError::Network`]로 반환한다.
/// 상태 코드 해석과 재시도는 호출자 몫이다.
#[async_trait]
pub trait MetricTransport: Send + Sync {
    /// GET 요청
    async fn get(&self, url: &str) -> Result<TransportResponse, CoreError>;

    /// JSON 본문 POST 요청 (`application/json; charset=utf-8`)
    async fn post_json(&self, url: &str, body: &[u8]) -> Result<TransportResponse, CoreError>;
}
