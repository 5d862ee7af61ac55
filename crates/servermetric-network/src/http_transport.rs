//! reqwest 기반 전송 계층.
//!
//! `MetricTransport` 포트 구현. 상태 코드는 해석하지 않고 그대로 돌려준다.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use servermetric_core::error::CoreError;
use servermetric_core::ports::transport::{MetricTransport, TransportResponse};
use std::time::Duration;
use tracing::debug;

/// POST 본문 Content-Type
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// reqwest 전송 계층 — `MetricTransport` 포트 구현
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// 새 HTTP 전송 계층 생성
    pub fn new(timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self { client })
    }

    async fn read(resp: reqwest::Response) -> Result<TransportResponse, CoreError> {
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| CoreError::Network(format!("응답 본문 읽기 실패: {e}")))?;
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl MetricTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, CoreError> {
        debug!("GET {url}");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("GET 요청 실패: {e}")))?;
        Self::read(resp).await
    }

    async fn post_json(&self, url: &str, body: &[u8]) -> Result<TransportResponse, CoreError> {
        debug!("POST {url} ({} bytes)", body.len());
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("POST 요청 실패: {e}")))?;
        Self::read(resp).await
    }
}
