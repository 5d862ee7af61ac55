//! 단위 테스트용 스크립트 전송 계층.

use async_trait::async_trait;
use parking_lot::Mutex;
use servermetric_core::error::CoreError;
use servermetric_core::ports::transport::{MetricTransport, TransportResponse};
use std::collections::VecDeque;

/// 기록된 요청
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: Vec<u8>,
}

/// 미리 정해 둔 응답을 순서대로 돌려주는 전송 계층
///
/// 스크립트가 바닥나면 200 빈 응답을 돌려준다.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse, CoreError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_status(self, status: u16, body: &str) -> Self {
        self.script
            .lock()
            .push_back(Ok(TransportResponse::new(status, body)));
        self
    }

    pub fn then_network_error(self) -> Self {
        self.script
            .lock()
            .push_back(Err(CoreError::Network("connection reset".to_string())));
        self
    }

    pub fn push_status(&self, status: u16, body: &str) {
        self.script
            .lock()
            .push_back(Ok(TransportResponse::new(status, body)));
    }

    pub fn push_network_error(&self) {
        self.script
            .lock()
            .push_back(Err(CoreError::Network("connection reset".to_string())));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn next(&self, method: &'static str, url: &str, body: &[u8]) -> Result<TransportResponse, CoreError> {
        self.calls.lock().push(RecordedCall {
            method,
            url: url.to_string(),
            body: body.to_vec(),
        });
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(TransportResponse::new(200, "")))
    }
}

#[async_trait]
impl MetricTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, CoreError> {
        self.next("GET", url, &[])
    }

    async fn post_json(&self, url: &str, body: &[u8]) -> Result<TransportResponse, CoreError> {
        self.next("POST", url, body)
    }
}
