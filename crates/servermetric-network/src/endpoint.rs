//! Servermetric API 경로와 응답 상태 매핑.
//!
//! 모든 요청은 `기본 URL + 경로 + ?key=<키>` 형태이며,
//! 연결 해제만 `&id=<서버 ID>`가 추가된다.

use servermetric_core::error::CoreError;
use servermetric_core::models::api::ErrorBody;
use servermetric_core::ports::transport::TransportResponse;
use tracing::debug;

/// 헬스 체크
pub const PING_PATH: &str = "/api/ping";
/// 메트릭 푸시
pub const METRIC_PATH: &str = "/api/metric";
/// 서버 등록
pub const CONNECT_PATH: &str = "/api/connect";
/// 등록 해제
pub const DISCONNECT_PATH: &str = "/api/disconnect";

/// API URL 빌더
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
}

impl Endpoint {
    /// 기본 URL로 생성 (끝의 `/` 제거)
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 기본 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `base + path + ?key=<key>`
    pub fn url(&self, path: &str, key: &str) -> String {
        format!("{}{}?key={}", self.base_url, path, encode(key))
    }

    pub fn ping(&self, key: &str) -> String {
        self.url(PING_PATH, key)
    }

    pub fn connect(&self, key: &str) -> String {
        self.url(CONNECT_PATH, key)
    }

    pub fn metric(&self, key: &str) -> String {
        self.url(METRIC_PATH, key)
    }

    pub fn disconnect(&self, key: &str, server_id: i64) -> String {
        format!("{}&id={}", self.url(DISCONNECT_PATH, key), server_id)
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// 응답 상태 확인 및 에러 매핑
///
/// 403 → [`CoreError::BadKey`], 200 이외 → [`CoreError::UnexpectedStatus`]
pub fn check_status(resp: TransportResponse) -> Result<TransportResponse, CoreError> {
    match resp.status {
        200 => Ok(resp),
        403 => Err(CoreError::BadKey),
        status => Err(CoreError::UnexpectedStatus {
            status,
            message: None,
        }),
    }
}

/// [`check_status`]에 더해 본문의 `{"msg": ...}`를 에러 메시지로 붙인다.
pub fn check_status_with_message(resp: TransportResponse) -> Result<TransportResponse, CoreError> {
    match resp.status {
        200 => Ok(resp),
        403 => Err(CoreError::BadKey),
        status => {
            let message = match serde_json::from_slice::<ErrorBody>(&resp.body) {
                Ok(body) => Some(body.msg),
                Err(e) => {
                    debug!("에러 본문 해석 실패 (status {status}): {e}");
                    None
                }
            };
            Err(CoreError::UnexpectedStatus { status, message })
        }
    }
}
