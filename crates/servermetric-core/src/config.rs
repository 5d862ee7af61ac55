//! 클라이언트 설정 구조체.
//!
//! 서버 URL, API 키, 등록 이름, 푸시 주기 등 런타임 설정을 정의한다.
//! [`crate::config_manager::ConfigManager`]를 통해 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 클라이언트 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Servermetric 서버 기본 URL (예: "http://localhost:8080")
    pub server_url: String,
    /// API 키
    #[serde(default)]
    pub key: String,
    /// 서버에 등록할 이름
    pub name: String,
    /// 서버에 보고할 호스트명
    #[serde(default)]
    pub host: String,
    /// 메트릭 푸시 주기 (밀리초)
    #[serde(default = "default_push_interval_ms")]
    pub push_interval_ms: u64,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_push_interval_ms() -> u64 {
    10_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

/// 밀리초 단위로 올림 (0이 아닌 값은 최소 1ms, 상한은 `u64::MAX`)
fn ceil_millis(duration: Duration) -> u64 {
    let partial = u128::from(duration.subsec_nanos() % 1_000_000 != 0);
    u64::try_from(duration.as_millis() + partial).unwrap_or(u64::MAX)
}

impl ClientConfig {
    /// 필수 값으로 설정 생성 (타임아웃은 기본값)
    ///
    /// 푸시 주기는 밀리초 단위로 저장되며 1ms 미만의 나머지는 올림한다.
    pub fn new(
        server_url: impl Into<String>,
        key: impl Into<String>,
        name: impl Into<String>,
        host: impl Into<String>,
        push_interval: Duration,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            key: key.into(),
            name: name.into(),
            host: host.into(),
            push_interval_ms: ceil_millis(push_interval),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            key: String::new(),
            name: "servermetric-agent".to_string(),
            host: String::new(),
            push_interval_ms: default_push_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    /// 푸시 주기
    pub fn push_interval(&self) -> Duration {
        Duration::from_millis(self.push_interval_ms)
    }

    /// 요청 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.server_url.trim().is_empty() {
            return Err(CoreError::Config("server_url이 비어 있음".to_string()));
        }
        if self.key.is_empty() {
            return Err(CoreError::Config("key가 비어 있음".to_string()));
        }
        if self.name.is_empty() {
            return Err(CoreError::Config("name이 비어 있음".to_string()));
        }
        if self.push_interval_ms == 0 {
            return Err(CoreError::Config(
                "push_interval_ms는 0보다 커야 함".to_string(),
            ));
        }
        Ok(())
    }
}
