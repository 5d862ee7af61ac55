//! 세션 모델.
//!
//! 서버에 등록된 식별자(server id)와 인증 키를 묶어 관리한다.

use std::num::NonZeroI64;

/// 클라이언트 세션 상태
///
/// server id는 연결된 동안에만 존재한다 (`NonZeroI64`로 0을 배제).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    key: String,
    server_id: Option<NonZeroI64>,
}

impl Session {
    /// 연결되지 않은 세션 생성
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            server_id: None,
        }
    }

    /// 현재 API 키
    pub fn key(&self) -> &str {
        &self.key
    }

    /// API 키 교체
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// 연결 여부
    pub fn is_connected(&self) -> bool {
        self.server_id.is_some()
    }

    /// 서버가 할당한 ID (연결된 경우)
    pub fn server_id(&self) -> Option<i64> {
        self.server_id.map(NonZeroI64::get)
    }

    /// 연결 성공 기록
    pub fn mark_connected(&mut self, server_id: NonZeroI64) {
        self.server_id = Some(server_id);
    }

    /// 연결 해제 기록
    pub fn mark_disconnected(&mut self) {
        self.server_id = None;
    }
}
