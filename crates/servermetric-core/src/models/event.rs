//! 푸시 이벤트 모델.
//!
//! 푸셔 루프가 한 사이클마다 옵저버에게 전달하는 결과.

use std::time::Duration;

use crate::error::CoreError;

/// 푸시 사이클 결과
#[derive(Debug)]
pub struct PushEvent {
    /// 푸시 요청에 걸린 시간 (종료 이벤트는 0)
    pub latency: Duration,
    /// 실패 사유
    pub error: Option<CoreError>,
    /// 루프 종료 이벤트 여부
    pub terminal: bool,
}

impl PushEvent {
    /// 일반 푸시 사이클 이벤트
    pub fn cycle(latency: Duration, result: Result<(), CoreError>) -> Self {
        Self {
            latency,
            error: result.err(),
            terminal: false,
        }
    }

    /// 취소 후 마지막 이벤트
    ///
    /// 연결 해제에 실패했으면 그 에러를, 성공했으면 [`CoreError::Cancelled`]를 담는다.
    pub fn terminal(error: CoreError) -> Self {
        Self {
            latency: Duration::ZERO,
            error: Some(error),
            terminal: true,
        }
    }

    /// 성공한 사이클인지 여부
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// 푸시 이벤트 옵저버
pub type PushObserver = Box<dyn Fn(PushEvent) + Send + Sync>;
