//! 단일 재시도 정책.
//!
//! 전송 계층 에러일 때만 1초 쉬고 한 번 더 시도한다. 상태 코드 에러는 재시도하지 않는다.

use servermetric_core::error::CoreError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// 재시도 전 대기 시간
pub(crate) const RETRY_DELAY: Duration = Duration::from_secs(1);

/// 전송 실패 시 한 번만 재시도하며 요청 실행
pub(crate) async fn with_single_retry<F, Fut, T>(label: &str, operation: F) -> Result<T, CoreError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    match operation().await {
        Err(e) if e.is_transport() => {
            warn!("{label} 실패: {e}, {RETRY_DELAY:?} 후 재시도");
            tokio::time::sleep(RETRY_DELAY).await;
            operation().await
        }
        result => result,
    }
}
