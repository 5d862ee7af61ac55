//! 종료 신호.
//!
//! `watch` 채널 기반 취소 신호. 푸셔 루프는 깨어날 때마다 이 신호를 확인한다.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// 종료 신호 송신 측
///
/// 복제본은 같은 채널을 공유한다. 모든 복제본이 사라지면 수신 측은 종료로 간주한다.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// 새 종료 신호 생성
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// 수신기 생성
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// 종료 신호 발송 (여러 번 호출해도 무해)
    pub fn shutdown(&self) {
        if !self.shutdown_tx.send_replace(true) {
            info!("종료 신호 발송");
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// 종료 신호가 올 때까지 대기
///
/// 송신 측이 사라진 경우도 종료로 간주한다.
pub async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stopped| *stopped).await;
}
