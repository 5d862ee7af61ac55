//! 메트릭 버퍼와 주기 푸셔.
//!
//! 버퍼는 하나의 `RwLock` 뒤에 있다. 추가와 푸시 모두 쓰기 잠금을 잡으며,
//! 푸시는 직렬화-전송-비우기 전체 구간 동안 잠금을 유지한다.
//! 푸시가 실패하면 버퍼는 손대지 않고 다음 사이클에 다시 보낸다.

use servermetric_core::error::CoreError;
use servermetric_core::models::api::PushMetricsRequest;
use servermetric_core::models::event::{PushEvent, PushObserver};
use servermetric_core::models::metric::{MetricBuffer, MetricSeries, Sample};
use servermetric_core::ports::transport::MetricTransport;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::connection::ConnectionManager;
use crate::endpoint::{check_status_with_message, Endpoint};
use crate::lifecycle::wait_for_shutdown;
use crate::retry::with_single_retry;

/// 메트릭 푸셔
pub struct MetricPusher {
    transport: Arc<dyn MetricTransport>,
    endpoint: Endpoint,
    connection: Arc<ConnectionManager>,
    buffer: RwLock<MetricBuffer>,
}

impl MetricPusher {
    /// 빈 버퍼로 푸셔 생성
    pub fn new(
        transport: Arc<dyn MetricTransport>,
        endpoint: Endpoint,
        connection: Arc<ConnectionManager>,
    ) -> Self {
        Self {
            transport,
            endpoint,
            connection,
            buffer: RwLock::new(MetricBuffer::default()),
        }
    }

    /// 메타데이터 없는 샘플 추가
    pub async fn append_metric(&self, name: &str, sample: Sample) {
        self.buffer.write().await.append(name, sample);
    }

    /// 필드/타입 메타데이터와 함께 샘플 추가
    ///
    /// `types`는 쉼표 구분 문자열이며 공백은 무시된다 (예: `"int64, float64"`).
    pub async fn append_typed_metric(&self, name: &str, fields: &str, types: &str, sample: Sample) {
        self.buffer
            .write()
            .await
            .append_typed(name, fields, types, sample);
    }

    /// 버퍼 비우기
    pub async fn clear_metrics(&self) {
        self.buffer.write().await.clear();
    }

    /// 버퍼가 비었는지 여부
    pub async fn is_empty(&self) -> bool {
        self.buffer.read().await.is_empty()
    }

    /// 버퍼에 있는 메트릭 이름 수
    pub async fn metric_count(&self) -> usize {
        self.buffer.read().await.len()
    }

    /// 버퍼에 쌓인 전체 샘플 수
    pub async fn buffered_samples(&self) -> usize {
        self.buffer.read().await.sample_count()
    }

    /// 이름별 시퀀스 복제본
    pub async fn series(&self, name: &str) -> Option<MetricSeries> {
        self.buffer.read().await.series(name).cloned()
    }

    /// 버퍼를 즉시 푸시, 걸린 시간 반환
    ///
    /// 성공하면 버퍼를 빈 버퍼로 교체하고, 실패하면 버퍼를 그대로 둔다.
    pub async fn push_metrics(&self) -> Result<Duration, CoreError> {
        let (latency, result) = self.push_cycle().await;
        result.map(|()| latency)
    }

    /// 한 번의 푸시 사이클 — 실패해도 걸린 시간을 함께 돌려준다.
    async fn push_cycle(&self) -> (Duration, Result<(), CoreError>) {
        let mut buffer = self.buffer.write().await;

        let started = Instant::now();
        let result = self.send(&buffer).await;
        let latency = started.elapsed();

        if result.is_ok() {
            let pushed = buffer.take();
            debug!(
                "메트릭 푸시 성공: {}개 이름, {}개 샘플, {latency:?}",
                pushed.len(),
                pushed.sample_count()
            );
        }
        (latency, result)
    }

    async fn send(&self, buffer: &MetricBuffer) -> Result<(), CoreError> {
        let session = self
            .connection
            .active_session()
            .await
            .ok_or(CoreError::NotConnected)?;

        let body = serde_json::to_vec(&PushMetricsRequest {
            server_id: session.server_id,
            name: self.connection.name(),
            metrics: buffer,
        })?;
        let url = self.endpoint.metric(&session.key);

        let resp = with_single_retry("메트릭 푸시", || self.transport.post_json(&url, &body)).await?;
        check_status_with_message(resp)?;
        Ok(())
    }

    /// 주기 푸셔 루프
    ///
    /// `every`마다 푸시 사이클을 돌고 옵저버에 결과를 알린다.
    /// 종료 신호를 받으면 연결 해제를 시도하고, 종료 이벤트를 한 번 보낸 뒤 반환한다.
    /// 신호는 깨어날 때만 확인하므로 진행 중인 푸시는 끊기지 않는다.
    pub async fn run(
        &self,
        every: Duration,
        mut shutdown: watch::Receiver<bool>,
        observer: Option<&PushObserver>,
    ) {
        let notify = |event: PushEvent| {
            if let Some(observer) = observer {
                observer(event);
            }
        };

        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("메트릭 푸셔 시작: 주기 {every:?}");

        loop {
            tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => {
                    let reason = match self.connection.disconnect().await {
                        Ok(()) => CoreError::Cancelled,
                        Err(e) => {
                            warn!("종료 중 연결 해제 실패: {e}");
                            e
                        }
                    };
                    info!("메트릭 푸셔 종료");
                    notify(PushEvent::terminal(reason));
                    return;
                }
                _ = ticker.tick() => {
                    let (latency, result) = self.push_cycle().await;
                    if let Err(e) = &result {
                        warn!("메트릭 푸시 실패, 다음 주기에 재전송: {e}");
                    }
                    notify(PushEvent::cycle(latency, result));
                }
            }
        }
    }
}
