//! Servermetric 클라이언트.
//!
//! 연결 관리자와 메트릭 푸셔를 묶는다. 생성 시 ping + connect를 마쳐야 클라이언트가 반환되며,
//! 주기 푸셔는 호출자가 [`ServerMetricClient::run_pusher`] 또는
//! [`ServerMetricClient::spawn_pusher`]로 명시적으로 시작한다.

use parking_lot::Mutex;
use servermetric_core::config::ClientConfig;
use servermetric_core::error::CoreError;
use servermetric_core::models::event::PushObserver;
use servermetric_core::models::metric::{MetricSeries, Sample};
use servermetric_core::ports::transport::MetricTransport;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::connection::ConnectionManager;
use crate::endpoint::Endpoint;
use crate::http_transport::HttpTransport;
use crate::lifecycle::ShutdownSignal;
use crate::pusher::MetricPusher;

/// 푸셔 루프 상태 — 종료 후에는 다시 시작할 수 없다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PusherState {
    /// 아직 시작 전
    Idle,
    /// 실행 중
    Running,
    /// 종료됨
    Terminated,
}

/// 클라이언트 빌더
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn MetricTransport>>,
    shutdown: Option<ShutdownSignal>,
}

impl ClientBuilder {
    /// 전송 계층 지정 (기본: reqwest)
    pub fn transport(mut self, transport: Arc<dyn MetricTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// 외부 종료 신호 공유
    ///
    /// 신호 소유자와 [`ServerMetricClient::stop`] 어느 쪽에서 발송해도 푸셔가 종료된다.
    pub fn shutdown_signal(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// ping + connect 후 클라이언트 반환
    ///
    /// 둘 중 하나라도 실패하면 에러를 그대로 반환하고 클라이언트는 만들어지지 않는다.
    pub async fn open(self) -> Result<ServerMetricClient, CoreError> {
        self.config.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.config.request_timeout())?),
        };
        let shutdown = self.shutdown.unwrap_or_default();

        let endpoint = Endpoint::new(&self.config.server_url);
        let connection = Arc::new(ConnectionManager::new(
            transport.clone(),
            endpoint.clone(),
            &self.config.key,
            &self.config.name,
            &self.config.host,
        ));

        let latency = connection.ping().await?;
        debug!("초기 ping: {latency:?}");
        connection.connect().await?;

        let pusher = MetricPusher::new(transport, endpoint, connection.clone());
        info!(
            "Servermetric 클라이언트 준비 완료: {} (푸시 주기 {:?})",
            self.config.server_url,
            self.config.push_interval()
        );

        Ok(ServerMetricClient {
            push_interval: self.config.push_interval(),
            connection,
            pusher,
            shutdown,
            pusher_state: Mutex::new(PusherState::Idle),
        })
    }
}

/// Servermetric 클라이언트
pub struct ServerMetricClient {
    push_interval: Duration,
    connection: Arc<ConnectionManager>,
    pusher: MetricPusher,
    shutdown: ShutdownSignal,
    pusher_state: Mutex<PusherState>,
}

impl fmt::Debug for ServerMetricClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerMetricClient")
            .field("name", &self.connection.name())
            .field("host", &self.connection.host())
            .field("push_interval", &self.push_interval)
            .field("pusher_state", &*self.pusher_state.lock())
            .finish_non_exhaustive()
    }
}

/// 푸셔 future가 어떤 식으로 끝나든(취소 포함) 상태를 종료로 고정한다.
struct TerminateOnDrop<'a>(&'a Mutex<PusherState>);

impl Drop for TerminateOnDrop<'_> {
    fn drop(&mut self) {
        *self.0.lock() = PusherState::Terminated;
    }
}

impl ServerMetricClient {
    /// 빌더 생성
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder {
            config,
            transport: None,
            shutdown: None,
        }
    }

    /// 기본 전송 계층과 자체 종료 신호로 클라이언트 생성
    pub async fn open(config: ClientConfig) -> Result<Self, CoreError> {
        Self::builder(config).open().await
    }

    /// 외부와 공유하는 종료 신호로 클라이언트 생성
    pub async fn open_with_shutdown(
        config: ClientConfig,
        shutdown: ShutdownSignal,
    ) -> Result<Self, CoreError> {
        Self::builder(config).shutdown_signal(shutdown).open().await
    }

    /// 푸시 주기
    pub fn push_interval(&self) -> Duration {
        self.push_interval
    }

    /// 등록 이름
    pub fn name(&self) -> &str {
        self.connection.name()
    }

    /// 보고 호스트
    pub fn host(&self) -> &str {
        self.connection.host()
    }

    // ----- 메트릭 버퍼 -----

    /// 메타데이터 없는 샘플 추가
    pub async fn append_metric(&self, name: &str, sample: Sample) {
        self.pusher.append_metric(name, sample).await;
    }

    /// 필드/타입 메타데이터와 함께 샘플 추가
    pub async fn append_typed_metric(&self, name: &str, fields: &str, types: &str, sample: Sample) {
        self.pusher
            .append_typed_metric(name, fields, types, sample)
            .await;
    }

    /// 버퍼 즉시 푸시
    pub async fn push_metrics(&self) -> Result<Duration, CoreError> {
        self.pusher.push_metrics().await
    }

    /// 버퍼 비우기
    pub async fn clear_metrics(&self) {
        self.pusher.clear_metrics().await;
    }

    /// 버퍼가 비었는지 여부
    pub async fn is_buffer_empty(&self) -> bool {
        self.pusher.is_empty().await
    }

    /// 버퍼에 있는 메트릭 이름 수
    pub async fn metric_count(&self) -> usize {
        self.pusher.metric_count().await
    }

    /// 버퍼에 쌓인 전체 샘플 수
    pub async fn buffered_samples(&self) -> usize {
        self.pusher.buffered_samples().await
    }

    /// 이름별 시퀀스 복제본
    pub async fn series(&self, name: &str) -> Option<MetricSeries> {
        self.pusher.series(name).await
    }

    // ----- 연결 관리 -----

    /// 현재 키로 헬스 체크
    pub async fn ping(&self) -> Result<Duration, CoreError> {
        self.connection.ping().await
    }

    /// 지정한 키로 헬스 체크 (세션 키는 바꾸지 않음)
    pub async fn ping_with_key(&self, key: &str) -> Result<Duration, CoreError> {
        self.connection.ping_with_key(key).await
    }

    /// 새 키 검증 후 교체
    pub async fn update_key(&self, new_key: &str) -> Result<(), CoreError> {
        self.connection.update_key(new_key).await
    }

    /// 서버 등록
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.connection.connect().await
    }

    /// 서버 등록 해제
    pub async fn disconnect(&self) -> Result<(), CoreError> {
        self.connection.disconnect().await
    }

    /// 연결 여부
    pub async fn is_connected(&self) -> bool {
        self.connection.is_connected().await
    }

    /// 서버가 할당한 ID
    pub async fn server_id(&self) -> Option<i64> {
        self.connection.server_id().await
    }

    // ----- 푸셔 -----

    /// 푸셔 상태
    pub fn pusher_state(&self) -> PusherState {
        *self.pusher_state.lock()
    }

    /// 주기 푸셔 실행 (종료 신호까지 반환하지 않음)
    ///
    /// 이미 실행 중이거나 종료된 뒤라면 [`CoreError::PusherUnavailable`].
    pub async fn run_pusher(&self, observer: Option<PushObserver>) -> Result<(), CoreError> {
        {
            let mut state = self.pusher_state.lock();
            if *state != PusherState::Idle {
                return Err(CoreError::PusherUnavailable);
            }
            *state = PusherState::Running;
        }
        let _terminate = TerminateOnDrop(&self.pusher_state);

        self.pusher
            .run(self.push_interval, self.shutdown.subscribe(), observer.as_ref())
            .await;
        Ok(())
    }

    /// 주기 푸셔를 백그라운드 태스크로 실행
    pub fn spawn_pusher(
        self: &Arc<Self>,
        observer: Option<PushObserver>,
    ) -> JoinHandle<Result<(), CoreError>> {
        let client = Arc::clone(self);
        tokio::spawn(async move { client.run_pusher(observer).await })
    }

    /// 푸셔에 종료 신호 발송
    ///
    /// 여러 번 호출해도 무해하다. 외부 신호를 공유하는 경우 그 신호도 함께 발송된다.
    pub fn stop(&self) {
        self.shutdown.shutdown();
    }
}
