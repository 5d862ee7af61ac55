//! 연결 관리자.
//!
//! 서버 등록 세션(server id + API 키)을 소유하고 ping/connect/disconnect 핸드셰이크와
//! 키 교체를 수행한다. 세션 변경은 요청이 끝날 때까지 세션 잠금을 쥔 채로 진행된다.

use servermetric_core::error::CoreError;
use servermetric_core::models::api::{ConnectRequest, ConnectResponse};
use servermetric_core::models::session::Session;
use servermetric_core::ports::transport::MetricTransport;
use std::num::NonZeroI64;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::endpoint::{check_status, Endpoint};
use crate::retry::with_single_retry;

/// 활성 세션 스냅샷 (server id, 키)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub server_id: i64,
    pub key: String,
}

/// 연결 관리자
pub struct ConnectionManager {
    transport: Arc<dyn MetricTransport>,
    endpoint: Endpoint,
    name: String,
    host: String,
    session: Mutex<Session>,
}

impl ConnectionManager {
    /// 새 연결 관리자 생성 (연결되지 않은 상태)
    pub fn new(
        transport: Arc<dyn MetricTransport>,
        endpoint: Endpoint,
        key: &str,
        name: &str,
        host: &str,
    ) -> Self {
        Self {
            transport,
            endpoint,
            name: name.to_string(),
            host: host.to_string(),
            session: Mutex::new(Session::new(key)),
        }
    }

    /// 등록 이름
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 보고 호스트
    pub fn host(&self) -> &str {
        &self.host
    }

    /// 현재 키로 헬스 체크, 왕복 시간 반환
    pub async fn ping(&self) -> Result<Duration, CoreError> {
        let key = self.session.lock().await.key().to_string();
        self.ping_with_key(&key).await
    }

    /// 지정한 키로 헬스 체크
    pub async fn ping_with_key(&self, key: &str) -> Result<Duration, CoreError> {
        let url = self.endpoint.ping(key);
        let started = Instant::now();

        let resp = with_single_retry("ping", || self.transport.get(&url)).await?;
        check_status(resp)?;

        let latency = started.elapsed();
        debug!("ping 성공: {latency:?}");
        Ok(latency)
    }

    /// 서버 등록
    ///
    /// 이미 연결되어 있으면 [`CoreError::AlreadyConnected`]. 실패 시 세션은 그대로 유지된다.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let mut session = self.session.lock().await;
        if session.is_connected() {
            return Err(CoreError::AlreadyConnected);
        }

        let body = serde_json::to_vec(&ConnectRequest {
            name: self.name.clone(),
            host: self.host.clone(),
        })?;
        let url = self.endpoint.connect(session.key());

        let resp = with_single_retry("connect", || self.transport.post_json(&url, &body)).await?;
        let resp = check_status(resp)?;

        let parsed: ConnectResponse = serde_json::from_slice(&resp.body)
            .map_err(|e| CoreError::BadJson(format!("connect 응답 파싱 실패: {e}")))?;
        let server_id = NonZeroI64::new(parsed.id)
            .ok_or_else(|| CoreError::BadJson("connect 응답의 id가 0".to_string()))?;

        session.mark_connected(server_id);
        info!(
            "서버 등록 완료: name={}, id={}, status={}",
            self.name, server_id, parsed.status
        );
        Ok(())
    }

    /// 서버 등록 해제
    ///
    /// 연결되어 있지 않으면 [`CoreError::NotConnected`]. 실패 시 세션은 그대로 유지된다.
    pub async fn disconnect(&self) -> Result<(), CoreError> {
        let mut session = self.session.lock().await;
        let server_id = session.server_id().ok_or(CoreError::NotConnected)?;

        let url = self.endpoint.disconnect(session.key(), server_id);
        let resp = with_single_retry("disconnect", || self.transport.get(&url)).await?;
        check_status(resp)?;

        session.mark_disconnected();
        info!("서버 등록 해제: id={server_id}");
        Ok(())
    }

    /// 새 키를 ping으로 검증한 뒤 교체
    ///
    /// 검증에 실패하면 기존 키를 유지한다.
    pub async fn update_key(&self, new_key: &str) -> Result<(), CoreError> {
        let mut session = self.session.lock().await;
        self.ping_with_key(new_key).await?;
        session.set_key(new_key);
        info!("API 키 교체 완료");
        Ok(())
    }

    /// 연결 여부
    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.is_connected()
    }

    /// 서버가 할당한 ID
    pub async fn server_id(&self) -> Option<i64> {
        self.session.lock().await.server_id()
    }

    /// 현재 API 키
    pub async fn key(&self) -> String {
        self.session.lock().await.key().to_string()
    }

    /// 연결된 경우 세션 스냅샷
    pub async fn active_session(&self) -> Option<ActiveSession> {
        let session = self.session.lock().await;
        session.server_id().map(|server_id| ActiveSession {
            server_id,
            key: session.key().to_string(),
        })
    }
}
