//! # servermetric-agent
//!
//! Servermetric 에이전트 바이너리 진입점.
//! 설정 로드, 클라이언트 생성, 시스템 샘플링 루프와 푸셔 라이프사이클을 관리한다.

mod sampler;

use anyhow::{Context, Result};
use clap::Parser;
use servermetric_core::config::ClientConfig;
use servermetric_core::config_manager::ConfigManager;
use servermetric_core::models::event::{PushEvent, PushObserver};
use servermetric_network::client::ServerMetricClient;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::sampler::{SystemSampler, SYSTEM_FIELDS, SYSTEM_METRIC, SYSTEM_TYPES};

/// Servermetric 에이전트
///
/// 호스트의 CPU/메모리/디스크 사용량을 수집해 Servermetric 서버로 푸시한다.
#[derive(Parser, Debug)]
#[command(name = "servermetric-agent")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 서버 URL
    #[arg(long, short = 's')]
    server: Option<String>,

    /// API 키
    #[arg(long, short = 'k')]
    key: Option<String>,

    /// 등록 이름
    #[arg(long, short = 'n')]
    name: Option<String>,

    /// 보고 호스트 (기본: 시스템 호스트명)
    #[arg(long)]
    host: Option<String>,

    /// 푸시 간격 (밀리초)
    #[arg(long)]
    push_interval: Option<u64>,

    /// 샘플링 간격 (밀리초)
    #[arg(long, default_value = "1000")]
    sample_interval: u64,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

/// 설정 파일 + CLI 인자 병합
fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let manager = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }
    .context("설정 로드 실패")?;
    info!("설정 파일: {}", manager.config_path().display());

    let mut config = manager.get().clone();
    if let Some(server) = &args.server {
        config.server_url = server.clone();
    }
    if let Some(key) = &args.key {
        config.key = key.clone();
    }
    if let Some(name) = &args.name {
        config.name = name.clone();
    }
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(ms) = args.push_interval {
        config.push_interval_ms = ms;
    }
    if config.host.is_empty() {
        config.host = sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string());
    }

    config.validate()?;
    Ok(config)
}

/// 푸시 결과 로깅 옵저버
fn log_observer() -> PushObserver {
    Box::new(|event: PushEvent| match (&event.error, event.terminal) {
        (None, _) => info!("메트릭 푸시 완료: {:?}", event.latency),
        (Some(e), true) => info!("푸셔 종료: {e}"),
        (Some(e), false) => warn!("메트릭 푸시 실패 ({:?}): {e}", event.latency),
    })
}

/// OS 시그널 대기 (SIGINT, SIGTERM)
async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt()).context("SIGINT 핸들러 등록 실패")?;
        let mut sigterm = signal(SignalKind::terminate()).context("SIGTERM 핸들러 등록 실패")?;

        tokio::select! {
            _ = sigint.recv() => info!("SIGINT 수신"),
            _ = sigterm.recv() => info!("SIGTERM 수신"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("Ctrl+C 핸들러 등록 실패")?;
        info!("Ctrl+C 수신");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = resolve_config(&args)?;
    info!(
        "Servermetric 에이전트 시작: server={}, name={}, host={}",
        config.server_url, config.name, config.host
    );

    let client = Arc::new(
        ServerMetricClient::open(config)
            .await
            .context("Servermetric 서버 연결 실패")?,
    );
    let pusher = client.spawn_pusher(Some(log_observer()));

    let mut sampler = SystemSampler::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(args.sample_interval.max(1)));
    let signal = wait_for_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            result = &mut signal => {
                if let Err(e) = result {
                    error!("시그널 대기 실패: {e:#}");
                }
                break;
            }
            _ = ticker.tick() => {
                let sample = sampler.sample();
                client
                    .append_typed_metric(SYSTEM_METRIC, SYSTEM_FIELDS, SYSTEM_TYPES, sample)
                    .await;
            }
        }
    }

    client.stop();
    pusher.await.context("푸셔 태스크 join 실패")??;

    info!("Servermetric 에이전트 종료");
    Ok(())
}
