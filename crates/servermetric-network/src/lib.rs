//! # servermetric-network
//!
//! Servermetric 서버용 HTTP 클라이언트.
//! 서버 등록(ping/connect/disconnect), 메트릭 버퍼링, 주기적 푸시를 담당한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use servermetric_core::config::ClientConfig;
//! use servermetric_network::client::ServerMetricClient;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("http://localhost:8080", "key", "web-1", "10.0.0.1", Duration::from_secs(10));
//! let client = Arc::new(ServerMetricClient::open(config).await?);
//! let pusher = client.spawn_pusher(Some(Box::new(|ev| println!("{ev:?}"))));
//!
//! client.append_metric("cpu", vec![42.into()]).await;
//! // ...
//! client.stop();
//! pusher.await??;
//! ```

pub mod client;
pub mod connection;
pub mod endpoint;
pub mod http_transport;
pub mod lifecycle;
pub mod pusher;
mod retry;

#[cfg(test)]
pub(crate) mod test_support;
