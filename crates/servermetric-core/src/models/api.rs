//! 서버 API 요청/응답 구조체.

use serde::{Deserialize, Serialize};

use super::metric::MetricBuffer;

/// `POST /api/connect` 요청 본문
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// 등록 이름
    pub name: String,
    /// 보고할 호스트
    pub host: String,
}

/// `POST /api/connect` 응답 본문
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectResponse {
    /// 서버 상태 문자열
    #[serde(default)]
    pub status: String,
    /// 서버가 할당한 ID
    pub id: i64,
}

/// `POST /api/metric` 요청 본문
#[derive(Debug, Serialize)]
pub struct PushMetricsRequest<'a> {
    /// 연결 시 발급된 서버 ID
    #[serde(rename = "serverId")]
    pub server_id: i64,
    /// 등록 이름
    pub name: &'a str,
    /// 버퍼 내용
    pub metrics: &'a MetricBuffer,
}

/// 에러 응답 본문 (`{"msg": ...}`)
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub msg: String,
}
