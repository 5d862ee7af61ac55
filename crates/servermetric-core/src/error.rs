//! Servermetric 핵심 에러 타입.
//!
//! 연결 관리, 메트릭 푸시, 설정 로드에서 발생하는 모든 에러를 하나의 열거형으로 정의한다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 서버가 키를 거부함 (403)
    #[error("잘못된 키")]
    BadKey,

    /// 이미 연결된 상태에서 connect 호출
    #[error("이미 연결됨")]
    AlreadyConnected,

    /// 활성 세션 없음
    #[error("연결되지 않음")]
    NotConnected,

    /// 응답 본문을 해석할 수 없음
    #[error("잘못된 JSON 응답: {0}")]
    BadJson(String),

    /// 200 이외의 응답 상태 코드
    #[error("예상치 못한 응답 상태 {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    UnexpectedStatus {
        /// HTTP 상태 코드
        status: u16,
        /// 서버가 보낸 에러 메시지 (`{"msg": ...}`)
        message: Option<String>,
    },

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 푸셔 루프가 취소 신호로 종료됨
    #[error("푸셔 취소됨")]
    Cancelled,

    /// 푸셔가 이미 실행 중이거나 종료됨
    #[error("푸셔를 시작할 수 없음 (실행 중이거나 종료됨)")]
    PusherUnavailable,

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 재시도 대상인 전송 계층 에러인지 판별
    pub fn is_transport(&self) -> bool {
        matches!(self, CoreError::Network(_))
    }
}
