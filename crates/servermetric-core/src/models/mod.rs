//! Servermetric 도메인 모델.
//!
//! 세션 상태, 메트릭 버퍼, 푸시 이벤트와 서버 API 요청/응답 구조체를 정의한다.

pub mod api;
pub mod event;
pub mod metric;
pub mod session;
