//! # PriceFeed Core
//!
//! 가격/배당 수집기의 핵심 도메인 모델을 제공합니다.
//!
//! - 심볼, 시세, 일별 종가, 배당 수익률 타입
//! - 저장용 레코드 (historical / latest)
//! - 단순화된 거래일 캘린더
//! - 배당 이력 기반 수익률 추정

pub mod domain;
pub mod types;

pub use domain::*;
pub use types::*;
