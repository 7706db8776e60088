//! 에러 타입 정의.
//!
//! 여기의 에러는 모두 실행 전체를 중단시키는 치명적 오류입니다.
//! 종목 단위 실패는 `RunSummary`에 집계되고 에러로 전파되지 않습니다.

use pricefeed_data::DataError;
use std::fmt;

/// Collector 에러 타입
#[derive(Debug)]
pub enum CollectorError {
    /// 설정 에러
    Config(String),
    /// 데이터베이스 연결 실패
    Connectivity(String),
    /// 심볼 조회 등 배치 시작 전 데이터 에러
    Data(DataError),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Connectivity(msg) => write!(f, "Failed to connect to database: {}", msg),
            Self::Data(e) => write!(f, "Data error: {}", e),
        }
    }
}

impl std::error::Error for CollectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Data(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DataError> for CollectorError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::ConnectionError(msg) => Self::Connectivity(msg),
            DataError::ConfigError(msg) => Self::Config(msg),
            other => Self::Data(other),
        }
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
