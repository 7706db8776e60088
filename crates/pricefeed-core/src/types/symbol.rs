//! 수집 대상 심볼 정의.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 수집 대상 종목.
///
/// `ticker`는 내부 비즈니스 키이고, `external_symbol`은 가격 제공자가
/// 이해하는 식별자입니다 (예: `VOD` / `VOD.L`). 한 번의 실행 동안 불변입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol {
    /// 내부 티커
    pub ticker: String,
    /// 가격 제공자 심볼
    pub external_symbol: String,
    /// 거래 통화 (예: GBP, GBp, USD). 저장된 표기 그대로 유지합니다.
    pub currency: String,
}

impl Symbol {
    /// 새 심볼을 생성합니다.
    pub fn new(
        ticker: impl Into<String>,
        external_symbol: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            external_symbol: external_symbol.into(),
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ticker, self.external_symbol)
    }
}
