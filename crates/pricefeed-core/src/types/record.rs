//! 저장소에 기록되는 레코드.
//!
//! 모든 레코드는 비즈니스 키로 upsert 됩니다:
//! - `HistoricalPriceRecord`: (ticker, trade_date)
//! - `LatestPriceRecord`, `LatestYieldRecord`: (ticker)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DailyClose, Quote, Symbol, YieldInfo};

/// latest 테이블에 기록되는 데이터 출처 태그.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// 실시간/최신 조회
    Yfinance,
    /// 일별 종가 배치
    YfinanceDaily,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yfinance => "yfinance",
            Self::YfinanceDaily => "yfinance_daily",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 일별 가격 이력 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalPriceRecord {
    pub ticker: String,
    pub external_symbol: String,
    pub currency: String,
    pub price: Decimal,
    pub trade_date: NaiveDate,
}

impl HistoricalPriceRecord {
    /// 심볼과 일별 종가로 레코드를 만듭니다.
    pub fn from_close(symbol: &Symbol, close: &DailyClose) -> Self {
        Self {
            ticker: symbol.ticker.clone(),
            external_symbol: symbol.external_symbol.clone(),
            currency: symbol.currency.clone(),
            price: close.price,
            trade_date: close.trade_date,
        }
    }
}

/// 종목당 한 행인 최신가 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestPriceRecord {
    pub ticker: String,
    pub external_symbol: String,
    pub currency: String,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
    pub source: SourceTag,
}

impl LatestPriceRecord {
    pub fn from_quote(symbol: &Symbol, quote: &Quote, source: SourceTag) -> Self {
        Self {
            ticker: symbol.ticker.clone(),
            external_symbol: symbol.external_symbol.clone(),
            currency: symbol.currency.clone(),
            price: quote.price,
            observed_at: quote.observed_at,
            source,
        }
    }
}

/// 종목당 한 행인 최신 배당 수익률 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestYieldRecord {
    pub ticker: String,
    pub external_symbol: String,
    pub currency: String,
    pub dividend_yield: Decimal,
    pub dividend_rate: Option<Decimal>,
    pub observed_at: DateTime<Utc>,
    pub source: SourceTag,
}

impl LatestYieldRecord {
    /// 통화는 제공자가 돌려준 값(`YieldInfo::currency`)을 사용합니다.
    pub fn from_yield(
        symbol: &Symbol,
        info: &YieldInfo,
        observed_at: DateTime<Utc>,
        source: SourceTag,
    ) -> Self {
        Self {
            ticker: symbol.ticker.clone(),
            external_symbol: symbol.external_symbol.clone(),
            currency: info.currency.clone(),
            dividend_yield: info.dividend_yield,
            dividend_rate: info.dividend_rate,
            observed_at,
            source,
        }
    }
}
