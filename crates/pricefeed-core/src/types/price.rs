//! 가격 제공자에서 조회한 값 타입.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 단일 시세 (최신가).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// 가격
    pub price: Decimal,
    /// 관측 시각 (UTC)
    pub observed_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(price: Decimal, observed_at: DateTime<Utc>) -> Self {
        Self { price, observed_at }
    }
}

/// 특정 거래일의 종가.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClose {
    /// 거래일 (거래소 현지 기준)
    pub trade_date: NaiveDate,
    /// 종가
    pub price: Decimal,
    /// 관측 시각 (UTC)
    pub observed_at: DateTime<Utc>,
}

/// 배당 지급 이벤트.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendEvent {
    /// 지급(배당락) 일자
    pub paid_on: NaiveDate,
    /// 주당 배당금
    pub amount: Decimal,
}

/// 배당 수익률 스냅샷.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldInfo {
    /// 배당 수익률 (%)
    pub dividend_yield: Decimal,
    /// 연간 주당 배당금
    pub dividend_rate: Option<Decimal>,
    /// 통화
    pub currency: String,
}
