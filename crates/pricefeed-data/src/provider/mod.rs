//! 외부 가격 제공자.
//!
//! 배치 드라이버는 제공자를 직접 알지 못하고, 조회 전략이 이 트레이트를 통해
//! 차트(가격 시계열 + 배당 이벤트)와 시세 요약을 가져옵니다.

pub mod yahoo;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use pricefeed_core::DividendEvent;
use rust_decimal::Decimal;

use crate::Result;

pub use yahoo::{YahooClient, YahooConfig};

/// 차트 캔들 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartInterval {
    OneMinute,
    OneDay,
    OneMonth,
}

impl ChartInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::OneDay => "1d",
            Self::OneMonth => "1mo",
        }
    }
}

/// 차트 조회 구간.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartSpan {
    /// 제공자 상대 구간 (예: "1d", "5d", "5y")
    Range(&'static str),
    /// 절대 구간 `[start, end)` (UTC 자정 기준)
    Period { start: NaiveDate, end: NaiveDate },
}

/// 차트 조회 요청.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub interval: ChartInterval,
    pub span: ChartSpan,
}

impl ChartRequest {
    pub fn range(interval: ChartInterval, range: &'static str) -> Self {
        Self {
            interval,
            span: ChartSpan::Range(range),
        }
    }

    pub fn period(interval: ChartInterval, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            interval,
            span: ChartSpan::Period { start, end },
        }
    }
}

/// 시계열의 한 점 (종가가 없는 점은 포함되지 않음).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePoint {
    pub at: DateTime<Utc>,
    pub close: Decimal,
}

/// 차트 조회 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chart {
    /// 현재 시장가 (fast quote)
    pub regular_market_price: Option<Decimal>,
    /// 거래소 현지 시각의 UTC 오프셋 (초)
    pub utc_offset_secs: i32,
    /// 시간순 가격 시계열
    pub points: Vec<PricePoint>,
    /// 시간순 배당 이벤트
    pub dividends: Vec<DividendEvent>,
}

impl Chart {
    /// 점의 거래소 현지 날짜.
    pub fn local_date(&self, point: &PricePoint) -> NaiveDate {
        match FixedOffset::east_opt(self.utc_offset_secs) {
            Some(offset) => point.at.with_timezone(&offset).date_naive(),
            None => point.at.date_naive(),
        }
    }

    pub fn last_point(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// 시세 요약 (배당 정보 포함).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteSnapshot {
    pub currency: Option<String>,
    /// 배당 수익률 (%)
    pub dividend_yield: Option<Decimal>,
    /// 연간 주당 배당금
    pub dividend_rate: Option<Decimal>,
    pub regular_market_price: Option<Decimal>,
}

/// 외부 가격 제공자 인터페이스.
///
/// 재시도나 캐싱은 하지 않습니다. 호출 한 번에 요청 한 번입니다.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// 제공자 이름
    fn name(&self) -> &str;

    /// 가격 차트 조회. 데이터가 없으면 빈 차트를 반환합니다.
    async fn chart(&self, external_symbol: &str, request: &ChartRequest) -> Result<Chart>;

    /// 시세 요약 조회. 결과가 없으면 `None`.
    async fn quote_snapshot(&self, external_symbol: &str) -> Result<Option<QuoteSnapshot>>;
}
