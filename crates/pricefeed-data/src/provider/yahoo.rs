//! Yahoo Finance 가격 제공자.
//!
//! `yahoo_finance_api`의 `YahooConnector`를 감쌉니다.
//! - 차트: `get_quote_range` / `get_quote_history_interval` (가격, 메타데이터, 배당 이벤트)
//! - 배당 요약: `get_ticker_info`의 summary detail (crumb 인증은 커넥터가 처리)

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use pricefeed_core::DividendEvent;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::debug;
use yahoo_finance_api as yahoo;

use super::{
    Chart, ChartInterval, ChartRequest, ChartSpan, MarketDataProvider, PricePoint, QuoteSnapshot,
};
use crate::error::{DataError, Result};

/// 오류 메시지에 남길 응답 본문 최대 길이
const MAX_ERROR_LEN: usize = 200;

/// Yahoo 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// 요청 타임아웃
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Yahoo Finance 클라이언트.
pub struct YahooClient {
    /// get_ticker_info가 `&mut self`를 요구하므로 Mutex로 감쌈
    connector: Mutex<yahoo::YahooConnector>,
    timeout: Duration,
}

impl YahooClient {
    pub fn new(config: &YahooConfig) -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| DataError::ConfigError(format!("Yahoo Finance 연결 실패: {}", e)))?;

        Ok(Self {
            connector: Mutex::new(connector),
            timeout: config.timeout,
        })
    }

    /// 타임아웃을 적용하고 커넥터 오류를 조회 오류로 변환합니다.
    async fn call<T, E, F>(&self, external_symbol: &str, request: F) -> Result<T>
    where
        E: Display,
        F: Future<Output = std::result::Result<T, E>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(DataError::FetchError(format!(
                "Yahoo Finance API 오류 ({}): {}",
                external_symbol,
                single_line(&e.to_string())
            ))),
            Err(_) => Err(DataError::FetchError(format!(
                "Yahoo Finance 응답 시간 초과 ({}, {}초)",
                external_symbol,
                self.timeout.as_secs()
            ))),
        }
    }

    async fn fetch(
        &self,
        external_symbol: &str,
        request: &ChartRequest,
    ) -> Result<yahoo::YResponse> {
        validate_symbol(external_symbol)?;
        let interval = request.interval.as_str();
        let connector = self.connector.lock().await;

        match &request.span {
            ChartSpan::Range(range) => {
                self.call(
                    external_symbol,
                    connector.get_quote_range(external_symbol, interval, range),
                )
                .await
            }
            ChartSpan::Period { start, end } => {
                let start = midnight_utc(*start)?;
                let end = midnight_utc(*end)?;
                self.call(
                    external_symbol,
                    connector.get_quote_history_interval(external_symbol, start, end, interval),
                )
                .await
            }
        }
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn chart(&self, external_symbol: &str, request: &ChartRequest) -> Result<Chart> {
        let response = self.fetch(external_symbol, request).await?;
        let mut chart = Chart::default();

        match response.metadata() {
            Ok(meta) => {
                chart.regular_market_price =
                    optional(meta.regular_market_price).and_then(price_from_f64);
                chart.utc_offset_secs = optional(meta.gmtoffset).unwrap_or(0);
            }
            Err(e) => debug!(symbol = external_symbol, error = %e, "차트 메타데이터 없음"),
        }

        // 장 시작 전이나 주말에는 시세 배열이 비어 있을 수 있음
        match response.quotes() {
            Ok(quotes) => {
                chart.points = quotes
                    .iter()
                    .filter_map(|q| point_from_bar(q.timestamp as i64, q.close))
                    .collect();
            }
            Err(e) => debug!(symbol = external_symbol, error = %e, "시세 데이터 없음"),
        }

        if let Ok(dividends) = response.dividends() {
            chart.dividends = dividends
                .iter()
                .filter_map(|d| dividend_from_event(d.date as i64, d.amount))
                .collect();
            chart.dividends.sort_by_key(|d| d.paid_on);
        }

        debug!(
            symbol = external_symbol,
            interval = request.interval.as_str(),
            points = chart.points.len(),
            dividends = chart.dividends.len(),
            "차트 조회 완료"
        );
        Ok(chart)
    }

    async fn quote_snapshot(&self, external_symbol: &str) -> Result<Option<QuoteSnapshot>> {
        validate_symbol(external_symbol)?;

        let info = {
            let mut connector = self.connector.lock().await;
            self.call(external_symbol, connector.get_ticker_info(external_symbol))
                .await?
        };

        let Some(result) = info
            .quote_summary
            .and_then(|summary| summary.result)
            .and_then(|results| results.into_iter().next())
        else {
            return Ok(None);
        };

        let mut snapshot = QuoteSnapshot::default();
        if let Some(detail) = result.summary_detail.as_ref() {
            snapshot.dividend_yield = detail.dividend_yield.and_then(yield_percent);
            snapshot.dividend_rate = detail.dividend_rate.and_then(price_from_f64);
        }

        // 통화와 현재가는 차트 메타데이터에서
        match self
            .fetch(external_symbol, &ChartRequest::range(ChartInterval::OneDay, "5d"))
            .await
        {
            Ok(response) => {
                if let Ok(meta) = response.metadata() {
                    snapshot.currency = meta.currency.clone();
                    snapshot.regular_market_price =
                        optional(meta.regular_market_price).and_then(price_from_f64);
                }
            }
            Err(e) => debug!(symbol = external_symbol, error = %e, "시세 메타데이터 조회 실패"),
        }

        Ok(Some(snapshot))
    }
}

// =============================================================================
// 변환 헬퍼
// =============================================================================

/// 커넥터 버전에 따라 optional일 수도 있는 메타데이터 필드.
fn optional<T>(value: impl Into<Option<T>>) -> Option<T> {
    value.into()
}

/// Yahoo 심볼에 쓰이는 문자만 허용합니다 (예: `VOD.L`, `^FTSE`, `GBPUSD=X`, `BRK-B`).
fn validate_symbol(external_symbol: &str) -> Result<()> {
    let valid = !external_symbol.is_empty()
        && external_symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-' | '_'));

    if valid {
        Ok(())
    } else {
        Err(DataError::FetchError(format!(
            "잘못된 심볼 형식: {:?}",
            external_symbol
        )))
    }
}

/// 오류 본문을 한 줄로 줄입니다.
fn single_line(message: &str) -> String {
    let joined = message.split_whitespace().collect::<Vec<_>>().join(" ");
    match joined.char_indices().nth(MAX_ERROR_LEN) {
        Some((idx, _)) => format!("{}...", &joined[..idx]),
        None => joined,
    }
}

fn midnight_utc(date: NaiveDate) -> Result<OffsetDateTime> {
    let invalid = || DataError::ParseError(format!("날짜 변환 실패: {}", date));
    let month = time::Month::try_from(date.month() as u8).map_err(|_| invalid())?;
    let day = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
        .map_err(|_| invalid())?;
    Ok(day.midnight().assume_utc())
}

/// 부동소수 가격을 Decimal로 변환합니다 (NaN/무한대 제외).
fn price_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value).map(|d| d.round_dp(6))
}

/// 배당 수익률 비율(0.045)을 퍼센트(4.5)로 변환합니다.
fn yield_percent(fraction: f64) -> Option<Decimal> {
    price_from_f64(fraction)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|d| d.round_dp(4))
}

/// 종가가 없거나 0 이하인 봉은 건너뜁니다.
fn point_from_bar(timestamp: i64, close: f64) -> Option<PricePoint> {
    let close = price_from_f64(close).filter(|c| *c > Decimal::ZERO)?;
    let at = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
    Some(PricePoint { at, close })
}

fn dividend_from_event(timestamp: i64, amount: f64) -> Option<DividendEvent> {
    let amount = price_from_f64(amount).filter(|a| *a > Decimal::ZERO)?;
    let paid_on = DateTime::<Utc>::from_timestamp(timestamp, 0)?.date_naive();
    Some(DividendEvent { paid_on, amount })
}
