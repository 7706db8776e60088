//! 작업별 조회 전략.
//!
//! 각 전략은 `MarketDataProvider`에서 차트/시세를 가져와 저장할 값으로
//! 변환하고, 결과를 `Lookup`(값/없음/실패)으로 분류합니다.

use async_trait::async_trait;
use chrono::{DateTime, Duration as DateDuration, NaiveDate, NaiveTime, Utc};
use pricefeed_core::{
    filter_window, is_plausible_yield, trailing_yield, DailyClose, DateWindow, Quote, Symbol,
    YieldInfo,
};
use pricefeed_data::{Chart, ChartInterval, ChartRequest, MarketDataProvider};
use rust_decimal::Decimal;
use tracing::debug;

use crate::batch::{Lookup, PriceLookup};

/// 일별 종가로 간주하는 시각 (UTC 16:00)
const CLOSE_HOUR_UTC: u32 = 16;

fn close_timestamp(date: NaiveDate) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(CLOSE_HOUR_UTC, 0, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time).and_utc()
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ================================================================================================
// 최신가
// ================================================================================================

/// 최신가 조회.
///
/// 1분봉 당일 마지막 틱 → 차트의 현재 시장가(`now` 시각) → 5일 일봉 마지막 종가 순으로 시도합니다.
pub struct LatestPriceLookup<'a, P> {
    provider: &'a P,
    now: DateTime<Utc>,
}

impl<'a, P: MarketDataProvider> LatestPriceLookup<'a, P> {
    pub fn new(provider: &'a P, now: DateTime<Utc>) -> Self {
        Self { provider, now }
    }
}

#[async_trait]
impl<P: MarketDataProvider> PriceLookup for LatestPriceLookup<'_, P> {
    type Value = Quote;

    async fn lookup(&self, symbol: &Symbol) -> Lookup<Quote> {
        let intraday = ChartRequest::range(ChartInterval::OneMinute, "1d");
        let chart = match self.provider.chart(&symbol.external_symbol, &intraday).await {
            Ok(chart) => chart,
            Err(e) => return Lookup::Failed(e),
        };

        if let Some(tick) = chart.last_point() {
            return Lookup::Value(Quote::new(tick.close, tick.at));
        }
        if let Some(price) = chart.regular_market_price {
            debug!(symbol = %symbol.external_symbol, "당일 틱 없음, 현재 시장가 사용");
            return Lookup::Value(Quote::new(price, self.now));
        }

        let daily = ChartRequest::range(ChartInterval::OneDay, "5d");
        match self.provider.chart(&symbol.external_symbol, &daily).await {
            Ok(chart) => match chart.last_point() {
                Some(last) => Lookup::Value(Quote::new(last.close, last.at)),
                None => Lookup::Absent("No price data".to_string()),
            },
            Err(e) => Lookup::Failed(e),
        }
    }

    fn describe(&self, symbol: &Symbol, quote: &Quote) -> String {
        format!(
            "Price: {} {} @ {} UTC",
            quote.price,
            symbol.currency,
            format_timestamp(&quote.observed_at)
        )
    }
}

// ================================================================================================
// 일별 종가
// ================================================================================================

/// 거래일 하루의 종가 조회.
///
/// 목표일 -5일 ~ +2일 일봉을 받아 거래소 현지 날짜가 목표일인 봉을 찾습니다.
pub struct DailyCloseLookup<'a, P> {
    provider: &'a P,
    target_date: NaiveDate,
}

impl<'a, P: MarketDataProvider> DailyCloseLookup<'a, P> {
    pub fn new(provider: &'a P, target_date: NaiveDate) -> Self {
        Self {
            provider,
            target_date,
        }
    }

    fn close_on_target(&self, chart: &Chart) -> Option<DailyClose> {
        chart
            .points
            .iter()
            .find(|point| chart.local_date(point) == self.target_date)
            .map(|point| DailyClose {
                trade_date: self.target_date,
                price: point.close,
                observed_at: close_timestamp(self.target_date),
            })
    }
}

#[async_trait]
impl<P: MarketDataProvider> PriceLookup for DailyCloseLookup<'_, P> {
    type Value = DailyClose;

    async fn lookup(&self, symbol: &Symbol) -> Lookup<DailyClose> {
        let request = ChartRequest::period(
            ChartInterval::OneDay,
            self.target_date - DateDuration::days(5),
            self.target_date + DateDuration::days(2),
        );

        match self.provider.chart(&symbol.external_symbol, &request).await {
            Ok(chart) => match self.close_on_target(&chart) {
                Some(close) => Lookup::Value(close),
                None => Lookup::Absent(format!("No price data for {}", self.target_date)),
            },
            Err(e) => Lookup::Failed(e),
        }
    }

    fn describe(&self, symbol: &Symbol, close: &DailyClose) -> String {
        format!(
            "Price: {} {} @ {} UTC",
            close.price,
            symbol.currency,
            format_timestamp(&close.observed_at)
        )
    }
}

// ================================================================================================
// 과거 가격 백필
// ================================================================================================

/// 구간 전체 일봉 조회 (구간 밖 데이터는 버림).
pub struct BackfillLookup<'a, P> {
    provider: &'a P,
    window: DateWindow,
}

impl<'a, P: MarketDataProvider> BackfillLookup<'a, P> {
    pub fn new(provider: &'a P, window: DateWindow) -> Self {
        Self { provider, window }
    }
}

#[async_trait]
impl<P: MarketDataProvider> PriceLookup for BackfillLookup<'_, P> {
    type Value = Vec<DailyClose>;

    async fn lookup(&self, symbol: &Symbol) -> Lookup<Vec<DailyClose>> {
        // period2는 배타적이므로 종료일 다음 날까지 요청
        let request = ChartRequest::period(
            ChartInterval::OneDay,
            self.window.start,
            self.window.end + DateDuration::days(1),
        );

        let chart = match self.provider.chart(&symbol.external_symbol, &request).await {
            Ok(chart) => chart,
            Err(e) => return Lookup::Failed(e),
        };
        if chart.points.is_empty() {
            return Lookup::Absent("No historical data".to_string());
        }

        let series: Vec<DailyClose> = chart
            .points
            .iter()
            .map(|point| {
                let trade_date = chart.local_date(point);
                DailyClose {
                    trade_date,
                    price: point.close,
                    observed_at: close_timestamp(trade_date),
                }
            })
            .collect();

        let in_window = filter_window(series, &self.window);
        if in_window.is_empty() {
            return Lookup::Absent("No records inserted".to_string());
        }
        Lookup::Value(in_window)
    }

    fn describe(&self, _symbol: &Symbol, series: &Vec<DailyClose>) -> String {
        format!("Inserted {} price records", series.len())
    }
}

// ================================================================================================
// 배당 수익률
// ================================================================================================

/// 배당 수익률 조회.
///
/// 시세 스냅샷의 수익률을 우선 사용하고, 없으면 5년 월봉의 배당 이력에서
/// 최근 4회 배당 합계로 추정합니다. 두 경로 모두 0~50% 범위를 벗어나면 버립니다.
pub struct DividendYieldLookup<'a, P> {
    provider: &'a P,
}

impl<'a, P: MarketDataProvider> DividendYieldLookup<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// 배당 이력 기반 추정. 실패는 데이터 없음으로 취급합니다.
    async fn estimate_from_history(
        &self,
        symbol: &Symbol,
        snapshot_price: Option<Decimal>,
    ) -> Option<(Decimal, Decimal)> {
        let request = ChartRequest::range(ChartInterval::OneMonth, "5y");
        let chart = match self.provider.chart(&symbol.external_symbol, &request).await {
            Ok(chart) => chart,
            Err(e) => {
                debug!(symbol = %symbol.external_symbol, error = %e, "배당 이력 조회 실패");
                return None;
            }
        };

        let price = snapshot_price
            .or(chart.regular_market_price)
            .or_else(|| chart.last_point().map(|p| p.close))?;

        let estimate = trailing_yield(&chart.dividends, price);
        if let Some((dividend_yield, _)) = estimate {
            debug!(
                symbol = %symbol.external_symbol,
                dividend_yield = %dividend_yield,
                "배당 이력으로 수익률 계산"
            );
        }
        estimate
    }
}

#[async_trait]
impl<P: MarketDataProvider> PriceLookup for DividendYieldLookup<'_, P> {
    type Value = YieldInfo;

    async fn lookup(&self, symbol: &Symbol) -> Lookup<YieldInfo> {
        let snapshot = match self.provider.quote_snapshot(&symbol.external_symbol).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return Lookup::Absent("No dividend yield data available".to_string()),
            Err(e) => return Lookup::Failed(e),
        };

        let currency = snapshot
            .currency
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| symbol.currency.clone());

        let (dividend_yield, dividend_rate) = match snapshot.dividend_yield {
            Some(direct) => {
                if direct > pricefeed_core::MAX_PLAUSIBLE_YIELD {
                    return Lookup::Absent(format!(
                        "Unrealistic yield {:.2}% - likely data error, skipping",
                        direct
                    ));
                }
                (direct, snapshot.dividend_rate)
            }
            None => {
                match self
                    .estimate_from_history(symbol, snapshot.regular_market_price)
                    .await
                {
                    Some((estimated, annual)) => (estimated, Some(annual)),
                    None => {
                        return Lookup::Absent("No dividend yield data available".to_string())
                    }
                }
            }
        };

        if !is_plausible_yield(dividend_yield) {
            return Lookup::Absent(format!(
                "Unrealistic yield {:.2}% - likely data error, skipping",
                dividend_yield
            ));
        }

        Lookup::Value(YieldInfo {
            dividend_yield,
            dividend_rate,
            currency,
        })
    }

    fn describe(&self, _symbol: &Symbol, info: &YieldInfo) -> String {
        let rate = info
            .dividend_rate
            .map(|r| format!(" (Rate: {:.4})", r))
            .unwrap_or_default();
        format!("Yield: {:.2}%{} {}", info.dividend_yield, rate, info.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pricefeed_core::DividendEvent;
    use pricefeed_data::{DataError, PricePoint, QuoteSnapshot};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    /// 간격별로 준비된 차트와 스냅샷을 돌려주는 제공자
    #[derive(Default)]
    struct FakeProvider {
        intraday: Option<Chart>,
        daily: Option<Chart>,
        monthly: Option<Chart>,
        snapshot: Option<QuoteSnapshot>,
        fail: bool,
        requests: Mutex<Vec<ChartRequest>>,
    }

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn chart(
            &self,
            _external_symbol: &str,
            request: &ChartRequest,
        ) -> pricefeed_data::Result<Chart> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(DataError::FetchError("HTTP 503".to_string()));
            }
            let chart = match request.interval {
                ChartInterval::OneMinute => &self.intraday,
                ChartInterval::OneDay => &self.daily,
                ChartInterval::OneMonth => &self.monthly,
            };
            Ok(chart.clone().unwrap_or_default())
        }

        async fn quote_snapshot(
            &self,
            _external_symbol: &str,
        ) -> pricefeed_data::Result<Option<QuoteSnapshot>> {
            if self.fail {
                return Err(DataError::FetchError("HTTP 503".to_string()));
            }
            Ok(self.snapshot.clone())
        }
    }

    fn symbol() -> Symbol {
        Symbol::new("VOD", "VOD.L", "GBP")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(at: DateTime<Utc>, close: Decimal) -> PricePoint {
        PricePoint { at, close }
    }

    fn daily_point(d: NaiveDate, close: Decimal) -> PricePoint {
        point(Utc.from_utc_datetime(&d.and_hms_opt(8, 0, 0).unwrap()), close)
    }

    fn chart(points: Vec<PricePoint>) -> Chart {
        Chart {
            points,
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 8, 15, 30, 0).unwrap()
    }

    // ---------- 최신가 ----------

    #[tokio::test]
    async fn test_latest_price_uses_last_intraday_tick() {
        let tick = Utc.with_ymd_and_hms(2024, 3, 8, 15, 29, 0).unwrap();
        let provider = FakeProvider {
            intraday: Some(chart(vec![
                point(tick - DateDuration::minutes(1), dec!(71.10)),
                point(tick, dec!(71.24)),
            ])),
            ..Default::default()
        };
        let lookup = LatestPriceLookup::new(&provider, now());

        match lookup.lookup(&symbol()).await {
            Lookup::Value(quote) => {
                assert_eq!(quote.price, dec!(71.24));
                assert_eq!(quote.observed_at, tick);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(provider.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_latest_price_falls_back_to_market_price_at_now() {
        let provider = FakeProvider {
            intraday: Some(Chart {
                regular_market_price: Some(dec!(70.5)),
                ..Default::default()
            }),
            ..Default::default()
        };
        let lookup = LatestPriceLookup::new(&provider, now());

        match lookup.lookup(&symbol()).await {
            Lookup::Value(quote) => assert_eq!(quote, Quote::new(dec!(70.5), now())),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_latest_price_falls_back_to_last_daily_close() {
        let provider = FakeProvider {
            daily: Some(chart(vec![
                daily_point(date(2024, 3, 6), dec!(69)),
                daily_point(date(2024, 3, 7), dec!(70)),
            ])),
            ..Default::default()
        };
        let lookup = LatestPriceLookup::new(&provider, now());

        match lookup.lookup(&symbol()).await {
            Lookup::Value(quote) => assert_eq!(quote.price, dec!(70)),
            other => panic!("unexpected {:?}", other),
        }
        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1], ChartRequest::range(ChartInterval::OneDay, "5d"));
    }

    #[tokio::test]
    async fn test_latest_price_absent_when_nothing_available() {
        let provider = FakeProvider::default();
        let lookup = LatestPriceLookup::new(&provider, now());
        assert!(matches!(lookup.lookup(&symbol()).await, Lookup::Absent(_)));
    }

    #[tokio::test]
    async fn test_provider_error_is_failed_not_absent() {
        let provider = FakeProvider {
            fail: true,
            ..Default::default()
        };
        let lookup = LatestPriceLookup::new(&provider, now());
        assert!(matches!(lookup.lookup(&symbol()).await, Lookup::Failed(_)));
    }

    // ---------- 일별 종가 ----------

    #[tokio::test]
    async fn test_daily_close_matches_target_date() {
        let target = date(2024, 3, 8);
        let provider = FakeProvider {
            daily: Some(chart(vec![
                daily_point(date(2024, 3, 7), dec!(70)),
                daily_point(target, dec!(71.5)),
            ])),
            ..Default::default()
        };
        let lookup = DailyCloseLookup::new(&provider, target);

        match lookup.lookup(&symbol()).await {
            Lookup::Value(close) => {
                assert_eq!(close.trade_date, target);
                assert_eq!(close.price, dec!(71.5));
                assert_eq!(
                    close.observed_at,
                    Utc.with_ymd_and_hms(2024, 3, 8, 16, 0, 0).unwrap()
                );
            }
            other => panic!("unexpected {:?}", other),
        }

        let requests = provider.requests.lock().unwrap();
        assert_eq!(
            requests[0],
            ChartRequest::period(ChartInterval::OneDay, date(2024, 3, 3), date(2024, 3, 10))
        );
    }

    #[tokio::test]
    async fn test_daily_close_absent_when_target_missing() {
        let provider = FakeProvider {
            daily: Some(chart(vec![daily_point(date(2024, 3, 7), dec!(70))])),
            ..Default::default()
        };
        let lookup = DailyCloseLookup::new(&provider, date(2024, 3, 8));

        match lookup.lookup(&symbol()).await {
            Lookup::Absent(reason) => assert_eq!(reason, "No price data for 2024-03-08"),
            other => panic!("unexpected {:?}", other),
        }
    }

    // ---------- 백필 ----------

    #[tokio::test]
    async fn test_backfill_keeps_only_window_rows() {
        let provider = FakeProvider {
            daily: Some(chart(vec![
                daily_point(date(2015, 6, 24), dec!(1)),
                daily_point(date(2015, 6, 26), dec!(2)),
                daily_point(date(2015, 6, 27), dec!(3)),
            ])),
            ..Default::default()
        };
        let window = DateWindow::new(date(2015, 6, 26), date(2015, 6, 27));
        let lookup = BackfillLookup::new(&provider, window);

        match lookup.lookup(&symbol()).await {
            Lookup::Value(series) => {
                let dates: Vec<NaiveDate> = series.iter().map(|c| c.trade_date).collect();
                assert_eq!(dates, vec![date(2015, 6, 26), date(2015, 6, 27)]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_backfill_empty_series_is_absent() {
        let provider = FakeProvider::default();
        let window = DateWindow::new(date(2015, 6, 26), date(2015, 6, 27));
        let lookup = BackfillLookup::new(&provider, window);

        match lookup.lookup(&symbol()).await {
            Lookup::Absent(reason) => assert_eq!(reason, "No historical data"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_backfill_series_outside_window_is_absent() {
        let provider = FakeProvider {
            daily: Some(chart(vec![
                daily_point(date(2015, 6, 22), dec!(1)),
                daily_point(date(2015, 6, 29), dec!(2)),
            ])),
            ..Default::default()
        };
        let window = DateWindow::new(date(2015, 6, 26), date(2015, 6, 27));
        let lookup = BackfillLookup::new(&provider, window);

        match lookup.lookup(&symbol()).await {
            Lookup::Absent(reason) => assert_eq!(reason, "No records inserted"),
            other => panic!("unexpected {:?}", other),
        }
    }

    // ---------- 배당 수익률 ----------

    fn snapshot(dividend_yield: Option<Decimal>) -> QuoteSnapshot {
        QuoteSnapshot {
            currency: Some("gbp".to_string()),
            dividend_yield,
            dividend_rate: Some(dec!(0.09)),
            regular_market_price: Some(dec!(0.70)),
        }
    }

    #[tokio::test]
    async fn test_unrealistic_yield_is_discarded() {
        let provider = FakeProvider {
            snapshot: Some(snapshot(Some(dec!(60)))),
            ..Default::default()
        };
        let lookup = DividendYieldLookup::new(&provider);

        assert!(matches!(lookup.lookup(&symbol()).await, Lookup::Absent(_)));
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plausible_yield_kept_unchanged() {
        let provider = FakeProvider {
            snapshot: Some(snapshot(Some(dec!(4.5)))),
            ..Default::default()
        };
        let lookup = DividendYieldLookup::new(&provider);

        match lookup.lookup(&symbol()).await {
            Lookup::Value(info) => {
                assert_eq!(info.dividend_yield, dec!(4.5));
                assert_eq!(info.dividend_rate, Some(dec!(0.09)));
                assert_eq!(info.currency, "GBP");
                assert_eq!(
                    lookup.describe(&symbol(), &info),
                    "Yield: 4.50% (Rate: 0.0900) GBP"
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_yield_estimated_from_dividend_history() {
        let dividends = (3..=9)
            .step_by(2)
            .map(|m| DividendEvent {
                paid_on: date(2023, m, 1),
                amount: dec!(0.5),
            })
            .collect();
        let provider = FakeProvider {
            snapshot: Some(QuoteSnapshot {
                regular_market_price: Some(dec!(50)),
                ..snapshot(None)
            }),
            monthly: Some(Chart {
                dividends,
                ..Default::default()
            }),
            ..Default::default()
        };
        let lookup = DividendYieldLookup::new(&provider);

        match lookup.lookup(&symbol()).await {
            Lookup::Value(info) => {
                assert_eq!(info.dividend_yield, dec!(4));
                assert_eq!(info.dividend_rate, Some(dec!(2.0)));
            }
            other => panic!("unexpected {:?}", other),
        }
        let requests = provider.requests.lock().unwrap();
        assert_eq!(
            requests[0],
            ChartRequest::range(ChartInterval::OneMonth, "5y")
        );
    }

    #[tokio::test]
    async fn test_no_snapshot_and_no_history_is_absent() {
        let provider = FakeProvider {
            snapshot: Some(snapshot(None)),
            ..Default::default()
        };
        let lookup = DividendYieldLookup::new(&provider);
        assert!(matches!(lookup.lookup(&symbol()).await, Lookup::Absent(_)));

        let provider = FakeProvider::default();
        let lookup = DividendYieldLookup::new(&provider);
        assert!(matches!(lookup.lookup(&symbol()).await, Lookup::Absent(_)));
    }

    #[tokio::test]
    async fn test_currency_falls_back_to_symbol_verbatim() {
        let provider = FakeProvider {
            snapshot: Some(QuoteSnapshot {
                currency: None,
                ..snapshot(Some(dec!(3)))
            }),
            ..Default::default()
        };
        let lookup = DividendYieldLookup::new(&provider);
        // 펜스 표기(GBp)는 그대로 유지
        let symbol = Symbol::new("VOD", "VOD.L", "GBp");

        match lookup.lookup(&symbol).await {
            Lookup::Value(info) => assert_eq!(info.currency, "GBp"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
