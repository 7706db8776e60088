//! 작업별 저장 전략.

use async_trait::async_trait;
use pricefeed_core::{
    DailyClose, HistoricalPriceRecord, LatestPriceRecord, LatestYieldRecord, Quote, SourceTag,
    Symbol, YieldInfo,
};
use pricefeed_data::{PriceStore, Result};
use tracing::warn;

use crate::batch::RecordSink;

/// 최신가 테이블 (`yfinance`)
pub struct LatestPriceSink<'a, S> {
    store: &'a S,
}

impl<'a, S: PriceStore> LatestPriceSink<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: PriceStore> RecordSink<Quote> for LatestPriceSink<'_, S> {
    async fn store(&self, symbol: &Symbol, quote: &Quote) -> Result<usize> {
        let record = LatestPriceRecord::from_quote(symbol, quote, SourceTag::Yfinance);
        self.store.upsert_latest_price(&record).await?;
        Ok(1)
    }
}

/// 일별 종가: 가격 이력 + 최신가 (`yfinance_daily`).
///
/// 두 테이블 모두 시도하며, 하나라도 실패하면 실패입니다.
pub struct DailyCloseSink<'a, S> {
    store: &'a S,
}

impl<'a, S: PriceStore> DailyCloseSink<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: PriceStore> RecordSink<DailyClose> for DailyCloseSink<'_, S> {
    async fn store(&self, symbol: &Symbol, close: &DailyClose) -> Result<usize> {
        let historical = HistoricalPriceRecord::from_close(symbol, close);
        let latest = LatestPriceRecord::from_quote(
            symbol,
            &Quote::new(close.price, close.observed_at),
            SourceTag::YfinanceDaily,
        );

        let hist_result = self.store.upsert_historical(&historical).await;
        let latest_result = self.store.upsert_latest_price(&latest).await;

        match (hist_result, latest_result) {
            (Ok(()), Ok(())) => Ok(2),
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Err(hist_err), Err(latest_err)) => {
                warn!(ticker = %symbol.ticker, error = %latest_err, "최신가 저장도 실패");
                Err(hist_err)
            }
        }
    }
}

/// 가격 이력 테이블 (백필)
pub struct HistoricalSink<'a, S> {
    store: &'a S,
}

impl<'a, S: PriceStore> HistoricalSink<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: PriceStore> RecordSink<Vec<DailyClose>> for HistoricalSink<'_, S> {
    async fn store(&self, symbol: &Symbol, series: &Vec<DailyClose>) -> Result<usize> {
        for close in series {
            let record = HistoricalPriceRecord::from_close(symbol, close);
            self.store.upsert_historical(&record).await?;
        }
        Ok(series.len())
    }
}

/// 배당 수익률 테이블 (`yfinance`)
pub struct DividendYieldSink<'a, S> {
    store: &'a S,
    observed_at: chrono::DateTime<chrono::Utc>,
}

impl<'a, S: PriceStore> DividendYieldSink<'a, S> {
    /// `observed_at`은 실행 시각입니다.
    pub fn new(store: &'a S, observed_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self { store, observed_at }
    }
}

#[async_trait]
impl<S: PriceStore> RecordSink<YieldInfo> for DividendYieldSink<'_, S> {
    async fn store(&self, symbol: &Symbol, info: &YieldInfo) -> Result<usize> {
        let record =
            LatestYieldRecord::from_yield(symbol, info, self.observed_at, SourceTag::Yfinance);
        self.store.upsert_latest_yield(&record).await?;
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pricefeed_data::{CoverageRow, DataError, MemoryPriceStore};
    use rust_decimal_macros::dec;

    fn symbol() -> Symbol {
        Symbol::new("LGEN", "LGEN.L", "GBP")
    }

    fn close(d: u32) -> DailyClose {
        let trade_date = NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        DailyClose {
            trade_date,
            price: dec!(2.45),
            observed_at: Utc.from_utc_datetime(&trade_date.and_hms_opt(16, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_daily_close_writes_both_tables() {
        let store = MemoryPriceStore::new();
        let sink = DailyCloseSink::new(&store);

        let rows = sink.store(&symbol(), &close(8)).await.unwrap();

        assert_eq!(rows, 2);
        assert_eq!(store.historical_rows().len(), 1);
        let latest = store.latest_price("LGEN").unwrap();
        assert_eq!(latest.source, SourceTag::YfinanceDaily);
        assert_eq!(latest.price, dec!(2.45));
    }

    #[tokio::test]
    async fn test_historical_sink_counts_rows() {
        let store = MemoryPriceStore::new();
        let sink = HistoricalSink::new(&store);

        let rows = sink
            .store(&symbol(), &vec![close(6), close(7), close(8)])
            .await
            .unwrap();

        assert_eq!(rows, 3);
        assert_eq!(store.historical_rows().len(), 3);
    }

    #[tokio::test]
    async fn test_yield_sink_stamps_run_time() {
        let store = MemoryPriceStore::new();
        let at = Utc.with_ymd_and_hms(2024, 3, 8, 19, 0, 0).unwrap();
        let sink = DividendYieldSink::new(&store, at);
        let info = YieldInfo {
            dividend_yield: dec!(8.2),
            dividend_rate: None,
            currency: "GBP".to_string(),
        };

        sink.store(&symbol(), &info).await.unwrap();

        let stored = store.latest_yield("LGEN").unwrap();
        assert_eq!(stored.observed_at, at);
        assert_eq!(stored.source, SourceTag::Yfinance);
    }

    /// 가격 이력 쓰기만 실패하는 저장소
    struct BrokenHistory(MemoryPriceStore);

    #[async_trait]
    impl PriceStore for BrokenHistory {
        async fn active_symbols(&self) -> Result<Vec<Symbol>> {
            self.0.active_symbols().await
        }
        async fn upsert_historical(&self, _record: &HistoricalPriceRecord) -> Result<()> {
            Err(DataError::QueryError("disk full".to_string()))
        }
        async fn upsert_latest_price(&self, record: &LatestPriceRecord) -> Result<()> {
            self.0.upsert_latest_price(record).await
        }
        async fn upsert_latest_yield(&self, record: &LatestYieldRecord) -> Result<()> {
            self.0.upsert_latest_yield(record).await
        }
        async fn historical_coverage(&self) -> Result<Vec<CoverageRow>> {
            self.0.historical_coverage().await
        }
    }

    #[tokio::test]
    async fn test_daily_close_fails_if_either_write_fails() {
        let store = BrokenHistory(MemoryPriceStore::new());
        let sink = DailyCloseSink::new(&store);

        let result = sink.store(&symbol(), &close(8)).await;

        assert!(result.is_err());
        // 최신가 쓰기는 시도됨
        assert!(store.0.latest_price("LGEN").is_some());
    }
}
