//! 최신가 수집 모듈.

use chrono::{DateTime, Utc};
use pricefeed_data::{MarketDataProvider, PriceStore};

use super::{load_symbols, write_header, write_summary};
use crate::batch::{run_batch, BatchReport};
use crate::config::LatestPriceConfig;
use crate::lookup::LatestPriceLookup;
use crate::report::Transcript;
use crate::sink::LatestPriceSink;
use crate::Result;

/// 활성 종목의 최신가를 수집해 최신가 테이블에 기록합니다.
pub async fn collect_latest_prices<P, S>(
    provider: &P,
    store: &S,
    config: &LatestPriceConfig,
    now: DateTime<Utc>,
    transcript: &mut Transcript,
) -> Result<BatchReport>
where
    P: MarketDataProvider,
    S: PriceStore,
{
    tracing::info!(provider = provider.name(), "최신가 수집 시작");
    write_header(transcript, "Latest Price Fetcher", &now);

    let symbols = load_symbols(store, transcript).await?;
    if symbols.is_empty() {
        return Ok(BatchReport::default());
    }

    let lookup = LatestPriceLookup::new(provider, now);
    let sink = LatestPriceSink::new(store);
    let report = run_batch(&symbols, &lookup, &sink, config.request_delay(), transcript).await;

    write_summary(transcript, &report.summary, &[], &Utc::now());
    report.summary.log_summary("최신가 수집");
    Ok(report)
}
