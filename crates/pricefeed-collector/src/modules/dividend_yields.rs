//! 배당 수익률 수집 모듈.

use chrono::{DateTime, Utc};
use pricefeed_data::{MarketDataProvider, PriceStore};

use super::{load_symbols, write_header, write_summary};
use crate::batch::{run_batch, BatchReport};
use crate::config::DividendYieldConfig;
use crate::lookup::DividendYieldLookup;
use crate::report::Transcript;
use crate::sink::DividendYieldSink;
use crate::Result;

/// 활성 종목의 배당 수익률을 수집해 수익률 테이블에 기록합니다.
pub async fn collect_dividend_yields<P, S>(
    provider: &P,
    store: &S,
    config: &DividendYieldConfig,
    now: DateTime<Utc>,
    transcript: &mut Transcript,
) -> Result<BatchReport>
where
    P: MarketDataProvider,
    S: PriceStore,
{
    tracing::info!(provider = provider.name(), "배당 수익률 수집 시작");
    write_header(transcript, "Dividend Yield Fetcher", &now);

    let symbols = load_symbols(store, transcript).await?;
    if symbols.is_empty() {
        return Ok(BatchReport::default());
    }

    let lookup = DividendYieldLookup::new(provider);
    let sink = DividendYieldSink::new(store, now);
    let report = run_batch(&symbols, &lookup, &sink, config.request_delay(), transcript).await;

    write_summary(transcript, &report.summary, &[], &Utc::now());
    report.summary.log_summary("배당 수익률 수집");
    Ok(report)
}
