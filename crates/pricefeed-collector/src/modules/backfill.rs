//! 과거 가격 백필 모듈.

use chrono::Utc;
use pricefeed_core::DateWindow;
use pricefeed_data::{MarketDataProvider, PriceStore};

use super::{load_symbols, write_header, write_summary};
use crate::batch::{run_batch, BatchReport};
use crate::config::BackfillConfig;
use crate::lookup::BackfillLookup;
use crate::report::Transcript;
use crate::sink::HistoricalSink;
use crate::Result;

/// 구간 내 일별 종가를 모두 가격 이력 테이블에 upsert 합니다.
///
/// 같은 구간으로 다시 실행해도 저장 상태는 동일합니다.
pub async fn backfill_history<P, S>(
    provider: &P,
    store: &S,
    config: &BackfillConfig,
    window: DateWindow,
    transcript: &mut Transcript,
) -> Result<BatchReport>
where
    P: MarketDataProvider,
    S: PriceStore,
{
    tracing::info!(
        provider = provider.name(),
        start_date = %window.start,
        end_date = %window.end,
        "과거 가격 백필 시작"
    );

    write_header(transcript, "Historical Price Fetcher", &Utc::now());
    transcript.line(format!("Date range: {} to {}", window.start, window.end));
    transcript.line(format!("Total days: {}", window.days()));

    let symbols = load_symbols(store, transcript).await?;
    if symbols.is_empty() {
        return Ok(BatchReport::default());
    }

    let lookup = BackfillLookup::new(provider, window);
    let sink = HistoricalSink::new(store);
    let report = run_batch(&symbols, &lookup, &sink, config.request_delay(), transcript).await;

    write_summary(
        transcript,
        &report.summary,
        &[format!("Date range: {} to {}", window.start, window.end)],
        &Utc::now(),
    );
    report.summary.log_summary("과거 가격 백필");
    Ok(report)
}
