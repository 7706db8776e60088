//! 거래일 종가 수집 모듈.

use chrono::{DateTime, Utc};
use pricefeed_core::trading_day;
use pricefeed_data::{MarketDataProvider, PriceStore};

use super::{load_symbols, write_header, write_summary};
use crate::batch::{run_batch, BatchReport};
use crate::config::DailyCloseConfig;
use crate::lookup::DailyCloseLookup;
use crate::report::Transcript;
use crate::sink::DailyCloseSink;
use crate::Result;

/// 현재 거래일의 종가를 수집해 가격 이력과 최신가 테이블에 기록합니다.
///
/// 목표일은 실행 시작 시 한 번 계산합니다 (주말은 직전 금요일).
pub async fn collect_daily_close<P, S>(
    provider: &P,
    store: &S,
    config: &DailyCloseConfig,
    now: DateTime<Utc>,
    transcript: &mut Transcript,
) -> Result<BatchReport>
where
    P: MarketDataProvider,
    S: PriceStore,
{
    let target_date = trading_day(now.date_naive());
    tracing::info!(
        provider = provider.name(),
        target_date = %target_date,
        "일별 종가 수집 시작"
    );

    write_header(transcript, "Daily Price Fetcher", &now);
    transcript.line(format!(
        "Target date: {} ({})",
        target_date,
        target_date.format("%A")
    ));

    let symbols = load_symbols(store, transcript).await?;
    if symbols.is_empty() {
        return Ok(BatchReport::default());
    }

    let lookup = DailyCloseLookup::new(provider, target_date);
    let sink = DailyCloseSink::new(store);
    let report = run_batch(&symbols, &lookup, &sink, config.request_delay(), transcript).await;

    write_summary(
        transcript,
        &report.summary,
        &[format!("Target date: {}", target_date)],
        &Utc::now(),
    );
    report.summary.log_summary("일별 종가 수집");
    Ok(report)
}
