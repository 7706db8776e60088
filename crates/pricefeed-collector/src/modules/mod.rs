//! 수집 작업 모듈.
//!
//! 각 작업은 제공자와 저장소를 받아 실행 기록(`Transcript`)을 채우고
//! 배치 결과를 반환합니다. 치명적 오류만 `Err`로 전파됩니다.

pub mod backfill;
pub mod coverage;
pub mod daily_close;
pub mod dividend_yields;
pub mod latest_prices;

pub use backfill::backfill_history;
pub use coverage::report_coverage;
pub use daily_close::collect_daily_close;
pub use dividend_yields::collect_dividend_yields;
pub use latest_prices::collect_latest_prices;

use chrono::{DateTime, Utc};
use pricefeed_core::Symbol;
use pricefeed_data::PriceStore;

use crate::report::Transcript;
use crate::stats::RunSummary;
use crate::Result;

pub(crate) fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 제목과 시작 시각 출력
pub(crate) fn write_header(transcript: &mut Transcript, title: &str, started_at: &DateTime<Utc>) {
    transcript.line(format!("{} - {}", title, timestamp(started_at)));
    transcript.rule();
}

/// 활성 심볼 로드. 실패는 치명적 오류입니다.
///
/// 빈 목록이면 안내 줄을 남기고 빈 Vec을 반환합니다.
pub(crate) async fn load_symbols<S: PriceStore>(
    store: &S,
    transcript: &mut Transcript,
) -> Result<Vec<Symbol>> {
    let symbols = match store.active_symbols().await {
        Ok(symbols) => symbols,
        Err(e) => {
            transcript.line(format!("[ERROR] Failed to fetch symbols: {}", e));
            tracing::error!(error = %e, "활성 심볼 조회 실패");
            return Err(e.into());
        }
    };

    if symbols.is_empty() {
        transcript.line("No active symbols found; exiting.");
        tracing::warn!("수집할 심볼이 없습니다");
        return Ok(symbols);
    }

    transcript.line(format!("Found {} active symbols", symbols.len()));
    transcript.blank();
    tracing::info!(count = symbols.len(), "활성 심볼 조회 완료");
    Ok(symbols)
}

/// 요약 블록 출력. `details`는 작업별 추가 줄입니다.
pub(crate) fn write_summary(
    transcript: &mut Transcript,
    summary: &RunSummary,
    details: &[String],
    finished_at: &DateTime<Utc>,
) {
    transcript.blank();
    transcript.rule();
    transcript.line("SUMMARY");
    for detail in details {
        transcript.line(detail.as_str());
    }
    transcript.line(format!(
        "Symbols processed: {}/{}",
        summary.succeeded + summary.missing + summary.failed,
        summary.total
    ));
    transcript.line(format!("Successful: {}", summary.succeeded));
    transcript.line(format!("No data: {}", summary.missing));
    transcript.line(format!("Failed: {}", summary.failed));
    transcript.line(format!("Records written: {}", summary.rows_written));
    transcript.line(format!("Completed at: {} UTC", timestamp(finished_at)));
}
