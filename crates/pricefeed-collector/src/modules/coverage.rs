//! 가격 이력 적재 현황 조회 모듈.

use pricefeed_data::{CoverageRow, PriceStore};

use crate::report::Transcript;
use crate::Result;

/// 활성 종목별 가격 이력 건수와 기간을 출력합니다.
pub async fn report_coverage<S: PriceStore>(
    store: &S,
    transcript: &mut Transcript,
) -> Result<Vec<CoverageRow>> {
    let rows = store.historical_coverage().await?;

    transcript.line("=== Historical Price Coverage ===");
    transcript.blank();

    if rows.is_empty() {
        transcript.line("No active symbols found.");
        return Ok(rows);
    }

    for row in &rows {
        let range = match (row.first_date, row.last_date) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "no data".to_string(),
        };
        transcript.line(format!("{:<10} {:>6} records ({})", row.ticker, row.records, range));
    }

    let total: i64 = rows.iter().map(|r| r.records).sum();
    let empty = rows.iter().filter(|r| r.records == 0).count();
    let earliest = rows.iter().filter_map(|r| r.first_date).min();
    let latest = rows.iter().filter_map(|r| r.last_date).max();

    transcript.blank();
    transcript.line("=== Summary ===");
    transcript.line(format!("Symbols: {}", rows.len()));
    transcript.line(format!("Symbols without history: {}", empty));
    transcript.line(format!("Total records: {}", total));
    transcript.line(format!(
        "Earliest date: {}",
        earliest.map_or_else(|| "N/A".to_string(), |d| d.to_string())
    ));
    transcript.line(format!(
        "Latest date: {}",
        latest.map_or_else(|| "N/A".to_string(), |d| d.to_string())
    ));

    tracing::info!(symbols = rows.len(), total_records = total, "적재 현황 조회 완료");
    Ok(rows)
}
