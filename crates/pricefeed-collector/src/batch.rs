//! 종목별 조회 → upsert 배치 드라이버.
//!
//! 네 가지 수집 작업이 공유하는 루프입니다. 작업마다 조회 전략
//! (`PriceLookup`)과 저장 전략(`RecordSink`)만 다릅니다.
//!
//! 종목별 상태: `Pending → Stored | WriteFailed | Absent | FetchFailed`.
//! 모든 상태는 종료 상태이며 재시도하지 않습니다. 한 종목의 실패로
//! 배치가 중단되지 않습니다.

use async_trait::async_trait;
use pricefeed_core::Symbol;
use pricefeed_data::DataError;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::report::Transcript;
use crate::stats::RunSummary;

/// 조회 결과.
#[derive(Debug)]
pub enum Lookup<T> {
    /// 저장할 값
    Value(T),
    /// 데이터 없음 (사유). 오류가 아닌 정상 결과입니다.
    Absent(String),
    /// 조회 실패
    Failed(DataError),
}

/// 종목 하나의 값을 외부 제공자에서 조회하는 전략.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    type Value: Send + Sync;

    async fn lookup(&self, symbol: &Symbol) -> Lookup<Self::Value>;

    /// 저장 성공 줄에 표시할 값 설명
    fn describe(&self, symbol: &Symbol, value: &Self::Value) -> String;
}

/// 조회한 값을 저장소에 기록하는 전략.
#[async_trait]
pub trait RecordSink<V: Send + Sync>: Send + Sync {
    /// upsert 후 기록한 레코드 수를 반환합니다.
    async fn store(&self, symbol: &Symbol, value: &V) -> pricefeed_data::Result<usize>;
}

/// 종목별 최종 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolOutcome {
    Stored { rows: usize },
    Absent,
    FetchFailed,
    WriteFailed,
}

/// 배치 실행 결과.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub summary: RunSummary,
    /// 입력 순서대로의 (ticker, 결과)
    pub outcomes: Vec<(String, SymbolOutcome)>,
}

/// 심볼 목록을 순서대로 처리합니다.
///
/// 마지막 종목을 제외한 각 종목 뒤에 `pace` 만큼 대기합니다.
pub async fn run_batch<L, S>(
    symbols: &[Symbol],
    lookup: &L,
    sink: &S,
    pace: Duration,
    transcript: &mut Transcript,
) -> BatchReport
where
    L: PriceLookup,
    S: RecordSink<L::Value>,
{
    let start = Instant::now();
    let total = symbols.len();
    let mut report = BatchReport {
        summary: RunSummary::new(),
        outcomes: Vec::with_capacity(total),
    };

    for (idx, symbol) in symbols.iter().enumerate() {
        transcript.line(format!("[{}/{}] Processing {}...", idx + 1, total, symbol));

        let outcome = process_symbol(symbol, lookup, sink, transcript).await;

        report.summary.record(outcome);
        report.outcomes.push((symbol.ticker.clone(), outcome));

        if idx + 1 < total && !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }
    }

    report.summary.elapsed = start.elapsed();
    report
}

async fn process_symbol<L, S>(
    symbol: &Symbol,
    lookup: &L,
    sink: &S,
    transcript: &mut Transcript,
) -> SymbolOutcome
where
    L: PriceLookup,
    S: RecordSink<L::Value>,
{
    let value = match lookup.lookup(symbol).await {
        Lookup::Value(value) => value,
        Lookup::Absent(reason) => {
            transcript.line(format!("  [MISS] {}", reason));
            debug!(ticker = %symbol.ticker, symbol = %symbol.external_symbol, reason = %reason, "데이터 없음");
            return SymbolOutcome::Absent;
        }
        Lookup::Failed(e) => {
            transcript.line(format!("  [ERROR] Fetch failed: {}", e));
            error!(ticker = %symbol.ticker, symbol = %symbol.external_symbol, error = %e, "조회 실패");
            return SymbolOutcome::FetchFailed;
        }
    };

    match sink.store(symbol, &value).await {
        Ok(rows) => {
            let detail = lookup.describe(symbol, &value);
            transcript.line(format!("  [OK] {}", detail));
            info!(ticker = %symbol.ticker, rows, detail = %detail, "저장 완료");
            SymbolOutcome::Stored { rows }
        }
        Err(e) => {
            transcript.line(format!("  [ERROR] Failed to store data: {}", e));
            error!(ticker = %symbol.ticker, symbol = %symbol.external_symbol, error = %e, "저장 실패");
            SymbolOutcome::WriteFailed
        }
    }
}
