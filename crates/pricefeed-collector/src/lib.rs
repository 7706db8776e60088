//! Scheduled price and dividend-yield collector.
//!
//! 활성 종목마다 외부 제공자에서 값을 조회하고 저장소에 upsert 하는
//! 배치 작업들을 제공합니다:
//! - 최신가 수집 (intraday)
//! - 당일(거래일) 종가 수집
//! - 과거 가격 백필
//! - 배당 수익률 수집
//! - 가격 이력 적재 현황 조회

pub mod batch;
pub mod config;
pub mod error;
pub mod lookup;
pub mod modules;
pub mod report;
pub mod run_log;
pub mod runner;
pub mod sink;
pub mod stats;

pub use batch::{run_batch, BatchReport, Lookup, PriceLookup, RecordSink, SymbolOutcome};
pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use report::Transcript;
pub use runner::{exit_code, run_job, Job};
pub use stats::RunSummary;
