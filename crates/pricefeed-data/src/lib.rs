//! 외부 가격 제공자와 가격 저장소.
//!
//! 이 crate는 다음을 제공합니다:
//! - `MarketDataProvider` 트레이트와 Yahoo Finance 구현
//! - `PriceStore` 트레이트와 PostgreSQL / 인메모리 구현

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

pub use provider::{
    Chart, ChartInterval, ChartRequest, ChartSpan, MarketDataProvider, PricePoint, QuoteSnapshot,
    YahooClient, YahooConfig,
};
pub use storage::{
    CoverageRow, Database, DatabaseConfig, MemoryPriceStore, PgPriceStore, PriceStore,
};
