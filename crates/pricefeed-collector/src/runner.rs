//! 작업 실행과 종료 코드 결정.

use chrono::{DateTime, Utc};
use pricefeed_data::{MarketDataProvider, PriceStore};

use crate::batch::BatchReport;
use crate::config::CollectorConfig;
use crate::modules;
use crate::report::Transcript;
use crate::Result;

/// 실행할 수집 작업.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    LatestPrices,
    DailyClose,
    Backfill,
    DividendYields,
    Coverage,
}

impl Job {
    /// 실행 기록을 로그 파일에 남기는 작업인지 여부
    pub fn keeps_run_log(&self) -> bool {
        matches!(self, Self::DailyClose)
    }
}

/// 작업을 실행합니다. 종목 배치가 없는 작업(`Coverage`)은 `Ok(None)`.
pub async fn run_job<P, S>(
    job: Job,
    provider: &P,
    store: &S,
    config: &CollectorConfig,
    now: DateTime<Utc>,
    transcript: &mut Transcript,
) -> Result<Option<BatchReport>>
where
    P: MarketDataProvider,
    S: PriceStore,
{
    let report = match job {
        Job::LatestPrices => {
            modules::collect_latest_prices(provider, store, &config.latest_price, now, transcript)
                .await?
        }
        Job::DailyClose => {
            modules::collect_daily_close(provider, store, &config.daily_close, now, transcript)
                .await?
        }
        Job::Backfill => {
            let window = config.backfill.window(now.date_naive());
            modules::backfill_history(provider, store, &config.backfill, window, transcript)
                .await?
        }
        Job::DividendYields => {
            modules::collect_dividend_yields(
                provider,
                store,
                &config.dividend_yield,
                now,
                transcript,
            )
            .await?
        }
        Job::Coverage => {
            modules::report_coverage(store, transcript).await?;
            return Ok(None);
        }
    };

    Ok(Some(report))
}

/// 프로세스 종료 코드. 치명적 오류나 실패 종목이 있으면 1, 그 외(결측 포함) 0.
pub fn exit_code(result: &Result<Option<BatchReport>>) -> u8 {
    match result {
        Ok(Some(report)) if report.summary.has_failures() => 1,
        Ok(_) => 0,
        Err(_) => 1,
    }
}
