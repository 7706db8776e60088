//! Scheduled price collector CLI.

use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use pricefeed_collector::{
    exit_code, run_job, run_log, BatchReport, CollectorConfig, CollectorError, Job, Transcript,
};
use pricefeed_data::{Database, PgPriceStore, YahooClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pricefeed-collector")]
#[command(about = "Price and dividend-yield collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// 최신가 수집 (intraday)
    LatestPrices,

    /// 현재 거래일 종가 수집 (가격 이력 + 최신가)
    DailyClose,

    /// 과거 가격 백필 (BACKFILL_START_DATE ~ BACKFILL_END_DATE)
    Backfill,

    /// 배당 수익률 수집
    DividendYields,

    /// 가격 이력 적재 현황 출력
    Coverage,
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "pricefeed_collector={lvl},pricefeed_data={lvl}",
            lvl = log_level
        )
        .into()
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // 표준 출력은 실행 기록 전용
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

impl From<Commands> for Job {
    fn from(command: Commands) -> Self {
        match command {
            Commands::LatestPrices => Job::LatestPrices,
            Commands::DailyClose => Job::DailyClose,
            Commands::Backfill => Job::Backfill,
            Commands::DividendYields => Job::DividendYields,
            Commands::Coverage => Job::Coverage,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    tracing::info!("PriceFeed Collector 시작");

    let config = match CollectorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("[ERROR] {}", e);
            tracing::error!(error = %e, "설정 로드 실패");
            return ExitCode::FAILURE;
        }
    };

    let job = Job::from(cli.command);
    let mut transcript = Transcript::stdout();
    let result = run(job, &config, &mut transcript).await;

    // 일별 종가 작업은 치명적 오류가 나도 기록을 남김
    if job.keeps_run_log() && !transcript.is_empty() {
        let path = &config.daily_close.log_file;
        if let Err(e) =
            run_log::prepend_block(path, &transcript.render(), config.daily_close.max_blocks())
                .await
        {
            println!("[ERROR] Failed to write to log file {}: {}", path.display(), e);
            tracing::warn!(path = %path.display(), error = %e, "실행 기록 저장 실패");
        }
    }

    if let Err(e) = &result {
        tracing::error!(error = %e, "수집 중단");
    }
    ExitCode::from(exit_code(&result))
}

/// PostgreSQL과 Yahoo 클라이언트를 연결해 작업을 실행합니다.
async fn run(
    job: Job,
    config: &CollectorConfig,
    transcript: &mut Transcript,
) -> Result<Option<BatchReport>, CollectorError> {
    let database = match Database::connect(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            let err = CollectorError::from(e);
            transcript.line(format!("[ERROR] {}", err));
            return Err(err);
        }
    };
    tracing::info!(database = %config.database.describe(), "데이터베이스 연결 성공");

    let store = PgPriceStore::from_database(&database);
    let result = match YahooClient::new(&config.yahoo) {
        Ok(provider) => run_job(job, &provider, &store, config, Utc::now(), transcript).await,
        Err(e) => Err(e.into()),
    };

    database.close().await;
    result
}
