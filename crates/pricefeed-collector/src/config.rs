//! 환경변수 기반 설정 모듈.

use chrono::{Duration as DateDuration, NaiveDate};
use pricefeed_core::DateWindow;
use pricefeed_data::{DatabaseConfig, YahooConfig};
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CollectorError;
use crate::Result;

/// 백필 기본 시작일
const DEFAULT_BACKFILL_START: (i32, u32, u32) = (2015, 6, 26);

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 연결 설정
    pub database: DatabaseConfig,
    /// Yahoo Finance 클라이언트 설정
    pub yahoo: YahooConfig,
    /// 최신가 수집 설정
    pub latest_price: LatestPriceConfig,
    /// 일별 종가 수집 설정
    pub daily_close: DailyCloseConfig,
    /// 과거 가격 백필 설정
    pub backfill: BackfillConfig,
    /// 배당 수익률 수집 설정
    pub dividend_yield: DividendYieldConfig,
}

/// 최신가 수집 설정
#[derive(Debug, Clone)]
pub struct LatestPriceConfig {
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

/// 일별 종가 수집 설정
#[derive(Debug, Clone)]
pub struct DailyCloseConfig {
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
    /// 실행 기록을 앞에 덧붙이는 로그 파일
    pub log_file: PathBuf,
    /// 로그 파일에 유지할 최대 실행 블록 수 (0 = 무제한)
    pub log_max_blocks: usize,
}

/// 과거 가격 백필 설정
#[derive(Debug, Clone)]
pub struct BackfillConfig {
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
    /// 수집 시작 날짜
    pub start_date: NaiveDate,
    /// 수집 종료 날짜 (없으면 어제)
    pub end_date: Option<NaiveDate>,
}

/// 배당 수익률 수집 설정
#[derive(Debug, Clone)]
pub struct DividendYieldConfig {
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드 (`.env` 파일이 있으면 먼저 읽음)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 임의의 key → value 조회 함수로 설정 로드
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_defaults = DatabaseConfig::default();
        let yahoo_defaults = YahooConfig::default();

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL")
                .filter(|v| !v.is_empty())
                .map(SecretString::from),
            host: lookup("DB_HOST").unwrap_or(db_defaults.host),
            port: parse_or(&lookup, "DB_PORT", db_defaults.port),
            name: lookup("DB_NAME").unwrap_or(db_defaults.name),
            user: lookup("DB_USER").unwrap_or(db_defaults.user),
            password: lookup("DB_PASS")
                .map(SecretString::from)
                .unwrap_or(db_defaults.password),
            connect_timeout_secs: parse_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_SECS",
                db_defaults.connect_timeout_secs,
            ),
        };

        let yahoo = YahooConfig {
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "YAHOO_TIMEOUT_SECS",
                yahoo_defaults.timeout.as_secs(),
            )),
        };

        let default_start = NaiveDate::from_ymd_opt(
            DEFAULT_BACKFILL_START.0,
            DEFAULT_BACKFILL_START.1,
            DEFAULT_BACKFILL_START.2,
        )
        .ok_or_else(|| CollectorError::Config("잘못된 기본 백필 시작일".to_string()))?;

        Ok(Self {
            database,
            yahoo,
            latest_price: LatestPriceConfig {
                request_delay_ms: parse_or(&lookup, "LATEST_PRICE_DELAY_MS", 1000),
            },
            daily_close: DailyCloseConfig {
                request_delay_ms: parse_or(&lookup, "DAILY_CLOSE_DELAY_MS", 1000),
                log_file: lookup("DAILY_CLOSE_LOG_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("logs/price_cron_daily.log")),
                log_max_blocks: parse_or(&lookup, "DAILY_CLOSE_LOG_MAX_BLOCKS", 0),
            },
            backfill: BackfillConfig {
                request_delay_ms: parse_or(&lookup, "BACKFILL_DELAY_MS", 2000),
                start_date: parse_date(&lookup, "BACKFILL_START_DATE")?.unwrap_or(default_start),
                end_date: parse_date(&lookup, "BACKFILL_END_DATE")?,
            },
            dividend_yield: DividendYieldConfig {
                request_delay_ms: parse_or(&lookup, "DIVIDEND_YIELD_DELAY_MS", 1000),
            },
        })
    }
}

impl LatestPriceConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl DailyCloseConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// 로그 블록 보존 개수 (무제한이면 `None`)
    pub fn max_blocks(&self) -> Option<usize> {
        (self.log_max_blocks > 0).then_some(self.log_max_blocks)
    }
}

impl BackfillConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// 수집 구간. 종료일이 없으면 `today`의 전날.
    pub fn window(&self, today: NaiveDate) -> DateWindow {
        let end = self
            .end_date
            .unwrap_or_else(|| today - DateDuration::days(1));
        DateWindow::new(self.start_date, end)
    }
}

impl DividendYieldConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// 값을 파싱 (없거나 실패 시 기본값 사용)
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// YYYY-MM-DD 날짜 파싱. 형식이 잘못되면 설정 에러.
fn parse_date<F>(lookup: &F, key: &str) -> Result<Option<NaiveDate>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|e| CollectorError::Config(format!("{} 형식 오류 ({}): {}", key, raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<CollectorConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CollectorConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert!(config.database.url.is_none());
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.name, "investments");
        assert_eq!(config.database.user, "root");
        assert_eq!(config.database.password.expose_secret(), "");
        assert_eq!(config.yahoo.timeout, Duration::from_secs(30));
        assert_eq!(config.latest_price.request_delay(), Duration::from_secs(1));
        assert_eq!(config.backfill.request_delay(), Duration::from_secs(2));
        assert_eq!(
            config.daily_close.log_file,
            PathBuf::from("logs/price_cron_daily.log")
        );
        assert_eq!(config.daily_close.max_blocks(), None);
        assert_eq!(
            config.backfill.start_date,
            NaiveDate::from_ymd_opt(2015, 6, 26).unwrap()
        );
        assert!(config.backfill.end_date.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_PASS", "s3cret"),
            ("DAILY_CLOSE_DELAY_MS", "250"),
            ("DAILY_CLOSE_LOG_MAX_BLOCKS", "30"),
            ("BACKFILL_START_DATE", "2020-01-02"),
            ("BACKFILL_END_DATE", "2020-12-31"),
        ])
        .unwrap();

        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.password.expose_secret(), "s3cret");
        assert_eq!(
            config.daily_close.request_delay(),
            Duration::from_millis(250)
        );
        assert_eq!(config.daily_close.max_blocks(), Some(30));
        assert_eq!(
            config.backfill.end_date,
            NaiveDate::from_ymd_opt(2020, 12, 31)
        );
    }

    #[test]
    fn test_malformed_number_falls_back_to_default() {
        let config = config_from(&[("DB_PORT", "not-a-port")]).unwrap();
        assert_eq!(config.database.port, 5432);
    }

    #[test]
    fn test_malformed_date_is_config_error() {
        let err = config_from(&[("BACKFILL_START_DATE", "26/06/2015")]).unwrap_err();
        assert!(matches!(err, CollectorError::Config(_)));
    }

    #[test]
    fn test_backfill_window_defaults_to_yesterday() {
        let config = config_from(&[]).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let window = config.backfill.window(today);
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2015, 6, 26).unwrap());
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }
}
