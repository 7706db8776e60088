//! 단순화된 거래일 캘린더.
//!
//! 공휴일은 고려하지 않습니다. 주말만 직전 금요일로 되돌립니다.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::DailyClose;

/// 주어진 날짜의 거래일을 반환합니다.
///
/// 토요일과 일요일은 직전 금요일, 평일은 그대로입니다.
pub fn trading_day(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date - Duration::days(2),
        _ => date,
    }
}

/// 양 끝을 포함하는 날짜 구간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// 구간 포함 여부
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// 구간의 일수 (양 끝 포함). 역전된 구간은 0.
    pub fn days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }
}

/// 구간 밖의 종가를 걸러냅니다. 입력 순서는 유지됩니다.
pub fn filter_window(series: Vec<DailyClose>, window: &DateWindow) -> Vec<DailyClose> {
    series
        .into_iter()
        .filter(|close| window.contains(close.trade_date))
        .collect()
}
