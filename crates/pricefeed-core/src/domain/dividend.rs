//! 배당 수익률 계산.
//!
//! 제공자가 수익률을 직접 주지 않는 ETF 등을 위해 최근 배당 이력으로
//! 수익률을 추정합니다. 최근 4회 지급액을 연간 배당으로 보고 현재가로 나누는
//! 단순 추정치이므로 반기 배당이나 특별 배당 종목에서는 부정확할 수 있습니다.

use rust_decimal::Decimal;

use crate::types::DividendEvent;

/// 저장 가능한 최대 배당 수익률 (%). 이를 넘으면 제공자 데이터 오류로 봅니다.
pub const MAX_PLAUSIBLE_YIELD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// 연환산에 사용하는 최근 지급 횟수
pub const TRAILING_PAYMENTS: usize = 4;

/// 수익률이 `[0, 50]` 구간인지 확인합니다.
pub fn is_plausible_yield(dividend_yield: Decimal) -> bool {
    dividend_yield >= Decimal::ZERO && dividend_yield <= MAX_PLAUSIBLE_YIELD
}

/// 최근 배당 이력으로 (수익률 %, 연간 배당금)을 추정합니다.
///
/// 가격이 0 이하이거나, 이력이 없거나, 배당 합계가 0 이하이거나,
/// 계산 중 Decimal 범위를 넘으면 `None`.
pub fn trailing_yield(dividends: &[DividendEvent], price: Decimal) -> Option<(Decimal, Decimal)> {
    if price <= Decimal::ZERO || dividends.is_empty() {
        return None;
    }

    let mut ordered: Vec<&DividendEvent> = dividends.iter().collect();
    ordered.sort_by_key(|d| d.paid_on);

    let annual = ordered
        .iter()
        .rev()
        .take(TRAILING_PAYMENTS)
        .try_fold(Decimal::ZERO, |acc, d| acc.checked_add(d.amount))?;

    if annual <= Decimal::ZERO {
        return None;
    }

    let dividend_yield = annual
        .checked_div(price)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp(4);
    Some((dividend_yield, annual))
}
