//! 가격 수집을 위한 도메인 로직.

mod calendar;
mod dividend;

pub use calendar::*;
pub use dividend::*;
