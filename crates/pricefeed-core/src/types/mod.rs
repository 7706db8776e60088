//! 수집 파이프라인 전반에서 사용되는 공통 타입.

mod price;
mod record;
mod symbol;

pub use price::*;
pub use record::*;
pub use symbol::*;
