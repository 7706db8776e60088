//! 실행 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::batch::SymbolOutcome;

/// 배치 실행 통계
///
/// 모든 종목은 정확히 하나의 분류로 집계됩니다:
/// `succeeded + missing + failed == total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// 처리한 종목 수
    pub total: usize,
    /// 저장 성공
    pub succeeded: usize,
    /// 데이터 없음 (정상 케이스)
    pub missing: usize,
    /// 조회 또는 저장 실패
    pub failed: usize,
    /// 저장된 총 레코드 수
    pub rows_written: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunSummary {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 종목 하나의 결과를 집계합니다.
    pub fn record(&mut self, outcome: SymbolOutcome) {
        self.total += 1;
        match outcome {
            SymbolOutcome::Stored { rows } => {
                self.succeeded += 1;
                self.rows_written += rows;
            }
            SymbolOutcome::Absent => self.missing += 1,
            SymbolOutcome::FetchFailed | SymbolOutcome::WriteFailed => self.failed += 1,
        }
    }

    /// 실패한 종목이 있는지 여부 (프로세스 종료 코드 결정)
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            succeeded = self.succeeded,
            missing = self.missing,
            failed = self.failed,
            rows_written = self.rows_written,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "수집 완료"
        );
    }
}
