//! 사람이 읽는 실행 기록.
//!
//! 진행 줄과 요약 블록을 모아 두는 값입니다. 실행 함수가 명시적으로 받아서
//! 채우고, 호출자가 표준 출력이나 로그 파일로 넘깁니다.

/// 구분선 폭
const RULE_WIDTH: usize = 60;

/// 실행 기록
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<String>,
    echo: bool,
}

impl Transcript {
    /// 기록하면서 표준 출력에도 즉시 출력합니다.
    pub fn stdout() -> Self {
        Self {
            lines: Vec::new(),
            echo: true,
        }
    }

    /// 출력 없이 기록만 합니다.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: impl Into<String>) {
        let line = line.into();
        if self.echo {
            println!("{}", line);
        }
        self.lines.push(line);
    }

    pub fn blank(&mut self) {
        self.line("");
    }

    pub fn rule(&mut self) {
        self.line("=".repeat(RULE_WIDTH));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 줄바꿈으로 이어 붙인 전체 기록
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_collects_lines_in_order() {
        let mut transcript = Transcript::silent();
        transcript.line("Daily Price Fetcher");
        transcript.rule();
        transcript.blank();
        transcript.line(format!("Found {} active symbols", 3));

        assert_eq!(transcript.lines().len(), 4);
        assert_eq!(transcript.lines()[1].len(), RULE_WIDTH);
        assert_eq!(
            transcript.render(),
            format!(
                "Daily Price Fetcher\n{}\n\nFound 3 active symbols",
                "=".repeat(RULE_WIDTH)
            )
        );
    }
}
