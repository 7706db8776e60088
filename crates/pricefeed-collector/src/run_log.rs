//! 실행 기록을 로그 파일 앞에 덧붙이는 기록기.
//!
//! 최신 실행 블록이 파일 맨 앞에 오며, 블록 사이는 빈 줄 두 개로 구분됩니다.
//! 블록 안의 연속된 빈 줄은 하나로 줄여 기록하므로 구분자와 겹치지 않습니다.

use std::io;
use std::path::Path;

/// 블록 구분자
pub const BLOCK_SEPARATOR: &str = "\n\n\n";

/// `block`을 `path` 파일의 맨 앞에 기록합니다.
///
/// 상위 디렉터리가 없으면 생성합니다. `max_blocks`가 주어지면 최신 블록부터
/// 그 개수만 남깁니다.
pub async fn prepend_block(path: &Path, block: &str, max_blocks: Option<usize>) -> io::Result<()> {
    let block = normalize_block(block);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let existing = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    let mut content = String::with_capacity(block.len() + BLOCK_SEPARATOR.len() + existing.len());
    content.push_str(&block);
    if !existing.is_empty() {
        content.push_str(BLOCK_SEPARATOR);
        content.push_str(&existing);
    }

    if let Some(max) = max_blocks {
        content = content
            .split(BLOCK_SEPARATOR)
            .take(max.max(1))
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR);
    }

    tokio::fs::write(path, content).await
}

/// 앞뒤 빈 줄을 없애고 연속된 빈 줄을 하나로 줄입니다.
fn normalize_block(block: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in block.lines() {
        if line.trim().is_empty() {
            if lines.last().is_some_and(|last| !last.is_empty()) {
                lines.push("");
            }
        } else {
            lines.push(line);
        }
    }
    if lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
