//! # Structured Diff Engine / 结构化差异引擎
//!
//! In-process comparison built on [`line_diff`]. The full variant keeps every
//! line of both files; the reduced variant keeps only the changes and a few
//! lines of context around them.
//!
//! 基于 [`line_diff`] 的进程内比较。完整变体保留两个文件的每一行；
//! 精简变体只保留变化及其周围的几行上下文。

use futures::future::BoxFuture;
use std::path::Path;

use crate::compare::line_diff::{self, DEFAULT_CONTEXT};
use crate::compare::report::{DiffBody, DiffOutcome};
use crate::compare::{DiffEngine, read_file};
use crate::core::error::ComparisonError;

/// Body recorded when the bytes differ but every line compares equal.
pub const LINE_ENDINGS_ONLY: &str = "files differ only in line endings or the trailing newline\n";

/// Body recorded when lines differ only in bytes that are not valid UTF-8.
pub const NOT_VISIBLE_AS_TEXT: &str = "files differ in bytes that are not valid UTF-8 text\n";

#[derive(Debug, Clone, Copy)]
pub struct StructuredDiffEngine {
    /// Context lines kept around changes; `None` keeps everything.
    context: Option<usize>,
}

impl StructuredDiffEngine {
    pub fn full() -> Self {
        Self { context: None }
    }

    pub fn reduced() -> Self {
        Self {
            context: Some(DEFAULT_CONTEXT),
        }
    }

    /// Diffs two in-memory buffers.
    pub fn diff_bytes(&self, produced_bytes: &[u8], reference_bytes: &[u8]) -> DiffOutcome {
        if produced_bytes == reference_bytes {
            return DiffOutcome::Identical;
        }
        let produced = String::from_utf8_lossy(produced_bytes);
        let reference = String::from_utf8_lossy(reference_bytes);
        let produced_lines: Vec<&str> = produced.lines().collect();
        let reference_lines: Vec<&str> = reference.lines().collect();

        let mut lines = line_diff::diff_lines(&reference_lines, &produced_lines);
        if !lines.iter().any(|l| l.is_change()) {
            let body = if raw_lines(produced_bytes) == raw_lines(reference_bytes) {
                LINE_ENDINGS_ONLY
            } else {
                NOT_VISIBLE_AS_TEXT
            };
            return DiffOutcome::Different(DiffBody::Text(body.to_string()));
        }
        if let Some(context) = self.context {
            lines = line_diff::reduce(lines, context);
        }
        DiffOutcome::Different(DiffBody::Lines(lines))
    }
}

/// Splits raw bytes into lines the way `str::lines` does, without decoding.
fn raw_lines(bytes: &[u8]) -> Vec<&[u8]> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect()
}

impl DiffEngine for StructuredDiffEngine {
    fn diff<'a>(
        &'a self,
        produced: &'a Path,
        reference: &'a Path,
    ) -> BoxFuture<'a, Result<DiffOutcome, ComparisonError>> {
        Box::pin(async move {
            let produced_bytes = read_file("produced", produced).await?;
            let reference_bytes = read_file("reference", reference).await?;
            Ok(self.diff_bytes(&produced_bytes, &reference_bytes))
        })
    }
}
