//! # Report Accumulator Module / 报告累加器模块
//!
//! The per-run accumulator every worker appends to. All mutation goes through
//! one mutex; the critical section is a single `Vec::push`, never an await.
//!
//! 每个工作者都会追加内容的单次运行累加器。所有修改都经过同一个互斥锁；
//! 临界区只是一次 `Vec::push`，从不包含 await。

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::compare::line_diff::{self, DiffLine};
use crate::core::models::CompareData;

/// Body of a detected difference.
/// 检测到的差异内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffBody {
    /// Literal output of an external diff tool.
    Text(String),
    /// Structured lines from the in-process diff.
    Lines(Vec<DiffLine>),
}

impl DiffBody {
    pub fn to_text(&self) -> String {
        match self {
            DiffBody::Text(text) => text.clone(),
            DiffBody::Lines(lines) => line_diff::render_text(lines),
        }
    }
}

/// Verdict of one comparison.
/// 单次比较的结论。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    Identical,
    Different(DiffBody),
}

impl DiffOutcome {
    pub fn is_identical(&self) -> bool {
        matches!(self, DiffOutcome::Identical)
    }
}

/// One entry's contribution to the report.
/// 单个条目对报告的贡献。
#[derive(Debug, Clone)]
pub struct ComparisonRecord {
    pub sample_file: PathBuf,
    pub produced_file: PathBuf,
    pub reference_file: PathBuf,
    pub command: String,
    pub runtime: Duration,
    pub outcome: DiffOutcome,
}

impl ComparisonRecord {
    pub fn new(data: &CompareData, outcome: DiffOutcome) -> Self {
        Self {
            sample_file: data.sample_file.clone(),
            produced_file: data.produced_file.clone(),
            reference_file: data.reference_file.clone(),
            command: data.command.clone(),
            runtime: data.runtime,
            outcome,
        }
    }
}

#[derive(Debug, Default)]
struct ReportBody {
    records: Vec<ComparisonRecord>,
    diagnostics: Vec<String>,
}

/// Thread-safe, append-only report accumulator.
/// 线程安全、只追加的报告累加器。
#[derive(Debug, Default)]
pub struct Report {
    body: Mutex<ReportBody>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    // Poison is ignored: every critical section is a single push or clone.
    fn lock(&self) -> MutexGuard<'_, ReportBody> {
        self.body.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, record: ComparisonRecord) {
        self.lock().records.push(record);
    }

    /// Appends free-form diagnostic text.
    pub fn note(&self, text: impl Into<String>) {
        self.lock().diagnostics.push(text.into());
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies out the records accumulated so far, in append order.
    pub fn records(&self) -> Vec<ComparisonRecord> {
        self.lock().records.clone()
    }

    pub fn diagnostics(&self) -> Vec<String> {
        self.lock().diagnostics.clone()
    }
}
