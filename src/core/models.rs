//! # Data Models Module / 数据模型模块
//!
//! This module defines the data structures that flow through a regression run:
//! catalog entries, the result of one tool invocation, the comparator's input
//! contract, report metadata and per-entry outcomes.
//!
//! 此模块定义回归运行中流转的数据结构：目录条目、单次工具调用的结果、
//! 比较器的输入契约、报告元数据以及每个条目的结果。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::error::HarnessError;
use std::time::Duration;

/// One immutable catalog record: a sample input, the tool flags to run it
/// with, and the known-good output it must reproduce.
///
/// 一条不可变的目录记录：样本输入、运行它所用的工具参数，以及它必须复现的已知正确输出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEntry {
    /// Sample path, relative to the sample root / 相对于样本根目录的样本路径
    pub sample_file: String,
    /// Tool flags; I/O paths are added at run time / 工具参数；I/O 路径在运行时添加
    #[serde(default)]
    pub command: String,
    /// Reference path, relative to the reference root / 相对于参考根目录的参考路径
    pub expected_result_file: String,
}

impl TestEntry {
    pub fn new(
        sample_file: impl Into<String>,
        command: impl Into<String>,
        expected_result_file: impl Into<String>,
    ) -> Self {
        Self {
            sample_file: sample_file.into(),
            command: command.into(),
            expected_result_file: expected_result_file.into(),
        }
    }
}

/// How the external process ended.
/// 外部进程的结束方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The process exited on its own with this code.
    Exited(i32),
    /// The process was terminated by a signal it did not ask for.
    Signalled,
    /// The harness killed it after the configured timeout.
    TimedOut,
    /// The harness killed it because the run was cancelled.
    Cancelled,
}

/// Result of a single external tool invocation.
/// 单次外部工具调用的结果。
#[derive(Debug, Clone)]
pub struct RunData {
    pub termination: Termination,
    /// Wall-clock time from spawn until exit / 从启动到退出的挂钟时间
    pub runtime: Duration,
    /// Captured stdout lines, in emission order / 按输出顺序捕获的 stdout 行
    pub stdout: Vec<String>,
    /// Captured stderr lines, in emission order / 按输出顺序捕获的 stderr 行
    pub stderr: Vec<String>,
}

impl RunData {
    /// The exit code, if the process exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self.termination {
            Termination::Exited(code) => Some(code),
            _ => None,
        }
    }

    pub fn success(&self) -> bool {
        self.termination == Termination::Exited(0)
    }
}

/// Everything a comparator needs to judge one entry.
/// 比较器判断一个条目所需的全部信息。
#[derive(Debug, Clone)]
pub struct CompareData {
    pub produced_file: PathBuf,
    pub reference_file: PathBuf,
    pub sample_file: PathBuf,
    pub command: String,
    pub runtime: Duration,
}

/// Identity metadata written into the report header.
/// 写入报告头部的身份元数据。
#[derive(Debug, Clone, Serialize)]
pub struct ResultData {
    pub tool_path: PathBuf,
    pub tool_version: String,
    pub harness_version: String,
    pub generated_at: DateTime<Local>,
    pub total_runtime: Duration,
    pub total_entries: usize,
    pub compared_entries: usize,
}

impl ResultData {
    /// The single identity line every report starts with.
    pub fn header_line(&self) -> String {
        let tool_name = self
            .tool_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.tool_path.display().to_string());
        format!(
            "{} version {} | report generated {} by media-regress {}",
            tool_name,
            self.tool_version,
            self.generated_at.format("%Y-%m-%d %H:%M:%S"),
            self.harness_version
        )
    }
}

/// Final classification of one entry.
/// 单个条目的最终分类。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// Produced output matched the reference byte for byte.
    Identical,
    /// Produced output differs; the diff is in the report.
    Different,
    /// The comparator could not judge the entry.
    ComparisonFailed(String),
    /// The tool exited non-zero (`None` when killed by a signal).
    ToolFailed { exit_code: Option<i32> },
    TimedOut,
    LaunchFailed(String),
    Cancelled,
    /// The worker task itself panicked.
    Crashed(String),
}

impl EntryStatus {
    /// Whether this entry contributed a record to the report.
    pub fn is_compared(&self) -> bool {
        matches!(self, EntryStatus::Identical | EntryStatus::Different)
    }

    pub fn is_identical(&self) -> bool {
        matches!(self, EntryStatus::Identical)
    }

    /// Stable short label used in summaries and logs.
    pub fn label(&self) -> &'static str {
        match self {
            EntryStatus::Identical => "identical",
            EntryStatus::Different => "different",
            EntryStatus::ComparisonFailed(_) => "comparison-failed",
            EntryStatus::ToolFailed { .. } => "tool-failed",
            EntryStatus::TimedOut => "timed-out",
            EntryStatus::LaunchFailed(_) => "launch-failed",
            EntryStatus::Cancelled => "cancelled",
            EntryStatus::Crashed(_) => "crashed",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::ToolFailed {
                exit_code: Some(code),
            } => write!(f, "{} (exit code {})", self.label(), code),
            EntryStatus::ComparisonFailed(msg)
            | EntryStatus::LaunchFailed(msg)
            | EntryStatus::Crashed(msg) => write!(f, "{}: {}", self.label(), msg),
            _ => f.write_str(self.label()),
        }
    }
}

/// The outcome of processing one catalog entry. Exactly one is produced per
/// dispatched entry.
///
/// 处理单个目录条目的结果。每个被派发的条目恰好产生一个。
#[derive(Debug, Clone)]
pub struct EntryResult {
    /// Position of the entry in the full catalog / 条目在完整目录中的位置
    pub index: usize,
    pub entry: TestEntry,
    /// Tool runtime; zero when the tool never ran / 工具运行时间；未运行时为零
    pub runtime: Duration,
    pub status: EntryStatus,
}

/// Everything a finished run reports back to its caller.
/// 运行完成后返回给调用者的全部信息。
#[derive(Debug)]
pub struct RunSummary {
    /// One result per dispatched entry. Catalog order in sequential mode,
    /// completion order otherwise.
    pub results: Vec<EntryResult>,
    pub total_runtime: Duration,
    /// Where the report was written. A save failure leaves every result above
    /// intact.
    pub report: Result<PathBuf, HarnessError>,
    pub result_data: ResultData,
}

impl RunSummary {
    pub fn report_path(&self) -> Option<&Path> {
        self.report.as_ref().ok().map(PathBuf::as_path)
    }

    pub fn count(&self, predicate: impl Fn(&EntryStatus) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.status)).count()
    }

    pub fn compared(&self) -> usize {
        self.count(EntryStatus::is_compared)
    }

    pub fn all_identical(&self) -> bool {
        self.results.iter().all(|r| r.status.is_identical())
    }
}
