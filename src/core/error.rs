//! # Error Taxonomy Module / 错误分类模块
//!
//! Typed errors for every failure class the harness distinguishes. Fatal
//! classes (`ConfigError`, `CatalogError`, report persistence) bubble up
//! through [`HarnessError`]; per-entry classes (`LaunchError`,
//! `ComparisonError`) are absorbed at the work-item boundary.
//!
//! 框架所区分的每种失败类型的类型化错误。致命错误通过 [`HarnessError`] 向上传播；
//! 单条目错误在工作项边界被吸收。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems detected before any entry is dispatched.
/// 在派发任何条目之前检测到的配置问题。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{0}`")]
    MissingKey(&'static str),

    #[error("invalid value `{value}` for setting `{key}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("external tool not found at {0}")]
    ToolNotFound(PathBuf),

    #[error("external tool at {0} is not an executable file")]
    ToolNotExecutable(PathBuf),

    #[error("external tool at {path} cannot be launched")]
    ToolNotLaunchable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("sample root {0} does not exist or is not a directory")]
    SampleRootMissing(PathBuf),

    #[error("report folder {path} is not writable")]
    ReportFolderNotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown comparator `{0}` (expected one of: {1})")]
    UnknownComparator(String, String),

    #[error("failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Problems with the persisted test catalog.
/// 持久化测试目录的问题。
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse catalog {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("catalog entry #{index} is invalid: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error("unsupported catalog format for {0} (use .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("failed to write catalog {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize catalog: {0}")]
    Serialize(String),
}

/// The external tool could not be started.
/// 外部工具无法启动。
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to parse command line `{0}`")]
    BadCommandLine(String),

    #[error("failed to launch {program}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to capture {0} of the external tool")]
    Capture(&'static str),
}

/// A single entry's comparison could not be completed.
/// 单个条目的比较无法完成。
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("cannot read {role} file {path}")]
    Unreadable {
        role: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch diff tool `{program}`")]
    DiffToolLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("diff tool `{program}` failed with status {status}: {stderr}")]
    DiffToolFailed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Run-level failure returned by the orchestrator.
/// 编排器返回的运行级失败。
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("failed to persist report to {path}")]
    ReportPersistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while {action}")]
    Io {
        action: String,
        #[source]
        source: io::Error,
    },
}

impl HarnessError {
    /// Whether the failure happened while persisting the final report, after
    /// all comparisons already completed.
    pub fn is_report_persistence(&self) -> bool {
        matches!(self, HarnessError::ReportPersistence { .. })
    }
}
