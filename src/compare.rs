//! # Comparison Module / 比较模块
//!
//! The comparison strategy contract shared by every comparator variant, the
//! report accumulator behind it, and the registry that maps a settings key to
//! a concrete variant.
//!
//! Variants differ only in their [`DiffEngine`]; accumulation and report
//! persistence live in [`Comparator`] and are identical for all of them.
//!
//! 所有比较器变体共享的比较策略契约、其背后的报告累加器，以及将设置键映射到具体变体的注册表。
//! 各变体仅在 [`DiffEngine`] 上不同；累加和报告持久化都在 [`Comparator`] 中，对所有变体相同。

pub mod diff_tool;
pub mod line_diff;
pub mod report;
pub mod structured;

use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::core::config::RunConfig;
use crate::core::error::{ComparisonError, HarnessError};
use crate::core::models::{CompareData, ResultData};
use crate::infra;
use crate::reporting;

pub use diff_tool::DiffToolEngine;
pub use report::{ComparisonRecord, DiffBody, DiffOutcome, Report};
pub use structured::StructuredDiffEngine;

/// The capability the orchestrator and work items see.
/// 编排器和工作项所看到的能力。
pub trait ComparisonStrategy: Send + Sync {
    /// Compares `data.produced_file` with `data.reference_file` and appends
    /// exactly one record to the shared report on success.
    ///
    /// 比较生成文件与参考文件，成功时向共享报告追加恰好一条记录。
    fn compare_and_accumulate<'a>(
        &'a self,
        data: &'a CompareData,
    ) -> BoxFuture<'a, Result<DiffOutcome, ComparisonError>>;

    /// A time-based file name for this run's report.
    fn report_file_name(&self) -> String;

    /// Writes the header and accumulated body into `folder`, returning the
    /// path of the written file.
    ///
    /// 将头部和累积的内容写入 `folder`，返回所写文件的路径。
    fn save_report(&self, folder: &Path, meta: &ResultData) -> Result<PathBuf, HarnessError>;

    /// The shared accumulator.
    fn report(&self) -> &Report;
}

/// A diffing mechanism.
/// 一种差异比较机制。
pub trait DiffEngine: Send + Sync {
    fn diff<'a>(
        &'a self,
        produced: &'a Path,
        reference: &'a Path,
    ) -> BoxFuture<'a, Result<DiffOutcome, ComparisonError>>;
}

/// How a comparator persists its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Html,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Html => "html",
        }
    }
}

/// The fixed set of comparator variants.
/// 比较器变体的固定集合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComparatorKind {
    /// Shell out to a line-diff utility; text report.
    DiffTool,
    /// In-process full diff; HTML report.
    #[default]
    Structured,
    /// In-process diff reduced to changes with context; HTML report.
    Reduced,
}

static REGISTRY: Lazy<BTreeMap<&'static str, ComparatorKind>> = Lazy::new(|| {
    BTreeMap::from([
        ("difftool", ComparatorKind::DiffTool),
        ("diff", ComparatorKind::DiffTool),
        ("structured", ComparatorKind::Structured),
        ("diffplex", ComparatorKind::Structured),
        ("reduced", ComparatorKind::Reduced),
        ("diffplex-reduced", ComparatorKind::Reduced),
    ])
});

impl ComparatorKind {
    /// Canonical settings key.
    pub fn key(self) -> &'static str {
        match self {
            ComparatorKind::DiffTool => "difftool",
            ComparatorKind::Structured => "structured",
            ComparatorKind::Reduced => "reduced",
        }
    }

    pub fn report_format(self) -> ReportFormat {
        match self {
            ComparatorKind::DiffTool => ReportFormat::Text,
            ComparatorKind::Structured | ComparatorKind::Reduced => ReportFormat::Html,
        }
    }

    /// Every accepted settings key, aliases included.
    pub fn accepted_keys() -> Vec<&'static str> {
        REGISTRY.keys().copied().collect()
    }

    /// Constructs a fresh comparator with an empty report.
    /// 构造一个带空报告的新比较器。
    pub fn build(self, config: &RunConfig) -> Arc<dyn ComparisonStrategy> {
        match self {
            ComparatorKind::DiffTool => Arc::new(Comparator::new(
                self,
                DiffToolEngine::new(&config.diff_tool),
            )),
            ComparatorKind::Structured => {
                Arc::new(Comparator::new(self, StructuredDiffEngine::full()))
            }
            ComparatorKind::Reduced => {
                Arc::new(Comparator::new(self, StructuredDiffEngine::reduced()))
            }
        }
    }
}

impl FromStr for ComparatorKind {
    type Err = crate::core::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        REGISTRY.get(key.as_str()).copied().ok_or_else(|| {
            crate::core::error::ConfigError::UnknownComparator(
                s.to_string(),
                Self::accepted_keys().join(", "),
            )
        })
    }
}

impl fmt::Display for ComparatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The standard comparator: one diff engine plus one shared report.
/// 标准比较器：一个差异引擎加一个共享报告。
pub struct Comparator {
    kind: ComparatorKind,
    engine: Box<dyn DiffEngine>,
    report: Report,
}

impl Comparator {
    pub fn new(kind: ComparatorKind, engine: impl DiffEngine + 'static) -> Self {
        Self {
            kind,
            engine: Box::new(engine),
            report: Report::new(),
        }
    }

    pub fn kind(&self) -> ComparatorKind {
        self.kind
    }

    /// Renders the full report document without writing it.
    pub fn render(&self, meta: &ResultData) -> String {
        let records = self.report.records();
        let diagnostics = self.report.diagnostics();
        match self.kind.report_format() {
            ReportFormat::Text => reporting::text::render_report(meta, &records, &diagnostics),
            ReportFormat::Html => {
                reporting::html::render_report(meta, self.kind, &records, &diagnostics)
            }
        }
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator")
            .field("kind", &self.kind)
            .field("records", &self.report.len())
            .finish_non_exhaustive()
    }
}

impl ComparisonStrategy for Comparator {
    fn compare_and_accumulate<'a>(
        &'a self,
        data: &'a CompareData,
    ) -> BoxFuture<'a, Result<DiffOutcome, ComparisonError>> {
        Box::pin(async move {
            let outcome = self
                .engine
                .diff(&data.produced_file, &data.reference_file)
                .await?;
            self.report.push(ComparisonRecord::new(data, outcome.clone()));
            Ok(outcome)
        })
    }

    fn report_file_name(&self) -> String {
        infra::fs::report_file_name(self.kind.report_format().extension())
    }

    fn save_report(&self, folder: &Path, meta: &ResultData) -> Result<PathBuf, HarnessError> {
        let path = infra::fs::unique_path(folder, &self.report_file_name());
        let document = self.render(meta);
        fs::create_dir_all(folder)
            .and_then(|_| fs::write(&path, document))
            .map_err(|source| HarnessError::ReportPersistence {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    fn report(&self) -> &Report {
        &self.report
    }
}

/// Reads a whole file, tagging failures with the file's role.
pub(crate) async fn read_file(role: &'static str, path: &Path) -> Result<Vec<u8>, ComparisonError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| ComparisonError::Unreadable {
            role,
            path: path.to_path_buf(),
            source,
        })
}

/// Checks that a file can be opened for reading.
pub(crate) async fn ensure_readable(role: &'static str, path: &Path) -> Result<(), ComparisonError> {
    tokio::fs::File::open(path)
        .await
        .map(|_| ())
        .map_err(|source| ComparisonError::Unreadable {
            role,
            path: path.to_path_buf(),
            source,
        })
}
