//! # Orchestrator Module / 编排模块
//!
//! Owns one regression run: validates the environment, builds the shared
//! [`RunContext`], dispatches every planned entry (sequentially or on a
//! bounded worker pool), waits for all of them and persists the report.
//!
//! 负责一次回归运行：验证环境、构建共享的 [`RunContext`]、派发每个计划条目
//! （顺序或在有界工作池上）、等待全部完成并持久化报告。

use chrono::Local;
use futures::FutureExt;
use futures::stream::{self, StreamExt};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::compare::ComparisonStrategy;
use crate::core::config::RunConfig;
use crate::core::context::RunContext;
use crate::core::error::{ConfigError, HarnessError, LaunchError};
use crate::core::models::{EntryResult, EntryStatus, ResultData, RunSummary, TestEntry};
use crate::core::planner::PlannedEntry;
use crate::core::work_item::{self, RETRY_BACKOFF};
use crate::infra::command::ExternalRunner;
use crate::infra::log::{Logger, NoProgress, NullLogger, ProgressReporter};
use crate::infra::{fs, t};

/// Builds the comparator for a run. Called once per run.
pub type ComparatorFactory =
    Arc<dyn Fn(&RunConfig) -> Arc<dyn ComparisonStrategy> + Send + Sync>;

/// Value written into the report header when the tool version is unknown.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Runs catalogs of entries against the configured tool.
/// 针对配置的工具运行条目目录。
pub struct Orchestrator {
    config: RunConfig,
    logger: Arc<dyn Logger>,
    progress: Arc<dyn ProgressReporter>,
    comparator_factory: ComparatorFactory,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            logger: Arc::new(NullLogger),
            progress: Arc::new(NoProgress),
            comparator_factory: Arc::new(|config: &RunConfig| config.comparator.build(config)),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Replaces the registry-based comparator construction.
    pub fn with_comparator_factory(mut self, factory: ComparatorFactory) -> Self {
        self.comparator_factory = factory;
        self
    }

    /// Cancelling `token` kills running tools and skips entries not yet started.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Checks everything that must hold before the first entry is dispatched.
    ///
    /// 检查在派发第一个条目之前必须满足的所有条件。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let config = &self.config;
        if !config.tool_path.exists() {
            return Err(ConfigError::ToolNotFound(config.tool_path.clone()));
        }
        if !fs::is_executable(&config.tool_path) {
            return Err(ConfigError::ToolNotExecutable(config.tool_path.clone()));
        }
        if !config.sample_root.is_dir() {
            return Err(ConfigError::SampleRootMissing(config.sample_root.clone()));
        }
        fs::probe_writable(&config.report_folder).map_err(|source| {
            ConfigError::ReportFolderNotWritable {
                path: config.report_folder.clone(),
                source,
            }
        })?;
        Ok(())
    }

    /// Runs `entries` in catalog order, indexing them from zero.
    pub async fn run_all(&self, entries: &[TestEntry]) -> Result<RunSummary, HarnessError> {
        let planned = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| PlannedEntry {
                index,
                entry: entry.clone(),
            })
            .collect();
        self.run_planned(planned).await
    }

    /// Runs a prepared plan. Returns only after every dispatched entry has
    /// finished and the report has been written.
    ///
    /// Errors are fatal setup problems found before dispatch. A report that
    /// cannot be saved is returned in [`RunSummary::report`] next to the
    /// completed results.
    ///
    /// 运行已准备好的计划。仅在所有已派发条目完成并写入报告后返回。
    /// 错误仅表示派发前发现的致命配置问题；报告保存失败会与已完成的结果一起放在
    /// [`RunSummary::report`] 中返回。
    pub async fn run_planned(
        &self,
        planned: Vec<PlannedEntry>,
    ) -> Result<RunSummary, HarnessError> {
        self.validate()?;

        let config = &self.config;
        fs::ensure_dir(&config.scratch_folder).map_err(|source| HarnessError::Io {
            action: format!("creating scratch folder {}", config.scratch_folder.display()),
            source,
        })?;
        if !config.reference_root.is_dir() {
            self.logger.warn(&t!(
                "run.reference_root_missing",
                path = config.reference_root.display()
            ));
        }

        let runner = ExternalRunner::new(&config.tool_path)
            .with_timeout(config.timeout)
            .with_cancellation(self.cancel.clone());
        let tool_version = self.identify_tool(&runner).await?;

        let context = Arc::new(RunContext {
            runner,
            comparator: (self.comparator_factory)(config),
            progress: Arc::clone(&self.progress),
            logger: Arc::clone(&self.logger),
            sample_root: config.sample_root.clone(),
            reference_root: config.reference_root.clone(),
            scratch_folder: config.scratch_folder.clone(),
            launch_retries: config.launch_retries,
            cancel: self.cancel.clone(),
        });

        let jobs = config.effective_jobs();
        self.logger.info(&t!(
            "run.dispatching",
            count = planned.len(),
            jobs = jobs
        ));

        let start_time = Instant::now();
        let results = if config.threading {
            dispatch_parallel(&context, planned, jobs).await
        } else {
            dispatch_sequential(&context, &planned).await
        };
        let total_runtime = start_time.elapsed();

        let result_data = ResultData {
            tool_path: config.tool_path.clone(),
            tool_version,
            harness_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Local::now(),
            total_runtime,
            total_entries: results.len(),
            compared_entries: results.iter().filter(|r| r.status.is_compared()).count(),
        };

        let report = context
            .comparator
            .save_report(&config.report_folder, &result_data);
        if let Err(e) = &report {
            self.logger.error_with(&t!("run.report_failed"), e);
        }
        drop(context);

        Ok(RunSummary {
            results,
            total_runtime,
            report,
            result_data,
        })
    }

    /// Starts the tool once before dispatch. A tool that cannot be started
    /// is a configuration error; when `tool_version_args` is set the same
    /// start also yields the version, otherwise it is [`UNKNOWN_VERSION`].
    ///
    /// 在派发之前启动一次工具。无法启动的工具是配置错误；若设置了
    /// `tool_version_args`，同一次启动还会得到版本号，否则为 [`UNKNOWN_VERSION`]。
    async fn identify_tool(&self, runner: &ExternalRunner) -> Result<String, ConfigError> {
        let args = &self.config.tool_version_args;
        let version_command = if args.is_empty() {
            None
        } else {
            shlex::try_join(args.iter().map(String::as_str)).ok()
        };

        let mut attempt: u8 = 0;
        loop {
            let outcome = match &version_command {
                Some(command) => runner.run_captured(command).await.map(Some),
                None => runner.check_launch().await.map(|()| None),
            };
            match outcome {
                Err(LaunchError::Spawn { source, .. }) => {
                    if attempt >= self.config.launch_retries {
                        return Err(ConfigError::ToolNotLaunchable {
                            path: self.config.tool_path.clone(),
                            source,
                        });
                    }
                    attempt += 1;
                    tokio::time::sleep(RETRY_BACKOFF * u32::from(attempt)).await;
                }
                Err(e) => {
                    self.logger.error_with(&t!("run.version_probe_failed"), &e);
                    return Ok(UNKNOWN_VERSION.to_string());
                }
                Ok(Some(run)) if run.success() => {
                    return Ok(run
                        .stdout
                        .iter()
                        .chain(run.stderr.iter())
                        .map(|line| line.trim())
                        .find(|line| !line.is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(|| UNKNOWN_VERSION.to_string()));
                }
                Ok(_) => return Ok(UNKNOWN_VERSION.to_string()),
            }
        }
    }
}

/// One entry at a time, in plan order, on the calling task.
async fn dispatch_sequential(context: &RunContext, planned: &[PlannedEntry]) -> Vec<EntryResult> {
    let total = planned.len();
    let mut results = Vec::with_capacity(total);
    for (offset, entry) in planned.iter().enumerate() {
        let position = offset + 1;
        let outcome = AssertUnwindSafe(work_item::process(entry, position, total, context))
            .catch_unwind()
            .await;
        let result = match outcome {
            Ok(result) => result,
            Err(panic) => crashed(context, entry, position, total, panic_message(&*panic)),
        };
        results.push(result);
    }
    results
}

/// At most `jobs` entries in flight, each on its own task. A panicking work
/// item becomes a [`EntryStatus::Crashed`] result instead of aborting the run.
///
/// 同时最多 `jobs` 个条目在执行，每个条目在独立任务上运行。
async fn dispatch_parallel(
    context: &Arc<RunContext>,
    planned: Vec<PlannedEntry>,
    jobs: usize,
) -> Vec<EntryResult> {
    let total = planned.len();
    stream::iter(planned.into_iter().enumerate())
        .map(|(offset, entry)| {
            let context = Arc::clone(context);
            async move {
                let position = offset + 1;
                let task = {
                    let context = Arc::clone(&context);
                    let entry = entry.clone();
                    tokio::spawn(async move {
                        work_item::process(&entry, position, total, &context).await
                    })
                };
                match task.await {
                    Ok(result) => result,
                    Err(join_error) => {
                        let message = if join_error.is_panic() {
                            panic_message(&*join_error.into_panic())
                        } else {
                            join_error.to_string()
                        };
                        crashed(&context, &entry, position, total, message)
                    }
                }
            }
        })
        .buffer_unordered(jobs.max(1))
        .collect()
        .await
}

fn crashed(
    context: &RunContext,
    planned: &PlannedEntry,
    position: usize,
    total: usize,
    message: String,
) -> EntryResult {
    context.logger.error(&t!(
        "run.entry_crashed",
        sample = &planned.entry.sample_file,
        error = &message
    ));
    let result = EntryResult {
        index: planned.index,
        entry: planned.entry.clone(),
        runtime: Duration::ZERO,
        status: EntryStatus::Crashed(message),
    };
    context.progress.entry_finished(position, total, &result);
    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "work item panicked".to_string()
    }
}
