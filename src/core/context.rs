//! # Run Context Module / 运行上下文模块
//!
//! The immutable per-run value every work item receives. It is built once by
//! the orchestrator, shared behind an `Arc`, and dropped when the run ends so
//! the next run starts with a fresh comparator.
//!
//! 每个工作项收到的不可变的单次运行值。由编排器构建一次，通过 `Arc` 共享，
//! 并在运行结束时释放，使下一次运行从新的比较器开始。

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::compare::ComparisonStrategy;
use crate::infra::command::ExternalRunner;
use crate::infra::log::{Logger, ProgressReporter};

pub struct RunContext {
    pub runner: ExternalRunner,
    pub comparator: Arc<dyn ComparisonStrategy>,
    pub progress: Arc<dyn ProgressReporter>,
    pub logger: Arc<dyn Logger>,
    pub sample_root: PathBuf,
    pub reference_root: PathBuf,
    pub scratch_folder: PathBuf,
    /// Extra spawn attempts after a launch failure / 启动失败后的额外尝试次数
    pub launch_retries: u8,
    pub cancel: CancellationToken,
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("runner", &self.runner)
            .field("sample_root", &self.sample_root)
            .field("reference_root", &self.reference_root)
            .field("scratch_folder", &self.scratch_folder)
            .field("launch_retries", &self.launch_retries)
            .finish_non_exhaustive()
    }
}
