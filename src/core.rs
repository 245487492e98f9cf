//! # Core Module / 核心模块
//!
//! Data models, configuration, the test catalog and the run engine
//! (orchestrator and work items).
//!
//! 数据模型、配置、测试目录以及运行引擎（编排器和工作项）。

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod planner;
pub mod work_item;

pub use catalog::Catalog;
pub use config::{RunConfig, Settings};
pub use error::{CatalogError, ComparisonError, ConfigError, HarnessError, LaunchError};
pub use models::{EntryResult, EntryStatus, RunSummary, TestEntry};
pub use orchestrator::Orchestrator;
