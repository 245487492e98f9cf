//! # Infrastructure Module / 基础设施模块
//!
//! Process execution, file system helpers, logging and progress reporting.
//!
//! 进程执行、文件系统辅助、日志和进度报告。

pub mod command;
pub mod fs;
pub mod log;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
