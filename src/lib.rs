//! # Media Regress Library / Media Regress 库
//!
//! A concurrent regression harness for command-line media tools: every
//! catalog entry runs the tool on a sample file, and the produced artifact is
//! compared against a stored reference. All comparisons of a run accumulate
//! into one report.
//!
//! 面向命令行媒体工具的并发回归测试框架：每个目录条目在样本文件上运行工具，
//! 并将生成的产物与存储的参考结果进行比较。一次运行的所有比较都累积到一份报告中。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, configuration, catalog and the run engine
//! - `compare` - Comparison strategies and the shared report accumulator
//! - `infra` - Process execution, file system helpers, logging and progress
//! - `reporting` - Text, HTML and console rendering
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 数据模型、配置、目录和运行引擎
//! - `compare` - 比较策略和共享报告累加器
//! - `infra` - 进程执行、文件系统辅助、日志和进度
//! - `reporting` - 文本、HTML 和控制台渲染
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod compare;
pub mod core;
pub mod infra;
pub mod reporting;

pub use crate::compare::{ComparatorKind, ComparisonStrategy};
pub use crate::core::orchestrator::Orchestrator;
pub use crate::core::{catalog, config, models};

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// It attempts to match the full locale (e.g., "zh-CN"), then just the
/// language code (e.g., "en"), and finally falls back to "en".
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    set_language(&locale);
}

/// Sets the UI language, falling back the same way [`init`] does.
pub fn set_language(locale: &str) {
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale) {
        locale
    } else {
        locale
            .split(['-', '_'])
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

rust_i18n::i18n!("locales", fallback = "en");
