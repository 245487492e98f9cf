//! # Logging and Progress Module / 日志与进度模块
//!
//! The two collaborators every work item talks to: a leveled [`Logger`] and a
//! free-text [`ProgressReporter`]. Console implementations print colored lines;
//! the null implementations are the defaults when nothing is supplied.
//!
//! 每个工作项都会使用的两个协作者：分级的 [`Logger`] 和自由文本的 [`ProgressReporter`]。
//! 控制台实现打印彩色行；未提供时默认使用空实现。

use colored::*;
use std::error::Error;

use crate::core::models::{EntryResult, TestEntry};
use crate::infra::t;

/// Severity of a log message / 日志消息的严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Leveled logger.
/// 分级日志记录器。
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    /// Logs an error together with its full `source()` chain.
    /// 记录错误及其完整的 `source()` 链。
    fn error_with(&self, message: &str, err: &dyn Error) {
        let mut text = format!("{message}: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            text.push_str(&format!("\n  caused by: {cause}"));
            source = cause.source();
        }
        self.log(Level::Error, &text);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: &str) {}
}

/// Colored console logger. Errors and warnings go to stderr, debug output is
/// only shown when `verbose` is set.
///
/// 彩色控制台日志记录器。错误和警告输出到 stderr，调试输出仅在 `verbose` 时显示。
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger {
    pub verbose: bool,
}

impl ConsoleLogger {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Debug if self.verbose => println!("{}", message.dimmed()),
            Level::Debug => {}
            Level::Info => println!("{}", message),
            Level::Warn => eprintln!("{}", message.yellow()),
            Level::Error => eprintln!("{}", message.red()),
        }
    }
}

/// Receives progress notifications. Only [`ProgressReporter::report`] is
/// required; the entry hooks format a localized message and forward to it.
///
/// 接收进度通知。只需实现 [`ProgressReporter::report`]；条目钩子会格式化本地化消息并转发给它。
pub trait ProgressReporter: Send + Sync {
    fn report(&self, message: &str);

    /// Called once before the tool runs for an entry.
    fn entry_started(&self, position: usize, total: usize, entry: &TestEntry) {
        self.report(&t!(
            "progress.started",
            position = position,
            total = total,
            sample = &entry.sample_file
        ));
    }

    /// Called exactly once per dispatched entry, on every exit path.
    fn entry_finished(&self, position: usize, total: usize, result: &EntryResult) {
        self.report(&t!(
            "progress.finished",
            position = position,
            total = total,
            sample = &result.entry.sample_file,
            status = result.status.to_string()
        ));
    }
}

/// The default reporter: does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _message: &str) {}
}

/// Prints progress lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn report(&self, message: &str) {
        println!("{}", message.cyan());
    }

    fn entry_finished(&self, position: usize, total: usize, result: &EntryResult) {
        let message = t!(
            "progress.finished",
            position = position,
            total = total,
            sample = &result.entry.sample_file,
            status = result.status.to_string()
        );
        if result.status.is_identical() {
            println!("{}", message.green());
        } else if result.status.is_compared() {
            println!("{}", message.yellow());
        } else {
            println!("{}", message.red());
        }
    }
}
