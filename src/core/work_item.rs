//! # Work Item Module / 工作项模块
//!
//! Runs one catalog entry end to end: resolve paths, invoke the tool, compare
//! on a zero exit code. Every failure is absorbed here and turned into an
//! [`EntryStatus`]; exactly one finished notification is emitted per call.
//!
//! 端到端运行单个目录条目：解析路径、调用工具、在退出码为零时进行比较。
//! 所有失败都在此被吸收并转换为 [`EntryStatus`]；每次调用恰好发出一次完成通知。

use std::borrow::Cow;
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::compare::DiffOutcome;
use crate::core::context::RunContext;
use crate::core::error::LaunchError;
use crate::core::models::{CompareData, EntryResult, EntryStatus, RunData, Termination};
use crate::core::planner::PlannedEntry;
use crate::infra::{fs, t};

/// Placeholder replaced by the quoted sample path.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced by the quoted produced-artifact path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Base delay between launch attempts; grows linearly per attempt.
pub(crate) const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Substitutes the sample and produced paths into an entry's command
/// template. Without placeholders, `-o <output> <input>` is appended.
///
/// 将样本路径和产物路径代入条目的命令模板。若没有占位符，则追加 `-o <output> <input>`。
pub fn build_command(template: &str, sample: &Path, produced: &Path) -> String {
    let input = quote_path(sample);
    let output = quote_path(produced);
    if template.contains(INPUT_PLACEHOLDER) || template.contains(OUTPUT_PLACEHOLDER) {
        template
            .replace(OUTPUT_PLACEHOLDER, &output)
            .replace(INPUT_PLACEHOLDER, &input)
    } else {
        format!("{} -o {} {}", template.trim(), output, input)
            .trim_start()
            .to_string()
    }
}

fn quote_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    shlex::try_quote(&raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.into_owned())
}

/// Processes one planned entry. `position` is 1-based within this run.
///
/// Never fails: launch errors, tool failures and comparison errors all end
/// up in the returned [`EntryResult`].
///
/// 处理一个计划条目。`position` 是本次运行中从 1 开始的序号。
/// 永不失败：启动错误、工具失败和比较错误都会体现在返回的 [`EntryResult`] 中。
pub async fn process(
    planned: &PlannedEntry,
    position: usize,
    total: usize,
    ctx: &RunContext,
) -> EntryResult {
    let result = if ctx.cancel.is_cancelled() {
        EntryResult {
            index: planned.index,
            entry: planned.entry.clone(),
            runtime: Duration::ZERO,
            status: EntryStatus::Cancelled,
        }
    } else {
        ctx.progress.entry_started(position, total, &planned.entry);
        execute(planned, ctx).await
    };
    ctx.progress.entry_finished(position, total, &result);
    result
}

async fn execute(planned: &PlannedEntry, ctx: &RunContext) -> EntryResult {
    let entry = &planned.entry;
    let sample = ctx.sample_root.join(&entry.sample_file);
    let reference = ctx.reference_root.join(&entry.expected_result_file);
    let produced = fs::produced_path(&ctx.scratch_folder, planned.index, entry);

    if let Err(e) = remove_stale(&produced) {
        ctx.logger.warn(&t!(
            "entry.stale_output",
            path = produced.display(),
            error = e
        ));
    }

    let command = build_command(&entry.command, &sample, &produced);
    ctx.logger
        .debug(&t!("entry.command", program = ctx.runner.program().display(), command = &command));

    let finish = |runtime: Duration, status: EntryStatus| EntryResult {
        index: planned.index,
        entry: entry.clone(),
        runtime,
        status,
    };

    let run = match run_with_retries(&command, ctx).await {
        Ok(run) => run,
        Err(e) => {
            ctx.logger
                .error_with(&t!("entry.launch_failed", sample = &entry.sample_file), &e);
            return finish(Duration::ZERO, EntryStatus::LaunchFailed(e.to_string()));
        }
    };

    match run.termination {
        Termination::Exited(0) => {}
        Termination::Exited(code) => {
            ctx.comparator.report().note(format!(
                "{}: tool exited with code {}, not compared",
                entry.sample_file, code
            ));
            return finish(run.runtime, EntryStatus::ToolFailed { exit_code: Some(code) });
        }
        Termination::Signalled => {
            ctx.comparator.report().note(format!(
                "{}: tool was terminated by a signal, not compared",
                entry.sample_file
            ));
            return finish(run.runtime, EntryStatus::ToolFailed { exit_code: None });
        }
        Termination::TimedOut => {
            ctx.logger
                .warn(&t!("entry.timed_out", sample = &entry.sample_file));
            ctx.comparator.report().note(format!(
                "{}: tool timed out after {:.1}s, not compared",
                entry.sample_file,
                run.runtime.as_secs_f64()
            ));
            return finish(run.runtime, EntryStatus::TimedOut);
        }
        Termination::Cancelled => return finish(run.runtime, EntryStatus::Cancelled),
    }

    let data = CompareData {
        produced_file: produced,
        reference_file: reference,
        sample_file: sample,
        command,
        runtime: run.runtime,
    };

    let status = match ctx.comparator.compare_and_accumulate(&data).await {
        Ok(DiffOutcome::Identical) => EntryStatus::Identical,
        Ok(DiffOutcome::Different(_)) => EntryStatus::Different,
        Err(e) => {
            ctx.logger
                .error_with(&t!("entry.compare_failed", sample = &entry.sample_file), &e);
            ctx.comparator
                .report()
                .note(format!("{}: comparison failed: {}", entry.sample_file, e));
            EntryStatus::ComparisonFailed(e.to_string())
        }
    };
    finish(run.runtime, status)
}

/// Runs the tool, retrying spawn failures up to `ctx.launch_retries` times.
/// Only the launch is retried; a tool that started is never re-run.
async fn run_with_retries(command: &str, ctx: &RunContext) -> Result<RunData, LaunchError> {
    let logger = &ctx.logger;
    let mut attempt: u8 = 0;
    loop {
        let mut on_stdout = |line: &str| logger.debug(line);
        let mut on_stderr = |line: &str| logger.debug(&format!("stderr: {line}"));
        match ctx.runner.run(command, &mut on_stdout, &mut on_stderr).await {
            Err(LaunchError::Spawn { .. }) if attempt < ctx.launch_retries => {
                attempt += 1;
                logger.warn(&t!(
                    "entry.launch_retry",
                    attempt = attempt,
                    retries = ctx.launch_retries
                ));
                tokio::time::sleep(RETRY_BACKOFF * u32::from(attempt)).await;
            }
            other => return other,
        }
    }
}

fn remove_stale(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
