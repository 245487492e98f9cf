//! # Console Reporting Module / 控制台报告模块
//!
//! Colored end-of-run summary with internationalization support.
//!
//! 带国际化支持的彩色运行结束摘要。

use colored::*;

use crate::core::models::{EntryResult, EntryStatus, RunSummary};
use crate::infra::t;

/// Prints a formatted summary of a finished run.
///
/// # Output Format / 输出格式
/// ```text
/// --- Regression Summary ---
///   - identical          | samples/a.ts                             |     1.23s
///   - different          | samples/b.ts                             |     0.45s
///   - tool-failed (exit code 3) | samples/c.ts                      |     0.02s
/// ```
pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", t!("summary.banner").bold());

    for result in &summary.results {
        print_result_line(result);
    }

    let identical = summary.count(EntryStatus::is_identical);
    let compared = summary.compared();
    println!(
        "\n{}",
        t!(
            "summary.totals",
            total = summary.results.len(),
            compared = compared,
            identical = identical,
            different = compared - identical,
            failed = summary.results.len() - compared
        )
    );
    println!(
        "{}",
        t!(
            "summary.runtime",
            seconds = format!("{:.2}", summary.total_runtime.as_secs_f64())
        )
    );
    match &summary.report {
        Ok(path) => println!(
            "{}",
            t!("summary.report_written", path = path.display()).cyan()
        ),
        Err(e) => eprintln!(
            "{}",
            t!("summary.report_failed", error = error_chain(e)).red()
        ),
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

fn print_result_line(result: &EntryResult) {
    let status = result.status.to_string();
    let status_colored = match &result.status {
        EntryStatus::Identical => status.green(),
        EntryStatus::Different => status.yellow(),
        EntryStatus::Cancelled => status.dimmed(),
        _ => status.red(),
    };
    println!(
        "  - {:<18} | {:<40} | {:>9.2}s",
        status_colored,
        result.entry.sample_file,
        result.runtime.as_secs_f64()
    );
}
