//! # Text Report Module / 文本报告模块
//!
//! Plain-text rendering of a run's report: one identity header line, then one
//! block per comparison record, then any diagnostics. Report text is always
//! English so reports from different machines diff cleanly.
//!
//! 运行报告的纯文本渲染：一行身份头，随后每条比较记录一个块，最后是诊断信息。
//! 报告文本始终为英文，以便不同机器生成的报告可以直接比较。

use std::fmt::Write;

use crate::compare::report::{ComparisonRecord, DiffOutcome};
use crate::core::models::ResultData;

/// Prefix of the first line of every record block.
pub const RECORD_MARKER: &str = "=== Sample: ";

/// Outcome line written for identical files.
pub const NO_DIFFERENCES: &str = "No differences";

/// Outcome line written before a diff body.
pub const DIFFERENCES_FOUND: &str = "Differences found";

/// Renders one record as a text block ending in a blank line.
/// 将一条记录渲染为以空行结尾的文本块。
pub fn render_record(record: &ComparisonRecord) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}{}", RECORD_MARKER, record.sample_file.display());
    let _ = writeln!(out, "Command: {}", record.command);
    let _ = writeln!(out, "Runtime: {:.3}s", record.runtime.as_secs_f64());
    let _ = writeln!(out, "Reference: {}", record.reference_file.display());
    let _ = writeln!(out, "Produced: {}", record.produced_file.display());
    match &record.outcome {
        DiffOutcome::Identical => {
            let _ = writeln!(out, "{NO_DIFFERENCES}");
        }
        DiffOutcome::Different(body) => {
            let _ = writeln!(out, "{DIFFERENCES_FOUND}:");
            out.push_str(&body.to_text());
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
    }
    out.push('\n');
    out
}

/// Renders the complete text report.
/// 渲染完整的文本报告。
pub fn render_report(
    meta: &ResultData,
    records: &[ComparisonRecord],
    diagnostics: &[String],
) -> String {
    let identical = records.iter().filter(|r| r.outcome.is_identical()).count();
    let mut out = String::new();
    let _ = writeln!(out, "{}", meta.header_line());
    let _ = writeln!(
        out,
        "Entries: {} | compared: {} | identical: {} | different: {} | total runtime: {:.3}s",
        meta.total_entries,
        records.len(),
        identical,
        records.len() - identical,
        meta.total_runtime.as_secs_f64()
    );
    out.push('\n');

    for record in records {
        out.push_str(&render_record(record));
    }

    if !diagnostics.is_empty() {
        let _ = writeln!(out, "--- Diagnostics ---");
        for line in diagnostics {
            let _ = writeln!(out, "{line}");
        }
    }
    out
}
