//! # HTML Reporting Module / HTML 报告模块
//!
//! HTML rendering for the structured comparators. Each record becomes a
//! collapsible section; differing records start expanded and show their
//! diff as a line table.
//!
//! 结构化比较器的 HTML 渲染。每条记录是一个可折叠区域；存在差异的记录默认展开，
//! 并以行表格显示差异。

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::compare::ComparatorKind;
use crate::compare::line_diff::DiffLine;
use crate::compare::report::{ComparisonRecord, DiffBody, DiffOutcome};
use crate::core::models::ResultData;
use crate::reporting::text::{DIFFERENCES_FOUND, NO_DIFFERENCES};

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = include_str!("assets/report.css");

/// Renders a complete HTML report document.
///
/// # Arguments / 参数
/// * `meta` - Identity metadata for the header / 头部使用的身份元数据
/// * `kind` - The comparator that produced the records / 生成记录的比较器
/// * `records` - Accumulated comparison records / 累积的比较记录
/// * `diagnostics` - Free-form diagnostic lines / 自由格式的诊断行
pub fn render_report(
    meta: &ResultData,
    kind: ComparatorKind,
    records: &[ComparisonRecord],
    diagnostics: &[String],
) -> String {
    let identical = records.iter().filter(|r| r.outcome.is_identical()).count();
    let different = records.len() - identical;

    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Regression report" }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { "Regression report" }
                p.identity { (meta.header_line()) }
                p.comparator { "Comparator: " (kind.key()) }
                div.summary-container {
                    (summary_item(meta.total_entries, "entries", ""))
                    (summary_item(records.len(), "compared", ""))
                    (summary_item(identical, "identical", "passed-text"))
                    (summary_item(different, "different", "failed-text"))
                }
                p.runtime { "Total runtime: " (format!("{:.3}s", meta.total_runtime.as_secs_f64())) }
                @for record in records {
                    (render_record(record))
                }
                @if !diagnostics.is_empty() {
                    h2 { "Diagnostics" }
                    pre.diagnostics { (diagnostics.join("\n")) }
                }
            }
        }
    };
    markup.into_string()
}

fn summary_item(count: usize, label: &str, class: &str) -> Markup {
    html! {
        div.summary-item {
            span class={ "count " (class) } { (count) }
            span.label { (label) }
        }
    }
}

fn render_record(record: &ComparisonRecord) -> Markup {
    let differs = !record.outcome.is_identical();
    html! {
        details.record open[differs] {
            summary {
                span.status.status-identical[!differs].status-different[differs] {
                    @if differs { (DIFFERENCES_FOUND) } @else { (NO_DIFFERENCES) }
                }
                " "
                span.sample { (record.sample_file.display().to_string()) }
            }
            table.meta {
                tr { th { "Command" } td { code { (record.command) } } }
                tr { th { "Runtime" } td { (format!("{:.3}s", record.runtime.as_secs_f64())) } }
                tr { th { "Reference" } td { (record.reference_file.display().to_string()) } }
                tr { th { "Produced" } td { (record.produced_file.display().to_string()) } }
            }
            @if let DiffOutcome::Different(body) = &record.outcome {
                (render_body(body))
            }
        }
    }
}

fn render_body(body: &DiffBody) -> Markup {
    match body {
        DiffBody::Text(text) => html! { pre.output-content { (text) } },
        DiffBody::Lines(lines) => html! {
            table.diff {
                thead { tr { th { "Reference" } th { "Produced" } th { "Line" } } }
                tbody {
                    @for line in lines {
                        (render_line(line))
                    }
                }
            }
        },
    }
}

fn render_line(line: &DiffLine) -> Markup {
    match line {
        DiffLine::Same { old, new, text } => html! {
            tr.same { td.ln { (old) } td.ln { (new) } td.code { (text) } }
        },
        DiffLine::Removed { old, text } => html! {
            tr.removed { td.ln { (old) } td.ln {} td.code { "- " (text) } }
        },
        DiffLine::Added { new, text } => html! {
            tr.added { td.ln {} td.ln { (new) } td.code { "+ " (text) } }
        },
        DiffLine::Skipped(count) => html! {
            tr.skipped { td colspan="3" { (format!("... {count} unchanged line(s) ...")) } }
        },
    }
}
