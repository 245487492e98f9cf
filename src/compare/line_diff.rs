//! # Line Diff Module / 行差异模块
//!
//! In-process line diff used by the structured comparators, built on the
//! Myers algorithm from `similar`. Memory stays linear in the input, so
//! long caption or stream dumps are aligned as precisely as short ones.
//!
//! 结构化比较器使用的进程内行差异，基于 `similar` 的 Myers 算法。内存占用与输入成线性，
//! 因此较长的字幕或流信息输出与短输出一样能被精确对齐。

use serde::Serialize;
use similar::{Algorithm, DiffTag, capture_diff_slices_deadline};
use std::time::{Duration, Instant};

/// Lines of unchanged context kept around each change by [`reduce`].
pub const DEFAULT_CONTEXT: usize = 3;

/// After this long the diff settles for a coarser, still valid alignment.
pub const DIFF_DEADLINE: Duration = Duration::from_secs(5);

/// One line of a structured diff. Line numbers are 1-based; `old` refers to
/// the reference file and `new` to the produced file.
///
/// 结构化差异中的一行。行号从 1 开始；`old` 指参考文件，`new` 指生成文件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DiffLine {
    Same { old: usize, new: usize, text: String },
    Removed { old: usize, text: String },
    Added { new: usize, text: String },
    /// A run of unchanged lines left out by [`reduce`].
    Skipped(usize),
}

impl DiffLine {
    pub fn is_change(&self) -> bool {
        matches!(self, DiffLine::Removed { .. } | DiffLine::Added { .. })
    }
}

/// Diffs `reference` against `produced`, returning every line of both.
/// Within a changed region removed lines come before added ones.
///
/// 比较 `reference` 与 `produced`，返回两者的每一行。变化区域内删除行位于新增行之前。
pub fn diff_lines(reference: &[&str], produced: &[&str]) -> Vec<DiffLine> {
    let deadline = Instant::now().checked_add(DIFF_DEADLINE);
    let ops = capture_diff_slices_deadline(Algorithm::Myers, reference, produced, deadline);

    let mut out = Vec::with_capacity(reference.len().max(produced.len()));
    let mut added = Vec::new();
    for op in ops {
        let (tag, old, new) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            out.append(&mut added);
            out.extend(old.zip(new).map(|(o, n)| DiffLine::Same {
                old: o + 1,
                new: n + 1,
                text: reference[o].to_string(),
            }));
        } else {
            out.extend(old.map(|o| DiffLine::Removed {
                old: o + 1,
                text: reference[o].to_string(),
            }));
            added.extend(new.map(|n| DiffLine::Added {
                new: n + 1,
                text: produced[n].to_string(),
            }));
        }
    }
    out.append(&mut added);
    out
}

/// Keeps only changed lines plus `context` unchanged lines on either side;
/// everything else collapses into [`DiffLine::Skipped`] markers.
///
/// 只保留变化行及其两侧 `context` 行未变化的行；其余部分折叠为 [`DiffLine::Skipped`] 标记。
pub fn reduce(lines: Vec<DiffLine>, context: usize) -> Vec<DiffLine> {
    let len = lines.len();
    let mut keep = vec![false; len];
    for (idx, line) in lines.iter().enumerate() {
        if line.is_change() {
            let lo = idx.saturating_sub(context);
            let hi = (idx + context + 1).min(len);
            keep[lo..hi].iter_mut().for_each(|k| *k = true);
        }
    }

    let mut out = Vec::new();
    let mut skipped = 0;
    for (line, kept) in lines.into_iter().zip(keep) {
        if kept {
            if skipped > 0 {
                out.push(DiffLine::Skipped(skipped));
                skipped = 0;
            }
            out.push(line);
        } else {
            skipped += 1;
        }
    }
    if skipped > 0 {
        out.push(DiffLine::Skipped(skipped));
    }
    out
}

/// Renders diff lines in a unified-like plain text form.
/// 以类似 unified 格式的纯文本渲染差异行。
pub fn render_text(lines: &[DiffLine]) -> String {
    let mut text = String::new();
    for line in lines {
        match line {
            DiffLine::Same { text: t, .. } => {
                text.push_str("  ");
                text.push_str(t);
            }
            DiffLine::Removed { old, text: t } => {
                text.push_str(&format!("- [{old}] {t}"));
            }
            DiffLine::Added { new, text: t } => {
                text.push_str(&format!("+ [{new}] {t}"));
            }
            DiffLine::Skipped(count) => {
                text.push_str(&format!("@@ {count} unchanged line(s) @@"));
            }
        }
        text.push('\n');
    }
    text
}
