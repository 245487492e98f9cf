//! # File System Operations Module / 文件系统操作模块
//!
//! Scratch-directory preparation, deterministic produced-artifact naming,
//! report-folder probing and unique report names.
//!
//! 临时目录准备、确定性的产物命名、报告目录探测以及唯一的报告文件名。

use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::models::TestEntry;

/// Creates `path` (and parents) if missing. Calling it twice is harmless.
/// 如果 `path`（及其父目录）不存在则创建。重复调用无害。
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Verifies that `folder` exists (creating it if needed) and accepts new files.
/// 验证 `folder` 存在（必要时创建）并且可以写入新文件。
pub fn probe_writable(folder: &Path) -> io::Result<()> {
    ensure_dir(folder)?;
    let probe = tempfile::Builder::new()
        .prefix(".media_regress_probe_")
        .tempfile_in(folder)?;
    drop(probe);
    Ok(())
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Longest sanitized reference name kept in a produced file name. With the
/// index prefix this stays well under the usual 255-byte file name limit.
pub const MAX_PRODUCED_NAME: usize = 200;

/// Derives the scratch path for an entry's produced artifact:
/// `NNNN_<sanitized expected_result_file>`.
///
/// The name is prefixed with the catalog index, so two entries whose
/// reference files share a basename (or even a full relative path) still get
/// distinct files. Over-long names keep their tail, which holds the file name
/// and extension.
///
/// 为条目的产物推导临时路径：`NNNN_<清理后的 expected_result_file>`。名称以目录索引为前缀，
/// 因此即使两个条目的参考文件同名，也会得到不同的文件。过长的名称保留末尾部分（文件名和扩展名）。
pub fn produced_path(scratch: &Path, index: usize, entry: &TestEntry) -> PathBuf {
    let sanitized = sanitize_component(&entry.expected_result_file);
    let tail = &sanitized[sanitized.len().saturating_sub(MAX_PRODUCED_NAME)..];
    scratch.join(format!("{index:04}_{tail}"))
}

/// A time-based report file name, e.g. `report_2024-05-01_134502_117.txt`.
/// 基于时间的报告文件名。
pub fn report_file_name(extension: &str) -> String {
    format!(
        "report_{}.{}",
        Local::now().format("%Y-%m-%d_%H%M%S_%3f"),
        extension
    )
}

/// Returns `folder/file_name`, or `folder/<stem>_<n>.<ext>` with the smallest
/// `n` that does not exist yet.
///
/// 返回 `folder/file_name`；若已存在，则返回尚不存在的、带最小序号 `n` 的路径。
pub fn unique_path(folder: &Path, file_name: &str) -> PathBuf {
    let candidate = folder.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (file_name, String::new()),
    };
    (1..)
        .map(|n| folder.join(format!("{stem}_{n}{extension}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Whether `path` points to a file this process may execute.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Whether `path` points to a file this process may execute.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}
