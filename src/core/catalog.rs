//! # Catalog Module / 测试目录模块
//!
//! Loads, validates and saves the ordered list of test entries. The on-disk
//! format is chosen by extension: `.toml` uses `[[entries]]` tables, `.json`
//! an object with an `entries` array.
//!
//! 加载、验证并保存有序的测试条目列表。磁盘格式由扩展名决定：
//! `.toml` 使用 `[[entries]]` 表，`.json` 使用带 `entries` 数组的对象。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};

use crate::core::error::CatalogError;
use crate::core::models::TestEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self, CatalogError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Ok(Format::Toml),
            Some("json") => Ok(Format::Json),
            _ => Err(CatalogError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// The ordered set of entries a run executes.
/// 一次运行所执行的有序条目集合。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub entries: Vec<TestEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<TestEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads and validates a catalog file.
    /// 读取并验证目录文件。
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let format = Format::of(path)?;
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(&content, format).map_err(|message| CatalogError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn parse(content: &str, format: Format) -> Result<Self, String> {
        match format {
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// Writes the catalog back out, preserving entry order.
    /// 将目录写回磁盘，保持条目顺序。
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let text = match Format::of(path)? {
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| CatalogError::Serialize(e.to_string()))?
            }
            Format::Json => serde_json::to_string_pretty(self)
                .map_err(|e| CatalogError::Serialize(e.to_string()))?,
        };
        fs::write(path, text).map_err(|source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks every entry: both paths must be non-empty, relative, and must
    /// not climb out of their root with `..`.
    ///
    /// 检查每个条目：两个路径都必须非空、为相对路径，且不能用 `..` 跳出其根目录。
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (index, entry) in self.entries.iter().enumerate() {
            check_relative(index, "sample_file", &entry.sample_file)?;
            check_relative(index, "expected_result_file", &entry.expected_result_file)?;
            if entry.command.contains('\n') {
                return Err(CatalogError::InvalidEntry {
                    index,
                    reason: "command must be a single line".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn check_relative(index: usize, field: &str, value: &str) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::InvalidEntry {
        index,
        reason: format!("{field} {reason}"),
    };
    if value.trim().is_empty() {
        return Err(invalid("is empty"));
    }
    let path = Path::new(value);
    if path.is_absolute() || value.starts_with('/') || value.starts_with('\\') {
        return Err(invalid("must be relative"));
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(invalid("must not contain `..`"));
    }
    Ok(())
}
