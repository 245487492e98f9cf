//! # Configuration Module / 配置模块
//!
//! Settings are a flat key-to-string lookup, loaded from a TOML file and
//! optionally overridden from the command line. [`RunConfig`] is the typed,
//! validated view the orchestrator consumes.
//!
//! 设置是一个扁平的键到字符串的查找表，从 TOML 文件加载，并可由命令行覆盖。
//! [`RunConfig`] 是编排器使用的类型化、已验证的视图。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::compare::ComparatorKind;
use crate::core::error::ConfigError;

/// Names of the recognized settings keys.
/// 可识别的设置键名。
pub mod keys {
    pub const TOOL_PATH: &str = "tool_path";
    pub const SAMPLE_ROOT: &str = "sample_root";
    pub const REFERENCE_ROOT: &str = "reference_root";
    pub const REPORT_FOLDER: &str = "report_folder";
    pub const SCRATCH_FOLDER: &str = "scratch_folder";
    pub const THREADING: &str = "threading";
    pub const JOBS: &str = "jobs";
    pub const COMPARATOR: &str = "comparator";
    pub const DIFF_TOOL: &str = "diff_tool";
    pub const TIMEOUT_SECS: &str = "timeout_secs";
    pub const LAUNCH_RETRIES: &str = "launch_retries";
    pub const TOOL_VERSION_ARGS: &str = "tool_version_args";
    pub const LANGUAGE: &str = "language";
}

/// Upper bound for `launch_retries`.
pub const MAX_LAUNCH_RETRIES: u8 = 5;

/// Default external line-diff command line.
pub const DEFAULT_DIFF_TOOL: &str = "diff -u";

/// Flat key-to-string settings lookup.
/// 扁平的键到字符串设置查找表。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a TOML file. Every top-level scalar becomes a
    /// string value; nested tables and arrays are rejected.
    ///
    /// 从 TOML 文件加载设置。每个顶层标量都变成字符串值；嵌套表和数组会被拒绝。
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parses settings from TOML text. Returns a plain message on failure so
    /// the caller can attach the file path.
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;
        let mut values = BTreeMap::new();
        for (key, value) in table {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Datetime(d) => d.to_string(),
                toml::Value::Array(_) | toml::Value::Table(_) => {
                    return Err(format!("setting `{key}` must be a scalar value"));
                }
            };
            values.insert(key, text);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style [`Settings::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Applies a `key=value` override as given on the command line.
    pub fn apply_override(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidValue {
                key: assignment.to_string(),
                value: String::new(),
                reason: "expected KEY=VALUE".to_string(),
            })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: String::new(),
                value: value.to_string(),
                reason: "empty key".to_string(),
            });
        }
        self.set(key, value.trim());
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn required(&self, key: &'static str) -> Result<&str, ConfigError> {
        match self.get(key) {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::MissingKey(key)),
        }
    }

    fn path(&self, key: &'static str) -> Result<PathBuf, ConfigError> {
        expand_path(key, self.required(key)?)
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T::Err: std::fmt::Display,
    {
        match self.get(key).map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key).map(|v| v.trim().to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) if v.is_empty() => Ok(default),
            Some(v) => match v.as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: v,
                    reason: "expected a boolean".to_string(),
                }),
            },
        }
    }
}

fn expand_path(key: &str, raw: &str) -> Result<PathBuf, ConfigError> {
    let expanded = shellexpand::full(raw).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Typed, validated run configuration.
/// 类型化、已验证的运行配置。
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path to the media tool under test / 被测媒体工具的路径
    pub tool_path: PathBuf,
    pub sample_root: PathBuf,
    pub reference_root: PathBuf,
    pub report_folder: PathBuf,
    /// Where produced artifacts are written / 生成产物的写入位置
    pub scratch_folder: PathBuf,
    /// Run entries on a worker pool instead of one by one / 使用工作池而非逐个运行
    pub threading: bool,
    /// Worker pool bound / 工作池上限
    pub jobs: usize,
    pub comparator: ComparatorKind,
    /// Diff program and its fixed arguments / 差异程序及其固定参数
    pub diff_tool: Vec<String>,
    pub timeout: Option<Duration>,
    pub launch_retries: u8,
    pub tool_version_args: Vec<String>,
    pub language: Option<String>,
}

impl RunConfig {
    /// A configuration with defaults for everything but the four paths.
    pub fn new(
        tool_path: impl Into<PathBuf>,
        sample_root: impl Into<PathBuf>,
        reference_root: impl Into<PathBuf>,
        report_folder: impl Into<PathBuf>,
    ) -> Self {
        let report_folder = report_folder.into();
        Self {
            tool_path: tool_path.into(),
            sample_root: sample_root.into(),
            reference_root: reference_root.into(),
            scratch_folder: report_folder.join("produced"),
            report_folder,
            threading: true,
            jobs: default_jobs(),
            comparator: ComparatorKind::default(),
            diff_tool: split_command(DEFAULT_DIFF_TOOL),
            timeout: None,
            launch_retries: 0,
            tool_version_args: Vec::new(),
            language: None,
        }
    }

    /// Resolves and validates every key this harness understands.
    /// Unknown keys are ignored.
    ///
    /// 解析并验证本框架理解的每个键。未知键会被忽略。
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let mut config = Self::new(
            settings.path(keys::TOOL_PATH)?,
            settings.path(keys::SAMPLE_ROOT)?,
            settings.path(keys::REFERENCE_ROOT)?,
            settings.path(keys::REPORT_FOLDER)?,
        );

        if let Some(raw) = settings.get(keys::SCRATCH_FOLDER).filter(|v| !v.trim().is_empty()) {
            config.scratch_folder = expand_path(keys::SCRATCH_FOLDER, raw)?;
        }

        config.threading = settings.flag(keys::THREADING, true)?;
        config.jobs = settings.parsed(keys::JOBS, default_jobs())?;
        if config.jobs == 0 {
            return Err(ConfigError::InvalidValue {
                key: keys::JOBS.to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        config.comparator = settings.parsed(keys::COMPARATOR, ComparatorKind::default())?;

        if let Some(raw) = settings.get(keys::DIFF_TOOL).filter(|v| !v.trim().is_empty()) {
            config.diff_tool = shlex::split(raw)
                .filter(|parts| !parts.is_empty())
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: keys::DIFF_TOOL.to_string(),
                    value: raw.to_string(),
                    reason: "not a valid command line".to_string(),
                })?;
        }

        config.timeout = match settings.parsed::<u64>(keys::TIMEOUT_SECS, 0)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        config.launch_retries = settings.parsed(keys::LAUNCH_RETRIES, 0u8)?;
        if config.launch_retries > MAX_LAUNCH_RETRIES {
            return Err(ConfigError::InvalidValue {
                key: keys::LAUNCH_RETRIES.to_string(),
                value: config.launch_retries.to_string(),
                reason: format!("must be at most {MAX_LAUNCH_RETRIES}"),
            });
        }

        if let Some(raw) = settings.get(keys::TOOL_VERSION_ARGS) {
            config.tool_version_args =
                shlex::split(raw).ok_or_else(|| ConfigError::InvalidValue {
                    key: keys::TOOL_VERSION_ARGS.to_string(),
                    value: raw.to_string(),
                    reason: "unbalanced quotes".to_string(),
                })?;
        }

        config.language = settings
            .get(keys::LANGUAGE)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(config)
    }

    /// Worker count actually used for dispatch.
    pub fn effective_jobs(&self) -> usize {
        if self.threading { self.jobs.max(1) } else { 1 }
    }
}

fn split_command(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

fn default_jobs() -> usize {
    num_cpus::get().max(1)
}
