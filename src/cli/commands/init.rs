//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which writes a commented
//! `settings.toml` and a sample `catalog.toml`. The interactive wizard asks
//! for the tool path, the sample/reference roots, the report folder and the
//! comparator; `--non-interactive` writes the defaults.
//!
//! 此模块实现 `init` 命令，用于写出带注释的 `settings.toml` 和示例 `catalog.toml`。
//! 交互式向导会询问工具路径、样本/参考根目录、报告目录和比较器；
//! `--non-interactive` 则直接写入默认值。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::fs;
use std::path::Path;

use crate::compare::ComparatorKind;
use crate::core::catalog::Catalog;
use crate::core::models::TestEntry;
use crate::infra::t;

pub const SETTINGS_FILE_NAME: &str = "settings.toml";
pub const CATALOG_FILE_NAME: &str = "catalog.toml";

/// Answers collected by the wizard / 向导收集的答案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitAnswers {
    pub tool_path: String,
    pub sample_root: String,
    pub reference_root: String,
    pub report_folder: String,
    pub comparator: ComparatorKind,
}

impl Default for InitAnswers {
    fn default() -> Self {
        Self {
            tool_path: "/usr/local/bin/mediatool".to_string(),
            sample_root: "samples".to_string(),
            reference_root: "references".to_string(),
            report_folder: "reports".to_string(),
            comparator: ComparatorKind::default(),
        }
    }
}

/// Renders the commented settings file for `answers`.
pub fn render_settings(answers: &InitAnswers) -> String {
    format!(
        r#"# media-regress settings / media-regress 设置

# The media tool under test / 被测媒体工具
tool_path = {tool_path:?}

# Sample inputs and stored references, relative paths in the catalog resolve here
# 样本输入和存储的参考结果，目录中的相对路径相对于这里解析
sample_root = {sample_root:?}
reference_root = {reference_root:?}

# Reports are written here; produced artifacts go to <report_folder>/produced
# 报告写入此处；生成的产物写入 <report_folder>/produced
report_folder = {report_folder:?}
# scratch_folder = "reports/produced"

# difftool | structured | reduced
comparator = "{comparator}"
# diff_tool = "diff -u"

# Run entries on a worker pool / 使用工作池运行条目
threading = true
# jobs = 4

# Kill the tool after this many seconds, 0 disables the limit
# 超过此秒数后终止工具，0 表示不限制
timeout_secs = 0
launch_retries = 0

# Arguments that make the tool print its version / 使工具打印版本的参数
# tool_version_args = "--version"

# language = "en"
"#,
        tool_path = answers.tool_path,
        sample_root = answers.sample_root,
        reference_root = answers.reference_root,
        report_folder = answers.report_folder,
        comparator = answers.comparator.key(),
    )
}

/// The catalog written next to the settings file.
pub fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        TestEntry::new("clips/example.ts", "--format json", "clips/example.json"),
        TestEntry::new(
            "clips/example.mp4",
            "--format json -o {output} {input}",
            "clips/example_mp4.json",
        ),
    ])
}

/// Executes the init command in `dir`.
pub fn execute(dir: &Path, non_interactive: bool) -> Result<()> {
    let settings_path = dir.join(SETTINGS_FILE_NAME);
    let catalog_path = dir.join(CATALOG_FILE_NAME);
    let theme = ColorfulTheme::default();

    let answers = if non_interactive {
        if let Some(existing) = [&settings_path, &catalog_path].into_iter().find(|p| p.exists()) {
            println!("{}", t!("init.file_exists", path = existing.display()).yellow());
            println!("{}", t!("init.aborted"));
            return Ok(());
        }
        InitAnswers::default()
    } else {
        println!("\n{}", t!("init.welcome").cyan().bold());
        println!("{}", t!("init.description"));

        if let Some(existing) = [&settings_path, &catalog_path].into_iter().find(|p| p.exists()) {
            let confirmation = Confirm::with_theme(&theme)
                .with_prompt(t!("init.overwrite_prompt", path = existing.display()).to_string())
                .default(false)
                .interact()
                .context(t!("init.confirmation_failed").to_string())?;
            if !confirmation {
                println!("{}", t!("init.aborted"));
                return Ok(());
            }
        }
        prompt_answers(&theme)?
    };

    fs::create_dir_all(dir)
        .with_context(|| t!("init.write_failed", path = dir.display()).to_string())?;
    fs::write(&settings_path, render_settings(&answers))
        .with_context(|| t!("init.write_failed", path = settings_path.display()).to_string())?;
    sample_catalog()
        .save(&catalog_path)
        .with_context(|| t!("init.write_failed", path = catalog_path.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!(
            "init.success",
            settings = settings_path.display(),
            catalog = catalog_path.display()
        )
        .bold()
    );
    println!("{}", t!("init.next_steps"));
    Ok(())
}

fn prompt_answers(theme: &ColorfulTheme) -> Result<InitAnswers> {
    let defaults = InitAnswers::default();
    let ask = |prompt: String, default: String| -> Result<String> {
        Input::<String>::with_theme(theme)
            .with_prompt(prompt)
            .default(default)
            .interact_text()
            .context(t!("init.input_failed").to_string())
    };

    let tool_path = ask(t!("init.prompt_tool").to_string(), defaults.tool_path)?;
    let sample_root = ask(t!("init.prompt_samples").to_string(), defaults.sample_root)?;
    let reference_root = ask(t!("init.prompt_references").to_string(), defaults.reference_root)?;
    let report_folder = ask(t!("init.prompt_reports").to_string(), defaults.report_folder)?;

    let kinds = [
        ComparatorKind::Structured,
        ComparatorKind::Reduced,
        ComparatorKind::DiffTool,
    ];
    let labels: Vec<&str> = kinds.iter().map(|k| k.key()).collect();
    let choice = Select::with_theme(theme)
        .with_prompt(t!("init.prompt_comparator").to_string())
        .items(&labels)
        .default(0)
        .interact()
        .context(t!("init.input_failed").to_string())?;

    Ok(InitAnswers {
        tool_path,
        sample_root,
        reference_root,
        report_folder,
        comparator: kinds[choice],
    })
}
