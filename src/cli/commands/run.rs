//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command: it loads settings and the
//! catalog, plans the entries for this invocation, runs them through the
//! orchestrator and prints the summary.
//!
//! 此模块实现 `run` 命令：加载设置和测试目录，为本次调用规划条目，
//! 通过编排器运行它们并打印摘要。

use anyhow::{Context, Result};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        catalog::Catalog,
        config::{RunConfig, Settings, keys},
        orchestrator::Orchestrator,
        planner,
    },
    infra::{
        log::{ConsoleLogger, ConsoleProgress},
        t,
    },
    reporting::console::print_summary,
};

/// Arguments of the `run` subcommand.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub settings: PathBuf,
    pub catalog: PathBuf,
    pub jobs: Option<usize>,
    pub sequential: bool,
    pub comparator: Option<String>,
    /// Raw `KEY=VALUE` overrides / 原始的 `KEY=VALUE` 覆盖项
    pub overrides: Vec<String>,
    pub filter: Option<String>,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
    pub strict: bool,
    pub verbose: bool,
    /// `--lang` was given, so the `language` setting is ignored
    pub language_forced: bool,
}

/// Executes the run command with the provided arguments.
///
/// # Returns
/// An error for fatal configuration problems, for a report that could not be
/// saved (after the summary is printed), for a cancelled run, and with
/// `--strict` whenever any entry is not identical to its reference.
pub async fn execute(args: RunArgs) -> Result<()> {
    let config = load_config(&args)?;
    if !args.language_forced
        && let Some(language) = &config.language
    {
        crate::set_language(language);
    }

    println!(
        "{}",
        t!("run.loading_catalog", path = args.catalog.display())
    );
    let catalog = Catalog::load(&args.catalog)
        .with_context(|| t!("run.catalog_failed", path = args.catalog.display()).to_string())?;

    let plan = planner::plan_execution(
        catalog.entries,
        args.filter.as_deref(),
        args.total_runners,
        args.runner_index,
    )?;

    if plan.filtered_count > 0 {
        println!(
            "{}",
            t!(
                "run.filtered",
                filtered = plan.filtered_count,
                total = plan.entries.len()
            )
            .cyan()
        );
    }

    if let (Some(total), Some(index)) = (args.total_runners, args.runner_index) {
        println!(
            "{}",
            t!(
                "run.split_runner",
                index = index + 1,
                total = total,
                count = plan.entries.len()
            )
            .bold()
        );
    }

    if plan.entries.is_empty() {
        println!("{}", t!("run.no_entries").green());
        return Ok(());
    }

    println!(
        "{}",
        t!(
            "run.starting",
            count = plan.entries.len(),
            comparator = config.comparator.key(),
            jobs = config.effective_jobs()
        )
        .bold()
    );

    let stop_token = setup_signal_handler();
    let orchestrator = Orchestrator::new(config)
        .with_logger(Arc::new(ConsoleLogger::new(args.verbose)))
        .with_progress(Arc::new(ConsoleProgress))
        .with_cancellation(stop_token.clone());

    let summary = orchestrator
        .run_planned(plan.entries)
        .await
        .with_context(|| t!("run.failed").to_string())?;

    print_summary(&summary);
    let mismatches = summary.results.len() - summary.count(|s| s.is_identical());
    if let Err(e) = summary.report {
        return Err(anyhow::Error::new(e).context(t!("run.report_failed").to_string()));
    }

    if stop_token.is_cancelled() {
        anyhow::bail!(t!("run.cancelled").to_string());
    }

    if mismatches == 0 {
        println!("\n{}", t!("run.all_identical").green().bold());
    } else if args.strict {
        anyhow::bail!(t!("run.strict_failed", count = mismatches).to_string());
    } else {
        println!("\n{}", t!("run.mismatches", count = mismatches).yellow().bold());
    }
    Ok(())
}

/// Loads the settings file, applies command-line overrides and resolves the
/// typed configuration.
fn load_config(args: &RunArgs) -> Result<RunConfig> {
    let mut settings = Settings::load(&args.settings)
        .with_context(|| t!("run.settings_failed", path = args.settings.display()).to_string())?;

    for assignment in &args.overrides {
        settings.apply_override(assignment)?;
    }
    if let Some(jobs) = args.jobs {
        settings.set(keys::JOBS, jobs.to_string());
    }
    if args.sequential {
        settings.set(keys::THREADING, "false");
    }
    if let Some(comparator) = &args.comparator {
        settings.set(keys::COMPARATOR, comparator.as_str());
    }

    RunConfig::from_settings(&settings)
        .with_context(|| t!("run.config_invalid", path = args.settings.display()).to_string())
}

/// Sets up a signal handler for graceful shutdown.
fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("run.shutdown_signal").yellow());
            token_clone.cancel();
        }
    });

    token
}
