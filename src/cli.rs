// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::{env, path::PathBuf};

use crate::infra::t;

pub mod commands;

use commands::run::RunArgs;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// Returns `None` when no `--lang <VALUE>` argument is present.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    let pos = args.iter().position(|arg| arg == "--lang")?;
    args.get(pos + 1).cloned()
}

pub fn build_cli() -> Command {
    Command::new("media-regress")
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about").to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang").to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cli.run.about").to_string())
                .arg(
                    Arg::new("settings")
                        .short('s')
                        .long("settings")
                        .help(t!("cli.run.settings").to_string())
                        .value_name("SETTINGS")
                        .default_value("settings.toml")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("catalog")
                        .short('c')
                        .long("catalog")
                        .help(t!("cli.run.catalog").to_string())
                        .value_name("CATALOG")
                        .default_value("catalog.toml")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help(t!("cli.run.jobs").to_string())
                        .value_name("JOBS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("sequential")
                        .long("sequential")
                        .help(t!("cli.run.sequential").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("comparator")
                        .long("comparator")
                        .help(t!("cli.run.comparator").to_string())
                        .value_name("COMPARATOR")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("set")
                        .long("set")
                        .help(t!("cli.run.set").to_string())
                        .value_name("KEY=VALUE")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .help(t!("cli.run.filter").to_string())
                        .value_name("PATTERN")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("total-runners")
                        .long("total-runners")
                        .help(t!("cli.run.total_runners").to_string())
                        .value_name("TOTAL_RUNNERS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set)
                        .requires("runner-index"),
                )
                .arg(
                    Arg::new("runner-index")
                        .long("runner-index")
                        .help(t!("cli.run.runner_index").to_string())
                        .value_name("RUNNER_INDEX")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set)
                        .requires("total-runners"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .help(t!("cli.run.strict").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("verbose")
                        .short('v')
                        .long("verbose")
                        .help(t!("cli.run.verbose").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("catalog")
                .about(t!("cli.catalog.about").to_string())
                .subcommand_required(true)
                .subcommand(
                    Command::new("check")
                        .about(t!("cli.catalog.check").to_string())
                        .arg(
                            Arg::new("file")
                                .help(t!("cli.catalog.file").to_string())
                                .value_name("FILE")
                                .required(true)
                                .value_parser(clap::value_parser!(PathBuf)),
                        )
                        .arg(
                            Arg::new("rewrite")
                                .long("rewrite")
                                .help(t!("cli.catalog.rewrite").to_string())
                                .value_name("OUT")
                                .value_parser(clap::value_parser!(PathBuf))
                                .action(ArgAction::Set),
                        ),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.init.about").to_string())
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("cli.init.non_interactive").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .help(t!("cli.init.dir").to_string())
                        .value_name("DIR")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let cli_language = pre_parse_language();
    match &cli_language {
        Some(lang) => crate::set_language(lang),
        None => crate::init(),
    }

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let args = RunArgs {
                settings: run_matches
                    .get_one::<PathBuf>("settings")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from("settings.toml")),
                catalog: run_matches
                    .get_one::<PathBuf>("catalog")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from("catalog.toml")),
                jobs: run_matches.get_one::<usize>("jobs").copied(),
                sequential: run_matches.get_flag("sequential"),
                comparator: run_matches.get_one::<String>("comparator").cloned(),
                overrides: run_matches
                    .get_many::<String>("set")
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default(),
                filter: run_matches.get_one::<String>("filter").cloned(),
                total_runners: run_matches.get_one::<usize>("total-runners").copied(),
                runner_index: run_matches.get_one::<usize>("runner-index").copied(),
                strict: run_matches.get_flag("strict"),
                verbose: run_matches.get_flag("verbose"),
                language_forced: cli_language.is_some(),
            };
            commands::run::execute(args).await?;
        }
        Some(("catalog", catalog_matches)) => {
            if let Some(("check", check_matches)) = catalog_matches.subcommand() {
                let file = check_matches
                    .get_one::<PathBuf>("file")
                    .cloned()
                    .unwrap_or_default();
                let rewrite = check_matches.get_one::<PathBuf>("rewrite").cloned();
                commands::catalog::check(&file, rewrite.as_deref())?;
            }
        }
        Some(("init", init_matches)) => {
            let non_interactive = init_matches.get_flag("non-interactive");
            let dir = init_matches
                .get_one::<PathBuf>("dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("."));
            commands::init::execute(&dir, non_interactive)?;
        }
        _ => {
            // Clap has already printed help for a missing subcommand.
        }
    }
    Ok(())
}
