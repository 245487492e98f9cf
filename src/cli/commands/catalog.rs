//! # Catalog Command Module / 目录命令模块
//!
//! `catalog check`: validates a catalog file and optionally re-serializes it.
//!
//! `catalog check`：验证目录文件，并可选择重新序列化。

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use crate::core::catalog::Catalog;
use crate::infra::t;

/// Loads and validates `file`; writes it back out to `rewrite` when given.
pub fn check(file: &Path, rewrite: Option<&Path>) -> Result<()> {
    let catalog = Catalog::load(file)
        .with_context(|| t!("run.catalog_failed", path = file.display()).to_string())?;

    println!(
        "{}",
        t!("catalog.valid", path = file.display(), count = catalog.len()).green()
    );

    if let Some(out) = rewrite {
        catalog
            .save(out)
            .with_context(|| t!("catalog.rewrite_failed", path = out.display()).to_string())?;
        println!("{}", t!("catalog.rewritten", path = out.display()));
    }
    Ok(())
}
