//! # External Diff Tool Engine / 外部差异工具引擎
//!
//! Shells out to a line-diff utility (`diff -u` by default). Exit status 0
//! means identical, 1 means different with the diff on stdout, anything else
//! is a failure of the diff tool itself.
//!
//! 调用外部行差异工具（默认 `diff -u`）。退出码 0 表示相同，1 表示不同且差异在
//! stdout 中，其他情况表示差异工具本身失败。

use futures::future::BoxFuture;
use std::path::Path;
use std::process::Stdio;

use crate::compare::report::{DiffBody, DiffOutcome};
use crate::compare::{DiffEngine, ensure_readable};
use crate::core::error::ComparisonError;

#[derive(Debug, Clone)]
pub struct DiffToolEngine {
    program: String,
    args: Vec<String>,
}

impl DiffToolEngine {
    /// `command_line` is the program followed by its fixed arguments. The
    /// reference and produced paths are appended, in that order.
    pub fn new(command_line: &[String]) -> Self {
        let mut parts = command_line.iter().cloned();
        let program = parts.next().unwrap_or_else(|| "diff".to_string());
        Self {
            program,
            args: parts.collect(),
        }
    }
}

impl DiffEngine for DiffToolEngine {
    fn diff<'a>(
        &'a self,
        produced: &'a Path,
        reference: &'a Path,
    ) -> BoxFuture<'a, Result<DiffOutcome, ComparisonError>> {
        Box::pin(async move {
            ensure_readable("produced", produced).await?;
            ensure_readable("reference", reference).await?;

            // Awaits process completion directly; no exit-state polling.
            let output = tokio::process::Command::new(&self.program)
                .args(&self.args)
                .arg(reference)
                .arg(produced)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|source| ComparisonError::DiffToolLaunch {
                    program: self.program.clone(),
                    source,
                })?;

            match output.status.code() {
                Some(0) => Ok(DiffOutcome::Identical),
                Some(1) => Ok(DiffOutcome::Different(DiffBody::Text(
                    String::from_utf8_lossy(&output.stdout).into_owned(),
                ))),
                other => Err(ComparisonError::DiffToolFailed {
                    program: self.program.clone(),
                    status: other
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "signal".to_string()),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                }),
            }
        })
    }
}
