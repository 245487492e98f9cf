//! # Execution Planner Module / 执行计划模块
//!
//! Narrows a catalog down to the entries this invocation should run: an
//! optional sample-path filter and optional round-robin sharding across split
//! CI runners. Catalog order and original indices are preserved.
//!
//! 将目录缩减为本次调用应运行的条目：可选的样本路径过滤，以及可选的在多个 CI
//! 运行器之间的轮询分片。保留目录顺序和原始索引。

use anyhow::{Result, bail};

use crate::core::models::TestEntry;

/// An entry selected for execution, tagged with its catalog position.
/// 被选中执行的条目，附带其在目录中的位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    pub index: usize,
    pub entry: TestEntry,
}

/// Represents the complete execution plan for a catalog.
/// 表示目录的完整执行计划。
#[derive(Debug)]
pub struct ExecutionPlan {
    pub entries: Vec<PlannedEntry>,
    /// Entries dropped by the sample filter / 被样本过滤器丢弃的条目数
    pub filtered_count: usize,
    pub is_distributed: bool,
}

/// Creates an execution plan.
///
/// # Arguments
/// * `entries` - The full catalog, in order
/// * `filter` - Optional substring the sample path must contain
/// * `total_runners` - Optional total number of runners for distributed execution
/// * `runner_index` - Optional index of this runner (0-based)
pub fn plan_execution(
    entries: Vec<TestEntry>,
    filter: Option<&str>,
    total_runners: Option<usize>,
    runner_index: Option<usize>,
) -> Result<ExecutionPlan> {
    let total = entries.len();
    let selected: Vec<PlannedEntry> = entries
        .into_iter()
        .enumerate()
        .filter(|(_, entry)| filter.is_none_or(|f| entry.sample_file.contains(f)))
        .map(|(index, entry)| PlannedEntry { index, entry })
        .collect();
    let filtered_count = total - selected.len();

    let (entries, is_distributed) = match (total_runners, runner_index) {
        (Some(total), Some(index)) => {
            if total == 0 {
                bail!("Total runners must be at least 1.");
            }
            if index >= total {
                bail!("Runner index must be less than total runners.");
            }
            let shard = selected
                .into_iter()
                .enumerate()
                .filter(|(i, _)| i % total == index)
                .map(|(_, planned)| planned)
                .collect();
            (shard, true)
        }
        (None, None) => (selected, false),
        _ => bail!("Both --total-runners and --runner-index must be provided."),
    };

    Ok(ExecutionPlan {
        entries,
        filtered_count,
        is_distributed,
    })
}
