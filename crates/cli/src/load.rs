//! Task file loading and checking.

use std::path::Path;

use anyhow::{Context, Result};
use shiftgrid_recurrence::RecurringTask;

pub fn load_task(path: &Path) -> Result<RecurringTask> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&yaml).with_context(|| format!("failed to parse {}", path.display()))
}

/// Every problem with the task, as `path: message` lines. Empty when valid.
pub fn check_task(task: &RecurringTask) -> Vec<String> {
    let mut problems: Vec<String> = task
        .pattern
        .violations()
        .iter()
        .map(|v| format!("pattern.{v}"))
        .collect();
    if let Err(e) = task.template.validate() {
        problems.push(format!("template: {e}"));
    }
    problems
}
