//! Run numbering for templates administered more than once.
//!
//! Groups that come from the same source file are runs of one
//! questionnaire. Their `(Run k)` suffixes and run numbers are always
//! derived from the current group order, never edited directly.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use survey_model::Group;
use tracing::debug;

static RUN_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(Run \d+\)\s*$").expect("Invalid run suffix regex"));

/// Remove a trailing `(Run k)` suffix.
pub fn strip_run_suffix(name: &str) -> &str {
    match RUN_SUFFIX.find(name) {
        Some(found) => &name[..found.start()],
        None => name,
    }
}

/// Display name of run `run` of a group called `name`.
pub fn run_label(name: &str, run: u32) -> String {
    format!("{} (Run {run})", strip_run_suffix(name))
}

/// Recompute run numbers and name suffixes for all groups.
///
/// Returns the indices of groups whose name or run state changed. Applying
/// it twice without reordering changes nothing the second time.
pub fn renumber_runs(groups: &mut [Group]) -> Vec<usize> {
    let mut by_source: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, group) in groups.iter().enumerate() {
        if let Some(source) = group.source_file.as_deref() {
            by_source.entry(source.to_string()).or_default().push(index);
        }
    }

    let mut changed = Vec::new();
    for (source, mut indices) in by_source {
        indices.sort_by_key(|&index| groups[index].order);
        let multi_run = indices.len() > 1;
        for (position, &index) in indices.iter().enumerate() {
            let run = multi_run.then(|| position as u32 + 1);
            if apply_run(&mut groups[index], run) {
                changed.push(index);
            }
        }
        if multi_run {
            debug!(source = %source, runs = indices.len(), "renumbered runs");
        }
    }
    changed.sort_unstable();
    changed
}

fn apply_run(group: &mut Group, run: Option<u32>) -> bool {
    let name = match run {
        Some(run) => run_label(&group.name, run),
        None => strip_run_suffix(&group.name).to_string(),
    };
    let mut changed = false;
    if group.name != name {
        group.name = name;
        changed = true;
    }
    if group.run_number != run {
        group.run_number = run;
        changed = true;
    }
    for item in &mut group.items {
        if item.run_number != run {
            item.run_number = run;
            changed = true;
        }
    }
    changed
}
