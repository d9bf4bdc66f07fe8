use std::cmp::Ordering;

use itertools::Itertools;
use serde::Serialize;

use crate::dataset::{CaseView, Column};
use crate::policy::StatusPolicy;

use super::Section;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub label: String,
    pub count: usize,
}

impl GroupCount {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Breakdowns of the active subset, one series per chart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breakdowns {
    pub program: Section<Vec<GroupCount>>,
    pub spa: Section<Vec<GroupCount>>,
    pub case_type: Section<Vec<GroupCount>>,
    pub priority: Section<Vec<GroupCount>>,
}

impl Breakdowns {
    pub fn unavailable(err: super::PipelineError) -> Self {
        Self {
            program: Err(err.clone()),
            spa: Err(err.clone()),
            case_type: Err(err.clone()),
            priority: Err(err),
        }
    }
}

fn grouped(view: &CaseView<'_>, column: Column) -> Section<Vec<GroupCount>> {
    let idx = view.table().require(column)?;
    Ok(view
        .iter()
        .filter_map(|row| row.text(idx))
        .counts()
        .into_iter()
        .map(|(label, count)| GroupCount::new(label, count))
        .sorted_by(|a, b| a.label.cmp(&b.label))
        .collect())
}

fn by_count_desc(a: &GroupCount, b: &GroupCount) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label))
}

/// Count per status in taxonomy order. Unknown and null statuses are left out.
pub fn status_distribution(view: &CaseView<'_>, policy: &StatusPolicy) -> Section<Vec<GroupCount>> {
    let groups = grouped(view, Column::Status)?;
    Ok(groups
        .into_iter()
        .filter_map(|g| policy.rank(&g.label).map(|rank| (rank, g)))
        .sorted_by_key(|(rank, _)| *rank)
        .map(|(_, g)| g)
        .collect())
}

pub fn by_program(active: &CaseView<'_>) -> Section<Vec<GroupCount>> {
    let mut groups = grouped(active, Column::Program)?;
    groups.sort_by(by_count_desc);
    Ok(groups)
}

pub fn by_spa(active: &CaseView<'_>) -> Section<Vec<GroupCount>> {
    let mut groups = grouped(active, Column::Spa)?;
    groups.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(groups)
}

pub fn by_type(active: &CaseView<'_>) -> Section<Vec<GroupCount>> {
    let mut groups = grouped(active, Column::Type)?;
    groups.sort_by(by_count_desc);
    Ok(groups)
}

/// Numeric priorities ascend (`1`..`5`); anything non-numeric sorts last.
/// Labels with the same numeric value (`1`, `01`) fall back to label order.
fn priority_key(label: &str) -> (u8, u64, String) {
    match label.trim().parse::<u64>() {
        Ok(n) => (0, n, label.to_string()),
        Err(_) => (1, 0, label.to_string()),
    }
}

pub fn by_priority(active: &CaseView<'_>) -> Section<Vec<GroupCount>> {
    let mut groups = grouped(active, Column::Priority)?;
    groups.sort_by_cached_key(|g| priority_key(&g.label));
    Ok(groups)
}

pub fn breakdowns(active: &CaseView<'_>) -> Breakdowns {
    Breakdowns {
        program: by_program(active),
        spa: by_spa(active),
        case_type: by_type(active),
        priority: by_priority(active),
    }
}
