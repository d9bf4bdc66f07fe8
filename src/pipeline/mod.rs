//! Case filter and aggregation pipeline.
//!
//! `run` is a pure function of the case table, the pipeline config and the
//! filter selections. Every stage works on read-only views; a column missing
//! from the case file fails only the sections that read it.

pub mod aggregate;
pub mod filters;
pub mod metrics;
pub mod preset;
pub mod projection;

use thiserror::Error;

use crate::dataset::{CaseTable, CaseView, Column, FilterOptions};

pub use aggregate::{Breakdowns, GroupCount};
pub use filters::{FilterParams, NameFilter, SpaSelection};
pub use metrics::{FourthMetric, MetricKey, Metrics};
pub use preset::{PipelineConfig, Preset};
pub use projection::{ProjectedTable, TableLayout};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("expected column '{column}' absent")]
    MissingColumn { column: &'static str },
}

/// Output of one independently computed stage.
pub type Section<T> = Result<T, PipelineError>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    All,
    Active,
    Closed,
    NeedsSupervisorAction,
}

impl DisplayMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "all" => Some(Self::All),
            "active" | "active cases" => Some(Self::Active),
            "closed" | "closed cases" => Some(Self::Closed),
            "supervisor"
            | "needs-supervisor-action"
            | "needs supervisor action"
            | "cases needing supervisor action" => Some(Self::NeedsSupervisorAction),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::All => "All",
            DisplayMode::Active => "Active Cases",
            DisplayMode::Closed => "Closed Cases",
            DisplayMode::NeedsSupervisorAction => "Cases Needing Supervisor Action",
        }
    }
}

#[derive(Clone, Debug)]
pub struct DashboardReport {
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub metrics: Metrics,
    pub fourth_metric: FourthMetric,
    pub status_distribution: Section<Vec<GroupCount>>,
    pub display_mode: DisplayMode,
    pub table: Section<ProjectedTable>,
    pub layout: TableLayout,
    pub breakdowns: Breakdowns,
    pub options: FilterOptions,
}

/// Rows of the filtered set whose status satisfies `pred`.
pub fn with_status<'a, F>(view: &CaseView<'a>, pred: F) -> Section<CaseView<'a>>
where
    F: Fn(&str) -> bool,
{
    let idx = view.table().require(Column::Status)?;
    Ok(view.narrow(|row| row.text(idx).map(&pred).unwrap_or(false)))
}

pub fn select_table<'a>(
    view: &CaseView<'a>,
    config: &PipelineConfig,
    mode: DisplayMode,
) -> Section<CaseView<'a>> {
    let policy = &config.policy;
    match mode {
        DisplayMode::All => Ok(view.clone()),
        DisplayMode::Active => with_status(view, |s| policy.is_active(s)),
        DisplayMode::Closed => with_status(view, |s| policy.is_closed(s)),
        DisplayMode::NeedsSupervisorAction => {
            with_status(view, |s| policy.needs_supervisor_action(s))
        }
    }
}

pub fn run(
    table: &CaseTable,
    config: &PipelineConfig,
    params: &FilterParams,
    mode: DisplayMode,
) -> Result<DashboardReport, PipelineError> {
    let filtered = filters::apply(&table.view(), params)?;
    let policy = &config.policy;

    let metrics = metrics::compute(&filtered, policy);
    let status_distribution = aggregate::status_distribution(&filtered, policy);

    let table_view = select_table(&filtered, config, mode);
    let projected = table_view.and_then(|v| projection::project(&v, config.layout));
    if let Err(err) = &projected {
        tracing::warn!(%err, "case table unavailable");
    }

    let breakdowns = match with_status(&filtered, |s| policy.is_active(s)) {
        Ok(active) => aggregate::breakdowns(&active),
        Err(err) => Breakdowns::unavailable(err),
    };

    tracing::info!(
        total = table.len(),
        filtered = filtered.len(),
        mode = mode.label(),
        "dashboard computed"
    );

    Ok(DashboardReport {
        total_rows: table.len(),
        filtered_rows: filtered.len(),
        metrics,
        fourth_metric: config.fourth_metric,
        status_distribution,
        display_mode: mode,
        table: projected,
        layout: config.layout,
        breakdowns,
        options: FilterOptions::from_table(table),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "\
Case ID,Status,SPA,Program,Type,Priority,Date Opened,Contact Made,Supervisor Name
1,Open,A,TB,Index,2,2024-01-01,on track,Jane Doe
2,Closed,A,TB,Index,1,2024-01-02,past due,Jane Doe
3,Reassign,B,STD,Contact,1,2024-01-03,past due,Ann Lee
4,Unknown Status,B,STD,Contact,3,2024-01-04,on track,
";

    fn table() -> CaseTable {
        CaseTable::from_reader(RAW.as_bytes()).unwrap()
    }

    #[test]
    fn display_modes_select_policy_subsets() {
        let table = table();
        let config = Preset::Program.config();
        let view = table.view();
        let count = |mode| select_table(&view, &config, mode).unwrap().len();
        assert_eq!(count(DisplayMode::All), 4);
        assert_eq!(count(DisplayMode::Active), 2);
        assert_eq!(count(DisplayMode::Closed), 1);
        assert_eq!(count(DisplayMode::NeedsSupervisorAction), 1);
    }

    #[test]
    fn breakdowns_use_active_subset_only() {
        let table = table();
        let report = run(
            &table,
            &Preset::Program.config(),
            &FilterParams::default(),
            DisplayMode::All,
        )
        .unwrap();
        let priority = report.breakdowns.priority.unwrap();
        assert_eq!(
            priority,
            vec![GroupCount::new("1", 1), GroupCount::new("2", 1)]
        );
        assert_eq!(
            report.breakdowns.program.unwrap(),
            vec![GroupCount::new("STD", 1), GroupCount::new("TB", 1)]
        );
    }

    #[test]
    fn missing_status_degrades_sections_not_the_run() {
        let raw = "Case ID,SPA,Contact Made\n1,A,past due\n";
        let table = CaseTable::from_reader(raw.as_bytes()).unwrap();
        let report = run(
            &table,
            &Preset::Triage.config(),
            &FilterParams::default(),
            DisplayMode::Active,
        )
        .unwrap();
        let missing = PipelineError::MissingColumn { column: "Status" };
        assert_eq!(report.metrics.active, Err(missing.clone()));
        assert_eq!(report.metrics.past_due, Ok(1));
        assert_eq!(report.status_distribution, Err(missing.clone()));
        assert_eq!(report.table.unwrap_err(), missing.clone());
        assert_eq!(report.breakdowns.spa, Err(missing));
    }

    #[test]
    fn mode_parse_accepts_labels() {
        assert_eq!(
            DisplayMode::parse("Cases Needing Supervisor Action"),
            Some(DisplayMode::NeedsSupervisorAction)
        );
        assert_eq!(DisplayMode::parse("closed"), Some(DisplayMode::Closed));
        assert_eq!(DisplayMode::parse("pending"), None);
    }
}
