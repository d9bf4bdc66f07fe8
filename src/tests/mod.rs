use std::collections::HashSet;

use proptest::prelude::*;

use crate::dataset::{CaseTable, Column};
use crate::pipeline::projection::FIXED_COLUMNS;
use crate::pipeline::{
    self, aggregate, filters, DisplayMode, FilterParams, NameFilter, Preset, ProjectedTable,
    SpaSelection, TableLayout,
};
use crate::policy::StatusPolicy;

const STATUSES: [&str; 12] = [
    "New Supervisor (assigned)",
    "New PHN (assigned)",
    "Open",
    "Reassign",
    "Returned (by Investigator)",
    "Returned (by Supervisor)",
    "To Supervisor (under review)",
    "Returned (to Program)",
    "PHI Support Requested",
    "Closed",
    "Unknown Status",
    "",
];

fn case_table(rows: &[(&str, &str, &str, &str)]) -> CaseTable {
    let mut raw = String::from("Case ID,Status,SPA,Supervisor Name,Priority\n");
    for (i, (status, spa, supervisor, priority)) in rows.iter().enumerate() {
        raw.push_str(&format!("C-{i},{status},{spa},{supervisor},{priority}\n"));
    }
    CaseTable::from_reader(raw.as_bytes()).unwrap()
}

fn five_rows() -> CaseTable {
    case_table(&[
        ("Open", "A", "Jane Doe", "1"),
        ("Closed", "A", "Ann Lee", "2"),
        ("Reassign", "B", "Jane Doe", "3"),
        ("Unknown Status", "B", "", "4"),
        ("Open", "C", "Jane Doe", "5"),
    ])
}

#[test]
fn spa_then_supervisor_narrows_four_then_two() {
    let table = five_rows();
    let spa_only = FilterParams {
        spas: SpaSelection::only(["A", "B"]),
        ..Default::default()
    };
    assert_eq!(filters::apply(&table.view(), &spa_only).unwrap().len(), 4);

    let with_supervisor = FilterParams {
        supervisor: NameFilter::parse("Jane Doe"),
        ..spa_only
    };
    assert_eq!(
        filters::apply(&table.view(), &with_supervisor)
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn unknown_status_listed_in_table_but_not_in_distribution() {
    let table = five_rows();
    let report = pipeline::run(
        &table,
        &Preset::Triage.config(),
        &FilterParams::default(),
        DisplayMode::All,
    )
    .unwrap();
    let projected = report.table.unwrap();
    let status = projected.column_index("Status").unwrap();
    assert!(projected
        .rows
        .iter()
        .any(|r| r[status].display() == "Unknown Status"));
    assert!(report
        .status_distribution
        .unwrap()
        .iter()
        .all(|g| g.label != "Unknown Status"));
}

#[test]
fn empty_spa_selection_zeroes_every_metric() {
    let table = five_rows();
    let params = FilterParams {
        spas: SpaSelection::Only(Default::default()),
        ..Default::default()
    };
    for preset in [Preset::Triage, Preset::Program] {
        let raw = "Case ID,Status,SPA,Contact Made,Date Opened\nC-1,Open,A,past due,2024-01-01\n";
        let with_contact = CaseTable::from_reader(raw.as_bytes()).unwrap();
        for t in [&table, &with_contact] {
            let report = pipeline::run(t, &preset.config(), &params, DisplayMode::All).unwrap();
            assert_eq!(report.filtered_rows, 0);
            assert_eq!(report.metrics.active, Ok(0));
            assert_eq!(report.metrics.supervisor_action, Ok(0));
            assert_eq!(report.metrics.phi_pending, Ok(0));
            assert_eq!(report.metrics.closed, Ok(0));
            assert_eq!(report.status_distribution, Ok(vec![]));
        }
        let report =
            pipeline::run(&with_contact, &preset.config(), &params, DisplayMode::All).unwrap();
        assert_eq!(report.metrics.past_due, Ok(0));
    }
}

#[test]
fn fixed_column_selection_is_idempotent() {
    let raw = "\
Notes,Case ID,Contact Made,Status,Date Opened,SPA
x,C-1,on track,Open,2024-01-01,A
y,C-2,past due,Closed,,B
";
    let table = CaseTable::from_reader(raw.as_bytes()).unwrap();
    let once = pipeline::projection::project(&table.view(), TableLayout::Fixed).unwrap();
    let twice = once.select(&FIXED_COLUMNS);
    assert_eq!(once, twice);
    assert_eq!(
        once.columns,
        vec!["Case ID", "Status", "Date of Onset", "Contact Made", "SPA"]
    );
}

#[test]
fn policy_table_is_swappable_without_code_changes() {
    let table = five_rows();
    let mut config = Preset::Program.config();
    config.policy = StatusPolicy {
        order: vec!["Closed".to_string(), "Open".to_string()],
        active: vec!["Closed".to_string()],
        supervisor_action: Vec::new(),
        phi_status: "PHI Support Requested".to_string(),
        closed_status: "Closed".to_string(),
    };
    let report = pipeline::run(&table, &config, &FilterParams::default(), DisplayMode::All).unwrap();
    assert_eq!(report.metrics.active, Ok(1));
    let labels: Vec<String> = report
        .status_distribution
        .unwrap()
        .into_iter()
        .map(|g| g.label)
        .collect();
    assert_eq!(labels, vec!["Closed", "Open"]);
}

fn row_strategy() -> impl Strategy<Value = (usize, usize, usize, usize)> {
    (0..STATUSES.len(), 0..4usize, 0..3usize, 0..6usize)
}

fn table_from_indices(rows: &[(usize, usize, usize, usize)]) -> CaseTable {
    const SPAS: [&str; 4] = ["A", "B", "C", ""];
    const SUPERVISORS: [&str; 3] = ["Jane Doe", "Ann Lee", ""];
    const PRIORITIES: [&str; 6] = ["1", "2", "3", "4", "5", ""];
    let rows: Vec<(&str, &str, &str, &str)> = rows
        .iter()
        .map(|&(s, p, v, q)| (STATUSES[s], SPAS[p], SUPERVISORS[v], PRIORITIES[q]))
        .collect();
    case_table(&rows)
}

proptest! {
    #[test]
    fn filtering_only_narrows(
        rows in prop::collection::vec(row_strategy(), 0..40),
        spas in prop::collection::btree_set(prop::sample::select(vec!["A", "B", "C"]), 0..4),
        all_spas in any::<bool>(),
        supervisor in prop::sample::select(vec!["All", "Jane Doe", "Ann Lee"]),
    ) {
        let table = table_from_indices(&rows);
        let params = FilterParams {
            spas: if all_spas { SpaSelection::All } else { SpaSelection::only(spas) },
            supervisor: NameFilter::parse(supervisor),
            investigator: NameFilter::All,
        };
        let out = filters::apply(&table.view(), &params).unwrap();
        prop_assert!(out.len() <= table.len());
        let input: HashSet<usize> = table.view().indices().iter().copied().collect();
        prop_assert!(out.indices().iter().all(|i| input.contains(i)));
    }

    #[test]
    fn active_unknown_and_closed_partition_the_filtered_set(
        rows in prop::collection::vec(row_strategy(), 0..40),
    ) {
        let table = table_from_indices(&rows);
        let config = Preset::Program.config();
        let report = pipeline::run(&table, &config, &FilterParams::default(), DisplayMode::All).unwrap();
        let status = table.index_of(Column::Status).unwrap();
        let unknown = table
            .rows()
            .iter()
            .filter(|r| r.text(status).map(|s| !config.policy.is_known(s)).unwrap_or(true))
            .count();
        let active = report.metrics.active.clone().unwrap();
        let closed = report.metrics.closed.clone().unwrap();
        prop_assert_eq!(active + unknown + closed, report.filtered_rows);
    }

    #[test]
    fn distribution_order_ignores_row_order(
        rows in prop::collection::vec(row_strategy(), 1..40)
            .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle())),
    ) {
        let (original, shuffled) = rows;
        let policy = StatusPolicy::program();
        let a = aggregate::status_distribution(&table_from_indices(&original).view(), &policy).unwrap();
        let b = aggregate::status_distribution(&table_from_indices(&shuffled).view(), &policy).unwrap();
        prop_assert_eq!(&a, &b);
        let ranks: Vec<usize> = a.iter().map(|g| policy.rank(&g.label).unwrap()).collect();
        prop_assert!(ranks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn priority_groups_ascend(
        rows in prop::collection::vec(row_strategy(), 0..40),
    ) {
        let table = table_from_indices(&rows);
        let groups = aggregate::by_priority(&table.view()).unwrap();
        let values: Vec<u32> = groups.iter().map(|g| g.label.parse().unwrap()).collect();
        prop_assert!(values.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(values.iter().all(|v| (1..=5).contains(v)));
    }

    #[test]
    fn reselecting_projection_changes_nothing(
        rows in prop::collection::vec(row_strategy(), 0..20),
    ) {
        let table = table_from_indices(&rows);
        let once = ProjectedTable::from_view(&table.view()).select(&FIXED_COLUMNS);
        prop_assert_eq!(once.select(&FIXED_COLUMNS), once.clone());
    }
}
