use crate::dataset::{CaseView, Column, ContactMade};
use crate::policy::StatusPolicy;

use super::{PipelineError, Section};

/// Which counter fills the fourth headline card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FourthMetric {
    PastDue,
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metrics {
    pub active: Section<usize>,
    pub supervisor_action: Section<usize>,
    pub phi_pending: Section<usize>,
    pub past_due: Section<usize>,
    pub closed: Section<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKey {
    Active,
    SupervisorAction,
    PhiPending,
    PastDue,
    Closed,
}

impl MetricKey {
    pub const ALL: [MetricKey; 5] = [
        MetricKey::Active,
        MetricKey::SupervisorAction,
        MetricKey::PhiPending,
        MetricKey::PastDue,
        MetricKey::Closed,
    ];

    pub fn id(self) -> &'static str {
        match self {
            MetricKey::Active => "active",
            MetricKey::SupervisorAction => "supervisor_action",
            MetricKey::PhiPending => "phi_pending",
            MetricKey::PastDue => "past_due",
            MetricKey::Closed => "closed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricKey::Active => "Active Cases",
            MetricKey::SupervisorAction => "Supervisor Action Needed",
            MetricKey::PhiPending => "Currently with PHI",
            MetricKey::PastDue => "Records Past Due",
            MetricKey::Closed => "Closed Cases",
        }
    }
}

impl From<FourthMetric> for MetricKey {
    fn from(value: FourthMetric) -> Self {
        match value {
            FourthMetric::PastDue => MetricKey::PastDue,
            FourthMetric::Closed => MetricKey::Closed,
        }
    }
}

impl Metrics {
    pub fn get(&self, key: MetricKey) -> &Section<usize> {
        match key {
            MetricKey::Active => &self.active,
            MetricKey::SupervisorAction => &self.supervisor_action,
            MetricKey::PhiPending => &self.phi_pending,
            MetricKey::PastDue => &self.past_due,
            MetricKey::Closed => &self.closed,
        }
    }

    /// The four cards shown across the top of the dashboard.
    pub fn headline(fourth: FourthMetric) -> [MetricKey; 4] {
        [
            MetricKey::Active,
            MetricKey::SupervisorAction,
            MetricKey::PhiPending,
            fourth.into(),
        ]
    }
}

fn count_status<F>(view: &CaseView<'_>, pred: F) -> Section<usize>
where
    F: Fn(&str) -> bool,
{
    let idx = view.table().require(Column::Status)?;
    Ok(view
        .iter()
        .filter(|row| row.text(idx).map(&pred).unwrap_or(false))
        .count())
}

pub fn active_count(view: &CaseView<'_>, policy: &StatusPolicy) -> Section<usize> {
    count_status(view, |s| policy.is_active(s))
}

pub fn supervisor_action_count(view: &CaseView<'_>, policy: &StatusPolicy) -> Section<usize> {
    count_status(view, |s| policy.needs_supervisor_action(s))
}

pub fn phi_pending_count(view: &CaseView<'_>, policy: &StatusPolicy) -> Section<usize> {
    count_status(view, |s| policy.is_phi_pending(s))
}

pub fn closed_count(view: &CaseView<'_>, policy: &StatusPolicy) -> Section<usize> {
    count_status(view, |s| policy.is_closed(s))
}

pub fn past_due_count(view: &CaseView<'_>) -> Section<usize> {
    let idx = view.table().require(Column::ContactMade)?;
    Ok(view
        .iter()
        .filter(|row| {
            row.text(idx)
                .map(|v| ContactMade::parse(v) == ContactMade::PastDue)
                .unwrap_or(false)
        })
        .count())
}

pub fn compute(view: &CaseView<'_>, policy: &StatusPolicy) -> Metrics {
    let metrics = Metrics {
        active: active_count(view, policy),
        supervisor_action: supervisor_action_count(view, policy),
        phi_pending: phi_pending_count(view, policy),
        past_due: past_due_count(view),
        closed: closed_count(view, policy),
    };
    for key in MetricKey::ALL {
        if let Err(PipelineError::MissingColumn { column }) = metrics.get(key) {
            tracing::warn!(metric = key.id(), column, "metric unavailable");
        }
    }
    metrics
}
