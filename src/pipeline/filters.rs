use std::collections::BTreeSet;

use crate::dataset::{CaseView, Column, ALL_SENTINEL};

use super::PipelineError;

/// SPA selector. `All` mirrors the default "every SPA selected" state and
/// keeps rows whose SPA is null.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SpaSelection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl SpaSelection {
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(
            values
                .into_iter()
                .map(|v| v.into().trim().to_string())
                .collect(),
        )
    }

    pub fn matches(&self, spa: Option<&str>) -> bool {
        match self {
            SpaSelection::All => true,
            SpaSelection::Only(set) => spa.map(|s| set.contains(s)).unwrap_or(false),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NameFilter {
    #[default]
    All,
    Exact(String),
}

impl NameFilter {
    /// `All` (or an empty value) selects everyone; anything else is an exact name.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ALL_SENTINEL {
            NameFilter::All
        } else {
            NameFilter::Exact(trimmed.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            NameFilter::All => ALL_SENTINEL,
            NameFilter::Exact(name) => name.as_str(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterParams {
    pub spas: SpaSelection,
    pub supervisor: NameFilter,
    pub investigator: NameFilter,
}

/// SPA, then supervisor, then investigator. Each step narrows the last.
pub fn apply<'a>(view: &CaseView<'a>, params: &FilterParams) -> Result<CaseView<'a>, PipelineError> {
    let table = view.table();

    let mut out = match &params.spas {
        SpaSelection::All => view.clone(),
        SpaSelection::Only(set) if set.is_empty() => view.empty(),
        selection => {
            let idx = table.require(Column::Spa)?;
            view.narrow(|row| selection.matches(row.text(idx)))
        }
    };
    tracing::debug!(rows = out.len(), "after SPA filter");

    for (column, filter) in [
        (Column::SupervisorName, &params.supervisor),
        (Column::InvestigatorName, &params.investigator),
    ] {
        if let NameFilter::Exact(name) = filter {
            let idx = table.require(column)?;
            out = out.narrow(|row| row.text(idx) == Some(name.as_str()));
            tracing::debug!(rows = out.len(), column = column.header(), "after name filter");
        }
    }
    Ok(out)
}
