use std::cmp::Reverse;

use serde::Serialize;

use crate::dataset::column::DATE_OF_ONSET;
use crate::dataset::{Cell, CaseView, Column};

use super::{PipelineError, Section};

/// Display order of the fixed layout. Absent columns are skipped.
pub const FIXED_COLUMNS: [&str; 12] = [
    "Case ID",
    "Type",
    "Patient Name",
    "Disease",
    "Status",
    "Priority",
    DATE_OF_ONSET,
    "Initial Contact Date",
    "Contact Made",
    "SPA",
    "Supervisor Name",
    "Investigator Name",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableLayout {
    /// Rename `Date Opened`, keep [`FIXED_COLUMNS`], decorate ids and contact flags.
    Fixed,
    /// Every source column with `Status` after `Case ID`, newest cases first.
    StatusFirst,
}

impl TableLayout {
    pub fn decorates(self) -> bool {
        matches!(self, TableLayout::Fixed)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProjectedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ProjectedTable {
    pub fn from_view(view: &CaseView<'_>) -> Self {
        Self {
            columns: view.table().headers().to_vec(),
            rows: view.iter().map(|row| row.cells().to_vec()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rename(mut self, from: &str, to: &str) -> Self {
        if let Some(idx) = self.column_index(from) {
            self.columns[idx] = to.to_string();
        }
        self
    }

    /// Keeps the listed columns that exist, in list order.
    pub fn select(&self, names: &[&str]) -> Self {
        let picked: Vec<usize> = names.iter().filter_map(|n| self.column_index(n)).collect();
        Self {
            columns: picked.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| picked.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Moves `column` to sit right after `anchor`. No-op unless both exist.
    pub fn move_after(mut self, column: &str, anchor: &str) -> Self {
        let (Some(from), Some(_)) = (self.column_index(column), self.column_index(anchor)) else {
            return self;
        };
        let name = self.columns.remove(from);
        let cells: Vec<Cell> = self.rows.iter_mut().map(|row| row.remove(from)).collect();
        let to = self.column_index(anchor).map(|i| i + 1).unwrap_or(0);
        self.columns.insert(to, name);
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.insert(to, cell);
        }
        self
    }

    /// Stable sort, newest first; rows without a date go last.
    pub fn sort_by_date_desc(mut self, column: &str) -> Result<Self, PipelineError> {
        let idx = self
            .column_index(column)
            .ok_or(PipelineError::MissingColumn {
                column: Column::DateOpened.header(),
            })?;
        self.rows.sort_by_key(|row| match row[idx].as_date() {
            Some(date) => (0, Some(Reverse(date))),
            None => (1, None),
        });
        Ok(self)
    }
}

pub fn project(view: &CaseView<'_>, layout: TableLayout) -> Section<ProjectedTable> {
    let table = ProjectedTable::from_view(view);
    match layout {
        TableLayout::Fixed => Ok(table
            .rename(Column::DateOpened.header(), DATE_OF_ONSET)
            .select(&FIXED_COLUMNS)),
        TableLayout::StatusFirst => table
            .move_after(Column::Status.header(), Column::CaseId.header())
            .sort_by_date_desc(Column::DateOpened.header()),
    }
}
