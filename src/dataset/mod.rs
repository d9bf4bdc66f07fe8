pub mod column;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

pub use column::{Cell, Column, ContactMade};

use crate::pipeline::PipelineError;

/// Sentinel offered ahead of the supervisor and investigator names.
pub const ALL_SENTINEL: &str = "All";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open case file: {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed case file: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("case file has no header row")]
    MissingHeader,

    #[error("invalid date in column '{column}' at line {line}: '{value}'")]
    InvalidDate {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseRow {
    cells: Vec<Cell>,
}

impl CaseRow {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    pub fn text(&self, idx: usize) -> Option<&str> {
        self.cells.get(idx).and_then(Cell::as_text)
    }
}

/// The immutable case file, loaded once per run.
#[derive(Clone, Debug)]
pub struct CaseTable {
    headers: Vec<String>,
    rows: Vec<CaseRow>,
}

impl CaseTable {
    pub fn new(headers: Vec<String>, rows: Vec<CaseRow>) -> Result<Self, DatasetError> {
        if headers.is_empty() {
            return Err(DatasetError::MissingHeader);
        }
        for (row, case) in rows.iter().enumerate() {
            if case.cells.len() != headers.len() {
                return Err(DatasetError::RowWidth {
                    row,
                    found: case.cells.len(),
                    expected: headers.len(),
                });
            }
        }
        Ok(Self { headers, rows })
    }

    pub fn load_csv(path: &Path) -> Result<Self, DatasetError> {
        let handle = File::open(path).map_err(|e| DatasetError::Open {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_reader(handle)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(DatasetError::MissingHeader);
        }
        let date_columns: Vec<Option<Column>> = headers
            .iter()
            .map(|h| Column::from_header(h).filter(|c| c.is_date()))
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let mut cells = Vec::with_capacity(headers.len());
            for (raw, date_column) in record.iter().zip(date_columns.iter()) {
                cells.push(parse_cell(raw, *date_column, line)?);
            }
            rows.push(CaseRow { cells });
        }

        tracing::debug!(rows = rows.len(), columns = headers.len(), "case file parsed");
        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[CaseRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index_of(&self, column: Column) -> Option<usize> {
        self.index_of_header(column.header())
    }

    pub fn index_of_header(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn require(&self, column: Column) -> Result<usize, PipelineError> {
        self.index_of(column).ok_or(PipelineError::MissingColumn {
            column: column.header(),
        })
    }

    /// Sorted distinct non-null values of a text column.
    pub fn distinct_values(&self, column: Column) -> Vec<String> {
        let Some(idx) = self.index_of(column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|r| r.text(idx))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn view(&self) -> CaseView<'_> {
        CaseView {
            table: self,
            rows: (0..self.rows.len()).collect(),
        }
    }
}

fn parse_cell(raw: &str, date_column: Option<Column>, line: u64) -> Result<Cell, DatasetError> {
    if raw.is_empty() {
        return Ok(Cell::Empty);
    }
    match date_column {
        Some(column) => column::parse_date(raw)
            .map(Cell::Date)
            .ok_or_else(|| DatasetError::InvalidDate {
                line,
                column: column.header(),
                value: raw.to_string(),
            }),
        None => Ok(Cell::Text(raw.to_string())),
    }
}

/// A read-only subset of a [`CaseTable`], kept as row indices in source order.
#[derive(Clone, Debug)]
pub struct CaseView<'a> {
    table: &'a CaseTable,
    rows: Vec<usize>,
}

impl<'a> CaseView<'a> {
    pub fn table(&self) -> &'a CaseTable {
        self.table
    }

    pub fn indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CaseRow> + '_ {
        let table = self.table;
        self.rows.iter().map(move |&i| &table.rows[i])
    }

    pub fn narrow<F>(&self, mut keep: F) -> CaseView<'a>
    where
        F: FnMut(&CaseRow) -> bool,
    {
        let table = self.table;
        CaseView {
            table,
            rows: self
                .rows
                .iter()
                .copied()
                .filter(|&i| keep(&table.rows[i]))
                .collect(),
        }
    }

    pub fn empty(&self) -> CaseView<'a> {
        CaseView {
            table: self.table,
            rows: Vec::new(),
        }
    }
}

/// Values offered by the SPA, supervisor and investigator selectors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub spas: Vec<String>,
    pub supervisors: Vec<String>,
    pub investigators: Vec<String>,
}

impl FilterOptions {
    pub fn from_table(table: &CaseTable) -> Self {
        let with_sentinel = |column: Column| {
            let mut values = vec![ALL_SENTINEL.to_string()];
            values.extend(table.distinct_values(column));
            values
        };
        Self {
            spas: table.distinct_values(Column::Spa),
            supervisors: with_sentinel(Column::SupervisorName),
            investigators: with_sentinel(Column::InvestigatorName),
        }
    }
}
