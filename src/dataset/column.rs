use chrono::NaiveDate;
use serde::Serialize;

/// Header shown in place of `Date Opened` by the fixed table layout.
pub const DATE_OF_ONSET: &str = "Date of Onset";

/// Columns the dashboard knows by name. Any other column in the case file
/// is carried through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    CaseId,
    Type,
    PatientName,
    Disease,
    Status,
    Priority,
    DateOpened,
    InitialContactDate,
    ContactMade,
    Program,
    Spa,
    SupervisorName,
    InvestigatorName,
}

impl Column {
    pub const ALL: [Column; 13] = [
        Column::CaseId,
        Column::Type,
        Column::PatientName,
        Column::Disease,
        Column::Status,
        Column::Priority,
        Column::DateOpened,
        Column::InitialContactDate,
        Column::ContactMade,
        Column::Program,
        Column::Spa,
        Column::SupervisorName,
        Column::InvestigatorName,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::CaseId => "Case ID",
            Column::Type => "Type",
            Column::PatientName => "Patient Name",
            Column::Disease => "Disease",
            Column::Status => "Status",
            Column::Priority => "Priority",
            Column::DateOpened => "Date Opened",
            Column::InitialContactDate => "Initial Contact Date",
            Column::ContactMade => "Contact Made",
            Column::Program => "Program",
            Column::Spa => "SPA",
            Column::SupervisorName => "Supervisor Name",
            Column::InvestigatorName => "Investigator Name",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.header() == header)
    }

    pub fn is_date(self) -> bool {
        matches!(self, Column::DateOpened | Column::InitialContactDate)
    }
}

/// One value of a case row. Empty source cells are `Empty` (null).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(value) => value.clone(),
            Cell::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Punctuality flag carried in the `Contact Made` column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContactMade {
    OnTrack,
    PastDue,
    Other(String),
}

impl ContactMade {
    /// Accepts `on track`, `on_track`, `On-Track` and the same spellings of
    /// `past due`. Anything else is kept verbatim.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw
            .trim()
            .to_lowercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match normalized.as_str() {
            "on track" => ContactMade::OnTrack,
            "past due" => ContactMade::PastDue,
            _ => ContactMade::Other(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ContactMade::OnTrack => "on track",
            ContactMade::PastDue => "past due",
            ContactMade::Other(raw) => raw.as_str(),
        }
    }
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(trimmed, f).ok())
    {
        return Some(date);
    }
    // date-time values keep only their date part
    let head = trimmed.split(|c| c == 'T' || c == ' ').next()?;
    if head.len() == trimmed.len() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(head, f).ok())
}
