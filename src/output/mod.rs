pub mod markup;
pub mod report;

use colored::Colorize;
use serde::Serialize;

use crate::dataset::FilterOptions;
use crate::pipeline::{
    DashboardReport, FilterParams, GroupCount, MetricKey, Metrics, Section, SpaSelection,
};
use crate::runner::Runner;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct FilterSummary {
    pub spas: Option<Vec<String>>,
    pub supervisor: String,
    pub investigator: String,
}

impl FilterSummary {
    fn from_params(params: &FilterParams) -> Self {
        Self {
            spas: match &params.spas {
                SpaSelection::All => None,
                SpaSelection::Only(set) => Some(set.iter().cloned().collect()),
            },
            supervisor: params.supervisor.label().to_string(),
            investigator: params.investigator.label().to_string(),
        }
    }

    fn spa_label(&self) -> String {
        match &self.spas {
            None => "All".to_string(),
            Some(spas) if spas.is_empty() => "(none)".to_string(),
            Some(spas) => spas.join(", "),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MetricRecord {
    pub key: &'static str,
    pub label: &'static str,
    pub headline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SeriesRecord {
    pub key: &'static str,
    pub title: &'static str,
    pub groups: Vec<GroupCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SeriesRecord {
    fn new(key: &'static str, title: &'static str, section: &Section<Vec<GroupCount>>) -> Self {
        let (groups, error) = split_section(section);
        Self {
            key,
            title,
            groups: groups.unwrap_or_default(),
            error,
        }
    }
}

/// The display table with every cell pre-rendered as HTML.
#[derive(Clone, Debug, Serialize)]
pub struct TableRecord {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DashboardDocument {
    pub preset: &'static str,
    pub display_mode: &'static str,
    pub filters: FilterSummary,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub metrics: Vec<MetricRecord>,
    pub status_distribution: SeriesRecord,
    pub breakdowns: Vec<SeriesRecord>,
    pub table: TableRecord,
    pub options: FilterOptions,
}

fn split_section<T: Clone>(section: &Section<T>) -> (Option<T>, Option<String>) {
    match section {
        Ok(value) => (Some(value.clone()), None),
        Err(err) => (None, Some(err.to_string())),
    }
}

pub fn build_document(report: &DashboardReport, runner: &Runner) -> DashboardDocument {
    let options = runner.options();
    let config = runner.config();

    let headline = Metrics::headline(report.fourth_metric);
    let metrics = MetricKey::ALL
        .iter()
        .map(|&key| {
            let (value, error) = split_section(report.metrics.get(key));
            MetricRecord {
                key: key.id(),
                label: key.label(),
                headline: headline.contains(&key),
                value,
                error,
            }
        })
        .collect();

    let breakdowns = vec![
        SeriesRecord::new(
            "program",
            "Active Cases per Program",
            &report.breakdowns.program,
        ),
        SeriesRecord::new("spa", "Active Cases per SPA", &report.breakdowns.spa),
        SeriesRecord::new("type", "Active Case Types", &report.breakdowns.case_type),
        SeriesRecord::new(
            "priority",
            "Active Cases by Priority",
            &report.breakdowns.priority,
        ),
    ];

    let decorate = report.layout.decorates();
    let table = match &report.table {
        Ok(projected) => TableRecord {
            title: report.display_mode.label().to_string(),
            columns: projected.columns.clone(),
            rows: projected
                .rows
                .iter()
                .map(|row| {
                    projected
                        .columns
                        .iter()
                        .zip(row.iter())
                        .map(|(column, cell)| {
                            markup::render_cell(
                                column,
                                cell,
                                decorate,
                                &config.record_url_template,
                            )
                        })
                        .collect()
                })
                .collect(),
            error: None,
        },
        Err(err) => TableRecord {
            title: report.display_mode.label().to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            error: Some(err.to_string()),
        },
    };

    DashboardDocument {
        preset: options.preset.name(),
        display_mode: report.display_mode.label(),
        filters: FilterSummary::from_params(&options.filters),
        total_rows: report.total_rows,
        filtered_rows: report.filtered_rows,
        metrics,
        status_distribution: SeriesRecord::new(
            "status",
            "Case Status Distribution",
            &report.status_distribution,
        ),
        breakdowns,
        table,
        options: report.options.clone(),
    }
}

fn kv_line(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(":: {:<26}: {}\n", label, value));
}

fn push_series(out: &mut String, series: &SeriesRecord) {
    out.push('\n');
    out.push_str(&format!("{}\n", series.title.bold()));
    if let Some(err) = series.error.as_ref() {
        out.push_str(&format!("  {}\n", err.red()));
        return;
    }
    if series.groups.is_empty() {
        out.push_str("  (no cases)\n");
        return;
    }
    let max = series.groups.iter().map(|g| g.count).max().unwrap_or(1).max(1);
    let width = series
        .groups
        .iter()
        .map(|g| g.label.chars().count())
        .max()
        .unwrap_or(0);
    for g in &series.groups {
        let bar = "#".repeat((g.count * 30).div_ceil(max));
        out.push_str(&format!(
            "  {:<width$}  {} {}\n",
            g.label,
            bar.cyan(),
            g.count,
            width = width
        ));
    }
}

/// Console summary. Colors follow the global `colored` override.
pub fn render_text(doc: &DashboardDocument) -> Vec<u8> {
    let mut out = String::new();
    kv_line(&mut out, "Preset", doc.preset);
    kv_line(&mut out, "SPAs", &doc.filters.spa_label());
    kv_line(&mut out, "Supervisor", &doc.filters.supervisor);
    kv_line(&mut out, "Investigator", &doc.filters.investigator);
    kv_line(
        &mut out,
        "Cases",
        &format!("{} of {}", doc.filtered_rows, doc.total_rows),
    );
    out.push('\n');
    for m in doc.metrics.iter().filter(|m| m.headline) {
        let value = match (m.value, m.error.as_ref()) {
            (Some(v), _) => v.to_string().bold().green().to_string(),
            (None, Some(err)) => err.red().to_string(),
            (None, None) => String::new(),
        };
        kv_line(&mut out, m.label, &value);
    }
    push_series(&mut out, &doc.status_distribution);
    for series in &doc.breakdowns {
        push_series(&mut out, series);
    }
    out.push('\n');
    match doc.table.error.as_ref() {
        Some(err) => out.push_str(&format!(
            "{} ({}): {}\n",
            "Filtered Case Table".bold(),
            doc.table.title,
            err.red()
        )),
        None => out.push_str(&format!(
            "{} ({}): {} rows\n",
            "Filtered Case Table".bold(),
            doc.table.title,
            doc.table.rows.len()
        )),
    }
    out.into_bytes()
}

pub fn render_json(doc: &DashboardDocument) -> Result<Vec<u8>, String> {
    let mut out = serde_json::to_vec_pretty(doc)
        .map_err(|e| format!("failed to serialize dashboard: {e}"))?;
    out.push(b'\n');
    Ok(out)
}

pub fn render_html(doc: &DashboardDocument) -> Vec<u8> {
    report::render_html(doc)
}

pub fn render(doc: &DashboardDocument, format: OutputFormat) -> Result<Vec<u8>, String> {
    match format {
        OutputFormat::Text => Ok(render_text(doc)),
        OutputFormat::Json => render_json(doc),
        OutputFormat::Html => Ok(render_html(doc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::CaseTable;
    use crate::pipeline::{DisplayMode, Preset};
    use crate::runner::Options;

    const RAW: &str = "\
Case ID,Status,SPA,Contact Made,Date Opened
C-1,Open,A,past due,2024-01-01
C-2,Closed,B,on track,2024-01-02
";

    fn document(preset: Preset, mode: DisplayMode) -> DashboardDocument {
        let table = CaseTable::from_reader(RAW.as_bytes()).unwrap();
        let runner = Runner::new(Options {
            input: "cases.csv".into(),
            preset,
            display_mode: mode,
            ..Default::default()
        })
        .unwrap();
        let report = runner.run_on(&table).unwrap();
        build_document(&report, &runner)
    }

    #[test]
    fn document_lists_all_metrics_and_flags_headline() {
        let doc = document(Preset::Triage, DisplayMode::All);
        let headline: Vec<&str> = doc
            .metrics
            .iter()
            .filter(|m| m.headline)
            .map(|m| m.key)
            .collect();
        assert_eq!(
            headline,
            vec!["active", "supervisor_action", "phi_pending", "past_due"]
        );
        let closed = doc.metrics.iter().find(|m| m.key == "closed").unwrap();
        assert_eq!(closed.value, Some(1));
        assert!(!closed.headline);
    }

    #[test]
    fn triage_table_cells_carry_markup() {
        let doc = document(Preset::Triage, DisplayMode::All);
        assert!(doc.table.rows[0][0].starts_with("<a href=\"https://iris-record/C-1\""));
        let contact = doc.table.columns.iter().position(|c| c == "Contact Made").unwrap();
        assert!(doc.table.rows[0][contact].contains("background-color:red"));
    }

    #[test]
    fn json_reports_failed_sections_as_errors() {
        let raw = "Case ID,SPA\nC-1,A\n";
        let table = CaseTable::from_reader(raw.as_bytes()).unwrap();
        let runner = Runner::new(Options {
            input: "cases.csv".into(),
            ..Default::default()
        })
        .unwrap();
        let report = runner.run_on(&table).unwrap();
        let doc = build_document(&report, &runner);
        let json: serde_json::Value = serde_json::from_slice(&render_json(&doc).unwrap()).unwrap();
        assert_eq!(
            json["status_distribution"]["error"],
            "expected column 'Status' absent"
        );
        assert_eq!(json["total_rows"], 1);
        assert!(json["metrics"][0].get("value").is_none());
    }

    #[test]
    fn render_dispatches_json_as_newline_terminated_document() {
        let doc = document(Preset::Program, DisplayMode::All);
        let bytes = render(&doc, OutputFormat::Json).unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'));
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["preset"], "program");
        assert_eq!(json["filtered_rows"], 2);
    }

    #[test]
    fn text_summary_lists_headline_cards() {
        colored::control::set_override(false);
        let doc = document(Preset::Program, DisplayMode::Closed);
        let text = String::from_utf8(render_text(&doc)).unwrap();
        assert!(text.contains(":: Closed Cases"));
        assert!(!text.contains("Records Past Due"));
        assert!(text.contains("Filtered Case Table (Closed Cases): 1 rows"));
    }

    #[test]
    fn infer_format_from_extension() {
        assert_eq!(infer_format_from_path("out.JSON"), Some(OutputFormat::Json));
        assert_eq!(infer_format_from_path("report.htm"), Some(OutputFormat::Html));
        assert_eq!(infer_format_from_path("report"), None);
    }
}
