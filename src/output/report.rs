use super::markup::escape_html;
use super::{DashboardDocument, SeriesRecord};

pub const RIBBON_TEXT: &str = "SIMULATED DASHBOARD FOR PROTOTYPING PURPOSES | DATA IS NOT REAL";

fn render_metric_cards(doc: &DashboardDocument) -> String {
    let mut out = String::new();
    for m in doc.metrics.iter().filter(|m| m.headline) {
        let value = match (m.value, m.error.as_ref()) {
            (Some(v), _) => v.to_string(),
            (None, Some(err)) => format!(r#"<span class="error">{}</span>"#, escape_html(err)),
            (None, None) => String::new(),
        };
        out.push_str(&format!(
            r#"      <div class="card"><div class="card-label">{}</div><div class="card-value">{}</div></div>
"#,
            escape_html(m.label),
            value
        ));
    }
    out
}

fn render_series(series: &SeriesRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "    <section class=\"chart\" id=\"chart-{}\">\n      <h3>{}</h3>\n",
        series.key,
        escape_html(series.title)
    ));
    if let Some(err) = series.error.as_ref() {
        out.push_str(&format!(
            "      <p class=\"error\">{}</p>\n    </section>\n",
            escape_html(err)
        ));
        return out;
    }
    if series.groups.is_empty() {
        out.push_str("      <p class=\"muted\">No cases.</p>\n    </section>\n");
        return out;
    }
    let max = series.groups.iter().map(|g| g.count).max().unwrap_or(1).max(1);
    for g in &series.groups {
        let pct = g.count * 100 / max;
        out.push_str(&format!(
            "      <div class=\"bar-row\"><span class=\"bar-label\">{}</span><span class=\"bar\" style=\"width:{}%\"></span><span class=\"bar-count\">{}</span></div>\n",
            escape_html(&g.label),
            pct,
            g.count
        ));
    }
    out.push_str("    </section>\n");
    out
}

fn render_table(doc: &DashboardDocument) -> String {
    if let Some(err) = doc.table.error.as_ref() {
        return format!("      <p class=\"error\">{}</p>\n", escape_html(err));
    }
    let mut out = String::new();
    out.push_str("      <table class=\"dashboard-table\">\n        <thead><tr>");
    for column in &doc.table.columns {
        out.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    out.push_str("</tr></thead>\n        <tbody>\n");
    // cells are already rendered markup
    for row in &doc.table.rows {
        out.push_str("          <tr>");
        for cell in row {
            out.push_str(&format!("<td>{cell}</td>"));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("        </tbody>\n      </table>\n");
    out
}

pub fn render_html(doc: &DashboardDocument) -> Vec<u8> {
    let cards = render_metric_cards(doc);
    let status = render_series(&doc.status_distribution);
    let breakdowns: String = doc.breakdowns.iter().map(render_series).collect();
    let table = render_table(doc);
    let spas = escape_html(&doc.filters.spa_label());
    let supervisor = escape_html(&doc.filters.supervisor);
    let investigator = escape_html(&doc.filters.investigator);
    let mode = escape_html(doc.display_mode);
    let ribbon = escape_html(RIBBON_TEXT);

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Disease Case Dashboard</title>
  <style>
    body {{ font-family: 'Inter', sans-serif; background: #fff; color: #000; margin: 0; }}
    .ribbon {{ position: fixed; top: 0; left: 0; width: 100%; z-index: 1000; padding: 8px; background-color: #D32F2F; color: #fff; font-weight: 700; text-align: center; }}
    main {{ max-width: 1440px; margin: 0 auto; padding: 50px 2rem 1rem; }}
    h1 {{ margin-bottom: 0.25rem; }}
    .filters {{ color: #475569; font-size: 0.9rem; margin-bottom: 1rem; }}
    .cards {{ display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; border-top: 1px solid #e2e8f0; padding-top: 1rem; }}
    .card {{ border: 1px solid #e2e8f0; border-radius: 0.75rem; padding: 1rem; }}
    .card-label {{ font-size: 0.85rem; color: #475569; }}
    .card-value {{ font-size: 1.5rem; font-weight: 700; }}
    .charts {{ display: grid; grid-template-columns: repeat(2, 1fr); gap: 1rem; margin-top: 1rem; }}
    .bar-row {{ display: flex; align-items: center; gap: 0.5rem; margin: 2px 0; }}
    .bar-label {{ flex: 0 0 260px; font-size: 0.85rem; }}
    .bar {{ display: inline-block; height: 16px; background: #135bec; border-radius: 3px; }}
    .bar-count {{ font-size: 0.8rem; color: #475569; }}
    .dashboard-table {{ border-collapse: collapse; width: 100%; font-size: 0.85rem; }}
    .dashboard-table th, .dashboard-table td {{ border-bottom: 1px solid #e2e8f0; padding: 6px 8px; text-align: left; }}
    .error {{ color: #b91c1c; }}
    .muted {{ color: #94a3b8; }}
  </style>
</head>
<body>
  <div class="ribbon">{ribbon}</div>
  <main>
    <h1>Disease Case Management Dashboard</h1>
    <p class="filters">SPA(s): {spas} &middot; Supervisor: {supervisor} &middot; Investigator: {investigator} &middot; {filtered} of {total} cases</p>
    <div class="cards">
{cards}    </div>
{status}    <div class="charts">
{breakdowns}    </div>
    <section>
      <h3>Filtered Case Table &middot; {mode}</h3>
{table}    </section>
  </main>
</body>
</html>
"####,
        filtered = doc.filtered_rows,
        total = doc.total_rows,
    );

    html.into_bytes()
}
