use crate::dataset::{Cell, Column, ContactMade};
use crate::runner::CASE_ID_PLACEHOLDER;

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn record_url(case_id: &str, template: &str) -> String {
    template.replace(CASE_ID_PLACEHOLDER, case_id)
}

pub fn case_link(case_id: &str, template: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank" style="color:blue;text-decoration:underline;">{}</a>"#,
        escape_html(&record_url(case_id, template)),
        escape_html(case_id)
    )
}

pub fn contact_badge(contact: &ContactMade) -> String {
    let background = match contact {
        ContactMade::OnTrack => "green",
        ContactMade::PastDue => "red",
        ContactMade::Other(_) => "gray",
    };
    format!(
        r#"<span style="color:white;background-color:{background};padding:4px 8px;border-radius:8px;">{}</span>"#,
        escape_html(contact.label())
    )
}

/// Renders one table cell as HTML. With `decorate`, case ids become record
/// links and contact flags become badges; everything else is escaped text.
pub fn render_cell(column: &str, cell: &Cell, decorate: bool, template: &str) -> String {
    let text = cell.display();
    if decorate && !cell.is_empty() {
        if column == Column::CaseId.header() {
            return case_link(&text, template);
        }
        if column == Column::ContactMade.header() {
            return contact_badge(&ContactMade::parse(&text));
        }
    }
    escape_html(&text)
}
