use crate::cli::args::CliArgs;
use crate::output::OutputFormat;
use crate::pipeline::{DisplayMode, Preset};
use crate::runner::CASE_ID_PLACEHOLDER;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.preset.as_deref() {
        Preset::parse(raw)
            .ok_or_else(|| format!("invalid --preset '{raw}', expected program or triage"))?;
    }
    if let Some(raw) = args.show.as_deref() {
        DisplayMode::parse(raw).ok_or_else(|| {
            format!("invalid --show '{raw}', expected all, active, closed or supervisor")
        })?;
    }
    if let Some(raw) = args.format.as_deref() {
        OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --format '{raw}', expected text, json or html"))?;
    }
    if let Some(raw) = args.record_url_template.as_deref() {
        if !raw.contains(CASE_ID_PLACEHOLDER) {
            return Err(format!(
                "invalid --record-url '{raw}': missing {CASE_ID_PLACEHOLDER}"
            ));
        }
    }
    if args.no_spa && !args.spa.is_empty() {
        return Err("use either --spa or --no-spa, not both".to_string());
    }
    Ok(())
}
