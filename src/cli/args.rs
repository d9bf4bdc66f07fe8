use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "casebuster",
    version,
    about = "disease case dashboard builder",
    long_about = "Casebuster loads a disease-investigation case file, applies SPA / supervisor / investigator filters and renders the case-management dashboard (counters, status distribution, active-case breakdowns and the case table).\n\nExamples:\n  casebuster -i cases.csv\n  casebuster -i cases.csv -s \"SPA 1\" -s \"SPA 2\" --supervisor \"Jane Doe\" --show active\n  casebuster -i cases.csv --preset triage -o dashboard.html\n\nTip: Use --config to persist filter settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv). RUST_LOG takes precedence."
    )]
    pub verbose: u8,

    #[arg(
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored console output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the dashboard to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'f',
        long = "format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json or html (inferred from --output when unset)."
    )]
    pub format: Option<String>,

    #[arg(
        short = 'i',
        long = "input",
        visible_alias = "input-file",
        value_name = "FILE",
        help_heading = "Input",
        help = "Case file (CSV with a header row)."
    )]
    pub input: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.casebuster/config.yml when present)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'p',
        long = "preset",
        value_name = "NAME",
        help_heading = "Dashboard",
        help = "Dashboard preset: program or triage."
    )]
    pub preset: Option<String>,

    #[arg(
        long = "policy",
        value_name = "FILE",
        help_heading = "Dashboard",
        help = "YAML status policy replacing the preset's status table."
    )]
    pub policy: Option<String>,

    #[arg(
        long = "record-url",
        value_name = "TEMPLATE",
        help_heading = "Dashboard",
        help = "Case record link template; {case_id} is replaced by the case id."
    )]
    pub record_url_template: Option<String>,

    #[arg(
        short = 's',
        long = "spa",
        value_name = "SPA",
        action = ArgAction::Append,
        help_heading = "Filters",
        help = "Select an SPA (repeatable). All SPAs are selected when omitted."
    )]
    pub spa: Vec<String>,

    #[arg(
        long = "no-spa",
        help_heading = "Filters",
        help = "Select no SPA at all (empty dashboard)."
    )]
    pub no_spa: bool,

    #[arg(
        long = "supervisor",
        value_name = "NAME",
        help_heading = "Filters",
        help = "Only cases of this supervisor (exact match, 'All' for everyone)."
    )]
    pub supervisor: Option<String>,

    #[arg(
        long = "investigator",
        value_name = "NAME",
        help_heading = "Filters",
        help = "Only cases of this investigator (exact match, 'All' for everyone)."
    )]
    pub investigator: Option<String>,

    #[arg(
        long = "show",
        value_name = "MODE",
        help_heading = "Filters",
        help = "Case table mode: all, active, closed or supervisor."
    )]
    pub show: Option<String>,

    #[arg(
        long = "list-options",
        help_heading = "Filters",
        help = "Print the selectable SPA, supervisor and investigator values and exit."
    )]
    pub list_options: bool,
}
