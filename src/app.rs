use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::dataset::{CaseTable, FilterOptions};
use crate::output::{self, OutputFormat};
use crate::pipeline::{DisplayMode, FilterParams, NameFilter, Preset, SpaSelection};
use crate::policy::StatusPolicy;
use crate::runner::{Options, Runner};

fn print_banner() {
    const BANNER: &str = r#"
                       __               __
  _________ ________  / /_  __  _______/ /____  _____
 / ___/ __ `/ ___/ _ \/ __ \/ / / / ___/ __/ _ \/ ___/
/ /__/ /_/ (__  )  __/ /_/ / /_/ (__  ) /_/  __/ /
\___/\__,_/____/\___/_.___/\__,_/____/\__/\___/_/
       disease case dashboard builder
"#;
    println!("{}", BANNER);
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("casebuster={fallback}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    options: Options,
    output: Option<String>,
    output_format: OutputFormat,
    no_color: bool,
    list_options: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let input = args
        .input
        .or(cfg.input)
        .map(|p| config::expand_tilde(p.trim()))
        .ok_or_else(|| "a case file is required (--input or `input:` in config)".to_string())?;

    let preset_raw = args
        .preset
        .or(cfg.preset)
        .unwrap_or_else(|| "program".to_string());
    let preset = Preset::parse(&preset_raw)
        .ok_or_else(|| format!("invalid preset '{preset_raw}', expected program or triage"))?;

    let policy = match args.policy.or(cfg.policy) {
        Some(path) => {
            let path = config::expand_tilde(&path);
            Some(StatusPolicy::load(&path).map_err(|e| e.to_string())?)
        }
        None => None,
    };

    let spas = if args.no_spa {
        SpaSelection::Only(Default::default())
    } else if !args.spa.is_empty() {
        SpaSelection::only(args.spa)
    } else {
        match cfg.spas {
            Some(spas) => SpaSelection::only(spas),
            None => SpaSelection::All,
        }
    };
    let supervisor = NameFilter::parse(&args.supervisor.or(cfg.supervisor).unwrap_or_default());
    let investigator =
        NameFilter::parse(&args.investigator.or(cfg.investigator).unwrap_or_default());

    let show_raw = args.show.or(cfg.show).unwrap_or_else(|| "all".to_string());
    let display_mode = DisplayMode::parse(&show_raw)
        .ok_or_else(|| format!("invalid display mode '{show_raw}'"))?;

    let output = args.output.or(cfg.output);
    let output_format = match args.format.or(cfg.output_format) {
        Some(raw) => {
            OutputFormat::parse(&raw).ok_or_else(|| format!("invalid output format '{raw}'"))?
        }
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    Ok(RunConfig {
        options: Options {
            input,
            preset,
            policy,
            filters: FilterParams {
                spas,
                supervisor,
                investigator,
            },
            display_mode,
            record_url_template: args.record_url_template.or(cfg.record_url_template),
        },
        output,
        output_format,
        no_color,
        list_options: args.list_options,
    })
}

fn print_options(options: &FilterOptions) {
    let groups = [
        ("SPA", &options.spas),
        ("Supervisor", &options.supervisors),
        ("Investigator", &options.investigators),
    ];
    for (label, values) in groups {
        println!("{}", label.bold());
        for value in values {
            println!("  {value}");
        }
    }
}

fn run(run: RunConfig) -> Result<(), String> {
    if run.no_color || run.output.is_some() {
        colored::control::set_override(false);
    }
    let runner = Runner::new(run.options).map_err(|e| e.to_string())?;

    if run.list_options {
        let table =
            CaseTable::load_csv(&runner.options().input).map_err(|e| e.to_string())?;
        print_options(&FilterOptions::from_table(&table));
        return Ok(());
    }

    let result = runner.run().map_err(|e| e.to_string())?;
    let doc = output::build_document(&result.report, &runner);
    let rendered = output::render(&doc, run.output_format)?;

    match run.output.as_deref() {
        Some(path) => {
            let path = config::expand_tilde(path);
            std::fs::write(&path, &rendered)
                .map_err(|e| format!("failed to write output file '{}': {e}", path.display()))?;
            tracing::info!(path = %path.display(), "dashboard written");
            println!(
                ":: Completed :: {} cases in {}ms ::",
                result.rows_loaded,
                result.elapsed.as_millis()
            );
        }
        None => {
            if run.output_format == OutputFormat::Text {
                print_banner();
            }
            print!("{}", String::from_utf8_lossy(&rendered));
        }
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = CliArgs::try_parse().map_err(|e| match e.kind() {
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
            e.exit()
        }
        _ => e.to_string(),
    })?;
    init_logging(args.verbose);

    let (config_path, allow_missing) = match args.config.as_deref() {
        Some(path) => (Some(config::expand_tilde(path)), false),
        None => (config::default_config_path(), true),
    };

    if args.init_config {
        let path: PathBuf =
            config_path.ok_or_else(|| "cannot determine config path".to_string())?;
        if config::ensure_default_config_file(&path)? {
            println!(":: wrote default config to {}", path.display());
        } else {
            println!(":: config already exists at {}", path.display());
        }
        return Ok(());
    }

    let cfg = match config_path.as_ref() {
        Some(path) => config::load_config(path, allow_missing)?,
        None => ConfigFile::default(),
    };

    run(build_run_config(args, cfg)?)
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    fn args(argv: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("casebuster").chain(argv.iter().copied()))
    }

    #[test]
    fn cli_overrides_config_values() {
        let cfg = ConfigFile {
            input: Some("from-config.csv".to_string()),
            supervisor: Some("Ann Lee".to_string()),
            show: Some("closed".to_string()),
            ..Default::default()
        };
        let run = build_run_config(args(&["-i", "cli.csv", "--show", "active"]), cfg).unwrap();
        assert_eq!(run.options.input, PathBuf::from("cli.csv"));
        assert_eq!(run.options.display_mode, DisplayMode::Active);
        assert_eq!(
            run.options.filters.supervisor,
            NameFilter::Exact("Ann Lee".to_string())
        );
    }

    #[test]
    fn spas_default_to_all_and_no_spa_selects_none() {
        let run = build_run_config(args(&["-i", "c.csv"]), ConfigFile::default()).unwrap();
        assert_eq!(run.options.filters.spas, SpaSelection::All);

        let run =
            build_run_config(args(&["-i", "c.csv", "--no-spa"]), ConfigFile::default()).unwrap();
        assert_eq!(
            run.options.filters.spas,
            SpaSelection::Only(Default::default())
        );

        let cfg = ConfigFile {
            spas: Some(vec!["SPA 4".to_string()]),
            ..Default::default()
        };
        let run = build_run_config(args(&["-i", "c.csv"]), cfg).unwrap();
        assert_eq!(run.options.filters.spas, SpaSelection::only(["SPA 4"]));
    }

    #[test]
    fn output_format_inferred_from_path() {
        let run = build_run_config(
            args(&["-i", "c.csv", "-o", "dash.html"]),
            ConfigFile::default(),
        )
        .unwrap();
        assert_eq!(run.output_format, OutputFormat::Html);

        let run = build_run_config(args(&["-i", "c.csv"]), ConfigFile::default()).unwrap();
        assert_eq!(run.output_format, OutputFormat::Text);
    }

    #[test]
    fn input_is_required() {
        let err = build_run_config(args(&[]), ConfigFile::default()).unwrap_err();
        assert!(err.contains("case file is required"));
    }
}
