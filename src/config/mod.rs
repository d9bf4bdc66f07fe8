use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(alias = "input_file")]
    pub input: Option<String>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub preset: Option<String>,
    pub policy: Option<String>,
    pub spas: Option<Vec<String>>,
    pub supervisor: Option<String>,
    pub investigator: Option<String>,
    #[serde(alias = "display_mode")]
    pub show: Option<String>,
    pub record_url_template: Option<String>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".casebuster").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(ConfigFile::default()),
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> &'static str {
    r#"# Casebuster config
#
# Location (default):
#   ~/.casebuster/config.yml

# Case file (CSV with a header row)
# input: ./disease_case_dashboard_data.csv

# Output (optional, stdout when unset)
# output: ./dashboard.html
# output_format: html

# Dashboard preset: program (10 statuses, closed-case card, status-first table)
#                   triage  (8 statuses, past-due card, linked fixed table)
preset: program

# Replace the preset status table with a YAML policy file (optional).
# Keys: order, active, supervisor_action, phi_status, closed_status
# policy: ./policy.yml

# Filters (omit spas to select every SPA)
# spas:
#   - SPA 1
#   - SPA 2
supervisor: All
investigator: All

# Table display mode: all, active, closed, supervisor
show: all

record_url_template: "https://iris-record/{case_id}"

no_color: false
"#
}

pub fn ensure_default_config_file(path: &Path) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
