use crate::policy::StatusPolicy;

use super::{DisplayMode, FourthMetric, TableLayout};

pub const DEFAULT_RECORD_URL_TEMPLATE: &str = "https://iris-record/{case_id}";

/// Named dashboard variants. Each pins a status table, a table layout,
/// the display modes it offers and the fourth headline card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Preset {
    Triage,
    #[default]
    Program,
}

impl Preset {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "triage" | "prototype" => Some(Self::Triage),
            "program" | "final" => Some(Self::Program),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Triage => "triage",
            Preset::Program => "program",
        }
    }

    pub fn config(self) -> PipelineConfig {
        match self {
            Preset::Triage => PipelineConfig {
                policy: StatusPolicy::triage(),
                layout: TableLayout::Fixed,
                display_modes: vec![
                    DisplayMode::All,
                    DisplayMode::Active,
                    DisplayMode::NeedsSupervisorAction,
                ],
                fourth_metric: FourthMetric::PastDue,
                record_url_template: DEFAULT_RECORD_URL_TEMPLATE.to_string(),
            },
            Preset::Program => PipelineConfig {
                policy: StatusPolicy::program(),
                layout: TableLayout::StatusFirst,
                display_modes: vec![DisplayMode::All, DisplayMode::Active, DisplayMode::Closed],
                fourth_metric: FourthMetric::Closed,
                record_url_template: DEFAULT_RECORD_URL_TEMPLATE.to_string(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub policy: StatusPolicy,
    pub layout: TableLayout,
    pub display_modes: Vec<DisplayMode>,
    pub fourth_metric: FourthMetric,
    pub record_url_template: String,
}

impl PipelineConfig {
    pub fn offers(&self, mode: DisplayMode) -> bool {
        self.display_modes.contains(&mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_offer_their_own_modes() {
        let triage = Preset::Triage.config();
        assert!(triage.offers(DisplayMode::NeedsSupervisorAction));
        assert!(!triage.offers(DisplayMode::Closed));

        let program = Preset::Program.config();
        assert!(program.offers(DisplayMode::Closed));
        assert!(!program.offers(DisplayMode::NeedsSupervisorAction));
    }

    #[test]
    fn parse_accepts_names_and_aliases() {
        assert_eq!(Preset::parse("Triage"), Some(Preset::Triage));
        assert_eq!(Preset::parse("final"), Some(Preset::Program));
        assert_eq!(Preset::parse("weekly"), None);
    }
}
