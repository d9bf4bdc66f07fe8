//! Status policy tables.
//!
//! The taxonomy order and the active / supervisor-action memberships are
//! data, not logic: they ship as built-in tables for each dashboard preset
//! and can be replaced wholesale by a YAML file.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NEW_SUPERVISOR: &str = "New Supervisor (assigned)";
pub const NEW_PHN: &str = "New PHN (assigned)";
pub const OPEN: &str = "Open";
pub const REASSIGN: &str = "Reassign";
pub const RETURNED_BY_INVESTIGATOR: &str = "Returned (by Investigator)";
pub const RETURNED_BY_SUPERVISOR: &str = "Returned (by Supervisor)";
pub const TO_SUPERVISOR: &str = "To Supervisor (under review)";
pub const RETURNED_TO_PROGRAM: &str = "Returned (to Program)";
pub const PHI_SUPPORT_REQUESTED: &str = "PHI Support Requested";
pub const CLOSED: &str = "Closed";
pub const RETURNED_BY_AMD: &str = "Returned (by AMD)";
pub const APPROVED_BY_AMD: &str = "Approved (by AMD)";

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy file: {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("status order is empty")]
    EmptyOrder,

    #[error("status '{status}' listed twice in order")]
    DuplicateStatus { status: String },

    #[error("phi_status must not be empty")]
    EmptyPhiStatus,
}

fn default_phi_status() -> String {
    PHI_SUPPORT_REQUESTED.to_string()
}

fn default_closed_status() -> String {
    CLOSED.to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusPolicy {
    /// Chart order. Statuses outside this list are unknown.
    pub order: Vec<String>,
    pub active: Vec<String>,
    pub supervisor_action: Vec<String>,
    #[serde(default = "default_phi_status")]
    pub phi_status: String,
    #[serde(default = "default_closed_status")]
    pub closed_status: String,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn supervisor_action_statuses() -> Vec<String> {
    owned(&[
        NEW_SUPERVISOR,
        REASSIGN,
        RETURNED_BY_INVESTIGATOR,
        TO_SUPERVISOR,
        RETURNED_BY_AMD,
        APPROVED_BY_AMD,
    ])
}

impl StatusPolicy {
    /// Ten-status table used by the program dashboard.
    pub fn program() -> Self {
        Self {
            order: owned(&[
                NEW_SUPERVISOR,
                NEW_PHN,
                OPEN,
                REASSIGN,
                RETURNED_BY_INVESTIGATOR,
                RETURNED_BY_SUPERVISOR,
                TO_SUPERVISOR,
                RETURNED_TO_PROGRAM,
                PHI_SUPPORT_REQUESTED,
                CLOSED,
            ]),
            active: owned(&[
                OPEN,
                NEW_SUPERVISOR,
                NEW_PHN,
                RETURNED_TO_PROGRAM,
                RETURNED_BY_SUPERVISOR,
                RETURNED_BY_INVESTIGATOR,
                TO_SUPERVISOR,
                PHI_SUPPORT_REQUESTED,
                REASSIGN,
            ]),
            supervisor_action: supervisor_action_statuses(),
            phi_status: default_phi_status(),
            closed_status: default_closed_status(),
        }
    }

    /// Eight-status table used by the triage dashboard.
    pub fn triage() -> Self {
        Self {
            order: owned(&[
                NEW_SUPERVISOR,
                NEW_PHN,
                OPEN,
                REASSIGN,
                RETURNED_BY_INVESTIGATOR,
                RETURNED_BY_SUPERVISOR,
                TO_SUPERVISOR,
                PHI_SUPPORT_REQUESTED,
            ]),
            active: owned(&[
                OPEN,
                NEW_SUPERVISOR,
                NEW_PHN,
                RETURNED_BY_SUPERVISOR,
                RETURNED_BY_INVESTIGATOR,
                TO_SUPERVISOR,
                PHI_SUPPORT_REQUESTED,
                REASSIGN,
            ]),
            supervisor_action: supervisor_action_statuses(),
            phi_status: default_phi_status(),
            closed_status: default_closed_status(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let contents = std::fs::read_to_string(path).map_err(|e| PolicyError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let policy: StatusPolicy =
            serde_yaml::from_str(&contents).map_err(|e| PolicyError::Parse {
                path: path.display().to_string(),
                source: e,
            })?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.order.is_empty() {
            return Err(PolicyError::EmptyOrder);
        }
        let mut seen = HashSet::new();
        for status in &self.order {
            if !seen.insert(status.as_str()) {
                return Err(PolicyError::DuplicateStatus {
                    status: status.clone(),
                });
            }
        }
        if self.phi_status.trim().is_empty() {
            return Err(PolicyError::EmptyPhiStatus);
        }
        Ok(())
    }

    /// Position of `status` in the chart order.
    pub fn rank(&self, status: &str) -> Option<usize> {
        self.order.iter().position(|s| s == status)
    }

    pub fn is_known(&self, status: &str) -> bool {
        self.rank(status).is_some()
    }

    pub fn is_active(&self, status: &str) -> bool {
        self.active.iter().any(|s| s == status)
    }

    pub fn needs_supervisor_action(&self, status: &str) -> bool {
        self.supervisor_action.iter().any(|s| s == status)
    }

    pub fn is_phi_pending(&self, status: &str) -> bool {
        self.phi_status == status
    }

    pub fn is_closed(&self, status: &str) -> bool {
        self.closed_status == status
    }
}
