use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a session currently sits in the scenario flow.
///
/// ```text
/// RoleSelect -> CredentialChallenge -> ScenarioSelect -> CoreSelect -> DecisionInput -> Resolved
///      ^                                     ^                                              |
///      |                                     +---------------- new mission -----------------+
///      +------------------------------ return to start (any phase) -------------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    RoleSelect,
    CredentialChallenge,
    ScenarioSelect,
    CoreSelect,
    DecisionInput,
    Resolved,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::RoleSelect => "role_select",
            Phase::CredentialChallenge => "credential_challenge",
            Phase::ScenarioSelect => "scenario_select",
            Phase::CoreSelect => "core_select",
            Phase::DecisionInput => "decision_input",
            Phase::Resolved => "resolved",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
