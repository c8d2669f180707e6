//! Read-only snapshot of a session for renderers.
//!
//! Renderers never reach into [`ScenarioSessionFlow`]; they take a
//! [`SessionView`] and draw it. Everything here is owned or `'static`, so a
//! view can outlive the borrow that produced it.

use executive_types::{AnalysisCore, Phase, Scenario};

use crate::catalog::catalog;
use crate::classifier::result_description;
use crate::flow::ScenarioSessionFlow;
use crate::gate::TokenSource;

/// One entry in the "neural uplink" panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreGreeting {
    pub core: AnalysisCore,
    pub greeting: &'static str,
}

/// One card in the mission list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionCard {
    pub label: String,
    pub title: String,
    pub description: &'static str,
}

impl MissionCard {
    fn from_scenario(scenario: &'static Scenario) -> Self {
        Self {
            label: scenario.card_label(),
            title: scenario.title.to_uppercase(),
            description: &scenario.description,
        }
    }
}

#[must_use]
pub fn mission_cards() -> Vec<MissionCard> {
    catalog().iter().map(MissionCard::from_scenario).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub phase: Phase,
    /// Upper-cased for the header.
    pub role: Option<String>,
    /// Token shown while the challenge is open.
    pub challenge: Option<String>,
    pub admitted_pin: Option<String>,
    pub scenario: Option<&'static Scenario>,
    /// Selected cores in declaration order.
    pub cores: Vec<CoreGreeting>,
    pub can_confirm_cores: bool,
    pub decision: Option<String>,
    pub badge: Option<String>,
    pub result_description: Option<String>,
}

impl SessionView {
    /// e.g. `NEURAL UPLINK: 2 CORES ONLINE`
    #[must_use]
    pub fn uplink_header(&self) -> String {
        format!("NEURAL UPLINK: {} CORES ONLINE", self.cores.len())
    }

    #[must_use]
    pub fn pin_line(&self) -> Option<String> {
        self.admitted_pin.as_ref().map(|pin| format!("PIN: {pin}"))
    }

    /// Alert headline for the active scenario, title upper-cased.
    #[must_use]
    pub fn scenario_heading(&self) -> Option<String> {
        self.scenario.map(|s| s.title.to_uppercase())
    }
}

impl<S: TokenSource> ScenarioSessionFlow<S> {
    #[must_use]
    pub fn snapshot(&self) -> SessionView {
        let scenario = self.active_scenario();
        let badge = self.last_outcome();
        SessionView {
            phase: self.phase(),
            role: self.role().map(str::to_uppercase),
            challenge: self.challenge_token().map(ToString::to_string),
            admitted_pin: self.admitted_pin().map(ToString::to_string),
            scenario,
            cores: self
                .selected_cores()
                .iter()
                .map(|core| CoreGreeting {
                    core,
                    greeting: core.greeting(),
                })
                .collect(),
            can_confirm_cores: self.can_confirm_cores(),
            decision: self.last_decision().map(str::to_string),
            badge: badge.map(|b| b.label().to_uppercase()),
            result_description: scenario
                .zip(badge)
                .map(|(scenario, badge)| result_description(&scenario.title, badge)),
        }
    }
}
