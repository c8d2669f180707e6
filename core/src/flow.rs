//! Session state machine for one player.
//!
//! [`ScenarioSessionFlow`] owns every piece of session state. Each trigger
//! either performs its whole transition or returns a [`FlowError`] and leaves
//! the session exactly as it was.

use thiserror::Error;

use executive_types::{
    AnalysisCore, CompletionRequest, CoreSet, EmptyStringError, NonEmptyString, Phase, Scenario,
    ScenarioId,
};

use crate::catalog::find_scenario;
use crate::classifier::{Badge, classify, result_description};
use crate::gate::{CredentialGate, ThreadRngSource, Token, TokenSource};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("cannot {action} during {phase}")]
    WrongPhase { action: &'static str, phase: Phase },
    #[error("select at least one analysis core first")]
    NoCoresSelected,
    #[error("decision must not be empty")]
    EmptyDecision,
    #[error("role must not be empty")]
    EmptyRole,
    #[error("no scenario with id {0}")]
    UnknownScenario(ScenarioId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Admitted,
    Retry,
}

/// A submitted decision: trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionText(NonEmptyString);

impl DecisionText {
    pub fn new(raw: &str) -> Result<Self, EmptyStringError> {
        NonEmptyString::trimmed(raw).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Everything produced by resolving a decision.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub scenario: &'static Scenario,
    pub badge: Badge,
    pub description: String,
    /// Body for the best-effort narrative request.
    pub request: CompletionRequest,
}

#[derive(Debug, Default)]
struct SessionState {
    role: Option<NonEmptyString>,
    admitted_pin: Option<Token>,
    active_scenario: Option<&'static Scenario>,
    selected_cores: CoreSet,
    last_outcome: Option<Badge>,
    last_decision: Option<DecisionText>,
}

impl SessionState {
    fn clear_scenario(&mut self) {
        self.active_scenario = None;
        self.selected_cores.clear();
        self.last_outcome = None;
        self.last_decision = None;
    }
}

#[derive(Debug, Default)]
pub struct ScenarioSessionFlow<S = ThreadRngSource> {
    phase: Phase,
    gate: CredentialGate<S>,
    state: SessionState,
}

impl ScenarioSessionFlow<ThreadRngSource> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: TokenSource> ScenarioSessionFlow<S> {
    #[must_use]
    pub fn with_source(source: S) -> Self {
        Self {
            phase: Phase::RoleSelect,
            gate: CredentialGate::with_source(source),
            state: SessionState::default(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.state.role.as_ref().map(NonEmptyString::as_str)
    }

    /// Token currently shown in the challenge prompt.
    #[must_use]
    pub fn challenge_token(&self) -> Option<&Token> {
        self.gate.live()
    }

    /// The token that admitted this session. Display only; it is never live.
    #[must_use]
    pub fn admitted_pin(&self) -> Option<&Token> {
        self.state.admitted_pin.as_ref()
    }

    #[must_use]
    pub fn active_scenario(&self) -> Option<&'static Scenario> {
        self.state.active_scenario
    }

    #[must_use]
    pub fn selected_cores(&self) -> &CoreSet {
        &self.state.selected_cores
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<&Badge> {
        self.state.last_outcome.as_ref()
    }

    #[must_use]
    pub fn last_decision(&self) -> Option<&str> {
        self.state.last_decision.as_ref().map(DecisionText::as_str)
    }

    fn require(&self, action: &'static str, allowed: &[Phase]) -> Result<(), FlowError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(FlowError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn enter(&mut self, next: Phase) {
        tracing::info!(from = %self.phase, to = %next, "Phase transition");
        self.phase = next;
    }

    /// Store the role and open the credential challenge.
    pub fn select_role(&mut self, role: &str) -> Result<Token, FlowError> {
        self.require("select a role", &[Phase::RoleSelect])?;
        let role = NonEmptyString::trimmed(role).map_err(|_| FlowError::EmptyRole)?;
        self.state.role = Some(role);
        let token = self.gate.issue();
        self.enter(Phase::CredentialChallenge);
        Ok(token)
    }

    pub fn submit_credential(&mut self, candidate: &str) -> Result<GateOutcome, FlowError> {
        self.require("submit a credential", &[Phase::CredentialChallenge])?;
        let shown = self.gate.live().cloned();
        if !self.gate.verify(candidate) {
            tracing::debug!("Credential mismatch");
            return Ok(GateOutcome::Retry);
        }
        self.state.admitted_pin = shown;
        self.enter(Phase::ScenarioSelect);
        Ok(GateOutcome::Admitted)
    }

    /// Dismiss the challenge without answering it.
    pub fn close_challenge(&mut self) -> Result<(), FlowError> {
        self.require("close the challenge", &[Phase::CredentialChallenge])?;
        self.gate.close();
        self.state.role = None;
        self.enter(Phase::RoleSelect);
        Ok(())
    }

    pub fn select_scenario(&mut self, id: ScenarioId) -> Result<&'static Scenario, FlowError> {
        self.require("select a scenario", &[Phase::ScenarioSelect])?;
        let scenario = find_scenario(id).ok_or(FlowError::UnknownScenario(id))?;
        self.state.clear_scenario();
        self.state.active_scenario = Some(scenario);
        tracing::info!(scenario = id.value(), title = %scenario.title, "Scenario selected");
        self.enter(Phase::CoreSelect);
        Ok(scenario)
    }

    /// Flip `core` in the selection. Returns whether it is now selected.
    pub fn toggle_core(&mut self, core: AnalysisCore) -> Result<bool, FlowError> {
        self.require("toggle a core", &[Phase::CoreSelect])?;
        let selected = self.state.selected_cores.toggle(core);
        tracing::debug!(core = %core, selected, "Core toggled");
        Ok(selected)
    }

    #[must_use]
    pub fn can_confirm_cores(&self) -> bool {
        self.phase == Phase::CoreSelect && !self.state.selected_cores.is_empty()
    }

    pub fn confirm_cores(&mut self) -> Result<(), FlowError> {
        self.require("confirm cores", &[Phase::CoreSelect])?;
        if self.state.selected_cores.is_empty() {
            return Err(FlowError::NoCoresSelected);
        }
        tracing::info!(cores = self.state.selected_cores.len(), "Cores confirmed");
        self.enter(Phase::DecisionInput);
        Ok(())
    }

    /// Classify `text` and resolve the scenario.
    pub fn submit_decision(&mut self, text: &str) -> Result<Resolution, FlowError> {
        self.require("submit a decision", &[Phase::DecisionInput])?;
        let decision = DecisionText::new(text).map_err(|_| FlowError::EmptyDecision)?;
        let Some(scenario) = self.state.active_scenario else {
            // Only reachable if the phase and the scenario slot disagree.
            return Err(FlowError::WrongPhase {
                action: "submit a decision",
                phase: self.phase,
            });
        };

        let badge = classify(decision.as_str(), scenario);
        let description = result_description(&scenario.title, &badge);
        let request = CompletionRequest {
            scenario: scenario.id,
            user_input: decision.as_str().to_string(),
            cores: self.state.selected_cores.clone(),
        };

        self.state.last_outcome = Some(badge.clone());
        self.state.last_decision = Some(decision);
        self.enter(Phase::Resolved);

        Ok(Resolution {
            scenario,
            badge,
            description,
            request,
        })
    }

    /// Leave the current scenario for the mission list.
    pub fn back_to_missions(&mut self) -> Result<(), FlowError> {
        self.require(
            "go back to missions",
            &[Phase::CoreSelect, Phase::DecisionInput, Phase::Resolved],
        )?;
        self.state.clear_scenario();
        self.enter(Phase::ScenarioSelect);
        Ok(())
    }

    pub fn new_mission(&mut self) -> Result<(), FlowError> {
        self.require("start a new mission", &[Phase::Resolved])?;
        self.state.clear_scenario();
        self.enter(Phase::ScenarioSelect);
        Ok(())
    }

    /// Drop everything and go back to role selection. Valid from any phase.
    pub fn return_to_start(&mut self) {
        self.gate.close();
        self.state = SessionState::default();
        if self.phase != Phase::RoleSelect {
            self.enter(Phase::RoleSelect);
        }
    }
}
