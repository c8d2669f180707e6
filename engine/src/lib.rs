//! Session driver for Executive.
//!
//! [`App`] wraps a [`ScenarioSessionFlow`] with the one piece of async work
//! in the game: the narrative request sent when a decision resolves. The
//! transition and the badge never wait on it. The request runs as a spawned
//! task and its result is picked up later by [`App::poll_responses`] or
//! [`App::wait_for_responses`].

mod commands;
mod narratives;

use std::time::Duration;

pub use commands::{CommandSpec, command_help_summary, command_specs};
pub use executive_core;
pub use executive_providers::CompletionClient;

use executive_core::{
    FlowError, GateOutcome, Resolution, ScenarioSessionFlow, SessionView, Token,
};
use executive_providers::DEFAULT_PLACEHOLDER;
use executive_types::{AnalysisCore, CoreNarratives, Phase, ScenarioId};

use crate::narratives::NarrativeState;

/// Extra time `wait_for_responses` allows beyond the client's own timeout.
const WAIT_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct App {
    flow: ScenarioSessionFlow,
    completion: Option<CompletionClient>,
    narratives: NarrativeState,
    status_message: Option<String>,
    should_quit: bool,
}

impl App {
    /// `completion` is `None` when the narrative service is disabled.
    #[must_use]
    pub fn new(completion: Option<CompletionClient>) -> Self {
        Self {
            flow: ScenarioSessionFlow::new(),
            completion,
            narratives: NarrativeState::Idle,
            status_message: None,
            should_quit: false,
        }
    }

    #[must_use]
    pub fn flow(&self) -> &ScenarioSessionFlow {
        &self.flow
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.flow.phase()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionView {
        self.flow.snapshot()
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Take the status line, leaving none.
    pub fn take_status(&mut self) -> Option<String> {
        self.status_message.take()
    }

    fn placeholder(&self) -> &str {
        self.completion
            .as_ref()
            .map_or(DEFAULT_PLACEHOLDER, CompletionClient::placeholder)
    }

    // ------------------------------------------------------------------
    // Flow triggers
    // ------------------------------------------------------------------

    pub fn select_role(&mut self, role: &str) -> Result<Token, FlowError> {
        self.flow.select_role(role)
    }

    pub fn submit_credential(&mut self, candidate: &str) -> Result<GateOutcome, FlowError> {
        self.flow.submit_credential(candidate)
    }

    pub fn close_challenge(&mut self) -> Result<(), FlowError> {
        self.flow.close_challenge()
    }

    pub fn select_scenario(&mut self, id: ScenarioId) -> Result<(), FlowError> {
        self.flow.select_scenario(id).map(|_| ())
    }

    pub fn toggle_core(&mut self, core: AnalysisCore) -> Result<bool, FlowError> {
        self.flow.toggle_core(core)
    }

    pub fn confirm_cores(&mut self) -> Result<(), FlowError> {
        self.flow.confirm_cores()
    }

    /// Resolve the decision now and start the narrative request in the background.
    pub fn submit_decision(&mut self, text: &str) -> Result<Resolution, FlowError> {
        let resolution = self.flow.submit_decision(text)?;
        self.start_narratives(&resolution);
        Ok(resolution)
    }

    pub fn back_to_missions(&mut self) -> Result<(), FlowError> {
        self.flow.back_to_missions()?;
        self.discard_narratives();
        Ok(())
    }

    pub fn new_mission(&mut self) -> Result<(), FlowError> {
        self.flow.new_mission()?;
        self.discard_narratives();
        Ok(())
    }

    pub fn return_to_start(&mut self) {
        self.flow.return_to_start();
        self.discard_narratives();
    }

    // ------------------------------------------------------------------
    // Narratives
    // ------------------------------------------------------------------

    fn start_narratives(&mut self, resolution: &Resolution) {
        self.discard_narratives();
        let cores = &resolution.request.cores;

        let Some(client) = self.completion.clone() else {
            self.narratives =
                NarrativeState::Ready(CoreNarratives::placeholders(cores, self.placeholder()));
            return;
        };

        self.narratives = match NarrativeState::spawn(client, resolution.request.clone()) {
            Some(pending) => pending,
            None => {
                tracing::warn!("No async runtime available; skipping narrative request");
                NarrativeState::Ready(CoreNarratives::placeholders(cores, self.placeholder()))
            }
        };
    }

    fn discard_narratives(&mut self) {
        if std::mem::replace(&mut self.narratives, NarrativeState::Idle).abort() {
            tracing::debug!("Aborted in-flight narrative request");
        }
    }

    /// Narratives for the current resolution, once they have arrived.
    #[must_use]
    pub fn narratives(&self) -> Option<&CoreNarratives> {
        match &self.narratives {
            NarrativeState::Ready(narratives) => Some(narratives),
            NarrativeState::Idle | NarrativeState::Pending(_) => None,
        }
    }

    #[must_use]
    pub fn narratives_pending(&self) -> bool {
        matches!(self.narratives, NarrativeState::Pending(_))
    }

    /// Collect a finished narrative request without blocking.
    ///
    /// Returns true when narratives became available on this call.
    pub fn poll_responses(&mut self) -> bool {
        match std::mem::replace(&mut self.narratives, NarrativeState::Idle) {
            NarrativeState::Pending(task) => match task.try_complete_now(self.placeholder()) {
                Ok(narratives) => {
                    self.narratives = NarrativeState::Ready(narratives);
                    true
                }
                Err(task) => {
                    self.narratives = NarrativeState::Pending(task);
                    false
                }
            },
            other => {
                self.narratives = other;
                false
            }
        }
    }

    /// Wait for the narrative request to finish.
    ///
    /// Bounded by the client's timeout plus a short grace period; on expiry
    /// the task is aborted and placeholders are used. Dropping the returned
    /// future leaves the request pending, to be collected by a later wait,
    /// [`App::poll_responses`], or [`App::cancel_narratives`].
    pub async fn wait_for_responses(&mut self) -> Option<&CoreNarratives> {
        let limit = self
            .completion
            .as_ref()
            .map_or(WAIT_GRACE, |client| client.timeout() + WAIT_GRACE);

        let joined = match &mut self.narratives {
            NarrativeState::Pending(task) => Some(task.join_within(limit).await),
            NarrativeState::Idle | NarrativeState::Ready(_) => None,
        };

        if let Some(joined) = joined
            && let NarrativeState::Pending(task) = std::mem::take(&mut self.narratives)
        {
            let placeholder = self.placeholder().to_string();
            let narratives = match joined {
                Some(result) => task.finish(result, &placeholder),
                None => task.expire(limit, &placeholder),
            };
            self.narratives = NarrativeState::Ready(narratives);
        }
        self.narratives()
    }

    /// Stop waiting: abort a pending request and show placeholders instead.
    ///
    /// Narratives that already arrived are kept.
    pub fn cancel_narratives(&mut self) -> Option<&CoreNarratives> {
        match std::mem::take(&mut self.narratives) {
            NarrativeState::Pending(task) => {
                let placeholder = self.placeholder().to_string();
                self.narratives = NarrativeState::Ready(task.cancel(&placeholder));
            }
            other => self.narratives = other,
        }
        self.narratives()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.discard_narratives();
    }
}
