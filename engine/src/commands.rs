//! Line input for the App.
//!
//! A line starting with `/` is a command (`/quit`, `/back`, ...). Anything
//! else is answer text for the current phase: a role, a PIN, a scenario
//! number, core names to toggle, or the decision itself. While a decision is
//! being typed, a `/word` that is not a known command is decision text.

use executive_core::{FlowError, GateOutcome};
use executive_types::{AnalysisCore, Phase, ScenarioId};

use crate::App;

#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub usage: &'static str,
    pub description: &'static str,
    /// Phases the command applies to; empty means every phase.
    pub phases: &'static [Phase],
}

impl CommandSpec {
    #[must_use]
    pub fn available_in(&self, phase: Phase) -> bool {
        self.phases.is_empty() || self.phases.contains(&phase)
    }
}

const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        usage: "close",
        description: "Dismiss the PIN challenge",
        phases: &[Phase::CredentialChallenge],
    },
    CommandSpec {
        usage: "confirm",
        description: "Lock in the selected cores",
        phases: &[Phase::CoreSelect],
    },
    CommandSpec {
        usage: "back",
        description: "Return to the mission list",
        phases: &[Phase::CoreSelect, Phase::DecisionInput, Phase::Resolved],
    },
    CommandSpec {
        usage: "new",
        description: "Start a new mission",
        phases: &[Phase::Resolved],
    },
    CommandSpec {
        usage: "restart",
        description: "Return to role selection",
        phases: &[],
    },
    CommandSpec {
        usage: "help",
        description: "Show available commands",
        phases: &[],
    },
    CommandSpec {
        usage: "quit",
        description: "Exit",
        phases: &[],
    },
];

#[must_use]
pub fn command_specs() -> &'static [CommandSpec] {
    COMMAND_SPECS
}

/// One-line list of the commands usable in `phase`.
#[must_use]
pub fn command_help_summary(phase: Phase) -> String {
    let labels: Vec<&str> = COMMAND_SPECS
        .iter()
        .filter(|spec| spec.available_in(phase))
        .map(|spec| spec.usage)
        .collect();
    format!("Commands: /{}", labels.join(", /"))
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Command<'a> {
    Quit,
    Close,
    Confirm,
    Back,
    New,
    Restart,
    Help,
    Unknown(&'a str),
    Empty,
}

impl<'a> Command<'a> {
    /// Parse the text after the leading `/`.
    pub(crate) fn parse(raw: &'a str) -> Self {
        match raw.split_whitespace().next() {
            Some("q" | "quit" | "exit") => Command::Quit,
            Some("close" | "cancel") => Command::Close,
            Some("confirm" | "ok") => Command::Confirm,
            Some("back") => Command::Back,
            Some("new") => Command::New,
            Some("restart" | "start") => Command::Restart,
            Some("help" | "?") => Command::Help,
            Some(other) => Command::Unknown(other),
            None => Command::Empty,
        }
    }
}

impl App {
    /// Apply one line of user input. Feedback goes to the status line.
    pub fn handle_input(&mut self, line: &str) {
        self.clear_status();
        let line = line.trim();
        if let Some(raw) = line.strip_prefix('/') {
            let command = Command::parse(raw);
            if matches!(command, Command::Unknown(_)) && self.phase() == Phase::DecisionInput {
                self.process_answer(line);
            } else {
                self.process_command(command);
            }
        } else if !line.is_empty() {
            self.process_answer(line);
        }
    }

    fn process_command(&mut self, command: Command<'_>) {
        let result = match command {
            Command::Quit => {
                self.request_quit();
                Ok(())
            }
            Command::Close => self.close_challenge(),
            Command::Confirm => self.confirm_cores(),
            Command::Back => self.back_to_missions(),
            Command::New => self.new_mission(),
            Command::Restart => {
                self.return_to_start();
                Ok(())
            }
            Command::Help => {
                self.set_status(command_help_summary(self.phase()));
                Ok(())
            }
            Command::Unknown(cmd) => {
                self.set_status(format!("Unknown command: /{cmd}"));
                Ok(())
            }
            Command::Empty => Ok(()),
        };
        if let Err(err) = result {
            self.report(&err);
        }
    }

    fn process_answer(&mut self, text: &str) {
        let result = match self.phase() {
            Phase::RoleSelect => self.select_role(text).map(|_| ()),
            Phase::CredentialChallenge => match self.submit_credential(text) {
                Ok(GateOutcome::Admitted) => Ok(()),
                Ok(GateOutcome::Retry) => {
                    self.set_status("INCORRECT PIN - TRY AGAIN");
                    Ok(())
                }
                Err(err) => Err(err),
            },
            Phase::ScenarioSelect => match ScenarioId::parse(text) {
                Ok(id) => self.select_scenario(id),
                Err(err) => {
                    self.set_status(format!("Enter a scenario number: {err}"));
                    Ok(())
                }
            },
            Phase::CoreSelect => {
                self.toggle_cores(text);
                Ok(())
            }
            Phase::DecisionInput => self.submit_decision(text).map(|_| ()),
            Phase::Resolved => {
                self.set_status(command_help_summary(Phase::Resolved));
                Ok(())
            }
        };
        if let Err(err) = result {
            self.report(&err);
        }
    }

    /// Toggle every core named in `text`. Unknown names are reported and skipped.
    fn toggle_cores(&mut self, text: &str) {
        let mut unknown = Vec::new();
        for word in text.split(|c: char| c.is_whitespace() || c == ',') {
            if word.is_empty() {
                continue;
            }
            match AnalysisCore::parse(word) {
                Ok(core) => {
                    if let Err(err) = self.toggle_core(core) {
                        self.report(&err);
                        return;
                    }
                }
                Err(_) => unknown.push(word),
            }
        }
        if !unknown.is_empty() {
            self.set_status(format!(
                "Unknown core: {} (choose from alpha, beta, charlie, delta)",
                unknown.join(", ")
            ));
        }
    }

    fn report(&mut self, err: &FlowError) {
        tracing::debug!(phase = %self.phase(), error = %err, "Rejected input");
        self.set_status(err.to_string());
    }
}
