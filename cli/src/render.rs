//! Plain-text rendering of a [`SessionView`].
//!
//! Each phase draws as one block of lines. Narratives are drawn separately
//! because they arrive after the Resolved screen has been shown.

use std::borrow::Cow;
use std::fmt::Write as _;

use executive_core::{SessionView, mission_cards};
use executive_types::{AnalysisCore, CoreNarratives, Narrative, Phase};

const TITLE: &str = "EXECUTIVE FUNCTION // CRISIS COMMAND";
const RULE: &str = "----------------------------------------";

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Renderer {
    ascii_only: bool,
}

impl Renderer {
    pub(crate) fn new(ascii_only: bool) -> Self {
        Self { ascii_only }
    }

    pub(crate) fn screen(&self, view: &SessionView) -> String {
        let mut out = String::new();
        match view.phase {
            Phase::RoleSelect => role_select(&mut out),
            Phase::CredentialChallenge => credential_challenge(&mut out, view),
            Phase::ScenarioSelect => scenario_select(&mut out, view),
            Phase::CoreSelect => core_select(&mut out, view),
            Phase::DecisionInput => decision_input(&mut out, view),
            Phase::Resolved => resolved(&mut out, view),
        }
        self.finish(out)
    }

    pub(crate) fn narratives(&self, narratives: &CoreNarratives) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "CORE ANALYSIS");
        for (core, narrative) in narratives.iter() {
            let marker = match narrative {
                Narrative::Generated(_) => "",
                Narrative::Placeholder(_) => " (offline)",
            };
            let _ = writeln!(
                out,
                "  {}{marker}: {}",
                core.display_name(),
                narrative.text()
            );
        }
        self.finish(out)
    }

    pub(crate) fn status(&self, message: &str) -> String {
        self.finish(format!(">> {message}\n"))
    }

    pub(crate) fn notice(&self, message: &str) -> String {
        self.finish(format!("{message}\n"))
    }

    fn finish(&self, text: String) -> String {
        if self.ascii_only {
            asciify(&text).into_owned()
        } else {
            text
        }
    }
}

/// Replace characters outside ASCII. Dashes become `--`, anything else `?`.
pub(crate) fn asciify(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            c if c.is_ascii() => out.push(c),
            '\u{2013}' | '\u{2014}' => out.push_str("--"),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            _ => out.push('?'),
        }
    }
    Cow::Owned(out)
}

fn header(out: &mut String, view: &SessionView) {
    let _ = writeln!(out, "{TITLE}");
    if let Some(role) = &view.role {
        match view.pin_line() {
            Some(pin) => {
                let _ = writeln!(out, "OPERATOR: {role} | {pin}");
            }
            None => {
                let _ = writeln!(out, "OPERATOR: {role}");
            }
        }
    }
    let _ = writeln!(out, "{RULE}");
}

fn scenario_block(out: &mut String, view: &SessionView) {
    let Some(scenario) = view.scenario else {
        return;
    };
    let _ = writeln!(out, "!! {}", scenario.alert_text);
    if let Some(heading) = view.scenario_heading() {
        let _ = writeln!(out, "{} // {heading}", scenario.card_label());
    }
    let _ = writeln!(out, "{}", scenario.description);
    let _ = writeln!(out);
}

fn role_select(out: &mut String) {
    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "IDENTIFY YOURSELF");
    let _ = writeln!(out, "Enter your role (President, General, Analyst, ...):");
}

fn credential_challenge(out: &mut String, view: &SessionView) {
    header(out, view);
    let _ = writeln!(out, "SECURITY CLEARANCE REQUIRED");
    if let Some(token) = &view.challenge {
        let _ = writeln!(out, "Your access PIN: {token}");
    }
    let _ = writeln!(out, "Enter the PIN to proceed, or /close to cancel:");
}

fn scenario_select(out: &mut String, view: &SessionView) {
    header(out, view);
    let _ = writeln!(out, "SELECT MISSION");
    for card in mission_cards() {
        let _ = writeln!(out, "  [{}] {}", card.label, card.title);
        let _ = writeln!(out, "      {}", card.description);
    }
    let _ = writeln!(out, "Enter a scenario number:");
}

fn core_select(out: &mut String, view: &SessionView) {
    header(out, view);
    scenario_block(out, view);
    let _ = writeln!(out, "ANALYSIS CORES");
    for core in AnalysisCore::ALL {
        let mark = if view.cores.iter().any(|g| g.core == core) {
            'x'
        } else {
            ' '
        };
        let _ = writeln!(
            out,
            "  [{mark}] {:<8} {}",
            core.display_name(),
            core.focus()
        );
    }
    if view.can_confirm_cores {
        let _ = writeln!(out, "Type core names to toggle, then /confirm:");
    } else {
        let _ = writeln!(out, "Type core names to toggle (at least one):");
    }
}

fn decision_input(out: &mut String, view: &SessionView) {
    header(out, view);
    scenario_block(out, view);
    let _ = writeln!(out, "{}", view.uplink_header());
    for entry in &view.cores {
        let _ = writeln!(out, "  {}: {}", entry.core.display_name(), entry.greeting);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Enter your decision:");
}

fn resolved(out: &mut String, view: &SessionView) {
    header(out, view);
    if let Some(heading) = view.scenario_heading() {
        let _ = writeln!(out, "{heading}");
    }
    if let Some(decision) = &view.decision {
        let _ = writeln!(out, "DECISION: \"{decision}\"");
    }
    if let Some(badge) = &view.badge {
        let _ = writeln!(out, "RESULT: {badge}");
    }
    if let Some(description) = &view.result_description {
        let _ = writeln!(out, "{description}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "/new for another mission, /restart to sign out");
}
