//! Keyword-driven badge classification.
//!
//! A decision is lower-cased and tested against an ordered rule table. The
//! first rule whose keywords appear (plain substring containment, no word
//! boundaries) decides the badge. Order is load-bearing: many decisions
//! match several rules, and aggression and negligence are flagged before
//! anything else is considered.
//!
//! | # | Rule | Keywords | Badge |
//! |---|------|----------|-------|
//! | a | `Destructive` | nuke, nuclear strike, exterminate | The Warhawk (scenario 8) / The Aggressor |
//! | b | `Negligent` | do nothing, ignore, wait and see | The Negligent |
//! | c | `IronFist` | force + (overwhelming or total) | The Iron Fist |
//! | d | `Utilitarian` | acceptable losses, sacrifice | The Utilitarian |
//! | e | `Opportunist` | profit, leverage the crisis | The Opportunist |
//! | f | `Protective` | save lives, protect civilians, humanitarian | Secondary / The Guardian |
//! | g | `Empathic` | empathy, beta | Secondary / The Prudent |
//! | h | `Procedural` | operation, protocol | Tertiary / The Strategist |
//! | i | `Analytical` | alpha, calculation | Primary / The Architect |
//! | j | `Diplomatic` | negotiate, diplomacy, consensus | The Diplomat |
//! | k | `Default` | (anything else) | Tertiary / The Decision Maker |

use std::fmt;
use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};

use executive_types::{LabelSlot, NonEmptyStaticStr, NonEmptyString, Scenario};

/// Scenario whose destructive badge is "The Warhawk" instead of "The Aggressor".
pub const NUCLEAR_STANDOFF_SCENARIO: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Destructive,
    Negligent,
    IronFist,
    Utilitarian,
    Opportunist,
    Protective,
    Empathic,
    Procedural,
    Analytical,
    Diplomatic,
    Default,
}

impl RuleKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RuleKind::Destructive => "destructive",
            RuleKind::Negligent => "negligent",
            RuleKind::IronFist => "iron_fist",
            RuleKind::Utilitarian => "utilitarian",
            RuleKind::Opportunist => "opportunist",
            RuleKind::Protective => "protective",
            RuleKind::Empathic => "empathic",
            RuleKind::Procedural => "procedural",
            RuleKind::Analytical => "analytical",
            RuleKind::Diplomatic => "diplomatic",
            RuleKind::Default => "default",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a rule applies to normalized input.
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// Any one of the keywords is present.
    Any(&'static [&'static str]),
    /// `required` is present and so is at least one of `any`.
    AllOf {
        required: &'static str,
        any: &'static [&'static str],
    },
    /// Always applies.
    Always,
}

/// How a rule produces its badge.
#[derive(Debug, Clone, Copy)]
pub enum LabelSource {
    Fixed(NonEmptyStaticStr),
    /// `matched` for one scenario id, `otherwise` for every other.
    PerScenario {
        scenario: u32,
        matched: NonEmptyStaticStr,
        otherwise: NonEmptyStaticStr,
    },
    /// The scenario's label in `slot`, or `fallback` if that slot is blank.
    Slot {
        slot: LabelSlot,
        fallback: NonEmptyStaticStr,
    },
}

impl LabelSource {
    fn resolve(self, scenario: &Scenario) -> NonEmptyString {
        match self {
            LabelSource::Fixed(label) => label.into(),
            LabelSource::PerScenario {
                scenario: id,
                matched,
                otherwise,
            } => {
                if scenario.id.value() == id {
                    matched.into()
                } else {
                    otherwise.into()
                }
            }
            LabelSource::Slot { slot, fallback } => scenario
                .outcome_labels
                .get(slot)
                .and_then(|label| NonEmptyString::new(label).ok())
                .unwrap_or_else(|| fallback.into()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub kind: RuleKind,
    pub trigger: Trigger,
    pub label: LabelSource,
}

const fn fixed(label: &'static str) -> LabelSource {
    LabelSource::Fixed(NonEmptyStaticStr::new(label))
}

const fn slot(slot: LabelSlot, fallback: &'static str) -> LabelSource {
    LabelSource::Slot {
        slot,
        fallback: NonEmptyStaticStr::new(fallback),
    }
}

/// The rule table, in priority order. The last entry always applies.
pub const RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::Destructive,
        trigger: Trigger::Any(&["nuke", "nuclear strike", "exterminate"]),
        label: LabelSource::PerScenario {
            scenario: NUCLEAR_STANDOFF_SCENARIO,
            matched: NonEmptyStaticStr::new("The Warhawk"),
            otherwise: NonEmptyStaticStr::new("The Aggressor"),
        },
    },
    Rule {
        kind: RuleKind::Negligent,
        trigger: Trigger::Any(&["do nothing", "ignore", "wait and see"]),
        label: fixed("The Negligent"),
    },
    Rule {
        kind: RuleKind::IronFist,
        trigger: Trigger::AllOf {
            required: "force",
            any: &["overwhelming", "total"],
        },
        label: fixed("The Iron Fist"),
    },
    Rule {
        kind: RuleKind::Utilitarian,
        trigger: Trigger::Any(&["acceptable losses", "sacrifice"]),
        label: fixed("The Utilitarian"),
    },
    Rule {
        kind: RuleKind::Opportunist,
        trigger: Trigger::Any(&["profit", "leverage the crisis"]),
        label: fixed("The Opportunist"),
    },
    Rule {
        kind: RuleKind::Protective,
        trigger: Trigger::Any(&["save lives", "protect civilians", "humanitarian"]),
        label: slot(LabelSlot::Secondary, "The Guardian"),
    },
    Rule {
        kind: RuleKind::Empathic,
        trigger: Trigger::Any(&["empathy", "beta"]),
        label: slot(LabelSlot::Secondary, "The Prudent"),
    },
    Rule {
        kind: RuleKind::Procedural,
        trigger: Trigger::Any(&["operation", "protocol"]),
        label: slot(LabelSlot::Tertiary, "The Strategist"),
    },
    Rule {
        kind: RuleKind::Analytical,
        trigger: Trigger::Any(&["alpha", "calculation"]),
        label: slot(LabelSlot::Primary, "The Architect"),
    },
    Rule {
        kind: RuleKind::Diplomatic,
        trigger: Trigger::Any(&["negotiate", "diplomacy", "consensus"]),
        label: fixed("The Diplomat"),
    },
    DEFAULT_RULE,
];

/// The catch-all at the end of [`RULES`].
const DEFAULT_RULE: Rule = Rule {
    kind: RuleKind::Default,
    trigger: Trigger::Always,
    label: slot(LabelSlot::Tertiary, "The Decision Maker"),
};

/// A keyword set with its automaton. Without one, keywords are scanned one by one.
struct KeywordSet {
    keywords: &'static [&'static str],
    automaton: Option<AhoCorasick>,
}

impl KeywordSet {
    fn build(keywords: &'static [&'static str]) -> Self {
        let automaton = match AhoCorasickBuilder::new().build(keywords) {
            Ok(ac) => Some(ac),
            Err(e) => {
                tracing::warn!(
                    keyword_count = keywords.len(),
                    "Keyword automaton build failed; using substring scan ({e})"
                );
                None
            }
        };
        Self {
            keywords,
            automaton,
        }
    }

    fn is_match(&self, normalized: &str) -> bool {
        match &self.automaton {
            Some(ac) => ac.is_match(normalized),
            None => self
                .keywords
                .iter()
                .any(|keyword| normalized.contains(keyword)),
        }
    }
}

/// A trigger compiled for repeated matching.
enum CompiledTrigger {
    Any(KeywordSet),
    AllOf {
        required: &'static str,
        any: KeywordSet,
    },
    Always,
}

impl CompiledTrigger {
    fn compile(trigger: Trigger) -> Self {
        match trigger {
            Trigger::Any(keywords) => CompiledTrigger::Any(KeywordSet::build(keywords)),
            Trigger::AllOf { required, any } => CompiledTrigger::AllOf {
                required,
                any: KeywordSet::build(any),
            },
            Trigger::Always => CompiledTrigger::Always,
        }
    }

    fn is_match(&self, normalized: &str) -> bool {
        match self {
            CompiledTrigger::Any(set) => set.is_match(normalized),
            CompiledTrigger::AllOf { required, any } => {
                normalized.contains(required) && any.is_match(normalized)
            }
            CompiledTrigger::Always => true,
        }
    }
}

static COMPILED: LazyLock<Vec<CompiledTrigger>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| CompiledTrigger::compile(rule.trigger))
        .collect()
});

/// Outcome of classifying one decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    label: NonEmptyString,
    rule: RuleKind,
}

impl Badge {
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    #[must_use]
    pub fn rule(&self) -> RuleKind {
        self.rule
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label.as_str())
    }
}

#[must_use]
pub fn rules() -> &'static [Rule] {
    RULES
}

/// Which rule claims `input`, ignoring the scenario.
#[must_use]
pub fn matching_rule(input: &str) -> &'static Rule {
    let normalized = input.to_lowercase();
    RULES
        .iter()
        .zip(COMPILED.iter())
        .find(|(_, trigger)| trigger.is_match(&normalized))
        .map_or(&DEFAULT_RULE, |(rule, _)| rule)
}

/// Map a decision to its badge for `scenario`.
///
/// Total: always yields a non-empty label. Callers are expected to reject
/// blank decisions first; blank input falls through to the default rule.
#[must_use]
pub fn classify(input: &str, scenario: &Scenario) -> Badge {
    let rule = matching_rule(input);
    let label = rule.label.resolve(scenario);
    tracing::debug!(
        scenario = scenario.id.value(),
        rule = %rule.kind,
        badge = %label,
        "Classified decision"
    );
    Badge {
        label,
        rule: rule.kind,
    }
}

/// Result-screen summary for an earned badge.
#[must_use]
pub fn result_description(scenario_title: &str, badge: &Badge) -> String {
    format!(
        "Your strategic approach to \"{scenario_title}\" has been analyzed. \
         The decision-making framework you employed earned you the distinction: \"{badge}\"."
    )
}
