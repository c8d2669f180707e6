//! Analysis cores: the selectable AI perspectives.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named analysis core. Declaration order is display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisCore {
    Alpha,
    Beta,
    Charlie,
    Delta,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown analysis core {0:?} (expected alpha, beta, charlie, or delta)")]
pub struct CoreParseError(pub String);

impl AnalysisCore {
    pub const ALL: [AnalysisCore; 4] = [
        AnalysisCore::Alpha,
        AnalysisCore::Beta,
        AnalysisCore::Charlie,
        AnalysisCore::Delta,
    ];

    /// Wire name, as sent to and keyed by the completion service.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AnalysisCore::Alpha => "alpha",
            AnalysisCore::Beta => "beta",
            AnalysisCore::Charlie => "charlie",
            AnalysisCore::Delta => "delta",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            AnalysisCore::Alpha => "ALPHA",
            AnalysisCore::Beta => "BETA",
            AnalysisCore::Charlie => "CHARLIE",
            AnalysisCore::Delta => "DELTA",
        }
    }

    #[must_use]
    pub const fn focus(self) -> &'static str {
        match self {
            AnalysisCore::Alpha => "Logic",
            AnalysisCore::Beta => "Empathy",
            AnalysisCore::Charlie => "Strategy & Economics",
            AnalysisCore::Delta => "Military Response",
        }
    }

    #[must_use]
    pub const fn greeting(self) -> &'static str {
        match self {
            AnalysisCore::Alpha => {
                "Neural link established. I am Alpha\u{2014}your logic core. I process probabilities, \
                 structural integrity, and long-term cascading effects. Emotion is noise. Data is \
                 truth. I will provide the calculated path."
            }
            AnalysisCore::Beta => {
                "Hello. I'm Beta\u{2014}your empathy core. I'm here to safeguard lives, preserve \
                 trust, and ensure we don't lose our humanity in the crisis. Every decision has a \
                 human cost. I'll remind you of that."
            }
            AnalysisCore::Charlie => {
                "Charlie online. Strategy and economics core ready. I optimize resource \
                 allocation, maximize leverage, and ensure we come out ahead. The game is won by \
                 those who control the board. Let's play."
            }
            AnalysisCore::Delta => {
                "Delta here. Military response core activated. When diplomacy fails, I provide \
                 kinetic solutions. Swift. Decisive. Overwhelming. I don't hesitate. You \
                 shouldn't either."
            }
        }
    }

    /// Parse a core name, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, CoreParseError> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|core| core.as_str() == normalized)
            .ok_or_else(|| CoreParseError(raw.trim().to_string()))
    }
}

impl FromStr for AnalysisCore {
    type Err = CoreParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AnalysisCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The cores selected for one scenario run.
///
/// A set: toggling twice removes, order of selection is irrelevant, and
/// iteration follows [`AnalysisCore::ALL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoreSet(BTreeSet<AnalysisCore>);

impl CoreSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `core`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, core: AnalysisCore) -> bool {
        if self.0.remove(&core) {
            false
        } else {
            self.0.insert(core);
            true
        }
    }

    pub fn insert(&mut self, core: AnalysisCore) -> bool {
        self.0.insert(core)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn contains(&self, core: AnalysisCore) -> bool {
        self.0.contains(&core)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AnalysisCore> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<AnalysisCore> for CoreSet {
    fn from_iter<I: IntoIterator<Item = AnalysisCore>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
