//! Scenario records and their outcome label slots.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identity of a scenario. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ScenarioId(u32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioIdError {
    #[error("scenario id must be positive")]
    Zero,
    #[error("scenario id {0:?} is not a number")]
    NotANumber(String),
}

impl ScenarioId {
    pub const fn new(id: u32) -> Result<Self, ScenarioIdError> {
        if id == 0 {
            Err(ScenarioIdError::Zero)
        } else {
            Ok(Self(id))
        }
    }

    /// Parse user input such as `"8"` or `" 08 "`.
    pub fn parse(raw: &str) -> Result<Self, ScenarioIdError> {
        let trimmed = raw.trim();
        let id = trimmed
            .parse::<u32>()
            .map_err(|_| ScenarioIdError::NotANumber(trimmed.to_string()))?;
        Self::new(id)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for ScenarioId {
    type Error = ScenarioIdError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScenarioId> for u32 {
    fn from(value: ScenarioId) -> Self {
        value.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the three outcome label slots a scenario supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelSlot {
    Primary,
    Secondary,
    Tertiary,
}

/// The three scenario-specific badge labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeLabels {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

impl OutcomeLabels {
    #[must_use]
    pub fn new(
        primary: impl Into<String>,
        secondary: impl Into<String>,
        tertiary: impl Into<String>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            tertiary: tertiary.into(),
        }
    }

    /// The label in `slot`, or `None` when that slot is blank.
    #[must_use]
    pub fn get(&self, slot: LabelSlot) -> Option<&str> {
        let raw = match slot {
            LabelSlot::Primary => &self.primary,
            LabelSlot::Secondary => &self.secondary,
            LabelSlot::Tertiary => &self.tertiary,
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }

    /// True when every slot carries a label.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [LabelSlot::Primary, LabelSlot::Secondary, LabelSlot::Tertiary]
            .into_iter()
            .all(|slot| self.get(slot).is_some())
    }
}

/// A crisis scenario from the static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub title: String,
    pub alert_text: String,
    pub description: String,
    pub outcome_labels: OutcomeLabels,
}

impl Scenario {
    #[must_use]
    pub fn new(
        id: ScenarioId,
        title: impl Into<String>,
        alert_text: impl Into<String>,
        description: impl Into<String>,
        outcome_labels: OutcomeLabels,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            alert_text: alert_text.into(),
            description: description.into(),
            outcome_labels,
        }
    }

    /// Mission card identifier, e.g. `SCENARIO_03`.
    #[must_use]
    pub fn card_label(&self) -> String {
        format!("SCENARIO_{:02}", self.id.value())
    }
}
