//! Per-core narrative text produced by the remote completion service.

use serde::Serialize;

use crate::{AnalysisCore, CoreSet, ScenarioId};

/// Body of the completion request.
///
/// Serialized as `{ "scenario": <id>, "user_input": <text>, "cores": [<name>...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub scenario: ScenarioId,
    pub user_input: String,
    pub cores: CoreSet,
}

/// Text shown for one core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narrative {
    /// Returned by the completion service.
    Generated(String),
    /// Shown when the service did not supply text for this core.
    Placeholder(String),
}

impl Narrative {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Narrative::Generated(text) | Narrative::Placeholder(text) => text,
        }
    }

    #[must_use]
    pub const fn is_generated(&self) -> bool {
        matches!(self, Narrative::Generated(_))
    }
}

/// One narrative per selected core, in core order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreNarratives(Vec<(AnalysisCore, Narrative)>);

impl CoreNarratives {
    /// Every core gets `placeholder`.
    #[must_use]
    pub fn placeholders(cores: &CoreSet, placeholder: &str) -> Self {
        Self(
            cores
                .iter()
                .map(|core| (core, Narrative::Placeholder(placeholder.to_string())))
                .collect(),
        )
    }

    /// Pair each selected core with its generated text, falling back to `placeholder`.
    ///
    /// Cores the service answered for but that were not selected are dropped.
    pub fn merge<'a>(
        cores: &CoreSet,
        mut generated: impl FnMut(AnalysisCore) -> Option<&'a str>,
        placeholder: &str,
    ) -> Self {
        Self(
            cores
                .iter()
                .map(|core| {
                    let narrative = match generated(core) {
                        Some(text) if !text.trim().is_empty() => {
                            Narrative::Generated(text.trim().to_string())
                        }
                        _ => Narrative::Placeholder(placeholder.to_string()),
                    };
                    (core, narrative)
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn get(&self, core: AnalysisCore) -> Option<&Narrative> {
        self.0
            .iter()
            .find_map(|(c, narrative)| (*c == core).then_some(narrative))
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnalysisCore, &Narrative)> {
        self.0.iter().map(|(core, narrative)| (*core, narrative))
    }

    #[must_use]
    pub fn generated_count(&self) -> usize {
        self.0.iter().filter(|(_, n)| n.is_generated()).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
