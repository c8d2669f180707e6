//! Core game logic for Executive.
//!
//! Synchronous and IO-free: the credential gate, the decision classifier,
//! the scenario catalog, and the session state machine that ties them
//! together. The engine crate drives this from async code.

mod catalog;
pub mod classifier;
mod display;
mod flow;
pub mod gate;

pub use catalog::{catalog, find_scenario};
pub use classifier::{Badge, RuleKind, classify, result_description, rules};
pub use display::{CoreGreeting, MissionCard, SessionView, mission_cards};
pub use flow::{DecisionText, FlowError, GateOutcome, Resolution, ScenarioSessionFlow};
pub use gate::{CredentialGate, ThreadRngSource, Token, TokenSource};
