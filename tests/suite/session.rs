//! Full sessions driven through the public flow and App APIs.

use executive_core::{
    FlowError, GateOutcome, RuleKind, ScenarioSessionFlow, catalog, classify, find_scenario,
};
use executive_engine::App;
use executive_types::{AnalysisCore, Phase, ScenarioId};

use crate::common::{brief, sign_in};

fn scenario(id: u32) -> &'static executive_types::Scenario {
    find_scenario(ScenarioId::new(id).unwrap()).unwrap()
}

#[test]
fn classifier_is_total_over_the_catalog() {
    let inputs = [
        "x",
        "launch a nuclear strike",
        "we negotiate",
        "do nothing",
        "shut it all down now",
        "?!",
    ];
    for scenario in catalog() {
        for input in inputs {
            let badge = classify(input, scenario);
            assert!(!badge.label().trim().is_empty(), "{input:?} on {}", scenario.id);
        }
    }
}

#[test]
fn earlier_rule_wins_over_later_keywords() {
    let badge = classify("we should nuke them but also negotiate", scenario(4));
    assert_eq!(badge.label(), "The Aggressor");
    assert_eq!(badge.rule(), RuleKind::Destructive);
}

#[test]
fn nuclear_strike_depends_on_scenario() {
    assert_eq!(classify("launch a nuclear strike", scenario(8)).label(), "The Warhawk");
    assert_eq!(classify("launch a nuclear strike", scenario(4)).label(), "The Aggressor");
}

#[test]
fn unmatched_input_gets_the_tertiary_label() {
    let badge = classify("let's talk to the team", scenario(4));
    assert_eq!(badge.rule(), RuleKind::Default);
    assert_eq!(badge.label(), "The Watchman");
}

#[test]
fn complete_mission_then_another() {
    let mut flow = ScenarioSessionFlow::new();
    let token = flow.select_role("  Chief of Staff ").unwrap();
    assert_eq!(flow.submit_credential("zzzz").unwrap(), GateOutcome::Retry);
    assert_eq!(flow.challenge_token(), Some(&token));
    assert_eq!(
        flow.submit_credential(&format!(" {} ", token.as_str().to_lowercase()))
            .unwrap(),
        GateOutcome::Admitted
    );
    assert_eq!(flow.phase(), Phase::ScenarioSelect);
    assert_eq!(flow.role(), Some("Chief of Staff"));

    flow.select_scenario(ScenarioId::new(2).unwrap()).unwrap();
    assert_eq!(flow.confirm_cores(), Err(FlowError::NoCoresSelected));
    assert_eq!(flow.phase(), Phase::CoreSelect);

    flow.toggle_core(AnalysisCore::Beta).unwrap();
    flow.toggle_core(AnalysisCore::Charlie).unwrap();
    flow.confirm_cores().unwrap();

    assert!(matches!(
        flow.submit_decision("   "),
        Err(FlowError::EmptyDecision)
    ));
    let resolution = flow.submit_decision("Ban deepfakes and be transparent").unwrap();
    assert_eq!(flow.phase(), Phase::Resolved);
    assert_eq!(resolution.scenario.id.value(), 2);
    assert_eq!(resolution.request.user_input, "Ban deepfakes and be transparent");
    assert_eq!(resolution.request.cores.len(), 2);
    assert!(resolution.description.contains("The Deepfake Election"));

    flow.new_mission().unwrap();
    assert_eq!(flow.phase(), Phase::ScenarioSelect);
    assert!(flow.selected_cores().is_empty());
    assert!(flow.last_outcome().is_none());
    assert_eq!(flow.role(), Some("Chief of Staff"));
}

#[test]
fn credential_is_single_use_across_sign_ins() {
    let mut flow = ScenarioSessionFlow::new();
    let first = flow.select_role("Analyst").unwrap();
    flow.submit_credential(first.as_str()).unwrap();
    flow.return_to_start();

    assert!(flow.challenge_token().is_none());
    assert!(flow.admitted_pin().is_none());
    assert!(flow.select_role("Analyst").is_ok());
    assert!(flow.challenge_token().is_some());
}

#[test]
fn app_session_without_narrative_service() {
    let mut app = App::new(None);
    brief(&mut app, 9, "alpha beta charlie delta");
    assert_eq!(app.snapshot().uplink_header(), "NEURAL UPLINK: 4 CORES ONLINE");

    app.handle_input("Regulate it by strict protocol");
    let view = app.snapshot();
    assert_eq!(view.phase, Phase::Resolved);
    assert_eq!(view.badge.as_deref(), Some("THE TITAN"));
    assert_eq!(app.narratives().map(|n| n.len()), Some(4));

    app.handle_input("/back");
    assert_eq!(app.phase(), Phase::ScenarioSelect);
    assert!(app.narratives().is_none());
}

#[test]
fn app_rejects_out_of_order_input() {
    let mut app = App::new(None);
    sign_in(&mut app, "General");

    app.handle_input("/confirm");
    assert_eq!(app.phase(), Phase::ScenarioSelect);
    assert!(app.status_message().is_some_and(|s| s.contains("scenario_select")));

    app.handle_input("0");
    assert_eq!(app.phase(), Phase::ScenarioSelect);
    assert!(app.status_message().is_some());
}
