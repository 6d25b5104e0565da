use proptest::prelude::*;
use serde_json::{Map, Value, json};

use crate::{
    flows::BuiltinFlow,
    form::FormState,
    validation::{ValidationError, ValidationIssue, ValidatorSet},
    wizard::{NavOutcome, Navigator, WizardCommand, section_status, validate_all},
};

fn needs_name(data: &Map<String, Value>) -> Result<(), ValidationError> {
    if data.get("name").is_some_and(|name| !name.is_null()) {
        Ok(())
    } else {
        Err(ValidationError::single(
            "",
            ValidationIssue::MissingFields(vec!["Name".to_string()]),
        ))
    }
}

fn three_steps() -> (FormState, ValidatorSet) {
    let state = FormState::from_sections(["one", "two", "three"]);
    let mut validators = ValidatorSet::new();
    validators.insert("one", needs_name);
    validators.insert("two", needs_name);
    (state, validators)
}

#[test]
fn next_is_blocked_until_the_section_is_valid() {
    let (mut state, validators) = three_steps();
    let err = Navigator::new(&mut state, &validators).next().unwrap_err();
    assert_eq!(err.section, "one");
    assert_eq!(state.active_section(), "one");
    assert_eq!(state.furthest_step(), 0);

    state.set_field("one", "name", json!("x"));
    let outcome = Navigator::new(&mut state, &validators).next().unwrap();
    assert_eq!(outcome, NavOutcome::Moved { from: 0, to: 1 });
    assert_eq!(state.furthest_step(), 1);
}

#[test]
fn last_valid_section_asks_for_submission() {
    let (mut state, validators) = three_steps();
    state.set_field("one", "name", json!("x"));
    state.set_field("two", "name", json!("y"));
    let mut nav = Navigator::new(&mut state, &validators);
    nav.next().unwrap();
    nav.next().unwrap();
    assert_eq!(nav.next().unwrap(), NavOutcome::ReadyToSubmit);
    assert_eq!(state.active_section(), "three");
}

#[test]
fn back_never_validates_and_stops_at_the_start() {
    let (mut state, validators) = three_steps();
    state.set_field("one", "name", json!("x"));
    let mut nav = Navigator::new(&mut state, &validators);
    nav.next().unwrap();
    assert_eq!(nav.back(), NavOutcome::Moved { from: 1, to: 0 });
    assert_eq!(nav.back(), NavOutcome::Unchanged);
}

#[test]
fn jumps_are_limited_to_reached_sections() {
    let (mut state, validators) = three_steps();
    state.set_field("one", "name", json!("x"));
    let mut nav = Navigator::new(&mut state, &validators);
    assert_eq!(nav.jump_to("three"), NavOutcome::Unchanged);
    nav.next().unwrap();
    nav.back();
    assert_eq!(nav.jump_to("two"), NavOutcome::Moved { from: 0, to: 1 });
    assert_eq!(nav.jump_to("missing"), NavOutcome::Unchanged);
    assert_eq!(nav.jump_to_index(9), NavOutcome::Unchanged);
}

#[test]
fn going_back_keeps_the_furthest_step() {
    let (mut state, validators) = three_steps();
    state.set_field("one", "name", json!("x"));
    state.set_field("two", "name", json!("y"));
    {
        let mut nav = Navigator::new(&mut state, &validators);
        nav.next().unwrap();
        nav.next().unwrap();
        nav.jump_to_index(0);
    }
    assert_eq!(state.active_index(), 0);
    assert_eq!(state.furthest_step(), 2);
    // Breaking an earlier section does not relock later ones.
    state.clear_field("one", &["name"]);
    assert!(state.is_reachable(2));
}

#[test]
fn commands_dispatch_to_moves() {
    let (mut state, validators) = three_steps();
    state.set_field("one", "name", json!("x"));
    let mut nav = Navigator::new(&mut state, &validators);
    assert!(nav.dispatch(WizardCommand::Next).is_ok());
    assert_eq!(
        nav.dispatch(WizardCommand::JumpTo("one".to_string())).unwrap(),
        NavOutcome::Moved { from: 1, to: 0 }
    );
    assert_eq!(nav.dispatch(WizardCommand::Back).unwrap(), NavOutcome::Unchanged);
}

#[test]
fn submitted_state_is_frozen() {
    let (mut state, validators) = three_steps();
    state.set_field("one", "name", json!("x"));
    state.mark_submitted();
    let mut nav = Navigator::new(&mut state, &validators);
    assert_eq!(nav.next().unwrap(), NavOutcome::Unchanged);
    assert_eq!(nav.jump_to_index(0), NavOutcome::Unchanged);
}

#[test]
fn validate_all_reports_the_first_failing_section() {
    let (mut state, validators) = three_steps();
    state.set_field("one", "name", json!("x"));
    let err = validate_all(&state, &validators).unwrap_err();
    assert_eq!(err.section, "two");
}

#[test]
fn status_reflects_cursor_and_validity() {
    let flow = BuiltinFlow::Seller.load().unwrap();
    let state = FormState::from_flow(&flow);
    let validators = ValidatorSet::from_flow(&flow).unwrap();
    let status = section_status(&state, &validators);
    assert_eq!(status.len(), 4);
    assert!(status[0].active && status[0].reachable && !status[0].valid);
    assert!(!status[1].reachable);
}

#[derive(Debug, Clone)]
enum Step {
    Next,
    Back,
    Jump(usize),
    Fill(usize),
    Clear(usize),
}

fn any_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Next),
        Just(Step::Back),
        (0..4usize).prop_map(Step::Jump),
        (0..3usize).prop_map(Step::Fill),
        (0..3usize).prop_map(Step::Clear),
    ]
}

proptest! {
    #[test]
    fn furthest_step_only_grows(steps in proptest::collection::vec(any_step(), 0..40)) {
        let (mut state, validators) = three_steps();
        let ids = ["one", "two", "three"];
        let mut furthest = state.furthest_step();
        for step in steps {
            let active = state.active_index();
            match step {
                Step::Next => {
                    if Navigator::new(&mut state, &validators).next().is_err() {
                        prop_assert_eq!(state.active_index(), active);
                    }
                }
                Step::Back => {
                    Navigator::new(&mut state, &validators).back();
                }
                Step::Jump(index) => {
                    let outcome = Navigator::new(&mut state, &validators).jump_to_index(index);
                    if index > furthest {
                        prop_assert_eq!(outcome, NavOutcome::Unchanged);
                        prop_assert_eq!(state.active_index(), active);
                    }
                }
                Step::Fill(index) => state.set_field(ids[index], "name", json!("x")),
                Step::Clear(index) => {
                    state.clear_field(ids[index], &["name"]);
                }
            }
            prop_assert!(state.furthest_step() >= furthest);
            prop_assert!(state.active_index() <= state.furthest_step());
            furthest = state.furthest_step();
        }
    }
}
