use std::cell::RefCell;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::{Value, json};

use crate::{
    app::{App, TuiOutcome, UiOptions},
    flows::BuiltinFlow,
    submission::{SubmissionError, SubmitReceipt},
};

use super::super::{
    fill_seller_basics, fill_seller_brand, fill_seller_media, fill_seller_price, session_for,
};

fn ctrl(ch: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
}

fn plain(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(app: &mut App<'_>, text: &str) {
    for ch in text.chars() {
        app.handle_key(plain(KeyCode::Char(ch)));
    }
}

fn local_ok(_: &str, _: &Value) -> Result<SubmitReceipt, SubmissionError> {
    Ok(SubmitReceipt::local())
}

#[test]
fn typing_fills_the_section_and_ctrl_n_advances() {
    let submitter = local_ok;
    let mut app = App::new(session_for(BuiltinFlow::Seller), &submitter, UiOptions::default());

    type_text(&mut app, "Asha Rao");
    app.handle_key(plain(KeyCode::Tab));
    type_text(&mut app, "asha@example.com");
    app.handle_key(plain(KeyCode::Tab));
    type_text(&mut app, "9876543210");
    assert_eq!(
        app.session().section_data("basicInformation").unwrap()["phone"],
        json!("9876543210")
    );

    app.handle_key(ctrl('n'));
    assert_eq!(app.session().active_section(), "brand");
    assert_eq!(app.rows()[0].label, "Brand name");
    assert!(app.status_message().starts_with("Brand"));
}

#[test]
fn blocked_next_marks_missing_rows() {
    let submitter = local_ok;
    let mut app = App::new(session_for(BuiltinFlow::Seller), &submitter, UiOptions::default());
    app.handle_key(ctrl('n'));
    assert!(app.status_message().starts_with("Please fill in all mandatory fields"));
    assert_eq!(app.rows()[0].error.as_deref(), Some("required"));
    assert_eq!(app.rows()[3].error, None);
    assert_eq!(app.session().active_section(), "basicInformation");
}

#[test]
fn bad_numbers_stay_inline_and_block_progress() {
    let mut session = session_for(BuiltinFlow::Seller);
    fill_seller_basics(&mut session);
    fill_seller_brand(&mut session);
    session.next().unwrap();
    session.next().unwrap();
    let submitter = local_ok;
    let mut app = App::new(session, &submitter, UiOptions::default());

    type_text(&mut app, "12k");
    assert!(app.rows()[0].error.as_deref().unwrap().contains("not a valid integer"));
    app.handle_key(ctrl('n'));
    assert_eq!(app.status_message(), "Fix the highlighted fields before continuing");
    assert_eq!(app.session().active_section(), "price");
}

#[test]
fn schema_errors_mark_only_the_offending_row() {
    let mut session = session_for(BuiltinFlow::Seller);
    fill_seller_basics(&mut session);
    fill_seller_brand(&mut session);
    session.next().unwrap();
    session.next().unwrap();
    session.set_field("price", "avgPriceMax", json!(15000));
    session.set_field("price", "categories", json!(["Saree"]));
    let submitter = local_ok;
    let mut app = App::new(session, &submitter, UiOptions::default());

    type_text(&mut app, "-5");
    app.handle_key(ctrl('n'));
    assert_eq!(app.session().active_section(), "price");
    assert!(app.rows()[0].error.is_some());
    assert_eq!(app.rows()[1].error, None);
}

#[test]
fn locked_steps_cannot_be_jumped_to() {
    let submitter = local_ok;
    let mut app = App::new(session_for(BuiltinFlow::Seller), &submitter, UiOptions::default());
    app.handle_key(KeyEvent::new(KeyCode::Char('3'), KeyModifiers::ALT));
    assert_eq!(app.session().active_section(), "basicInformation");
    assert_eq!(
        app.status_message(),
        "Finish the current section before jumping ahead"
    );
}

#[test]
fn saving_reports_the_draft_id() {
    let submitter = local_ok;
    let mut app = App::new(session_for(BuiltinFlow::Seller), &submitter, UiOptions::default());
    type_text(&mut app, "Asha");
    app.handle_key(ctrl('s'));
    let id = app.session().draft_id().unwrap().to_string();
    assert_eq!(app.status_message(), format!("Draft saved as {id}"));
    assert!(!app.session().state().is_dirty());
    assert_eq!(app.into_outcome(), TuiOutcome::Saved { draft_id: id });
}

#[test]
fn quitting_with_unsaved_changes_needs_confirmation() {
    let submitter = local_ok;
    let mut app = App::new(session_for(BuiltinFlow::Seller), &submitter, UiOptions::default());
    type_text(&mut app, "A");
    app.handle_key(ctrl('q'));
    assert!(!app.should_quit());
    app.handle_key(ctrl('q'));
    assert!(app.should_quit());
    assert_eq!(app.into_outcome(), TuiOutcome::Abandoned);
}

#[test]
fn discarding_needs_two_presses() {
    let submitter = local_ok;
    let mut app = App::new(session_for(BuiltinFlow::Seller), &submitter, UiOptions::default());
    type_text(&mut app, "Asha");
    app.handle_key(ctrl('s'));
    app.handle_key(ctrl('d'));
    assert!(app.session().draft_id().is_some());
    app.handle_key(ctrl('d'));
    assert!(app.session().draft_id().is_none());
    assert_eq!(app.rows()[0].buffer, "");
    assert_eq!(app.status_message(), "Draft discarded");
    assert_eq!(app.into_outcome(), TuiOutcome::Abandoned);
}

#[test]
fn last_step_submits_and_returns_the_payload() {
    let mut session = session_for(BuiltinFlow::Seller);
    fill_seller_basics(&mut session);
    fill_seller_brand(&mut session);
    fill_seller_price(&mut session);
    fill_seller_media(&mut session);
    for _ in 0..3 {
        session.next().unwrap();
    }
    let sent = RefCell::new(Vec::new());
    let submitter = |endpoint: &str, payload: &Value| -> Result<SubmitReceipt, SubmissionError> {
        sent.borrow_mut().push((endpoint.to_string(), payload.clone()));
        Ok(SubmitReceipt {
            status: 201,
            body: None,
        })
    };
    let mut app = App::new(session, &submitter, UiOptions::default());

    app.handle_key(ctrl('n'));
    assert!(app.is_submit_pending());
    // Input is ignored while the request is in flight.
    app.handle_key(ctrl('b'));
    assert_eq!(app.session().active_section(), "media");

    app.submit_now();
    assert_eq!(app.status_message(), "Submitted. Press Ctrl+Q to exit.");
    assert!(app.session().state().is_submitted());
    assert_eq!(sent.borrow().len(), 1);
    match app.into_outcome() {
        TuiOutcome::Submitted { receipt, payload } => {
            assert_eq!(receipt.status, 201);
            assert_eq!(payload["brand_name"], json!("Rao Couture"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn rejected_submission_keeps_the_form() {
    let mut session = session_for(BuiltinFlow::Seller);
    fill_seller_basics(&mut session);
    fill_seller_brand(&mut session);
    fill_seller_price(&mut session);
    fill_seller_media(&mut session);
    for _ in 0..3 {
        session.next().unwrap();
    }
    let submitter = |_: &str, _: &Value| -> Result<SubmitReceipt, SubmissionError> {
        Err(SubmissionError::Rejected {
            status: 400,
            body: "bad phone".to_string(),
        })
    };
    let mut app = App::new(session, &submitter, UiOptions::default());
    app.handle_key(ctrl('n'));
    app.submit_now();
    assert!(app.status_message().contains("400"));
    assert!(app.status_message().ends_with("press Ctrl+N to retry."));
    assert!(!app.session().state().is_submitted());
    assert_eq!(app.into_outcome(), TuiOutcome::Abandoned);
}
