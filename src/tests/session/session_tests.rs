use std::cell::RefCell;

use serde_json::{Value, json};

use crate::{
    draft::{DraftStorage, DraftStore, FileStorage},
    flows::BuiltinFlow,
    session::OnboardingSession,
    submission::{SubmissionError, SubmitReceipt},
    wizard::NavOutcome,
};

use super::super::{
    fill_seller_basics, fill_seller_brand, fill_seller_media, fill_seller_price, session_for,
};

fn accepting(
    calls: &RefCell<Vec<(String, Value)>>,
) -> impl Fn(&str, &Value) -> Result<SubmitReceipt, SubmissionError> + '_ {
    move |endpoint: &str, payload: &Value| {
        calls
            .borrow_mut()
            .push((endpoint.to_string(), payload.clone()));
        Ok(SubmitReceipt {
            status: 201,
            body: Some(json!({"id": 42})),
        })
    }
}

#[test]
fn empty_first_section_blocks_progress() {
    let mut session = session_for(BuiltinFlow::Seller);
    let err = session.next().unwrap_err();
    assert_eq!(err.section, "basicInformation");
    assert!(err.reason().starts_with("Please fill in all mandatory fields"));
    assert_eq!(session.active_section(), "basicInformation");
}

#[test]
fn price_range_must_be_ordered_before_moving_on() {
    let mut session = session_for(BuiltinFlow::Seller);
    fill_seller_basics(&mut session);
    fill_seller_brand(&mut session);
    session.next().unwrap();
    session.next().unwrap();
    session.set_field("price", "avgPriceMin", json!(5000));
    session.set_field("price", "avgPriceMax", json!(1000));
    session.set_field("price", "categories", json!(["Saree"]));

    let err = session.next().unwrap_err();
    assert_eq!(
        err.reason(),
        "Minimum price cannot be greater than maximum price"
    );
    assert_eq!(session.active_section(), "price");
}

#[test]
fn text_input_is_coerced_to_the_field_kind() {
    let mut session = session_for(BuiltinFlow::Seller);
    session
        .set_input("price", &["avgPriceMin"], "1500")
        .unwrap();
    session
        .set_input("brand", &["address", "city"], "Pune")
        .unwrap();
    assert_eq!(session.section_data("price").unwrap()["avgPriceMin"], json!(1500));
    assert_eq!(
        session.state().field_value("brand", &["address", "city"]),
        Some(&json!("Pune"))
    );

    session.set_input("price", &["avgPriceMin"], "  ").unwrap();
    assert!(session.section_data("price").unwrap().get("avgPriceMin").is_none());

    let err = session.set_input("price", &["discount"], "5").unwrap_err();
    assert_eq!(err.message, "unknown field");
}

#[test]
fn drafts_resume_where_the_user_left_off() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        let flow = BuiltinFlow::Seller.load().unwrap();
        let drafts = DraftStore::new("seller", FileStorage::new(dir.path()));
        OnboardingSession::with_drafts(flow, drafts).unwrap()
    };

    let mut first = open();
    fill_seller_basics(&mut first);
    first.next().unwrap();
    first.set_field("brand", "name", json!("Rao Couture"));
    let id = first.save_draft().unwrap();
    assert!(!first.state().is_dirty());

    let mut second = open();
    assert!(second.resume_active().unwrap());
    assert_eq!(second.draft_id(), Some(id.as_str()));
    assert_eq!(second.active_section(), "brand");
    assert_eq!(second.section_data("brand").unwrap()["name"], json!("Rao Couture"));

    // Saving again keeps the id.
    assert_eq!(second.save_draft().unwrap(), id);
}

#[test]
fn loading_an_unknown_draft_starts_fresh() {
    let mut session = session_for(BuiltinFlow::Seller);
    fill_seller_basics(&mut session);
    assert!(!session.load_draft("seller-0").unwrap());
    assert_eq!(session.draft_id(), None);
    assert!(session.section_data("basicInformation").unwrap().is_empty());
}

#[test]
fn submission_sends_the_mapped_payload_once() {
    let mut session = session_for(BuiltinFlow::Seller);
    fill_seller_basics(&mut session);
    fill_seller_brand(&mut session);
    fill_seller_price(&mut session);
    fill_seller_media(&mut session);
    for _ in 0..3 {
        assert!(matches!(session.next().unwrap(), NavOutcome::Moved { .. }));
    }
    assert_eq!(session.next().unwrap(), NavOutcome::ReadyToSubmit);

    let calls = RefCell::new(Vec::new());
    let receipt = session.submit(&accepting(&calls)).unwrap();
    assert_eq!(receipt.status, 201);
    {
        let calls = calls.borrow();
        let (endpoint, payload) = &calls[0];
        assert_eq!(endpoint, "/stores/onboarding");
        assert_eq!(payload["full_name"], json!("Asha Rao"));
        assert_eq!(payload["brand_name"], json!("Rao Couture"));
        assert_eq!(payload["pincode"], json!("411001"));
        assert_eq!(payload["categories"], json!(["Lehenga", "Saree"]));
        assert_eq!(payload["user_type"], json!("seller"));
    }

    assert!(session.state().is_submitted());
    let again = session.submit(&accepting(&calls)).unwrap_err();
    assert!(matches!(again, SubmissionError::AlreadySubmitted));
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn submission_is_refused_while_a_section_is_invalid() {
    let mut session = session_for(BuiltinFlow::Seller);
    fill_seller_basics(&mut session);
    let calls = RefCell::new(Vec::new());
    let err = session.submit(&accepting(&calls)).unwrap_err();
    match err {
        SubmissionError::Invalid(err) => assert_eq!(err.section, "brand"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(calls.borrow().is_empty());
    assert!(!session.state().is_submitted());
}

#[test]
fn failed_submission_keeps_the_values() {
    let mut session = session_for(BuiltinFlow::Seller);
    fill_seller_basics(&mut session);
    fill_seller_brand(&mut session);
    fill_seller_price(&mut session);
    fill_seller_media(&mut session);
    let rejecting = |_: &str, _: &Value| -> Result<SubmitReceipt, SubmissionError> {
        Err(SubmissionError::Rejected {
            status: 500,
            body: String::new(),
        })
    };
    assert!(session.submit(&rejecting).unwrap_err().is_rejection());
    assert!(!session.state().is_submitted());
    assert_eq!(
        session.section_data("basicInformation").unwrap()["fullName"],
        json!("Asha Rao")
    );
}

#[test]
fn clearing_the_draft_resets_but_stays_submitted() {
    let mut session = session_for(BuiltinFlow::Seller);
    fill_seller_basics(&mut session);
    fill_seller_brand(&mut session);
    fill_seller_price(&mut session);
    fill_seller_media(&mut session);
    session.save_draft().unwrap();
    let ok = |_: &str, _: &Value| -> Result<SubmitReceipt, SubmissionError> {
        Ok(SubmitReceipt::local())
    };
    session.submit(&ok).unwrap();
    session.clear_draft().unwrap();

    assert_eq!(session.draft_id(), None);
    assert!(session.active_draft().unwrap().is_none());
    assert!(session.state().is_submitted());
    assert!(session.section_data("brand").unwrap().is_empty());
}

fn seller_in(dir: &std::path::Path) -> OnboardingSession {
    let flow = BuiltinFlow::Seller.load().unwrap();
    OnboardingSession::with_drafts(flow, DraftStore::new("seller", FileStorage::new(dir))).unwrap()
}

#[test]
fn cleared_drafts_cannot_be_loaded_again() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = seller_in(dir.path());
    fill_seller_basics(&mut session);
    let id = session.save_draft().unwrap();

    assert!(session.clear_draft().unwrap());
    assert!(!session.load_draft(&id).unwrap());
    assert!(session.section_data("basicInformation").unwrap().is_empty());
}

#[test]
fn a_fresh_session_clears_the_flows_active_draft() {
    let dir = tempfile::tempdir().unwrap();
    let mut first = seller_in(dir.path());
    fill_seller_basics(&mut first);
    let id = first.save_draft().unwrap();

    let mut fresh = seller_in(dir.path());
    assert_eq!(fresh.draft_id(), None);
    assert!(fresh.clear_draft().unwrap());

    let mut later = seller_in(dir.path());
    assert!(!later.resume_active().unwrap());
    assert!(!later.load_draft(&id).unwrap());
    assert!(!later.clear_draft().unwrap());
}

#[test]
fn an_unreadable_draft_can_be_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::new(dir.path());
    storage.set("draft-active:seller", "seller-1").unwrap();
    storage.set("draft:seller-1", "{not json").unwrap();

    let mut session = seller_in(dir.path());
    let err = session.resume_active().unwrap_err();
    assert!(err.is_unreadable());
    assert!(session.clear_draft().unwrap());

    let mut reopened = seller_in(dir.path());
    assert!(!reopened.resume_active().unwrap());
    fill_seller_basics(&mut reopened);
    assert!(reopened.save_draft().is_ok());
}

#[test]
fn zero_referrals_are_a_valid_answer() {
    let mut session = session_for(BuiltinFlow::Influencer);
    session.set_field("commissionProgram", "avgMonthlyReferrals", json!(0));
    session.set_field("commissionProgram", "payoutMethod", json!("UPI"));
    session.set_field("commissionProgram", "upiId", json!("meera@okaxis"));
    let err = session.validate_all().unwrap_err();
    assert_eq!(err.section, "basicInformation");
    assert!(session
        .validators()
        .validate(
            "commissionProgram",
            session.section_data("commissionProgram")
        )
        .is_ok());
}
