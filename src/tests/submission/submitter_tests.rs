use std::cell::RefCell;
use std::time::Duration;

use serde_json::{Value, json};

use crate::{
    io::{OutputDestination, OutputOptions},
    submission::{
        HttpSubmitter, OutputSubmitter, SubmissionError, SubmitReceipt, Submitter,
    },
};

#[test]
fn endpoints_join_the_base_url_once() {
    let http = HttpSubmitter::new("https://api.attirelly.com/api/", Duration::from_secs(5)).unwrap();
    assert_eq!(
        http.url_for("/stores/onboarding"),
        "https://api.attirelly.com/api/stores/onboarding"
    );
    assert_eq!(http.url_for(""), "https://api.attirelly.com/api");
    assert_eq!(
        http.url_for("http://localhost:9000/hook"),
        "http://localhost:9000/hook"
    );
}

#[test]
fn output_submitter_writes_the_payload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payload.json");
    let options = OutputOptions::default()
        .with_pretty(false)
        .with_destinations(vec![OutputDestination::file(&path)]);
    let receipt = OutputSubmitter::new(options)
        .submit("/stores/onboarding", &json!({"full_name": "Asha"}))
        .unwrap();
    assert_eq!(receipt, SubmitReceipt::local());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap().trim(),
        r#"{"full_name":"Asha"}"#
    );
}

#[test]
fn closures_act_as_submitters() {
    let seen = RefCell::new(Vec::new());
    let submitter = |endpoint: &str, payload: &Value| -> Result<SubmitReceipt, SubmissionError> {
        seen.borrow_mut().push((endpoint.to_string(), payload.clone()));
        Err(SubmissionError::Rejected {
            status: 422,
            body: "{\"detail\":\"duplicate email\"}".to_string(),
        })
    };
    let err = submitter.submit("/mua/onboarding", &json!({})).unwrap_err();
    assert!(err.is_rejection());
    assert!(err.to_string().contains("422"));
    assert_eq!(seen.borrow().len(), 1);
}
