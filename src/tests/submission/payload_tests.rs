use serde_json::json;

use crate::{
    flows::BuiltinFlow,
    form::FormState,
    submission::{build_payload, to_snake_case},
};

#[test]
fn camel_case_names_become_snake_case() {
    assert_eq!(to_snake_case("fullName"), "full_name");
    assert_eq!(to_snake_case("avgPriceMin"), "avg_price_min");
    assert_eq!(to_snake_case("GSTNumber"), "gst_number");
    assert_eq!(to_snake_case("price-range"), "price_range");
    assert_eq!(to_snake_case("line1"), "line1");
}

#[test]
fn flat_payload_merges_sections() {
    let flow = BuiltinFlow::Seller.load().unwrap();
    let mut state = FormState::from_flow(&flow);
    state.set_field("basicInformation", "fullName", json!("Asha Rao"));
    state.set_field("basicInformation", "designation", json!(""));
    state.set_field("brand", "name", json!("Rao Couture"));
    state.set_field("brand", "gstNumber", json!("27ABCDE1234F1Z5"));
    state.set_field_at("brand", &["address", "city"], json!("Pune"));
    state.set_field("price", "avgPriceMin", json!(0));

    let payload = build_payload(&flow, state.values());
    assert_eq!(
        payload,
        json!({
            "full_name": "Asha Rao",
            "brand_name": "Rao Couture",
            "gstin": "27ABCDE1234F1Z5",
            "city": "Pune",
            "avg_price_min": 0,
            "user_type": "seller"
        })
    );
}

#[test]
fn nested_payload_groups_by_section() {
    let flow = BuiltinFlow::Influencer.load().unwrap();
    let mut state = FormState::from_flow(&flow);
    state.set_field("basicInformation", "fullName", json!("Meera"));
    state.set_field("commissionProgram", "payoutMethod", json!("Bank transfer"));
    state.set_field_at(
        "commissionProgram",
        &["bankAccount", "ifsc"],
        json!("HDFC0001234"),
    );

    let payload = build_payload(&flow, state.values());
    assert_eq!(payload["profile"], json!({"full_name": "Meera"}));
    assert_eq!(
        payload["commission"],
        json!({"payout_method": "Bank transfer", "bank_account": {"ifsc": "HDFC0001234"}})
    );
    assert!(payload.get("socials").is_none());
}

#[test]
fn undeclared_fields_are_left_out() {
    let flow = BuiltinFlow::Stylist.load().unwrap();
    let mut state = FormState::from_flow(&flow);
    state.set_field("basicInformation", "nickname", json!("Mo"));
    state.set_field("rogue", "anything", json!(true));
    let payload = build_payload(&flow, state.values());
    assert!(payload.get("nickname").is_none());
    assert!(payload.get("anything").is_none());
    // Boolean defaults are real answers and are sent.
    assert_eq!(payload["online_sessions"], json!(true));
    assert_eq!(payload["user_type"], json!("stylist"));
}
