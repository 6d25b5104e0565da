use serde_json::json;

use crate::{
    domain::{FieldSchema, FlowSchema},
    flows::BuiltinFlow,
    form::{coerce_input, value_to_string},
};

fn field(flow: &FlowSchema, section: &str, path: &[&str]) -> FieldSchema {
    flow.section(section)
        .and_then(|schema| schema.field_at(path))
        .cloned()
        .expect("field exists")
}

#[test]
fn blank_input_means_unset() {
    let flow = BuiltinFlow::Seller.load().unwrap();
    let name = field(&flow, "basicInformation", &["fullName"]);
    assert_eq!(coerce_input("   ", &name).unwrap(), None);
}

#[test]
fn integers_are_parsed_and_checked() {
    let flow = BuiltinFlow::Seller.load().unwrap();
    let min = field(&flow, "price", &["avgPriceMin"]);
    assert_eq!(coerce_input(" 2500 ", &min).unwrap(), Some(json!(2500)));
    let err = coerce_input("cheap", &min).unwrap_err();
    assert_eq!(err.pointer, "/price/avgPriceMin");
    assert!(err.message.contains("not a valid integer"));
}

#[test]
fn enum_values_match_case_insensitively() {
    let flow = BuiltinFlow::Seller.load().unwrap();
    let store_type = field(&flow, "brand", &["storeType"]);
    assert_eq!(
        coerce_input("boutique", &store_type).unwrap(),
        Some(json!("Boutique"))
    );
    assert!(coerce_input("kiosk", &store_type).is_err());
}

#[test]
fn comma_separated_lists_become_arrays() {
    let flow = BuiltinFlow::Seller.load().unwrap();
    let categories = field(&flow, "price", &["categories"]);
    assert_eq!(
        coerce_input("saree, Lehenga,, ", &categories).unwrap(),
        Some(json!(["Saree", "Lehenga"]))
    );
    assert_eq!(value_to_string(&json!(["Saree", "Lehenga"])), "Saree, Lehenga");
}

#[test]
fn booleans_accept_yes_and_no() {
    let flow = BuiltinFlow::Mua.load().unwrap();
    let travels = field(&flow, "services", &["travelsToVenue"]);
    assert_eq!(coerce_input("yes", &travels).unwrap(), Some(json!(true)));
    assert_eq!(coerce_input("N", &travels).unwrap(), Some(json!(false)));
    assert!(coerce_input("maybe", &travels).is_err());
}
