use modelmgmt_types::{is_empty_value, value_kind};
use proptest::prelude::*;
use serde_json::json;

#[test]
fn null_and_blank_values_are_empty() {
    assert!(is_empty_value(&json!(null)));
    assert!(is_empty_value(&json!("")));
    assert!(is_empty_value(&json!("   ")));
    assert!(is_empty_value(&json!([])));
    assert!(is_empty_value(&json!({})));
}

#[test]
fn scalars_are_never_empty() {
    assert!(!is_empty_value(&json!(false)));
    assert!(!is_empty_value(&json!(0)));
    assert!(!is_empty_value(&json!("systemRelations")));
    assert!(!is_empty_value(&json!(["a"])));
    assert!(!is_empty_value(&json!({"en": "Title"})));
}

#[test]
fn value_kind_names() {
    assert_eq!(value_kind(&json!(null)), "null");
    assert_eq!(value_kind(&json!(true)), "boolean");
    assert_eq!(value_kind(&json!(1.5)), "number");
    assert_eq!(value_kind(&json!("x")), "string");
    assert_eq!(value_kind(&json!([1])), "array");
    assert_eq!(value_kind(&json!({"a": 1})), "object");
}

proptest! {
    #[test]
    fn non_blank_strings_are_not_empty(s in "[a-zA-Z0-9]{1,20}") {
        prop_assert!(!is_empty_value(&json!(s)));
    }
}
