use serde_json::json;

use super::*;

#[test]
fn top_level_date_is_ignored() {
    let a = json!({"date": "2025-02-01T00:00+09:00", "item_equipment": [{"item_name": "Cap"}]});
    let b = json!({"date": "2025-02-02T00:00+09:00", "item_equipment": [{"item_name": "Cap"}]});
    assert_eq!(fingerprint_equipment(&a), fingerprint_equipment(&b));
}

#[test]
fn nested_date_fields_still_count() {
    let a = json!({"item_equipment": [{"item_name": "Cap", "date": "2025-01-01"}]});
    let b = json!({"item_equipment": [{"item_name": "Cap", "date": "2025-01-02"}]});
    assert_ne!(fingerprint_equipment(&a), fingerprint_equipment(&b));
}

#[test]
fn key_order_does_not_matter_but_array_order_does() {
    let a: serde_json::Value = serde_json::from_str(r#"{"x": 1, "y": [1, 2]}"#).unwrap();
    let b: serde_json::Value = serde_json::from_str(r#"{"y": [1, 2], "x": 1}"#).unwrap();
    let c: serde_json::Value = serde_json::from_str(r#"{"y": [2, 1], "x": 1}"#).unwrap();
    assert_eq!(fingerprint_equipment(&a), fingerprint_equipment(&b));
    assert_ne!(fingerprint_equipment(&a), fingerprint_equipment(&c));
}

#[test]
fn value_kinds_are_distinguished() {
    assert_ne!(
        fingerprint_equipment(&json!({"v": "1"})),
        fingerprint_equipment(&json!({"v": 1}))
    );
    assert_ne!(
        fingerprint_equipment(&json!({"v": null})),
        fingerprint_equipment(&json!({"v": false}))
    );
}

#[test]
fn hex_is_32_digits_and_serializes_as_string() {
    let fp = fingerprint_equipment(&json!({"a": 1}));
    let hex = fp.to_hex();
    assert_eq!(hex.len(), 32);
    assert_eq!(hex, fp.to_string());
    assert_eq!(serde_json::to_value(fp).unwrap(), json!(hex));
}
