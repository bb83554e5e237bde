//! Integration tests for Value and attribute maps

use stratus_foundation::{AttrMap, LtVec, Type, Value, attrs, merge_maps};

// =============================================================================
// Conversions
// =============================================================================

#[test]
fn conversions_pick_the_obvious_variant() {
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(7_i32), Value::Int(7));
    assert_eq!(Value::from(1.5), Value::Float(1.5));
    assert_eq!(Value::from("a").as_str(), Some("a"));
    assert_eq!(Value::from(None::<i64>), Value::Nil);
    assert_eq!(Value::from(vec![1, 2]).as_list().map(LtVec::len), Some(2));
}

#[test]
fn value_types() {
    assert_eq!(Value::Nil.value_type(), Type::Nil);
    assert_eq!(Value::from("x").value_type(), Type::String);
    assert_eq!(Value::from(attrs! { "a" => 1 }).value_type(), Type::map(Type::Any));
}

#[test]
fn numbers_widen() {
    assert_eq!(Value::Int(3).as_number(), Some(3.0));
    assert_eq!(Value::Float(2.5).as_number(), Some(2.5));
    assert_eq!(Value::from("3").as_number(), None);
}

// =============================================================================
// Merging
// =============================================================================

#[test]
fn merge_is_deep_and_overlay_wins() {
    let base = attrs! {
        "instance_type" => "t3.micro",
        "database" => attrs! { "multi_az" => false, "instance_class" => "db.t3.micro" },
    };
    let overlay = attrs! {
        "database" => attrs! { "multi_az" => true },
        "enable_cdn" => true,
    };
    let merged = merge_maps(&base, &overlay);

    let database = merged.get("database").and_then(Value::as_map).unwrap();
    assert_eq!(database.get("multi_az"), Some(&Value::Bool(true)));
    assert_eq!(database.get("instance_class"), Some(&Value::from("db.t3.micro")));
    assert_eq!(merged.get("instance_type"), Some(&Value::from("t3.micro")));
    assert_eq!(merged.get("enable_cdn"), Some(&Value::Bool(true)));
}

#[test]
fn merge_leaves_inputs_untouched() {
    let base = attrs! { "a" => 1 };
    let merged = merge_maps(&base, &attrs! { "a" => 2 });
    assert_eq!(base.get("a"), Some(&Value::Int(1)));
    assert_eq!(merged.get("a"), Some(&Value::Int(2)));
}

#[test]
fn non_map_overlay_replaces() {
    let merged = merge_maps(
        &attrs! { "database" => attrs! { "multi_az" => true } },
        &attrs! { "database" => "none" },
    );
    assert_eq!(merged.get("database"), Some(&Value::from("none")));
}

#[test]
fn attr_maps_iterate_in_key_order() {
    let map: AttrMap = attrs! { "zeta" => 1, "alpha" => 2, "mid" => 3 };
    let keys: Vec<&str> = map.keys().map(|k| &**k).collect();
    assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
}
