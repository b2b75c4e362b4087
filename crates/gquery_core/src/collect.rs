//! Response type collection.

use crate::typename::TYPENAME;
use indexmap::IndexSet;
use serde_json::Value;

/// Collects every distinct `__typename` value found anywhere in `response`.
///
/// Arrays are walked element-wise and objects key-wise. A `__typename` key
/// holding a string is recorded and not descended into; any other key is
/// descended into whatever it holds. Values come back in first-seen order.
pub fn collect_types_from_response(response: &Value) -> IndexSet<String> {
    let mut types = IndexSet::new();
    collect_types(response, &mut types);
    types
}

fn collect_types(value: &Value, types: &mut IndexSet<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_types(item, types);
            }
        }
        Value::Object(entries) => {
            for (key, value) in entries {
                match value {
                    Value::String(name) if key == TYPENAME => {
                        types.insert(name.clone());
                    }
                    _ => collect_types(value, types),
                }
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deduplicates_across_depths() {
        let response = json!({
            "viewer": {
                "__typename": "User",
                "posts": [
                    { "__typename": "Post", "author": { "__typename": "User" } },
                    { "__typename": "Post" }
                ]
            }
        });
        let types = collect_types_from_response(&response);
        assert_eq!(types.len(), 2);
        assert!(types.contains("User"));
        assert!(types.contains("Post"));
    }

    #[test]
    fn test_first_seen_order() {
        let response = json!([
            { "__typename": "B" },
            { "__typename": "A" },
            { "__typename": "B" }
        ]);
        let types: Vec<_> = collect_types_from_response(&response).into_iter().collect();
        assert_eq!(types, vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn test_walks_nested_arrays() {
        let response = json!({ "grid": [[[{ "__typename": "Cell" }]], []] });
        let types = collect_types_from_response(&response);
        assert!(types.contains("Cell"));
    }

    #[test]
    fn test_non_string_typename_is_descended() {
        let response = json!({ "__typename": { "__typename": "Inner" } });
        let types = collect_types_from_response(&response);
        assert_eq!(types.len(), 1);
        assert!(types.contains("Inner"));
    }

    #[test]
    fn test_ignores_typename_shaped_values() {
        let response = json!({ "name": "__typename", "tags": ["__typename"] });
        assert!(collect_types_from_response(&response).is_empty());
    }

    #[test]
    fn test_leaves() {
        assert!(collect_types_from_response(&json!(null)).is_empty());
        assert!(collect_types_from_response(&json!("User")).is_empty());
        assert!(collect_types_from_response(&json!(42)).is_empty());
    }

    #[test]
    fn test_keeps_response_order() {
        let response = json!({
            "zeta": { "__typename": "Zeta" },
            "alpha": { "__typename": "Alpha" },
            "mid": [{ "__typename": "Zeta" }, { "__typename": "Mid" }]
        });
        let types = collect_types_from_response(&response);
        assert_eq!(
            types.into_iter().collect::<Vec<_>>(),
            vec!["Zeta", "Alpha", "Mid"]
        );
    }
}
