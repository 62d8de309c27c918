use std::collections::BTreeMap;

use continuity_core::Node;
use continuity_store::PORTRAIT_CATEGORIES;
use serde_json::{Map, Value};
use tracing::warn;

/// Merge a salvaged LLM JSON object into the current portrait.
///
/// Categories are allow-list gated (`PORTRAIT_CATEGORIES`): anything else
/// is dropped, both when copying the old portrait forward and when reading
/// the new one. Within a kept category, fields are replaced one at a time —
/// a category absent from `new_json` survives untouched; a field present in
/// `new_json` overwrites the old value outright (no concatenation).
pub fn merge_portrait(old: &Node, new_json: &Map<String, Value>) -> Node {
    let mut merged: BTreeMap<String, Node> = BTreeMap::new();

    if let Some(old_obj) = old.as_object() {
        for (category, value) in old_obj {
            if PORTRAIT_CATEGORIES.contains(&category.as_str()) {
                merged.insert(category.clone(), value.clone());
            } else {
                warn!(category = %category, "dropping non-allow-listed category from existing portrait");
            }
        }
    }

    for (category, value) in new_json {
        if !PORTRAIT_CATEGORIES.contains(&category.as_str()) {
            warn!(category = %category, "dropping non-allow-listed category from merge input");
            continue;
        }
        let Some(fields) = value.as_object() else {
            warn!(category = %category, "category value is not an object, skipping");
            continue;
        };

        let entry = merged
            .entry(category.clone())
            .or_insert_with(|| Node::Object(BTreeMap::new()));
        let Node::Object(entry_map) = entry else {
            continue;
        };

        for (field, val) in fields {
            match val.as_str() {
                Some(s) => {
                    entry_map.insert(field.clone(), Node::String(s.to_string()));
                }
                None => warn!(category = %category, field = %field, "field value is not a string, skipping"),
            }
        }
    }

    Node::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replaces_field_values_and_preserves_untouched_categories() {
        let old = Node::from(json!({
            "basic_information": {"age": "20", "city": "Berlin"},
            "interest_topics": {"hobby": "chess"}
        }));
        let new_json = json!({
            "basic_information": {"age": "21"}
        });
        let merged = merge_portrait(&old, new_json.as_object().unwrap());

        let obj = merged.as_object().unwrap();
        let basic = obj["basic_information"].as_object().unwrap();
        assert_eq!(basic["age"].as_str(), Some("21"));
        assert_eq!(basic["city"].as_str(), Some("Berlin"));
        let interests = obj["interest_topics"].as_object().unwrap();
        assert_eq!(interests["hobby"].as_str(), Some("chess"));
    }

    #[test]
    fn drops_non_allow_listed_categories_from_both_sides() {
        let old = Node::from(json!({"secret_category": {"x": "y"}}));
        let new_json = json!({"another_bad_one": {"x": "y"}, "basic_information": {"age": "5"}});
        let merged = merge_portrait(&old, new_json.as_object().unwrap());
        let obj = merged.as_object().unwrap();
        assert!(!obj.contains_key("secret_category"));
        assert!(!obj.contains_key("another_bad_one"));
        assert!(obj.contains_key("basic_information"));
    }

    #[test]
    fn non_string_field_values_are_skipped() {
        let old = Node::Object(BTreeMap::new());
        let new_json = json!({"basic_information": {"age": 20}});
        let merged = merge_portrait(&old, new_json.as_object().unwrap());
        let obj = merged.as_object().unwrap();
        let basic = obj.get("basic_information");
        assert!(basic.map(|b| b.is_empty_collection()).unwrap_or(true));
    }
}
