//! JSON key normalization
//!
//! Field names from the API are mapped to a canonical identifier form:
//! trimmed, ASCII-lowercased, with every character outside `[a-z0-9_]`
//! replaced by `_`. The transform consumes its input and builds a new tree;
//! mappings nested in sequences are normalized too.

use serde_json::Value;

/// Normalize every key of every mapping in `value`
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (normalize_key(&key), normalize_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        scalar => scalar,
    }
}

/// Canonical form of a single key
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("domain"), "domain");
        assert_eq!(normalize_key("MasterIP"), "masterip");
        assert_eq!(normalize_key(" Anycast-Nodes "), "anycast_nodes");
    }

    #[test]
    fn test_nested_objects_and_arrays() {
        let raw = json!({
            "Domains": [
                {"Domain": "example.com", "Type": "slave"},
                [{"Inner-Key": 1}]
            ],
            "Responses": {"Masters": [], "AnycastNodes": null},
            "Name": "Keep Value Case"
        });

        assert_eq!(
            normalize_keys(raw),
            json!({
                "domains": [
                    {"domain": "example.com", "type": "slave"},
                    [{"inner_key": 1}]
                ],
                "responses": {"masters": [], "anycastnodes": null},
                "name": "Keep Value Case"
            })
        );
    }

    #[test]
    fn test_scalars_untouched() {
        assert_eq!(normalize_keys(json!("Mixed")), json!("Mixed"));
        assert_eq!(normalize_keys(json!(48)), json!(48));
    }
}
