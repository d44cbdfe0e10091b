//! Declared JSON response schemas for advisory requests.
//!
//! Every gateway call ships a natural-language instruction plus one of these
//! schemas; the provider must answer with a single JSON document matching it.
//! Node constructors cover the contract's types: object (with required field
//! lists), array, string, number, boolean, and string-enum, in the
//! provider's uppercase `"type"` dialect.

use serde_json::{json, Map, Value};

pub fn string() -> Value {
    json!({ "type": "STRING" })
}

pub fn number() -> Value {
    json!({ "type": "NUMBER" })
}

pub fn boolean() -> Value {
    json!({ "type": "BOOLEAN" })
}

/// A string constrained to a fixed set of values.
pub fn enumeration(values: &[&str]) -> Value {
    json!({ "type": "STRING", "enum": values })
}

pub fn array(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

pub fn object(properties: &[(&str, Value)], required: &[&str]) -> Value {
    let props: Map<String, Value> = properties
        .iter()
        .map(|(key, node)| ((*key).to_string(), node.clone()))
        .collect();
    json!({ "type": "OBJECT", "properties": props, "required": required })
}
