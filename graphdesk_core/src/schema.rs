//! Input validation for tool arguments.
//!
//! Tool input schemas are the hand-written JSON Schema objects carried in
//! each [`rmcp::model::Tool`]. The dispatcher validates arguments against
//! the subset used by those schemas (type, integer bounds, string length,
//! enum, required, array items) and substitutes declared defaults before a
//! handler ever runs.

use serde_json::{Map, Value};

use crate::error::GraphError;

pub fn validate_arguments(
    schema: &Map<String, Value>,
    arguments: Option<Map<String, Value>>,
) -> Result<Map<String, Value>, GraphError> {
    let mut args = arguments.unwrap_or_default();

    let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) else {
        return Ok(args);
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    for (name, prop) in properties {
        match args.get(name) {
            Some(value) => check_value(name, prop, value)?,
            None => {
                if let Some(default) = prop.get("default") {
                    args.insert(name.clone(), default.clone());
                } else if required.contains(&name.as_str()) {
                    return Err(GraphError::InvalidParams(format!(
                        "missing required parameter '{name}'"
                    )));
                }
            }
        }
    }

    Ok(args)
}

fn check_value(name: &str, prop: &Value, value: &Value) -> Result<(), GraphError> {
    match prop.get("type").and_then(|t| t.as_str()) {
        Some("string") => {
            let s = value.as_str().ok_or_else(|| type_error(name, "a string"))?;
            check_string(name, prop, s)
        }
        Some("integer") => {
            let n = value
                .as_i64()
                .ok_or_else(|| type_error(name, "an integer"))?;
            check_integer(name, prop, n)
        }
        Some("number") => {
            value.as_f64().ok_or_else(|| type_error(name, "a number"))?;
            Ok(())
        }
        Some("boolean") => {
            value
                .as_bool()
                .ok_or_else(|| type_error(name, "a boolean"))?;
            Ok(())
        }
        Some("array") => {
            let items = value.as_array().ok_or_else(|| type_error(name, "an array"))?;
            check_array(name, prop, items)
        }
        Some("object") => {
            value
                .as_object()
                .ok_or_else(|| type_error(name, "an object"))?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn check_string(name: &str, prop: &Value, s: &str) -> Result<(), GraphError> {
    let len = s.chars().count() as u64;
    if let Some(min) = prop.get("minLength").and_then(|v| v.as_u64()) {
        if len < min {
            return Err(GraphError::InvalidParams(format!(
                "parameter '{name}' must be at least {min} characters"
            )));
        }
    }
    if let Some(max) = prop.get("maxLength").and_then(|v| v.as_u64()) {
        if len > max {
            return Err(GraphError::InvalidParams(format!(
                "parameter '{name}' must be at most {max} characters"
            )));
        }
    }
    if let Some(options) = prop.get("enum").and_then(|v| v.as_array()) {
        if !options.iter().any(|o| o.as_str() == Some(s)) {
            return Err(GraphError::InvalidParams(format!(
                "parameter '{name}' must be one of {options:?}"
            )));
        }
    }
    Ok(())
}

fn check_integer(name: &str, prop: &Value, n: i64) -> Result<(), GraphError> {
    if let Some(min) = prop.get("minimum").and_then(|v| v.as_i64()) {
        if n < min {
            return Err(GraphError::InvalidParams(format!(
                "parameter '{name}' must be >= {min}"
            )));
        }
    }
    if let Some(max) = prop.get("maximum").and_then(|v| v.as_i64()) {
        if n > max {
            return Err(GraphError::InvalidParams(format!(
                "parameter '{name}' must be <= {max}"
            )));
        }
    }
    Ok(())
}

fn check_array(name: &str, prop: &Value, items: &[Value]) -> Result<(), GraphError> {
    if let Some(min) = prop.get("minItems").and_then(|v| v.as_u64()) {
        if (items.len() as u64) < min {
            return Err(GraphError::InvalidParams(format!(
                "parameter '{name}' must have at least {min} item(s)"
            )));
        }
    }
    if prop
        .get("items")
        .and_then(|i| i.get("type"))
        .and_then(|t| t.as_str())
        == Some("string")
        && !items.iter().all(|item| item.is_string())
    {
        return Err(GraphError::InvalidParams(format!(
            "parameter '{name}' must be an array of strings"
        )));
    }
    Ok(())
}

fn type_error(name: &str, expected: &str) -> GraphError {
    GraphError::InvalidParams(format!("parameter '{name}' must be {expected}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> Map<String, Value> {
        value.as_object().expect("Schema object").clone()
    }

    fn count_schema() -> Map<String, Value> {
        schema(json!({
            "type": "object",
            "properties": {
                "count": { "type": "integer", "minimum": 1, "maximum": 50, "default": 10 }
            },
            "required": []
        }))
    }

    #[test]
    fn absent_count_gets_default() {
        let args = validate_arguments(&count_schema(), None).unwrap();
        assert_eq!(args["count"], json!(10));
    }

    #[test]
    fn count_below_minimum_is_rejected() {
        let raw = schema(json!({"count": 0}));
        let err = validate_arguments(&count_schema(), Some(raw)).unwrap_err();
        assert!(err.to_string().contains(">= 1"));
    }

    #[test]
    fn count_above_maximum_is_rejected() {
        let raw = schema(json!({"count": 51}));
        let err = validate_arguments(&count_schema(), Some(raw)).unwrap_err();
        assert!(err.to_string().contains("<= 50"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let raw = schema(json!({"count": "ten"}));
        let err = validate_arguments(&count_schema(), Some(raw)).unwrap_err();
        assert!(err.to_string().contains("must be an integer"));
    }

    #[test]
    fn short_query_is_rejected() {
        let s = schema(json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "minLength": 3 }
            },
            "required": ["query"]
        }));
        let err = validate_arguments(&s, Some(schema(json!({"query": "ab"})))).unwrap_err();
        assert!(err.to_string().contains("at least 3 characters"));

        validate_arguments(&s, Some(schema(json!({"query": "abc"})))).unwrap();
    }

    #[test]
    fn missing_required_parameter_is_rejected() {
        let s = schema(json!({
            "type": "object",
            "properties": {
                "message_id": { "type": "string" }
            },
            "required": ["message_id"]
        }));
        let err = validate_arguments(&s, None).unwrap_err();
        assert!(err.to_string().contains("message_id"));
    }

    #[test]
    fn string_array_items_are_checked() {
        let s = schema(json!({
            "type": "object",
            "properties": {
                "to": { "type": "array", "items": { "type": "string" }, "minItems": 1 }
            },
            "required": ["to"]
        }));
        let err = validate_arguments(&s, Some(schema(json!({"to": []})))).unwrap_err();
        assert!(err.to_string().contains("at least 1 item"));

        let err = validate_arguments(&s, Some(schema(json!({"to": [1, 2]})))).unwrap_err();
        assert!(err.to_string().contains("array of strings"));
    }

    #[test]
    fn enum_membership_is_checked() {
        let s = schema(json!({
            "type": "object",
            "properties": {
                "format": { "type": "string", "enum": ["concise", "detailed"], "default": "concise" }
            }
        }));
        let args = validate_arguments(&s, None).unwrap();
        assert_eq!(args["format"], json!("concise"));

        let err = validate_arguments(&s, Some(schema(json!({"format": "loud"})))).unwrap_err();
        assert!(matches!(err, GraphError::InvalidParams(_)));
    }
}
