use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no json document found in content")]
    NotFound,
    #[error("function '{0}' not found in the available tool signatures")]
    UnknownFunction(String),
    #[error("schema validation failed: {0}")]
    Schema(String),
}

/// Validate assistant content as a JSON document against a schema.
/// Validation is a pure function of its inputs; the same content and schema
/// always yield the same outcome.
pub fn validate_json_data(content: &str, schema: &Value) -> Result<Value, ValidationError> {
    let value = extract_json(content).ok_or(ValidationError::NotFound)?;
    check_value(&value, schema, "$").map_err(ValidationError::Schema)?;
    Ok(value)
}

/// Validate a tool call's arguments against the signature set the registry
/// advertised. The signature set uses the OpenAI function layout, so the
/// parameter schema lives under `function.parameters`.
pub fn validate_function_call(
    name: &str,
    arguments: &Value,
    signatures: &[Value],
) -> Result<(), ValidationError> {
    let signature = signatures
        .iter()
        .find(|candidate| {
            candidate
                .pointer("/function/name")
                .and_then(Value::as_str)
                .map(|declared| declared.eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
        .ok_or_else(|| ValidationError::UnknownFunction(name.to_string()))?;

    match signature.pointer("/function/parameters") {
        Some(parameters) => {
            check_value(arguments, parameters, "$.arguments").map_err(ValidationError::Schema)
        }
        None => Ok(()),
    }
}

/// Pull a JSON value out of free-form assistant text: a direct parse first,
/// then a fenced code block, then the outermost brace span.
pub fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if trimmed.starts_with("```") {
        let stripped = trimmed.trim_start_matches("```json");
        let stripped = stripped.trim_start_matches("```JSON");
        let stripped = stripped.trim_start_matches("```");
        if let Some(end) = stripped.rfind("```") {
            let slice = &stripped[..end];
            if let Ok(value) = serde_json::from_str::<Value>(slice.trim()) {
                return Some(value);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            let candidate = &trimmed[start..=end];
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                return Some(value);
            }
        }
    }

    None
}

/// Check a value against the JSON-schema subset the loop relies on:
/// `type` (string or list), `enum`, `properties`, `required`, `items`,
/// and `anyOf`. Unknown keywords are ignored.
fn check_value(value: &Value, schema: &Value, path: &str) -> Result<(), String> {
    if let Some(branches) = schema.get("anyOf").and_then(Value::as_array) {
        let matched = branches
            .iter()
            .any(|branch| check_value(value, branch, path).is_ok());
        if !matched {
            return Err(format!("{path}: value matches no anyOf branch"));
        }
    }

    if let Some(expected) = schema.get("type") {
        let matched = match expected {
            Value::String(name) => type_matches(value, name),
            Value::Array(names) => names
                .iter()
                .filter_map(Value::as_str)
                .any(|name| type_matches(value, name)),
            _ => true,
        };
        if !matched {
            return Err(format!(
                "{path}: expected type {expected}, got {}",
                type_name(value)
            ));
        }
    }

    if let Some(options) = schema.get("enum").and_then(Value::as_array) {
        if !options.contains(value) {
            return Err(format!("{path}: value {value} is not one of the allowed values"));
        }
    }

    if let Some(object) = value.as_object() {
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for key in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(key) {
                    return Err(format!("{path}: missing required field '{key}'"));
                }
            }
        }
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (key, child) in properties {
                if let Some(field) = object.get(key) {
                    check_value(field, child, &format!("{path}.{key}"))?;
                }
            }
        }
    }

    if let Some(array) = value.as_array() {
        if let Some(items) = schema.get("items") {
            for (index, item) in array.iter().enumerate() {
                check_value(item, items, &format!("{path}[{index}]"))?;
            }
        }
    }

    Ok(())
}

fn type_matches(value: &Value, expected: &str) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
