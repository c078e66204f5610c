#![forbid(unsafe_code)]

use super::ai_error;
use cg_core::model::{CodeLink, RelationSpec};
use serde_json::{Map, Value};

pub(crate) fn require_string(args: &Map<String, Value>, key: &str) -> Result<String, Value> {
    let Some(v) = args.get(key).and_then(|v| v.as_str()) else {
        return Err(ai_error("INVALID_INPUT", &format!("{key} is required")));
    };
    Ok(v.to_string())
}

pub(crate) fn optional_string(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::String(v) => Ok(Some(v.to_string())),
        _ => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a string"),
        )),
    }
}

pub(crate) fn optional_usize(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<usize>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_u64().map(|v| v as usize).map(Some).ok_or_else(|| {
            ai_error(
                "INVALID_INPUT",
                &format!("{key} must be a non-negative integer"),
            )
        }),
        _ => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a non-negative integer"),
        )),
    }
}

/// Absent -> None (keep); null -> Some(empty) (delete); array -> Some(items).
pub(crate) fn optional_string_array(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<String>>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    let arr = match value {
        Value::Null => return Ok(Some(Vec::new())),
        Value::Array(arr) => arr,
        _ => {
            return Err(ai_error(
                "INVALID_INPUT",
                &format!("{key} must be an array of strings"),
            ));
        }
    };
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        let Some(s) = item.as_str() else {
            return Err(ai_error(
                "INVALID_INPUT",
                &format!("{key} items must be strings"),
            ));
        };
        out.push(s.to_string());
    }
    Ok(Some(out))
}

pub(crate) fn optional_relations(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<RelationSpec>>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(Some(Vec::new()));
    }
    serde_json::from_value::<Vec<RelationSpec>>(value.clone())
        .map(Some)
        .map_err(|err| {
            ai_error(
                "INVALID_INPUT",
                &format!("{key} must be an array of {{type, target}} objects: {err}"),
            )
        })
}

pub(crate) fn optional_code_links(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<CodeLink>>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(Some(Vec::new()));
    }
    serde_json::from_value::<Vec<CodeLink>>(value.clone())
        .map(Some)
        .map_err(|err| {
            ai_error(
                "INVALID_INPUT",
                &format!("{key} must be an array of {{kind, file, symbol}} objects: {err}"),
            )
        })
}

/// Absent -> None; null -> Some(None) (delete); anything else -> Some(Some(v)).
pub(crate) fn optional_nullable_value(
    args: &Map<String, Value>,
    key: &str,
) -> Option<Option<Value>> {
    match args.get(key) {
        None => None,
        Some(Value::Null) => Some(None),
        Some(v) => Some(Some(v.clone())),
    }
}
