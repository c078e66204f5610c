#![forbid(unsafe_code)]

pub(crate) mod args;
pub(crate) mod cardfile;
mod session_log;

pub(crate) use session_log::SessionLog;

use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub(crate) fn ai_ok(intent: &str, result: Value) -> Value {
    ai_ok_with(intent, result, Vec::new())
}

pub(crate) fn ai_ok_with(intent: &str, result: Value, warnings: Vec<String>) -> Value {
    json!({
        "success": true,
        "intent": intent,
        "result": result,
        "warnings": warnings,
        "suggestions": [],
        "context": {},
        "error": null,
        "timestamp": now_rfc3339(),
    })
}

pub(crate) fn ai_error(code: &str, message: &str) -> Value {
    json!({
        "success": false,
        "intent": "error",
        "result": {},
        "warnings": [],
        "suggestions": [],
        "context": {},
        "error": { "code": code, "message": message },
        "timestamp": now_rfc3339(),
    })
}

pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
