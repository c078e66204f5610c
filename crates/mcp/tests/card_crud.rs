#![forbid(unsafe_code)]

mod support;

use serde_json::json;
use support::*;

#[test]
fn create_writes_the_file_and_get_reads_it_back() {
    let mut server = Server::start_initialized("create_get");

    let result = server.call_tool_ok(
        "card_create",
        json!({ "slug": "hello", "summary": "Hi" }),
    );
    assert_eq!(
        result.pointer("/card/key").and_then(|v| v.as_str()),
        Some("hello")
    );
    assert_eq!(
        result.pointer("/card/status").and_then(|v| v.as_str()),
        Some("draft")
    );

    let path = server.cards_dir().join("hello.card.md");
    assert!(path.exists(), "card file must exist on disk");
    let text = std::fs::read_to_string(&path).expect("read card file");
    assert!(text.starts_with("---\n"));
    assert!(text.contains("key: hello"));
    assert!(text.contains("summary: Hi"));
    assert!(text.contains("status: draft"));

    let fetched = server.call_tool_ok("card_get", json!({ "key": "hello" }));
    assert_eq!(
        fetched.pointer("/card/summary").and_then(|v| v.as_str()),
        Some("Hi")
    );
}

#[test]
fn second_create_with_the_same_slug_fails() {
    let mut server = Server::start_initialized("dup_create");
    server.call_tool_ok("card_create", json!({ "slug": "dup", "summary": "one" }));
    let code = server.call_tool_err("card_create", json!({ "slug": "dup", "summary": "two" }));
    assert_eq!(code, "ALREADY_EXISTS");
}

#[test]
fn update_patches_and_deletes_fields() {
    let mut server = Server::start_initialized("update");
    server.call_tool_ok(
        "card_create",
        json!({
            "slug": "card",
            "summary": "Original",
            "keywords": ["alpha"],
            "tags": ["t"],
            "constraints": { "limit": 2 }
        }),
    );

    let result = server.call_tool_ok(
        "card_update",
        json!({ "key": "card", "summary": "Fresh", "keywords": null, "constraints": null }),
    );
    assert_eq!(
        result.pointer("/card/summary").and_then(|v| v.as_str()),
        Some("Fresh")
    );
    assert_eq!(
        result
            .pointer("/card/keywords")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(0)
    );
    assert!(result
        .pointer("/card/constraints")
        .is_some_and(|v| v.is_null()));
    // Unspecified tags survive.
    assert_eq!(
        result.pointer("/card/tags/0").and_then(|v| v.as_str()),
        Some("t")
    );
}

#[test]
fn update_status_is_a_typed_entry_point() {
    let mut server = Server::start_initialized("status");
    server.call_tool_ok("card_create", json!({ "slug": "s", "summary": "x" }));

    let result = server.call_tool_ok(
        "card_update_status",
        json!({ "key": "s", "status": "implementing" }),
    );
    assert_eq!(
        result.pointer("/card/status").and_then(|v| v.as_str()),
        Some("implementing")
    );

    let code = server.call_tool_err(
        "card_update_status",
        json!({ "key": "s", "status": "finished" }),
    );
    assert_eq!(code, "INVALID_INPUT");
}

#[test]
fn delete_removes_file_and_get_reports_not_found() {
    let mut server = Server::start_initialized("delete");
    server.call_tool_ok("card_create", json!({ "slug": "gone", "summary": "x" }));
    server.call_tool_ok("card_delete", json!({ "key": "gone" }));

    assert!(!server.cards_dir().join("gone.card.md").exists());
    let code = server.call_tool_err("card_get", json!({ "key": "gone" }));
    assert_eq!(code, "NOT_FOUND");

    let code = server.call_tool_err("card_delete", json!({ "key": "gone" }));
    assert_eq!(code, "NOT_FOUND");
}

#[test]
fn oversized_and_invalid_inputs_become_error_envelopes() {
    let mut server = Server::start_initialized("bad_input");

    let code = server.call_tool_err(
        "card_create",
        json!({ "slug": "big", "summary": "x".repeat(501) }),
    );
    assert_eq!(code, "VALIDATION");

    let code = server.call_tool_err(
        "card_create",
        json!({ "slug": "a//b", "summary": "x" }),
    );
    assert_eq!(code, "INVALID_KEY");

    let code = server.call_tool_err("card_create", json!({ "slug": "x" }));
    assert_eq!(code, "INVALID_INPUT");

    let code = server.call_tool_err("no_such_tool", json!({}));
    assert_eq!(code, "UNKNOWN_TOOL");
}

#[test]
fn list_and_search_reflect_index_state() {
    let mut server = Server::start_initialized("list_search");
    server.call_tool_ok(
        "card_create",
        json!({ "slug": "a", "summary": "Negotiates the handshake" }),
    );
    server.call_tool_ok("card_create", json!({ "slug": "b", "summary": "Other" }));
    server.call_tool_ok(
        "card_update_status",
        json!({ "key": "b", "status": "implemented" }),
    );

    let all = server.call_tool_ok("card_list", json!({}));
    assert_eq!(all.get("count").and_then(|v| v.as_u64()), Some(2));

    let implemented = server.call_tool_ok("card_list", json!({ "status": "implemented" }));
    assert_eq!(implemented.get("count").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(
        implemented.pointer("/cards/0/key").and_then(|v| v.as_str()),
        Some("b")
    );

    let found = server.call_tool_ok("card_search", json!({ "query": "handshake" }));
    assert_eq!(found.get("count").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(
        found.pointer("/cards/0/key").and_then(|v| v.as_str()),
        Some("a")
    );
}
