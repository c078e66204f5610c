#![forbid(unsafe_code)]

use serde_json::{json, Value};

pub(super) fn tool_definitions() -> Vec<Value> {
    let mut tools = vec![
        json!({
            "name": "card_create",
            "description": "Create a design card: writes the card file and indexes it in one consistent step.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "slug": { "type": "string", "description": "Card key, e.g. auth/login" },
                    "summary": { "type": "string" },
                    "status": status_schema(),
                    "body": { "type": "string" },
                    "tags": string_list_schema(),
                    "keywords": string_list_schema(),
                    "relations": relations_schema(),
                    "codeLinks": code_links_schema(),
                    "constraints": { "description": "Opaque structured payload stored verbatim" }
                },
                "required": ["slug", "summary"]
            }
        }),
        json!({
            "name": "card_get",
            "description": "Read a card from its file.",
            "inputSchema": key_only_schema()
        }),
        json!({
            "name": "card_update",
            "description": "Patch card fields. Omitted fields keep their value; null or an empty list deletes an optional field.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "key": { "type": "string" },
                    "summary": { "type": "string" },
                    "status": status_schema(),
                    "body": { "type": "string" },
                    "tags": nullable_string_list_schema(),
                    "keywords": nullable_string_list_schema(),
                    "relations": { "anyOf": [relations_schema(), { "type": "null" }] },
                    "codeLinks": { "anyOf": [code_links_schema(), { "type": "null" }] },
                    "constraints": { "description": "New payload, or null to delete" }
                },
                "required": ["key"]
            }
        }),
        json!({
            "name": "card_update_status",
            "description": "Set only the card status.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "key": { "type": "string" },
                    "status": status_schema()
                },
                "required": ["key", "status"]
            }
        }),
        json!({
            "name": "card_delete",
            "description": "Delete a card file and its index rows (relations, classification and code links cascade).",
            "inputSchema": key_only_schema()
        }),
        json!({
            "name": "card_rename",
            "description": "Rename a card, carrying its relations, classification and code links to the new key.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "key": { "type": "string" },
                    "newSlug": { "type": "string" }
                },
                "required": ["key", "newSlug"]
            }
        }),
        json!({
            "name": "card_list",
            "description": "List indexed cards, optionally filtered by status.",
            "inputSchema": {
                "type": "object",
                "properties": { "status": status_schema() },
                "required": []
            }
        }),
        json!({
            "name": "card_search",
            "description": "Full-text search over card keys, summaries and bodies.",
            "inputSchema": {
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }
        }),
        json!({
            "name": "card_sync_file",
            "description": "Sync one card file into the index (file wins).",
            "inputSchema": file_path_schema()
        }),
        json!({
            "name": "card_remove_file",
            "description": "Drop the index rows for an externally deleted card file.",
            "inputSchema": file_path_schema()
        }),
        json!({
            "name": "card_bulk_sync",
            "description": "Sync every *.card.md under a directory, collecting per-file failures.",
            "inputSchema": dir_schema()
        }),
        json!({
            "name": "card_validate",
            "description": "Read-only reconciliation report: stale index rows, orphan files, key mismatches.",
            "inputSchema": dir_schema()
        }),
        json!({
            "name": "card_export",
            "description": "Regenerate a card file from index state (index wins).",
            "inputSchema": key_only_schema()
        }),
        json!({
            "name": "card_context",
            "description": "A card with its upstream/downstream neighbors and resolved code links.",
            "inputSchema": key_only_schema()
        }),
        json!({
            "name": "card_graph",
            "description": "Breadth-first relation traversal from a card.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "key": { "type": "string" },
                    "maxDepth": { "type": "integer", "minimum": 0 },
                    "direction": { "type": "string", "enum": ["forward", "backward", "both"] }
                },
                "required": ["key"]
            }
        }),
        json!({
            "name": "card_links_resolve",
            "description": "Resolve a card's code links against the gildash symbol indexer.",
            "inputSchema": key_only_schema()
        }),
        json!({
            "name": "card_links_validate",
            "description": "Report broken code links: symbol-not-found or file-not-indexed.",
            "inputSchema": key_only_schema()
        }),
        json!({
            "name": "cards_by_symbol",
            "description": "Cards linking to a code symbol, optionally scoped to a file.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "symbol": { "type": "string" },
                    "file": { "type": "string" }
                },
                "required": ["symbol"]
            }
        }),
        json!({
            "name": "cards_affected",
            "description": "Cards whose code links touch any of the given files.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "files": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["files"]
            }
        }),
        json!({
            "name": "classification_prune",
            "description": "Remove keyword and tag names no card references anymore.",
            "inputSchema": { "type": "object", "properties": {}, "required": [] }
        }),
        json!({
            "name": "storage",
            "description": "Get the cards dir, storage dir and relation-type allow-list.",
            "inputSchema": { "type": "object", "properties": {}, "required": [] }
        }),
    ];
    tools.sort_by_key(|tool| {
        tool.get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    });
    tools
}

fn status_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["draft", "accepted", "implementing", "implemented", "deprecated"]
    })
}

fn string_list_schema() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn nullable_string_list_schema() -> Value {
    json!({
        "anyOf": [
            { "type": "array", "items": { "type": "string" } },
            { "type": "null" }
        ]
    })
}

fn relations_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "type": { "type": "string" },
                "target": { "type": "string" }
            },
            "required": ["type", "target"]
        }
    })
}

fn code_links_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "kind": { "type": "string" },
                "file": { "type": "string" },
                "symbol": { "type": "string" }
            },
            "required": ["kind", "file", "symbol"]
        }
    })
}

fn key_only_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "key": { "type": "string" } },
        "required": ["key"]
    })
}

fn file_path_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "filePath": { "type": "string" } },
        "required": ["filePath"]
    })
}

fn dir_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "dir": { "type": "string" } },
        "required": []
    })
}
