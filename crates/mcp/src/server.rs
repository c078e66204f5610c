#![forbid(unsafe_code)]

mod definitions;

use crate::ops::{self, CardContext, CardOpError};
use crate::support::args::{
    optional_code_links, optional_nullable_value, optional_relations, optional_string,
    optional_string_array, optional_usize, require_string,
};
use crate::support::cardfile::CardFile;
use crate::support::{ai_error, ai_ok, ai_ok_with};
use cg_core::model::CardStatus;
use cg_storage::CardRow;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::Path;

const MCP_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "cardgraph-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) const PARSE_ERROR: i64 = -32700;
pub(crate) const INVALID_REQUEST: i64 = -32600;
pub(crate) const METHOD_NOT_FOUND: i64 = -32601;
pub(crate) const INVALID_PARAMS: i64 = -32602;
pub(crate) const NOT_INITIALIZED: i64 = -32002;

/// Unknown members (`jsonrpc` included) are ignored by serde, so only the
/// parts the server acts on are modeled.
#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcRequest {
    pub(crate) method: String,
    #[serde(default)]
    pub(crate) id: Option<Value>,
    #[serde(default)]
    pub(crate) params: Option<Value>,
}

pub(crate) fn rpc_result(id: Option<Value>, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

pub(crate) fn rpc_failure(id: Option<Value>, code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
}

pub(crate) struct McpServer {
    initialized: bool,
    ctx: CardContext,
}

impl McpServer {
    pub(crate) fn new(ctx: CardContext) -> Self {
        Self {
            initialized: false,
            ctx,
        }
    }

    /// One protocol request in, at most one response out. A `None` return
    /// means a notification that wants no reply. Only `initialize` and the
    /// initialized notification are served before the handshake completes.
    pub(crate) fn handle(&mut self, request: JsonRpcRequest) -> Option<Value> {
        let JsonRpcRequest { method, id, params } = request;
        match method.as_str() {
            "initialize" => Some(rpc_result(id, self.describe_server())),
            "notifications/initialized" => {
                self.initialized = true;
                None
            }
            _ if !self.initialized => Some(rpc_failure(
                id,
                NOT_INITIALIZED,
                "Server not initialized",
            )),
            "ping" => Some(rpc_result(id, json!({}))),
            "tools/list" => Some(rpc_result(
                id,
                json!({ "tools": definitions::tool_definitions() }),
            )),
            "tools/call" => Some(self.handle_tool_call(id, params)),
            other => Some(rpc_failure(
                id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {other}"),
            )),
        }
    }

    fn describe_server(&self) -> Value {
        json!({
            "protocolVersion": MCP_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
        })
    }

    /// Unwraps `{name, arguments}`, runs the tool, and packages the
    /// envelope as MCP text content. `isError` mirrors the envelope's own
    /// success flag, so domain failures surface without breaking protocol.
    fn handle_tool_call(&mut self, id: Option<Value>, params: Option<Value>) -> Value {
        let params = match params {
            Some(Value::Object(map)) => map,
            _ => return rpc_failure(id, INVALID_PARAMS, "params must be an object"),
        };
        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let args = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let envelope = self.call_tool(&name, args);
        let failed = envelope.get("success") != Some(&Value::Bool(true));
        let text = serde_json::to_string_pretty(&envelope)
            .unwrap_or_else(|_| envelope.to_string());
        rpc_result(
            id,
            json!({
                "content": [{ "type": "text", "text": text }],
                "isError": failed,
            }),
        )
    }

    fn call_tool(&mut self, name: &str, args: Value) -> Value {
        match name {
            "card_create" => self.tool_card_create(args),
            "card_get" => self.tool_card_get(args),
            "card_update" => self.tool_card_update(args),
            "card_update_status" => self.tool_card_update_status(args),
            "card_delete" => self.tool_card_delete(args),
            "card_rename" => self.tool_card_rename(args),
            "card_list" => self.tool_card_list(args),
            "card_search" => self.tool_card_search(args),
            "card_sync_file" => self.tool_card_sync_file(args),
            "card_remove_file" => self.tool_card_remove_file(args),
            "card_bulk_sync" => self.tool_card_bulk_sync(args),
            "card_validate" => self.tool_card_validate(args),
            "card_export" => self.tool_card_export(args),
            "card_context" => self.tool_card_context(args),
            "card_graph" => self.tool_card_graph(args),
            "card_links_resolve" => self.tool_card_links_resolve(args),
            "card_links_validate" => self.tool_card_links_validate(args),
            "cards_by_symbol" => self.tool_cards_by_symbol(args),
            "cards_affected" => self.tool_cards_affected(args),
            "classification_prune" => self.tool_classification_prune(args),
            "storage" => self.tool_storage(args),
            _ => ai_error("UNKNOWN_TOOL", &format!("Unknown tool: {name}")),
        }
    }

    fn tool_storage(&mut self, _args: Value) -> Value {
        ai_ok(
            "storage",
            json!({
                "cards_dir": self.ctx.cards_dir().to_string_lossy().to_string(),
                "storage_dir": self.ctx.storage_dir().to_string_lossy().to_string(),
                "relation_types": self.ctx.relation_types(),
            }),
        )
    }

    fn tool_card_create(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let slug = match require_string(args_obj, "slug") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let summary = match require_string(args_obj, "summary") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let status = match parse_status_arg(args_obj, "status") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let body = match optional_string(args_obj, "body") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let constraints = match optional_nullable_value(args_obj, "constraints") {
            Some(Some(v)) => Some(v),
            _ => None,
        };
        let relations = match optional_relations(args_obj, "relations") {
            Ok(v) => v.unwrap_or_default(),
            Err(resp) => return resp,
        };
        let keywords = match optional_string_array(args_obj, "keywords") {
            Ok(v) => v.unwrap_or_default(),
            Err(resp) => return resp,
        };
        let tags = match optional_string_array(args_obj, "tags") {
            Ok(v) => v.unwrap_or_default(),
            Err(resp) => return resp,
        };
        let code_links = match optional_code_links(args_obj, "codeLinks") {
            Ok(v) => v.unwrap_or_default(),
            Err(resp) => return resp,
        };

        let input = ops::CreateCardInput {
            slug,
            summary,
            status,
            body,
            constraints,
            relations,
            keywords,
            tags,
            code_links,
        };
        match ops::create_card(&self.ctx, &input) {
            Ok(out) => ai_ok_with(
                "card_create",
                json!({ "card": card_file_json(&out.file, &out.path) }),
                out.warnings,
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_get(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let key = match require_string(args_obj, "key") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        match ops::get_card(&self.ctx, &key) {
            Ok((file, path)) => ai_ok(
                "card_get",
                json!({ "card": card_file_json(&file, &path) }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_update(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let key = match require_string(args_obj, "key") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let status = match parse_status_arg(args_obj, "status") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let summary = match optional_string(args_obj, "summary") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let body = match optional_string(args_obj, "body") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let relations = match optional_relations(args_obj, "relations") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let keywords = match optional_string_array(args_obj, "keywords") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let tags = match optional_string_array(args_obj, "tags") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let code_links = match optional_code_links(args_obj, "codeLinks") {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let fields = ops::UpdateCardFields {
            summary,
            status,
            body,
            constraints: optional_nullable_value(args_obj, "constraints"),
            relations,
            keywords,
            tags,
            code_links,
        };
        match ops::update_card(&self.ctx, &key, &fields) {
            Ok(out) => ai_ok_with(
                "card_update",
                json!({ "card": card_file_json(&out.file, &out.path) }),
                out.warnings,
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_update_status(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let key = match require_string(args_obj, "key") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let status_raw = match require_string(args_obj, "status") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let Some(status) = CardStatus::parse(&status_raw) else {
            return ai_error("INVALID_INPUT", &status_values_message());
        };
        match ops::update_card_status(&self.ctx, &key, status) {
            Ok(out) => ai_ok(
                "card_update_status",
                json!({ "card": card_file_json(&out.file, &out.path) }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_delete(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let key = match require_string(args_obj, "key") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        match ops::delete_card(&self.ctx, &key) {
            Ok(()) => ai_ok("card_delete", json!({ "key": key, "deleted": true })),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_rename(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let key = match require_string(args_obj, "key") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let new_slug = match require_string(args_obj, "newSlug") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        match ops::rename_card(&self.ctx, &key, &new_slug) {
            Ok(out) => ai_ok_with(
                "card_rename",
                json!({
                    "previousKey": key,
                    "card": card_file_json(&out.file, &out.path),
                }),
                out.warnings,
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_list(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let status = match parse_status_arg(args_obj, "status") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        match ops::list_cards(&self.ctx, status) {
            Ok(rows) => ai_ok(
                "card_list",
                json!({
                    "count": rows.len(),
                    "cards": rows.iter().map(card_row_json).collect::<Vec<_>>(),
                }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_search(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let query = match require_string(args_obj, "query") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        match ops::search_cards(&self.ctx, &query) {
            Ok(rows) => ai_ok(
                "card_search",
                json!({
                    "count": rows.len(),
                    "cards": rows.iter().map(card_row_json).collect::<Vec<_>>(),
                }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_sync_file(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let file_path = match require_string(args_obj, "filePath") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        match ops::sync_card_from_file(&self.ctx, Path::new(&file_path)) {
            Ok(outcome) => ai_ok_with(
                "card_sync_file",
                json!({ "key": outcome.key, "filePath": file_path }),
                outcome.warnings,
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_remove_file(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let file_path = match require_string(args_obj, "filePath") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        match ops::remove_card_by_file(&self.ctx, Path::new(&file_path)) {
            Ok(removed) => ai_ok(
                "card_remove_file",
                json!({ "filePath": file_path, "removedKey": removed }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_bulk_sync(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let dir = match optional_string(args_obj, "dir") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let dir_path = dir.as_deref().map(Path::new);
        match ops::bulk_sync(&self.ctx, dir_path) {
            Ok(report) => ai_ok_with(
                "card_bulk_sync",
                json!({
                    "synced": report.synced,
                    "failed": report.failures.len(),
                    "failures": report
                        .failures
                        .iter()
                        .map(|f| json!({ "filePath": f.file_path, "error": f.error }))
                        .collect::<Vec<_>>(),
                }),
                report.warnings,
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_validate(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let dir = match optional_string(args_obj, "dir") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let dir_path = dir.as_deref().map(Path::new);
        match ops::validate_cards(&self.ctx, dir_path) {
            Ok(report) => ai_ok(
                "card_validate",
                json!({
                    "staleDbRows": report
                        .stale_db_rows
                        .iter()
                        .map(|row| json!({ "key": row.key, "filePath": row.file_path }))
                        .collect::<Vec<_>>(),
                    "orphanFiles": report.orphan_files,
                    "keyMismatches": report
                        .key_mismatches
                        .iter()
                        .map(|m| json!({
                            "key": m.key,
                            "filePath": m.file_path,
                            "derivedKey": m.derived_key,
                        }))
                        .collect::<Vec<_>>(),
                }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_export(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let key = match require_string(args_obj, "key") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        match ops::export_card_to_file(&self.ctx, &key) {
            Ok((file, path)) => ai_ok(
                "card_export",
                json!({ "card": card_file_json(&file, &path) }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_context(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let key = match require_string(args_obj, "key") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        match ops::card_context_view(&self.ctx, &key) {
            Ok(view) => ai_ok(
                "card_context",
                json!({
                    "card": card_row_json(&view.card),
                    "codeLinks": view
                        .code_links
                        .iter()
                        .map(resolved_link_json)
                        .collect::<Vec<_>>(),
                    "upstreamCards": view.upstream.iter().map(card_row_json).collect::<Vec<_>>(),
                    "downstreamCards": view
                        .downstream
                        .iter()
                        .map(card_row_json)
                        .collect::<Vec<_>>(),
                }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_graph(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let key = match require_string(args_obj, "key") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let max_depth = match optional_usize(args_obj, "maxDepth") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let direction = match optional_string(args_obj, "direction") {
            Ok(Some(raw)) => match ops::GraphDirection::parse(&raw) {
                Some(direction) => direction,
                None => {
                    return ai_error(
                        "INVALID_INPUT",
                        "direction must be one of: forward, backward, both",
                    );
                }
            },
            Ok(None) => ops::GraphDirection::Both,
            Err(resp) => return resp,
        };
        match ops::relation_graph(&self.ctx, &key, max_depth, direction) {
            Ok(visits) => ai_ok(
                "card_graph",
                json!({
                    "root": key,
                    "count": visits.len(),
                    "cards": visits
                        .iter()
                        .map(|visit| json!({
                            "key": visit.key,
                            "depth": visit.depth,
                            "relationType": visit.relation_type,
                            "direction": visit.direction,
                        }))
                        .collect::<Vec<_>>(),
                }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_links_resolve(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let key = match require_string(args_obj, "key") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        match ops::resolve_card_code_links(&self.ctx, &key) {
            Ok(resolved) => ai_ok(
                "card_links_resolve",
                json!({
                    "key": key,
                    "codeLinks": resolved.iter().map(resolved_link_json).collect::<Vec<_>>(),
                }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_card_links_validate(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let key = match require_string(args_obj, "key") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        match ops::validate_code_links(&self.ctx, &key) {
            Ok(issues) => ai_ok(
                "card_links_validate",
                json!({
                    "key": key,
                    "issues": issues
                        .iter()
                        .map(|issue| json!({
                            "link": code_link_row_json(&issue.link),
                            "issue": issue.issue,
                            "detail": issue.detail,
                        }))
                        .collect::<Vec<_>>(),
                }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_cards_by_symbol(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let symbol = match require_string(args_obj, "symbol") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let file = match optional_string(args_obj, "file") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        match ops::find_cards_by_symbol(&self.ctx, &symbol, file.as_deref()) {
            Ok(rows) => ai_ok(
                "cards_by_symbol",
                json!({
                    "count": rows.len(),
                    "cards": rows.iter().map(card_row_json).collect::<Vec<_>>(),
                }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_cards_affected(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let files = match optional_string_array(args_obj, "files") {
            Ok(Some(files)) => files,
            Ok(None) => return ai_error("INVALID_INPUT", "files is required"),
            Err(resp) => return resp,
        };
        match ops::find_affected_cards(&self.ctx, &files) {
            Ok(rows) => ai_ok(
                "cards_affected",
                json!({
                    "count": rows.len(),
                    "cards": rows.iter().map(card_row_json).collect::<Vec<_>>(),
                }),
            ),
            Err(err) => op_error(&err),
        }
    }

    fn tool_classification_prune(&mut self, _args: Value) -> Value {
        match ops::prune_classification(&self.ctx) {
            Ok(result) => ai_ok(
                "classification_prune",
                json!({
                    "keywordsRemoved": result.keywords_removed,
                    "tagsRemoved": result.tags_removed,
                }),
            ),
            Err(err) => op_error(&err),
        }
    }
}

fn parse_status_arg(
    args: &Map<String, Value>,
    key: &str,
) -> Result<Option<CardStatus>, Value> {
    match optional_string(args, key)? {
        None => Ok(None),
        Some(raw) => CardStatus::parse(&raw)
            .map(Some)
            .ok_or_else(|| ai_error("INVALID_INPUT", &status_values_message())),
    }
}

fn status_values_message() -> String {
    let values = CardStatus::all()
        .iter()
        .map(|status| status.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("status must be one of: {values}")
}

fn op_error(err: &CardOpError) -> Value {
    let code = match err {
        CardOpError::InvalidKey(_) => "INVALID_KEY",
        CardOpError::Validation(_) => "VALIDATION",
        CardOpError::NotFound(_) => "NOT_FOUND",
        CardOpError::AlreadyExists(_) => "ALREADY_EXISTS",
        CardOpError::RenameSamePath(_) => "RENAME_SAME_PATH",
        CardOpError::RelationType(_) => "RELATION_TYPE",
        CardOpError::GildashNotConfigured => "GILDASH_NOT_CONFIGURED",
        CardOpError::Compensation { .. } => "COMPENSATION",
        CardOpError::Store(_) => "STORE_ERROR",
        CardOpError::Io(_) => "IO_ERROR",
    };
    ai_error(code, &err.to_string())
}

fn card_file_json(file: &CardFile, path: &Path) -> Value {
    let fm = &file.front_matter;
    json!({
        "key": fm.key,
        "summary": fm.summary,
        "status": fm.status.as_str(),
        "body": file.body,
        "tags": fm.tags,
        "keywords": fm.keywords,
        "relations": serde_json::to_value(&fm.relations).unwrap_or_else(|_| json!([])),
        "codeLinks": serde_json::to_value(&fm.code_links).unwrap_or_else(|_| json!([])),
        "constraints": fm.constraints,
        "filePath": path.to_string_lossy(),
    })
}

fn card_row_json(row: &CardRow) -> Value {
    let constraints = row
        .constraints_json
        .as_deref()
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok());
    json!({
        "key": row.key,
        "summary": row.summary,
        "status": row.status.as_str(),
        "body": row.body,
        "constraints": constraints,
        "filePath": row.file_path,
        "updatedAt": row.updated_at,
    })
}

fn code_link_row_json(link: &cg_storage::CodeLinkRow) -> Value {
    json!({
        "cardKey": link.card_key,
        "kind": link.kind,
        "file": link.file,
        "symbol": link.symbol,
    })
}

fn resolved_link_json(resolved: &ops::ResolvedCodeLink) -> Value {
    json!({
        "link": code_link_row_json(&resolved.link),
        "symbol": resolved.symbol.as_ref().map(|hit| json!({
            "name": hit.name,
            "file": hit.file,
            "kind": hit.kind,
            "line": hit.line,
        })),
    })
}
