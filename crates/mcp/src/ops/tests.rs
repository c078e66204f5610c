#![forbid(unsafe_code)]

use super::*;
use crate::support::cardfile;
use cg_core::model::{CardStatus, CodeLink, RelationSpec};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

fn temp_root(test_name: &str) -> PathBuf {
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "cg_ops_{test_name}_{}_{nonce}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).expect("create temp root");
    dir
}

fn temp_ctx(test_name: &str) -> (CardContext, PathBuf) {
    let root = temp_root(test_name);
    let ctx = CardContext::open(root.join("cards"), &root.join("storage"), None)
        .expect("open context");
    (ctx, root)
}

fn create_input(slug: &str) -> CreateCardInput {
    CreateCardInput {
        slug: slug.to_string(),
        summary: format!("summary of {slug}"),
        status: None,
        body: None,
        constraints: None,
        relations: Vec::new(),
        keywords: Vec::new(),
        tags: Vec::new(),
        code_links: Vec::new(),
    }
}

#[test]
fn create_then_get_round_trips() {
    let (ctx, root) = temp_ctx("create_get");
    let mut input = create_input("hello");
    input.summary = "Hi".to_string();
    let created = create_card(&ctx, &input).unwrap();

    assert!(created.path.ends_with("hello.card.md"));
    assert!(created.path.exists());
    assert_eq!(created.file.front_matter.status, CardStatus::Draft);

    let (file, _path) = get_card(&ctx, "hello").unwrap();
    assert_eq!(file.front_matter.key, "hello");
    assert_eq!(file.front_matter.summary, "Hi");
    assert_eq!(file.front_matter.status, CardStatus::Draft);

    let row = ctx.store().card_by_key("hello").unwrap().expect("row");
    assert_eq!(row.summary, "Hi");
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn second_create_with_same_slug_is_rejected() {
    let (ctx, root) = temp_ctx("dup");
    create_card(&ctx, &create_input("dup")).unwrap();
    let err = create_card(&ctx, &create_input("dup")).unwrap_err();
    assert!(matches!(err, CardOpError::AlreadyExists(_)));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn create_validates_before_touching_anything() {
    let (ctx, root) = temp_ctx("create_validate");
    let mut input = create_input("big");
    input.summary = "x".repeat(501);
    assert!(matches!(
        create_card(&ctx, &input).unwrap_err(),
        CardOpError::Validation(_)
    ));

    let mut input = create_input("badrel");
    input.relations = vec![RelationSpec {
        rel_type: "sibling-of".to_string(),
        target: "x".to_string(),
    }];
    assert!(matches!(
        create_card(&ctx, &input).unwrap_err(),
        CardOpError::RelationType(_)
    ));

    assert!(matches!(
        create_card(&ctx, &create_input("a//b")).unwrap_err(),
        CardOpError::InvalidKey(_)
    ));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn create_compensates_when_the_file_write_fails() {
    let root = temp_root("create_compensate");
    // cards dir nested under a regular file: parent creation must fail.
    let blocker = root.join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let ctx = CardContext::open(blocker.join("cards"), &root.join("storage"), None)
        .expect("open context");

    let err = create_card(&ctx, &create_input("ghost")).unwrap_err();
    assert!(matches!(err, CardOpError::Io(_)), "got: {err}");
    // The compensator removed the half-written row.
    assert!(ctx.store().card_by_key("ghost").unwrap().is_none());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn update_patches_only_specified_fields() {
    let (ctx, root) = temp_ctx("update_patch");
    let mut input = create_input("card");
    input.keywords = vec!["alpha".to_string()];
    input.constraints = Some(json!({ "budget": 3 }));
    create_card(&ctx, &input).unwrap();

    let fields = UpdateCardFields {
        summary: Some("fresh summary".to_string()),
        ..Default::default()
    };
    let updated = update_card(&ctx, "card", &fields).unwrap();
    assert_eq!(updated.file.front_matter.summary, "fresh summary");
    assert_eq!(updated.file.front_matter.keywords, vec!["alpha"]);
    assert_eq!(
        updated.file.front_matter.constraints,
        Some(json!({ "budget": 3 }))
    );
    assert_eq!(ctx.store().keywords_by_card("card").unwrap(), vec!["alpha"]);
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn update_deletes_optional_fields_on_empty_or_null() {
    let (ctx, root) = temp_ctx("update_delete_fields");
    let mut input = create_input("card");
    input.keywords = vec!["alpha".to_string()];
    input.tags = vec!["t".to_string()];
    input.constraints = Some(json!({ "budget": 3 }));
    create_card(&ctx, &input).unwrap();

    let fields = UpdateCardFields {
        keywords: Some(Vec::new()),
        constraints: Some(None),
        ..Default::default()
    };
    let updated = update_card(&ctx, "card", &fields).unwrap();
    assert!(updated.file.front_matter.keywords.is_empty());
    assert!(updated.file.front_matter.constraints.is_none());
    // Unspecified tags survive in both sources.
    assert_eq!(updated.file.front_matter.tags, vec!["t"]);
    assert!(ctx.store().keywords_by_card("card").unwrap().is_empty());
    assert_eq!(ctx.store().tags_by_card("card").unwrap(), vec!["t"]);
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn update_missing_card_is_not_found() {
    let (ctx, root) = temp_ctx("update_missing");
    let err = update_card(&ctx, "nope", &UpdateCardFields::default()).unwrap_err();
    assert!(matches!(err, CardOpError::NotFound(_)));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn update_rejects_a_file_claiming_another_key() {
    let (ctx, root) = temp_ctx("update_mismatch");
    create_card(&ctx, &create_input("honest")).unwrap();
    // Overwrite the header with a different key, bypassing the engine.
    let path = ctx.cards_dir().join("honest.card.md");
    let mut file = files::read_card_file(&path).unwrap();
    file.front_matter.key = "impostor".to_string();
    files::write_card_file(&path, &file).unwrap();

    let err = update_card(&ctx, "honest", &UpdateCardFields::default()).unwrap_err();
    assert!(matches!(err, CardOpError::NotFound(_)));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn self_reference_fails_and_leaves_both_sources_untouched() {
    let (ctx, root) = temp_ctx("selfref");
    create_card(&ctx, &create_input("s")).unwrap();

    let fields = UpdateCardFields {
        relations: Some(vec![RelationSpec {
            rel_type: "depends-on".to_string(),
            target: "s".to_string(),
        }]),
        ..Default::default()
    };
    let err = update_card(&ctx, "s", &fields).unwrap_err();
    assert!(matches!(err, CardOpError::Store(_)), "got: {err}");

    // The transaction aborted before the file write: no edge anywhere.
    assert!(ctx.store().relations_by_card("s").unwrap().is_empty());
    let (file, _) = get_card(&ctx, "s").unwrap();
    assert!(file.front_matter.relations.is_empty());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn update_status_touches_only_status() {
    let (ctx, root) = temp_ctx("status");
    create_card(&ctx, &create_input("card")).unwrap();
    let updated = update_card_status(&ctx, "card", CardStatus::Implementing).unwrap();
    assert_eq!(updated.file.front_matter.status, CardStatus::Implementing);
    assert_eq!(updated.file.front_matter.summary, "summary of card");

    let row = ctx.store().card_by_key("card").unwrap().unwrap();
    assert_eq!(row.status, CardStatus::Implementing);
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn delete_cascades_and_interned_names_survive() {
    let (ctx, root) = temp_ctx("delete_cascade");
    let mut x = create_input("x");
    x.keywords = vec!["k".to_string()];
    create_card(&ctx, &x).unwrap();
    let mut y = create_input("y");
    y.relations = vec![RelationSpec {
        rel_type: "depends-on".to_string(),
        target: "x".to_string(),
    }];
    create_card(&ctx, &y).unwrap();

    delete_card(&ctx, "x").unwrap();
    assert!(matches!(
        get_card(&ctx, "x").unwrap_err(),
        CardOpError::NotFound(_)
    ));
    assert!(ctx.store().relations_by_card("y").unwrap().is_empty());

    // The keyword name row outlives the card until an explicit prune.
    let pruned = prune_classification(&ctx).unwrap();
    assert_eq!(pruned.keywords_removed, 1);
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn delete_missing_card_is_not_found() {
    let (ctx, root) = temp_ctx("delete_missing");
    assert!(matches!(
        delete_card(&ctx, "nope").unwrap_err(),
        CardOpError::NotFound(_)
    ));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn rename_preserves_code_links_and_retires_the_old_key() {
    let (ctx, root) = temp_ctx("rename");
    let mut a = create_input("a");
    a.code_links = vec![CodeLink {
        kind: "fn".to_string(),
        file: "x.ts".to_string(),
        symbol: "F".to_string(),
    }];
    create_card(&ctx, &a).unwrap();

    let renamed = rename_card(&ctx, "a", "b").unwrap();
    assert_eq!(renamed.file.front_matter.key, "b");
    assert!(renamed.path.ends_with("b.card.md"));

    let links = ctx.store().code_links_by_card("b").unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].symbol, "F");

    assert!(matches!(
        get_card(&ctx, "a").unwrap_err(),
        CardOpError::NotFound(_)
    ));
    assert!(ctx.store().card_by_key("a").unwrap().is_none());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn rename_guards_paths() {
    let (ctx, root) = temp_ctx("rename_guards");
    create_card(&ctx, &create_input("a")).unwrap();
    create_card(&ctx, &create_input("b")).unwrap();

    assert!(matches!(
        rename_card(&ctx, "a", "a").unwrap_err(),
        CardOpError::RenameSamePath(_)
    ));
    assert!(matches!(
        rename_card(&ctx, "a", "b").unwrap_err(),
        CardOpError::AlreadyExists(_)
    ));
    assert!(matches!(
        rename_card(&ctx, "ghost", "c").unwrap_err(),
        CardOpError::NotFound(_)
    ));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn sync_from_file_is_idempotent() {
    let (ctx, root) = temp_ctx("sync_idem");
    let path = ctx.cards_dir().join("hand.card.md");
    std::fs::create_dir_all(ctx.cards_dir()).unwrap();
    std::fs::write(
        &path,
        "---\nkey: hand\nsummary: Hand written\nstatus: accepted\nkeywords:\n- manual\n---\nBody.\n",
    )
    .unwrap();

    let first = sync_card_from_file(&ctx, &path).unwrap();
    assert_eq!(first.key, "hand");
    let row_first = ctx.store().card_by_key("hand").unwrap().unwrap();

    let second = sync_card_from_file(&ctx, &path).unwrap();
    assert_eq!(second.key, "hand");
    let row_second = ctx.store().card_by_key("hand").unwrap().unwrap();

    assert_eq!(row_first.summary, row_second.summary);
    assert_eq!(row_first.file_path, row_second.file_path);
    assert_eq!(
        ctx.store().keywords_by_card("hand").unwrap(),
        vec!["manual"]
    );
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn remove_by_file_is_a_noop_for_unknown_paths() {
    let (ctx, root) = temp_ctx("remove_by_file");
    create_card(&ctx, &create_input("x")).unwrap();
    let path = ctx.cards_dir().join("x.card.md");
    assert_eq!(
        remove_card_by_file(&ctx, &path).unwrap(),
        Some("x".to_string())
    );
    assert_eq!(remove_card_by_file(&ctx, &path).unwrap(), None);
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn bulk_sync_collects_per_file_failures() {
    let (ctx, root) = temp_ctx("bulk");
    std::fs::create_dir_all(ctx.cards_dir()).unwrap();
    std::fs::write(
        ctx.cards_dir().join("good.card.md"),
        "---\nkey: good\nsummary: ok\nstatus: draft\n---\n",
    )
    .unwrap();
    std::fs::create_dir_all(ctx.cards_dir().join("sub")).unwrap();
    std::fs::write(
        ctx.cards_dir().join("sub/deep.card.md"),
        "---\nkey: sub/deep\nsummary: ok\nstatus: draft\n---\n",
    )
    .unwrap();
    std::fs::write(ctx.cards_dir().join("broken.card.md"), "no front matter").unwrap();

    let report = bulk_sync(&ctx, None).unwrap();
    assert_eq!(report.synced, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].file_path.contains("broken"));

    // Missing directory propagates instead of reporting.
    assert!(bulk_sync(&ctx, Some(&root.join("no-such-dir"))).is_err());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn validate_reports_stale_orphan_and_mismatch() {
    let (ctx, root) = temp_ctx("validate");
    std::fs::create_dir_all(ctx.cards_dir()).unwrap();

    // Stale: indexed, then the file vanishes behind the engine's back.
    create_card(&ctx, &create_input("stale")).unwrap();
    std::fs::remove_file(ctx.cards_dir().join("stale.card.md")).unwrap();

    // Orphan: a file nobody synced.
    std::fs::write(
        ctx.cards_dir().join("orphan.card.md"),
        "---\nkey: orphan\nsummary: o\nstatus: draft\n---\n",
    )
    .unwrap();

    // Mismatch: header key disagrees with the filename-derived key.
    let odd = ctx.cards_dir().join("odd.card.md");
    std::fs::write(&odd, "---\nkey: not-odd\nsummary: o\nstatus: draft\n---\n").unwrap();
    sync_card_from_file(&ctx, &odd).unwrap();

    let report = validate_cards(&ctx, None).unwrap();
    assert_eq!(report.stale_db_rows.len(), 1);
    assert_eq!(report.stale_db_rows[0].key, "stale");
    assert_eq!(report.orphan_files.len(), 1);
    assert!(report.orphan_files[0].contains("orphan"));
    assert_eq!(report.key_mismatches.len(), 1);
    assert_eq!(report.key_mismatches[0].key, "not-odd");
    assert_eq!(report.key_mismatches[0].derived_key, "odd");

    // Validate never mutates: a second run sees the same world.
    let again = validate_cards(&ctx, None).unwrap();
    assert_eq!(again.stale_db_rows.len(), 1);
    assert_eq!(again.orphan_files.len(), 1);
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn export_regenerates_the_file_from_index_state() {
    let (ctx, root) = temp_ctx("export");
    create_card(&ctx, &create_input("dep")).unwrap();
    let mut a = create_input("a");
    a.relations = vec![RelationSpec {
        rel_type: "depends-on".to_string(),
        target: "dep".to_string(),
    }];
    a.tags = vec!["t".to_string()];
    create_card(&ctx, &a).unwrap();

    let path = ctx.cards_dir().join("a.card.md");
    std::fs::remove_file(&path).unwrap();

    let (file, written) = export_card_to_file(&ctx, "a").unwrap();
    assert_eq!(written, path);
    assert!(path.exists());
    assert_eq!(file.front_matter.relations.len(), 1);
    assert_eq!(file.front_matter.tags, vec!["t"]);

    // "dep" owns only a mirror edge toward "a"; its export must not list it.
    let (dep_file, _) = export_card_to_file(&ctx, "dep").unwrap();
    assert!(dep_file.front_matter.relations.is_empty());

    assert!(matches!(
        export_card_to_file(&ctx, "ghost").unwrap_err(),
        CardOpError::NotFound(_)
    ));
    let _ = std::fs::remove_dir_all(root);
}

fn diamond(ctx: &CardContext) {
    for slug in ["d", "b", "c", "a"] {
        create_card(ctx, &create_input(slug)).unwrap();
    }
    let edge = |target: &str| RelationSpec {
        rel_type: "depends-on".to_string(),
        target: target.to_string(),
    };
    update_card(
        ctx,
        "a",
        &UpdateCardFields {
            relations: Some(vec![edge("b"), edge("c")]),
            ..Default::default()
        },
    )
    .unwrap();
    update_card(
        ctx,
        "b",
        &UpdateCardFields {
            relations: Some(vec![edge("d")]),
            ..Default::default()
        },
    )
    .unwrap();
    update_card(
        ctx,
        "c",
        &UpdateCardFields {
            relations: Some(vec![edge("d")]),
            ..Default::default()
        },
    )
    .unwrap();
}

#[test]
fn graph_walk_emits_each_card_once() {
    let (ctx, root) = temp_ctx("graph_diamond");
    diamond(&ctx);

    let visits = relation_graph(&ctx, "a", None, GraphDirection::Forward).unwrap();
    let d_visits = visits.iter().filter(|v| v.key == "d").count();
    assert_eq!(d_visits, 1);
    assert!(visits.iter().all(|v| v.depth <= 2));
    assert_eq!(visits.len(), 3);
    assert!(visits.iter().all(|v| v.direction == "forward"));

    // Deterministic on an unchanged store.
    let again = relation_graph(&ctx, "a", None, GraphDirection::Forward).unwrap();
    let keys = |vs: &[GraphVisit]| vs.iter().map(|v| v.key.clone()).collect::<Vec<_>>();
    assert_eq!(keys(&visits), keys(&again));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn graph_walk_edges_and_depth_limits() {
    let (ctx, root) = temp_ctx("graph_limits");
    diamond(&ctx);

    assert!(relation_graph(&ctx, "a", Some(0), GraphDirection::Both)
        .unwrap()
        .is_empty());
    assert!(relation_graph(&ctx, "ghost", None, GraphDirection::Both)
        .unwrap()
        .is_empty());

    let shallow = relation_graph(&ctx, "a", Some(1), GraphDirection::Forward).unwrap();
    assert_eq!(shallow.len(), 2);

    // Backward from the sink walks the mirrors up.
    let backward = relation_graph(&ctx, "d", None, GraphDirection::Backward).unwrap();
    assert_eq!(backward.len(), 3);
    assert!(backward.iter().all(|v| v.direction == "backward"));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn context_view_splits_upstream_and_downstream() {
    let (ctx, root) = temp_ctx("context_view");
    diamond(&ctx);

    let view = card_context_view(&ctx, "b").unwrap();
    assert_eq!(view.card.key, "b");
    assert_eq!(view.downstream.len(), 1);
    assert_eq!(view.downstream[0].key, "d");
    assert_eq!(view.upstream.len(), 1);
    assert_eq!(view.upstream[0].key, "a");
    // No indexer configured: links degrade to empty, not an error.
    assert!(view.code_links.is_empty());

    assert!(matches!(
        card_context_view(&ctx, "ghost").unwrap_err(),
        CardOpError::NotFound(_)
    ));
    let _ = std::fs::remove_dir_all(root);
}

struct StubGildash {
    hits: Vec<SymbolHit>,
    broken_files: Vec<String>,
}

impl Gildash for StubGildash {
    fn find_symbols(
        &self,
        name: &str,
        file: Option<&str>,
    ) -> Result<Vec<SymbolHit>, GildashError> {
        if let Some(file) = file {
            if self.broken_files.iter().any(|f| f == file) {
                return Err(GildashError(format!("index missing for {file}")));
            }
        }
        Ok(self
            .hits
            .iter()
            .filter(|hit| hit.name == name && file.map(|f| hit.file == f).unwrap_or(true))
            .cloned()
            .collect())
    }
}

fn gildash_ctx(test_name: &str) -> (CardContext, PathBuf) {
    let root = temp_root(test_name);
    let ctx = CardContext::open(root.join("cards"), &root.join("storage"), None)
        .expect("open context")
        .with_gildash(Box::new(StubGildash {
            hits: vec![SymbolHit {
                name: "login".to_string(),
                file: "src/auth.rs".to_string(),
                kind: Some("fn".to_string()),
                line: Some(42),
            }],
            broken_files: vec!["src/broken.rs".to_string()],
        }));
    (ctx, root)
}

fn linked_card(ctx: &CardContext) {
    let mut input = create_input("auth");
    input.code_links = vec![
        CodeLink {
            kind: "fn".to_string(),
            file: "src/auth.rs".to_string(),
            symbol: "login".to_string(),
        },
        CodeLink {
            kind: "fn".to_string(),
            file: "src/auth.rs".to_string(),
            symbol: "logout".to_string(),
        },
        CodeLink {
            kind: "fn".to_string(),
            file: "src/broken.rs".to_string(),
            symbol: "anything".to_string(),
        },
    ];
    create_card(ctx, &input).unwrap();
}

#[test]
fn resolve_requires_gildash() {
    let (ctx, root) = temp_ctx("resolve_unconfigured");
    create_card(&ctx, &create_input("a")).unwrap();
    assert!(matches!(
        resolve_card_code_links(&ctx, "a").unwrap_err(),
        CardOpError::GildashNotConfigured
    ));
    assert!(matches!(
        validate_code_links(&ctx, "a").unwrap_err(),
        CardOpError::GildashNotConfigured
    ));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn resolve_matches_exact_name_and_file() {
    let (ctx, root) = gildash_ctx("resolve_exact");
    linked_card(&ctx);

    let resolved = resolve_card_code_links(&ctx, "auth").unwrap();
    assert_eq!(resolved.len(), 3);
    let by_symbol = |name: &str| {
        resolved
            .iter()
            .find(|r| r.link.symbol == name)
            .expect("link present")
    };
    assert!(by_symbol("login").symbol.is_some());
    assert_eq!(
        by_symbol("login").symbol.as_ref().map(|s| s.line),
        Some(Some(42))
    );
    assert!(by_symbol("logout").symbol.is_none());
    assert!(by_symbol("anything").symbol.is_none());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn validate_code_links_reports_issue_kinds() {
    let (ctx, root) = gildash_ctx("validate_links");
    linked_card(&ctx);

    let issues = validate_code_links(&ctx, "auth").unwrap();
    assert_eq!(issues.len(), 2);
    let logout = issues
        .iter()
        .find(|issue| issue.link.symbol == "logout")
        .expect("logout issue");
    assert_eq!(logout.issue, "symbol-not-found");
    let broken = issues
        .iter()
        .find(|issue| issue.link.file == "src/broken.rs")
        .expect("broken-file issue");
    assert_eq!(broken.issue, "file-not-indexed");
    assert!(broken.detail.as_deref().unwrap_or("").contains("broken"));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn symbol_and_file_queries_dedupe_by_card() {
    let (ctx, root) = temp_ctx("symbol_queries");
    let mut a = create_input("a");
    a.code_links = vec![
        CodeLink {
            kind: "fn".to_string(),
            file: "one.rs".to_string(),
            symbol: "f".to_string(),
        },
        CodeLink {
            kind: "struct".to_string(),
            file: "two.rs".to_string(),
            symbol: "f".to_string(),
        },
    ];
    create_card(&ctx, &a).unwrap();
    let mut b = create_input("b");
    b.code_links = vec![CodeLink {
        kind: "fn".to_string(),
        file: "one.rs".to_string(),
        symbol: "f".to_string(),
    }];
    create_card(&ctx, &b).unwrap();

    let cards = find_cards_by_symbol(&ctx, "f", None).unwrap();
    assert_eq!(cards.len(), 2);

    let scoped = find_cards_by_symbol(&ctx, "f", Some("two.rs")).unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].key, "a");

    let affected = find_affected_cards(&ctx, &["one.rs".to_string()]).unwrap();
    assert_eq!(affected.len(), 2);
    assert!(find_affected_cards(&ctx, &[]).unwrap().is_empty());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn concurrent_creates_of_the_same_slug_admit_exactly_one() {
    let root = temp_root("race_create");
    let ctx = Arc::new(
        CardContext::open(root.join("cards"), &root.join("storage"), None)
            .expect("open context"),
    );

    let handles = (0..2)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            std::thread::spawn(move || create_card(&ctx, &create_input("dup")).map(|_| ()))
        })
        .collect::<Vec<_>>();
    let results = handles
        .into_iter()
        .map(|handle| handle.join().expect("create thread"))
        .collect::<Vec<_>>();

    let fulfilled = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(fulfilled, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(CardOpError::AlreadyExists(_)))));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn update_enqueued_after_delete_loses_with_not_found() {
    let root = temp_root("race_delete_update");
    let ctx = Arc::new(
        CardContext::open(root.join("cards"), &root.join("storage"), None)
            .expect("open context"),
    );
    create_card(&ctx, &create_input("g")).unwrap();

    let delete_ctx = Arc::clone(&ctx);
    let delete_handle = std::thread::spawn(move || delete_card(&delete_ctx, "g"));
    // Let the delete take its ticket first; FIFO then guarantees the order.
    std::thread::sleep(std::time::Duration::from_millis(20));
    let update_ctx = Arc::clone(&ctx);
    let update_handle = std::thread::spawn(move || {
        update_card(
            &update_ctx,
            "g",
            &UpdateCardFields {
                summary: Some("late".to_string()),
                ..Default::default()
            },
        )
    });

    assert!(delete_handle.join().expect("delete thread").is_ok());
    let update_result = update_handle.join().expect("update thread");
    assert!(matches!(update_result, Err(CardOpError::NotFound(_))));
    assert!(ctx.store().card_by_key("g").unwrap().is_none());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn same_key_writes_apply_in_enqueue_order() {
    let root = temp_root("fifo_visibility");
    let ctx = Arc::new(
        CardContext::open(root.join("cards"), &root.join("storage"), None)
            .expect("open context"),
    );
    create_card(&ctx, &create_input("serial")).unwrap();

    let handles = (0..4)
        .map(|idx| {
            let ctx = Arc::clone(&ctx);
            let handle = std::thread::spawn(move || {
                update_card(
                    &ctx,
                    "serial",
                    &UpdateCardFields {
                        summary: Some(format!("revision {idx}")),
                        ..Default::default()
                    },
                )
                .map(|_| ())
            });
            // Stagger the spawns so each update takes its ticket in order.
            std::thread::sleep(std::time::Duration::from_millis(15));
            handle
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().expect("update thread").expect("update ok");
    }

    let (file, _) = get_card(&ctx, "serial").unwrap();
    assert_eq!(file.front_matter.summary, "revision 3");
    let row = ctx.store().card_by_key("serial").unwrap().unwrap();
    assert_eq!(row.summary, "revision 3");
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn file_gildash_loads_a_json_index() {
    let root = temp_root("file_gildash");
    let index_path = root.join("symbols.json");
    std::fs::write(
        &index_path,
        r#"[{ "name": "open", "file": "src/store.rs", "kind": "fn", "line": 7 }]"#,
    )
    .unwrap();

    let gildash = FileGildash::load(&index_path).unwrap();
    let hits = gildash.find_symbols("open", Some("src/store.rs")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].line, Some(7));
    assert!(gildash
        .find_symbols("open", Some("elsewhere.rs"))
        .unwrap()
        .is_empty());
    assert!(gildash.find_symbols("close", None).unwrap().is_empty());

    assert!(FileGildash::load(&root.join("missing.json")).is_err());
    std::fs::write(&index_path, "not json").unwrap();
    assert!(FileGildash::load(&index_path).is_err());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn rendered_files_parse_back_identically() {
    let (ctx, root) = temp_ctx("roundtrip");
    let mut input = create_input("round");
    input.body = Some("Body text.\n".to_string());
    input.constraints = Some(json!({ "nested": { "list": [1, 2] } }));
    input.tags = vec!["tag".to_string()];
    let created = create_card(&ctx, &input).unwrap();

    let raw = std::fs::read_to_string(&created.path).unwrap();
    let parsed = cardfile::parse(&raw).unwrap();
    assert_eq!(parsed, created.file);
    let _ = std::fs::remove_dir_all(root);
}
