#![forbid(unsafe_code)]

mod entry;
mod ops;
mod server;
mod support;

use crate::ops::{CardContext, FileGildash};
use crate::server::McpServer;
use crate::support::SessionLog;
use std::path::PathBuf;

const USAGE: &str = "\
cardgraph MCP server: design cards as files plus a queryable graph index.

Usage: cg_mcp [options]

Options:
  --cards-dir <path>        Directory of *.card.md files (default: cards)
  --storage-dir <path>      Index and session-log directory (default: .cardgraph)
  --relation-types <csv>    Relation-type allow-list override
  --gildash-index <path>    JSON symbol index for code-link resolution
  --version                 Print the version and exit
  --help                    Print this help and exit
";

struct CliArgs {
    cards_dir: PathBuf,
    storage_dir: PathBuf,
    relation_types: Option<Vec<String>>,
    gildash_index: Option<PathBuf>,
    print_help: bool,
    print_version: bool,
}

fn parse_args() -> CliArgs {
    let mut args = std::env::args().skip(1);
    let mut cards_dir: Option<PathBuf> = None;
    let mut storage_dir: Option<PathBuf> = None;
    let mut relation_types: Option<Vec<String>> = None;
    let mut gildash_index: Option<PathBuf> = None;
    let mut print_help = false;
    let mut print_version = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--cards-dir" => {
                if let Some(value) = args.next() {
                    cards_dir = Some(PathBuf::from(value));
                }
            }
            "--storage-dir" => {
                if let Some(value) = args.next() {
                    storage_dir = Some(PathBuf::from(value));
                }
            }
            "--relation-types" => {
                if let Some(value) = args.next() {
                    let types = value
                        .split(',')
                        .map(|item| item.trim().to_string())
                        .filter(|item| !item.is_empty())
                        .collect::<Vec<_>>();
                    if !types.is_empty() {
                        relation_types = Some(types);
                    }
                }
            }
            "--gildash-index" => {
                if let Some(value) = args.next() {
                    gildash_index = Some(PathBuf::from(value));
                }
            }
            "--help" | "-h" => print_help = true,
            "--version" | "-V" => print_version = true,
            _ => {}
        }
    }
    CliArgs {
        cards_dir: cards_dir.unwrap_or_else(|| PathBuf::from("cards")),
        storage_dir: storage_dir.unwrap_or_else(|| PathBuf::from(".cardgraph")),
        relation_types,
        gildash_index,
        print_help,
        print_version,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args();
    if args.print_help {
        print!("{USAGE}");
        return Ok(());
    }
    if args.print_version {
        println!("cardgraph-mcp {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut ctx = CardContext::open(args.cards_dir, &args.storage_dir, args.relation_types)?;
    if let Some(index_path) = &args.gildash_index {
        ctx = ctx.with_gildash(Box::new(FileGildash::load(index_path)?));
    }

    let mut session_log = SessionLog::new(&args.storage_dir);
    let mut server = McpServer::new(ctx);
    entry::run_stdio(&mut server, &mut session_log)?;
    Ok(())
}
