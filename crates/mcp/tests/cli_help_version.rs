#![forbid(unsafe_code)]

use std::process::Command;

#[test]
fn help_prints_usage_and_exits() {
    let output = Command::new(env!("CARGO_BIN_EXE_cg_mcp"))
        .arg("--help")
        .output()
        .expect("run cg_mcp --help");
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("Usage: cg_mcp"));
    assert!(text.contains("--cards-dir"));
    assert!(text.contains("--gildash-index"));
}

#[test]
fn version_prints_the_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_cg_mcp"))
        .arg("--version")
        .output()
        .expect("run cg_mcp --version");
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.starts_with("cardgraph-mcp "));
}

#[test]
fn a_missing_gildash_index_fails_startup() {
    let output = Command::new(env!("CARGO_BIN_EXE_cg_mcp"))
        .arg("--storage-dir")
        .arg(std::env::temp_dir().join(format!("cg_cli_{}", std::process::id())))
        .arg("--gildash-index")
        .arg("/no/such/index.json")
        .output()
        .expect("run cg_mcp with bad index");
    assert!(!output.status.success());
}
