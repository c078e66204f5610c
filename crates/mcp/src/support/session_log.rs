#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

/// Crash-diagnosis record for the last server session, overwritten in place
/// on every note so a dead process still leaves its final state behind.
#[derive(Clone, Debug)]
pub(crate) struct SessionLog {
    path: PathBuf,
    start_rfc3339: String,
    pid: u32,
    args: Vec<String>,
    last_method: Option<String>,
    last_error: Option<String>,
    exit: Option<String>,
}

impl SessionLog {
    pub(crate) fn new(storage_dir: &Path) -> Self {
        let this = Self {
            path: storage_dir.join("cardgraph_mcp_last_session.txt"),
            start_rfc3339: super::now_rfc3339(),
            pid: std::process::id(),
            args: std::env::args().collect(),
            last_method: None,
            last_error: None,
            exit: None,
        };
        this.flush();
        this
    }

    pub(crate) fn note_method(&mut self, method: &str) {
        let method = method.trim();
        if method.is_empty() {
            return;
        }
        self.last_method = Some(truncate(method, 96));
        self.flush();
    }

    pub(crate) fn note_error(&mut self, error: &str) {
        let error = error.trim();
        if error.is_empty() {
            return;
        }
        self.last_error = Some(truncate(error, 300));
        self.flush();
    }

    pub(crate) fn note_exit(&mut self, reason: &str) {
        self.exit = Some(truncate(reason.trim(), 120));
        self.flush();
    }

    fn flush(&self) {
        let mut text = String::new();
        text.push_str(&format!("start: {}\n", self.start_rfc3339));
        text.push_str(&format!("pid: {}\n", self.pid));
        text.push_str(&format!("args: {}\n", self.args.join(" ")));
        if let Some(method) = &self.last_method {
            text.push_str(&format!("last_method: {method}\n"));
        }
        if let Some(error) = &self.last_error {
            text.push_str(&format!("last_error: {error}\n"));
        }
        if let Some(exit) = &self.exit {
            text.push_str(&format!("exit: {exit}\n"));
        }
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = std::fs::write(&self.path, text);
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for (index, ch) in value.chars().enumerate() {
        if index == max_chars {
            out.push_str("...");
            return out;
        }
        out.push(ch);
    }
    out
}
