#![forbid(unsafe_code)]

use super::CardOpError;
use crate::support::cardfile::{self, CardFile};
use std::path::Path;

pub(crate) fn read_card_file(path: &Path) -> Result<CardFile, CardOpError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(CardOpError::NotFound(path.display().to_string()));
        }
        Err(err) => return Err(err.into()),
    };
    cardfile::parse(&raw)
        .map_err(|err| CardOpError::Validation(format!("{}: {err}", path.display())))
}

/// Replace-by-rename: the rendered text lands in a temp sibling first so a
/// crashed write never leaves a half-written card behind.
pub(crate) fn write_card_file(path: &Path, file: &CardFile) -> Result<(), CardOpError> {
    let text = cardfile::render(file)
        .map_err(|err| CardOpError::Validation(format!("{}: {err}", path.display())))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = temp_sibling(path);
    std::fs::write(&tmp, text)?;
    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

/// Returns whether a file was actually removed; absence is the caller's
/// call to interpret.
pub(crate) fn remove_card_file(path: &Path) -> Result<bool, CardOpError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn move_card_file(from: &Path, to: &Path) -> Result<(), CardOpError> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::rename(from, to)?;
    Ok(())
}

fn temp_sibling(path: &Path) -> std::path::PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "card".to_string());
    path.with_file_name(format!(".{name}.tmp-{}", std::process::id()))
}

/// Recursive scan for `*.card.md` files, sorted for deterministic reports.
pub(crate) fn scan_card_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, CardOpError> {
    let mut out = Vec::new();
    walk(dir, &mut out)?;
    out.sort();
    Ok(out)
}

fn walk(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> Result<(), CardOpError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&path, out)?;
        } else if path
            .file_name()
            .map(|name| name.to_string_lossy().ends_with(cg_core::key::CARD_FILE_SUFFIX))
            .unwrap_or(false)
        {
            out.push(path);
        }
    }
    Ok(())
}
