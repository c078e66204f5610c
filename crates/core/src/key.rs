#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

pub const CARD_FILE_SUFFIX: &str = ".card.md";

/// Validated card identifier. Segments separated by `/` become directory
/// levels under the cards dir; the whole key becomes the file stem.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardKey(String);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardKeyError {
    Empty,
    EmptySegment,
    DotSegment { segment: String },
    InvalidChar { ch: char, index: usize },
}

impl std::fmt::Display for CardKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "key must not be empty"),
            Self::EmptySegment => write!(f, "key must not contain empty segments"),
            Self::DotSegment { segment } => {
                write!(f, "key segment must not be '{segment}'")
            }
            Self::InvalidChar { ch, index } => {
                write!(f, "key contains invalid character '{ch}' at index {index}")
            }
        }
    }
}

impl std::error::Error for CardKeyError {}

impl CardKey {
    /// Accepts user-entered slugs: folds backslashes to forward slashes and
    /// strips boundary slashes before validating.
    pub fn normalize(slug: impl AsRef<str>) -> Result<Self, CardKeyError> {
        let folded = slug.as_ref().replace('\\', "/");
        let trimmed = folded.trim_matches('/');
        Self::parse(trimmed)
    }

    /// Strict form: the value must already be a well-formed key.
    pub fn parse(value: impl Into<String>) -> Result<Self, CardKeyError> {
        let value = value.into();
        validate_key(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}{CARD_FILE_SUFFIX}", self.0)
    }

    pub fn file_path(&self, cards_dir: &Path) -> PathBuf {
        cards_dir.join(self.file_name())
    }

    /// Derives the key back from a path relative to the cards dir
    /// (`a/b.card.md` -> `a/b`). Returns the raw stem even when it fails key
    /// validation so callers can report the mismatch.
    pub fn stem_from_relative_path(relative: &Path) -> Option<String> {
        let text = relative.to_string_lossy().replace('\\', "/");
        text.strip_suffix(CARD_FILE_SUFFIX).map(|s| s.to_string())
    }
}

impl std::fmt::Display for CardKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_key(value: &str) -> Result<(), CardKeyError> {
    if value.is_empty() {
        return Err(CardKeyError::Empty);
    }
    // Leading/trailing and doubled slashes all produce an empty segment.
    for segment in value.split('/') {
        if segment.is_empty() {
            return Err(CardKeyError::EmptySegment);
        }
        if segment == "." || segment == ".." {
            return Err(CardKeyError::DotSegment {
                segment: segment.to_string(),
            });
        }
    }
    for (index, ch) in value.chars().enumerate() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-' | '/') {
            continue;
        }
        // Colons (drive letters), whitespace and everything else land here.
        return Err(CardKeyError::InvalidChar { ch, index });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn accepts_plain_and_nested_keys() {
        assert_eq!(CardKey::parse("hello").unwrap().as_str(), "hello");
        assert_eq!(
            CardKey::parse("auth/session-store.v2").unwrap().as_str(),
            "auth/session-store.v2"
        );
    }

    #[test]
    fn normalize_folds_backslashes_and_trims_boundaries() {
        assert_eq!(
            CardKey::normalize("\\auth\\login\\").unwrap().as_str(),
            "auth/login"
        );
        assert_eq!(CardKey::normalize("/hello/").unwrap().as_str(), "hello");
    }

    #[test]
    fn rejects_empty_and_slash_only() {
        assert_eq!(CardKey::parse(""), Err(CardKeyError::Empty));
        assert!(CardKey::normalize("/").is_err());
        assert!(CardKey::normalize("///").is_err());
    }

    #[test]
    fn rejects_dot_segments() {
        assert!(matches!(
            CardKey::parse("a/../b"),
            Err(CardKeyError::DotSegment { .. })
        ));
        assert!(matches!(
            CardKey::parse("."),
            Err(CardKeyError::DotSegment { .. })
        ));
    }

    #[test]
    fn rejects_double_slashes_and_boundary_slashes() {
        assert_eq!(CardKey::parse("a//b"), Err(CardKeyError::EmptySegment));
        assert_eq!(CardKey::parse("/a"), Err(CardKeyError::EmptySegment));
        assert_eq!(CardKey::parse("a/"), Err(CardKeyError::EmptySegment));
    }

    #[test]
    fn rejects_drive_letters_and_spaces() {
        assert!(matches!(
            CardKey::parse("C:/cards/x"),
            Err(CardKeyError::InvalidChar { ch: ':', .. })
        ));
        assert!(matches!(
            CardKey::parse("a b"),
            Err(CardKeyError::InvalidChar { ch: ' ', .. })
        ));
    }

    #[test]
    fn file_path_appends_card_suffix() {
        let key = CardKey::parse("auth/login").unwrap();
        assert_eq!(key.file_name(), "auth/login.card.md");
        assert_eq!(
            key.file_path(Path::new("/cards")),
            Path::new("/cards/auth/login.card.md")
        );
    }

    #[test]
    fn stem_round_trips_through_relative_path() {
        let key = CardKey::parse("auth/login").unwrap();
        let stem = CardKey::stem_from_relative_path(Path::new(&key.file_name())).unwrap();
        assert_eq!(stem, "auth/login");
        assert_eq!(
            CardKey::stem_from_relative_path(Path::new("notes.md")),
            None
        );
    }
}
