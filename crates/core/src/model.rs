#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Card lifecycle status. The set is closed; transitions are unconstrained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Draft,
    Accepted,
    Implementing,
    Implemented,
    Deprecated,
}

impl CardStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Accepted => "accepted",
            Self::Implementing => "implementing",
            Self::Implemented => "implemented",
            Self::Deprecated => "deprecated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "accepted" => Some(Self::Accepted),
            "implementing" => Some(Self::Implementing),
            "implemented" => Some(Self::Implemented),
            "deprecated" => Some(Self::Deprecated),
            _ => None,
        }
    }

    pub fn all() -> &'static [CardStatus] {
        &[
            Self::Draft,
            Self::Accepted,
            Self::Implementing,
            Self::Implemented,
            Self::Deprecated,
        ]
    }
}

impl Default for CardStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl std::fmt::Display for CardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author-declared relation as it appears in front matter: the forward
/// direction only. The mirror row is derived at storage time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSpec {
    #[serde(rename = "type")]
    pub rel_type: String,
    pub target: String,
}

/// Link from a card into a source-code symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLink {
    pub kind: String,
    pub file: String,
    pub symbol: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_as_str() {
        for status in CardStatus::all() {
            assert_eq!(CardStatus::parse(status.as_str()), Some(*status));
        }
        assert_eq!(CardStatus::parse("done"), None);
    }

    #[test]
    fn status_serde_uses_lowercase() {
        let json = serde_json::to_string(&CardStatus::Implementing).unwrap();
        assert_eq!(json, "\"implementing\"");
        let back: CardStatus = serde_json::from_str("\"deprecated\"").unwrap();
        assert_eq!(back, CardStatus::Deprecated);
    }

    #[test]
    fn relation_spec_uses_type_field_name() {
        let spec: RelationSpec =
            serde_json::from_str(r#"{ "type": "depends-on", "target": "auth/login" }"#).unwrap();
        assert_eq!(spec.rel_type, "depends-on");
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("depends-on"));
    }
}
