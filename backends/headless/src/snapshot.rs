use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Owned, serializable copy of a host subtree.
///
/// Two renders that leave the surface in the same state produce equal snapshots, which makes
/// this the comparison point for "same output" assertions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSnapshot {
    /// Node kind (`TEXT` for text nodes).
    pub kind: String,
    /// Plain attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Names of bound events.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    /// Child subtrees in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HostSnapshot>,
}

impl HostSnapshot {
    /// Serializes the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Only fails if serialization itself fails, which plain strings and maps never do.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_omits_empty_fields() {
        let snapshot = HostSnapshot {
            kind: "div".into(),
            children: vec![HostSnapshot {
                kind: "TEXT".into(),
                attributes: BTreeMap::from([("nodeValue".into(), "hi".into())]),
                ..HostSnapshot::default()
            }],
            ..HostSnapshot::default()
        };
        let json = snapshot.to_json().expect("serializes");
        assert!(!json.contains("events"));
        let parsed: HostSnapshot = serde_json::from_str(&json).expect("parses");
        assert_eq!(parsed, snapshot);
    }
}
