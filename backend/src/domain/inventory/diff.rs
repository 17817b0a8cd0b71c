//! Fingerprint/diff engine.
//!
//! Pure classification of an incoming payload against the stored one. No
//! I/O and no shared state, so it is safe to call from any task.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use super::payload::ComparablePayload;

/// Result of comparing an incoming payload with current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Classification {
    /// No current row existed for the identity key.
    Created,
    /// The payload is structurally equal to current state.
    Unchanged,
    /// The payload differs; `changed_fields` lists dotted paths, sorted.
    #[serde(rename_all = "camelCase")]
    Updated {
        /// Paths whose values were added, removed or modified.
        changed_fields: Vec<String>,
    },
}

impl Classification {
    /// `true` when the classification requires a change event.
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// Stable lowercase label used in logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Unchanged => "unchanged",
            Self::Updated { .. } => "updated",
        }
    }
}

/// Classify `incoming` against the `existing` payload for the same key.
///
/// # Examples
/// ```
/// use inventory_backend::domain::inventory::{Classification, ComparablePayload, classify};
/// use serde_json::json;
///
/// let old = ComparablePayload::from(json!({"specifications": {"capacity_gb": 512}}));
/// let new = ComparablePayload::from(json!({"specifications": {"capacity_gb": 1024}}));
///
/// assert_eq!(classify(&new, None), Classification::Created);
/// assert_eq!(classify(&old, Some(&old)), Classification::Unchanged);
/// assert_eq!(
///     classify(&new, Some(&old)),
///     Classification::Updated {
///         changed_fields: vec!["specifications.capacity_gb".to_owned()],
///     }
/// );
/// ```
pub fn classify(
    incoming: &ComparablePayload,
    existing: Option<&ComparablePayload>,
) -> Classification {
    let Some(existing) = existing else {
        return Classification::Created;
    };
    if incoming == existing {
        return Classification::Unchanged;
    }
    let mut paths = BTreeSet::new();
    collect_changed_paths("", existing.as_value(), incoming.as_value(), &mut paths);
    Classification::Updated {
        changed_fields: paths.into_iter().collect(),
    }
}

fn collect_changed_paths(prefix: &str, before: &Value, after: &Value, out: &mut BTreeSet<String>) {
    match (before, after) {
        (Value::Object(old), Value::Object(new)) => {
            let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
            for key in keys {
                let path = join_path(prefix, key);
                match (old.get(key), new.get(key)) {
                    (Some(a), Some(b)) => collect_changed_paths(&path, a, b, out),
                    _ => {
                        out.insert(path);
                    }
                }
            }
        }
        (a, b) if a != b => {
            out.insert(if prefix.is_empty() {
                "$".to_owned()
            } else {
                prefix.to_owned()
            });
        }
        _ => {}
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn payload(value: Value) -> ComparablePayload {
        ComparablePayload::from(value)
    }

    #[rstest]
    fn missing_existing_is_created() {
        assert_eq!(classify(&payload(json!({"a": 1})), None), Classification::Created);
    }

    #[rstest]
    fn key_reordering_is_unchanged() {
        let a = payload(json!({"name": "Edge", "settings": {"x": 1, "y": [1, 2]}}));
        let b = payload(json!({"settings": {"y": [1, 2], "x": 1}, "name": "Edge"}));
        assert_eq!(classify(&a, Some(&b)), Classification::Unchanged);
    }

    #[rstest]
    #[case(
        json!({"version": "1.0", "name": "Editor"}),
        json!({"version": "1.1", "name": "Editor"}),
        &["version"]
    )]
    #[case(
        json!({"settings": {"a": 1}}),
        json!({"settings": {"a": 1, "b": 2}}),
        &["settings.b"]
    )]
    #[case(
        json!({"settings": {"a": 1, "b": 2}, "name": "x"}),
        json!({"settings": {"a": 2}, "name": "y"}),
        &["name", "settings.a", "settings.b"]
    )]
    #[case(
        json!({"dns": ["1.1.1.1"]}),
        json!({"dns": ["1.1.1.1", "8.8.8.8"]}),
        &["dns"]
    )]
    #[case(
        json!({"manufacturer": null}),
        json!({"manufacturer": {"name": "Acme"}}),
        &["manufacturer"]
    )]
    fn updated_lists_sorted_changed_paths(
        #[case] before: Value,
        #[case] after: Value,
        #[case] expected: &[&str],
    ) {
        let classification = classify(&payload(after), Some(&payload(before)));
        assert_eq!(
            classification,
            Classification::Updated {
                changed_fields: expected.iter().map(|s| (*s).to_owned()).collect(),
            }
        );
    }

    #[rstest]
    fn classification_serialises_with_change_tag() {
        let value = serde_json::to_value(Classification::Updated {
            changed_fields: vec!["version".into()],
        })
        .expect("serialise classification");
        assert_eq!(value, json!({"change": "updated", "changedFields": ["version"]}));
        assert_eq!(
            serde_json::to_value(Classification::Unchanged).expect("serialise"),
            json!({"change": "unchanged"})
        );
    }

    #[rstest]
    fn classification_is_idempotent() {
        let a = payload(json!({"v": 1}));
        let b = payload(json!({"v": 2}));
        assert_eq!(classify(&a, Some(&b)), classify(&a, Some(&b)));
        assert!(classify(&a, Some(&b)).is_change());
        assert!(!classify(&a, Some(&a)).is_change());
    }
}
