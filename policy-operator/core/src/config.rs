use crate::{ANNOTATION_ADDRESSES, ANNOTATION_DEFAULT_ACTION, ANNOTATION_LISTS};
use std::collections::BTreeMap;

/// The baseline authorization decision for a target.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DefaultAction {
    Allow,
    #[default]
    Deny,
}

/// Typed view of the recognized `routeguard.io/*` annotations, computed
/// once per reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetConfig {
    pub default_action: DefaultAction,
    pub lists: Vec<String>,
    pub addresses: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid default-action {0:?}: expected \"allow\" or \"deny\"")]
pub struct InvalidDefaultAction(pub String);

// === impl DefaultAction ===

impl DefaultAction {
    /// The action applied by the generated rule, the logical complement
    /// of the default.
    pub fn complement(self) -> Self {
        match self {
            DefaultAction::Allow => DefaultAction::Deny,
            DefaultAction::Deny => DefaultAction::Allow,
        }
    }
}

impl std::str::FromStr for DefaultAction {
    type Err = InvalidDefaultAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(DefaultAction::Allow),
            "deny" => Ok(DefaultAction::Deny),
            other => Err(InvalidDefaultAction(other.to_string())),
        }
    }
}

// === impl TargetConfig ===

impl TargetConfig {
    pub fn from_annotations(
        annotations: &BTreeMap<String, String>,
    ) -> Result<Self, InvalidDefaultAction> {
        let default_action = annotations
            .get(ANNOTATION_DEFAULT_ACTION)
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            default_action,
            lists: split_list(annotations.get(ANNOTATION_LISTS)),
            addresses: split_list(annotations.get(ANNOTATION_ADDRESSES)),
        })
    }
}

/// Splits a comma-separated annotation value into trimmed, non-empty
/// entries. An absent annotation yields no entries.
pub fn split_list(value: Option<&String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
