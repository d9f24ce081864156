use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::effected::EffectedPermissions;
use crate::resource::ResourceKey;
use crate::subject::Subject;

/// The name of a policy entry, unique within its policy.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A named bundle of subjects and the permissions they are granted or
/// revoked on a set of resources. Entries are the unit of authorship in a
/// [`Policy`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyEntry {
    pub label: Label,
    pub subjects: Vec<Subject>,
    pub resources: BTreeMap<ResourceKey, EffectedPermissions>,
}

impl PolicyEntry {
    pub fn new(
        label: impl Into<Label>,
        subjects: Vec<Subject>,
        resources: BTreeMap<ResourceKey, EffectedPermissions>,
    ) -> Self {
        Self {
            label: label.into(),
            subjects,
            resources,
        }
    }
}

/// The full authorization document for one entity.
///
/// A policy is an immutable value: the entry collection carries no ordering
/// guarantee (entries are combined, not sequenced), and every "mutation"
/// produces a new instance. Enforcers are built per policy snapshot and must
/// be rebuilt when a newer revision replaces this one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Policy {
    /// Identifier of the entity this policy governs.
    pub policy_id: String,
    /// Monotonically increasing revision assigned by the persistence layer.
    #[serde(default)]
    pub revision: u64,
    pub entries: Vec<PolicyEntry>,
}

impl Policy {
    pub fn new(policy_id: impl Into<String>, revision: u64, entries: Vec<PolicyEntry>) -> Self {
        Self {
            policy_id: policy_id.into(),
            revision,
            entries,
        }
    }

    /// Look up an entry by label.
    pub fn entry(&self, label: &Label) -> Option<&PolicyEntry> {
        self.entries.iter().find(|e| &e.label == label)
    }

    /// A new policy with `entry` appended (or replacing an entry of the same
    /// label) and the revision bumped.
    pub fn with_entry(&self, entry: PolicyEntry) -> Policy {
        let mut entries: Vec<PolicyEntry> = self
            .entries
            .iter()
            .filter(|e| e.label != entry.label)
            .cloned()
            .collect();
        entries.push(entry);
        Policy {
            policy_id: self.policy_id.clone(),
            revision: self.revision + 1,
            entries,
        }
    }

    /// A new policy without the entry named `label`, revision bumped.
    pub fn without_entry(&self, label: &Label) -> Policy {
        Policy {
            policy_id: self.policy_id.clone(),
            revision: self.revision + 1,
            entries: self
                .entries
                .iter()
                .filter(|e| &e.label != label)
                .cloned()
                .collect(),
        }
    }
}
