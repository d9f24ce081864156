use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use policy_model::{EffectedPermissions, Policy, ResourcePointer, SubjectId};

/// Errors raised when assembling tree nodes from malformed segment names.
///
/// Pointers parsed through [`ResourcePointer`] can never produce these; they
/// guard direct node construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("tree node name must not be empty")]
    EmptyName,
    #[error("tree node name '{0}' must not contain '/'")]
    NameContainsSlash(String),
}

/// One node of the policy tree: a path segment, the per-subject permission
/// effects contributed by entries targeting exactly this path, and a registry
/// of named children.
///
/// Ownership runs strictly root-to-leaf through the child registry. The
/// upward relation exists only as the cached absolute `pointer`, which always
/// equals the parent's pointer plus this node's name; being derived state it
/// is excluded from equality.
#[derive(Debug, Clone)]
pub struct PolicyTreeNode {
    name: String,
    pointer: ResourcePointer,
    grants: BTreeMap<SubjectId, EffectedPermissions>,
    children: BTreeMap<String, PolicyTreeNode>,
}

impl PolicyTreeNode {
    /// The synthetic root representing `/`.
    fn root() -> Self {
        Self {
            name: String::new(),
            pointer: ResourcePointer::root(),
            grants: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    /// Construct a child node below `parent_pointer`.
    ///
    /// Rejects names that cannot be a single path segment: the empty string
    /// and names containing `/`.
    pub fn child(parent_pointer: &ResourcePointer, name: &str) -> Result<Self, NodeError> {
        if name.is_empty() {
            return Err(NodeError::EmptyName);
        }
        let pointer = parent_pointer
            .child(name)
            .ok_or_else(|| NodeError::NameContainsSlash(name.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            pointer,
            grants: BTreeMap::new(),
            children: BTreeMap::new(),
        })
    }

    /// The path segment this node represents (empty for the root).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The cached absolute pointer of this node.
    pub fn pointer(&self) -> &ResourcePointer {
        &self.pointer
    }

    /// Look up a direct child by segment name.
    pub fn get(&self, name: &str) -> Option<&PolicyTreeNode> {
        self.children.get(name)
    }

    /// Iterate the direct children.
    pub fn children(&self) -> impl Iterator<Item = &PolicyTreeNode> {
        self.children.values()
    }

    /// The aggregated effect the policy contributes for `subject` at exactly
    /// this path, if any.
    pub fn effect_for(&self, subject: &SubjectId) -> Option<&EffectedPermissions> {
        self.grants.get(subject)
    }

    /// Iterate the subjects with an effect at exactly this path.
    pub fn subject_ids(&self) -> impl Iterator<Item = &SubjectId> {
        self.grants.keys()
    }

    /// Fetch or create the child named `segment`.
    fn child_or_create(&mut self, segment: &str) -> Result<&mut PolicyTreeNode, NodeError> {
        let pointer = self.pointer.clone();
        match self.children.entry(segment.to_string()) {
            Entry::Occupied(existing) => Ok(existing.into_mut()),
            Entry::Vacant(slot) => Ok(slot.insert(PolicyTreeNode::child(&pointer, segment)?)),
        }
    }

    /// Union `effect` into the subject's slot at this node. Contributions
    /// from several entries at the same path aggregate, never overwrite.
    fn merge_effect(&mut self, subject: &SubjectId, effect: &EffectedPermissions) {
        match self.grants.entry(subject.clone()) {
            Entry::Occupied(mut existing) => {
                let merged = existing.get().merged(effect);
                existing.insert(merged);
            }
            Entry::Vacant(slot) => {
                slot.insert(effect.clone());
            }
        }
    }
}

impl PartialEq for PolicyTreeNode {
    fn eq(&self, other: &Self) -> bool {
        // `pointer` is derived from the parent chain and deliberately not
        // part of a node's primary state.
        self.name == other.name && self.grants == other.grants && self.children == other.children
    }
}

impl Eq for PolicyTreeNode {}

/// The frozen permission trie for one policy snapshot: one root per resource
/// type named by the policy's resource keys.
///
/// Built once per [`Policy`]; read-only afterwards, so it is safe to share
/// across threads without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTree {
    roots: BTreeMap<String, PolicyTreeNode>,
}

impl PolicyTree {
    /// Build the tree from a policy snapshot.
    ///
    /// For every entry, every resource, and every subject not expired at
    /// `now`, walks/creates one node per path segment under the resource
    /// type's root and merges the entry's effect at the terminal node.
    /// Expired subjects are skipped as if absent from the policy.
    pub fn build(policy: &Policy, now: DateTime<Utc>) -> Result<PolicyTree, NodeError> {
        let mut roots: BTreeMap<String, PolicyTreeNode> = BTreeMap::new();

        for entry in &policy.entries {
            let active: Vec<_> = entry
                .subjects
                .iter()
                .filter(|subject| {
                    if subject.is_expired(now) {
                        warn!(
                            subject = %subject.id,
                            entry = %entry.label,
                            "skipping expired subject during tree build"
                        );
                        false
                    } else {
                        true
                    }
                })
                .collect();

            for (key, effect) in &entry.resources {
                for subject in &active {
                    let root = roots
                        .entry(key.resource_type().to_string())
                        .or_insert_with(PolicyTreeNode::root);
                    let mut node = root;
                    for segment in key.path().iter() {
                        node = node.child_or_create(segment)?;
                    }
                    node.merge_effect(&subject.id, effect);
                }
            }
        }

        Ok(PolicyTree { roots })
    }

    /// The root node for a resource type, if any entry targets that type.
    pub fn root_for(&self, resource_type: &str) -> Option<&PolicyTreeNode> {
        self.roots.get(resource_type)
    }
}
