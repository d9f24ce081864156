use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use policy_model::{
    AuthorizationContext, Permissions, Policy, ResourceKey, SubjectId,
};

use crate::tree::{NodeError, PolicyTree, PolicyTreeNode};

/// Granted/revoked permissions accumulated along a root-to-target walk.
#[derive(Debug, Default)]
struct Effective {
    granted: Permissions,
    revoked: Permissions,
}

impl Effective {
    /// Fold one node's contribution for every subject in the context.
    fn absorb(&mut self, node: &PolicyTreeNode, context: &AuthorizationContext) {
        for subject in context.iter() {
            if let Some(effect) = node.effect_for(subject) {
                self.granted.extend(effect.granted.iter().copied());
                self.revoked.extend(effect.revoked.iter().copied());
            }
        }
    }

    /// A permission is held iff it was granted somewhere on the path and
    /// revoked nowhere on it. An empty requirement is never satisfied.
    fn covers(&self, required: &Permissions) -> bool {
        !required.is_empty()
            && required
                .iter()
                .all(|p| self.granted.contains(p) && !self.revoked.contains(p))
    }
}

/// The read-only permission evaluator for one policy snapshot.
///
/// Built once per [`Policy`]; every query is a pure function over the frozen
/// tree plus call-supplied arguments, so a single enforcer can serve
/// concurrent readers without locking. Callers replace the enforcer whenever
/// the underlying policy changes.
#[derive(Debug, Clone)]
pub struct Enforcer {
    tree: PolicyTree,
}

impl Enforcer {
    /// Build an enforcer for `policy`, treating subjects expired as of the
    /// current instant as absent.
    pub fn new(policy: &Policy) -> Result<Self, NodeError> {
        Self::new_at(policy, Utc::now())
    }

    /// Build an enforcer evaluating subject expiry against an explicit
    /// instant.
    pub fn new_at(policy: &Policy, now: DateTime<Utc>) -> Result<Self, NodeError> {
        Ok(Self {
            tree: PolicyTree::build(policy, now)?,
        })
    }

    /// The underlying frozen tree.
    pub fn tree(&self) -> &PolicyTree {
        &self.tree
    }

    /// Decide whether the context holds every permission in `required` on
    /// the resource addressed by `key`.
    ///
    /// Grants and revokes accumulate from the root down to the deepest node
    /// matching the key's path; segments deeper than any defined node inherit
    /// from that ancestor. A permission is held iff granted somewhere on the
    /// path and revoked nowhere on it, so a revoke at any level vetoes a
    /// grant at any other. Unknown keys, unknown subjects, and an empty
    /// requirement all resolve to `false`.
    pub fn has_permission(
        &self,
        key: &ResourceKey,
        context: &AuthorizationContext,
        required: &Permissions,
    ) -> bool {
        debug!(key = %key, "evaluating permission check");
        self.effective_at(key, context).covers(required)
    }

    /// Decide whether the context holds `required` on `key` itself or on at
    /// least one resource below it — i.e. whether a filtered view of the
    /// resource would be non-empty.
    pub fn has_partial_permission(
        &self,
        key: &ResourceKey,
        context: &AuthorizationContext,
        required: &Permissions,
    ) -> bool {
        debug!(key = %key, "evaluating partial permission check");
        let (path, exhausted) = self.matched_path(key);

        let mut effective = Effective::default();
        for node in &path {
            effective.absorb(node, context);
        }
        if effective.covers(required) {
            return true;
        }

        // When the key runs past the defined tree, everything below it
        // inherits the same (insufficient) effective set.
        if !exhausted {
            return false;
        }
        match path.last() {
            Some(terminal) => terminal
                .children()
                .any(|child| descendant_covers(child, &effective, context, required)),
            None => false,
        }
    }

    /// Filter `json` down to the fields the context may access with
    /// `required` (typically READ), evaluated against the resource rooted at
    /// `key`.
    ///
    /// Every level re-evaluates the full-path check: a parent without a
    /// grant of its own does not hide a child that has one deeper in the
    /// tree, while a revoke anywhere on the path hides the field regardless
    /// of deeper grants. Returns an empty object when nothing is visible.
    ///
    /// A non-empty object whose fields all fail the check is pruned
    /// entirely rather than kept as an empty object, even where its own
    /// path is granted; only objects authored empty survive on their own
    /// grant. Field names are opaque segments — a name containing `/` (or
    /// the empty string) addresses no policy resource and is always
    /// omitted.
    pub fn build_json_view(
        &self,
        key: &ResourceKey,
        json: &Value,
        context: &AuthorizationContext,
        required: &Permissions,
    ) -> Value {
        debug!(key = %key, "building filtered JSON view");
        match json {
            Value::Object(fields) => {
                Value::Object(self.filter_object(key, fields, context, required))
            }
            // Non-object roots are all-or-nothing.
            other => {
                if self.has_permission(key, context, required) {
                    other.clone()
                } else {
                    Value::Object(Map::new())
                }
            }
        }
    }

    /// The inverse query: every subject with an entry anywhere on the
    /// root-to-`key` path that holds all of `required` there.
    pub fn subject_ids_with_permission(
        &self,
        key: &ResourceKey,
        required: &Permissions,
    ) -> BTreeSet<SubjectId> {
        debug!(key = %key, "resolving subjects with permission");
        let (path, _) = self.matched_path(key);

        let candidates: BTreeSet<&SubjectId> =
            path.iter().flat_map(|node| node.subject_ids()).collect();

        candidates
            .into_iter()
            .filter(|subject| {
                let context = AuthorizationContext::new([(*subject).clone()]);
                self.has_permission(key, &context, required)
            })
            .cloned()
            .collect()
    }

    /// Nodes matched along the key's path, root-first, plus whether every
    /// segment of the key found a node.
    fn matched_path<'a>(&'a self, key: &ResourceKey) -> (Vec<&'a PolicyTreeNode>, bool) {
        let mut path = Vec::new();
        let Some(root) = self.tree.root_for(key.resource_type()) else {
            return (path, false);
        };
        path.push(root);

        let mut node = root;
        for segment in key.path().iter() {
            match node.get(segment) {
                Some(child) => {
                    trace!(node = %child.pointer(), "descending policy tree");
                    path.push(child);
                    node = child;
                }
                None => return (path, false),
            }
        }
        (path, true)
    }

    fn effective_at(&self, key: &ResourceKey, context: &AuthorizationContext) -> Effective {
        let (path, _) = self.matched_path(key);
        let mut effective = Effective::default();
        for node in path {
            effective.absorb(node, context);
        }
        effective
    }

    fn filter_object(
        &self,
        key: &ResourceKey,
        fields: &Map<String, Value>,
        context: &AuthorizationContext,
        required: &Permissions,
    ) -> Map<String, Value> {
        let mut visible = Map::new();
        for (field, value) in fields {
            // Each field name is one opaque segment. A name that cannot form
            // a segment (empty, or containing `/`) is not addressable by any
            // policy entry and would otherwise alias a different resource's
            // path; omit it.
            let Some(child_key) = key.child(field) else {
                continue;
            };
            match value {
                Value::Object(inner) => {
                    let filtered = self.filter_object(&child_key, inner, context, required);
                    if !filtered.is_empty() {
                        visible.insert(field.clone(), Value::Object(filtered));
                    } else if inner.is_empty()
                        && self.has_permission(&child_key, context, required)
                    {
                        // An authored-empty object is a leaf.
                        visible.insert(field.clone(), Value::Object(Map::new()));
                    }
                }
                leaf => {
                    if self.has_permission(&child_key, context, required) {
                        visible.insert(field.clone(), leaf.clone());
                    }
                }
            }
        }
        visible
    }
}

/// Depth-first search for a descendant at which the inherited effective set
/// plus the nodes on the way down covers `required`.
fn descendant_covers(
    node: &PolicyTreeNode,
    inherited: &Effective,
    context: &AuthorizationContext,
    required: &Permissions,
) -> bool {
    let mut effective = Effective {
        granted: inherited.granted.clone(),
        revoked: inherited.revoked.clone(),
    };
    effective.absorb(node, context);
    if effective.covers(required) {
        return true;
    }
    node.children()
        .any(|child| descendant_covers(child, &effective, context, required))
}
