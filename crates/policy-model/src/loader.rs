use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::effected::EffectedPermissions;
use crate::permission::Permissions;
use crate::policy::{Label, Policy, PolicyEntry};
use crate::resource::ResourceKey;
use crate::subject::Subject;
use crate::validator::validate;

/// Serde schema for a YAML policy document.
///
/// Resources are authored as a list of `{ key, granted, revoked }` blocks so
/// that a label can grant and revoke at many paths; blocks naming the same
/// key within one entry are merged.
#[derive(Debug, Deserialize)]
struct PolicyDocument {
    policy_id: String,
    #[serde(default)]
    revision: u64,
    entries: Vec<EntryDocument>,
}

#[derive(Debug, Deserialize)]
struct EntryDocument {
    label: Label,
    subjects: Vec<Subject>,
    resources: Vec<ResourceDocument>,
}

#[derive(Debug, Deserialize)]
struct ResourceDocument {
    key: ResourceKey,
    #[serde(default)]
    granted: Permissions,
    #[serde(default)]
    revoked: Permissions,
}

/// Load a validated [`Policy`] from a YAML file on disk.
pub fn load_policy(path: impl AsRef<Path>) -> Result<Policy> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read policy file: {}", path.display()))?;
    load_policy_from_str(&contents)
        .with_context(|| format!("failed to parse policy file: {}", path.display()))
}

/// Parse and validate a [`Policy`] from a YAML string.
///
/// This is the primary entry point used in tests.
pub fn load_policy_from_str(yaml: &str) -> Result<Policy> {
    let document: PolicyDocument =
        serde_yml::from_str(yaml).context("YAML deserialization failed")?;
    let policy = policy_from_document(document);
    validate(&policy)?;
    Ok(policy)
}

fn policy_from_document(document: PolicyDocument) -> Policy {
    let entries = document
        .entries
        .into_iter()
        .map(|entry| {
            let mut resources: BTreeMap<ResourceKey, EffectedPermissions> = BTreeMap::new();
            for resource in entry.resources {
                let effect = EffectedPermissions::new(resource.granted, resource.revoked);
                resources
                    .entry(resource.key)
                    .and_modify(|existing| *existing = existing.merged(&effect))
                    .or_insert(effect);
            }
            PolicyEntry::new(entry.label, entry.subjects, resources)
        })
        .collect();

    Policy::new(document.policy_id, document.revision, entries)
}
