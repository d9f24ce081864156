use std::collections::HashSet;

use thiserror::Error;

use crate::policy::Policy;

/// Authoring errors detected before a policy is handed to an enforcer.
///
/// The enforcement core aggregates entry contributions; it never adjudicates
/// conflicts between them. Catching a direct grant/revoke conflict on the
/// identical resource inside a single entry is therefore this validator's
/// job, at authoring time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("policy '{0}' has no entries")]
    NoEntries(String),

    #[error("entry label must not be empty")]
    EmptyLabel,

    #[error("duplicate entry label: '{0}'")]
    DuplicateLabel(String),

    #[error("entry '{0}' names no subjects")]
    NoSubjects(String),

    #[error("entry '{0}' names no resources")]
    NoResources(String),

    #[error("entry '{label}' both grants and revokes {permission} at {resource}")]
    ConflictingEffect {
        label: String,
        resource: String,
        permission: String,
    },
}

/// Check a policy for entry-level authoring mistakes.
pub fn validate(policy: &Policy) -> Result<(), ValidationError> {
    if policy.entries.is_empty() {
        return Err(ValidationError::NoEntries(policy.policy_id.clone()));
    }

    let mut seen = HashSet::new();
    for entry in &policy.entries {
        if entry.label.is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        if !seen.insert(entry.label.as_str()) {
            return Err(ValidationError::DuplicateLabel(entry.label.to_string()));
        }
        if entry.subjects.is_empty() {
            return Err(ValidationError::NoSubjects(entry.label.to_string()));
        }
        if entry.resources.is_empty() {
            return Err(ValidationError::NoResources(entry.label.to_string()));
        }

        for (key, effect) in &entry.resources {
            if let Some(p) = effect.granted.intersection(&effect.revoked).next() {
                return Err(ValidationError::ConflictingEffect {
                    label: entry.label.to_string(),
                    resource: key.to_string(),
                    permission: p.to_string(),
                });
            }
        }
    }

    Ok(())
}
