use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The identifier of an authorization principal, e.g. `google:alice` or a
/// device/service identity string.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An authorization principal named by a policy entry: an id plus an optional
/// descriptive type and an optional expiry instant.
///
/// A subject whose expiry lies in the past contributes nothing at evaluation
/// time; the tree builder treats it as absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subject {
    pub id: SubjectId,
    /// Free-form provenance marker, e.g. `"generated"` or the issuing realm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_type: Option<String>,
    /// Instant after which the subject no longer holds any of the entry's
    /// permissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Subject {
    pub fn new(id: impl Into<SubjectId>) -> Self {
        Self {
            id: id.into(),
            subject_type: None,
            expiry: None,
        }
    }

    /// The same subject with an expiry attached.
    pub fn expiring_at(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// True when the subject's expiry lies at or before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }
}

/// The set of subject ids a caller presents with a request.
///
/// Evaluation treats the context as a plain unordered set: a permission is
/// held if the combined grants of all contained subjects cover it (minus any
/// revokes, which also combine).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AuthorizationContext {
    subject_ids: BTreeSet<SubjectId>,
}

impl AuthorizationContext {
    pub fn new<I, S>(subject_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SubjectId>,
    {
        Self {
            subject_ids: subject_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subject_ids.is_empty()
    }

    pub fn contains(&self, id: &SubjectId) -> bool {
        self.subject_ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubjectId> {
        self.subject_ids.iter()
    }
}

impl FromIterator<SubjectId> for AuthorizationContext {
    fn from_iter<I: IntoIterator<Item = SubjectId>>(iter: I) -> Self {
        Self {
            subject_ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn subject_without_expiry_never_expires() {
        let s = Subject::new("google:alice");
        assert!(!s.is_expired(Utc::now()));
    }

    #[test]
    fn subject_expiry_boundary() {
        let now = Utc::now();
        let s = Subject::new("device:sensor-1").expiring_at(now);
        // Expiry at exactly `now` counts as expired.
        assert!(s.is_expired(now));
        assert!(!s.is_expired(now - Duration::seconds(1)));
    }

    #[test]
    fn context_deduplicates() {
        let ctx = AuthorizationContext::new(["u1", "u2", "u1"]);
        assert_eq!(ctx.iter().count(), 2);
        assert!(ctx.contains(&SubjectId::new("u1")));
        assert!(!ctx.contains(&SubjectId::new("u3")));
    }
}
