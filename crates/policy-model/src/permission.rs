use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single permission kind that a policy entry may grant or revoke.
///
/// The set of kinds is closed: policies are authored against exactly these
/// verbs, serialised as their uppercase names (`"READ"`, `"WRITE"`,
/// `"EXECUTE"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
    /// Read the resource (and, via view filtering, its sub-fields).
    Read,
    /// Modify or delete the resource.
    Write,
    /// Invoke an action exposed by the resource.
    Execute,
}

impl Permission {
    /// The canonical uppercase name used in policy documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "READ",
            Permission::Write => "WRITE",
            Permission::Execute => "EXECUTE",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of permissions, as required by a query or carried by a
/// policy entry.
pub type Permissions = BTreeSet<Permission>;

/// Convenience constructor for a permission set.
pub fn permissions<I>(perms: I) -> Permissions
where
    I: IntoIterator<Item = Permission>,
{
    perms.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names() {
        assert_eq!(Permission::Read.to_string(), "READ");
        assert_eq!(Permission::Write.to_string(), "WRITE");
        assert_eq!(Permission::Execute.to_string(), "EXECUTE");
    }

    #[test]
    fn set_is_deduplicated_and_ordered() {
        let set = permissions([Permission::Write, Permission::Read, Permission::Write]);
        assert_eq!(set.len(), 2);
        let names: Vec<&str> = set.iter().map(Permission::as_str).collect();
        assert_eq!(names, vec!["READ", "WRITE"]);
    }
}
