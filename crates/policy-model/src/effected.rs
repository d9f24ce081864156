use serde::{Deserialize, Serialize};

use crate::permission::{Permission, Permissions};

/// The net effect one policy entry contributes at one resource: a set of
/// granted permissions and a set of revoked permissions.
///
/// Values are immutable once constructed; combining the contributions of
/// several entries at the same resource goes through [`EffectedPermissions::merged`],
/// which unions granted with granted and revoked with revoked. Entries never
/// overwrite one another.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EffectedPermissions {
    /// Permissions the entry grants at the resource.
    #[serde(default)]
    pub granted: Permissions,
    /// Permissions the entry revokes at the resource.
    #[serde(default)]
    pub revoked: Permissions,
}

impl EffectedPermissions {
    /// Create from explicit granted/revoked sets.
    pub fn new(granted: Permissions, revoked: Permissions) -> Self {
        Self { granted, revoked }
    }

    /// Effect that grants the given permissions and revokes nothing.
    pub fn granting<I>(perms: I) -> Self
    where
        I: IntoIterator<Item = Permission>,
    {
        Self {
            granted: perms.into_iter().collect(),
            revoked: Permissions::new(),
        }
    }

    /// Effect that revokes the given permissions and grants nothing.
    pub fn revoking<I>(perms: I) -> Self
    where
        I: IntoIterator<Item = Permission>,
    {
        Self {
            granted: Permissions::new(),
            revoked: perms.into_iter().collect(),
        }
    }

    /// True when neither set contains any permission.
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }

    /// Union this effect with another, producing the aggregate contribution
    /// of both at the same resource.
    pub fn merged(&self, other: &EffectedPermissions) -> EffectedPermissions {
        EffectedPermissions {
            granted: self.granted.union(&other.granted).copied().collect(),
            revoked: self.revoked.union(&other.revoked).copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::permissions;

    #[test]
    fn merged_unions_both_sets() {
        let a = EffectedPermissions::granting([Permission::Read]);
        let b = EffectedPermissions {
            granted: permissions([Permission::Write]),
            revoked: permissions([Permission::Execute]),
        };

        let merged = a.merged(&b);
        assert_eq!(merged.granted, permissions([Permission::Read, Permission::Write]));
        assert_eq!(merged.revoked, permissions([Permission::Execute]));
    }

    #[test]
    fn merged_does_not_overwrite() {
        // Two entries granting the same permission aggregate to one grant.
        let a = EffectedPermissions::granting([Permission::Read]);
        let b = EffectedPermissions::granting([Permission::Read]);
        let merged = a.merged(&b);
        assert_eq!(merged.granted.len(), 1);
        assert!(merged.revoked.is_empty());
    }

    #[test]
    fn default_is_empty() {
        assert!(EffectedPermissions::default().is_empty());
        assert!(!EffectedPermissions::granting([Permission::Read]).is_empty());
    }
}
