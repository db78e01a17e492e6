//! Role-permission reconciliation.
//!
//! Bringing a role's permission list in line with a desired list is two set
//! differences; there is no concurrency concern here. A missing desired
//! list means "revoke everything", never an error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identifier of a permission entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(i64);

impl PermissionId {
    /// Creates a permission id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for PermissionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// The grants and revocations needed to reach a desired permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionChanges {
    /// Permissions to add: desired minus current.
    pub grant: Vec<PermissionId>,

    /// Permissions to remove: current minus desired.
    pub revoke: Vec<PermissionId>,
}

impl PermissionChanges {
    /// Returns true if nothing needs to change.
    pub fn is_empty(&self) -> bool {
        self.grant.is_empty() && self.revoke.is_empty()
    }

    /// Total number of grant and revoke operations.
    pub fn len(&self) -> usize {
        self.grant.len() + self.revoke.len()
    }
}

/// Computes the changes that turn `current` into `desired`.
///
/// A `None` desired set is treated as empty.
pub fn reconcile_permissions(
    current: &BTreeSet<PermissionId>,
    desired: Option<&BTreeSet<PermissionId>>,
) -> PermissionChanges {
    let empty = BTreeSet::new();
    let desired = desired.unwrap_or(&empty);

    PermissionChanges {
        grant: desired.difference(current).copied().collect(),
        revoke: current.difference(desired).copied().collect(),
    }
}
