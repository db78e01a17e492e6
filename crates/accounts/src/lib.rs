//! Authentication collaborator for the booking system.
//!
//! Supplies verified user identities to the booking core, which trusts them
//! and never re-derives identity itself. Also carries the credential
//! hashing rules and role-permission reconciliation.

pub mod error;
pub mod password;
pub mod roles;
pub mod service;

pub use error::{AuthError, Result};
pub use roles::{PermissionChanges, PermissionId, reconcile_permissions};
pub use service::{AccountUpdate, AuthService, Credentials, InMemoryAccounts};
