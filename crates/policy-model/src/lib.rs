//! # policy-model
//!
//! Value types for digital-twin authorization policies: permissions, subjects,
//! resource keys and pointers, policy entries, and the immutable [`Policy`]
//! document, plus entry-level validation and a YAML document loader.
//!
//! A `Policy` is a snapshot: every mutation helper returns a new value, and
//! the enforcement layer builds one read-only tree per snapshot.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use policy_model::loader;
//!
//! let policy = loader::load_policy("policy.yaml").unwrap();
//! println!("{} entries at revision {}", policy.entries.len(), policy.revision);
//! ```

mod effected;
pub mod loader;
mod permission;
mod pointer;
mod policy;
mod resource;
mod subject;
pub mod validator;

// Re-export primary public API at crate root.
pub use effected::EffectedPermissions;
pub use permission::{permissions, Permission, Permissions};
pub use pointer::ResourcePointer;
pub use policy::{Label, Policy, PolicyEntry};
pub use resource::{ResourceKey, ResourceKeyError};
pub use subject::{AuthorizationContext, Subject, SubjectId};
pub use validator::ValidationError;
