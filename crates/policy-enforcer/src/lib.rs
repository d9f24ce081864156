//! # policy-enforcer
//!
//! The enforcement core for digital-twin authorization: builds a frozen
//! permission trie from a [`policy_model::Policy`] snapshot and answers
//! permission queries against it — boolean checks, partial checks, filtered
//! JSON views, and subject fan-out resolution.
//!
//! The tree is built once per policy snapshot and is immutable afterwards;
//! all queries are pure reads, so one [`Enforcer`] can serve any number of
//! concurrent readers. Absent policy data always resolves to a negative
//! result, never an error.
//!
//! ## Quick start
//!
//! ```rust
//! use policy_enforcer::Enforcer;
//! use policy_model::{loader, permissions, AuthorizationContext, Permission, ResourceKey};
//!
//! let policy = loader::load_policy_from_str(r#"
//! policy_id: "ns:thing-1"
//! entries:
//!   - label: owner
//!     subjects:
//!       - id: "google:alice"
//!     resources:
//!       - key: "thing:/"
//!         granted: [READ, WRITE]
//! "#).unwrap();
//!
//! let enforcer = Enforcer::new(&policy).unwrap();
//! let alice = AuthorizationContext::new(["google:alice"]);
//! let features = ResourceKey::parse("thing:/features").unwrap();
//! assert!(enforcer.has_permission(&features, &alice, &permissions([Permission::Read])));
//! ```

mod enforcer;
mod tree;

// Re-export primary public API at crate root.
pub use enforcer::Enforcer;
pub use tree::{NodeError, PolicyTree, PolicyTreeNode};
