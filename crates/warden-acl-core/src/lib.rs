// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access control for Warden.
//!
//! Access is expressed as explicit ALLOW/DENY grants on (object, action) pairs,
//! held by users or groups. The [`AclEngine`] answers whether a subject may
//! perform an action, the [`AclRegistry`] records grants, and the listing
//! functions in [`query`] report what was granted to whom.
//!
//! # Resolution
//!
//! Members of the administrators group are always allowed. Otherwise an
//! undeclared object or action is denied, group grants are combined with DENY
//! winning, and a user's own grant overrides whatever the groups said. The
//! baseline is DENY.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use warden_acl_core::{AclEngine, AclRegistry, GrantKind, GroupId, InMemoryMembership, UserId, Verdict};
//!
//! # tokio_test::block_on(async {
//! let membership = Arc::new(InMemoryMembership::new(GroupId::new(1)));
//! membership.add_member(GroupId::new(2), UserId::new(10));
//!
//! let engine = AclEngine::new(Arc::new(AclRegistry::new()), membership);
//! engine.registry().grant_group(GroupId::new(2), "invoice", "read", GrantKind::Allow);
//!
//! let verdict = engine.resolve(UserId::new(10), "invoice", "read").await.unwrap();
//! assert_eq!(verdict, Verdict::Allow);
//! # });
//! ```

pub mod engine;
pub mod error;
pub mod membership;
pub mod policy;
pub mod query;
pub mod registry;
pub mod types;

pub use engine::{AclEngine, DEFAULT_LOOKUP_TIMEOUT};
pub use error::{AclError, MembershipError, Result};
pub use membership::{InMemoryMembership, MembershipProvider};
pub use policy::{Decision, DecisionReason};
pub use query::{AclObject, AclPermission, GroupGrantEntry, PermissionEntry, UserGrantEntry};
pub use registry::{
	AclRegistry, Grant, GrantSubject, GroupGrant, PermissionLookup, PermissionRecord, UserGrant,
};
pub use types::{ActionKey, GrantKind, GroupId, ObjectKey, UserId, Verdict};
