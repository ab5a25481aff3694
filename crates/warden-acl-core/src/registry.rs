// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The permission registry.
//!
//! Objects and their permissions are created on first grant and live for the
//! lifetime of the registry. All state sits behind one read-write lock:
//! resolutions and listings share the read side, grants and revocations take
//! the write side, and a reader always clones whole [`PermissionRecord`]s so it
//! never sees half of an update.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::types::{ActionKey, GrantKind, GroupId, ObjectKey, UserId};

/// Grants attached to one (object, action) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionRecord {
	pub users: BTreeMap<UserId, GrantKind>,
	pub user_groups: BTreeMap<GroupId, GrantKind>,
}

impl PermissionRecord {
	/// Explicit grant for a user, if any.
	pub fn user_kind(&self, user_id: UserId) -> Option<GrantKind> {
		self.users.get(&user_id).copied()
	}

	/// Explicit grant for a group, if any.
	pub fn group_kind(&self, group_id: GroupId) -> Option<GrantKind> {
		self.user_groups.get(&group_id).copied()
	}
}

/// Result of looking up one (object, action) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionLookup {
	UnknownObject,
	UnknownAction,
	Found(PermissionRecord),
}

/// Confirmation of a user grant, with keys as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserGrant {
	pub user_id: UserId,
	pub object: ObjectKey,
	pub action: ActionKey,
	pub kind: GrantKind,
}

/// Confirmation of a group grant, with keys as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GroupGrant {
	pub group_id: GroupId,
	pub object: ObjectKey,
	pub action: ActionKey,
	pub kind: GrantKind,
}

/// Holder of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantSubject {
	User(UserId),
	Group(GroupId),
}

/// A grant to apply, for either kind of holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
	pub subject: GrantSubject,
	pub object: ObjectKey,
	pub action: ActionKey,
	pub kind: GrantKind,
}

type ObjectTable = BTreeMap<ObjectKey, BTreeMap<ActionKey, PermissionRecord>>;

fn record_mut<'a>(
	objects: &'a mut ObjectTable,
	object: &ObjectKey,
	action: &ActionKey,
) -> &'a mut PermissionRecord {
	objects
		.entry(object.clone())
		.or_default()
		.entry(action.clone())
		.or_default()
}

/// In-memory table of object/action grants.
#[derive(Debug, Default)]
pub struct AclRegistry {
	pub(crate) objects: RwLock<ObjectTable>,
}

impl AclRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record `kind` for a user on (object, action), replacing any previous kind.
	pub fn grant_user(
		&self,
		user_id: UserId,
		object: impl Into<ObjectKey>,
		action: impl Into<ActionKey>,
		kind: GrantKind,
	) -> UserGrant {
		let object = object.into();
		let action = action.into();
		record_mut(&mut self.objects.write(), &object, &action)
			.users
			.insert(user_id, kind);
		info!(%user_id, %object, %action, %kind, "user grant recorded");
		UserGrant {
			user_id,
			object,
			action,
			kind,
		}
	}

	/// Record `kind` for a group on (object, action), replacing any previous kind.
	pub fn grant_group(
		&self,
		group_id: GroupId,
		object: impl Into<ObjectKey>,
		action: impl Into<ActionKey>,
		kind: GrantKind,
	) -> GroupGrant {
		let object = object.into();
		let action = action.into();
		record_mut(&mut self.objects.write(), &object, &action)
			.user_groups
			.insert(group_id, kind);
		info!(%group_id, %object, %action, %kind, "group grant recorded");
		GroupGrant {
			group_id,
			object,
			action,
			kind,
		}
	}

	/// Record several grants under one write lock.
	///
	/// Readers see either none or all of them. Returns the number applied.
	pub fn apply_grants(&self, grants: &[Grant]) -> usize {
		{
			let mut objects = self.objects.write();
			for grant in grants {
				let record = record_mut(&mut objects, &grant.object, &grant.action);
				match grant.subject {
					GrantSubject::User(user_id) => {
						record.users.insert(user_id, grant.kind);
					}
					GrantSubject::Group(group_id) => {
						record.user_groups.insert(group_id, grant.kind);
					}
				}
			}
		}
		info!(count = grants.len(), "grants applied");
		grants.len()
	}

	/// Remove a user's explicit grant. The object and action stay declared.
	///
	/// Returns true if a grant was removed.
	pub fn revoke_user(
		&self,
		user_id: UserId,
		object: impl Into<ObjectKey>,
		action: impl Into<ActionKey>,
	) -> bool {
		let object = object.into();
		let action = action.into();
		let removed = self
			.objects
			.write()
			.get_mut(&object)
			.and_then(|permissions| permissions.get_mut(&action))
			.map(|record| record.users.remove(&user_id).is_some())
			.unwrap_or(false);
		if removed {
			info!(%user_id, %object, %action, "user grant revoked");
		}
		removed
	}

	/// Remove a group's explicit grant. The object and action stay declared.
	///
	/// Returns true if a grant was removed.
	pub fn revoke_group(
		&self,
		group_id: GroupId,
		object: impl Into<ObjectKey>,
		action: impl Into<ActionKey>,
	) -> bool {
		let object = object.into();
		let action = action.into();
		let removed = self
			.objects
			.write()
			.get_mut(&object)
			.and_then(|permissions| permissions.get_mut(&action))
			.map(|record| record.user_groups.remove(&group_id).is_some())
			.unwrap_or(false);
		if removed {
			info!(%group_id, %object, %action, "group grant revoked");
		}
		removed
	}

	/// Copy out the grants for one (object, action) pair.
	pub fn lookup(&self, object: &ObjectKey, action: &ActionKey) -> PermissionLookup {
		let objects = self.objects.read();
		let Some(permissions) = objects.get(object) else {
			return PermissionLookup::UnknownObject;
		};
		match permissions.get(action) {
			Some(record) => PermissionLookup::Found(record.clone()),
			None => PermissionLookup::UnknownAction,
		}
	}

	/// Number of declared objects.
	pub fn object_count(&self) -> usize {
		self.objects.read().len()
	}
}
