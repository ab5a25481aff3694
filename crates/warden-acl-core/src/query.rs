// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read-only listings over the registry.
//!
//! Listings report explicit grants only. A user's listing does not include
//! what they inherit through groups, and none of these functions compute
//! effective access; use the engine for that.

use serde::{Deserialize, Serialize};

use crate::registry::AclRegistry;
use crate::types::{ActionKey, GrantKind, GroupId, ObjectKey, UserId};

/// One explicit grant, as seen from its holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PermissionEntry {
	pub object: ObjectKey,
	pub action: ActionKey,
	pub kind: GrantKind,
}

/// A user's entry in an [`AclPermission`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserGrantEntry {
	pub user_id: UserId,
	pub kind: GrantKind,
}

/// A group's entry in an [`AclPermission`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GroupGrantEntry {
	pub group_id: GroupId,
	pub kind: GrantKind,
}

/// Every grant recorded for one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AclPermission {
	pub action: ActionKey,
	pub users: Vec<UserGrantEntry>,
	pub user_groups: Vec<GroupGrantEntry>,
}

/// A declared object and all of its actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AclObject {
	pub object: ObjectKey,
	pub permissions: Vec<AclPermission>,
}

impl AclRegistry {
	/// Snapshot of the whole registry, ordered by object then action.
	pub fn list_all(&self) -> Vec<AclObject> {
		let objects = self.objects.read();
		objects
			.iter()
			.map(|(object, permissions)| AclObject {
				object: object.clone(),
				permissions: permissions
					.iter()
					.map(|(action, record)| AclPermission {
						action: action.clone(),
						users: record
							.users
							.iter()
							.map(|(user_id, kind)| UserGrantEntry {
								user_id: *user_id,
								kind: *kind,
							})
							.collect(),
						user_groups: record
							.user_groups
							.iter()
							.map(|(group_id, kind)| GroupGrantEntry {
								group_id: *group_id,
								kind: *kind,
							})
							.collect(),
					})
					.collect(),
			})
			.collect()
	}

	/// Explicit grants held by a user.
	pub fn list_for_user(&self, user_id: UserId) -> Vec<PermissionEntry> {
		let objects = self.objects.read();
		let mut entries = Vec::new();
		for (object, permissions) in objects.iter() {
			for (action, record) in permissions {
				if let Some(kind) = record.user_kind(user_id) {
					entries.push(PermissionEntry {
						object: object.clone(),
						action: action.clone(),
						kind,
					});
				}
			}
		}
		entries
	}

	/// Explicit grants held by a group.
	pub fn list_for_group(&self, group_id: GroupId) -> Vec<PermissionEntry> {
		let objects = self.objects.read();
		let mut entries = Vec::new();
		for (object, permissions) in objects.iter() {
			for (action, record) in permissions {
				if let Some(kind) = record.group_kind(group_id) {
					entries.push(PermissionEntry {
						object: object.clone(),
						action: action.clone(),
						kind,
					});
				}
			}
		}
		entries
	}

	/// What the subject was explicitly granted.
	///
	/// This answers "what was I granted", not "what may I do": group grants
	/// and the administrator bypass are not reflected.
	pub fn my_permissions(&self, subject: UserId) -> Vec<PermissionEntry> {
		self.list_for_user(subject)
	}
}
