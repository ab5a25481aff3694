// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group membership lookups.
//!
//! The engine never stores users or groups itself. It asks a
//! [`MembershipProvider`] which groups a user belongs to and whether the user is
//! an administrator. [`InMemoryMembership`] is a provider backed by a nested
//! group table, used by the server binary and by tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::MembershipError;
use crate::types::{GroupId, UserId};

/// Source of truth for user/group membership.
#[async_trait]
pub trait MembershipProvider: Send + Sync {
	/// The group whose members bypass every access check.
	fn admin_group(&self) -> GroupId;

	/// Returns true if the user is a direct or transitive member of the group.
	async fn is_member(&self, group_id: GroupId, user_id: UserId) -> Result<bool, MembershipError>;

	/// Returns every group the user belongs to, directly or transitively.
	async fn groups_of(&self, user_id: UserId) -> Result<Vec<GroupId>, MembershipError>;
}

#[derive(Debug, Clone, Default)]
struct GroupRecord {
	name: String,
	members: BTreeSet<UserId>,
	parents: BTreeSet<GroupId>,
}

/// In-memory membership table with nested groups.
///
/// A group may list parent groups; members of a group are members of all of its
/// ancestors. Cycles in the parent graph are tolerated.
#[derive(Debug)]
pub struct InMemoryMembership {
	admin_group: GroupId,
	groups: RwLock<BTreeMap<GroupId, GroupRecord>>,
}

impl InMemoryMembership {
	/// Create an empty table with the given administrators group.
	pub fn new(admin_group: GroupId) -> Self {
		let mut groups = BTreeMap::new();
		groups.insert(
			admin_group,
			GroupRecord {
				name: "administrators".to_string(),
				..Default::default()
			},
		);
		Self {
			admin_group,
			groups: RwLock::new(groups),
		}
	}

	/// Declare a group, or rename it if it already exists.
	pub fn add_group(&self, group_id: GroupId, name: impl Into<String>) {
		let mut groups = self.groups.write();
		groups.entry(group_id).or_default().name = name.into();
	}

	/// Add a user as a direct member of a group, creating the group if needed.
	pub fn add_member(&self, group_id: GroupId, user_id: UserId) {
		let mut groups = self.groups.write();
		groups.entry(group_id).or_default().members.insert(user_id);
	}

	/// Nest `group_id` inside `parent_id`.
	pub fn add_parent(&self, group_id: GroupId, parent_id: GroupId) {
		let mut groups = self.groups.write();
		groups.entry(parent_id).or_default();
		groups.entry(group_id).or_default().parents.insert(parent_id);
	}

	/// Name of a declared group.
	pub fn group_name(&self, group_id: GroupId) -> Option<String> {
		self.groups.read().get(&group_id).map(|g| g.name.clone())
	}

	fn closure(&self, user_id: UserId) -> BTreeSet<GroupId> {
		let groups = self.groups.read();
		let mut seen = BTreeSet::new();
		let mut queue: VecDeque<GroupId> = groups
			.iter()
			.filter(|(_, g)| g.members.contains(&user_id))
			.map(|(id, _)| *id)
			.collect();

		while let Some(group_id) = queue.pop_front() {
			if !seen.insert(group_id) {
				continue;
			}
			if let Some(group) = groups.get(&group_id) {
				queue.extend(group.parents.iter().copied());
			}
		}

		seen
	}
}

#[async_trait]
impl MembershipProvider for InMemoryMembership {
	fn admin_group(&self) -> GroupId {
		self.admin_group
	}

	async fn is_member(&self, group_id: GroupId, user_id: UserId) -> Result<bool, MembershipError> {
		Ok(self.closure(user_id).contains(&group_id))
	}

	async fn groups_of(&self, user_id: UserId) -> Result<Vec<GroupId>, MembershipError> {
		Ok(self.closure(user_id).into_iter().collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const ADMINS: GroupId = GroupId::new(1);

	#[tokio::test]
	async fn unknown_user_has_no_groups() {
		let membership = InMemoryMembership::new(ADMINS);
		let groups = membership.groups_of(UserId::new(10)).await.unwrap();
		assert!(groups.is_empty());
		assert!(!membership.is_member(ADMINS, UserId::new(10)).await.unwrap());
	}

	#[tokio::test]
	async fn direct_membership_is_reported() {
		let membership = InMemoryMembership::new(ADMINS);
		membership.add_group(GroupId::new(2), "billing");
		membership.add_member(GroupId::new(2), UserId::new(10));

		assert_eq!(
			membership.groups_of(UserId::new(10)).await.unwrap(),
			vec![GroupId::new(2)]
		);
		assert!(membership
			.is_member(GroupId::new(2), UserId::new(10))
			.await
			.unwrap());
		assert_eq!(membership.group_name(GroupId::new(2)).as_deref(), Some("billing"));
	}

	#[tokio::test]
	async fn membership_is_transitive_through_parents() {
		let membership = InMemoryMembership::new(ADMINS);
		membership.add_member(GroupId::new(3), UserId::new(10));
		membership.add_parent(GroupId::new(3), ADMINS);

		assert!(membership.is_member(ADMINS, UserId::new(10)).await.unwrap());
		assert_eq!(
			membership.groups_of(UserId::new(10)).await.unwrap(),
			vec![ADMINS, GroupId::new(3)]
		);
	}

	#[tokio::test]
	async fn parent_cycles_terminate() {
		let membership = InMemoryMembership::new(ADMINS);
		membership.add_member(GroupId::new(4), UserId::new(10));
		membership.add_parent(GroupId::new(4), GroupId::new(5));
		membership.add_parent(GroupId::new(5), GroupId::new(4));

		assert_eq!(
			membership.groups_of(UserId::new(10)).await.unwrap(),
			vec![GroupId::new(4), GroupId::new(5)]
		);
	}

	#[test]
	fn admin_group_is_declared() {
		let membership = InMemoryMembership::new(ADMINS);
		assert_eq!(membership.admin_group(), ADMINS);
		assert_eq!(membership.group_name(ADMINS).as_deref(), Some("administrators"));
	}
}
