// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Membership table built from configuration.

use tracing::info;
use warden_acl_core::{GroupId, InMemoryMembership, UserId};
use warden_server_config::{AclConfig, MembershipConfig};

/// Build the membership table declared in `membership.groups`.
pub fn build_membership(acl: &AclConfig, config: &MembershipConfig) -> InMemoryMembership {
	let membership = InMemoryMembership::new(acl.admin_group_id);
	for group in &config.groups {
		let group_id = GroupId::new(group.id);
		membership.add_group(group_id, group.name.clone());
		for member in &group.members {
			membership.add_member(group_id, UserId::new(*member));
		}
		for parent in &group.parents {
			membership.add_parent(group_id, GroupId::new(*parent));
		}
	}
	info!(groups = config.groups.len(), admin_group_id = %acl.admin_group_id, "membership table loaded");
	membership
}
