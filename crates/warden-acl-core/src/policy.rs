// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pure precedence rules applied to a single permission record.
//!
//! Given the grants on one (object, action) and the subject's groups:
//!
//! 1. The baseline verdict is DENY.
//! 2. Group grants are combined; DENY from any group beats ALLOW from any
//!    other, whatever order the groups are listed in.
//! 3. An explicit user grant replaces the group verdict outright.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::registry::PermissionRecord;
use crate::types::{GrantKind, GroupId, UserId, Verdict};

/// Why a verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "group_id", rename_all = "snake_case")]
pub enum DecisionReason {
	/// The subject is in the administrators group.
	AdminBypass,
	/// Nothing was ever granted on the object.
	UnknownObject,
	/// Nothing was ever granted for the action on this object.
	UnknownAction,
	/// A grant to one of the subject's groups decided.
	GroupGrant(GroupId),
	/// The subject's own grant decided.
	UserGrant,
	/// The action is declared but no grant applies to the subject.
	NoMatchingGrant,
}

/// A verdict together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
	pub verdict: Verdict,
	#[serde(flatten)]
	pub reason: DecisionReason,
}

impl Decision {
	pub fn new(verdict: Verdict, reason: DecisionReason) -> Self {
		Self { verdict, reason }
	}

	pub fn allow(reason: DecisionReason) -> Self {
		Self::new(Verdict::Allow, reason)
	}

	pub fn deny(reason: DecisionReason) -> Self {
		Self::new(Verdict::Deny, reason)
	}
}

/// Combine the grants of the subject's groups.
///
/// Returns the group kind and the group that decided it, or `None` when no
/// group holds a grant.
pub fn aggregate_groups(
	record: &PermissionRecord,
	groups: &[GroupId],
) -> Option<(GrantKind, GroupId)> {
	let groups: BTreeSet<GroupId> = groups.iter().copied().collect();
	let mut verdict: Option<(GrantKind, GroupId)> = None;

	for (group_id, kind) in record
		.user_groups
		.iter()
		.filter(|(group_id, _)| groups.contains(group_id))
	{
		match kind {
			GrantKind::Deny => return Some((GrantKind::Deny, *group_id)),
			GrantKind::Allow => {
				verdict.get_or_insert((GrantKind::Allow, *group_id));
			}
		}
	}

	verdict
}

/// Decide access on a declared permission.
pub fn evaluate(record: &PermissionRecord, user_id: UserId, groups: &[GroupId]) -> Decision {
	let mut decision = Decision::deny(DecisionReason::NoMatchingGrant);

	if let Some((kind, group_id)) = aggregate_groups(record, groups) {
		decision = Decision::new(kind.into(), DecisionReason::GroupGrant(group_id));
	}

	if let Some(kind) = record.user_kind(user_id) {
		decision = Decision::new(kind.into(), DecisionReason::UserGrant);
	}

	decision
}
