// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group table for the bundled membership provider.

use serde::Deserialize;

/// A group declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupEntry {
	pub id: i64,
	pub name: String,
	#[serde(default)]
	pub members: Vec<i64>,
	#[serde(default)]
	pub parents: Vec<i64>,
}

/// Membership configuration (runtime, fully resolved).
#[derive(Debug, Clone, Default)]
pub struct MembershipConfig {
	pub groups: Vec<GroupEntry>,
}

impl MembershipConfig {
	/// Returns true if the group is declared directly or named as a parent.
	pub fn declares(&self, group_id: i64) -> bool {
		self
			.groups
			.iter()
			.any(|g| g.id == group_id || g.parents.contains(&group_id))
	}
}

/// Membership configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipConfigLayer {
	#[serde(default)]
	pub groups: Option<Vec<GroupEntry>>,
}

impl MembershipConfigLayer {
	pub fn merge(&mut self, other: MembershipConfigLayer) {
		if other.groups.is_some() {
			self.groups = other.groups;
		}
	}

	pub fn finalize(self) -> MembershipConfig {
		MembershipConfig {
			groups: self.groups.unwrap_or_default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_by_default() {
		let config = MembershipConfigLayer::default().finalize();
		assert!(config.groups.is_empty());
		assert!(!config.declares(1));
	}

	#[test]
	fn test_parse_groups() {
		let layer: MembershipConfigLayer = toml::from_str(
			r#"
			[[groups]]
			id = 2
			name = "billing"
			members = [10, 11]

			[[groups]]
			id = 3
			name = "auditors"
			parents = [2]
			"#,
		)
		.unwrap();
		let config = layer.finalize();
		assert_eq!(config.groups.len(), 2);
		assert_eq!(config.groups[0].members, vec![10, 11]);
		assert!(config.groups[1].members.is_empty());
		assert_eq!(config.groups[1].parents, vec![2]);
		assert!(config.declares(3));
		assert!(config.declares(2));
	}

	#[test]
	fn test_parent_only_group_is_declared() {
		let config = MembershipConfig {
			groups: vec![GroupEntry {
				id: 5,
				name: "contractors".to_string(),
				members: vec![20],
				parents: vec![9],
			}],
		};
		assert!(config.declares(5));
		assert!(config.declares(9));
		assert!(!config.declares(20));
	}
}
