// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access control configuration: administrators group, lookup bound and seed
//! grants applied at startup.

use serde::Deserialize;
use std::time::Duration;
use warden_acl_core::{ActionKey, Grant, GrantKind, GrantSubject, GroupId, ObjectKey, UserId};

use crate::error::ConfigError;

const DEFAULT_ADMIN_GROUP_ID: i64 = 1;
const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5000;

/// Who a seed grant is for, as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
	User,
	Group,
}

/// A seed grant as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedGrantEntry {
	pub subject: SubjectKind,
	pub id: i64,
	pub object: String,
	pub action: String,
	#[serde(default)]
	pub kind: Option<String>,
}

impl SeedGrantEntry {
	fn resolve(self, index: usize) -> Result<Grant, ConfigError> {
		let key = format!("acl.grants[{index}]");
		let invalid = |e: warden_acl_core::AclError| ConfigError::InvalidValue {
			key: key.clone(),
			message: e.to_string(),
		};

		let object = ObjectKey::parse(&self.object).map_err(invalid)?;
		let action = ActionKey::parse(&self.action).map_err(invalid)?;
		let kind = match self.kind.as_deref() {
			Some(kind) => kind.parse::<GrantKind>().map_err(invalid)?,
			None => GrantKind::default(),
		};
		let subject = match self.subject {
			SubjectKind::User => GrantSubject::User(UserId::new(self.id)),
			SubjectKind::Group => GrantSubject::Group(GroupId::new(self.id)),
		};

		Ok(Grant {
			subject,
			object,
			action,
			kind,
		})
	}
}

/// Access control configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AclConfig {
	pub admin_group_id: GroupId,
	pub lookup_timeout: Duration,
	pub grants: Vec<Grant>,
}

impl Default for AclConfig {
	fn default() -> Self {
		Self {
			admin_group_id: GroupId::new(DEFAULT_ADMIN_GROUP_ID),
			lookup_timeout: Duration::from_millis(DEFAULT_LOOKUP_TIMEOUT_MS),
			grants: Vec::new(),
		}
	}
}

/// Access control configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AclConfigLayer {
	#[serde(default)]
	pub admin_group_id: Option<i64>,
	#[serde(default)]
	pub lookup_timeout_ms: Option<u64>,
	#[serde(default)]
	pub grants: Option<Vec<SeedGrantEntry>>,
}

impl AclConfigLayer {
	pub fn merge(&mut self, other: AclConfigLayer) {
		if other.admin_group_id.is_some() {
			self.admin_group_id = other.admin_group_id;
		}
		if other.lookup_timeout_ms.is_some() {
			self.lookup_timeout_ms = other.lookup_timeout_ms;
		}
		if other.grants.is_some() {
			self.grants = other.grants;
		}
	}

	pub fn finalize(self) -> Result<AclConfig, ConfigError> {
		let lookup_timeout_ms = self.lookup_timeout_ms.unwrap_or(DEFAULT_LOOKUP_TIMEOUT_MS);
		if lookup_timeout_ms == 0 {
			return Err(ConfigError::InvalidValue {
				key: "acl.lookup_timeout_ms".to_string(),
				message: "must be greater than zero".to_string(),
			});
		}

		let grants = self
			.grants
			.unwrap_or_default()
			.into_iter()
			.enumerate()
			.map(|(index, entry)| entry.resolve(index))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(AclConfig {
			admin_group_id: GroupId::new(self.admin_group_id.unwrap_or(DEFAULT_ADMIN_GROUP_ID)),
			lookup_timeout: Duration::from_millis(lookup_timeout_ms),
			grants,
		})
	}
}
