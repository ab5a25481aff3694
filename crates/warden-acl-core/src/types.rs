// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for access control.
//!
//! - **ID newtypes**: [`UserId`] and [`GroupId`] keep user and group identifiers
//!   from being mixed up. [`UserId::GUEST`] is the reserved identity of
//!   unauthenticated callers.
//! - **Keys**: [`ObjectKey`] and [`ActionKey`] are normalized to lowercase on
//!   construction, so every comparison made with them is case-insensitive.
//! - **Polarity**: [`GrantKind`] is what a grant declares, [`Verdict`] is what
//!   the resolver answers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AclError;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(
			Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
		)]
		#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
		#[serde(transparent)]
		pub struct $name(i64);

		impl $name {
			/// Create a new ID from its integer value.
			pub const fn new(id: i64) -> Self {
				Self(id)
			}

			/// Get the inner integer value.
			pub const fn into_inner(self) -> i64 {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<i64> for $name {
			fn from(id: i64) -> Self {
				Self(id)
			}
		}

		impl From<$name> for i64 {
			fn from(id: $name) -> Self {
				id.0
			}
		}

		impl FromStr for $name {
			type Err = std::num::ParseIntError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Ok(Self(s.trim().parse()?))
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(GroupId, "Unique identifier for a user group.");

impl UserId {
	/// Identity used for callers that did not authenticate.
	///
	/// Real user ids are never negative, so the guest can only gain access
	/// through grants made explicitly to this id.
	pub const GUEST: UserId = UserId(-1);

	/// Returns true if this is the guest identity.
	pub fn is_guest(&self) -> bool {
		*self == Self::GUEST
	}
}

// =============================================================================
// Keys
// =============================================================================

macro_rules! define_key_type {
	($name:ident, $label:literal, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
		#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			/// Create a key, lowercasing the input.
			pub fn new(key: impl AsRef<str>) -> Self {
				Self(key.as_ref().to_lowercase())
			}

			/// Create a key from untrusted input, rejecting blank values.
			pub fn parse(key: &str) -> Result<Self, AclError> {
				if key.trim().is_empty() {
					return Err(AclError::InvalidGrant(format!(
						"{} must not be empty",
						$label
					)));
				}
				Ok(Self::new(key))
			}

			/// The normalized key.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<&str> for $name {
			fn from(key: &str) -> Self {
				Self::new(key)
			}
		}

		impl From<String> for $name {
			fn from(key: String) -> Self {
				Self::new(key)
			}
		}

		impl<'de> Deserialize<'de> for $name {
			fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
			where
				D: serde::Deserializer<'de>,
			{
				String::deserialize(deserializer).map(Self::new)
			}
		}

		impl From<&$name> for $name {
			fn from(key: &$name) -> Self {
				key.clone()
			}
		}
	};
}

define_key_type!(
	ObjectKey,
	"object",
	"Case-insensitive identifier of a protected object, e.g. `invoice`."
);
define_key_type!(
	ActionKey,
	"action",
	"Case-insensitive name of an action on an object, e.g. `read`."
);

// =============================================================================
// Grant Kind
// =============================================================================

/// Polarity of a single grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum GrantKind {
	/// Grants the action.
	#[default]
	Allow,
	/// Refuses the action.
	Deny,
}

impl GrantKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			GrantKind::Allow => "ALLOW",
			GrantKind::Deny => "DENY",
		}
	}
}

impl fmt::Display for GrantKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for GrantKind {
	type Err = AclError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"ALLOW" => Ok(GrantKind::Allow),
			"DENY" => Ok(GrantKind::Deny),
			_ => Err(AclError::InvalidGrant(format!(
				"unknown grant kind '{s}', expected ALLOW or DENY"
			))),
		}
	}
}

// =============================================================================
// Verdict
// =============================================================================

/// Outcome of resolving a (subject, object, action) query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
	Allow,
	Deny,
}

impl Verdict {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Verdict::Allow)
	}
}

impl From<GrantKind> for Verdict {
	fn from(kind: GrantKind) -> Self {
		match kind {
			GrantKind::Allow => Verdict::Allow,
			GrantKind::Deny => Verdict::Deny,
		}
	}
}

impl fmt::Display for Verdict {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Verdict::Allow => write!(f, "ALLOW"),
			Verdict::Deny => write!(f, "DENY"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	mod ids {
		use super::*;

		#[test]
		fn guest_is_negative_and_distinct() {
			assert_eq!(UserId::GUEST.into_inner(), -1);
			assert!(UserId::GUEST.is_guest());
			assert!(!UserId::new(0).is_guest());
			assert!(!UserId::new(1).is_guest());
		}

		#[test]
		fn ids_parse_from_path_segments() {
			assert_eq!("42".parse::<UserId>().unwrap(), UserId::new(42));
			assert_eq!(" 7 ".parse::<GroupId>().unwrap(), GroupId::new(7));
			assert!("abc".parse::<UserId>().is_err());
		}

		#[test]
		fn ids_serialize_as_plain_integers() {
			assert_eq!(serde_json::to_string(&UserId::new(5)).unwrap(), "5");
			let id: GroupId = serde_json::from_str("12").unwrap();
			assert_eq!(id, GroupId::new(12));
		}
	}

	mod keys {
		use super::*;

		#[test]
		fn keys_are_lowercased() {
			assert_eq!(ObjectKey::new("Invoice").as_str(), "invoice");
			assert_eq!(ActionKey::from("READ").as_str(), "read");
			assert_eq!(ObjectKey::new("/Auth/Invite"), ObjectKey::new("/auth/invite"));
		}

		#[test]
		fn parse_rejects_blank_keys() {
			assert!(matches!(ObjectKey::parse(""), Err(AclError::InvalidGrant(_))));
			assert!(matches!(ActionKey::parse("   "), Err(AclError::InvalidGrant(_))));
			assert_eq!(ActionKey::parse("Write").unwrap().as_str(), "write");
		}

		#[test]
		fn deserialization_normalizes() {
			let key: ObjectKey = serde_json::from_str("\"Report\"").unwrap();
			assert_eq!(key.as_str(), "report");
		}
	}

	mod grant_kind {
		use super::*;

		#[test]
		fn default_is_allow() {
			assert_eq!(GrantKind::default(), GrantKind::Allow);
		}

		#[test]
		fn parses_case_insensitively() {
			assert_eq!("allow".parse::<GrantKind>().unwrap(), GrantKind::Allow);
			assert_eq!("Deny".parse::<GrantKind>().unwrap(), GrantKind::Deny);
			assert_eq!("DENY".parse::<GrantKind>().unwrap(), GrantKind::Deny);
		}

		#[test]
		fn rejects_unknown_kinds() {
			let err = "maybe".parse::<GrantKind>().unwrap_err();
			assert!(matches!(err, AclError::InvalidGrant(_)));
			assert!("".parse::<GrantKind>().is_err());
		}

		#[test]
		fn wire_form_is_uppercase() {
			assert_eq!(serde_json::to_string(&GrantKind::Deny).unwrap(), "\"DENY\"");
			assert_eq!(serde_json::to_string(&Verdict::Allow).unwrap(), "\"ALLOW\"");
			assert_eq!(GrantKind::Allow.to_string(), "ALLOW");
		}

		#[test]
		fn verdict_follows_kind() {
			assert_eq!(Verdict::from(GrantKind::Allow), Verdict::Allow);
			assert_eq!(Verdict::from(GrantKind::Deny), Verdict::Deny);
			assert!(Verdict::Allow.is_allowed());
			assert!(!Verdict::Deny.is_allowed());
		}
	}
}
