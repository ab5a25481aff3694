// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for access control.

use std::time::Duration;
use thiserror::Error;

use crate::types::{ActionKey, ObjectKey, UserId};

/// Failures reported by a group membership lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
	/// The provider could not answer.
	#[error("membership provider unavailable: {0}")]
	Unavailable(String),

	/// The provider did not answer within the lookup timeout.
	#[error("membership lookup timed out after {0:?}")]
	TimedOut(Duration),

	/// The caller gave up on the lookup.
	#[error("membership lookup cancelled")]
	Cancelled,
}

/// Errors that can occur while granting or resolving access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclError {
	/// Resolution produced DENY.
	#[error("permission denied for user {user_id} on {object}.{action}")]
	NotAuthorized {
		object: ObjectKey,
		action: ActionKey,
		user_id: UserId,
	},

	/// Access could not be determined because a membership lookup failed.
	#[error("cannot resolve access: {0}")]
	Resolution(#[from] MembershipError),

	/// A grant request was malformed and nothing was recorded.
	#[error("invalid grant: {0}")]
	InvalidGrant(String),
}

impl AclError {
	/// Returns true for failures to decide, as opposed to decisions.
	pub fn is_resolution_failure(&self) -> bool {
		matches!(self, AclError::Resolution(_))
	}
}

/// Result type for access control operations.
pub type Result<T> = std::result::Result<T, AclError>;
