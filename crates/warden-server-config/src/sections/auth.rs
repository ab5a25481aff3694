// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer token table for the bundled authenticator.

use serde::Deserialize;
use std::fmt;

use crate::error::ConfigError;

/// A bearer token and the user it authenticates.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenEntry {
	pub token: String,
	pub user_id: i64,
}

impl fmt::Debug for TokenEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TokenEntry")
			.field("token", &"[REDACTED]")
			.field("user_id", &self.user_id)
			.finish()
	}
}

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
	pub tokens: Vec<TokenEntry>,
}

/// Authentication configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub tokens: Option<Vec<TokenEntry>>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.tokens.is_some() {
			self.tokens = other.tokens;
		}
	}

	pub fn finalize(self) -> Result<AuthConfig, ConfigError> {
		let tokens = self.tokens.unwrap_or_default();
		// Negative ids are reserved for the guest identity.
		if let Some(index) = tokens.iter().position(|entry| entry.user_id < 0) {
			return Err(ConfigError::InvalidValue {
				key: format!("auth.tokens[{index}].user_id"),
				message: format!("must not be negative, got {}", tokens[index].user_id),
			});
		}
		Ok(AuthConfig { tokens })
	}
}
