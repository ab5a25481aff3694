// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request authentication.
//!
//! [`auth_layer`] runs for every request and attaches an [`AuthContext`] to the
//! request extensions. Requests without valid credentials are not rejected
//! here; they continue as the guest user and it is up to the ACL guard or the
//! [`RequireAuth`] extractor to refuse them.
//!
//! Token values are never logged.

use axum::{
	extract::{FromRequestParts, Request, State},
	http::request::Parts,
	middleware::Next,
	response::Response,
};
use http::header::AUTHORIZATION;
use http::HeaderMap;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, instrument};
use warden_acl_core::UserId;
use warden_server_config::AuthConfig;

use crate::api::AppState;
use crate::error::ServerError;

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
	pub user_id: UserId,
}

impl CurrentUser {
	pub fn new(user_id: UserId) -> Self {
		Self { user_id }
	}
}

/// Authentication state for request processing.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	/// Whether the request is authenticated.
	pub is_authenticated: bool,
	/// The current user, if authenticated.
	pub current_user: Option<CurrentUser>,
}

impl AuthContext {
	/// Create a new unauthenticated context.
	pub fn unauthenticated() -> Self {
		Self {
			is_authenticated: false,
			current_user: None,
		}
	}

	/// Create a new authenticated context.
	pub fn authenticated(current_user: CurrentUser) -> Self {
		Self {
			is_authenticated: true,
			current_user: Some(current_user),
		}
	}

	/// Get the current user, if authenticated.
	pub fn user(&self) -> Option<&CurrentUser> {
		self.current_user.as_ref()
	}

	/// The identity access checks run as: the current user, or the guest.
	pub fn subject(&self) -> UserId {
		self.user().map(|user| user.user_id).unwrap_or(UserId::GUEST)
	}

	/// Require authentication, returning the current user or an error.
	pub fn require_user(&self) -> Result<&CurrentUser, ServerError> {
		self.user().ok_or(ServerError::Unauthorized)
	}
}

/// Maps request headers to a user.
pub trait Authenticator: Send + Sync {
	/// Returns the user the request authenticates as, or `None`.
	fn authenticate(&self, headers: &HeaderMap) -> Option<UserId>;
}

/// Authenticates `Authorization: Bearer <token>` against a fixed token table.
#[derive(Clone, Default)]
pub struct BearerTokenAuthenticator {
	tokens: HashMap<String, UserId>,
}

impl fmt::Debug for BearerTokenAuthenticator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BearerTokenAuthenticator")
			.field("tokens", &self.tokens.len())
			.finish()
	}
}

impl BearerTokenAuthenticator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_config(config: &AuthConfig) -> Self {
		let mut authenticator = Self::new();
		for entry in &config.tokens {
			authenticator.insert(entry.token.clone(), UserId::new(entry.user_id));
		}
		authenticator
	}

	/// Register a token, replacing any previous owner.
	pub fn insert(&mut self, token: impl Into<String>, user_id: UserId) {
		self.tokens.insert(token.into(), user_id);
	}

	pub fn with_token(mut self, token: impl Into<String>, user_id: UserId) -> Self {
		self.insert(token, user_id);
		self
	}
}

impl Authenticator for BearerTokenAuthenticator {
	fn authenticate(&self, headers: &HeaderMap) -> Option<UserId> {
		let token = extract_bearer_token(headers)?;
		self.tokens.get(&token).copied()
	}
}

/// Extract bearer token from the Authorization header.
///
/// Expects the format: `Authorization: Bearer <token>`
#[instrument(level = "trace", skip_all)]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	let auth_header = headers.get(AUTHORIZATION)?;
	let auth_str = auth_header.to_str().ok()?;
	auth_str
		.strip_prefix("Bearer ")
		.map(str::trim)
		.filter(|token| !token.is_empty())
		.map(|token| token.to_string())
}

/// Attach an [`AuthContext`] to every request.
pub async fn auth_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
	let ctx = match state.authenticator.authenticate(req.headers()) {
		Some(user_id) => {
			debug!(%user_id, "request authenticated");
			AuthContext::authenticated(CurrentUser::new(user_id))
		}
		None => AuthContext::unauthenticated(),
	};
	req.extensions_mut().insert(ctx);
	next.run(req).await
}

/// Extractor that rejects unauthenticated requests with 401.
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = ServerError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let ctx = parts
			.extensions
			.get::<AuthContext>()
			.ok_or(ServerError::Unauthorized)?;
		Ok(RequireAuth(*ctx.require_user()?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::HeaderValue;

	fn headers(value: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
		headers
	}

	#[test]
	fn extracts_bearer_token() {
		assert_eq!(
			extract_bearer_token(&headers("Bearer abc123")).as_deref(),
			Some("abc123")
		);
	}

	#[test]
	fn ignores_other_schemes() {
		assert!(extract_bearer_token(&headers("Basic dXNlcjpwYXNz")).is_none());
		assert!(extract_bearer_token(&headers("Bearer ")).is_none());
		assert!(extract_bearer_token(&HeaderMap::new()).is_none());
	}

	#[test]
	fn authenticator_maps_known_tokens() {
		let auth = BearerTokenAuthenticator::new().with_token("t-1", UserId::new(1));
		assert_eq!(auth.authenticate(&headers("Bearer t-1")), Some(UserId::new(1)));
		assert_eq!(auth.authenticate(&headers("Bearer t-2")), None);
	}

	#[test]
	fn debug_output_hides_tokens() {
		let auth = BearerTokenAuthenticator::new().with_token("very-secret", UserId::new(1));
		assert!(!format!("{auth:?}").contains("very-secret"));
	}

	#[test]
	fn unauthenticated_subject_is_guest() {
		assert_eq!(AuthContext::unauthenticated().subject(), UserId::GUEST);
		assert!(AuthContext::unauthenticated().require_user().is_err());

		let ctx = AuthContext::authenticated(CurrentUser::new(UserId::new(8)));
		assert_eq!(ctx.subject(), UserId::new(8));
		assert!(ctx.is_authenticated);
	}
}
