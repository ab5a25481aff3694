// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route-level access control.
//!
//! [`RequireAcl`] is a Tower layer that resolves the caller's access to one
//! (object, action) pair before the route runs:
//!
//! - ALLOW: the request proceeds to the handler
//! - DENY: 403 `not_authorized`, naming the object and action
//! - membership lookup failure: 502 `upstream_error`, never a 403
//!
//! The caller is taken from the [`AuthContext`] extension; requests without
//! one are resolved as the guest user. The [`AclEngine`] is read from request
//! extensions, so the router must carry an `Extension(engine)` layer.
//!
//! If the request carries a [`CancellationToken`] extension, the resolution
//! runs under a child of it. Cancelling that token (the server does so on
//! shutdown) aborts lookups still in flight with a 502.
//!
//! # Example
//!
//! ```ignore
//! Router::new()
//!     .route("/api/acl", get(list_all))
//!     .route_layer(RequireAcl::new("acl", "read"));
//! ```

use axum::{
	body::Body,
	http::Request,
	response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tokio_util::sync::CancellationToken;
use tower::{Layer, Service};
use tracing::{debug, error, info, warn};
use warden_acl_core::{AclEngine, AclError, ActionKey, ObjectKey, UserId, Verdict};

use crate::auth_middleware::AuthContext;
use crate::error::ServerError;

/// Route layer that requires access to an (object, action) pair.
#[derive(Debug, Clone)]
pub struct RequireAcl {
	object: ObjectKey,
	action: ActionKey,
}

impl RequireAcl {
	pub fn new(object: impl Into<ObjectKey>, action: impl Into<ActionKey>) -> Self {
		Self {
			object: object.into(),
			action: action.into(),
		}
	}

	pub fn object(&self) -> &ObjectKey {
		&self.object
	}

	pub fn action(&self) -> &ActionKey {
		&self.action
	}
}

impl<S> Layer<S> for RequireAcl {
	type Service = RequireAclService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequireAclService {
			inner,
			object: self.object.clone(),
			action: self.action.clone(),
		}
	}
}

/// Service wrapper for [`RequireAcl`] layer.
#[derive(Debug, Clone)]
pub struct RequireAclService<S> {
	inner: S,
	object: ObjectKey,
	action: ActionKey,
}

impl<S> Service<Request<Body>> for RequireAclService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
	S::Error: Send + 'static,
{
	type Response = Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Response, S::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		// The readied service goes with this request; the clone stays for the next.
		let clone = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, clone);

		let object = self.object.clone();
		let action = self.action.clone();
		let engine = req.extensions().get::<AclEngine>().cloned();
		let cancel = req
			.extensions()
			.get::<CancellationToken>()
			.map(CancellationToken::child_token)
			.unwrap_or_else(CancellationToken::new);
		let user_id = req
			.extensions()
			.get::<AuthContext>()
			.map(AuthContext::subject)
			.unwrap_or(UserId::GUEST);

		Box::pin(async move {
			let Some(engine) = engine else {
				error!(%object, %action, "ACL engine missing from request extensions");
				return Ok(ServerError::Internal("ACL engine not configured".to_string()).into_response());
			};

			match engine
				.resolve_with(user_id, object.as_str(), action.as_str(), &cancel)
				.await
			{
				Ok(Verdict::Allow) => {
					debug!(%user_id, %object, %action, "ACL allowed");
					inner.call(req).await
				}
				Ok(Verdict::Deny) => {
					info!(%user_id, %object, %action, "ACL denied");
					let err = AclError::NotAuthorized {
						object,
						action,
						user_id,
					};
					Ok(ServerError::from(err).into_response())
				}
				Err(e) => {
					warn!(%user_id, %object, %action, error = %e, "ACL resolution failed");
					Ok(ServerError::from(e).into_response())
				}
			}
		})
	}
}
