// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router.

use axum::{
	middleware,
	routing::{delete, get, post},
	Extension, Router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use warden_acl_core::{AclEngine, AclRegistry};
use warden_server_config::ServerConfig;

use crate::{
	acl_middleware::RequireAcl,
	auth_middleware::{auth_layer, Authenticator, BearerTokenAuthenticator},
	routes, seed,
};

/// Object guarding the ACL administration endpoints.
pub const ACL_OBJECT: &str = "acl";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	pub engine: AclEngine,
	pub authenticator: Arc<dyn Authenticator>,
	/// Cancelled on shutdown; access checks in flight resolve under a child of it.
	pub shutdown: CancellationToken,
}

impl AppState {
	pub fn new(engine: AclEngine, authenticator: Arc<dyn Authenticator>) -> Self {
		Self {
			engine,
			authenticator,
			shutdown: CancellationToken::new(),
		}
	}
}

/// Build state from configuration: membership table, engine, seed grants and
/// bearer tokens.
pub fn create_app_state(config: &ServerConfig) -> AppState {
	let membership = seed::build_membership(&config.acl, &config.membership);
	let registry = Arc::new(AclRegistry::new());
	registry.apply_grants(&config.acl.grants);

	let engine = AclEngine::new(registry, Arc::new(membership))
		.with_lookup_timeout(config.acl.lookup_timeout);
	let authenticator = BearerTokenAuthenticator::from_config(&config.auth);

	AppState::new(engine, Arc::new(authenticator))
}

fn acl_read() -> RequireAcl {
	RequireAcl::new(ACL_OBJECT, "read")
}

fn acl_write() -> RequireAcl {
	RequireAcl::new(ACL_OBJECT, "write")
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/api/openapi.json", get(routes::health::openapi_spec))
		.route("/api/me/permissions", get(routes::me::my_permissions))
		.route(
			"/api/acl",
			get(routes::acl::list_all).route_layer(acl_read()),
		)
		.route(
			"/api/acl/users/{user_id}",
			get(routes::acl::list_user_grants)
				.route_layer(acl_read())
				.merge(post(routes::acl::grant_user).route_layer(acl_write())),
		)
		.route(
			"/api/acl/groups/{group_id}",
			get(routes::acl::list_group_grants)
				.route_layer(acl_read())
				.merge(post(routes::acl::grant_group).route_layer(acl_write())),
		)
		.route(
			"/api/acl/users/{user_id}/{object}/{action}",
			delete(routes::acl::revoke_user_grant).route_layer(acl_write()),
		)
		.route(
			"/api/acl/groups/{group_id}/{object}/{action}",
			delete(routes::acl::revoke_group_grant).route_layer(acl_write()),
		)
		.layer(middleware::from_fn_with_state(state.clone(), auth_layer))
		.layer(Extension(state.engine.clone()))
		.layer(Extension(state.shutdown.clone()))
		.with_state(state)
}
