// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Warden HTTP server.
//!
//! Exposes grant administration and listings over HTTP and protects its own
//! routes with the same access-control engine it administers.

pub mod acl_middleware;
pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod error;
pub mod routes;
pub mod seed;

pub use acl_middleware::{RequireAcl, RequireAclService};
pub use api::{create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use auth_middleware::{AuthContext, Authenticator, BearerTokenAuthenticator, CurrentUser};
pub use error::{ErrorResponse, ServerError};
pub use warden_server_config::ServerConfig;
