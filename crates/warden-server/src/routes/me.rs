// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Handlers about the calling user.

use axum::{extract::State, Json};

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::ErrorResponse,
	routes::acl::PermissionsResponse,
};

#[utoipa::path(
    get,
    path = "/api/me/permissions",
    responses(
        (status = 200, description = "Grants held by the caller", body = PermissionsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "acl"
)]
/// List the caller's explicit grants.
///
/// Group grants and administrator status are not reflected; this answers
/// "what was I granted", not "what may I do".
#[tracing::instrument(skip_all)]
pub async fn my_permissions(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Json<PermissionsResponse> {
	let permissions = state.engine.registry().my_permissions(current_user.user_id);
	tracing::debug!(user_id = %current_user.user_id, count = permissions.len(), "listed own grants");
	Json(PermissionsResponse { permissions })
}
