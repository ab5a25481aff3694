// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ACL administration handlers.
//!
//! Reads require `acl.read`, grants and revocations require `acl.write`. The
//! guards are attached in [`create_router`](crate::api::create_router); the
//! handlers assume access was already checked.

use axum::{
	extract::{rejection::JsonRejection, Path, State},
	http::StatusCode,
	Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use warden_acl_core::{
	AclObject, ActionKey, GrantKind, GroupGrant, GroupId, ObjectKey, PermissionEntry, UserGrant,
	UserId,
};

use crate::{
	api::AppState,
	error::{ErrorResponse, ServerError},
};

/// Body of a grant request. `kind` defaults to ALLOW.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GrantRequest {
	pub object: String,
	pub action: String,
	#[serde(default)]
	pub kind: Option<String>,
}

impl GrantRequest {
	fn parse(&self) -> Result<(ObjectKey, ActionKey, GrantKind), ServerError> {
		let object = ObjectKey::parse(&self.object)?;
		let action = ActionKey::parse(&self.action)?;
		let kind = match self.kind.as_deref() {
			Some(kind) => kind.parse::<GrantKind>()?,
			None => GrantKind::default(),
		};
		Ok((object, action, kind))
	}
}

/// Full registry snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AclListResponse {
	pub objects: Vec<AclObject>,
}

/// Explicit grants held by one user or group.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PermissionsResponse {
	pub permissions: Vec<PermissionEntry>,
}

fn parse_user_id(raw: &str) -> Result<UserId, ServerError> {
	raw.parse()
		.map_err(|_| ServerError::BadRequest(format!("invalid user id '{raw}'")))
}

fn parse_group_id(raw: &str) -> Result<GroupId, ServerError> {
	raw.parse()
		.map_err(|_| ServerError::BadRequest(format!("invalid group id '{raw}'")))
}

fn grant_body(payload: Result<Json<GrantRequest>, JsonRejection>) -> Result<GrantRequest, ServerError> {
	payload
		.map(|Json(body)| body)
		.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

#[utoipa::path(
    get,
    path = "/api/acl",
    responses(
        (status = 200, description = "Every object, action and grant", body = AclListResponse),
        (status = 403, description = "Caller lacks acl.read", body = ErrorResponse),
        (status = 502, description = "Membership lookup failed", body = ErrorResponse)
    ),
    tag = "acl"
)]
/// List the whole registry.
pub async fn list_all(State(state): State<AppState>) -> Json<AclListResponse> {
	Json(AclListResponse {
		objects: state.engine.registry().list_all(),
	})
}

#[utoipa::path(
    get,
    path = "/api/acl/users/{user_id}",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Explicit grants held by the user", body = PermissionsResponse),
        (status = 400, description = "Invalid user ID", body = ErrorResponse),
        (status = 403, description = "Caller lacks acl.read", body = ErrorResponse)
    ),
    tag = "acl"
)]
/// List a user's explicit grants. Grants inherited through groups are not included.
#[tracing::instrument(skip(state))]
pub async fn list_user_grants(
	State(state): State<AppState>,
	Path(user_id): Path<String>,
) -> Result<Json<PermissionsResponse>, ServerError> {
	let user_id = parse_user_id(&user_id)?;
	Ok(Json(PermissionsResponse {
		permissions: state.engine.registry().list_for_user(user_id),
	}))
}

#[utoipa::path(
    get,
    path = "/api/acl/groups/{group_id}",
    params(
        ("group_id" = i64, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Explicit grants held by the group", body = PermissionsResponse),
        (status = 400, description = "Invalid group ID", body = ErrorResponse),
        (status = 403, description = "Caller lacks acl.read", body = ErrorResponse)
    ),
    tag = "acl"
)]
/// List a group's explicit grants.
#[tracing::instrument(skip(state))]
pub async fn list_group_grants(
	State(state): State<AppState>,
	Path(group_id): Path<String>,
) -> Result<Json<PermissionsResponse>, ServerError> {
	let group_id = parse_group_id(&group_id)?;
	Ok(Json(PermissionsResponse {
		permissions: state.engine.registry().list_for_group(group_id),
	}))
}

#[utoipa::path(
    post,
    path = "/api/acl/users/{user_id}",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    request_body = GrantRequest,
    responses(
        (status = 201, description = "Grant recorded", body = UserGrant),
        (status = 400, description = "Invalid grant", body = ErrorResponse),
        (status = 403, description = "Caller lacks acl.write", body = ErrorResponse)
    ),
    tag = "acl"
)]
/// Grant a user ALLOW or DENY on an (object, action), replacing any previous grant.
#[tracing::instrument(skip(state, payload))]
pub async fn grant_user(
	State(state): State<AppState>,
	Path(user_id): Path<String>,
	payload: Result<Json<GrantRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserGrant>), ServerError> {
	let user_id = parse_user_id(&user_id)?;
	let (object, action, kind) = grant_body(payload)?.parse()?;
	let grant = state
		.engine
		.registry()
		.grant_user(user_id, object, action, kind);
	Ok((StatusCode::CREATED, Json(grant)))
}

#[utoipa::path(
    post,
    path = "/api/acl/groups/{group_id}",
    params(
        ("group_id" = i64, Path, description = "Group ID")
    ),
    request_body = GrantRequest,
    responses(
        (status = 201, description = "Grant recorded", body = GroupGrant),
        (status = 400, description = "Invalid grant", body = ErrorResponse),
        (status = 403, description = "Caller lacks acl.write", body = ErrorResponse)
    ),
    tag = "acl"
)]
/// Grant a group ALLOW or DENY on an (object, action), replacing any previous grant.
#[tracing::instrument(skip(state, payload))]
pub async fn grant_group(
	State(state): State<AppState>,
	Path(group_id): Path<String>,
	payload: Result<Json<GrantRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GroupGrant>), ServerError> {
	let group_id = parse_group_id(&group_id)?;
	let (object, action, kind) = grant_body(payload)?.parse()?;
	let grant = state
		.engine
		.registry()
		.grant_group(group_id, object, action, kind);
	Ok((StatusCode::CREATED, Json(grant)))
}

#[utoipa::path(
    delete,
    path = "/api/acl/users/{user_id}/{object}/{action}",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ("object" = String, Path, description = "Object key"),
        ("action" = String, Path, description = "Action key")
    ),
    responses(
        (status = 204, description = "Grant removed"),
        (status = 404, description = "No such grant", body = ErrorResponse),
        (status = 403, description = "Caller lacks acl.write", body = ErrorResponse)
    ),
    tag = "acl"
)]
/// Remove a user's explicit grant. The object and action stay declared.
#[tracing::instrument(skip(state))]
pub async fn revoke_user_grant(
	State(state): State<AppState>,
	Path((user_id, object, action)): Path<(String, String, String)>,
) -> Result<StatusCode, ServerError> {
	let user_id = parse_user_id(&user_id)?;
	if state
		.engine
		.registry()
		.revoke_user(user_id, object.as_str(), action.as_str())
	{
		Ok(StatusCode::NO_CONTENT)
	} else {
		Err(ServerError::NotFound(format!(
			"user {user_id} has no grant on {}.{}",
			ObjectKey::new(&object),
			ActionKey::new(&action)
		)))
	}
}

#[utoipa::path(
    delete,
    path = "/api/acl/groups/{group_id}/{object}/{action}",
    params(
        ("group_id" = i64, Path, description = "Group ID"),
        ("object" = String, Path, description = "Object key"),
        ("action" = String, Path, description = "Action key")
    ),
    responses(
        (status = 204, description = "Grant removed"),
        (status = 404, description = "No such grant", body = ErrorResponse),
        (status = 403, description = "Caller lacks acl.write", body = ErrorResponse)
    ),
    tag = "acl"
)]
/// Remove a group's explicit grant. The object and action stay declared.
#[tracing::instrument(skip(state))]
pub async fn revoke_group_grant(
	State(state): State<AppState>,
	Path((group_id, object, action)): Path<(String, String, String)>,
) -> Result<StatusCode, ServerError> {
	let group_id = parse_group_id(&group_id)?;
	if state
		.engine
		.registry()
		.revoke_group(group_id, object.as_str(), action.as_str())
	{
		Ok(StatusCode::NO_CONTENT)
	} else {
		Err(ServerError::NotFound(format!(
			"group {group_id} has no grant on {}.{}",
			ObjectKey::new(&object),
			ActionKey::new(&action)
		)))
	}
}
