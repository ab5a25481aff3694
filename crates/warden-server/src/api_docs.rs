// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI description of the HTTP API.

use utoipa::OpenApi;
use warden_acl_core::{
	AclObject, AclPermission, ActionKey, GrantKind, GroupGrant, GroupGrantEntry, GroupId, ObjectKey,
	PermissionEntry, UserGrant, UserGrantEntry, UserId,
};

use crate::error::ErrorResponse;
use crate::routes::{
	acl::{AclListResponse, GrantRequest, PermissionsResponse},
	health::HealthResponse,
};

#[derive(OpenApi)]
#[openapi(
	info(
		title = "Warden",
		description = "Access-control decisions and grant administration"
	),
	paths(
		crate::routes::health::health_check,
		crate::routes::me::my_permissions,
		crate::routes::acl::list_all,
		crate::routes::acl::list_user_grants,
		crate::routes::acl::list_group_grants,
		crate::routes::acl::grant_user,
		crate::routes::acl::grant_group,
		crate::routes::acl::revoke_user_grant,
		crate::routes::acl::revoke_group_grant,
	),
	components(schemas(
		AclListResponse,
		AclObject,
		AclPermission,
		ActionKey,
		ErrorResponse,
		GrantKind,
		GrantRequest,
		GroupGrant,
		GroupGrantEntry,
		GroupId,
		HealthResponse,
		ObjectKey,
		PermissionEntry,
		PermissionsResponse,
		UserGrant,
		UserGrantEntry,
		UserId,
	)),
	tags(
		(name = "health", description = "Liveness"),
		(name = "acl", description = "Grants and access-control listings")
	)
)]
pub struct ApiDoc;
