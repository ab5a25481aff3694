// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP error responses.
//!
//! Every failure leaves the server as a JSON body of the form
//! `{ "error": <code>, "message": <text> }`.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use warden_acl_core::AclError;
use warden_server_config::ConfigError;

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
		}
	}
}

/// Errors surfaced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
	#[error(transparent)]
	Acl(#[from] AclError),

	#[error("{0}")]
	BadRequest(String),

	#[error("authentication required")]
	Unauthorized,

	#[error("{0}")]
	NotFound(String),

	#[error("{0}")]
	Internal(String),

	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;

impl ServerError {
	/// Status code and error body for this error.
	pub fn to_parts(&self) -> (StatusCode, ErrorResponse) {
		match self {
			ServerError::Acl(AclError::NotAuthorized { object, action, .. }) => (
				StatusCode::FORBIDDEN,
				ErrorResponse::new("not_authorized", format!("permission denied on {object}.{action}")),
			),
			ServerError::Acl(AclError::Resolution(_)) => (
				StatusCode::BAD_GATEWAY,
				ErrorResponse::new("upstream_error", "access could not be determined"),
			),
			ServerError::Acl(AclError::InvalidGrant(message)) => (
				StatusCode::BAD_REQUEST,
				ErrorResponse::new("invalid_grant", message.clone()),
			),
			ServerError::BadRequest(message) => (
				StatusCode::BAD_REQUEST,
				ErrorResponse::new("bad_request", message.clone()),
			),
			ServerError::Unauthorized => (
				StatusCode::UNAUTHORIZED,
				ErrorResponse::new("unauthorized", "Authentication required"),
			),
			ServerError::NotFound(message) => (
				StatusCode::NOT_FOUND,
				ErrorResponse::new("not_found", message.clone()),
			),
			ServerError::Internal(_) | ServerError::Config(_) | ServerError::Io(_) => (
				StatusCode::INTERNAL_SERVER_ERROR,
				ErrorResponse::new("internal_error", "Internal server error"),
			),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, body) = self.to_parts();
		if status.is_server_error() {
			tracing::error!(error = %self, status = status.as_u16(), "request failed");
		}
		(status, Json(body)).into_response()
	}
}
