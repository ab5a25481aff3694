// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for Warden server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`WARDEN_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use warden_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}:{}", config.http.host, config.http.port);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};
use warden_acl_core::GrantSubject;

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub logging: LoggingConfig,
	pub acl: AclConfig,
	pub membership: MembershipConfig,
	pub auth: AuthConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`WARDEN_SERVER_*`)
/// 2. Config file (`/etc/warden/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let acl = layer.acl.unwrap_or_default().finalize()?;
	let membership = layer.membership.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize()?;

	validate_config(&acl, &membership)?;

	info!(
		host = %http.host,
		port = http.port,
		log_format = %logging.format,
		admin_group_id = %acl.admin_group_id,
		lookup_timeout_ms = acl.lookup_timeout.as_millis() as u64,
		seed_grants = acl.grants.len(),
		groups = membership.groups.len(),
		tokens = auth.tokens.len(),
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		logging,
		acl,
		membership,
		auth,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(acl: &AclConfig, membership: &MembershipConfig) -> Result<(), ConfigError> {
	for grant in &acl.grants {
		if let GrantSubject::Group(group_id) = grant.subject {
			if group_id != acl.admin_group_id && !membership.declares(group_id.into_inner()) {
				return Err(ConfigError::Validation(format!(
					"seed grant on {}.{} references group {group_id}, which is not declared in \
					 membership.groups",
					grant.object, grant.action
				)));
			}
		}
	}

	Ok(())
}
