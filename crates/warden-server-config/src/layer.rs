// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer merged across sources.

use serde::Deserialize;

use crate::sections::{
	AclConfigLayer, AuthConfigLayer, HttpConfigLayer, LoggingConfigLayer, MembershipConfigLayer,
};

/// One source's view of the configuration. Absent sections are `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub acl: Option<AclConfigLayer>,
	#[serde(default)]
	pub membership: Option<MembershipConfigLayer>,
	#[serde(default)]
	pub auth: Option<AuthConfigLayer>,
}

fn merge_section<T>(slot: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	match (slot.as_mut(), other) {
		(Some(current), Some(other)) => merge(current, other),
		(None, Some(other)) => *slot = Some(other),
		(_, None) => {}
	}
}

impl ServerConfigLayer {
	/// Overlay `other` on top of `self`. Fields set in `other` win.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		merge_section(&mut self.acl, other.acl, AclConfigLayer::merge);
		merge_section(&mut self.membership, other.membership, MembershipConfigLayer::merge);
		merge_section(&mut self.auth, other.auth, AuthConfigLayer::merge);
	}
}
