// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod acl;
mod auth;
mod http;
mod logging;
mod membership;

pub use acl::{AclConfig, AclConfigLayer, SeedGrantEntry, SubjectKind};
pub use auth::{AuthConfig, AuthConfigLayer, TokenEntry};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use membership::{GroupEntry, MembershipConfig, MembershipConfigLayer};
