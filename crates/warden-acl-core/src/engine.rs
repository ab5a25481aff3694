// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access resolution.
//!
//! [`AclEngine::explain`] walks the checks in a fixed order:
//!
//! 1. **Administrator bypass**: members of the administrators group are allowed
//!    without looking at any grant.
//! 2. **Object and action**: undeclared objects and actions are denied.
//! 3. **Grants**: group grants and the user's own grant are combined by
//!    [`policy::evaluate`](crate::policy::evaluate).
//!
//! Membership lookups are the only points where resolution waits. Each one is
//! bounded by the engine's lookup timeout and aborted when the caller's
//! [`CancellationToken`] fires. Either case is reported as
//! [`AclError::Resolution`], never as a verdict.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::error::{AclError, MembershipError, Result};
use crate::membership::MembershipProvider;
use crate::policy::{self, Decision, DecisionReason};
use crate::registry::{AclRegistry, PermissionLookup};
use crate::types::{ActionKey, ObjectKey, UserId, Verdict};

/// Default bound on a single membership lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Registry plus membership provider, ready to answer access questions.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone)]
pub struct AclEngine {
	registry: Arc<AclRegistry>,
	membership: Arc<dyn MembershipProvider>,
	lookup_timeout: Duration,
}

impl std::fmt::Debug for AclEngine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AclEngine")
			.field("admin_group", &self.membership.admin_group())
			.field("lookup_timeout", &self.lookup_timeout)
			.finish_non_exhaustive()
	}
}

impl AclEngine {
	pub fn new(registry: Arc<AclRegistry>, membership: Arc<dyn MembershipProvider>) -> Self {
		Self {
			registry,
			membership,
			lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
		}
	}

	/// Set the bound on each membership lookup.
	pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
		self.lookup_timeout = timeout;
		self
	}

	pub fn registry(&self) -> &Arc<AclRegistry> {
		&self.registry
	}

	pub fn membership(&self) -> &Arc<dyn MembershipProvider> {
		&self.membership
	}

	pub fn lookup_timeout(&self) -> Duration {
		self.lookup_timeout
	}

	/// Resolve access with no caller cancellation.
	pub async fn resolve(&self, user_id: UserId, object: &str, action: &str) -> Result<Verdict> {
		self
			.resolve_with(user_id, object, action, &CancellationToken::new())
			.await
	}

	/// Resolve access, giving up when `cancel` fires.
	pub async fn resolve_with(
		&self,
		user_id: UserId,
		object: &str,
		action: &str,
		cancel: &CancellationToken,
	) -> Result<Verdict> {
		Ok(self.explain_with(user_id, object, action, cancel).await?.verdict)
	}

	/// Resolve access and report which rule decided.
	pub async fn explain(&self, user_id: UserId, object: &str, action: &str) -> Result<Decision> {
		self
			.explain_with(user_id, object, action, &CancellationToken::new())
			.await
	}

	/// Resolve access and report which rule decided, giving up when `cancel` fires.
	#[instrument(
		level = "debug",
		skip(self, cancel),
		fields(user_id = %user_id, object = %object, action = %action)
	)]
	pub async fn explain_with(
		&self,
		user_id: UserId,
		object: &str,
		action: &str,
		cancel: &CancellationToken,
	) -> Result<Decision> {
		let admin_group = self.membership.admin_group();
		let is_admin = self
			.bounded(cancel, self.membership.is_member(admin_group, user_id))
			.await?;
		if is_admin {
			debug!(%admin_group, "allowed: administrator");
			return Ok(Decision::allow(DecisionReason::AdminBypass));
		}

		let object = ObjectKey::new(object);
		let action = ActionKey::new(action);
		let record = match self.registry.lookup(&object, &action) {
			PermissionLookup::UnknownObject => {
				debug!("denied: object has no grants");
				return Ok(Decision::deny(DecisionReason::UnknownObject));
			}
			PermissionLookup::UnknownAction => {
				debug!("denied: action has no grants");
				return Ok(Decision::deny(DecisionReason::UnknownAction));
			}
			PermissionLookup::Found(record) => record,
		};

		let groups = self
			.bounded(cancel, self.membership.groups_of(user_id))
			.await?;
		let decision = policy::evaluate(&record, user_id, &groups);

		debug!(
			verdict = %decision.verdict,
			reason = ?decision.reason,
			group_count = groups.len(),
			"resolved"
		);
		Ok(decision)
	}

	async fn bounded<T, F>(&self, cancel: &CancellationToken, lookup: F) -> Result<T>
	where
		F: Future<Output = std::result::Result<T, MembershipError>>,
	{
		let outcome = tokio::select! {
			biased;
			_ = cancel.cancelled() => Err(MembershipError::Cancelled),
			result = tokio::time::timeout(self.lookup_timeout, lookup) => match result {
				Ok(inner) => inner,
				Err(_) => Err(MembershipError::TimedOut(self.lookup_timeout)),
			},
		};

		outcome.map_err(|e| {
			debug!(error = %e, "membership lookup failed");
			AclError::from(e)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::membership::InMemoryMembership;
	use crate::types::{GrantKind, GroupId};
	use async_trait::async_trait;
	use proptest::prelude::*;

	const ADMINS: GroupId = GroupId::new(1);

	fn engine() -> (AclEngine, Arc<InMemoryMembership>) {
		let membership = Arc::new(InMemoryMembership::new(ADMINS));
		let engine = AclEngine::new(Arc::new(AclRegistry::new()), membership.clone());
		(engine, membership)
	}

	/// Provider whose lookups fail or never finish.
	struct BrokenMembership {
		hang: bool,
	}

	#[async_trait]
	impl MembershipProvider for BrokenMembership {
		fn admin_group(&self) -> GroupId {
			ADMINS
		}

		async fn is_member(
			&self,
			_group_id: GroupId,
			_user_id: UserId,
		) -> std::result::Result<bool, MembershipError> {
			if self.hang {
				std::future::pending::<()>().await;
			}
			Err(MembershipError::Unavailable("directory offline".to_string()))
		}

		async fn groups_of(
			&self,
			_user_id: UserId,
		) -> std::result::Result<Vec<GroupId>, MembershipError> {
			Err(MembershipError::Unavailable("directory offline".to_string()))
		}
	}

	/// Provider that answers the admin check but fails listing groups.
	struct GroupsUnavailable;

	#[async_trait]
	impl MembershipProvider for GroupsUnavailable {
		fn admin_group(&self) -> GroupId {
			ADMINS
		}

		async fn is_member(
			&self,
			_group_id: GroupId,
			_user_id: UserId,
		) -> std::result::Result<bool, MembershipError> {
			Ok(false)
		}

		async fn groups_of(
			&self,
			_user_id: UserId,
		) -> std::result::Result<Vec<GroupId>, MembershipError> {
			Err(MembershipError::Unavailable("groups table locked".to_string()))
		}
	}

	/// Provider that answers the admin check but never lists groups.
	struct GroupsStalled;

	#[async_trait]
	impl MembershipProvider for GroupsStalled {
		fn admin_group(&self) -> GroupId {
			ADMINS
		}

		async fn is_member(
			&self,
			_group_id: GroupId,
			_user_id: UserId,
		) -> std::result::Result<bool, MembershipError> {
			Ok(false)
		}

		async fn groups_of(
			&self,
			_user_id: UserId,
		) -> std::result::Result<Vec<GroupId>, MembershipError> {
			std::future::pending().await
		}
	}

	fn stalled_groups_engine() -> AclEngine {
		let registry = Arc::new(AclRegistry::new());
		registry.grant_group(GroupId::new(2), "invoice", "read", GrantKind::Allow);
		AclEngine::new(registry, Arc::new(GroupsStalled))
			.with_lookup_timeout(Duration::from_millis(250))
	}

	mod default_deny {
		use super::*;

		#[tokio::test]
		async fn unknown_object_denies() {
			let (engine, _) = engine();
			let decision = engine.explain(UserId::new(5), "report", "export").await.unwrap();
			assert_eq!(decision, Decision::deny(DecisionReason::UnknownObject));
		}

		#[tokio::test]
		async fn unknown_action_denies() {
			let (engine, _) = engine();
			engine
				.registry()
				.grant_user(UserId::new(5), "report", "view", GrantKind::Allow);
			let decision = engine.explain(UserId::new(5), "report", "export").await.unwrap();
			assert_eq!(decision, Decision::deny(DecisionReason::UnknownAction));
		}

		#[tokio::test]
		async fn guest_is_denied_without_grants() {
			let (engine, _) = engine();
			assert_eq!(
				engine.resolve(UserId::new(5), "report", "export").await.unwrap(),
				Verdict::Deny
			);
			assert_eq!(
				engine.resolve(UserId::GUEST, "report", "export").await.unwrap(),
				Verdict::Deny
			);
		}

		#[tokio::test]
		async fn guest_can_be_opened_explicitly() {
			let (engine, _) = engine();
			engine
				.registry()
				.grant_user(UserId::GUEST, "catalog", "read", GrantKind::Allow);
			assert_eq!(
				engine.resolve(UserId::GUEST, "catalog", "read").await.unwrap(),
				Verdict::Allow
			);
		}
	}

	mod admin_bypass {
		use super::*;

		#[tokio::test]
		async fn administrators_are_allowed_everywhere() {
			let (engine, membership) = engine();
			membership.add_member(ADMINS, UserId::new(1));

			let decision = engine.explain(UserId::new(1), "anything", "at-all").await.unwrap();
			assert_eq!(decision, Decision::allow(DecisionReason::AdminBypass));
		}

		#[tokio::test]
		async fn bypass_ignores_explicit_deny() {
			let (engine, membership) = engine();
			membership.add_member(ADMINS, UserId::new(1));
			engine
				.registry()
				.grant_user(UserId::new(1), "invoice", "read", GrantKind::Deny);

			assert_eq!(
				engine.resolve(UserId::new(1), "invoice", "read").await.unwrap(),
				Verdict::Allow
			);
		}

		#[tokio::test]
		async fn nested_administrators_are_allowed() {
			let (engine, membership) = engine();
			membership.add_member(GroupId::new(8), UserId::new(2));
			membership.add_parent(GroupId::new(8), ADMINS);

			assert_eq!(
				engine.resolve(UserId::new(2), "invoice", "delete").await.unwrap(),
				Verdict::Allow
			);
		}
	}

	mod grants {
		use super::*;

		#[tokio::test]
		async fn group_allow_then_user_deny() {
			let (engine, membership) = engine();
			membership.add_member(GroupId::new(2), UserId::new(10));
			engine
				.registry()
				.grant_group(GroupId::new(2), "invoice", "read", GrantKind::Allow);

			assert_eq!(
				engine.resolve(UserId::new(10), "invoice", "read").await.unwrap(),
				Verdict::Allow
			);

			engine
				.registry()
				.grant_user(UserId::new(10), "invoice", "read", GrantKind::Deny);
			assert_eq!(
				engine.resolve(UserId::new(10), "invoice", "read").await.unwrap(),
				Verdict::Deny
			);
		}

		#[tokio::test]
		async fn conflicting_groups_deny() {
			let (engine, membership) = engine();
			membership.add_member(GroupId::new(2), UserId::new(10));
			membership.add_member(GroupId::new(3), UserId::new(10));
			engine
				.registry()
				.grant_group(GroupId::new(2), "invoice", "read", GrantKind::Allow);
			engine
				.registry()
				.grant_group(GroupId::new(3), "invoice", "read", GrantKind::Deny);

			let decision = engine.explain(UserId::new(10), "invoice", "read").await.unwrap();
			assert_eq!(
				decision,
				Decision::deny(DecisionReason::GroupGrant(GroupId::new(3)))
			);
		}

		#[tokio::test]
		async fn inherited_group_grants_apply() {
			let (engine, membership) = engine();
			membership.add_member(GroupId::new(4), UserId::new(10));
			membership.add_parent(GroupId::new(4), GroupId::new(5));
			engine
				.registry()
				.grant_group(GroupId::new(5), "invoice", "read", GrantKind::Allow);

			assert_eq!(
				engine.resolve(UserId::new(10), "invoice", "read").await.unwrap(),
				Verdict::Allow
			);
		}

		#[tokio::test]
		async fn keys_are_case_insensitive() {
			let (engine, _) = engine();
			engine
				.registry()
				.grant_user(UserId::new(10), "Invoice", "READ", GrantKind::Allow);

			assert_eq!(
				engine.resolve(UserId::new(10), "invoice", "read").await.unwrap(),
				Verdict::Allow
			);
			assert_eq!(
				engine.resolve(UserId::new(10), "INVOICE", "Read").await.unwrap(),
				Verdict::Allow
			);
		}

		#[tokio::test]
		async fn regrant_is_idempotent() {
			let (engine, _) = engine();
			for _ in 0..3 {
				engine
					.registry()
					.grant_user(UserId::new(10), "invoice", "read", GrantKind::Allow);
			}
			assert_eq!(
				engine.resolve(UserId::new(10), "invoice", "read").await.unwrap(),
				Verdict::Allow
			);
			assert_eq!(engine.registry().list_for_user(UserId::new(10)).len(), 1);
		}

		#[tokio::test]
		async fn revoked_grant_falls_back_to_groups() {
			let (engine, membership) = engine();
			membership.add_member(GroupId::new(2), UserId::new(10));
			engine
				.registry()
				.grant_group(GroupId::new(2), "invoice", "read", GrantKind::Allow);
			engine
				.registry()
				.grant_user(UserId::new(10), "invoice", "read", GrantKind::Deny);
			engine
				.registry()
				.revoke_user(UserId::new(10), "invoice", "read");

			assert_eq!(
				engine.resolve(UserId::new(10), "invoice", "read").await.unwrap(),
				Verdict::Allow
			);
		}
	}

	mod failures {
		use super::*;

		#[tokio::test]
		async fn provider_error_is_not_a_deny() {
			let engine = AclEngine::new(
				Arc::new(AclRegistry::new()),
				Arc::new(BrokenMembership { hang: false }),
			);
			let err = engine
				.resolve(UserId::new(10), "invoice", "read")
				.await
				.unwrap_err();
			assert_eq!(
				err,
				AclError::Resolution(MembershipError::Unavailable("directory offline".to_string()))
			);
			assert!(err.is_resolution_failure());
		}

		#[tokio::test]
		async fn group_lookup_error_propagates_even_with_user_grant() {
			let registry = Arc::new(AclRegistry::new());
			registry.grant_user(UserId::new(10), "invoice", "read", GrantKind::Allow);
			let engine = AclEngine::new(registry, Arc::new(GroupsUnavailable));

			let err = engine
				.resolve(UserId::new(10), "invoice", "read")
				.await
				.unwrap_err();
			assert!(err.is_resolution_failure());
		}

		#[tokio::test]
		async fn unknown_object_short_circuits_group_lookup() {
			let engine = AclEngine::new(Arc::new(AclRegistry::new()), Arc::new(GroupsUnavailable));
			assert_eq!(
				engine.resolve(UserId::new(10), "invoice", "read").await.unwrap(),
				Verdict::Deny
			);
		}

		#[tokio::test(start_paused = true)]
		async fn slow_provider_times_out() {
			let engine = AclEngine::new(
				Arc::new(AclRegistry::new()),
				Arc::new(BrokenMembership { hang: true }),
			)
			.with_lookup_timeout(Duration::from_millis(250));

			let err = engine
				.resolve(UserId::new(10), "invoice", "read")
				.await
				.unwrap_err();
			assert_eq!(
				err,
				AclError::Resolution(MembershipError::TimedOut(Duration::from_millis(250)))
			);
		}

		#[tokio::test]
		async fn cancelled_lookup_is_reported() {
			let engine = AclEngine::new(
				Arc::new(AclRegistry::new()),
				Arc::new(BrokenMembership { hang: true }),
			);
			let cancel = CancellationToken::new();
			cancel.cancel();

			let err = engine
				.resolve_with(UserId::new(10), "invoice", "read", &cancel)
				.await
				.unwrap_err();
			assert_eq!(err, AclError::Resolution(MembershipError::Cancelled));
		}

		#[tokio::test(start_paused = true)]
		async fn stalled_group_lookup_times_out() {
			let engine = stalled_groups_engine();
			let cancel = CancellationToken::new();

			let err = engine
				.resolve_with(UserId::new(10), "invoice", "read", &cancel)
				.await
				.unwrap_err();
			assert_eq!(
				err,
				AclError::Resolution(MembershipError::TimedOut(Duration::from_millis(250)))
			);
		}

		#[tokio::test(start_paused = true)]
		async fn cancel_during_group_lookup_is_reported() {
			let engine = stalled_groups_engine().with_lookup_timeout(Duration::from_secs(60));
			let cancel = CancellationToken::new();
			let trigger = cancel.clone();
			tokio::spawn(async move {
				tokio::time::sleep(Duration::from_secs(1)).await;
				trigger.cancel();
			});

			let err = engine
				.explain_with(UserId::new(10), "invoice", "read", &cancel)
				.await
				.unwrap_err();
			assert_eq!(err, AclError::Resolution(MembershipError::Cancelled));
		}
	}

	mod property_tests {
		use super::*;

		fn arb_kind() -> impl Strategy<Value = GrantKind> {
			prop_oneof![Just(GrantKind::Allow), Just(GrantKind::Deny)]
		}

		fn block_on<F: Future>(future: F) -> F::Output {
			tokio_test::block_on(future)
		}

		proptest! {
			#[test]
			fn administrators_always_allowed(
				user in 0i64..1000,
				object in "[a-z]{1,8}",
				action in "[a-z]{1,8}",
				kind in arb_kind(),
			) {
				let (engine, membership) = engine();
				membership.add_member(ADMINS, UserId::new(user));
				engine.registry().grant_user(UserId::new(user), object.as_str(), action.as_str(), kind);

				let verdict = block_on(engine.resolve(UserId::new(user), &object, &action)).unwrap();
				prop_assert_eq!(verdict, Verdict::Allow);
			}

			#[test]
			fn ungranted_pairs_deny(
				user in -1i64..1000,
				object in "[a-z]{1,8}",
				action in "[a-z]{1,8}",
			) {
				let (engine, _) = engine();
				let verdict = block_on(engine.resolve(UserId::new(user), &object, &action)).unwrap();
				prop_assert_eq!(verdict, Verdict::Deny);
			}

			#[test]
			fn user_grant_wins_over_any_group_grant(
				user_kind in arb_kind(),
				group_kinds in proptest::collection::vec(arb_kind(), 0..5),
			) {
				let (engine, membership) = engine();
				let user = UserId::new(10);
				for (i, kind) in group_kinds.iter().enumerate() {
					let group = GroupId::new(100 + i as i64);
					membership.add_member(group, user);
					engine.registry().grant_group(group, "invoice", "read", *kind);
				}
				engine.registry().grant_user(user, "invoice", "read", user_kind);

				let verdict = block_on(engine.resolve(user, "invoice", "read")).unwrap();
				prop_assert_eq!(verdict, Verdict::from(user_kind));
			}

			#[test]
			fn grants_match_in_any_case(
				object in "[a-zA-Z]{1,8}",
				action in "[a-zA-Z]{1,8}",
			) {
				let (engine, _) = engine();
				let user = UserId::new(10);
				engine.registry().grant_user(user, object.to_uppercase(), action.to_uppercase(), GrantKind::Allow);

				let verdict = block_on(engine.resolve(user, &object.to_lowercase(), &action)).unwrap();
				prop_assert_eq!(verdict, Verdict::Allow);
			}
		}
	}
}
