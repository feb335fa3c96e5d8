use std::cell::RefCell;
use std::rc::Rc;

use reclaim_gate::{
    AccessGate, Boundary, BypassPolicy, CredentialKind, CredentialSource, GateConfig, GateError, GuardDecision,
    GuardKind, IdentityError, KeyValueStore, MaintenanceCheck, MemoryStorage, RouteGuard,
    SignInRequest, StorageError, Verdict,
};
use reclaim_test_support::clock::ManualClock;
use reclaim_test_support::fixtures::{DAY_MS, HOUR_MS, NOW_MS, seed_raw, seed_record};
use reclaim_test_support::identity::{FakeIdentity, RemoteSession};
use reclaim_test_support::storage::UnavailableStorage;

/// Memory storage that refuses writes to one key.
struct RefusingKey {
    inner: MemoryStorage,
    key: &'static str,
}

impl KeyValueStore for RefusingKey {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == self.key {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

fn operator_gate_refusing(key: &'static str) -> (Rc<RefusingKey>, AccessGate) {
    let storage = Rc::new(RefusingKey {
        inner: MemoryStorage::new(),
        key,
    });
    let identity = Rc::new(
        FakeIdentity::new(RemoteSession::Absent).with_account("ops@reclaim.example", "correct horse"),
    );
    let config = GateConfig {
        operator_emails: vec!["ops@reclaim.example".to_string()],
        ..GateConfig::default()
    };
    let gate = AccessGate::new(
        storage.clone(),
        identity,
        Rc::new(ManualClock::at(NOW_MS)),
        config,
    );
    (storage, gate)
}

struct Harness {
    storage: Rc<MemoryStorage>,
    identity: Rc<FakeIdentity>,
    clock: Rc<ManualClock>,
    gate: AccessGate,
}

fn harness(remote: RemoteSession) -> Harness {
    harness_with(remote, GateConfig::default())
}

fn harness_with(remote: RemoteSession, config: GateConfig) -> Harness {
    let storage = Rc::new(MemoryStorage::new());
    let identity = Rc::new(
        FakeIdentity::new(remote).with_account("ops@reclaim.example", "correct horse"),
    );
    let clock = Rc::new(ManualClock::at(NOW_MS));
    let gate = AccessGate::new(storage.clone(), identity.clone(), clock.clone(), config);
    Harness {
        storage,
        identity,
        clock,
        gate,
    }
}

fn sign_in_request(remember: bool) -> SignInRequest {
    SignInRequest {
        email: "ops@reclaim.example".to_string(),
        password: "correct horse".to_string(),
        remember,
    }
}

#[tokio::test]
async fn expired_records_never_authenticate_on_their_own() {
    for (key, age) in [("adminAuthRemembered", 30 * DAY_MS), ("adminAuth", 24 * HOUR_MS)] {
        let h = harness(RemoteSession::Absent);
        seed_record(&h.storage, key, age);

        assert_eq!(h.gate.evaluate(GuardKind::Protected).await, Verdict::Unauthenticated);
        assert!(!h.storage.contains(key), "{key} should be purged");
        assert_eq!(h.identity.session_calls(), 1);
    }
}

#[tokio::test]
async fn fresh_remembered_record_makes_no_remote_call() {
    let h = harness(RemoteSession::Unreachable);
    seed_record(&h.storage, "adminAuthRemembered", 29 * DAY_MS);

    let resolution = h.gate.resolver().resolve_detailed().await;

    assert_eq!(resolution.verdict, Verdict::Authenticated);
    assert_eq!(resolution.source, Some(CredentialSource::Remembered));
    assert_eq!(h.identity.session_calls(), 0);
}

#[tokio::test]
async fn corrupt_records_self_heal_after_one_pass() {
    let h = harness(RemoteSession::Absent);
    seed_raw(&h.storage, "adminAuth", "not json");
    seed_raw(&h.storage, "adminAuthRemembered", "{\"email\":\"x\"}");

    assert_eq!(h.gate.evaluate(GuardKind::Protected).await, Verdict::Unauthenticated);

    assert!(!h.storage.contains("adminAuth"));
    assert!(!h.storage.contains("adminAuthRemembered"));
}

#[tokio::test]
async fn scenario_a_recent_standard_record_renders_without_remote_call() {
    let h = harness(RemoteSession::Absent);
    seed_record(&h.storage, "adminAuth", 2 * HOUR_MS);

    assert_eq!(h.gate.evaluate(GuardKind::Protected).await, Verdict::Authenticated);
    assert_eq!(h.identity.session_calls(), 0);
}

#[tokio::test]
async fn scenario_b_stale_standard_record_is_purged_and_denied() {
    let h = harness(RemoteSession::Absent);
    seed_record(&h.storage, "adminAuth", 25 * HOUR_MS);

    let guard = RefCell::new(RouteGuard::new(GuardKind::Protected));
    let ticket = guard.borrow_mut().mount();

    let decision = h.gate.run_guard(&guard, ticket).await;

    assert_eq!(decision, Some(GuardDecision::Redirect(Boundary::Login)));
    assert_eq!(h.gate.boundary_path(Boundary::Login), "/login");
    assert_eq!(guard.borrow().state(), Verdict::Unauthenticated);
    assert!(!h.storage.contains("adminAuth"));
    assert_eq!(h.identity.session_calls(), 1);
}

#[tokio::test]
async fn scenario_c_empty_storage_with_live_session_makes_one_call() {
    let h = harness(RemoteSession::Active);

    assert_eq!(h.gate.evaluate(GuardKind::Protected).await, Verdict::Authenticated);
    assert_eq!(h.identity.session_calls(), 1);
}

#[tokio::test]
async fn record_expires_as_the_clock_moves() {
    let h = harness(RemoteSession::Absent);
    seed_record(&h.storage, "adminAuth", 0);
    assert_eq!(h.gate.evaluate(GuardKind::Protected).await, Verdict::Authenticated);

    h.clock.advance(24 * HOUR_MS);

    assert_eq!(h.gate.evaluate(GuardKind::Protected).await, Verdict::Unauthenticated);
    assert!(!h.storage.contains("adminAuth"));
}

#[tokio::test]
async fn maintenance_off_never_resolves_a_session() {
    let h = harness(RemoteSession::Active);
    seed_raw(&h.storage, "maintenanceMode", "false");
    seed_record(&h.storage, "adminAuth", 25 * HOUR_MS);

    assert_eq!(h.gate.maintenance().check().await, MaintenanceCheck::OPEN);

    // The expired record is still there: the resolver never ran.
    assert!(h.storage.contains("adminAuth"));
    assert_eq!(h.identity.session_calls(), 0);
}

#[tokio::test]
async fn maintenance_on_blocks_anonymous_and_admits_credentialed_visitors() {
    let h = harness(RemoteSession::Absent);
    seed_raw(&h.storage, "maintenanceMode", "true");
    assert_eq!(
        h.gate.evaluate(GuardKind::Maintenance).await,
        Verdict::Unauthenticated
    );

    seed_record(&h.storage, "adminAuth", HOUR_MS);
    assert_eq!(
        h.gate.evaluate(GuardKind::Maintenance).await,
        Verdict::Authenticated
    );
}

#[tokio::test]
async fn maintenance_fails_closed_when_storage_is_unreadable() {
    let identity = Rc::new(FakeIdentity::new(RemoteSession::Active));
    let gate = AccessGate::new(
        Rc::new(UnavailableStorage),
        identity.clone(),
        Rc::new(ManualClock::at(NOW_MS)),
        GateConfig::default(),
    );

    assert_eq!(gate.maintenance().check().await, MaintenanceCheck::CLOSED);
    assert_eq!(gate.evaluate(GuardKind::Maintenance).await, Verdict::Unauthenticated);
    assert_eq!(identity.session_calls(), 0);
}

#[tokio::test]
async fn unreadable_storage_still_resolves_through_the_provider() {
    let identity = Rc::new(FakeIdentity::new(RemoteSession::Active));
    let gate = AccessGate::new(
        Rc::new(UnavailableStorage),
        identity.clone(),
        Rc::new(ManualClock::at(NOW_MS)),
        GateConfig::default(),
    );

    assert_eq!(gate.evaluate(GuardKind::Protected).await, Verdict::Authenticated);
    assert_eq!(identity.session_calls(), 1);
}

#[tokio::test]
async fn operator_only_policy_denies_plain_credentials() {
    let config = GateConfig {
        maintenance_bypass: BypassPolicy::OperatorOnly,
        operator_emails: vec!["ops@reclaim.example".to_string()],
        ..GateConfig::default()
    };
    let h = harness_with(RemoteSession::Absent, config);
    seed_raw(&h.storage, "maintenanceMode", "true");
    seed_record(&h.storage, "adminAuth", HOUR_MS);

    assert_eq!(
        h.gate.evaluate(GuardKind::Maintenance).await,
        Verdict::Unauthenticated
    );

    h.gate
        .sign_in(&sign_in_request(false))
        .await
        .expect("operator sign-in succeeds");
    assert_eq!(
        h.gate.evaluate(GuardKind::Maintenance).await,
        Verdict::Authenticated
    );
}

#[tokio::test]
async fn sign_in_records_exactly_one_kind() -> Result<(), GateError> {
    let h = harness(RemoteSession::Absent);

    h.gate.sign_in(&sign_in_request(true)).await?;
    assert!(h.storage.contains("adminAuthRemembered"));
    assert!(!h.storage.contains("adminAuth"));

    h.gate.sign_in(&sign_in_request(false)).await?;
    assert!(h.storage.contains("adminAuth"));
    assert!(!h.storage.contains("adminAuthRemembered"));

    let raw = h.storage.get("adminAuth").ok().flatten().unwrap_or_default();
    assert!(raw.contains(&NOW_MS.to_string()));
    assert!(raw.contains("ops@reclaim.example"));
    Ok(())
}

#[tokio::test]
async fn sign_in_flags_only_configured_operators() -> Result<(), GateError> {
    let h = harness(RemoteSession::Absent);
    h.gate.sign_in(&sign_in_request(false)).await?;
    assert!(!h.gate.credentials().is_operator());

    let config = GateConfig {
        operator_emails: vec!["OPS@reclaim.example".to_string()],
        ..GateConfig::default()
    };
    let h = harness_with(RemoteSession::Absent, config);
    h.gate.sign_in(&sign_in_request(false)).await?;
    assert!(h.gate.credentials().is_operator());
    Ok(())
}

#[tokio::test]
async fn rejected_sign_in_writes_nothing() {
    let h = harness(RemoteSession::Absent);
    let request = SignInRequest {
        password: "wrong".to_string(),
        ..sign_in_request(true)
    };

    let err = h.gate.sign_in(&request).await.expect_err("must be rejected");

    assert!(matches!(
        err,
        GateError::SignIn {
            source: IdentityError::Rejected { .. }
        }
    ));
    assert!(h.storage.is_empty());
    assert_eq!(h.identity.sign_in_calls(), 1);
}

#[tokio::test]
async fn failed_operator_flag_leaves_no_credential_behind() {
    let (storage, gate) = operator_gate_refusing("adminOperator");

    let err = gate.sign_in(&sign_in_request(true)).await.expect_err("flag write refused");

    assert!(matches!(err, GateError::Storage { .. }));
    assert!(storage.inner.is_empty());
    assert!(gate.credentials().read(CredentialKind::Remembered).is_none());
}

#[tokio::test]
async fn failed_record_write_drops_the_operator_flag() {
    let (storage, gate) = operator_gate_refusing("adminAuth");

    let err = gate.sign_in(&sign_in_request(false)).await.expect_err("record write refused");

    assert!(matches!(err, GateError::Storage { .. }));
    assert!(!storage.inner.contains("adminOperator"));
    assert!(!gate.credentials().is_operator());

    storage.inner.set("maintenanceMode", "true").expect("seed flag");
    assert_eq!(
        gate.maintenance().check().await,
        MaintenanceCheck {
            maintenance: true,
            bypass: false
        }
    );
}

#[tokio::test]
async fn sign_out_clears_local_records_even_when_provider_is_down() {
    let h = harness(RemoteSession::Absent);
    seed_record(&h.storage, "adminAuth", HOUR_MS);
    seed_record(&h.storage, "adminAuthRemembered", DAY_MS);
    seed_raw(&h.storage, "adminOperator", "true");
    h.identity.set_remote(RemoteSession::Unreachable);

    h.gate.sign_out().await;

    assert!(h.storage.is_empty());
    assert_eq!(h.identity.sign_out_calls(), 1);
}

#[tokio::test]
async fn maintenance_state_exposes_descriptive_fields() -> Result<(), GateError> {
    let h = harness(RemoteSession::Absent);
    seed_raw(&h.storage, "maintenanceMode", "true");
    seed_raw(&h.storage, "maintenanceEndDate", "2026-10-17T06:00:00Z");
    seed_raw(&h.storage, "maintenanceMessage", "Quarterly filing upgrade");

    let state = h.gate.maintenance_state()?;

    assert!(state.enabled);
    assert_eq!(state.end_date.as_deref(), Some("2026-10-17T06:00:00Z"));
    assert_eq!(state.message.as_deref(), Some("Quarterly filing upgrade"));
    Ok(())
}
