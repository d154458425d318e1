//! End-to-end authentication lifecycle against a compliant receiver.

use hdcp_core::{State, Status, TxError};
use hdcp_harness::rig::LC128;
use hdcp_harness::{ReceiverBehavior, TestRig};

#[test]
fn full_key_exchange_authenticates_and_keys_the_cipher() {
    let mut rig = TestRig::new();
    rig.start();

    rig.run_until(Status::Authenticated, 2_000)
        .expect("authentication should complete");

    assert!(rig.engine.is_authenticated());
    assert!(rig.engine.is_receiver_capable());
    let cipher = rig.cipher.snapshot();
    assert!(cipher.running);
    assert_eq!(cipher.global_constant, Some(LC128));
    assert!(cipher.session_key.is_some());
    assert!(cipher.iv.is_some());

    // Receiver recovered the same session material the cipher was keyed
    // with.
    let session = rig.receiver().session().expect("receiver keyed");
    assert_eq!(Some(session.ks), cipher.session_key);
    assert_eq!(Some(session.riv), cipher.iv);

    assert_eq!(rig.receiver().no_stored_km_count(), 1);
    assert_eq!(rig.receiver().stored_km_count(), 0);
    assert_eq!(rig.crypto.signature_verifications(), 1);
}

#[test]
fn authenticated_notification_fires_once_per_session() {
    let mut rig = TestRig::new();
    rig.start();
    rig.run_until(Status::Authenticated, 2_000).unwrap();
    assert_eq!(rig.auth_events(), 1);

    // Steady state spans several re-auth check intervals; the edge
    // callback and the cipher run edge must not repeat.
    rig.run(3_000);
    assert!(rig.engine.is_authenticated());
    assert_eq!(rig.auth_events(), 1);
    assert_eq!(rig.cipher.snapshot().run_edges, 1);
}

#[test]
fn second_attempt_replays_the_stored_pairing() {
    let mut rig = TestRig::new();
    rig.start();
    rig.run_until(Status::Authenticated, 2_000).unwrap();

    rig.engine.authenticate().unwrap();
    rig.run_until(Status::Authenticated, 2_000)
        .expect("stored-km attempt should complete");

    assert_eq!(rig.receiver().stored_km_count(), 1);
    assert_eq!(rig.receiver().no_stored_km_count(), 1);
    // The certificate was only verified during the first attempt.
    assert_eq!(rig.crypto.signature_verifications(), 1);
    assert_eq!(rig.auth_events(), 2);
}

#[test]
fn encryption_is_gated_on_an_authenticated_link() {
    let mut rig = TestRig::new();
    rig.start();

    assert_eq!(
        rig.engine.enable_encryption(),
        Err(TxError::NotAuthenticated)
    );
    assert!(!rig.engine.is_encryption_enabled());

    rig.run_until(Status::Authenticated, 2_000).unwrap();
    rig.engine.enable_encryption().unwrap();
    assert!(rig.engine.is_encryption_enabled());
    assert!(rig.cipher.snapshot().tx_encryption);

    rig.engine.disable_encryption();
    assert!(!rig.engine.is_encryption_enabled());
    assert!(!rig.cipher.snapshot().tx_encryption);
}

#[test]
fn reset_tears_down_the_session() {
    let mut rig = TestRig::new();
    rig.start();
    rig.run_until(Status::Authenticated, 2_000).unwrap();
    rig.engine.enable_encryption().unwrap();

    rig.engine.reset();
    assert_eq!(rig.engine.status(), Status::Unauthenticated);
    assert_eq!(rig.engine.current_state(), State::Idle);
    let cipher = rig.cipher.snapshot();
    assert!(!cipher.tx_encryption);
    assert!(!rig.engine.is_encryption_enabled());
}

#[test]
fn disabled_engine_refuses_authentication_and_freezes() {
    let mut rig = TestRig::new();
    assert_eq!(rig.engine.authenticate(), Err(TxError::NotEnabled));
    assert_eq!(rig.run(10), Status::Unauthenticated);
    assert_eq!(rig.engine.current_state(), State::Idle);

    rig.start();
    rig.run(3);
    rig.engine.disable();
    // Disabling an already disabled engine is a no-op.
    rig.engine.disable();
    let frozen_state = rig.engine.current_state();
    let frozen_status = rig.engine.status();
    rig.run(20);
    assert_eq!(rig.engine.current_state(), frozen_state);
    assert_eq!(rig.engine.status(), frozen_status);
    assert!(!rig.engine.is_enabled());
}

#[test]
fn incompatible_receiver_parks_the_machine() {
    let behavior =
        ReceiverBehavior { hdcp2_capable: false, ..ReceiverBehavior::default() };
    let mut rig = TestRig::with_behavior(behavior);
    rig.start();

    assert_eq!(rig.run(50), Status::IncompatibleReceiver);
    assert_eq!(rig.engine.current_state(), State::Probe);
    assert!(!rig.engine.is_receiver_capable());
    // No authentication traffic ever reached the receiver.
    assert_eq!(rig.receiver().ake_init_count(), 0);
}
