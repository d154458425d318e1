//! Receiver fault scenarios: silence, corruption, re-auth requests.

use hdcp_core::Status;
use hdcp_harness::{ReceiverBehavior, TestRig};

#[test]
fn silent_receiver_times_out_and_the_engine_retries() {
    let behavior =
        ReceiverBehavior { respond_cert: false, ..ReceiverBehavior::default() };
    let mut rig = TestRig::with_behavior(behavior);
    rig.start();

    let mut authenticated = false;
    for _ in 0..400 {
        authenticated |= rig.tick() == Status::Authenticated;
    }
    assert!(!authenticated);
    // Each timed-out attempt restarts with a fresh AKE_Init.
    assert!(rig.receiver().ake_init_count() >= 2);
}

#[test]
fn corrupted_h_prime_aborts_and_invalidates_the_pairing() {
    let behavior = ReceiverBehavior {
        corrupt_h_prime: true,
        ..ReceiverBehavior::default()
    };
    let mut rig = TestRig::with_behavior(behavior);
    rig.start();

    rig.run(40);
    assert!(!rig.engine.is_authenticated());
    // Every retry ran the full key exchange again: the mismatch dropped
    // the cached pairing each time.
    let verifications = rig.crypto.signature_verifications();
    assert!(verifications >= 2);
    assert_eq!(rig.receiver().no_stored_km_count(), verifications);

    rig.receiver().behavior_mut().corrupt_h_prime = false;
    rig.run_until(Status::Authenticated, 2_000)
        .expect("recovers once the receiver answers correctly");
}

#[test]
fn stored_km_mismatch_falls_back_to_a_full_key_exchange() {
    let mut rig = TestRig::new();
    rig.start();
    rig.run_until(Status::Authenticated, 2_000).unwrap();
    assert_eq!(rig.crypto.signature_verifications(), 1);

    rig.receiver().behavior_mut().corrupt_h_prime = true;
    rig.engine.authenticate().unwrap();
    // The stored-path attempt aborts on the H' mismatch.
    rig.run_until(Status::Unauthenticated, 100)
        .expect("stored-km attempt should abort");
    assert_eq!(rig.receiver().stored_km_count(), 1);

    rig.receiver().behavior_mut().corrupt_h_prime = false;
    rig.run_until(Status::Authenticated, 2_000).unwrap();
    // The pairing was invalidated, so recovery verified the certificate
    // and exchanged keys from scratch.
    assert_eq!(rig.crypto.signature_verifications(), 2);
    assert_eq!(rig.receiver().no_stored_km_count(), 2);
}

#[test]
fn missing_pairing_info_never_authenticates() {
    let behavior = ReceiverBehavior {
        respond_pairing_info: false,
        ..ReceiverBehavior::default()
    };
    let mut rig = TestRig::with_behavior(behavior);
    rig.start();

    let mut authenticated = false;
    for _ in 0..700 {
        authenticated |= rig.tick() == Status::Authenticated;
    }
    assert!(!authenticated);
    // Each attempt restarted the exchange from the certificate.
    assert!(rig.crypto.signature_verifications() >= 2);
}

#[test]
fn reauth_request_triggers_a_new_attempt() {
    let mut rig = TestRig::new();
    rig.start();
    rig.run_until(Status::Authenticated, 2_000).unwrap();

    rig.receiver().behavior_mut().request_reauth = true;
    rig.run_until(Status::ReauthRequested, 1_500)
        .expect("re-auth check should observe the request");

    rig.receiver().behavior_mut().request_reauth = false;
    rig.run_until(Status::Authenticated, 2_000)
        .expect("new attempt should authenticate again");
    // The re-authentication reused the stored pairing.
    assert_eq!(rig.receiver().stored_km_count(), 1);
    assert_eq!(rig.auth_events(), 2);
}
