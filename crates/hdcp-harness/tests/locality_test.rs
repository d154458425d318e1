//! Locality check retry behavior.

use hdcp_core::Status;
use hdcp_harness::{ReceiverBehavior, TestRig};

#[test]
fn locality_retries_are_bounded_at_the_ceiling() {
    let behavior = ReceiverBehavior {
        corrupt_l_prime: true,
        ..ReceiverBehavior::default()
    };
    let mut rig = TestRig::with_behavior(behavior);
    rig.start();

    // The attempt stays busy through every failed round, then aborts
    // when the ceiling is exhausted.
    rig.run_until(Status::Unauthenticated, 4_000)
        .expect("attempt should abort at the retry ceiling");
    assert_eq!(rig.receiver().lc_init_count(), 1024);
}

#[test]
fn locality_recovers_within_the_budget() {
    let behavior = ReceiverBehavior {
        corrupt_l_prime: true,
        ..ReceiverBehavior::default()
    };
    let mut rig = TestRig::with_behavior(behavior);
    rig.start();
    rig.run(50);
    assert!(!rig.engine.is_authenticated());
    let failed_rounds = rig.receiver().lc_init_count();
    assert!(failed_rounds > 1);

    rig.receiver().behavior_mut().corrupt_l_prime = false;
    rig.run_until(Status::Authenticated, 2_000)
        .expect("a correct L' within the budget completes the attempt");
    assert!(rig.receiver().lc_init_count() > failed_rounds);
}

#[test]
fn silent_locality_responder_retries_on_timeout() {
    let behavior = ReceiverBehavior {
        respond_l_prime: false,
        ..ReceiverBehavior::default()
    };
    let mut rig = TestRig::with_behavior(behavior);
    rig.start();

    // Rounds now cost a full 20ms timeout each.
    rig.run(150);
    assert!(!rig.engine.is_authenticated());
    assert!(rig.receiver().lc_init_count() >= 2);

    rig.receiver().behavior_mut().respond_l_prime = true;
    rig.run_until(Status::Authenticated, 2_000)
        .expect("responses resume and the attempt completes");
}
