//! Message-wait behavior: timer expiry versus early polling.

use hdcp_core::Status;
use hdcp_harness::TestRig;

#[test]
fn expiry_only_waits_complete_but_pay_the_full_deadlines() {
    let mut deferred = TestRig::new();
    deferred.engine.set_message_polling_value(0);
    deferred.start();
    let deferred_ticks = deferred
        .run_until(Status::Authenticated, 8_000)
        .expect("expiry-driven waits still authenticate");

    let mut eager = TestRig::new();
    eager.start();
    let eager_ticks = eager
        .run_until(Status::Authenticated, 8_000)
        .expect("early polling authenticates");

    // Without early polling every wait runs to its deadline; the
    // certificate and key-exchange deadlines alone dominate the eager
    // run's total.
    assert!(deferred_ticks > eager_ticks);
    assert!(deferred_ticks >= 1_000);
}

#[test]
fn early_polling_shortcuts_a_staged_message() {
    let mut rig = TestRig::new();
    rig.start();
    let ticks = rig
        .run_until(Status::Authenticated, 8_000)
        .expect("early polling authenticates");

    // The only full waits left are the cipher settle delay and state
    // stepping; the per-message deadlines (100 + 1000 + 200 + 20) are
    // all skipped.
    assert!(ticks < 600);
}

#[test]
fn coarser_polling_divisors_still_authenticate() {
    let mut rig = TestRig::new();
    rig.engine.set_message_polling_value(4);
    rig.start();
    // With divisor 4 the engine only starts polling RXSTATUS in the last
    // quarter of each wait.
    rig.run_until(Status::Authenticated, 8_000)
        .expect("late-window polling authenticates");
}
