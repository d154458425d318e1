//! Edge side effects.
//!
//! State handlers return the next state; anything that must happen *on*
//! a particular edge lives here, keyed by `(from, to)`. Actions only see
//! the session record, so edges cannot perform IO.

use std::collections::HashMap;

use crate::session::SessionInfo;
use crate::state::{State, Status};

pub(crate) type TransitionAction = fn(&mut SessionInfo);

pub(crate) struct TransitionTable {
    actions: HashMap<(State, State), TransitionAction>,
}

impl TransitionTable {
    pub(crate) fn new() -> Self {
        let mut actions: HashMap<(State, State), TransitionAction> =
            HashMap::new();

        // Every abort edge drops the status back to unauthenticated.
        let abort_sources = [
            State::AkeInit,
            State::AwaitCert,
            State::AwaitHPrimeFresh,
            State::AwaitPairingInfo,
            State::AwaitHPrimeStored,
            State::LocalityCheck,
            State::LocalityVerify,
            State::SessionKeyExchange,
        ];
        for from in abort_sources {
            actions.insert((from, State::AttemptStart), mark_unauthenticated);
        }

        // Entering the locality phase restarts its retry budget.
        actions.insert(
            (State::AwaitPairingInfo, State::LocalityCheck),
            reset_locality_counter,
        );
        actions.insert(
            (State::AwaitHPrimeStored, State::LocalityCheck),
            reset_locality_counter,
        );

        Self { actions }
    }

    pub(crate) fn lookup(
        &self,
        from: State,
        to: State,
    ) -> Option<TransitionAction> {
        self.actions.get(&(from, to)).copied()
    }
}

fn mark_unauthenticated(info: &mut SessionInfo) {
    info.status = Status::Unauthenticated;
}

fn reset_locality_counter(info: &mut SessionInfo) {
    info.locality_check_count = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_edges_mark_the_session_unauthenticated() {
        let table = TransitionTable::new();
        let mut info = SessionInfo::new(0);
        info.status = Status::Busy;

        let action = table
            .lookup(State::LocalityVerify, State::AttemptStart)
            .unwrap();
        action(&mut info);
        assert_eq!(info.status, Status::Unauthenticated);
    }

    #[test]
    fn locality_entry_resets_the_retry_budget() {
        let table = TransitionTable::new();
        let mut info = SessionInfo::new(0);
        info.locality_check_count = 7;

        let action = table
            .lookup(State::AwaitHPrimeStored, State::LocalityCheck)
            .unwrap();
        action(&mut info);
        assert_eq!(info.locality_check_count, 0);
    }

    #[test]
    fn unregistered_edges_have_no_action() {
        let table = TransitionTable::new();
        assert!(table.lookup(State::Idle, State::Probe).is_none());
        assert!(table
            .lookup(State::LocalityVerify, State::LocalityCheck)
            .is_none());
    }
}
