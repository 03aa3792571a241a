//! Poller lifecycle

use halo_core::StateMachine;

/// Lifecycle of one poller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PollState {
    Idle,
    Polling,
    Verified,
    Stopped,
}

impl PollState {
    /// `Verified` and `Stopped` accept no further events
    pub fn is_terminal(self) -> bool {
        matches!(self, PollState::Verified | PollState::Stopped)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PollEvent {
    Start,
    /// Transport or decode failure; retried on the next tick
    CheckFailed,
    NotVerified,
    Verified,
    Cancel,
    /// The session was already verified when the poller was asked to start
    AlreadyVerified,
}

/// The poller's transition table
pub(crate) fn poll_machine() -> StateMachine<PollState, PollEvent> {
    StateMachine::builder(PollState::Idle)
        .on(PollState::Idle, PollEvent::Start, PollState::Polling)
        .on(PollState::Idle, PollEvent::AlreadyVerified, PollState::Stopped)
        .on(PollState::Idle, PollEvent::Cancel, PollState::Stopped)
        .on(PollState::Polling, PollEvent::CheckFailed, PollState::Polling)
        .on(PollState::Polling, PollEvent::NotVerified, PollState::Polling)
        .on(PollState::Polling, PollEvent::Verified, PollState::Verified)
        .on(PollState::Polling, PollEvent::Cancel, PollState::Stopped)
        .build()
}

/// Whether a "pending verification" notice should be shown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerificationState {
    pub pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polling_loops_until_verified() {
        let mut machine = poll_machine();
        assert_eq!(machine.try_send(PollEvent::Start), Some(PollState::Polling));
        assert_eq!(machine.try_send(PollEvent::NotVerified), Some(PollState::Polling));
        assert_eq!(machine.try_send(PollEvent::CheckFailed), Some(PollState::Polling));
        assert_eq!(machine.try_send(PollEvent::Verified), Some(PollState::Verified));
        assert!(machine.current_state().is_terminal());
    }

    #[test]
    fn test_terminal_states_ignore_events() {
        let mut machine = poll_machine();
        machine.send(PollEvent::Start);
        machine.send(PollEvent::Cancel);
        assert_eq!(machine.current_state(), PollState::Stopped);

        for event in [
            PollEvent::Start,
            PollEvent::Verified,
            PollEvent::NotVerified,
            PollEvent::Cancel,
        ] {
            assert_eq!(machine.try_send(event), None);
        }
        assert_eq!(machine.history().len(), 2);
    }

    #[test]
    fn test_already_verified_never_polls() {
        let mut machine = poll_machine();
        assert_eq!(
            machine.try_send(PollEvent::AlreadyVerified),
            Some(PollState::Stopped)
        );
        assert!(!machine.can_send(PollEvent::Start));
    }
}
