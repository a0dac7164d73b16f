//! Operating phase state machine
//!
//! Holds the single authoritative operating phase of the robot. The rest of
//! the firmware does not know how the whole sequence works: tasks check for
//! specific phases and report back whether their job succeeded, and the
//! transition table decides what comes next.
//!
//! All mutations go through the one `PHASE` mutex. The regulation task holds
//! the guard for a whole control tick, so a transition made by one regulator
//! is visible to every later check in the same tick.

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

/// Operating phases. The `Led*` phases are transient announce phases: the
/// indicator task plays their animation and then advances the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum Phase {
    /// Idle after power-on or a successful shot, waiting for the reset tone
    Startup,
    /// Remote-controlled movement over the audio channel
    ManualMove,
    /// Sweeping for the ball with the line camera
    SearchBall,
    /// Ball found and centered, committing to the charge
    BallLocked,
    /// Straight-line strike in progress
    ChargeBall,
    /// Announce: leaving manual move for the search
    LedMoveToSearch,
    /// Announce: ball not found, back to manual move
    LedBallNotFound,
    /// Announce: shot completed
    LedSuccess,
}

impl Phase {
    /// Transition table, keyed by the current phase and the success flag of
    /// the operation that just finished. Total: every pair has a next phase.
    pub fn next(self, success: bool) -> Phase {
        match self {
            Phase::Startup => Phase::ManualMove,
            Phase::ManualMove => Phase::LedMoveToSearch,
            Phase::LedMoveToSearch => Phase::SearchBall,
            Phase::SearchBall => {
                if success {
                    Phase::BallLocked
                } else {
                    Phase::LedBallNotFound
                }
            }
            Phase::BallLocked => {
                if success {
                    Phase::ChargeBall
                } else {
                    Phase::LedBallNotFound
                }
            }
            Phase::ChargeBall => {
                if success {
                    Phase::LedSuccess
                } else {
                    Phase::LedBallNotFound
                }
            }
            Phase::LedBallNotFound => Phase::ManualMove,
            Phase::LedSuccess => Phase::Startup,
        }
    }

    /// Whether this is a transient LED announce phase.
    pub fn is_led_announce(self) -> bool {
        matches!(
            self,
            Phase::LedMoveToSearch | Phase::LedBallNotFound | Phase::LedSuccess
        )
    }
}

/// Owner of the current phase. Tasks mutate it only through a guard obtained
/// from [`PHASE`] or the [`switch`] helper, never through a copy.
pub struct PhaseMachine {
    current: Phase,
}

impl PhaseMachine {
    pub const fn new() -> Self {
        Self {
            current: Phase::Startup,
        }
    }

    pub fn get(&self) -> Phase {
        self.current
    }

    pub fn set(&mut self, phase: Phase) {
        self.current = phase;
    }

    /// Applies the transition table for the given outcome.
    pub fn switch(&mut self, success: bool) -> Phase {
        self.current = self.current.next(success);
        self.current
    }
}

/// Global phase, the single synchronization point for all mutations.
pub static PHASE: Mutex<CriticalSectionRawMutex, PhaseMachine> =
    Mutex::new(PhaseMachine::new());

/// Fire-and-forget phase announcement for the indicator task.
static PHASE_ANNOUNCE: Signal<CriticalSectionRawMutex, Phase> = Signal::new();

/// Reads the current phase.
pub async fn get() -> Phase {
    PHASE.lock().await.get()
}

/// Runs one transition and announces the new phase.
pub async fn switch(success: bool) -> Phase {
    let new = PHASE.lock().await.switch(success);
    announce(new);
    new
}

/// Pushes a phase pattern to the indicator. Latest value wins.
pub fn announce(phase: Phase) {
    PHASE_ANNOUNCE.signal(phase);
}

/// Waits for the next announced phase.
pub async fn announced() -> Phase {
    PHASE_ANNOUNCE.wait().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_total_and_exact() {
        for success in [true, false] {
            assert_eq!(Phase::Startup.next(success), Phase::ManualMove);
            assert_eq!(Phase::ManualMove.next(success), Phase::LedMoveToSearch);
            assert_eq!(Phase::LedMoveToSearch.next(success), Phase::SearchBall);
            assert_eq!(Phase::LedBallNotFound.next(success), Phase::ManualMove);
            assert_eq!(Phase::LedSuccess.next(success), Phase::Startup);
        }
        assert_eq!(Phase::SearchBall.next(true), Phase::BallLocked);
        assert_eq!(Phase::SearchBall.next(false), Phase::LedBallNotFound);
        assert_eq!(Phase::BallLocked.next(true), Phase::ChargeBall);
        assert_eq!(Phase::BallLocked.next(false), Phase::LedBallNotFound);
        assert_eq!(Phase::ChargeBall.next(true), Phase::LedSuccess);
        assert_eq!(Phase::ChargeBall.next(false), Phase::LedBallNotFound);
    }

    #[test]
    fn machine_applies_table() {
        let mut pm = PhaseMachine::new();
        assert_eq!(pm.get(), Phase::Startup);
        pm.switch(true);
        pm.switch(true);
        assert_eq!(pm.get(), Phase::LedMoveToSearch);
        pm.set(Phase::SearchBall);
        assert_eq!(pm.switch(false), Phase::LedBallNotFound);
    }

    #[test]
    fn led_announce_phases() {
        assert!(Phase::LedMoveToSearch.is_led_announce());
        assert!(Phase::LedBallNotFound.is_led_announce());
        assert!(Phase::LedSuccess.is_led_announce());
        assert!(!Phase::SearchBall.is_led_announce());
        assert!(!Phase::Startup.is_led_announce());
    }
}
