use tokio::task::AbortHandle;

/// Whether new buy orders may be issued.
///
/// Each suspension gets a fresh generation number. The cooldown timer carries
/// the generation it was armed for, so a timer that outlives its suspension
/// cannot lift a later one.
#[derive(Debug, Default)]
pub struct Admission {
    phase: Phase,
    generation: u64,
}

#[derive(Debug, Default)]
enum Phase {
    #[default]
    Active,
    Suspended {
        timer: Option<AbortHandle>,
    },
}

impl Admission {
    pub fn is_suspended(&self) -> bool {
        matches!(self.phase, Phase::Suspended { .. })
    }

    /// Moves to suspended and returns the generation to arm a cooldown for.
    /// Returns `None` while already suspended so only one timer is ever in flight.
    pub fn try_suspend(&mut self) -> Option<u64> {
        if self.is_suspended() {
            return None;
        }
        self.generation += 1;
        self.phase = Phase::Suspended { timer: None };
        Some(self.generation)
    }

    pub fn attach_timer(&mut self, handle: AbortHandle) {
        if let Phase::Suspended { timer } = &mut self.phase {
            *timer = Some(handle);
        } else {
            handle.abort();
        }
    }

    /// Returns to active if `generation` is the current suspension.
    pub fn lift(&mut self, generation: u64) -> bool {
        if !self.is_suspended() || generation != self.generation {
            return false;
        }
        self.phase = Phase::Active;
        true
    }

    /// Aborts the in-flight cooldown, leaving issuance blocked.
    pub fn cancel_timer(&mut self) {
        if let Phase::Suspended { timer } = &mut self.phase {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
    }
}
