//! Duty-cycle state machine.
//!
//! ```text
//!  ┌─────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//!  │ Heating │───▶│ Sampling │───▶│ Transmitting │───▶│ Sleeping │──┐
//!  └─────────┘    └──────────┘    └──────────────┘    └──────────┘  │
//!       ▲                                                           │
//!       └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition is unconditional.  There is no error state and no
//! terminal state: the node cycles until the battery runs out.  What a
//! phase *does* lives in the scheduler; this module only owns where the
//! cycle is and how many laps it has done.

pub mod context;

use context::CycleContext;
use log::info;

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CyclePhase {
    Heating = 0,
    Sampling = 1,
    Transmitting = 2,
    Sleeping = 3,
}

impl CyclePhase {
    pub const COUNT: usize = 4;

    /// Convert a `u8` index back to a phase.  Out-of-range indices map to
    /// `Heating`, the start of a fresh cycle.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Heating,
            1 => Self::Sampling,
            2 => Self::Transmitting,
            3 => Self::Sleeping,
            _ => {
                debug_assert!(false, "invalid phase index: {idx}");
                Self::Heating
            }
        }
    }

    /// The phase that always follows this one.
    pub fn next(self) -> Self {
        Self::from_index((self as usize + 1) % Self::COUNT)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Heating => "Heating",
            Self::Sampling => "Sampling",
            Self::Transmitting => "Transmitting",
            Self::Sleeping => "Sleeping",
        }
    }
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    current: CyclePhase,
    /// Laps completed (Sleeping → Heating transitions).  Wraps.
    cycles_completed: u32,
}

impl Fsm {
    pub fn new() -> Self {
        Self {
            current: CyclePhase::Heating,
            cycles_completed: 0,
        }
    }

    pub fn current_phase(&self) -> CyclePhase {
        self.current
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    /// Move to the next phase.  Entering `Heating` opens a new cycle and
    /// wipes the previous cycle's values from `ctx`.
    pub fn advance(&mut self, ctx: &mut CycleContext) -> (CyclePhase, CyclePhase) {
        let from = self.current;
        let to = from.next();

        info!("FSM transition: {} -> {}", from.name(), to.name());

        if to == CyclePhase::Heating {
            self.cycles_completed = self.cycles_completed.wrapping_add(1);
            ctx.begin_cycle(self.cycles_completed);
        }
        self.current = to;
        (from, to)
    }
}

impl Default for Fsm {
    fn default() -> Self {
        Self::new()
    }
}
