//! Sampling cadence: the wait/act loop and the signal that interrupts it

mod cadence;
mod wake;

pub use cadence::{ActOutcome, CadenceScheduler, CadenceSettings, SchedulerError};
pub use wake::{WakeOutcome, WakeSignal};
