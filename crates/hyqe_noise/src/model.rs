//! Error model contract
//!
//! Gantree: L5_Noise → ErrorModel
//!
//! The engine asks the error model for each tick's faults before the tick
//! runs. Faults are expressed as ordinary ticks dispatched before and after
//! the ideal tick, plus locations the model takes over entirely.

use hyqe_classical::ShotEnvironment;
use hyqe_core::{HyqeResult, Location, Outcomes};
use hyqe_schedule::Tick;
use std::collections::BTreeSet;

/// Faults generated for one tick
/// Gantree: TickErrors // before/after/replaced
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickErrors {
    /// Dispatched before the ideal tick; outcomes are discarded
    pub before: Tick,

    /// Dispatched after the ideal tick; outcomes are discarded
    pub after: Tick,

    /// Ideal locations the engine must not dispatch
    pub replaced: BTreeSet<Location>,

    /// Outcomes reported in place of replaced measurements
    pub forced_outcomes: Outcomes,
}

impl TickErrors {
    /// No faults for the given tick
    pub fn none(index: usize) -> Self {
        Self {
            before: Tick::new(index),
            after: Tick::new(index),
            replaced: BTreeSet::new(),
            forced_outcomes: Outcomes::new(),
        }
    }

    /// Check if the ideal tick runs untouched
    pub fn is_empty(&self) -> bool {
        self.before.is_empty()
            && self.after.is_empty()
            && self.replaced.is_empty()
            && self.forced_outcomes.is_empty()
    }

    /// Replace a location, optionally reporting a forced outcome for it
    pub fn replace(&mut self, location: Location, outcome: Option<u8>) {
        if let Some(value) = outcome {
            self.forced_outcomes.insert(location.clone(), value);
        }
        self.replaced.insert(location);
    }
}

/// Per-tick error generation
/// Gantree: ErrorModel // trait
///
/// One instance serves one shot at a time. Concurrent shots each get their
/// own instance from [`reset`](ErrorModel::reset).
pub trait ErrorModel: Send {
    /// Model name for logging
    fn name(&self) -> &str;

    /// Prepare for a program acting on `num_qubits` qubits
    fn start(&mut self, num_qubits: usize) -> HyqeResult<()> {
        let _ = num_qubits;
        Ok(())
    }

    /// Reinitialise per-shot state and reseed
    /// Gantree: shot_reinit(seed) // 샷별 초기화
    fn shot_reinit(&mut self, seed: u64);

    /// Faults for one tick
    /// Gantree: generate_tick_errors(tick,time,env) -> TickErrors // 틱 에러 생성
    ///
    /// `time` is the tick's index within the shot. The shot environment is
    /// readable so errors may depend on classical state.
    fn generate_tick_errors(
        &mut self,
        tick: &Tick,
        time: usize,
        env: &ShotEnvironment,
    ) -> HyqeResult<TickErrors>;

    /// Fresh instance with the same parameters
    fn reset(&self) -> Box<dyn ErrorModel>;
}
