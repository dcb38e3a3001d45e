//! Ideal error model
//!
//! Gantree: L5_Noise → IdealErrorModel

use crate::model::{ErrorModel, TickErrors};
use hyqe_classical::ShotEnvironment;
use hyqe_core::HyqeResult;
use hyqe_schedule::Tick;

/// Error model that never injects faults
#[derive(Debug, Clone, Copy, Default)]
pub struct IdealErrorModel;

impl IdealErrorModel {
    /// Create the ideal model
    pub fn new() -> Self {
        Self
    }
}

impl ErrorModel for IdealErrorModel {
    fn name(&self) -> &str {
        "ideal"
    }

    fn shot_reinit(&mut self, _seed: u64) {}

    fn generate_tick_errors(
        &mut self,
        tick: &Tick,
        _time: usize,
        _env: &ShotEnvironment,
    ) -> HyqeResult<TickErrors> {
        Ok(TickErrors::none(tick.index()))
    }

    fn reset(&self) -> Box<dyn ErrorModel> {
        Box::new(*self)
    }
}
