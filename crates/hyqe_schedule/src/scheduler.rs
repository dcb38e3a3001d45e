//! Tick scheduler
//!
//! Gantree: L4_Scheduling → TickScheduler
//!
//! Packs op buffers into ticks ASAP. Each location is placed at the first
//! tick where all of its qubits are available. Buffers are scheduled in
//! order within one shot, so the scheduler keeps per-qubit availability
//! between calls and is reset at shot start.

use crate::durations::GateDurations;
use crate::tick::{Tick, TickGate};
use hyqe_classical::{BufferedOp, OpBuffer};
use hyqe_core::{HyqeResult, QubitId};
use hyqe_ir::{MOp, QOp};
use std::collections::BTreeMap;

/// ASAP scheduler over op buffers
/// Gantree: TickScheduler // 틱 스케줄러
#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    /// Duration table, when durations are tracked
    durations: Option<GateDurations>,

    /// First tick at which each qubit is free again
    /// Gantree: qubit_available: BTreeMap<QubitId, usize> // 가용 틱
    qubit_available: BTreeMap<QubitId, usize>,

    /// Nothing may start before this tick (global barriers, earlier buffers)
    floor: usize,
}

impl TickScheduler {
    /// Create a scheduler where every op takes one tick
    pub fn new() -> Self {
        Self::default()
    }

    /// Track durations
    pub fn with_durations(mut self, durations: GateDurations) -> Self {
        self.durations = Some(durations);
        self
    }

    /// Forget all availability; call at shot start
    pub fn reset(&mut self) {
        self.qubit_available.clear();
        self.floor = 0;
    }

    /// Index of the next tick to be produced
    pub fn next_tick(&self) -> usize {
        self.floor
    }

    // ========================================================================
    // ASAP Scheduling
    // ========================================================================

    /// Schedule one buffer
    /// Gantree: schedule(OpBuffer) -> Result<Vec<Tick>> // ASAP 배치
    ///
    /// Returned ticks carry shot-global indices starting at
    /// [`next_tick`](Self::next_tick). Ops marked `error_free` only share
    /// ticks with other `error_free` ops.
    pub fn schedule(&mut self, buffer: &OpBuffer) -> HyqeResult<Vec<Tick>> {
        let base = self.floor;
        let mut ticks: Vec<Tick> = Vec::new();

        for op in buffer.ops() {
            match op {
                BufferedOp::Quantum(qop) => self.place_qop(qop, base, &mut ticks)?,
                BufferedOp::Machine(mop) => self.place_machine(mop, base, &mut ticks)?,
                BufferedOp::Barrier(qubits) => self.barrier(qubits),
            }
        }

        self.floor = base + ticks.len();
        log::debug!(
            "scheduled {} ops into ticks {}..{}",
            buffer.len(),
            base,
            self.floor
        );
        Ok(ticks)
    }

    fn place_qop(&mut self, op: &QOp, base: usize, ticks: &mut Vec<Tick>) -> HyqeResult<()> {
        let error_free = op.is_error_free();
        let duration = self.gate_ticks(op);
        for (i, location) in op.locations.iter().enumerate() {
            let qubits = location.qubits();
            let index = self.find_tick(qubits, error_free, base, ticks);
            let mut gate = TickGate::new(location.clone()).with_angles(op.angles.clone());
            if let Some(target) = op.returns.get(i) {
                gate = gate.with_returns(target.clone());
            }
            ticks[index - base].add(op.symbol, gate)?;
            self.update_availability(qubits, index + duration);
        }
        Ok(())
    }

    fn place_machine(&mut self, op: &MOp, base: usize, ticks: &mut Vec<Tick>) -> HyqeResult<()> {
        let qubits: Vec<QubitId> = op.qubits().collect();
        let error_free = hyqe_ir::is_error_free(&op.metadata);
        let duration = self
            .durations
            .as_ref()
            .map_or(1, |d| d.machine_duration(&op.name).max(1));
        let index = self.find_tick(&qubits, error_free, base, ticks);
        ticks[index - base].add_machine(op.clone())?;
        self.update_availability(&qubits, index + duration);
        Ok(())
    }

    /// Empty list synchronises every qubit
    fn barrier(&mut self, qubits: &[QubitId]) {
        if qubits.is_empty() {
            let level = self.qubit_available.values().copied().fold(self.floor, usize::max);
            self.floor = level;
            return;
        }
        let level = self.earliest_start(qubits);
        for &q in qubits {
            self.qubit_available.insert(q, level);
        }
    }

    fn gate_ticks(&self, op: &QOp) -> usize {
        self.durations
            .as_ref()
            .map_or(1, |d| d.gate_duration(op.symbol).max(1))
    }

    fn earliest_start(&self, qubits: &[QubitId]) -> usize {
        qubits
            .iter()
            .filter_map(|q| self.qubit_available.get(q))
            .copied()
            .fold(self.floor, usize::max)
    }

    /// First tick at or after availability whose error class matches
    fn find_tick(
        &self,
        qubits: &[QubitId],
        error_free: bool,
        base: usize,
        ticks: &mut Vec<Tick>,
    ) -> usize {
        let mut index = self.earliest_start(qubits);
        loop {
            while ticks.len() <= index - base {
                ticks.push(Tick::new(base + ticks.len()));
            }
            let tick = &mut ticks[index - base];
            if tick.is_empty() {
                if error_free && !tick.is_error_free() {
                    *tick = Tick::error_free(index);
                } else if !error_free && tick.is_error_free() {
                    *tick = Tick::new(index);
                }
                return index;
            }
            if tick.is_error_free() == error_free && tick.is_free(qubits) {
                return index;
            }
            index += 1;
        }
    }

    fn update_availability(&mut self, qubits: &[QubitId], until: usize) {
        for &q in qubits {
            self.qubit_available.insert(q, until);
        }
    }
}
