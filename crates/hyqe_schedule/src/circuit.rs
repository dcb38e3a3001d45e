//! Tick circuits
//!
//! Gantree: L4_Scheduling → QuantumCircuit
//!
//! An ordered sequence of ticks. Tick exclusivity is always enforced by
//! [`Tick`]; duration overlap across ticks is checked only when a duration
//! table is attached with [`QuantumCircuit::with_durations`].

use crate::durations::GateDurations;
use crate::tick::Tick;
use hyqe_core::{Angle, GateSymbol, HyqeError, HyqeResult, Location, QubitId};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TimeSlot - For overlap detection
// ============================================================================

/// Active interval `[start, end)` of a qubit, in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Qubit ID
    pub qubit: QubitId,
    /// First tick
    pub start: usize,
    /// One past the last tick
    pub end: usize,
}

impl TimeSlot {
    /// Create a new time slot
    pub fn new(qubit: QubitId, start: usize, end: usize) -> Self {
        Self { qubit, start, end }
    }

    /// Check if two slots of the same qubit overlap
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.qubit == other.qubit && self.start < other.end && other.start < self.end
    }
}

// ============================================================================
// QuantumCircuit
// ============================================================================

/// Ordered ticks
/// Gantree: QuantumCircuit // 틱 시퀀스
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuantumCircuit {
    /// Ticks in temporal order
    /// Gantree: ticks: Vec<Tick> // 틱 목록
    ticks: Vec<Tick>,

    /// Duration table, set when overlap checking is on
    durations: Option<GateDurations>,

    /// Active intervals recorded so far
    slots: Vec<TimeSlot>,
}

impl QuantumCircuit {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an empty circuit
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable duration-overlap checking
    ///
    /// Ticks already in the circuit are validated against the table.
    pub fn with_durations(mut self, durations: GateDurations) -> HyqeResult<Self> {
        self.durations = Some(durations);
        self.slots.clear();
        let ticks = std::mem::take(&mut self.ticks);
        for tick in &ticks {
            self.record_slots(tick)?;
        }
        self.ticks = ticks;
        Ok(self)
    }

    /// Build from ticks, re-indexing them in order
    pub fn from_ticks(ticks: Vec<Tick>) -> HyqeResult<Self> {
        let mut circuit = Self::new();
        for tick in ticks {
            circuit.append_tick(tick)?;
        }
        Ok(circuit)
    }

    // ========================================================================
    // Building
    // ========================================================================

    /// Append a tick at the end
    /// Gantree: append_tick(tick) -> Result<index> // 틱 추가
    pub fn append_tick(&mut self, mut tick: Tick) -> HyqeResult<usize> {
        let index = self.ticks.len();
        tick.set_index(index);
        self.record_slots(&tick)?;
        self.ticks.push(tick);
        Ok(index)
    }

    /// Add a gate to a tick, growing the circuit as needed
    /// Gantree: add_gate(tick, symbol, location, angles) -> Result // 게이트 추가
    pub fn add_gate(
        &mut self,
        tick: usize,
        symbol: GateSymbol,
        location: Location,
        angles: Vec<Angle>,
    ) -> HyqeResult<()> {
        while self.ticks.len() <= tick {
            let index = self.ticks.len();
            self.ticks.push(Tick::new(index));
        }
        let slots = self.gate_slots(tick, symbol, &location);
        // exclusivity errors take precedence over duration errors
        if self.ticks[tick].is_free(location.qubits()) {
            self.check_slots(&slots)?;
        }
        self.ticks[tick].add_gate(symbol, location, angles)?;
        self.slots.extend(slots);
        Ok(())
    }

    fn gate_slots(&self, tick: usize, symbol: GateSymbol, location: &Location) -> Vec<TimeSlot> {
        match &self.durations {
            Some(d) => {
                let end = tick + d.gate_duration(symbol);
                location
                    .qubits()
                    .iter()
                    .map(|&q| TimeSlot::new(q, tick, end))
                    .collect()
            }
            None => Vec::new(),
        }
    }

    fn tick_slots(&self, tick: &Tick) -> Vec<TimeSlot> {
        let Some(d) = &self.durations else {
            return Vec::new();
        };
        let start = tick.index();
        let mut slots = Vec::new();
        for (symbol, gates) in tick.gates() {
            for gate in gates {
                slots.extend(self.gate_slots(start, symbol, &gate.location));
            }
        }
        for op in tick.machine_ops() {
            let end = start + d.machine_duration(&op.name);
            slots.extend(op.qubits().map(|q| TimeSlot::new(q, start, end)));
        }
        slots
    }

    fn check_slots(&self, slots: &[TimeSlot]) -> HyqeResult<()> {
        for slot in slots {
            if let Some(busy) = self.slots.iter().find(|s| s.overlaps(slot)) {
                return Err(HyqeError::DurationOverlap {
                    qubit: slot.qubit,
                    tick: slot.start,
                    busy_until: busy.end,
                });
            }
        }
        Ok(())
    }

    fn record_slots(&mut self, tick: &Tick) -> HyqeResult<()> {
        let slots = self.tick_slots(tick);
        self.check_slots(&slots)?;
        self.slots.extend(slots);
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Ticks in temporal order
    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    /// One tick
    pub fn tick(&self, index: usize) -> Option<&Tick> {
        self.ticks.get(index)
    }

    /// Consume into ticks
    pub fn into_ticks(self) -> Vec<Tick> {
        self.ticks
    }

    /// Number of ticks
    pub fn depth(&self) -> usize {
        self.ticks.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Smallest register size covering every addressed qubit
    pub fn num_qubits(&self) -> usize {
        self.ticks
            .iter()
            .filter_map(|t| t.qubits().iter().next_back())
            .max()
            .map_or(0, |&q| q + 1)
    }

    /// Total gate locations
    pub fn num_gates(&self) -> usize {
        self.ticks.iter().map(Tick::num_gates).sum()
    }

    /// Duration table, if overlap checking is on
    pub fn durations(&self) -> Option<&GateDurations> {
        self.durations.as_ref()
    }

    /// Recorded active intervals
    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.slots
    }
}

impl fmt::Display for QuantumCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "QuantumCircuit: {} ticks, {} gates",
            self.depth(),
            self.num_gates()
        )?;
        for tick in &self.ticks {
            writeln!(f, "  {}", tick)?;
        }
        Ok(())
    }
}
