//! Operation durations
//!
//! Gantree: L4_Scheduling → GateDurations
//!
//! How many ticks each operation keeps its qubits busy. Consulted only when
//! duration tracking is switched on.

use hyqe_core::{durations, GateSymbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Duration table, in ticks
/// Gantree: GateDurations // 게이트 지속 시간
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDurations {
    /// Single-qubit unitary
    /// Gantree: single_qubit: usize // 1Q
    pub single_qubit: usize,

    /// Two-qubit unitary
    /// Gantree: two_qubit: usize // 2Q
    pub two_qubit: usize,

    /// Measurement
    pub measurement: usize,

    /// Init / reset
    pub init: usize,

    /// Machine ops without an override
    pub machine: usize,

    /// Per-gate overrides
    gate_overrides: BTreeMap<GateSymbol, usize>,

    /// Per machine-op overrides
    machine_overrides: BTreeMap<String, usize>,
}

impl GateDurations {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create with explicit class durations
    pub fn new(single_qubit: usize, two_qubit: usize, measurement: usize, init: usize) -> Self {
        Self {
            single_qubit,
            two_qubit,
            measurement,
            init,
            machine: 1,
            gate_overrides: BTreeMap::new(),
            machine_overrides: BTreeMap::new(),
        }
    }

    /// Every operation takes the same number of ticks
    pub fn uniform(ticks: usize) -> Self {
        Self {
            machine: ticks,
            ..Self::new(ticks, ticks, ticks, ticks)
        }
    }

    /// Set a per-gate duration
    pub fn with_gate_duration(mut self, symbol: GateSymbol, ticks: usize) -> Self {
        self.gate_overrides.insert(symbol, ticks);
        self
    }

    /// Set a per machine-op duration
    pub fn with_machine_duration(mut self, name: &str, ticks: usize) -> Self {
        self.machine_overrides.insert(name.to_string(), ticks);
        self
    }

    /// Z rotations and identity take no time
    pub fn with_virtual_z(self) -> Self {
        [
            GateSymbol::I,
            GateSymbol::Z,
            GateSymbol::RZ,
            GateSymbol::SZ,
            GateSymbol::SZdg,
            GateSymbol::T,
            GateSymbol::Tdg,
        ]
        .into_iter()
        .fold(self, |acc, symbol| {
            acc.with_gate_duration(symbol, durations::VIRTUAL_TICKS)
        })
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Duration of a gate
    /// Gantree: gate_duration(symbol) -> usize // 게이트별 시간
    pub fn gate_duration(&self, symbol: GateSymbol) -> usize {
        if let Some(&ticks) = self.gate_overrides.get(&symbol) {
            return ticks;
        }
        if symbol.is_measurement() {
            self.measurement
        } else if symbol.is_init() {
            self.init
        } else if symbol.is_two_qubit() {
            self.two_qubit
        } else {
            self.single_qubit
        }
    }

    /// Duration of a machine op
    pub fn machine_duration(&self, name: &str) -> usize {
        self.machine_overrides
            .get(name)
            .copied()
            .unwrap_or(self.machine)
    }
}

impl Default for GateDurations {
    fn default() -> Self {
        Self::new(
            durations::SINGLE_QUBIT_TICKS,
            durations::TWO_QUBIT_TICKS,
            durations::MEASURE_TICKS,
            durations::INIT_TICKS,
        )
    }
}

impl fmt::Display for GateDurations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GateDurations(1Q={}, 2Q={}, meas={}, init={} ticks)",
            self.single_qubit, self.two_qubit, self.measurement, self.init
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_durations() {
        let d = GateDurations::default();
        assert_eq!(d.gate_duration(GateSymbol::H), 1);
        assert_eq!(d.gate_duration(GateSymbol::CX), 1);
        assert_eq!(d.machine_duration("Idle"), 1);
    }

    #[test]
    fn test_class_durations() {
        let d = GateDurations::new(1, 3, 5, 2);
        assert_eq!(d.gate_duration(GateSymbol::SX), 1);
        assert_eq!(d.gate_duration(GateSymbol::RZZ), 3);
        assert_eq!(d.gate_duration(GateSymbol::Measure), 5);
        assert_eq!(d.gate_duration(GateSymbol::Init), 2);
    }

    #[test]
    fn test_overrides() {
        let d = GateDurations::uniform(2)
            .with_gate_duration(GateSymbol::SWAP, 6)
            .with_machine_duration("Transport", 10)
            .with_virtual_z();
        assert_eq!(d.gate_duration(GateSymbol::SWAP), 6);
        assert_eq!(d.gate_duration(GateSymbol::RZ), 0);
        assert_eq!(d.gate_duration(GateSymbol::X), 2);
        assert_eq!(d.machine_duration("Transport"), 10);
        assert_eq!(d.machine_duration("Idle"), 2);
    }
}
