//! # HYQE Schedule
//!
//! Ticks and tick scheduling for hybrid execution.
//!
//! ## Gantree Architecture
//!
//! ```text
//! hyqe_schedule // L4: Scheduling (완료)
//!     L4_Scheduling // 틱 스케줄링 (완료)
//!         Tick // 큐비트 배타적 시간 단계 (완료)
//!         QuantumCircuit // 틱 시퀀스 + 지속시간 검증 (완료)
//!         TimeSlot // 활성 구간 (완료)
//!         GateDurations // 게이트 지속 시간 (완료)
//!         TickScheduler // ASAP 배치 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use hyqe_schedule::prelude::*;
//!
//! let mut circuit = QuantumCircuit::new();
//! circuit.add_gate(0, GateSymbol::H, Location::single(0), vec![]).unwrap();
//! circuit.add_gate(1, GateSymbol::CX, Location::pair(0, 1), vec![]).unwrap();
//!
//! // a qubit cannot be addressed twice in one tick
//! assert!(circuit.add_gate(1, GateSymbol::X, Location::single(1), vec![]).is_err());
//! assert_eq!(circuit.depth(), 2);
//! ```
//!
//! ## Duration Checking
//!
//! ```rust
//! use hyqe_schedule::prelude::*;
//!
//! let durations = GateDurations::default().with_gate_duration(GateSymbol::CX, 3);
//! let mut circuit = QuantumCircuit::new().with_durations(durations).unwrap();
//! circuit.add_gate(0, GateSymbol::CX, Location::pair(0, 1), vec![]).unwrap();
//!
//! // q0 is still busy at tick 1
//! assert!(circuit.add_gate(1, GateSymbol::X, Location::single(0), vec![]).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Duration table (Gantree: L4_Scheduling → GateDurations)
pub mod durations;

/// Ticks (Gantree: L4_Scheduling → Tick)
pub mod tick;

/// Tick circuits (Gantree: L4_Scheduling → QuantumCircuit)
pub mod circuit;

/// ASAP scheduler (Gantree: L4_Scheduling → TickScheduler)
pub mod scheduler;

// ============================================================================
// Re-exports
// ============================================================================

pub use circuit::{QuantumCircuit, TimeSlot};
pub use durations::GateDurations;
pub use scheduler::TickScheduler;
pub use tick::{DispatchGroup, Tick, TickGate};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases

    pub use crate::circuit::{QuantumCircuit, TimeSlot};
    pub use crate::durations::GateDurations;
    pub use crate::scheduler::TickScheduler;
    pub use crate::tick::{DispatchGroup, Tick, TickGate};
    pub use hyqe_classical::prelude::*;
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use serde_json::json;

    #[test]
    fn test_program_to_ticks() {
        let program = LoadedProgram::from_value(
            &json!({"ops": [
                {"data": "qvar_define", "variable": "q", "size": 3},
                {"data": "cvar_define", "variable": "m", "size": 2},
                {"qop": "H", "args": [["q", 0], ["q", 2]]},
                {"qop": "CX", "args": [[["q", 0], ["q", 1]]]},
                {"qop": "Measure", "args": [["q", 0], ["q", 1]], "returns": [["m", 0], ["m", 1]]}
            ]}),
            None,
        )
        .unwrap();

        let mut interp = ClassicalInterpreter::new(&program).unwrap();
        let mut scheduler = TickScheduler::new();
        let mut ticks = Vec::new();
        for buffer in interp.execute(program.ops()) {
            ticks.extend(scheduler.schedule(&buffer.unwrap()).unwrap());
        }

        let circuit = QuantumCircuit::from_ticks(ticks).unwrap();
        assert_eq!(circuit.depth(), 3);
        assert_eq!(circuit.tick(0).unwrap().locations(GateSymbol::H).len(), 2);
        assert_eq!(circuit.tick(2).unwrap().return_targets().len(), 2);
        assert_eq!(circuit.num_qubits(), 3);
    }

    #[test]
    fn test_qparallel_members_share_tick() {
        let program = LoadedProgram::from_value(
            &json!({"ops": [
                {"data": "qvar_define", "variable": "q", "size": 2},
                {"block": "qparallel", "ops": [
                    {"qop": "X", "args": [["q", 0]]},
                    {"qop": "Y", "args": [["q", 1]]}
                ]}
            ]}),
            None,
        )
        .unwrap();

        let mut interp = ClassicalInterpreter::new(&program).unwrap();
        let buffers: Vec<OpBuffer> = interp
            .execute(program.ops())
            .collect::<HyqeResult<_>>()
            .unwrap();
        let ticks = TickScheduler::new().schedule(&buffers[0]).unwrap();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].num_gates(), 2);
    }

    #[test]
    fn test_circuit_serde() {
        let mut circuit = QuantumCircuit::new();
        circuit
            .add_gate(0, GateSymbol::RZ, Location::single(0), vec![0.25])
            .unwrap();
        let text = serde_json::to_string(&circuit).unwrap();
        let back: QuantumCircuit = serde_json::from_str(&text).unwrap();
        assert_eq!(back, circuit);
    }
}
