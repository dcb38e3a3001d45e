//! # HYQE Engine
//!
//! Hybrid classical/quantum execution: runs shots of a loaded program
//! against a simulator backend and an error model, folding measurement
//! outcomes back into classical control flow tick by tick.
//!
//! ## Gantree Architecture
//!
//! ```text
//! hyqe_engine // L7: Integration (완료)
//!     L7_Integration // 실행 엔진 (완료)
//!         EngineConfig // 실행 설정 (완료)
//!         ShotSeeds // 카운터 기반 시드 (완료)
//!         HybridEngine // 샷 루프 + 병렬 실행 (완료)
//!         RunResults // 결과 집계 + 실패 요약 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use hyqe_engine::prelude::*;
//! use serde_json::json;
//!
//! let program = LoadedProgram::from_value(
//!     &json!({"ops": [
//!         {"data": "qvar_define", "variable": "q", "size": 2},
//!         {"data": "cvar_define", "variable": "m", "size": 2},
//!         {"qop": "H", "args": [["q", 0]]},
//!         {"qop": "CX", "args": [[["q", 0], ["q", 1]]]},
//!         {"qop": "Measure", "args": [["q", 0], ["q", 1]],
//!          "returns": [["m", 0], ["m", 1]]}
//!     ]}),
//!     None,
//! )
//! .unwrap();
//!
//! let engine = HybridEngine::new(EngineConfig::batch(10).with_seed(7)).unwrap();
//! let results = engine
//!     .run(&program, &StatevectorBackend::new(), &mut IdealErrorModel::new(), None)
//!     .unwrap();
//!
//! for value in results.values("m").unwrap() {
//!     assert!(value.to_string() == "00" || value.to_string() == "11");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Configuration (Gantree: L7_Integration → EngineConfig)
pub mod config;

/// Seed derivation (Gantree: L7_Integration → ShotSeeds)
pub mod seed;

/// Result types (Gantree: L7_Integration → RunResults)
pub mod result;

/// Shot driver (Gantree: L7_Integration → HybridEngine)
pub mod engine;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{EngineConfig, FailurePolicy, OutputFormat};
pub use engine::{run_tick, HybridEngine};
pub use result::{CircuitResult, RegisterOutput, RunResults, ShotFailure, ShotResult, TickOutcome};
pub use seed::{shot_seed, ShotSeeds};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases

    pub use crate::config::{EngineConfig, FailurePolicy, OutputFormat};
    pub use crate::engine::HybridEngine;
    pub use crate::result::{
        CircuitResult, RegisterOutput, RunResults, ShotFailure, ShotResult, TickOutcome,
    };
    pub use crate::seed::shot_seed;
    pub use hyqe_backend::{Backend, BackendInfo, QuantumState, StatevectorBackend};
    pub use hyqe_noise::prelude::*;
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

    fn program(value: serde_json::Value) -> LoadedProgram {
        LoadedProgram::from_value(&value, None).unwrap()
    }

    #[test]
    fn test_ghz_with_depolarizing_noise() {
        let program = program(json!({"ops": [
            {"data": "qvar_define", "variable": "q", "size": 3},
            {"data": "cvar_define", "variable": "m", "size": 3},
            {"qop": "H", "args": [["q", 0]]},
            {"qop": "CX", "args": [[["q", 0], ["q", 1]]]},
            {"qop": "CX", "args": [[["q", 1], ["q", 2]]]},
            {"qop": "Measure", "args": ["q"], "returns": [["m", 0], ["m", 1], ["m", 2]]}
        ]}));
        let engine = HybridEngine::new(EngineConfig::batch(50).with_seed(1)).unwrap();

        let ideal = engine
            .run(&program, &StatevectorBackend::new(), &mut IdealErrorModel::new(), None)
            .unwrap();
        let counts = ideal.counts("m");
        assert!(counts
            .keys()
            .all(|k| k.to_string() == "000" || k.to_string() == "111"));
        assert_eq!(counts.values().sum::<usize>(), 50);

        let noisy = engine
            .run(
                &program,
                &StatevectorBackend::new(),
                &mut DepolarizingErrorModel::new(0.0, 0.0, 1.0, 0.0).unwrap(),
                None,
            )
            .unwrap();
        // every readout flipped: 000 ↔ 111 swap, still correlated
        assert!(noisy
            .values("m")
            .unwrap()
            .iter()
            .all(|v| v.to_string() == "000" || v.to_string() == "111"));
    }

    #[test]
    fn test_repeat_until_success_loop_unrolled() {
        // measure, then correct to |0> when the outcome was 1
        let program = program(json!({"ops": [
            {"data": "qvar_define", "variable": "q", "size": 1},
            {"data": "cvar_define", "variable": "m", "size": 1},
            {"data": "cvar_define", "variable": "f", "size": 1},
            {"qop": "H", "args": [["q", 0]]},
            {"qop": "Measure", "args": [["q", 0]], "returns": [["m", 0]]},
            {"block": "if", "condition": {"cop": "==", "args": ["m", 1]},
             "true_branch": [{"qop": "X", "args": [["q", 0]]}]},
            {"qop": "Measure", "args": [["q", 0]], "returns": [["f", 0]]}
        ]}));
        let engine = HybridEngine::new(EngineConfig::batch(30).with_seed(11)).unwrap();
        let results = engine
            .run(&program, &StatevectorBackend::new(), &mut IdealErrorModel::new(), None)
            .unwrap();
        assert!(results
            .values("f")
            .unwrap()
            .iter()
            .all(|v| *v == RegisterOutput::Bits("0".into())));
    }

    #[test]
    fn test_duration_checked_circuit_rejected() {
        let mut circuit = QuantumCircuit::new();
        circuit
            .add_gate(0, GateSymbol::X, Location::single(0), vec![])
            .unwrap();
        circuit
            .add_gate(1, GateSymbol::X, Location::single(0), vec![])
            .unwrap();

        let lenient = HybridEngine::default();
        assert!(lenient
            .run_circuit(&circuit, &StatevectorBackend::new(), &mut IdealErrorModel::new())
            .is_ok());

        let strict =
            HybridEngine::new(EngineConfig::default().with_durations(GateDurations::uniform(2)))
                .unwrap();
        let err = strict
            .run_circuit(&circuit, &StatevectorBackend::new(), &mut IdealErrorModel::new())
            .unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_results_to_json() {
        let program = program(json!({"ops": [
            {"data": "cvar_define", "variable": "c", "size": 4},
            {"cop": "=", "args": [5], "returns": ["c"]}
        ]}));
        let engine = HybridEngine::new(
            EngineConfig::batch(2).with_output_format(OutputFormat::Integer),
        )
        .unwrap();
        let results = engine
            .run(&program, &StatevectorBackend::new(), &mut IdealErrorModel::new(), None)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&results.to_json().unwrap()).unwrap();
        assert_eq!(value["registers"]["c"], json!([5, 5]));
        assert_eq!(value["failures"], json!([]));
    }
}
