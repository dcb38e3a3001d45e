//! # HYQE Backend
//!
//! Simulator contract for hybrid execution, plus a dense statevector
//! reference backend.
//!
//! ## Gantree Architecture
//!
//! ```text
//! hyqe_backend // L6: Backend (완료)
//!     L6_Backend // 시뮬레이터 (완료)
//!         Backend // 공유 백엔드 trait (완료)
//!         QuantumState // 샷별 상태 trait (완료)
//!         StatevectorBackend // 상태벡터 구현 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use hyqe_backend::prelude::*;
//!
//! let backend = StatevectorBackend::new();
//! let mut state = backend.create_state(2, 7).unwrap();
//!
//! state.run_gate(GateSymbol::X, &[Location::single(0)], &[]).unwrap();
//! state.run_gate(GateSymbol::CX, &[Location::pair(0, 1)], &[]).unwrap();
//! let outcomes = state
//!     .run_gate(GateSymbol::Measure, &[Location::single(1)], &[])
//!     .unwrap();
//! assert_eq!(outcomes[&Location::single(1)], 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Backend contract (Gantree: L6_Backend → BackendTrait)
pub mod backend;

/// Statevector simulator (Gantree: L6_Backend → StatevectorBackend)
pub mod statevector;

// ============================================================================
// Re-exports
// ============================================================================

pub use backend::{Backend, BackendInfo, QuantumState};
pub use statevector::{StatevectorBackend, StatevectorState};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases

    pub use crate::backend::{Backend, BackendInfo, QuantumState};
    pub use crate::statevector::{StatevectorBackend, StatevectorState};
    pub use hyqe_core::prelude::*;
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_shared_backend_private_states() {
        let backend: Arc<dyn Backend> = Arc::new(StatevectorBackend::new());
        let mut a = backend.create_state(1, 1).unwrap();
        let mut b = backend.create_state(1, 1).unwrap();

        a.run_gate(GateSymbol::X, &[Location::single(0)], &[])
            .unwrap();
        let out_b = b
            .run_gate(GateSymbol::Measure, &[Location::single(0)], &[])
            .unwrap();
        assert_eq!(out_b[&Location::single(0)], 0);
        assert_eq!(a.num_qubits(), 1);
    }

    #[test]
    fn test_ghz_parity() {
        let backend = StatevectorBackend::new();
        for seed in 0..10 {
            let mut s = backend.create_state(4, seed).unwrap();
            s.run_gate(GateSymbol::H, &[Location::single(0)], &[])
                .unwrap();
            for q in 0..3 {
                s.run_gate(GateSymbol::CX, &[Location::pair(q, q + 1)], &[])
                    .unwrap();
            }
            let locs: Vec<Location> = (0..4).map(Location::single).collect();
            let out = s.run_gate(GateSymbol::Measure, &locs, &[]).unwrap();
            let ones: u32 = out.values().map(|&v| u32::from(v)).sum();
            assert!(ones == 0 || ones == 4);
        }
    }

    #[test]
    fn test_info_lists_capabilities() {
        let info = StatevectorBackend::new().info();
        assert_eq!(info.name, "statevector");
        assert_eq!(info.supported_gates.len(), GateSymbol::ALL.len());
    }
}
