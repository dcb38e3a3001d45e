//! Backend contract
//!
//! Gantree: L6_Backend → BackendTrait
//!
//! A backend is shared read-only across shots and hands out one private
//! simulator state per shot. The engine only sees the outcome mapping
//! returned by [`QuantumState::run_gate`].

use hyqe_core::{Angle, GateSymbol, HyqeError, HyqeResult, Location, Outcomes};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static description of a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend name
    pub name: String,
    /// Largest supported register
    pub max_qubits: usize,
    /// Supported gate symbols
    pub supported_gates: Vec<GateSymbol>,
}

impl fmt::Display for BackendInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (max {} qubits, {} gates)",
            self.name,
            self.max_qubits,
            self.supported_gates.len()
        )
    }
}

/// Simulator state for one shot
/// Gantree: QuantumState // 샷별 상태
pub trait QuantumState: Send {
    /// Number of simulated qubits
    fn num_qubits(&self) -> usize;

    /// Apply one symbol to a set of locations
    /// Gantree: run_gate(symbol,locations,angles) -> Outcomes // 게이트 실행
    ///
    /// Returns an outcome per measured location; other symbols return an
    /// empty mapping.
    fn run_gate(
        &mut self,
        symbol: GateSymbol,
        locations: &[Location],
        angles: &[Angle],
    ) -> HyqeResult<Outcomes>;

    /// Return to the all-zero state
    fn reset(&mut self);
}

/// Simulator backend
/// Gantree: Backend // trait
pub trait Backend: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Largest register this backend can simulate
    fn max_qubits(&self) -> usize;

    /// Gate symbols this backend implements
    fn supported_gates(&self) -> &[GateSymbol];

    /// Check a symbol against the capability set
    fn supports(&self, symbol: GateSymbol) -> bool {
        self.supported_gates().contains(&symbol)
    }

    /// Fail with `UnsupportedGate` if the symbol is not implemented
    fn check_gate(&self, symbol: GateSymbol) -> HyqeResult<()> {
        if self.supports(symbol) {
            Ok(())
        } else {
            Err(HyqeError::UnsupportedGate {
                gate: symbol.to_string(),
                backend: self.name().to_string(),
            })
        }
    }

    /// Fresh all-zero state for one shot
    /// Gantree: create_state(num_qubits, seed) -> Box<dyn QuantumState> // init
    fn create_state(&self, num_qubits: usize, seed: u64) -> HyqeResult<Box<dyn QuantumState>>;

    /// Static description
    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: self.name().to_string(),
            max_qubits: self.max_qubits(),
            supported_gates: self.supported_gates().to_vec(),
        }
    }
}
