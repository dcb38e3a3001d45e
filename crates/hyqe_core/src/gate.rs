//! Quantum operation symbols for HYQE
//!
//! Gantree: L1_Operations → GateSymbol
//!
//! The closed set of quantum operation symbols the engine understands.
//! Backends advertise the subset they implement; dispatch is a match on
//! this enum rather than a lookup in a runtime-populated table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantum operation symbol
/// Gantree: GateSymbol // 게이트 심볼 enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GateSymbol {
    // ========================================================================
    // Single-Qubit Cliffords
    // ========================================================================
    /// Identity
    I,
    /// Pauli-X
    X,
    /// Pauli-Y
    Y,
    /// Pauli-Z
    Z,
    /// Hadamard
    H,
    /// sqrt(X)
    SX,
    /// sqrt(X) dagger
    SXdg,
    /// sqrt(Y)
    SY,
    /// sqrt(Y) dagger
    SYdg,
    /// sqrt(Z), the S gate
    SZ,
    /// sqrt(Z) dagger
    SZdg,

    // ========================================================================
    // Single-Qubit Non-Clifford / Parameterized
    // ========================================================================
    /// T gate
    T,
    /// T dagger
    Tdg,
    /// Rotation around X
    RX,
    /// Rotation around Y
    RY,
    /// Rotation around Z
    RZ,
    /// Rotation by theta around the axis cos(phi)X + sin(phi)Y
    R1XY,

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================
    /// Controlled-X
    CX,
    /// Controlled-Y
    CY,
    /// Controlled-Z
    CZ,
    /// SWAP
    SWAP,
    /// exp(-i theta/2 ZZ)
    RZZ,
    /// sqrt(ZZ)
    SZZ,
    /// sqrt(ZZ) dagger
    SZZdg,

    // ========================================================================
    // Non-Unitary
    // ========================================================================
    /// Z-basis measurement
    /// Gantree: Measure // 측정
    Measure,
    /// Prepare |0>
    Init,
}

impl GateSymbol {
    /// Every symbol, in declaration order
    pub const ALL: &'static [GateSymbol] = &[
        GateSymbol::I,
        GateSymbol::X,
        GateSymbol::Y,
        GateSymbol::Z,
        GateSymbol::H,
        GateSymbol::SX,
        GateSymbol::SXdg,
        GateSymbol::SY,
        GateSymbol::SYdg,
        GateSymbol::SZ,
        GateSymbol::SZdg,
        GateSymbol::T,
        GateSymbol::Tdg,
        GateSymbol::RX,
        GateSymbol::RY,
        GateSymbol::RZ,
        GateSymbol::R1XY,
        GateSymbol::CX,
        GateSymbol::CY,
        GateSymbol::CZ,
        GateSymbol::SWAP,
        GateSymbol::RZZ,
        GateSymbol::SZZ,
        GateSymbol::SZZdg,
        GateSymbol::Measure,
        GateSymbol::Init,
    ];

    /// Parse a wire name, accepting common aliases
    /// Gantree: parse(s) -> Option<Self> // 이름 파싱
    pub fn parse(name: &str) -> Option<Self> {
        let symbol = match name.trim().to_ascii_uppercase().as_str() {
            "I" | "ID" | "IDLE" => GateSymbol::I,
            "X" => GateSymbol::X,
            "Y" => GateSymbol::Y,
            "Z" => GateSymbol::Z,
            "H" => GateSymbol::H,
            "SX" | "Q" => GateSymbol::SX,
            "SXDG" | "QD" => GateSymbol::SXdg,
            "SY" | "R" => GateSymbol::SY,
            "SYDG" | "RD" => GateSymbol::SYdg,
            "SZ" | "S" => GateSymbol::SZ,
            "SZDG" | "SDG" => GateSymbol::SZdg,
            "T" => GateSymbol::T,
            "TDG" => GateSymbol::Tdg,
            "RX" => GateSymbol::RX,
            "RY" => GateSymbol::RY,
            "RZ" => GateSymbol::RZ,
            "R1XY" | "U1Q" => GateSymbol::R1XY,
            "CX" | "CNOT" => GateSymbol::CX,
            "CY" => GateSymbol::CY,
            "CZ" => GateSymbol::CZ,
            "SWAP" => GateSymbol::SWAP,
            "RZZ" | "ZZPHASE" => GateSymbol::RZZ,
            "SZZ" | "ZZ" | "ZZMAX" => GateSymbol::SZZ,
            "SZZDG" => GateSymbol::SZZdg,
            "MEASURE" | "MZ" | "MEASURE Z" => GateSymbol::Measure,
            "INIT" | "RESET" | "INIT |0>" | "PZ" => GateSymbol::Init,
            _ => return None,
        };
        Some(symbol)
    }

    /// Canonical wire name
    pub fn name(&self) -> &'static str {
        match self {
            GateSymbol::I => "I",
            GateSymbol::X => "X",
            GateSymbol::Y => "Y",
            GateSymbol::Z => "Z",
            GateSymbol::H => "H",
            GateSymbol::SX => "SX",
            GateSymbol::SXdg => "SXdg",
            GateSymbol::SY => "SY",
            GateSymbol::SYdg => "SYdg",
            GateSymbol::SZ => "SZ",
            GateSymbol::SZdg => "SZdg",
            GateSymbol::T => "T",
            GateSymbol::Tdg => "Tdg",
            GateSymbol::RX => "RX",
            GateSymbol::RY => "RY",
            GateSymbol::RZ => "RZ",
            GateSymbol::R1XY => "R1XY",
            GateSymbol::CX => "CX",
            GateSymbol::CY => "CY",
            GateSymbol::CZ => "CZ",
            GateSymbol::SWAP => "SWAP",
            GateSymbol::RZZ => "RZZ",
            GateSymbol::SZZ => "SZZ",
            GateSymbol::SZZdg => "SZZdg",
            GateSymbol::Measure => "Measure",
            GateSymbol::Init => "Init",
        }
    }

    /// Number of qubits per location
    /// Gantree: arity(&self) -> usize // 큐비트 수
    pub fn arity(&self) -> usize {
        if self.is_two_qubit() {
            2
        } else {
            1
        }
    }

    /// Number of angle parameters
    pub fn num_angles(&self) -> usize {
        match self {
            GateSymbol::RX | GateSymbol::RY | GateSymbol::RZ | GateSymbol::RZZ => 1,
            GateSymbol::R1XY => 2,
            _ => 0,
        }
    }

    /// Check if gate is two-qubit
    pub fn is_two_qubit(&self) -> bool {
        matches!(
            self,
            GateSymbol::CX
                | GateSymbol::CY
                | GateSymbol::CZ
                | GateSymbol::SWAP
                | GateSymbol::RZZ
                | GateSymbol::SZZ
                | GateSymbol::SZZdg
        )
    }

    /// Check if gate is single-qubit (including measurement and init)
    pub fn is_single_qubit(&self) -> bool {
        !self.is_two_qubit()
    }

    /// Check if gate is parameterized
    pub fn is_parameterized(&self) -> bool {
        self.num_angles() > 0
    }

    /// Check if gate is a measurement
    /// Gantree: is_measurement(&self) -> bool // 동기화 지점
    pub fn is_measurement(&self) -> bool {
        matches!(self, GateSymbol::Measure)
    }

    /// Check if gate is a state preparation
    pub fn is_init(&self) -> bool {
        matches!(self, GateSymbol::Init)
    }

    /// Check if gate is unitary
    pub fn is_unitary(&self) -> bool {
        !self.is_measurement() && !self.is_init()
    }
}

impl fmt::Display for GateSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        for &symbol in GateSymbol::ALL {
            assert_eq!(GateSymbol::parse(symbol.name()), Some(symbol));
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(GateSymbol::parse("CNOT"), Some(GateSymbol::CX));
        assert_eq!(GateSymbol::parse("measure Z"), Some(GateSymbol::Measure));
        assert_eq!(GateSymbol::parse("Reset"), Some(GateSymbol::Init));
        assert_eq!(GateSymbol::parse("S"), Some(GateSymbol::SZ));
        assert_eq!(GateSymbol::parse("U1q"), Some(GateSymbol::R1XY));
        assert_eq!(GateSymbol::parse("frobnicate"), None);
    }

    #[test]
    fn test_arity() {
        assert_eq!(GateSymbol::H.arity(), 1);
        assert_eq!(GateSymbol::Measure.arity(), 1);
        assert_eq!(GateSymbol::CX.arity(), 2);
        assert_eq!(GateSymbol::RZZ.arity(), 2);
    }

    #[test]
    fn test_classification() {
        assert!(GateSymbol::Measure.is_measurement());
        assert!(!GateSymbol::Measure.is_unitary());
        assert!(GateSymbol::Init.is_init());
        assert!(GateSymbol::RZ.is_parameterized());
        assert_eq!(GateSymbol::R1XY.num_angles(), 2);
        assert!(!GateSymbol::CX.is_parameterized());
    }
}
