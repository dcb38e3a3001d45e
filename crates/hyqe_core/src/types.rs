//! Core types for HYQE
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Dense resource ids, gate locations and classical data types used
//! throughout the engine.

use crate::error::{HyqeError, HyqeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Dense qubit identifier (0-indexed, assigned at load time)
/// Gantree: QubitId // pub type QubitId = usize
pub type QubitId = usize;

/// Dense classical register identifier
/// Gantree: CRegId // pub type CRegId = usize
pub type CRegId = usize;

/// Rotation angle in radians
pub type Angle = f64;

/// Measurement outcomes returned by a backend: location -> bit
/// Gantree: Outcomes // BTreeMap<Location, u8>
pub type Outcomes = BTreeMap<Location, u8>;

// ============================================================================
// Location
// ============================================================================

/// Qubits addressed by one application of a gate
///
/// A single-qubit gate has a one-element location, a two-qubit gate a
/// pair, and so on. Order is significant (control before target).
/// Gantree: Location // 단일/튜플 큐비트
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location(Vec<QubitId>);

impl Location {
    /// Create from an ordered list of qubits
    pub fn new(qubits: Vec<QubitId>) -> Self {
        Self(qubits)
    }

    /// Single-qubit location
    pub fn single(qubit: QubitId) -> Self {
        Self(vec![qubit])
    }

    /// Two-qubit location
    pub fn pair(first: QubitId, second: QubitId) -> Self {
        Self(vec![first, second])
    }

    /// Qubits in declared order
    pub fn qubits(&self) -> &[QubitId] {
        &self.0
    }

    /// Number of qubits addressed
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if this location addresses a qubit
    pub fn contains(&self, qubit: QubitId) -> bool {
        self.0.contains(&qubit)
    }

    /// Check if two locations share any qubit
    pub fn overlaps(&self, other: &Location) -> bool {
        self.0.iter().any(|q| other.contains(*q))
    }
}

impl From<QubitId> for Location {
    fn from(qubit: QubitId) -> Self {
        Self::single(qubit)
    }
}

impl From<(QubitId, QubitId)> for Location {
    fn from((a, b): (QubitId, QubitId)) -> Self {
        Self::pair(a, b)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [q] => write!(f, "{}", q),
            qs => {
                let parts: Vec<String> = qs.iter().map(|q| q.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

// ============================================================================
// DataType
// ============================================================================

/// Element type of a classical register
/// Gantree: DataType // i8..i64, u8..u64
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataType {
    /// Signed 8-bit
    I8,
    /// Signed 16-bit
    I16,
    /// Signed 32-bit
    I32,
    /// Signed 64-bit
    #[default]
    I64,
    /// Unsigned 8-bit
    U8,
    /// Unsigned 16-bit
    U16,
    /// Unsigned 32-bit
    U32,
    /// Unsigned 64-bit
    U64,
}

impl DataType {
    /// Parse from wire name (e.g. "i64", "u32")
    pub fn parse(s: &str) -> HyqeResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "i8" | "int8" => Ok(DataType::I8),
            "i16" | "int16" => Ok(DataType::I16),
            "i32" | "int32" => Ok(DataType::I32),
            "i64" | "int64" | "int" => Ok(DataType::I64),
            "u8" | "uint8" => Ok(DataType::U8),
            "u16" | "uint16" => Ok(DataType::U16),
            "u32" | "uint32" => Ok(DataType::U32),
            "u64" | "uint64" => Ok(DataType::U64),
            _ => Err(HyqeError::InvalidDataType(s.to_string())),
        }
    }

    /// Number of bits in the type
    pub fn bits(&self) -> u32 {
        match self {
            DataType::I8 | DataType::U8 => 8,
            DataType::I16 | DataType::U16 => 16,
            DataType::I32 | DataType::U32 => 32,
            DataType::I64 | DataType::U64 => 64,
        }
    }

    /// Check if signed
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            DataType::I8 | DataType::I16 | DataType::I32 | DataType::I64
        )
    }

    /// Wire name
    pub fn name(&self) -> &'static str {
        match self {
            DataType::I8 => "i8",
            DataType::I16 => "i16",
            DataType::I32 => "i32",
            DataType::I64 => "i64",
            DataType::U8 => "u8",
            DataType::U16 => "u16",
            DataType::U32 => "u32",
            DataType::U64 => "u64",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================
