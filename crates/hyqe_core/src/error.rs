//! Error types for HYQE
//!
//! Gantree: L0_Foundation → Errors
//!
//! One error enum shared by every layer of the engine. Variants are grouped
//! by the stage at which they can occur, which decides how the batch runner
//! treats them.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for HYQE
/// Gantree: HyqeError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HyqeError {
    // ========================================================================
    // Load-time Errors (fatal, no partial program)
    // ========================================================================
    /// Unrecognized tag, malformed argument or unknown unit in the wire program
    /// Gantree: MalformedProgram(String) // 형식 오류
    #[error("Malformed program: {0}")]
    MalformedProgram(String),

    /// Quantum register referenced before (or without) a declaration
    #[error("Unresolved register reference '{0}'")]
    UnresolvedRegister(String),

    /// Program calls a foreign function the foreign object does not provide
    /// Gantree: UnsupportedForeignCall(String) // 외부 함수 없음
    #[error("Foreign function '{0}' is not provided by the foreign object")]
    UnsupportedForeignCall(String),

    /// A foreign object was supplied but the program never calls it (warning)
    #[error("A foreign object was supplied but the program makes no foreign calls")]
    UnnecessaryForeignObject,

    // ========================================================================
    // Classical Errors (per shot)
    // ========================================================================
    /// Classical register name not present in the shot environment
    #[error("Unknown classical register '{0}'")]
    UnknownRegister(String),

    /// Classical operator symbol not recognized
    /// Gantree: UnknownOperator(String) // 연산자
    #[error("Unknown classical operator '{0}'")]
    UnknownOperator(String),

    /// Operand or assignment widths disagree
    /// Gantree: WidthMismatch{{expected,found}} // 폭 불일치
    #[error("Width mismatch: expected {expected} bits, found {found}")]
    WidthMismatch { expected: u32, found: u32 },

    /// Bit index beyond the register width
    #[error("Bit index {bit} out of range for {width}-bit register")]
    BitOutOfRange { bit: u32, width: u32 },

    /// Register width not representable by its data type
    #[error("Invalid register width {width}: must be in [1, {max}]")]
    InvalidWidth { width: u32, max: u32 },

    /// Unknown classical data type name
    #[error("Invalid data type '{0}'")]
    InvalidDataType(String),

    /// Integer division or modulo by zero
    #[error("Division by zero in classical expression")]
    DivisionByZero,

    /// Shift by a negative amount
    #[error("Negative shift amount {0}")]
    NegativeShift(i64),

    // ========================================================================
    // Foreign Call Errors (per shot)
    // ========================================================================
    /// Foreign call reached but no foreign object is configured
    #[error("Foreign call '{0}' encountered but no foreign object is configured")]
    MissingForeignObject(String),

    /// Foreign runtime exceeded its execution budget
    #[error("Foreign call '{function}' exceeded its time budget of {limit_ms} ms")]
    ForeignTimeout { function: String, limit_ms: u64 },

    /// Foreign runtime reported a failure
    #[error("Foreign call '{function}' failed: {message}")]
    ForeignRuntimeError { function: String, message: String },

    // ========================================================================
    // Backend Errors (per shot)
    // ========================================================================
    /// Gate symbol not in the backend's capability set
    /// Gantree: UnsupportedGate{{gate,backend}} // 미지원 게이트
    #[error("Gate '{gate}' is not supported by backend '{backend}'")]
    UnsupportedGate { gate: String, backend: String },

    /// Generic backend failure
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Qubit id beyond the simulated register
    #[error("Qubit {qubit} out of range: state has {num_qubits} qubits")]
    QubitOutOfRange { qubit: usize, num_qubits: usize },

    // ========================================================================
    // Invariant Violations (always fatal, never retried)
    // ========================================================================
    /// Qubit addressed twice in the same tick (or parallel block)
    /// Gantree: QubitConflict{{qubit,tick}} // 중복 큐비트
    #[error("Qubit {qubit} is addressed more than once in tick {tick}")]
    QubitConflict { qubit: usize, tick: usize },

    /// Active interval of a qubit overlaps an earlier interval
    #[error("Qubit {qubit} busy until tick {busy_until}, cannot start at tick {tick}")]
    DurationOverlap {
        qubit: usize,
        tick: usize,
        busy_until: usize,
    },

    // ========================================================================
    // Configuration / I/O Errors
    // ========================================================================
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for HYQE operations
/// Gantree: HyqeResult<T> // type alias
pub type HyqeResult<T> = Result<T, HyqeError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for HyqeError {
    fn from(err: serde_json::Error) -> Self {
        HyqeError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for HyqeError {
    fn from(err: std::io::Error) -> Self {
        HyqeError::FileError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl HyqeError {
    /// Errors raised while loading a program, before any shot runs
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            HyqeError::MalformedProgram(_)
                | HyqeError::UnresolvedRegister(_)
                | HyqeError::UnsupportedForeignCall(_)
                | HyqeError::InvalidDataType(_)
                | HyqeError::InvalidWidth { .. }
        )
    }

    /// Errors isolated to the shot in which they occur
    pub fn is_shot_error(&self) -> bool {
        matches!(
            self,
            HyqeError::UnknownRegister(_)
                | HyqeError::UnknownOperator(_)
                | HyqeError::WidthMismatch { .. }
                | HyqeError::BitOutOfRange { .. }
                | HyqeError::DivisionByZero
                | HyqeError::NegativeShift(_)
                | HyqeError::MissingForeignObject(_)
                | HyqeError::ForeignTimeout { .. }
                | HyqeError::ForeignRuntimeError { .. }
                | HyqeError::UnsupportedGate { .. }
                | HyqeError::BackendError(_)
                | HyqeError::QubitOutOfRange { .. }
        )
    }

    /// Programming-contract errors that must reach the caller unmodified
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            HyqeError::QubitConflict { .. } | HyqeError::DurationOverlap { .. }
        )
    }

    /// Non-fatal diagnostics
    pub fn is_warning(&self) -> bool {
        matches!(self, HyqeError::UnnecessaryForeignObject)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HyqeError::WidthMismatch {
            expected: 4,
            found: 8,
        };
        assert!(err.to_string().contains('4'));
        assert!(err.to_string().contains('8'));
    }

    #[test]
    fn test_classification() {
        assert!(HyqeError::MalformedProgram("x".into()).is_load_error());
        assert!(!HyqeError::MalformedProgram("x".into()).is_shot_error());

        assert!(HyqeError::DivisionByZero.is_shot_error());
        assert!(HyqeError::MissingForeignObject("f".into()).is_shot_error());

        let conflict = HyqeError::QubitConflict { qubit: 1, tick: 0 };
        assert!(conflict.is_invariant_violation());
        assert!(!conflict.is_shot_error());

        assert!(HyqeError::UnnecessaryForeignObject.is_warning());
    }

    #[test]
    fn test_json_conversion() {
        let err: HyqeError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, HyqeError::JsonError(_)));
    }
}
