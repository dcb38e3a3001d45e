//! # HYQE Core
//!
//! Resource ids, gate symbols, classical register values and errors for the
//! Hybrid Quantum Execution engine.
//!
//! ## Gantree Architecture
//!
//! ```text
//! hyqe_core // L0+L1: Foundation + Operations (완료)
//!     L0_Foundation // 기반 타입/상수/에러 (완료)
//!         CoreTypes // Location, DataType, ids (완료)
//!         Constants // 단위/지속시간/기본값 (완료)
//!         Errors // 에러 타입 (완료)
//!         RegisterValue // 고정 폭 고전 레지스터 (완료)
//!     L1_Operations // 연산 심볼 (완료)
//!         GateSymbol // 양자 게이트 enum (완료)
//!         ClassicalOperator // 고전 연산자 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use hyqe_core::prelude::*;
//!
//! // Writes are masked to the declared width
//! let mut reg = RegisterValue::unsigned(4).unwrap();
//! reg.set(0x1F);
//! assert_eq!(reg.as_int(), 15);
//!
//! // Bits are addressable individually
//! reg.set_bit(1, false).unwrap();
//! assert_eq!(reg.to_bitstring(), "1101");
//!
//! // Signed registers wrap at their declared width
//! let byte = RegisterValue::with_value(DataType::I8, 8, 200).unwrap();
//! assert_eq!(byte.as_int(), -56);
//! let nibble = RegisterValue::with_value(DataType::I64, 4, -3).unwrap();
//! assert_eq!(nibble.as_int(), -3);
//! ```
//!
//! ## Gate Symbols
//!
//! ```rust
//! use hyqe_core::prelude::*;
//!
//! let cx = GateSymbol::parse("CNOT").unwrap();
//! assert_eq!(cx, GateSymbol::CX);
//! assert_eq!(cx.arity(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Classical register values (Gantree: L0_Foundation → RegisterValue)
pub mod register;

/// Quantum gate symbols (Gantree: L1_Operations → GateSymbol)
pub mod gate;

/// Classical operators (Gantree: L1_Operations → ClassicalOperator)
pub mod operator;

// ============================================================================
// Re-exports
// ============================================================================

pub use constants::{durations, engine, units};
pub use error::{HyqeError, HyqeResult};
pub use gate::GateSymbol;
pub use operator::ClassicalOperator;
pub use register::RegisterValue;
pub use types::{Angle, CRegId, DataType, Location, Outcomes, QubitId};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use hyqe_core::prelude::*;
    //! ```

    pub use crate::constants::{durations, engine, units};
    pub use crate::error::{HyqeError, HyqeResult};
    pub use crate::gate::GateSymbol;
    pub use crate::operator::ClassicalOperator;
    pub use crate::register::RegisterValue;
    pub use crate::types::{Angle, CRegId, DataType, Location, Outcomes, QubitId};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================
