//! # HYQE Classical
//!
//! Classical side of hybrid execution: the per-shot register environment,
//! expression evaluation, and the interpreter that flattens control flow
//! into op buffers.
//!
//! ## Gantree Architecture
//!
//! ```text
//! hyqe_classical // L3: Classical (완료)
//!     L3_Classical // 고전 해석 (완료)
//!         ShotEnvironment // CReg당 CRV (완료)
//!         ClassicalInterpreter // 표현식/대입/외부 호출 (완료)
//!         OpBuffer // 측정 경계 op 묶음 (완료)
//!         Execution // pull 반복자 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use hyqe_classical::prelude::*;
//! use serde_json::json;
//!
//! let program = LoadedProgram::from_value(
//!     &json!({"ops": [
//!         {"data": "qvar_define", "variable": "q", "size": 1},
//!         {"data": "cvar_define", "variable": "m", "size": 1},
//!         {"qop": "H", "args": [["q", 0]]},
//!         {"qop": "Measure", "args": [["q", 0]], "returns": [["m", 0]]}
//!     ]}),
//!     None,
//! )
//! .unwrap();
//!
//! let mut interp = ClassicalInterpreter::new(&program).unwrap();
//! let buffers: Vec<OpBuffer> = interp
//!     .execute(program.ops())
//!     .collect::<HyqeResult<_>>()
//!     .unwrap();
//! assert_eq!(buffers.len(), 1);
//! assert!(buffers[0].ends_with_measurement());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Shot environment (Gantree: L3_Classical → ShotEnvironment)
pub mod environment;

/// Op buffers (Gantree: L3_Classical → OpBuffer)
pub mod buffer;

/// Interpreter (Gantree: L3_Classical → ClassicalInterpreter)
pub mod interpreter;

/// Op-buffer iterator (Gantree: L3_Classical → Execution)
pub mod execution;

// ============================================================================
// Re-exports
// ============================================================================

pub use buffer::{BufferedOp, OpBuffer};
pub use environment::ShotEnvironment;
pub use execution::{Execution, ExecutionState};
pub use interpreter::{ClassicalInterpreter, MeasurementResults};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases

    pub use crate::buffer::{BufferedOp, OpBuffer};
    pub use crate::environment::ShotEnvironment;
    pub use crate::execution::{Execution, ExecutionState};
    pub use crate::interpreter::{ClassicalInterpreter, MeasurementResults};
    pub use hyqe_ir::prelude::*;
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================
