//! # HYQE IR
//!
//! Mid-level intermediate representation: the typed op/block tree, the
//! wire-format loader and the foreign-function contract.
//!
//! ## Gantree Architecture
//!
//! ```text
//! hyqe_ir // L2: Program (완료)
//!     L2_Program // 프로그램 모델 (완료)
//!         OpModel // QOp/COp/MOp/Block 합 타입 (완료)
//!         Loader // 와이어 포맷 → 트리 (완료)
//!         LoadedProgram // 선언 + 루트 op (완료)
//!         ForeignObject // 외부 함수 계약 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use hyqe_ir::prelude::*;
//! use serde_json::json;
//!
//! let program = LoadedProgram::from_value(
//!     &json!({
//!         "format": "PHIR/JSON",
//!         "version": "0.1.0",
//!         "ops": [
//!             {"data": "qvar_define", "variable": "q", "size": 2},
//!             {"data": "cvar_define", "variable": "m", "size": 2},
//!             {"qop": "H", "args": [["q", 0]]},
//!             {"qop": "CX", "args": [[["q", 0], ["q", 1]]]},
//!             {"qop": "Measure", "args": [["q", 0], ["q", 1]], "returns": [["m", 0], ["m", 1]]}
//!         ]
//!     }),
//!     None,
//! )
//! .unwrap();
//!
//! assert_eq!(program.num_qubits(), 2);
//! assert_eq!(program.ops().len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Op/block model (Gantree: L2_Program → OpModel)
pub mod model;

/// Wire-format loader (Gantree: L2_Program → Loader)
pub mod loader;

/// Loaded program (Gantree: L2_Program → LoadedProgram)
pub mod program;

/// Foreign function contract (Gantree: L2_Program → ForeignObject)
pub mod foreign;

// ============================================================================
// Re-exports
// ============================================================================

pub use foreign::{ForeignObject, ForeignValue, FunctionTable};
pub use loader::load_program;
pub use model::{
    is_error_free, BitRef, Block, COp, CReg, Expr, ForeignCall, MOp, MetaOp, Metadata, Op, QOp,
    QReg, Target, ERROR_FREE_KEY,
};
pub use program::{Export, LoadedProgram};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases

    pub use crate::foreign::{ForeignObject, ForeignValue, FunctionTable};
    pub use crate::loader::load_program;
    pub use crate::model::{
        BitRef, Block, COp, CReg, Expr, ForeignCall, MOp, MetaOp, Metadata, Op, QOp, QReg, Target,
        ERROR_FREE_KEY,
    };
    pub use crate::program::{Export, LoadedProgram};
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
    use serde_json::{json, Value};

    /// Conditional program: v = 1; H; CX; measure -> m1; if v == 1 X else Y; measure -> m0
    fn conditional_program() -> Value {
        json!({
            "format": "PHIR/JSON",
            "version": "0.1.0",
            "metadata": {"source": "conditional"},
            "ops": [
                {"data": "qvar_define", "data_type": "qubits", "variable": "q", "size": 2},
                {"data": "cvar_define", "data_type": "i64", "variable": "v", "size": 1},
                {"data": "cvar_define", "data_type": "i64", "variable": "m0", "size": 1},
                {"data": "cvar_define", "data_type": "i64", "variable": "m1", "size": 1},
                {"cop": "=", "args": [1], "returns": ["v"]},
                {"qop": "H", "args": [["q", 0]]},
                {"qop": "CX", "args": [[["q", 0], ["q", 1]]]},
                {"qop": "Measure", "args": [["q", 1]], "returns": [["m1", 0]]},
                {"block": "if", "condition": {"cop": "==", "args": ["v", 1]},
                 "true_branch": [{"qop": "X", "args": [["q", 0]]}],
                 "false_branch": [{"qop": "Y", "args": [["q", 0]]}]},
                {"qop": "Measure", "args": [["q", 0]], "returns": [["m0", 0]]}
            ]
        })
    }

    #[test]
    fn test_conditional_program_structure() {
        let program = LoadedProgram::from_value(&conditional_program(), None).unwrap();

        assert_eq!(program.format, "PHIR/JSON");
        assert_eq!(program.metadata.get("source"), Some(&json!("conditional")));
        assert_eq!(program.cregs().len(), 3);
        assert_eq!(program.ops().len(), 6);
        assert!(matches!(program.ops()[4], Op::Block(Block::If { .. })));
    }

    #[test]
    fn test_name_id_roundtrip() {
        let program = LoadedProgram::from_value(&conditional_program(), None).unwrap();
        let ids = program.creg_ids();

        // declaration order is the id order
        assert_eq!(ids.get("v"), Some(&0));
        assert_eq!(ids.get("m0"), Some(&1));
        assert_eq!(ids.get("m1"), Some(&2));

        // reloading reproduces the same mapping
        let again = LoadedProgram::from_value(&conditional_program(), None).unwrap();
        assert_eq!(again.creg_ids(), ids);
        assert_eq!(again.qreg_offsets(), program.qreg_offsets());
        assert_eq!(again, program);
    }

    #[test]
    fn test_model_serializes() {
        let program = LoadedProgram::from_value(&conditional_program(), None).unwrap();
        let text = serde_json::to_string(program.ops()).unwrap();
        let back: Vec<Op> = serde_json::from_str(&text).unwrap();
        assert_eq!(back.as_slice(), program.ops());
    }
}
