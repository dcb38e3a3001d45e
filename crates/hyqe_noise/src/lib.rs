//! # HYQE Noise
//!
//! Error models for hybrid execution. An error model turns an ideal tick
//! into faults around it; the engine dispatches them.
//!
//! ## Gantree Architecture
//!
//! ```text
//! hyqe_noise // L5: Noise (완료)
//!     L5_Noise // 에러 모델 (완료)
//!         ErrorModel // trait (완료)
//!         TickErrors // before/after/replaced (완료)
//!         IdealErrorModel // 무잡음 (완료)
//!         DepolarizingErrorModel // 탈분극 + 손실 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use hyqe_noise::prelude::*;
//!
//! let mut model = DepolarizingErrorModel::new(1.0, 0.0, 0.0, 0.0).unwrap();
//! model.shot_reinit(42);
//!
//! let mut tick = Tick::new(0);
//! tick.add_gate(GateSymbol::H, Location::single(0), vec![]).unwrap();
//!
//! let env = ShotEnvironment::new(&[]).unwrap();
//! let errors = model.generate_tick_errors(&tick, 0, &env).unwrap();
//! assert_eq!(errors.after.num_gates(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Error model contract (Gantree: L5_Noise → ErrorModel)
pub mod model;

/// Ideal model (Gantree: L5_Noise → IdealErrorModel)
pub mod ideal;

/// Depolarizing model (Gantree: L5_Noise → DepolarizingErrorModel)
pub mod depolarizing;

// ============================================================================
// Re-exports
// ============================================================================

pub use depolarizing::{DepolarizingErrorModel, DepolarizingParams, LOST_OUTCOME};
pub use ideal::IdealErrorModel;
pub use model::{ErrorModel, TickErrors};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases

    pub use crate::depolarizing::{DepolarizingErrorModel, DepolarizingParams, LOST_OUTCOME};
    pub use crate::ideal::IdealErrorModel;
    pub use crate::model::{ErrorModel, TickErrors};
    pub use hyqe_schedule::prelude::*;
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================
