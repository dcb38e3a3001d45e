//! Constants for HYQE
//!
//! Gantree: L0_Foundation → Constants
//!
//! Angle units, default operation durations and engine defaults.

// ============================================================================
// Angle Units
// Gantree: units // 각도 단위
// ============================================================================

pub mod units {
    //! Angle unit conversion for program parameters

    use std::f64::consts::PI;

    /// Wire name for radians
    pub const RAD: &str = "rad";

    /// Wire name for multiples of pi
    pub const PI_UNIT: &str = "pi";

    /// Wire name for degrees
    pub const DEG: &str = "deg";

    /// Convert an angle in the named unit to radians
    /// Gantree: to_radians(value, unit) -> Option<f64>
    pub fn to_radians(value: f64, unit: &str) -> Option<f64> {
        match unit {
            RAD => Some(value),
            PI_UNIT => Some(value * PI),
            DEG => Some(value.to_radians()),
            _ => None,
        }
    }
}

// ============================================================================
// Durations
// Gantree: durations // 기본 지속 시간 (tick 단위)
// ============================================================================

pub mod durations {
    //! Default operation durations, measured in ticks

    /// Single-qubit gate
    pub const SINGLE_QUBIT_TICKS: usize = 1;

    /// Two-qubit gate
    pub const TWO_QUBIT_TICKS: usize = 1;

    /// Measurement
    pub const MEASURE_TICKS: usize = 1;

    /// Reset / init
    pub const INIT_TICKS: usize = 1;

    /// Virtual Z rotations
    pub const VIRTUAL_TICKS: usize = 0;
}

// ============================================================================
// Engine Defaults
// Gantree: engine // 실행 기본값
// ============================================================================

pub mod engine {
    //! Defaults for batch execution

    /// Default number of shots
    pub const DEFAULT_SHOTS: usize = 1;

    /// Default run seed
    pub const DEFAULT_SEED: u64 = 42;

    /// Maximum classical register width (bits)
    pub const MAX_REGISTER_WIDTH: u32 = 64;

    /// Maximum simulated qubits for the statevector backend
    pub const MAX_STATEVECTOR_QUBITS: usize = 26;
}
