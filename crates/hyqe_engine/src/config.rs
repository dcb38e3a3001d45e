//! Engine configuration for HYQE
//!
//! Gantree: L7_Integration → EngineConfig
//!
//! Run-level settings: shot count, seeding, failure handling, result
//! formatting, duration checking and parallel fan-out.

use hyqe_core::{engine, DataType, HyqeError, HyqeResult};
use hyqe_schedule::GateDurations;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// What a batch run does when a shot fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FailurePolicy {
    /// Return the first shot error
    #[default]
    Abort,
    /// Record the failure and keep going
    Continue,
}

/// How register values are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Bitstring of the declared width, most significant bit first
    #[default]
    Bitstring,
    /// Integer value (signed registers read back signed)
    Integer,
}

/// Engine configuration
/// Gantree: EngineConfig // 실행 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // ========================================================================
    // Batch Parameters
    // ========================================================================
    /// Number of shots
    pub shots: usize,

    /// Run-level seed; drawn at random (and logged) when absent
    pub seed: Option<u64>,

    /// Shot failure handling
    pub failure_policy: FailurePolicy,

    /// Register value formatting
    pub output_format: OutputFormat,

    // ========================================================================
    // Scheduling
    // ========================================================================
    /// Validate and schedule with operation durations
    pub check_durations: bool,

    /// Durations used when `check_durations` is on
    #[serde(default)]
    pub durations: GateDurations,

    // ========================================================================
    // Execution
    // ========================================================================
    /// Worker threads for parallel shots; `None` runs sequentially
    pub workers: Option<usize>,

    /// Data type for classical expression evaluation
    pub expression_type: DataType,
}

impl EngineConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// One shot, fixed seed, abort on failure
    pub fn single_shot() -> Self {
        Self {
            shots: 1,
            ..Self::default()
        }
    }

    /// Many shots, failures recorded
    pub fn batch(shots: usize) -> Self {
        Self {
            shots,
            failure_policy: FailurePolicy::Continue,
            ..Self::default()
        }
    }

    /// Load from JSON text
    pub fn from_json_str(text: &str) -> HyqeResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> HyqeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set shots
    pub fn with_shots(mut self, shots: usize) -> Self {
        self.shots = shots;
        self
    }

    /// Set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Draw the run seed at random
    pub fn with_random_seed(mut self) -> Self {
        self.seed = None;
        self
    }

    /// Set failure policy
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Enable duration checking with the given table
    pub fn with_durations(mut self, durations: GateDurations) -> Self {
        self.check_durations = true;
        self.durations = durations;
        self
    }

    /// Set parallel workers
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set the expression data type
    pub fn with_expression_type(mut self, dtype: DataType) -> Self {
        self.expression_type = dtype;
        self
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    pub fn validate(&self) -> HyqeResult<()> {
        if self.workers == Some(0) {
            return Err(HyqeError::InvalidConfig(
                "workers must be > 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Check if shots run on a thread pool
    pub fn is_parallel(&self) -> bool {
        matches!(self.workers, Some(n) if n > 1)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shots: engine::DEFAULT_SHOTS,
            seed: Some(engine::DEFAULT_SEED),
            failure_policy: FailurePolicy::Abort,
            output_format: OutputFormat::Bitstring,
            check_durations: false,
            durations: GateDurations::default(),
            workers: None,
            expression_type: DataType::I64,
        }
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EngineConfig(shots={}, seed={:?}, {:?}, {:?}, workers={:?})",
            self.shots, self.seed, self.failure_policy, self.output_format, self.workers
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = EngineConfig::default();
        assert_eq!(config.shots, 1);
        assert_eq!(config.seed, Some(42));
        assert!(!config.check_durations);
        assert!(!config.is_parallel());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(EngineConfig::single_shot().shots, 1);
        let batch = EngineConfig::batch(100);
        assert_eq!(batch.shots, 100);
        assert_eq!(batch.failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_shots(10)
            .with_seed(7)
            .with_workers(4)
            .with_output_format(OutputFormat::Integer)
            .with_durations(GateDurations::uniform(2))
            .with_expression_type(DataType::U32);
        assert_eq!(config.shots, 10);
        assert!(config.is_parallel());
        assert!(config.check_durations);
        assert_eq!(config.expression_type, DataType::U32);
        assert_eq!(config.with_random_seed().seed, None);
    }

    #[test]
    fn test_validation() {
        assert!(EngineConfig::default().with_workers(0).validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig::batch(8).with_seed(3);
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json_str(&text).unwrap(), config);

        let bad = text.replace("\"workers\":null", "\"workers\":0");
        assert!(matches!(
            EngineConfig::from_json_str(&bad),
            Err(HyqeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EngineConfig::from_json_file("/nonexistent/hyqe.json"),
            Err(HyqeError::FileError(_))
        ));
    }
}
