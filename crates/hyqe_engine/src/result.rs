//! Run results
//!
//! Gantree: L7_Integration → RunResults
//!
//! Per-shot register records, the per-register aggregate, failed-shot
//! records, and per-tick outcomes for hand-built circuits.

use hyqe_core::{HyqeError, HyqeResult, Location, RegisterValue};
use hyqe_ir::BitRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::OutputFormat;

// ============================================================================
// Register Output
// ============================================================================

/// Final value of one register
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegisterOutput {
    /// Integer value
    Int(i64),
    /// Bitstring, most significant bit first
    Bits(String),
}

impl RegisterOutput {
    /// Format a register value
    pub fn format(value: &RegisterValue, format: OutputFormat) -> Self {
        match format {
            OutputFormat::Bitstring => RegisterOutput::Bits(value.to_bitstring()),
            OutputFormat::Integer => RegisterOutput::Int(value.as_int()),
        }
    }
}

impl fmt::Display for RegisterOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterOutput::Int(v) => write!(f, "{}", v),
            RegisterOutput::Bits(s) => write!(f, "{}", s),
        }
    }
}

// ============================================================================
// Shot Records
// ============================================================================

/// Result of one successful shot
/// Gantree: ShotResult // 샷 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotResult {
    /// Shot index within the run
    pub shot_index: usize,
    /// Shot seed
    pub seed: u64,
    /// Reported register → value
    pub registers: BTreeMap<String, RegisterOutput>,
}

impl ShotResult {
    /// Value of one reported register
    pub fn get(&self, name: &str) -> Option<&RegisterOutput> {
        self.registers.get(name)
    }
}

/// A shot isolated by the continue-on-failure policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotFailure {
    /// Shot index within the run
    pub shot_index: usize,
    /// Shot seed; replays the failure
    pub seed: u64,
    /// Captured error text
    pub error: String,
}

impl ShotFailure {
    /// Record a failed shot
    pub fn new(shot_index: usize, seed: u64, error: &HyqeError) -> Self {
        Self {
            shot_index,
            seed,
            error: error.to_string(),
        }
    }
}

impl fmt::Display for ShotFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shot {} (seed {}): {}",
            self.shot_index, self.seed, self.error
        )
    }
}

// ============================================================================
// Run Results
// ============================================================================

/// Aggregate of a batch run
/// Gantree: RunResults // 레지스터별 샷 값 시퀀스
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    /// Requested shot count
    pub shots: usize,

    /// Run-level seed
    pub seed: u64,

    /// Register → value per successful shot, in shot order
    pub registers: BTreeMap<String, Vec<RegisterOutput>>,

    /// Successful shots in shot order
    pub shot_results: Vec<ShotResult>,

    /// Failed shots in shot order
    pub failures: Vec<ShotFailure>,
}

impl RunResults {
    /// Empty results for a run
    pub fn new(shots: usize, seed: u64) -> Self {
        Self {
            shots,
            seed,
            registers: BTreeMap::new(),
            shot_results: Vec::with_capacity(shots),
            failures: Vec::new(),
        }
    }

    /// Append a successful shot
    pub fn push_shot(&mut self, shot: ShotResult) {
        for (name, value) in &shot.registers {
            self.registers
                .entry(name.clone())
                .or_default()
                .push(value.clone());
        }
        self.shot_results.push(shot);
    }

    /// Append a failed shot
    pub fn push_failure(&mut self, failure: ShotFailure) {
        self.failures.push(failure);
    }

    /// Per-shot values of one register
    pub fn values(&self, name: &str) -> Option<&[RegisterOutput]> {
        self.registers.get(name).map(Vec::as_slice)
    }

    /// Histogram of one register's values
    pub fn counts(&self, name: &str) -> BTreeMap<RegisterOutput, usize> {
        let mut counts = BTreeMap::new();
        for value in self.values(name).unwrap_or_default() {
            *counts.entry(value.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of successful shots
    pub fn num_successful(&self) -> usize {
        self.shot_results.len()
    }

    /// Number of failed shots
    pub fn num_failed(&self) -> usize {
        self.failures.len()
    }

    /// Check if every shot succeeded
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failed shots with index, seed and error text
    /// Gantree: failure_summary() -> String // 재현 정보
    pub fn failure_summary(&self) -> String {
        if self.failures.is_empty() {
            return format!("all {} shots succeeded (run seed {})", self.shots, self.seed);
        }
        let mut lines = vec![format!(
            "{} of {} shots failed (run seed {}):",
            self.failures.len(),
            self.shots,
            self.seed
        )];
        lines.extend(self.failures.iter().map(|f| format!("  {}", f)));
        lines.join("\n")
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> HyqeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for RunResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RunResults({}/{} shots ok, seed={}, {} registers)",
            self.num_successful(),
            self.shots,
            self.seed,
            self.registers.len()
        )
    }
}

// ============================================================================
// Circuit Results
// ============================================================================

/// One measured location of a hand-built circuit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickOutcome {
    /// Tick index
    pub tick: usize,
    /// Measured location
    pub location: Location,
    /// Outcome bit
    pub outcome: u8,
    /// Classical target recorded on the gate, if any
    pub target: Option<BitRef>,
}

/// Outcomes of running a hand-built circuit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CircuitResult {
    /// Run-level seed
    pub seed: u64,
    /// Outcomes per shot, in tick order
    pub shots: Vec<Vec<TickOutcome>>,
}

impl CircuitResult {
    /// Number of shots
    pub fn num_shots(&self) -> usize {
        self.shots.len()
    }

    /// Outcome bits of one shot, in tick order
    pub fn bits(&self, shot: usize) -> Vec<u8> {
        self.shots
            .get(shot)
            .map(|outcomes| outcomes.iter().map(|o| o.outcome).collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hyqe_core::DataType;

    fn shot(index: usize, value: &str) -> ShotResult {
        ShotResult {
            shot_index: index,
            seed: index as u64,
            registers: BTreeMap::from([("m".to_string(), RegisterOutput::Bits(value.into()))]),
        }
    }

    #[test]
    fn test_format_register() {
        let value = RegisterValue::with_value(DataType::I8, 8, -1).unwrap();
        assert_eq!(
            RegisterOutput::format(&value, OutputFormat::Bitstring),
            RegisterOutput::Bits("11111111".into())
        );
        assert_eq!(
            RegisterOutput::format(&value, OutputFormat::Integer),
            RegisterOutput::Int(-1)
        );
    }

    #[test]
    fn test_aggregate_keeps_shot_order() {
        let mut results = RunResults::new(3, 9);
        results.push_shot(shot(0, "01"));
        results.push_shot(shot(1, "11"));
        results.push_shot(shot(2, "01"));

        let values = results.values("m").unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[1], RegisterOutput::Bits("11".into()));
        assert_eq!(results.counts("m")[&RegisterOutput::Bits("01".into())], 2);
        assert!(results.values("missing").is_none());
        assert!(results.is_success());
    }

    #[test]
    fn test_failure_summary() {
        let mut results = RunResults::new(2, 42);
        assert!(results.failure_summary().contains("all 2 shots succeeded"));

        results.push_shot(shot(0, "0"));
        results.push_failure(ShotFailure::new(
            1,
            1234,
            &HyqeError::MissingForeignObject("decode".into()),
        ));
        let summary = results.failure_summary();
        assert!(summary.starts_with("1 of 2 shots failed (run seed 42)"));
        assert!(summary.contains("shot 1 (seed 1234)"));
        assert!(summary.contains("decode"));
        assert_eq!(results.num_failed(), 1);
        assert_eq!(results.num_successful(), 1);
    }

    #[test]
    fn test_json_shape() {
        let mut results = RunResults::new(1, 1);
        results.push_shot(ShotResult {
            shot_index: 0,
            seed: 5,
            registers: BTreeMap::from([("c".to_string(), RegisterOutput::Int(3))]),
        });
        let value: serde_json::Value = serde_json::from_str(&results.to_json().unwrap()).unwrap();
        assert_eq!(value["registers"]["c"][0], 3);
        assert_eq!(value["shot_results"][0]["seed"], 5);
    }

    #[test]
    fn test_circuit_bits() {
        let result = CircuitResult {
            seed: 0,
            shots: vec![vec![TickOutcome {
                tick: 1,
                location: Location::single(0),
                outcome: 1,
                target: None,
            }]],
        };
        assert_eq!(result.num_shots(), 1);
        assert_eq!(result.bits(0), vec![1]);
        assert!(result.bits(5).is_empty());
    }
}
