//! Statevector backend for HYQE
//!
//! Gantree: L6_Backend → StatevectorBackend
//!
//! Dense statevector simulation with seeded mid-circuit measurement.
//! Qubit `q` is bit `q` of the basis-state index.

use crate::backend::{Backend, QuantumState};
use hyqe_core::{engine, Angle, GateSymbol, HyqeError, HyqeResult, Location, Outcomes};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Probability below which a measurement branch is treated as impossible
const PROBABILITY_EPS: f64 = 1e-12;

// ============================================================================
// StatevectorBackend
// ============================================================================

/// Dense statevector simulator
/// Gantree: StatevectorBackend // 상태벡터 시뮬레이터
#[derive(Debug, Clone)]
pub struct StatevectorBackend {
    /// Backend name
    name: String,

    /// Capability set
    supported: Vec<GateSymbol>,

    /// Largest register
    max_qubits: usize,
}

impl StatevectorBackend {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Backend supporting every gate symbol
    pub fn new() -> Self {
        Self {
            name: "statevector".to_string(),
            supported: GateSymbol::ALL.to_vec(),
            max_qubits: engine::MAX_STATEVECTOR_QUBITS,
        }
    }

    /// Restrict the capability set
    pub fn with_supported_gates(mut self, gates: &[GateSymbol]) -> Self {
        self.supported = gates.to_vec();
        self
    }

    /// Set backend name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Lower the register limit
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits.min(engine::MAX_STATEVECTOR_QUBITS);
        self
    }

    /// Create a concrete state (for direct use outside the engine)
    pub fn state(&self, num_qubits: usize, seed: u64) -> HyqeResult<StatevectorState> {
        if num_qubits > self.max_qubits {
            return Err(HyqeError::BackendError(format!(
                "{} qubits requested, backend '{}' supports at most {}",
                num_qubits, self.name, self.max_qubits
            )));
        }
        log::debug!("{}: new {}-qubit state (seed {})", self.name, num_qubits, seed);
        Ok(StatevectorState::new(
            num_qubits,
            seed,
            &self.name,
            &self.supported,
        ))
    }
}

impl Default for StatevectorBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for StatevectorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn supported_gates(&self) -> &[GateSymbol] {
        &self.supported
    }

    fn create_state(&self, num_qubits: usize, seed: u64) -> HyqeResult<Box<dyn QuantumState>> {
        Ok(Box::new(self.state(num_qubits, seed)?))
    }
}

// ============================================================================
// StatevectorState
// ============================================================================

/// Amplitudes of one shot
/// Gantree: StatevectorState // 샷 상태
#[derive(Debug, Clone)]
pub struct StatevectorState {
    amplitudes: Vec<Complex>,
    num_qubits: usize,
    rng: StdRng,
    backend: String,
    supported: BTreeSet<GateSymbol>,
}

impl StatevectorState {
    fn new(num_qubits: usize, seed: u64, backend: &str, supported: &[GateSymbol]) -> Self {
        let mut amplitudes = vec![Complex::zero(); 1 << num_qubits];
        amplitudes[0] = Complex::one();
        Self {
            amplitudes,
            num_qubits,
            rng: StdRng::seed_from_u64(seed),
            backend: backend.to_string(),
            supported: supported.iter().copied().collect(),
        }
    }

    /// Probability of each basis state
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex::norm_squared).collect()
    }

    /// Probability of reading 1 on a qubit
    pub fn probability_one(&self, q: usize) -> f64 {
        let mask = 1 << q;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_squared())
            .sum()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    fn check(&self, symbol: GateSymbol, location: &Location, angles: &[Angle]) -> HyqeResult<()> {
        if location.len() != symbol.arity() {
            return Err(HyqeError::BackendError(format!(
                "{} expects {} qubits per location, got {}",
                symbol,
                symbol.arity(),
                location
            )));
        }
        if angles.len() < symbol.num_angles() {
            return Err(HyqeError::BackendError(format!(
                "{} expects {} angles, got {}",
                symbol,
                symbol.num_angles(),
                angles.len()
            )));
        }
        for &qubit in location.qubits() {
            if qubit >= self.num_qubits {
                return Err(HyqeError::QubitOutOfRange {
                    qubit,
                    num_qubits: self.num_qubits,
                });
            }
        }
        Ok(())
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn apply(&mut self, symbol: GateSymbol, qubits: &[usize], angles: &[Angle]) -> Option<u8> {
        let q = qubits[0];
        match symbol {
            GateSymbol::I => {}
            GateSymbol::X => self.apply_matrix(q, gates::X),
            GateSymbol::Y => self.apply_matrix(q, gates::Y),
            GateSymbol::Z => self.apply_phase(q, Complex::new(-1.0, 0.0)),
            GateSymbol::H => self.apply_matrix(q, gates::H),
            GateSymbol::SX => self.apply_matrix(q, gates::SX),
            GateSymbol::SXdg => self.apply_matrix(q, gates::SXDG),
            GateSymbol::SY => self.apply_matrix(q, gates::SY),
            GateSymbol::SYdg => self.apply_matrix(q, gates::SYDG),
            GateSymbol::SZ => self.apply_phase(q, Complex::new(0.0, 1.0)),
            GateSymbol::SZdg => self.apply_phase(q, Complex::new(0.0, -1.0)),
            GateSymbol::T => self.apply_phase(q, Complex::from_polar(1.0, FRAC_PI_4)),
            GateSymbol::Tdg => self.apply_phase(q, Complex::from_polar(1.0, -FRAC_PI_4)),
            GateSymbol::RX => self.apply_matrix(q, gates::rx(angles[0])),
            GateSymbol::RY => self.apply_matrix(q, gates::ry(angles[0])),
            GateSymbol::RZ => self.apply_matrix(q, gates::rz(angles[0])),
            GateSymbol::R1XY => self.apply_matrix(q, gates::r1xy(angles[0], angles[1])),
            GateSymbol::CX => self.apply_controlled(q, qubits[1], gates::X),
            GateSymbol::CY => self.apply_controlled(q, qubits[1], gates::Y),
            GateSymbol::CZ => self.apply_cz(q, qubits[1]),
            GateSymbol::SWAP => self.apply_swap(q, qubits[1]),
            GateSymbol::RZZ => self.apply_rzz(q, qubits[1], angles[0]),
            GateSymbol::SZZ => self.apply_rzz(q, qubits[1], FRAC_PI_2),
            GateSymbol::SZZdg => self.apply_rzz(q, qubits[1], -FRAC_PI_2),
            GateSymbol::Measure => return Some(self.measure(q)),
            GateSymbol::Init => {
                if self.measure(q) == 1 {
                    self.apply_matrix(q, gates::X);
                }
            }
        }
        None
    }

    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================

    fn apply_matrix(&mut self, q: usize, m: [[Complex; 2]; 2]) {
        let mask = 1 << q;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let (a, b) = (self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    /// diag(1, phase)
    fn apply_phase(&mut self, q: usize, phase: Complex) {
        let mask = 1 << q;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp = *amp * phase;
            }
        }
    }

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================

    fn apply_controlled(&mut self, control: usize, target: usize, m: [[Complex; 2]; 2]) {
        let control_mask = 1 << control;
        let target_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if i & control_mask != 0 && i & target_mask == 0 {
                let j = i | target_mask;
                let (a, b) = (self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_cz(&mut self, q1: usize, q2: usize) {
        let mask = (1 << q1) | (1 << q2);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == mask {
                *amp = *amp * -1.0;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            if i & mask1 != 0 && i & mask2 == 0 {
                self.amplitudes.swap(i, i ^ mask1 ^ mask2);
            }
        }
    }

    /// exp(-i theta/2 Z⊗Z)
    fn apply_rzz(&mut self, q1: usize, q2: usize, theta: f64) {
        let even = Complex::from_polar(1.0, -theta / 2.0);
        let odd = Complex::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            let parity = ((i >> q1) ^ (i >> q2)) & 1;
            *amp = *amp * if parity == 0 { even } else { odd };
        }
    }

    // ========================================================================
    // Measurement
    // ========================================================================

    /// Sample a Z-basis outcome and collapse
    fn measure(&mut self, q: usize) -> u8 {
        let p1 = self.probability_one(q);
        let outcome = if p1 < PROBABILITY_EPS {
            0
        } else if p1 > 1.0 - PROBABILITY_EPS {
            1
        } else {
            u8::from(self.rng.gen::<f64>() < p1)
        };

        let p = if outcome == 1 { p1 } else { 1.0 - p1 };
        let norm = 1.0 / p.sqrt();
        let mask = 1 << q;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            let bit = u8::from(i & mask != 0);
            *amp = if bit == outcome {
                *amp * norm
            } else {
                Complex::zero()
            };
        }
        outcome
    }
}

impl QuantumState for StatevectorState {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn run_gate(
        &mut self,
        symbol: GateSymbol,
        locations: &[Location],
        angles: &[Angle],
    ) -> HyqeResult<Outcomes> {
        if !self.supported.contains(&symbol) {
            return Err(HyqeError::UnsupportedGate {
                gate: symbol.to_string(),
                backend: self.backend.clone(),
            });
        }
        for location in locations {
            self.check(symbol, location, angles)?;
        }

        let mut outcomes = Outcomes::new();
        for location in locations {
            if let Some(outcome) = self.apply(symbol, location.qubits(), angles) {
                outcomes.insert(location.clone(), outcome);
            }
        }
        Ok(outcomes)
    }

    fn reset(&mut self) {
        for amp in &mut self.amplitudes {
            *amp = Complex::zero();
        }
        self.amplitudes[0] = Complex::one();
    }
}

// ============================================================================
// Gate Matrices
// ============================================================================

mod gates {
    use super::Complex;
    use std::f64::consts::FRAC_1_SQRT_2;

    const fn c(re: f64, im: f64) -> Complex {
        Complex { re, im }
    }

    pub const X: [[Complex; 2]; 2] = [[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]];
    pub const Y: [[Complex; 2]; 2] = [[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]];
    pub const H: [[Complex; 2]; 2] = [
        [c(FRAC_1_SQRT_2, 0.0), c(FRAC_1_SQRT_2, 0.0)],
        [c(FRAC_1_SQRT_2, 0.0), c(-FRAC_1_SQRT_2, 0.0)],
    ];
    pub const SX: [[Complex; 2]; 2] = [[c(0.5, 0.5), c(0.5, -0.5)], [c(0.5, -0.5), c(0.5, 0.5)]];
    pub const SXDG: [[Complex; 2]; 2] =
        [[c(0.5, -0.5), c(0.5, 0.5)], [c(0.5, 0.5), c(0.5, -0.5)]];
    pub const SY: [[Complex; 2]; 2] =
        [[c(0.5, 0.5), c(-0.5, -0.5)], [c(0.5, 0.5), c(0.5, 0.5)]];
    pub const SYDG: [[Complex; 2]; 2] =
        [[c(0.5, -0.5), c(0.5, -0.5)], [c(-0.5, 0.5), c(0.5, -0.5)]];

    pub fn rx(theta: f64) -> [[Complex; 2]; 2] {
        let (s, co) = (theta / 2.0).sin_cos();
        [[c(co, 0.0), c(0.0, -s)], [c(0.0, -s), c(co, 0.0)]]
    }

    pub fn ry(theta: f64) -> [[Complex; 2]; 2] {
        let (s, co) = (theta / 2.0).sin_cos();
        [[c(co, 0.0), c(-s, 0.0)], [c(s, 0.0), c(co, 0.0)]]
    }

    pub fn rz(theta: f64) -> [[Complex; 2]; 2] {
        [
            [Complex::from_polar(1.0, -theta / 2.0), c(0.0, 0.0)],
            [c(0.0, 0.0), Complex::from_polar(1.0, theta / 2.0)],
        ]
    }

    /// Rotation by theta around cos(phi)X + sin(phi)Y
    pub fn r1xy(theta: f64, phi: f64) -> [[Complex; 2]; 2] {
        let (s, co) = (theta / 2.0).sin_cos();
        // -i e^{∓i phi} sin(theta/2)
        let off = |sign: f64| Complex::from_polar(s, sign * phi) * c(0.0, -1.0);
        [[c(co, 0.0), off(-1.0)], [off(1.0), c(co, 0.0)]]
    }
}

// ============================================================================
// Complex Number Helper
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    const fn one() -> Self {
        Self::new(1.0, 0.0)
    }

    fn from_polar(r: f64, theta: f64) -> Self {
        Self::new(r * theta.cos(), r * theta.sin())
    }

    fn norm_squared(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }
}

impl std::ops::Add for Complex {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.re + other.re, self.im + other.im)
    }
}

impl std::ops::Mul for Complex {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Self::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re,
        )
    }
}

impl std::ops::Mul<f64> for Complex {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self::new(self.re * scalar, self.im * scalar)
    }
}

// ============================================================================
// Tests
// ============================================================================
