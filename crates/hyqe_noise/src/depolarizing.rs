//! Depolarizing error model
//!
//! Gantree: L5_Noise → DepolarizingErrorModel
//!
//! Uniform Pauli faults after gates, readout flips around measurements,
//! faulty preparation after init, and optional qubit loss. A lost qubit is
//! skipped by every later gate and reads 0 until it is re-initialised.

use crate::model::{ErrorModel, TickErrors};
use hyqe_classical::ShotEnvironment;
use hyqe_core::{GateSymbol, HyqeError, HyqeResult, Location, QubitId};
use hyqe_schedule::Tick;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const PAULIS: [GateSymbol; 3] = [GateSymbol::X, GateSymbol::Y, GateSymbol::Z];

/// Outcome reported when measuring a lost qubit
pub const LOST_OUTCOME: u8 = 0;

// ============================================================================
// DepolarizingParams
// ============================================================================

/// Fault probabilities
/// Gantree: DepolarizingParams // 에러 확률
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepolarizingParams {
    /// Single-qubit gate (and idle) fault probability
    /// Gantree: p1: f64 // 1Q
    pub p1: f64,

    /// Two-qubit gate fault probability
    /// Gantree: p2: f64 // 2Q
    pub p2: f64,

    /// Readout flip probability
    pub p_meas: f64,

    /// Preparation fault probability
    pub p_init: f64,

    /// Per-gate qubit loss probability
    #[serde(default)]
    pub p_loss: f64,
}

impl DepolarizingParams {
    /// Check every probability lies in `[0, 1]`
    pub fn validate(&self) -> HyqeResult<()> {
        let named = [
            ("p1", self.p1),
            ("p2", self.p2),
            ("p_meas", self.p_meas),
            ("p_init", self.p_init),
            ("p_loss", self.p_loss),
        ];
        for (name, p) in named {
            if !(0.0..=1.0).contains(&p) {
                return Err(HyqeError::InvalidConfig(format!(
                    "{} must be in [0, 1], got {}",
                    name, p
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// DepolarizingErrorModel
// ============================================================================

/// Depolarizing error model
/// Gantree: DepolarizingErrorModel // 탈분극 모델
#[derive(Debug, Clone)]
pub struct DepolarizingErrorModel {
    params: DepolarizingParams,
    rng: StdRng,
    lost: BTreeSet<QubitId>,
}

impl DepolarizingErrorModel {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create with validation
    /// Gantree: new(p1,p2,p_meas,p_init) -> Result<Self> // 생성+검증
    pub fn new(p1: f64, p2: f64, p_meas: f64, p_init: f64) -> HyqeResult<Self> {
        Self::from_params(DepolarizingParams {
            p1,
            p2,
            p_meas,
            p_init,
            p_loss: 0.0,
        })
    }

    /// Same probability for every fault kind
    pub fn uniform(p: f64) -> HyqeResult<Self> {
        Self::new(p, p, p, p)
    }

    /// Create from a parameter set
    pub fn from_params(params: DepolarizingParams) -> HyqeResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            rng: StdRng::seed_from_u64(0),
            lost: BTreeSet::new(),
        })
    }

    /// Enable qubit loss
    pub fn with_loss(mut self, p_loss: f64) -> HyqeResult<Self> {
        self.params.p_loss = p_loss;
        self.params.validate()?;
        Ok(self)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Fault probabilities
    pub fn params(&self) -> &DepolarizingParams {
        &self.params
    }

    /// Qubits lost so far this shot
    pub fn lost_qubits(&self) -> &BTreeSet<QubitId> {
        &self.lost
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    fn occurs(&mut self, p: f64) -> bool {
        p > 0.0 && self.rng.gen::<f64>() < p
    }

    fn random_pauli(&mut self) -> GateSymbol {
        PAULIS[self.rng.gen_range(0..PAULIS.len())]
    }

    /// Non-identity two-qubit Pauli, one factor per qubit
    fn random_pauli_pair(&mut self) -> [Option<GateSymbol>; 2] {
        let k = self.rng.gen_range(1..16);
        let factor = |i: usize| (i > 0).then(|| PAULIS[i - 1]);
        [factor(k / 4), factor(k % 4)]
    }

    fn gate_faults(
        &mut self,
        symbol: GateSymbol,
        location: &Location,
        errors: &mut TickErrors,
    ) -> HyqeResult<()> {
        let qubits = location.qubits();
        if symbol.is_measurement() {
            if self.occurs(self.params.p_meas) {
                // flip the reported outcome, keep the post-measurement state
                for &q in qubits {
                    errors
                        .before
                        .add_gate(GateSymbol::X, Location::single(q), vec![])?;
                    errors
                        .after
                        .add_gate(GateSymbol::X, Location::single(q), vec![])?;
                }
            }
        } else if symbol.is_init() {
            if self.occurs(self.params.p_init) {
                for &q in qubits {
                    errors
                        .after
                        .add_gate(GateSymbol::X, Location::single(q), vec![])?;
                }
            }
        } else if qubits.len() == 2 {
            if self.occurs(self.params.p2) {
                let paulis = self.random_pauli_pair();
                for (&q, pauli) in qubits.iter().zip(paulis) {
                    if let Some(p) = pauli {
                        errors.after.add_gate(p, Location::single(q), vec![])?;
                    }
                }
            }
        } else {
            for &q in qubits {
                if self.occurs(self.params.p1) {
                    let p = self.random_pauli();
                    errors.after.add_gate(p, Location::single(q), vec![])?;
                }
            }
        }

        if !symbol.is_measurement() && self.occurs(self.params.p_loss) {
            log::trace!("qubits {} lost", location);
            self.lost.extend(qubits.iter().copied());
        }
        Ok(())
    }
}

impl ErrorModel for DepolarizingErrorModel {
    fn name(&self) -> &str {
        "depolarizing"
    }

    fn shot_reinit(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.lost.clear();
    }

    fn generate_tick_errors(
        &mut self,
        tick: &Tick,
        _time: usize,
        _env: &ShotEnvironment,
    ) -> HyqeResult<TickErrors> {
        let mut errors = TickErrors::none(tick.index());

        for (symbol, gates) in tick.gates() {
            for gate in gates {
                let qubits = gate.location.qubits();
                if symbol.is_init() {
                    for q in qubits {
                        self.lost.remove(q);
                    }
                } else if qubits.iter().any(|q| self.lost.contains(q)) {
                    let outcome = symbol.is_measurement().then_some(LOST_OUTCOME);
                    errors.replace(gate.location.clone(), outcome);
                    continue;
                }
                self.gate_faults(symbol, &gate.location, &mut errors)?;
            }
        }

        // idle noise on machine ops
        for op in tick.machine_ops() {
            for q in op.qubits() {
                if !self.lost.contains(&q) && self.occurs(self.params.p1) {
                    let p = self.random_pauli();
                    errors.after.add_gate(p, Location::single(q), vec![])?;
                }
            }
        }

        Ok(errors)
    }

    fn reset(&self) -> Box<dyn ErrorModel> {
        Box::new(Self {
            params: self.params.clone(),
            rng: StdRng::seed_from_u64(0),
            lost: BTreeSet::new(),
        })
    }
}

impl fmt::Display for DepolarizingErrorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Depolarizing(p1={:.2e}, p2={:.2e}, meas={:.2e}, init={:.2e})",
            self.params.p1, self.params.p2, self.params.p_meas, self.params.p_init
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyqe_ir::{MOp, Metadata};

    fn env() -> ShotEnvironment {
        ShotEnvironment::new(&[]).unwrap()
    }

    fn tick_with(symbol: GateSymbol, location: Location) -> Tick {
        let mut tick = Tick::new(0);
        tick.add_gate(symbol, location, vec![]).unwrap();
        tick
    }

    #[test]
    fn test_validation() {
        assert!(DepolarizingErrorModel::new(0.1, 0.2, 0.0, 0.0).is_ok());
        assert!(matches!(
            DepolarizingErrorModel::new(1.5, 0.0, 0.0, 0.0),
            Err(HyqeError::InvalidConfig(_))
        ));
        assert!(DepolarizingErrorModel::uniform(-0.1).is_err());
        assert!(DepolarizingErrorModel::uniform(0.0)
            .unwrap()
            .with_loss(2.0)
            .is_err());
    }

    #[test]
    fn test_zero_probability_is_ideal() {
        let mut model = DepolarizingErrorModel::uniform(0.0).unwrap();
        model.shot_reinit(1);
        let tick = tick_with(GateSymbol::CX, Location::pair(0, 1));
        assert!(model
            .generate_tick_errors(&tick, 0, &env())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_certain_single_qubit_fault() {
        let mut model = DepolarizingErrorModel::new(1.0, 0.0, 0.0, 0.0).unwrap();
        model.shot_reinit(3);
        let mut tick = Tick::new(0);
        tick.add_gate(GateSymbol::H, Location::single(0), vec![])
            .unwrap();
        tick.add_gate(GateSymbol::H, Location::single(1), vec![])
            .unwrap();

        let errors = model.generate_tick_errors(&tick, 0, &env()).unwrap();
        assert!(errors.before.is_empty());
        assert_eq!(errors.after.num_gates(), 2);
        for (symbol, _) in errors.after.gates() {
            assert!(PAULIS.contains(&symbol));
        }
    }

    #[test]
    fn test_two_qubit_fault_is_not_identity() {
        let mut model = DepolarizingErrorModel::new(0.0, 1.0, 0.0, 0.0).unwrap();
        let tick = tick_with(GateSymbol::CZ, Location::pair(2, 3));
        for seed in 0..50 {
            model.shot_reinit(seed);
            let errors = model.generate_tick_errors(&tick, 0, &env()).unwrap();
            let n = errors.after.num_gates();
            assert!((1..=2).contains(&n));
            assert!(errors.after.qubits().iter().all(|q| *q == 2 || *q == 3));
        }
    }

    #[test]
    fn test_readout_flip_wraps_measurement() {
        let mut model = DepolarizingErrorModel::new(0.0, 0.0, 1.0, 0.0).unwrap();
        model.shot_reinit(0);
        let tick = tick_with(GateSymbol::Measure, Location::single(4));
        let errors = model.generate_tick_errors(&tick, 0, &env()).unwrap();
        assert_eq!(errors.before.locations(GateSymbol::X), vec![Location::single(4)]);
        assert_eq!(errors.after.locations(GateSymbol::X), vec![Location::single(4)]);
        assert!(errors.replaced.is_empty());
    }

    #[test]
    fn test_same_seed_same_faults() {
        let mut a = DepolarizingErrorModel::uniform(0.5).unwrap();
        let mut b = a.clone();
        a.shot_reinit(99);
        b.shot_reinit(99);
        let mut tick = Tick::new(0);
        for q in 0..8 {
            tick.add_gate(GateSymbol::SX, Location::single(q), vec![])
                .unwrap();
        }
        for _ in 0..5 {
            assert_eq!(
                a.generate_tick_errors(&tick, 0, &env()).unwrap(),
                b.generate_tick_errors(&tick, 0, &env()).unwrap()
            );
        }
    }

    #[test]
    fn test_fault_rate() {
        let mut model = DepolarizingErrorModel::new(0.5, 0.0, 0.0, 0.0).unwrap();
        model.shot_reinit(2024);
        let tick = tick_with(GateSymbol::X, Location::single(0));
        let faults = (0..2000)
            .filter(|_| {
                !model
                    .generate_tick_errors(&tick, 0, &env())
                    .unwrap()
                    .is_empty()
            })
            .count();
        let rate = faults as f64 / 2000.0;
        approx::assert_abs_diff_eq!(rate, 0.5, epsilon = 0.1);
    }

    #[test]
    fn test_loss_replaces_later_ops() {
        let mut model = DepolarizingErrorModel::uniform(0.0)
            .unwrap()
            .with_loss(1.0)
            .unwrap();
        model.shot_reinit(0);

        let h = tick_with(GateSymbol::H, Location::single(0));
        assert!(model.generate_tick_errors(&h, 0, &env()).unwrap().is_empty());
        assert!(model.lost_qubits().contains(&0));

        let measure = tick_with(GateSymbol::Measure, Location::single(0));
        let errors = model.generate_tick_errors(&measure, 1, &env()).unwrap();
        assert!(errors.replaced.contains(&Location::single(0)));
        assert_eq!(errors.forced_outcomes[&Location::single(0)], LOST_OUTCOME);

        // init reloads the qubit
        let init = tick_with(GateSymbol::Init, Location::single(0));
        let errors = model.generate_tick_errors(&init, 2, &env()).unwrap();
        assert!(errors.replaced.is_empty());

        model.shot_reinit(0);
        assert!(model.lost_qubits().is_empty());
    }

    #[test]
    fn test_idle_noise_on_machine_ops() {
        let mut model = DepolarizingErrorModel::new(1.0, 0.0, 0.0, 0.0).unwrap();
        let mut tick = Tick::new(0);
        tick.add_machine(MOp {
            name: "Idle".into(),
            locations: vec![Location::single(0), Location::single(1)],
            duration: None,
            metadata: Metadata::new(),
        })
        .unwrap();
        let errors = model.generate_tick_errors(&tick, 0, &env()).unwrap();
        assert_eq!(errors.after.num_gates(), 2);
    }

    #[test]
    fn test_reset_keeps_params() {
        let model = DepolarizingErrorModel::new(0.1, 0.2, 0.3, 0.4).unwrap();
        assert_eq!(model.reset().name(), "depolarizing");
        assert_eq!(model.params().p_meas, 0.3);
    }
}
