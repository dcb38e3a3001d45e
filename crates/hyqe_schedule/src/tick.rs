//! Tick representation
//!
//! Gantree: L4_Scheduling → Tick
//!
//! A tick is one discrete time step. It maps each gate symbol to the
//! locations it addresses in this step. No qubit may be addressed twice
//! within a tick; every insertion path enforces this.

use hyqe_core::{Angle, GateSymbol, HyqeError, HyqeResult, Location, QubitId};
use hyqe_ir::{is_error_free, BitRef, MOp, Metadata, QOp, ERROR_FREE_KEY};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ============================================================================
// TickGate
// ============================================================================

/// One location addressed by a gate in a tick
/// Gantree: TickGate // 틱 안의 게이트 위치
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickGate {
    /// Addressed qubits
    pub location: Location,

    /// Angle parameters in radians
    pub angles: Vec<Angle>,

    /// Classical target of a measurement outcome
    pub returns: Option<BitRef>,
}

impl TickGate {
    /// Create without parameters
    pub fn new(location: Location) -> Self {
        Self {
            location,
            angles: Vec::new(),
            returns: None,
        }
    }

    /// Set angle parameters
    pub fn with_angles(mut self, angles: Vec<Angle>) -> Self {
        self.angles = angles;
        self
    }

    /// Set the measurement target
    pub fn with_returns(mut self, target: BitRef) -> Self {
        self.returns = Some(target);
        self
    }
}

/// Locations sharing a symbol and parameters, sent to a backend in one call
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchGroup {
    /// Gate symbol
    pub symbol: GateSymbol,
    /// Addressed locations
    pub locations: Vec<Location>,
    /// Shared angle parameters
    pub angles: Vec<Angle>,
}

// ============================================================================
// Tick
// ============================================================================

/// One time step of a circuit
/// Gantree: Tick // 시간 단계
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tick {
    /// Position in the circuit
    /// Gantree: index: usize // 틱 번호
    index: usize,

    /// Symbol → addressed locations
    /// Gantree: gates: BTreeMap<GateSymbol, Vec<TickGate>> // 심볼별 위치
    gates: BTreeMap<GateSymbol, Vec<TickGate>>,

    /// Machine ops active in this tick
    machine_ops: Vec<MOp>,

    /// Tick metadata (e.g. `error_free`)
    metadata: Metadata,

    /// Every qubit touched so far
    used: BTreeSet<QubitId>,
}

impl Tick {
    /// Create an empty tick
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Create an empty tick exempt from error injection
    pub fn error_free(index: usize) -> Self {
        Self::new(index).with_metadata(ERROR_FREE_KEY, serde_json::Value::Bool(true))
    }

    /// Attach metadata
    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Add a gate on one location
    /// Gantree: add_gate(symbol, location, angles) -> Result // 게이트 추가
    pub fn add_gate(
        &mut self,
        symbol: GateSymbol,
        location: Location,
        angles: Vec<Angle>,
    ) -> HyqeResult<()> {
        self.add(symbol, TickGate::new(location).with_angles(angles))
    }

    /// Add a prepared tick gate
    pub fn add(&mut self, symbol: GateSymbol, gate: TickGate) -> HyqeResult<()> {
        self.claim(gate.location.qubits())?;
        self.gates.entry(symbol).or_default().push(gate);
        Ok(())
    }

    /// Add every location of a quantum op
    ///
    /// Measurement targets are paired with locations in order. Nothing is
    /// inserted if any location conflicts.
    pub fn add_qop(&mut self, op: &QOp) -> HyqeResult<()> {
        let qubits: Vec<QubitId> = op.qubits().collect();
        self.check_free(&qubits)?;
        for (i, location) in op.locations.iter().enumerate() {
            let mut gate = TickGate::new(location.clone()).with_angles(op.angles.clone());
            if let Some(target) = op.returns.get(i) {
                gate = gate.with_returns(target.clone());
            }
            self.add(op.symbol, gate)?;
        }
        Ok(())
    }

    /// Add a machine op
    pub fn add_machine(&mut self, op: MOp) -> HyqeResult<()> {
        let qubits: Vec<QubitId> = op.qubits().collect();
        self.claim(&qubits)?;
        self.machine_ops.push(op);
        Ok(())
    }

    fn check_free(&self, qubits: &[QubitId]) -> HyqeResult<()> {
        let mut seen = BTreeSet::new();
        for &qubit in qubits {
            if self.used.contains(&qubit) || !seen.insert(qubit) {
                return Err(HyqeError::QubitConflict {
                    qubit,
                    tick: self.index,
                });
            }
        }
        Ok(())
    }

    fn claim(&mut self, qubits: &[QubitId]) -> HyqeResult<()> {
        self.check_free(qubits)?;
        self.used.extend(qubits.iter().copied());
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Position in the circuit
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Tick metadata
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Check if error injection is skipped for this tick
    pub fn is_error_free(&self) -> bool {
        is_error_free(&self.metadata)
    }

    /// Gates grouped by symbol
    pub fn gates(&self) -> impl Iterator<Item = (GateSymbol, &[TickGate])> {
        self.gates.iter().map(|(s, g)| (*s, g.as_slice()))
    }

    /// Locations addressed by one symbol
    pub fn locations(&self, symbol: GateSymbol) -> Vec<Location> {
        self.gates
            .get(&symbol)
            .map(|g| g.iter().map(|tg| tg.location.clone()).collect())
            .unwrap_or_default()
    }

    /// Machine ops in this tick
    pub fn machine_ops(&self) -> &[MOp] {
        &self.machine_ops
    }

    /// Qubits touched in this tick
    pub fn qubits(&self) -> &BTreeSet<QubitId> {
        &self.used
    }

    /// Check if a set of qubits is still free in this tick
    pub fn is_free(&self, qubits: &[QubitId]) -> bool {
        qubits.iter().all(|q| !self.used.contains(q))
    }

    /// Number of gate locations
    pub fn num_gates(&self) -> usize {
        self.gates.values().map(Vec::len).sum()
    }

    /// Check if nothing happens in this tick
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty() && self.machine_ops.is_empty()
    }

    /// Check if any gate is a measurement
    pub fn has_measurement(&self) -> bool {
        self.gates.keys().any(|s| s.is_measurement())
    }

    /// Measured location → classical target
    pub fn return_targets(&self) -> BTreeMap<Location, BitRef> {
        self.gates
            .values()
            .flatten()
            .filter_map(|g| g.returns.clone().map(|r| (g.location.clone(), r)))
            .collect()
    }

    /// Copy without the given locations
    /// Gantree: without_locations(replaced) -> Tick // 교체된 위치 제외
    pub fn without_locations(&self, replaced: &BTreeSet<Location>) -> Tick {
        if replaced.is_empty() {
            return self.clone();
        }
        let mut tick = Tick {
            index: self.index,
            metadata: self.metadata.clone(),
            ..Tick::default()
        };
        for (symbol, gates) in &self.gates {
            for gate in gates.iter().filter(|g| !replaced.contains(&g.location)) {
                tick.used.extend(gate.location.qubits().iter().copied());
                tick.gates.entry(*symbol).or_default().push(gate.clone());
            }
        }
        for op in &self.machine_ops {
            tick.used.extend(op.qubits());
            tick.machine_ops.push(op.clone());
        }
        tick
    }

    /// Backend calls for this tick
    ///
    /// Locations of a symbol are grouped while their angles agree, keeping
    /// insertion order.
    pub fn dispatch_groups(&self) -> Vec<DispatchGroup> {
        let mut groups: Vec<DispatchGroup> = Vec::new();
        for (symbol, gates) in &self.gates {
            for gate in gates {
                match groups
                    .iter_mut()
                    .find(|g| g.symbol == *symbol && g.angles == gate.angles)
                {
                    Some(group) => group.locations.push(gate.location.clone()),
                    None => groups.push(DispatchGroup {
                        symbol: *symbol,
                        locations: vec![gate.location.clone()],
                        angles: gate.angles.clone(),
                    }),
                }
            }
        }
        groups
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tick {}:", self.index)?;
        for (symbol, gates) in &self.gates {
            let locs: Vec<String> = gates.iter().map(|g| g.location.to_string()).collect();
            write!(f, " {}{{{}}}", symbol, locs.join(","))?;
        }
        for op in &self.machine_ops {
            write!(f, " {}", op.name)?;
        }
        Ok(())
    }
}
