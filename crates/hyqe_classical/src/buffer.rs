//! Op buffers
//!
//! Gantree: L3_Classical → OpBuffer
//!
//! A buffer is the unit handed from the interpreter to the engine: every
//! quantum, machine and barrier op up to (and including) the next
//! measurement.

use hyqe_core::QubitId;
use hyqe_ir::{MOp, QOp};

/// Op waiting for dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum BufferedOp {
    /// Quantum operation
    Quantum(QOp),
    /// Machine operation
    Machine(MOp),
    /// Scheduling barrier
    Barrier(Vec<QubitId>),
}

impl BufferedOp {
    /// Qubits touched by the op
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            BufferedOp::Quantum(op) => op.qubits().collect(),
            BufferedOp::Machine(op) => op.qubits().collect(),
            BufferedOp::Barrier(qubits) => qubits.clone(),
        }
    }

    /// Quantum op, if this is one
    pub fn as_quantum(&self) -> Option<&QOp> {
        match self {
            BufferedOp::Quantum(op) => Some(op),
            _ => None,
        }
    }
}

/// Ordered ops dispatched together
/// Gantree: OpBuffer // 측정까지의 op 묶음
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpBuffer {
    ops: Vec<BufferedOp>,
}

impl OpBuffer {
    /// Create empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an op
    pub fn push(&mut self, op: BufferedOp) {
        self.ops.push(op);
    }

    /// Ops in declared order
    pub fn ops(&self) -> &[BufferedOp] {
        &self.ops
    }

    /// Consume into ops
    pub fn into_ops(self) -> Vec<BufferedOp> {
        self.ops
    }

    /// Quantum ops only
    pub fn quantum_ops(&self) -> impl Iterator<Item = &QOp> {
        self.ops.iter().filter_map(BufferedOp::as_quantum)
    }

    /// Number of ops
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Check if the buffer ends at a measurement
    pub fn ends_with_measurement(&self) -> bool {
        matches!(
            self.ops.last(),
            Some(BufferedOp::Quantum(op)) if op.symbol.is_measurement()
        )
    }

    /// Gate names of the quantum ops, for logging and assertions
    pub fn symbols(&self) -> Vec<String> {
        self.quantum_ops().map(|op| op.symbol.to_string()).collect()
    }
}

impl IntoIterator for OpBuffer {
    type Item = BufferedOp;
    type IntoIter = std::vec::IntoIter<BufferedOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
