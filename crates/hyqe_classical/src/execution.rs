//! Op-buffer iterator
//!
//! Gantree: L3_Classical → Execution
//!
//! Depth-first walk of the op/block tree driven by an explicit work stack.
//! Classical work runs eagerly as it is reached; quantum and machine ops
//! accumulate in a buffer that is handed out at every measurement. The walk
//! is lazy: nothing past a yielded measurement runs until the caller pulls
//! again, which lets it fold the measurement results in first.

use crate::buffer::{BufferedOp, OpBuffer};
use crate::interpreter::{ClassicalInterpreter, MeasurementResults};
use hyqe_core::HyqeResult;
use hyqe_ir::{Block, MetaOp, Op};
use std::slice;

/// Execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Walking the tree
    Running,
    /// Tree exhausted, trailing buffer flushed
    Finished,
    /// Stopped by an error
    Failed,
}

/// Lazy, finite, non-restartable sequence of op buffers
/// Gantree: Execution // 명시적 작업 스택
pub struct Execution<'a> {
    interpreter: &'a mut ClassicalInterpreter,
    stack: Vec<slice::Iter<'a, Op>>,
    buffer: OpBuffer,
    state: ExecutionState,
}

impl<'a> Execution<'a> {
    pub(crate) fn new(interpreter: &'a mut ClassicalInterpreter, ops: &'a [Op]) -> Self {
        Self {
            interpreter,
            stack: vec![ops.iter()],
            buffer: OpBuffer::new(),
            state: ExecutionState::Running,
        }
    }

    /// Current state
    pub fn state(&self) -> ExecutionState {
        self.state
    }

    /// Underlying interpreter
    pub fn interpreter(&self) -> &ClassicalInterpreter {
        &*self.interpreter
    }

    /// Underlying interpreter, mutably
    pub fn interpreter_mut(&mut self) -> &mut ClassicalInterpreter {
        &mut *self.interpreter
    }

    /// Fold results of the last buffer before pulling the next one
    pub fn receive_results(&mut self, results: &MeasurementResults) -> HyqeResult<()> {
        self.interpreter.receive_results(results)
    }

    /// Advance until a buffer is ready or the tree is exhausted
    fn advance(&mut self) -> HyqeResult<Option<OpBuffer>> {
        loop {
            let Some(frame) = self.stack.last_mut() else {
                self.state = ExecutionState::Finished;
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.buffer)));
            };
            let Some(op) = frame.next() else {
                self.stack.pop();
                continue;
            };

            match op {
                Op::Quantum(qop) => {
                    self.buffer.push(BufferedOp::Quantum(qop.clone()));
                    if qop.symbol.is_measurement() {
                        return Ok(Some(std::mem::take(&mut self.buffer)));
                    }
                }
                Op::Machine(mop) => self.buffer.push(BufferedOp::Machine(mop.clone())),
                Op::Meta(MetaOp::Barrier(qubits)) => {
                    self.buffer.push(BufferedOp::Barrier(qubits.clone()))
                }
                Op::Classical(cop) => self.interpreter.execute_cop(cop)?,
                Op::Foreign(call) => self.interpreter.handle_foreign_call(call)?,
                Op::Block(Block::Sequence(ops)) | Op::Block(Block::Parallel(ops)) => {
                    self.stack.push(ops.iter());
                }
                Op::Block(Block::If {
                    condition,
                    true_branch,
                    false_branch,
                }) => {
                    let taken = self.interpreter.eval_expr(condition)?.is_truthy();
                    let branch = if taken { true_branch } else { false_branch };
                    self.stack.push(branch.iter());
                }
            }
        }
    }
}

impl Iterator for Execution<'_> {
    type Item = HyqeResult<OpBuffer>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state != ExecutionState::Running {
            return None;
        }
        match self.advance() {
            Ok(Some(buffer)) => Some(Ok(buffer)),
            Ok(None) => None,
            Err(err) => {
                self.state = ExecutionState::Failed;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for Execution<'_> {}
