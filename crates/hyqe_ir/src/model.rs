//! Mid-level IR model
//!
//! Gantree: L2_Program → OpModel
//!
//! Typed op/block tree produced by the loader. Quantum arguments are already
//! resolved to dense qubit ids; classical arguments stay symbolic and are
//! resolved against the shot environment at evaluation time.

use hyqe_core::{Angle, ClassicalOperator, DataType, GateSymbol, Location, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Free-form op metadata
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Metadata key marking an op (or tick) as exempt from error injection
pub const ERROR_FREE_KEY: &str = "error_free";

// ============================================================================
// Declarations
// ============================================================================

/// Declared quantum register: a contiguous block of dense qubit ids
/// Gantree: QReg // 양자 레지스터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QReg {
    /// Register name
    pub name: String,
    /// Number of qubits
    pub size: usize,
    /// First dense id of the block
    pub offset: QubitId,
}

impl QReg {
    /// Dense id of element `index`
    pub fn qubit(&self, index: usize) -> Option<QubitId> {
        (index < self.size).then(|| self.offset + index)
    }

    /// All dense ids of the register
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.offset..self.offset + self.size
    }
}

/// Declared classical register
/// Gantree: CReg // 고전 레지스터 선언
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CReg {
    /// Register name
    pub name: String,
    /// Declared width in bits
    pub width: u32,
    /// Element type
    pub dtype: DataType,
    /// Dense id
    pub id: usize,
}

// ============================================================================
// Classical References
// ============================================================================

/// One bit of a classical register
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BitRef {
    /// Register name
    pub register: String,
    /// Bit index
    pub index: u32,
}

impl BitRef {
    /// Create a bit reference
    pub fn new(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index,
        }
    }
}

impl fmt::Display for BitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

/// Classical expression
/// Gantree: Expr // 고전 표현식
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal
    Literal(i64),
    /// Whole register
    Register(String),
    /// Single register bit
    Bit(BitRef),
    /// Nested operation
    Op {
        /// Operator
        op: ClassicalOperator,
        /// Operands (one for unary, two for binary)
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Binary operation
    pub fn binary(op: ClassicalOperator, lhs: Expr, rhs: Expr) -> Self {
        Expr::Op {
            op,
            args: vec![lhs, rhs],
        }
    }

    /// Unary operation
    pub fn unary(op: ClassicalOperator, arg: Expr) -> Self {
        Expr::Op {
            op,
            args: vec![arg],
        }
    }

    /// Register reference
    pub fn register(name: impl Into<String>) -> Self {
        Expr::Register(name.into())
    }

    /// Bit reference
    pub fn bit(register: impl Into<String>, index: u32) -> Self {
        Expr::Bit(BitRef::new(register, index))
    }
}

/// Assignment target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Whole register
    Register(String),
    /// Single register bit
    Bit(BitRef),
}

impl Target {
    /// Name of the addressed register
    pub fn register_name(&self) -> &str {
        match self {
            Target::Register(name) => name,
            Target::Bit(bit) => &bit.register,
        }
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Quantum operation
/// Gantree: QOp // 양자 연산
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QOp {
    /// Gate symbol
    pub symbol: GateSymbol,
    /// Addressed locations, one per application
    pub locations: Vec<Location>,
    /// Result bits, aligned with `locations` (measurements only)
    pub returns: Vec<BitRef>,
    /// Angle parameters in radians
    pub angles: Vec<Angle>,
    /// Free-form metadata
    pub metadata: Metadata,
}

impl QOp {
    /// Create a quantum op without parameters
    pub fn new(symbol: GateSymbol, locations: Vec<Location>) -> Self {
        Self {
            symbol,
            locations,
            returns: Vec::new(),
            angles: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Set angle parameters
    pub fn with_angles(mut self, angles: Vec<Angle>) -> Self {
        self.angles = angles;
        self
    }

    /// Set result bits
    pub fn with_returns(mut self, returns: Vec<BitRef>) -> Self {
        self.returns = returns;
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Check the error-free marker
    pub fn is_error_free(&self) -> bool {
        is_error_free(&self.metadata)
    }

    /// All qubits touched by the op
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.locations.iter().flat_map(|loc| loc.qubits().iter().copied())
    }
}

impl fmt::Display for QOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locs: Vec<String> = self.locations.iter().map(|l| l.to_string()).collect();
        write!(f, "{} [{}]", self.symbol, locs.join(", "))?;
        if !self.returns.is_empty() {
            let rets: Vec<String> = self.returns.iter().map(|r| r.to_string()).collect();
            write!(f, " -> [{}]", rets.join(", "))?;
        }
        Ok(())
    }
}

/// Classical operation
/// Gantree: COp // 고전 연산
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum COp {
    /// `=`: assign each value to the target at the same position
    Assign {
        /// Values
        values: Vec<Expr>,
        /// Targets
        targets: Vec<Target>,
    },
    /// Operator evaluated at top level, result written to `target`
    Compute {
        /// Expression (always an `Expr::Op`)
        expr: Expr,
        /// Target
        target: Target,
    },
    /// Export registers under output names
    Result {
        /// Source register names
        sources: Vec<String>,
        /// Output names
        names: Vec<String>,
    },
}

/// Foreign function call
/// Gantree: ForeignCall // 외부 함수 호출
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignCall {
    /// Function name
    pub function: String,
    /// Optional namespace
    pub namespace: Option<String>,
    /// Arguments (whole registers, bits or literals)
    pub args: Vec<Expr>,
    /// Result targets
    pub returns: Vec<Target>,
}

/// Machine operation (idle, transport...). Seen by the error model only.
/// Gantree: MOp // 머신 연산
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MOp {
    /// Operation name
    pub name: String,
    /// Addressed locations
    pub locations: Vec<Location>,
    /// Duration in seconds, if given
    pub duration: Option<f64>,
    /// Free-form metadata
    pub metadata: Metadata,
}

impl MOp {
    /// All qubits touched by the op
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.locations.iter().flat_map(|loc| loc.qubits().iter().copied())
    }
}

/// Scheduling-only operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaOp {
    /// No op may move across the barrier on these qubits
    Barrier(Vec<QubitId>),
}

/// Structured block
/// Gantree: Block // Sequence / Parallel / If
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// Ordered members
    Sequence(Vec<Op>),
    /// Members without relative order; quantum members must not overlap
    Parallel(Vec<Op>),
    /// Conditional
    If {
        /// Condition
        condition: Expr,
        /// Taken when the condition is nonzero
        true_branch: Vec<Op>,
        /// Taken otherwise (may be empty)
        false_branch: Vec<Op>,
    },
}

/// Node of the op/block tree
/// Gantree: Op // 태그 합 타입
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Quantum operation
    Quantum(QOp),
    /// Classical operation
    Classical(COp),
    /// Foreign call
    Foreign(ForeignCall),
    /// Machine operation
    Machine(MOp),
    /// Scheduling hint
    Meta(MetaOp),
    /// Nested block
    Block(Block),
}

impl From<QOp> for Op {
    fn from(op: QOp) -> Self {
        Op::Quantum(op)
    }
}

impl From<COp> for Op {
    fn from(op: COp) -> Self {
        Op::Classical(op)
    }
}

impl From<Block> for Op {
    fn from(block: Block) -> Self {
        Op::Block(block)
    }
}

/// Check a metadata map for `error_free: true`
pub fn is_error_free(metadata: &Metadata) -> bool {
    metadata
        .get(ERROR_FREE_KEY)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}
