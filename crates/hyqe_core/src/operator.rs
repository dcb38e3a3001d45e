//! Classical operator symbols
//!
//! Gantree: L1_Operations → ClassicalOperator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator of a classical expression
/// Gantree: ClassicalOperator // 고전 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassicalOperator {
    /// `+`
    Add,
    /// `-` (binary subtraction, unary negation)
    Sub,
    /// `*`
    Mul,
    /// `/` (floor division)
    Div,
    /// `%` (sign follows the divisor)
    Rem,
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
    /// `~` (unary only)
    Not,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
}

impl ClassicalOperator {
    /// Parse from wire symbol
    pub fn parse(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => ClassicalOperator::Add,
            "-" => ClassicalOperator::Sub,
            "*" => ClassicalOperator::Mul,
            "/" => ClassicalOperator::Div,
            "%" => ClassicalOperator::Rem,
            "&" => ClassicalOperator::And,
            "|" => ClassicalOperator::Or,
            "^" => ClassicalOperator::Xor,
            "~" => ClassicalOperator::Not,
            "<<" => ClassicalOperator::Shl,
            ">>" => ClassicalOperator::Shr,
            "==" => ClassicalOperator::Eq,
            "!=" => ClassicalOperator::Ne,
            "<" => ClassicalOperator::Lt,
            ">" => ClassicalOperator::Gt,
            "<=" => ClassicalOperator::Le,
            ">=" => ClassicalOperator::Ge,
            _ => return None,
        };
        Some(op)
    }

    /// Wire symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            ClassicalOperator::Add => "+",
            ClassicalOperator::Sub => "-",
            ClassicalOperator::Mul => "*",
            ClassicalOperator::Div => "/",
            ClassicalOperator::Rem => "%",
            ClassicalOperator::And => "&",
            ClassicalOperator::Or => "|",
            ClassicalOperator::Xor => "^",
            ClassicalOperator::Not => "~",
            ClassicalOperator::Shl => "<<",
            ClassicalOperator::Shr => ">>",
            ClassicalOperator::Eq => "==",
            ClassicalOperator::Ne => "!=",
            ClassicalOperator::Lt => "<",
            ClassicalOperator::Gt => ">",
            ClassicalOperator::Le => "<=",
            ClassicalOperator::Ge => ">=",
        }
    }

    /// Check if the operator produces a single-bit truth value
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            ClassicalOperator::Eq
                | ClassicalOperator::Ne
                | ClassicalOperator::Lt
                | ClassicalOperator::Gt
                | ClassicalOperator::Le
                | ClassicalOperator::Ge
        )
    }

    /// Check if the operator accepts a single operand
    pub fn is_unary(&self) -> bool {
        matches!(self, ClassicalOperator::Not | ClassicalOperator::Sub)
    }

    /// Check if the operator accepts two operands
    pub fn is_binary(&self) -> bool {
        !matches!(self, ClassicalOperator::Not)
    }
}

impl fmt::Display for ClassicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
