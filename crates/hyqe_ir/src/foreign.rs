//! Foreign function contract
//!
//! Gantree: L2_Program → ForeignObject
//!
//! Externally hosted classical functions called from a program through
//! `ffcall`. The engine only sees the call/return contract below; a runtime
//! that enforces an execution budget reports `ForeignTimeout` itself.

use hyqe_core::{HyqeError, HyqeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Value returned by a foreign call
/// Gantree: ForeignValue // Int | Seq
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForeignValue {
    /// Single integer
    Int(i64),
    /// Sequence of integers, one per return target
    Seq(Vec<i64>),
}

impl ForeignValue {
    /// Flatten into a list of integers
    pub fn into_values(self) -> Vec<i64> {
        match self {
            ForeignValue::Int(v) => vec![v],
            ForeignValue::Seq(vs) => vs,
        }
    }
}

/// Foreign object collaborator
/// Gantree: ForeignObject // trait
pub trait ForeignObject: Send {
    /// Called once before the first shot
    fn init(&mut self) -> HyqeResult<()> {
        Ok(())
    }

    /// Reset per-shot state
    fn shot_reinit(&mut self) -> HyqeResult<()> {
        Ok(())
    }

    /// Names of the callable functions
    fn get_funcs(&self) -> Vec<String>;

    /// Invoke a function
    fn exec(
        &mut self,
        function: &str,
        args: &[i64],
        namespace: Option<&str>,
    ) -> HyqeResult<ForeignValue>;

    /// Fresh, independent instance for a concurrently running shot
    fn new_instance(&self) -> Box<dyn ForeignObject>;
}

// ============================================================================
// Function Table
// ============================================================================

type ForeignFn = Arc<dyn Fn(&[i64]) -> HyqeResult<ForeignValue> + Send + Sync>;

/// Stateless foreign object backed by registered closures
/// Gantree: FunctionTable // 이름 → 함수 등록 테이블
#[derive(Clone, Default)]
pub struct FunctionTable {
    functions: BTreeMap<String, ForeignFn>,
}

impl FunctionTable {
    /// Create empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function (consuming builder)
    pub fn with_function<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&[i64]) -> HyqeResult<ForeignValue> + Send + Sync + 'static,
    {
        self.register(name, func);
        self
    }

    /// Register a function
    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&[i64]) -> HyqeResult<ForeignValue> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Arc::new(func));
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl std::fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTable")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ForeignObject for FunctionTable {
    fn get_funcs(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    fn exec(
        &mut self,
        function: &str,
        args: &[i64],
        _namespace: Option<&str>,
    ) -> HyqeResult<ForeignValue> {
        let func = self
            .functions
            .get(function)
            .ok_or_else(|| HyqeError::UnsupportedForeignCall(function.to_string()))?;
        func(args)
    }

    fn new_instance(&self) -> Box<dyn ForeignObject> {
        Box::new(self.clone())
    }
}
