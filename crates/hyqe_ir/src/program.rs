//! Loaded program
//!
//! Gantree: L2_Program → LoadedProgram
//!
//! Output of the loader. Parsed once and shared read-only by every shot.

use crate::foreign::ForeignObject;
use crate::loader;
use crate::model::{CReg, Metadata, Op, QReg};
use hyqe_core::{HyqeError, HyqeResult, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Register selected for the shot result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    /// Register read at shot end
    pub source: String,
    /// Name under which it is reported
    pub name: String,
}

/// Executable program
/// Gantree: LoadedProgram // 로드된 프로그램
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProgram {
    /// Wire format tag
    pub format: String,
    /// Wire format version
    pub version: String,
    /// Top-level metadata
    pub metadata: Metadata,
    pub(crate) qregs: Vec<QReg>,
    pub(crate) cregs: Vec<CReg>,
    pub(crate) ops: Vec<Op>,
    pub(crate) num_qubits: usize,
    pub(crate) foreign_calls: BTreeSet<String>,
    pub(crate) exports: Vec<Export>,
    pub(crate) warnings: Vec<HyqeError>,
}

impl LoadedProgram {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Load from a parsed wire-format value
    /// Gantree: from_value(v, foreign) -> Result<Self>
    pub fn from_value(
        value: &serde_json::Value,
        foreign: Option<&dyn ForeignObject>,
    ) -> HyqeResult<Self> {
        loader::load_program(value, foreign)
    }

    /// Load from JSON text
    pub fn from_json_str(json: &str, foreign: Option<&dyn ForeignObject>) -> HyqeResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(&value, foreign)
    }

    /// Load from a JSON file
    pub fn from_json_file(
        path: impl AsRef<Path>,
        foreign: Option<&dyn ForeignObject>,
    ) -> HyqeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text, foreign)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Total number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Root op list
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Quantum register declarations, in declaration order
    pub fn qregs(&self) -> &[QReg] {
        &self.qregs
    }

    /// Classical register declarations, in declaration order
    pub fn cregs(&self) -> &[CReg] {
        &self.cregs
    }

    /// Look up a classical register declaration
    pub fn creg(&self, name: &str) -> Option<&CReg> {
        self.cregs.iter().find(|c| c.name == name)
    }

    /// Look up a quantum register declaration
    pub fn qreg(&self, name: &str) -> Option<&QReg> {
        self.qregs.iter().find(|q| q.name == name)
    }

    /// Dense id of `register[index]`
    pub fn qubit_id(&self, register: &str, index: usize) -> Option<QubitId> {
        self.qreg(register).and_then(|q| q.qubit(index))
    }

    /// Classical register name → dense id
    pub fn creg_ids(&self) -> BTreeMap<String, usize> {
        self.cregs
            .iter()
            .map(|c| (c.name.clone(), c.id))
            .collect()
    }

    /// Quantum register name → first dense id
    pub fn qreg_offsets(&self) -> BTreeMap<String, QubitId> {
        self.qregs
            .iter()
            .map(|q| (q.name.clone(), q.offset))
            .collect()
    }

    /// Foreign functions called anywhere in the program
    pub fn foreign_calls(&self) -> &BTreeSet<String> {
        &self.foreign_calls
    }

    /// Check if the program calls any foreign function
    pub fn has_foreign_calls(&self) -> bool {
        !self.foreign_calls.is_empty()
    }

    /// Registers declared through `cvar_export`
    pub fn exports(&self) -> &[Export] {
        &self.exports
    }

    /// Non-fatal diagnostics raised while loading
    pub fn warnings(&self) -> &[HyqeError] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_str() {
        let text = json!({
            "format": "PHIR/JSON",
            "version": "0.1.0",
            "ops": [
                {"data": "qvar_define", "variable": "q", "size": 2},
                {"data": "cvar_define", "variable": "m", "size": 2, "data_type": "u32"}
            ]
        })
        .to_string();

        let program = LoadedProgram::from_json_str(&text, None).unwrap();
        assert_eq!(program.num_qubits(), 2);
        assert_eq!(program.qubit_id("q", 1), Some(1));
        assert_eq!(program.creg("m").map(|c| c.width), Some(2));
        assert!(program.ops().is_empty());
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(matches!(
            LoadedProgram::from_json_str("{not json", None),
            Err(HyqeError::JsonError(_))
        ));
    }

    #[test]
    fn test_from_json_file_missing() {
        assert!(matches!(
            LoadedProgram::from_json_file("/nonexistent/program.json", None),
            Err(HyqeError::FileError(_))
        ));
    }
}
