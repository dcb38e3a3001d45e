//! Shot environment
//!
//! Gantree: L3_Classical → ShotEnvironment
//!
//! One live register value per classical register for the duration of a
//! shot. Registers live in an arena indexed by dense id; names are resolved
//! through a side table at access time, so registers added mid-shot are
//! visible to every later lookup.

use hyqe_core::{DataType, HyqeError, HyqeResult, RegisterValue};
use hyqe_ir::{CReg, Export, LoadedProgram};
use std::collections::BTreeMap;

/// Classical state of one shot
/// Gantree: ShotEnvironment // CReg당 CRV 하나
#[derive(Debug, Clone, PartialEq)]
pub struct ShotEnvironment {
    /// Arena indexed by register id
    registers: Vec<RegisterValue>,

    /// Register names, aligned with `registers`
    names: Vec<String>,

    /// Name → id
    index: BTreeMap<String, usize>,

    /// Registers declared by the program (the rest were added mid-shot)
    declared: usize,

    /// Exports recorded by `Result` ops this shot
    exports: Vec<Export>,
}

impl ShotEnvironment {
    /// Create from register declarations, all values zero
    pub fn new(cregs: &[CReg]) -> HyqeResult<Self> {
        let mut env = Self {
            registers: Vec::with_capacity(cregs.len()),
            names: Vec::with_capacity(cregs.len()),
            index: BTreeMap::new(),
            declared: 0,
            exports: Vec::new(),
        };
        for creg in cregs {
            env.add_register(&creg.name, creg.dtype, creg.width)?;
        }
        env.declared = env.registers.len();
        Ok(env)
    }

    /// Create for a loaded program
    pub fn from_program(program: &LoadedProgram) -> HyqeResult<Self> {
        Self::new(program.cregs())
    }

    /// Zero every declared register and drop registers added mid-shot
    /// Gantree: reset(&mut) // 샷 시작 시 초기화
    pub fn reset(&mut self) {
        for name in self.names.drain(self.declared..) {
            self.index.remove(&name);
        }
        self.registers.truncate(self.declared);
        for reg in &mut self.registers {
            reg.set(0);
        }
        self.exports.clear();
    }

    /// Declare a register mid-shot
    /// Gantree: add_register(name, dtype, width) -> Result<id> // add_cvar
    pub fn add_register(&mut self, name: &str, dtype: DataType, width: u32) -> HyqeResult<usize> {
        if self.index.contains_key(name) {
            return Err(HyqeError::MalformedProgram(format!(
                "classical register '{}' already exists",
                name
            )));
        }
        let id = self.registers.len();
        self.registers.push(RegisterValue::new(dtype, width)?);
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        Ok(id)
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Dense id of a register
    pub fn id(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Check if a register exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Live value of a register
    pub fn get(&self, name: &str) -> HyqeResult<&RegisterValue> {
        let id = self.lookup(name)?;
        Ok(&self.registers[id])
    }

    /// Mutable live value of a register
    pub fn get_mut(&mut self, name: &str) -> HyqeResult<&mut RegisterValue> {
        let id = self.lookup(name)?;
        Ok(&mut self.registers[id])
    }

    /// Integer value of a register
    pub fn value(&self, name: &str) -> HyqeResult<i64> {
        self.get(name).map(RegisterValue::as_int)
    }

    /// One bit of a register
    pub fn bit(&self, name: &str, index: u32) -> HyqeResult<bool> {
        self.get(name)?.get_bit(index)
    }

    /// Assign a whole register (masked to width)
    pub fn set(&mut self, name: &str, value: i64) -> HyqeResult<()> {
        self.get_mut(name)?.set(value);
        Ok(())
    }

    /// Assign one bit
    pub fn set_bit(&mut self, name: &str, index: u32, value: bool) -> HyqeResult<()> {
        self.get_mut(name)?.set_bit(index, value)
    }

    /// Register names in id order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of registers
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Copy of every register keyed by name
    pub fn snapshot(&self) -> BTreeMap<String, RegisterValue> {
        self.names
            .iter()
            .cloned()
            .zip(self.registers.iter().copied())
            .collect()
    }

    // ========================================================================
    // Exports
    // ========================================================================

    /// Record a `Result` export
    pub fn add_export(&mut self, source: &str, name: &str) {
        self.exports.retain(|e| e.name != name);
        self.exports.push(Export {
            source: source.to_string(),
            name: name.to_string(),
        });
    }

    /// Exports recorded this shot
    pub fn exports(&self) -> &[Export] {
        &self.exports
    }

    fn lookup(&self, name: &str) -> HyqeResult<usize> {
        self.id(name)
            .ok_or_else(|| HyqeError::UnknownRegister(name.to_string()))
    }
}
