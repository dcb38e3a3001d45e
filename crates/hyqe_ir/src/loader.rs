//! Wire-format loader
//!
//! Gantree: L2_Program → Loader
//!
//! Converts a JSON-shaped program into a [`LoadedProgram`]. Quantum register
//! references are resolved to dense ids here; classical references stay
//! symbolic.
//!
//! Recognized entries:
//!
//! ```text
//! {"data": "qvar_define" | "cvar_define" | "cvar_export", ...}
//! {"qop": name, "args": [...], "angles": [[...], unit], "returns": [...]}
//! {"cop": symbol | "=" | "ffcall" | "Result", "args": [...], "returns": [...]}
//! {"mop": name, "args": [...], "duration": [value, unit]}
//! {"meta": "barrier", "args": [...]}
//! {"block": "sequence" | "qparallel" | "if", ...}
//! {"//": comment}
//! ```

use crate::foreign::ForeignObject;
use crate::model::{
    BitRef, Block, COp, CReg, Expr, ForeignCall, MOp, Metadata, MetaOp, Op, QOp, QReg, Target,
};
use crate::program::{Export, LoadedProgram};
use hyqe_core::{
    units, Angle, ClassicalOperator, DataType, GateSymbol, HyqeError, HyqeResult, Location,
    QubitId, RegisterValue,
};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Load a program from a parsed wire-format value
/// Gantree: load_program(v, foreign) -> Result<LoadedProgram> // 2단계 해석
pub fn load_program(
    value: &Value,
    foreign: Option<&dyn ForeignObject>,
) -> HyqeResult<LoadedProgram> {
    let root = value
        .as_object()
        .ok_or_else(|| malformed("program must be a JSON object"))?;

    let ops_value = root
        .get("ops")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("program has no 'ops' list"))?;

    let mut loader = Loader::default();
    let ops = loader.convert_list(ops_value)?;

    let mut warnings = Vec::new();
    if let Some(foreign) = foreign {
        let available: BTreeSet<String> = foreign.get_funcs().into_iter().collect();
        if loader.foreign_calls.is_empty() {
            log::warn!("foreign object supplied but the program makes no foreign calls");
            warnings.push(HyqeError::UnnecessaryForeignObject);
        }
        if let Some(missing) = loader
            .foreign_calls
            .iter()
            .find(|name| !available.contains(*name))
        {
            return Err(HyqeError::UnsupportedForeignCall(missing.clone()));
        }
    }

    log::debug!(
        "loaded program: {} qubits, {} classical registers, {} root ops",
        loader.num_qubits,
        loader.cregs.len(),
        ops.len()
    );

    Ok(LoadedProgram {
        format: string_field(root, "format").unwrap_or_default(),
        version: string_field(root, "version").unwrap_or_default(),
        metadata: metadata_field(root)?,
        qregs: loader.qregs,
        cregs: loader.cregs,
        ops,
        num_qubits: loader.num_qubits,
        foreign_calls: loader.foreign_calls,
        exports: loader.exports,
        warnings,
    })
}

// ============================================================================
// Loader State
// ============================================================================

#[derive(Default)]
struct Loader {
    qregs: Vec<QReg>,
    qreg_index: BTreeMap<String, usize>,
    cregs: Vec<CReg>,
    num_qubits: usize,
    foreign_calls: BTreeSet<String>,
    exports: Vec<Export>,
}

impl Loader {
    fn convert_list(&mut self, entries: &[Value]) -> HyqeResult<Vec<Op>> {
        let mut ops = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(op) = self.convert_entry(entry)? {
                ops.push(op);
            }
        }
        Ok(ops)
    }

    /// Declarations and comments produce no op
    fn convert_entry(&mut self, entry: &Value) -> HyqeResult<Option<Op>> {
        let obj = entry
            .as_object()
            .ok_or_else(|| malformed(format!("op entry must be an object: {}", entry)))?;

        if let Some(kind) = obj.get("data") {
            self.declare(as_str(kind, "data")?, obj)?;
            return Ok(None);
        }
        if let Some(name) = obj.get("qop") {
            return Ok(Some(Op::Quantum(self.convert_qop(as_str(name, "qop")?, obj)?)));
        }
        if let Some(symbol) = obj.get("cop") {
            return self.convert_cop(as_str(symbol, "cop")?, obj).map(Some);
        }
        if let Some(name) = obj.get("mop") {
            return Ok(Some(Op::Machine(self.convert_mop(as_str(name, "mop")?, obj)?)));
        }
        if let Some(name) = obj.get("meta") {
            return Ok(Some(Op::Meta(self.convert_meta(as_str(name, "meta")?, obj)?)));
        }
        if let Some(kind) = obj.get("block") {
            return Ok(Some(Op::Block(self.convert_block(as_str(kind, "block")?, obj)?)));
        }
        if obj.contains_key("//") {
            return Ok(None);
        }

        Err(malformed(format!("unrecognized op entry: {}", entry)))
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn declare(&mut self, kind: &str, obj: &Map<String, Value>) -> HyqeResult<()> {
        match kind {
            "qvar_define" => {
                let name = required_str(obj, "variable")?;
                let size = required_usize(obj, "size")?;
                if self.qreg_index.contains_key(&name) {
                    return Err(malformed(format!("quantum register '{}' redeclared", name)));
                }
                self.qreg_index.insert(name.clone(), self.qregs.len());
                self.qregs.push(QReg {
                    name,
                    size,
                    offset: self.num_qubits,
                });
                self.num_qubits += size;
            }
            "cvar_define" => {
                let name = required_str(obj, "variable")?;
                if self.cregs.iter().any(|c| c.name == name) {
                    return Err(malformed(format!("classical register '{}' redeclared", name)));
                }
                let dtype = match obj.get("data_type") {
                    Some(t) => DataType::parse(as_str(t, "data_type")?)?,
                    None => DataType::default(),
                };
                let width = match obj.get("size") {
                    Some(_) => u32::try_from(required_usize(obj, "size")?).map_err(|_| {
                        malformed(format!("classical register '{}' size out of range", name))
                    })?,
                    None => dtype.bits(),
                };
                // validates width against the element type
                RegisterValue::new(dtype, width)?;
                let id = self.cregs.len();
                self.cregs.push(CReg {
                    name,
                    width,
                    dtype,
                    id,
                });
            }
            "cvar_export" => {
                let names = obj
                    .get("variables")
                    .and_then(Value::as_array)
                    .ok_or_else(|| malformed("cvar_export needs a 'variables' list"))?;
                for name in names {
                    let name = as_str(name, "variables")?.to_string();
                    self.exports.push(Export {
                        source: name.clone(),
                        name,
                    });
                }
            }
            other => return Err(malformed(format!("unknown data declaration '{}'", other))),
        }
        Ok(())
    }

    // ========================================================================
    // Quantum Ops
    // ========================================================================

    fn convert_qop(&mut self, name: &str, obj: &Map<String, Value>) -> HyqeResult<QOp> {
        let symbol = GateSymbol::parse(name)
            .ok_or_else(|| malformed(format!("unknown quantum operation '{}'", name)))?;

        let locations = self.convert_locations(obj.get("args"))?;
        for loc in &locations {
            if loc.len() != symbol.arity() {
                return Err(malformed(format!(
                    "{} expects {} qubit(s) per location, got {}",
                    symbol,
                    symbol.arity(),
                    loc
                )));
            }
            let unique: BTreeSet<_> = loc.qubits().iter().collect();
            if unique.len() != loc.len() {
                return Err(malformed(format!("{} addresses {} twice", symbol, loc)));
            }
        }

        let angles = match obj.get("angles") {
            Some(value) => convert_angles(value)?,
            None => Vec::new(),
        };
        if angles.len() != symbol.num_angles() {
            return Err(malformed(format!(
                "{} expects {} angle(s), got {}",
                symbol,
                symbol.num_angles(),
                angles.len()
            )));
        }

        let returns = match obj.get("returns") {
            Some(value) => convert_returns(value, locations.len())?,
            None => Vec::new(),
        };
        if !returns.is_empty() {
            if !symbol.is_measurement() {
                return Err(malformed(format!("{} cannot return classical bits", symbol)));
            }
            if returns.len() != locations.len() {
                return Err(malformed(format!(
                    "{} has {} location(s) but {} return bit(s)",
                    symbol,
                    locations.len(),
                    returns.len()
                )));
            }
        }

        Ok(QOp {
            symbol,
            locations,
            returns,
            angles,
            metadata: metadata_field(obj)?,
        })
    }

    fn convert_locations(&self, args: Option<&Value>) -> HyqeResult<Vec<Location>> {
        let Some(args) = args else {
            return Ok(Vec::new());
        };
        let args = args
            .as_array()
            .ok_or_else(|| malformed("'args' must be a list"))?;

        let mut locations = Vec::new();
        for arg in args {
            match arg {
                // whole register: one location per qubit
                Value::String(name) => {
                    let qreg = self.qreg(name)?;
                    locations.extend(qreg.qubits().map(Location::single));
                }
                Value::Array(items) if is_qubit_ref(items) => {
                    locations.push(Location::single(self.resolve_qubit(arg)?));
                }
                Value::Array(items) => {
                    let qubits = items
                        .iter()
                        .map(|item| self.resolve_qubit(item))
                        .collect::<HyqeResult<Vec<_>>>()?;
                    locations.push(Location::new(qubits));
                }
                _ => return Err(malformed(format!("invalid qubit argument {}", arg))),
            }
        }
        Ok(locations)
    }

    fn resolve_qubit(&self, value: &Value) -> HyqeResult<QubitId> {
        let (name, index) = register_index(value)?;
        let qreg = self.qreg(&name)?;
        qreg.qubit(index as usize)
            .ok_or_else(|| HyqeError::UnresolvedRegister(format!("{}[{}]", name, index)))
    }

    fn qreg(&self, name: &str) -> HyqeResult<&QReg> {
        self.qreg_index
            .get(name)
            .map(|&i| &self.qregs[i])
            .ok_or_else(|| HyqeError::UnresolvedRegister(name.to_string()))
    }

    // ========================================================================
    // Classical Ops
    // ========================================================================

    fn convert_cop(&mut self, symbol: &str, obj: &Map<String, Value>) -> HyqeResult<Op> {
        let args = list_field(obj, "args")?;
        let returns = list_field(obj, "returns")?;

        match symbol {
            "ffcall" => {
                let function = required_str(obj, "function")?;
                self.foreign_calls.insert(function.clone());
                Ok(Op::Foreign(ForeignCall {
                    function,
                    namespace: string_field(obj, "namespace"),
                    args: args.iter().map(convert_expr).collect::<HyqeResult<_>>()?,
                    returns: returns.iter().map(convert_target).collect::<HyqeResult<_>>()?,
                }))
            }
            "Result" => {
                if args.len() != returns.len() {
                    return Err(malformed("Result needs one output name per register"));
                }
                let sources = args
                    .iter()
                    .map(|v| as_str(v, "args").map(String::from))
                    .collect::<HyqeResult<_>>()?;
                let names = returns
                    .iter()
                    .map(|v| as_str(v, "returns").map(String::from))
                    .collect::<HyqeResult<_>>()?;
                Ok(Op::Classical(COp::Result { sources, names }))
            }
            "=" => {
                if args.len() != returns.len() {
                    return Err(malformed(format!(
                        "assignment has {} value(s) for {} target(s)",
                        args.len(),
                        returns.len()
                    )));
                }
                Ok(Op::Classical(COp::Assign {
                    values: args.iter().map(convert_expr).collect::<HyqeResult<_>>()?,
                    targets: returns.iter().map(convert_target).collect::<HyqeResult<_>>()?,
                }))
            }
            _ => {
                let expr = convert_op_expr(symbol, args)?;
                let target = match returns {
                    [target] => convert_target(target)?,
                    _ => {
                        return Err(malformed(format!(
                            "'{}' at top level needs exactly one return target",
                            symbol
                        )))
                    }
                };
                Ok(Op::Classical(COp::Compute { expr, target }))
            }
        }
    }

    // ========================================================================
    // Machine / Meta Ops
    // ========================================================================

    fn convert_mop(&mut self, name: &str, obj: &Map<String, Value>) -> HyqeResult<MOp> {
        let duration = match obj.get("duration") {
            Some(value) => Some(convert_duration(value)?),
            None => None,
        };
        Ok(MOp {
            name: name.to_string(),
            locations: self.convert_locations(obj.get("args"))?,
            duration,
            metadata: metadata_field(obj)?,
        })
    }

    fn convert_meta(&mut self, name: &str, obj: &Map<String, Value>) -> HyqeResult<MetaOp> {
        match name {
            "barrier" => {
                let qubits = self
                    .convert_locations(obj.get("args"))?
                    .iter()
                    .flat_map(|loc| loc.qubits().to_vec())
                    .collect();
                Ok(MetaOp::Barrier(qubits))
            }
            other => Err(malformed(format!("unknown meta instruction '{}'", other))),
        }
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    fn convert_block(&mut self, kind: &str, obj: &Map<String, Value>) -> HyqeResult<Block> {
        match kind {
            "sequence" => Ok(Block::Sequence(self.convert_list(list_field(obj, "ops")?)?)),
            "qparallel" => {
                let ops = self.convert_list(list_field(obj, "ops")?)?;
                check_parallel(&ops)?;
                Ok(Block::Parallel(ops))
            }
            "if" => {
                let condition = obj
                    .get("condition")
                    .ok_or_else(|| malformed("if block has no condition"))?;
                Ok(Block::If {
                    condition: convert_expr(condition)?,
                    true_branch: self.convert_list(list_field(obj, "true_branch")?)?,
                    false_branch: self.convert_list(list_field(obj, "false_branch")?)?,
                })
            }
            other => Err(malformed(format!("unknown block type '{}'", other))),
        }
    }
}

/// Parallel members must be quantum or machine ops on disjoint qubits
fn check_parallel(ops: &[Op]) -> HyqeResult<()> {
    let mut used = BTreeSet::new();
    for op in ops {
        let qubits: Vec<QubitId> = match op {
            Op::Quantum(q) => q.qubits().collect(),
            Op::Machine(m) => m.qubits().collect(),
            _ => return Err(malformed("qparallel blocks may only hold qop/mop entries")),
        };
        for qubit in qubits {
            if !used.insert(qubit) {
                return Err(HyqeError::QubitConflict { qubit, tick: 0 });
            }
        }
    }
    Ok(())
}

// ============================================================================
// Expression Parsing
// ============================================================================

fn convert_expr(value: &Value) -> HyqeResult<Expr> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| u as i64))
            .map(Expr::Literal)
            .ok_or_else(|| malformed(format!("non-integer literal {}", n))),
        Value::Bool(b) => Ok(Expr::Literal(*b as i64)),
        Value::String(name) => Ok(Expr::Register(name.clone())),
        Value::Array(_) => {
            let (register, index) = register_index(value)?;
            Ok(Expr::Bit(BitRef { register, index }))
        }
        Value::Object(obj) => {
            let symbol = obj
                .get("cop")
                .ok_or_else(|| malformed(format!("nested expression without 'cop': {}", value)))?;
            convert_op_expr(as_str(symbol, "cop")?, list_field(obj, "args")?)
        }
        Value::Null => Err(malformed("null expression")),
    }
}

fn convert_op_expr(symbol: &str, args: &[Value]) -> HyqeResult<Expr> {
    let op = ClassicalOperator::parse(symbol)
        .ok_or_else(|| HyqeError::UnknownOperator(symbol.to_string()))?;
    let arity_ok = match args.len() {
        1 => op.is_unary(),
        2 => op.is_binary(),
        _ => false,
    };
    if !arity_ok {
        return Err(malformed(format!(
            "operator '{}' cannot take {} argument(s)",
            symbol,
            args.len()
        )));
    }
    Ok(Expr::Op {
        op,
        args: args.iter().map(convert_expr).collect::<HyqeResult<_>>()?,
    })
}

fn convert_target(value: &Value) -> HyqeResult<Target> {
    match value {
        Value::String(name) => Ok(Target::Register(name.clone())),
        Value::Array(_) => {
            let (register, index) = register_index(value)?;
            Ok(Target::Bit(BitRef { register, index }))
        }
        _ => Err(malformed(format!("invalid assignment target {}", value))),
    }
}

/// `[["m", 0], ["m", 1]]`, or a register name expanded to bits `0..count`
fn convert_returns(value: &Value, count: usize) -> HyqeResult<Vec<BitRef>> {
    let items = value
        .as_array()
        .ok_or_else(|| malformed("'returns' must be a list"))?;
    let mut bits = Vec::new();
    for item in items {
        match item {
            Value::String(name) => {
                bits.extend((0..count as u32).map(|i| BitRef::new(name.clone(), i)));
            }
            _ => {
                let (register, index) = register_index(item)?;
                bits.push(BitRef { register, index });
            }
        }
    }
    Ok(bits)
}

/// `[[values...], unit]`
fn convert_angles(value: &Value) -> HyqeResult<Vec<Angle>> {
    let parts = value
        .as_array()
        .filter(|p| p.len() == 2)
        .ok_or_else(|| malformed(format!("angles must be [[values], unit]: {}", value)))?;
    let unit = as_str(&parts[1], "angle unit")?;
    let values = parts[0]
        .as_array()
        .ok_or_else(|| malformed("angle values must be a list"))?;

    values
        .iter()
        .map(|v| {
            let raw = v
                .as_f64()
                .ok_or_else(|| malformed(format!("angle {} is not a number", v)))?;
            units::to_radians(raw, unit)
                .ok_or_else(|| malformed(format!("unknown angle unit '{}'", unit)))
        })
        .collect()
}

/// Duration in seconds from a number or `[value, unit]`
fn convert_duration(value: &Value) -> HyqeResult<f64> {
    if let Some(seconds) = value.as_f64() {
        return Ok(seconds);
    }
    let parts = value
        .as_array()
        .filter(|p| p.len() == 2)
        .ok_or_else(|| malformed(format!("duration must be [value, unit]: {}", value)))?;
    let raw = parts[0]
        .as_f64()
        .ok_or_else(|| malformed("duration value is not a number"))?;
    let scale = match as_str(&parts[1], "duration unit")? {
        "s" => 1.0,
        "ms" => 1e-3,
        "us" => 1e-6,
        "ns" => 1e-9,
        other => return Err(malformed(format!("unknown duration unit '{}'", other))),
    };
    Ok(raw * scale)
}

// ============================================================================
// Field Helpers
// ============================================================================

fn malformed(msg: impl Into<String>) -> HyqeError {
    HyqeError::MalformedProgram(msg.into())
}

fn as_str<'a>(value: &'a Value, field: &str) -> HyqeResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| malformed(format!("'{}' must be a string, got {}", field, value)))
}

fn required_str(obj: &Map<String, Value>, field: &str) -> HyqeResult<String> {
    let value = obj
        .get(field)
        .ok_or_else(|| malformed(format!("missing field '{}'", field)))?;
    as_str(value, field).map(String::from)
}

fn required_usize(obj: &Map<String, Value>, field: &str) -> HyqeResult<usize> {
    obj.get(field)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| malformed(format!("'{}' must be a non-negative integer", field)))
}

fn string_field(obj: &Map<String, Value>, field: &str) -> Option<String> {
    obj.get(field).and_then(Value::as_str).map(String::from)
}

/// Missing list fields read as empty
fn list_field<'a>(obj: &'a Map<String, Value>, field: &str) -> HyqeResult<&'a [Value]> {
    match obj.get(field) {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(malformed(format!("'{}' must be a list, got {}", field, other))),
    }
}

fn metadata_field(obj: &Map<String, Value>) -> HyqeResult<Metadata> {
    match obj.get("metadata") {
        None => Ok(Metadata::new()),
        Some(Value::Object(map)) => Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        Some(other) => Err(malformed(format!("metadata must be an object, got {}", other))),
    }
}

fn is_qubit_ref(items: &[Value]) -> bool {
    items.len() == 2 && items[0].is_string() && items[1].is_u64()
}

/// `[name, index]`
fn register_index(value: &Value) -> HyqeResult<(String, u32)> {
    match value.as_array().map(Vec::as_slice) {
        Some([Value::String(name), index]) => index
            .as_u64()
            .and_then(|i| u32::try_from(i).ok())
            .map(|i| (name.clone(), i))
            .ok_or_else(|| malformed(format!("invalid register index in {}", value))),
        _ => Err(malformed(format!("expected [register, index], got {}", value))),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foreign::{ForeignValue, FunctionTable};
    use approx::assert_relative_eq;
    use serde_json::json;
    use std::f64::consts::PI;

    fn program(ops: Value) -> Value {
        json!({"format": "PHIR/JSON", "version": "0.1.0", "metadata": {}, "ops": ops})
    }

    fn declarations() -> Vec<Value> {
        vec![
            json!({"data": "qvar_define", "data_type": "qubits", "variable": "q", "size": 2}),
            json!({"data": "qvar_define", "data_type": "qubits", "variable": "a", "size": 3}),
            json!({"data": "cvar_define", "data_type": "i64", "variable": "m", "size": 2}),
        ]
    }

    fn with_decls(extra: Vec<Value>) -> Value {
        let mut ops = declarations();
        ops.extend(extra);
        program(Value::Array(ops))
    }

    #[test]
    fn test_dense_qubit_ids() {
        let loaded = load_program(&with_decls(vec![]), None).unwrap();
        assert_eq!(loaded.num_qubits(), 5);
        assert_eq!(loaded.qubit_id("q", 1), Some(1));
        assert_eq!(loaded.qubit_id("a", 0), Some(2));
        assert_eq!(loaded.qubit_id("a", 2), Some(4));
        assert_eq!(loaded.creg_ids().get("m"), Some(&0));
    }

    #[test]
    fn test_qop_locations_and_returns() {
        let loaded = load_program(
            &with_decls(vec![
                json!({"qop": "CX", "args": [[["q", 0], ["a", 1]]]}),
                json!({"qop": "Measure", "args": [["q", 0], ["q", 1]], "returns": [["m", 0], ["m", 1]]}),
            ]),
            None,
        )
        .unwrap();

        match &loaded.ops()[0] {
            Op::Quantum(op) => {
                assert_eq!(op.symbol, GateSymbol::CX);
                assert_eq!(op.locations, vec![Location::pair(0, 3)]);
            }
            other => panic!("expected qop, got {:?}", other),
        }
        match &loaded.ops()[1] {
            Op::Quantum(op) => {
                assert_eq!(op.locations.len(), 2);
                assert_eq!(op.returns[1], BitRef::new("m", 1));
            }
            other => panic!("expected qop, got {:?}", other),
        }
    }

    #[test]
    fn test_whole_register_argument() {
        let loaded = load_program(
            &with_decls(vec![json!({"qop": "H", "args": ["a"]})]),
            None,
        )
        .unwrap();
        match &loaded.ops()[0] {
            Op::Quantum(op) => assert_eq!(
                op.locations,
                vec![Location::single(2), Location::single(3), Location::single(4)]
            ),
            other => panic!("expected qop, got {:?}", other),
        }
    }

    #[test]
    fn test_angle_units() {
        let loaded = load_program(
            &with_decls(vec![
                json!({"qop": "RZ", "angles": [[0.5], "pi"], "args": [["q", 0]]}),
                json!({"qop": "RX", "angles": [[90.0], "deg"], "args": [["q", 0]]}),
                json!({"qop": "R1XY", "angles": [[0.25, 1.0], "rad"], "args": [["q", 1]]}),
            ]),
            None,
        )
        .unwrap();

        let angles: Vec<Vec<f64>> = loaded
            .ops()
            .iter()
            .filter_map(|op| match op {
                Op::Quantum(q) => Some(q.angles.clone()),
                _ => None,
            })
            .collect();
        assert_relative_eq!(angles[0][0], PI / 2.0);
        assert_relative_eq!(angles[1][0], PI / 2.0);
        assert_relative_eq!(angles[2][1], 1.0);
    }

    #[test]
    fn test_unknown_unit_is_malformed() {
        let result = load_program(
            &with_decls(vec![
                json!({"qop": "RZ", "angles": [[0.5], "turns"], "args": [["q", 0]]}),
            ]),
            None,
        );
        assert!(matches!(result, Err(HyqeError::MalformedProgram(_))));
    }

    #[test]
    fn test_unknown_tags_are_malformed() {
        for entry in [
            json!({"qop": "Frobnicate", "args": [["q", 0]]}),
            json!({"block": "while", "ops": []}),
            json!({"data": "tvar_define", "variable": "x"}),
            json!({"meta": "fence"}),
            json!({"nonsense": 1}),
        ] {
            let result = load_program(&with_decls(vec![entry.clone()]), None);
            assert!(
                matches!(result, Err(HyqeError::MalformedProgram(_))),
                "entry {} gave {:?}",
                entry,
                result
            );
        }
    }

    #[test]
    fn test_unresolved_quantum_register() {
        let result = load_program(
            &with_decls(vec![json!({"qop": "H", "args": [["z", 0]]})]),
            None,
        );
        assert_eq!(result, Err(HyqeError::UnresolvedRegister("z".into())));

        let result = load_program(
            &with_decls(vec![json!({"qop": "H", "args": [["q", 7]]})]),
            None,
        );
        assert!(matches!(result, Err(HyqeError::UnresolvedRegister(_))));
    }

    #[test]
    fn test_classical_refs_stay_symbolic() {
        // 'late' is never declared; classical references are not checked at load
        let loaded = load_program(
            &with_decls(vec![json!({"cop": "=", "args": [{"cop": "+", "args": ["late", 1]}], "returns": [["m", 0]]})]),
            None,
        )
        .unwrap();
        match &loaded.ops()[0] {
            Op::Classical(COp::Assign { values, targets }) => {
                assert_eq!(
                    values[0],
                    Expr::binary(
                        ClassicalOperator::Add,
                        Expr::register("late"),
                        Expr::Literal(1)
                    )
                );
                assert_eq!(targets[0], Target::Bit(BitRef::new("m", 0)));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_if_block() {
        let loaded = load_program(
            &with_decls(vec![json!({
                "block": "if",
                "condition": {"cop": "==", "args": ["m", 1]},
                "true_branch": [{"qop": "X", "args": [["q", 0]]}]
            })]),
            None,
        )
        .unwrap();
        match &loaded.ops()[0] {
            Op::Block(Block::If {
                true_branch,
                false_branch,
                ..
            }) => {
                assert_eq!(true_branch.len(), 1);
                assert!(false_branch.is_empty());
            }
            other => panic!("expected if block, got {:?}", other),
        }
    }

    #[test]
    fn test_qparallel_overlap_rejected() {
        let result = load_program(
            &with_decls(vec![json!({
                "block": "qparallel",
                "ops": [
                    {"qop": "H", "args": [["q", 0]]},
                    {"qop": "CX", "args": [[["a", 0], ["q", 0]]]}
                ]
            })]),
            None,
        );
        assert_eq!(result, Err(HyqeError::QubitConflict { qubit: 0, tick: 0 }));
    }

    #[test]
    fn test_comments_skipped() {
        let loaded = load_program(
            &with_decls(vec![json!({"//": "prepare"}), json!({"qop": "H", "args": [["q", 0]]})]),
            None,
        )
        .unwrap();
        assert_eq!(loaded.ops().len(), 1);
    }

    #[test]
    fn test_mop_duration_units() {
        let loaded = load_program(
            &with_decls(vec![json!({"mop": "Idle", "args": [["q", 0]], "duration": [5.0, "ms"]})]),
            None,
        )
        .unwrap();
        match &loaded.ops()[0] {
            Op::Machine(mop) => assert_relative_eq!(mop.duration.unwrap(), 5e-3),
            other => panic!("expected mop, got {:?}", other),
        }
    }

    #[test]
    fn test_exports() {
        let loaded = load_program(
            &with_decls(vec![json!({"data": "cvar_export", "variables": ["m"]})]),
            None,
        )
        .unwrap();
        assert_eq!(
            loaded.exports(),
            &[Export {
                source: "m".into(),
                name: "m".into()
            }]
        );
    }

    #[test]
    fn test_foreign_registry_checks() {
        let call = json!({"cop": "ffcall", "function": "add", "args": ["m", 1], "returns": ["m"]});
        let table = FunctionTable::new().with_function("add", |a| Ok(ForeignValue::Int(a[0] + a[1])));

        let loaded = load_program(&with_decls(vec![call.clone()]), Some(&table)).unwrap();
        assert!(loaded.foreign_calls().contains("add"));
        assert!(loaded.warnings().is_empty());

        let other = FunctionTable::new().with_function("mul", |_| Ok(ForeignValue::Int(0)));
        assert_eq!(
            load_program(&with_decls(vec![call.clone()]), Some(&other)),
            Err(HyqeError::UnsupportedForeignCall("add".into()))
        );

        // no foreign object at load: checked at runtime instead
        assert!(load_program(&with_decls(vec![call]), None).is_ok());
    }

    #[test]
    fn test_unnecessary_foreign_object_is_warning() {
        let table = FunctionTable::new().with_function("add", |_| Ok(ForeignValue::Int(0)));
        let loaded = load_program(&with_decls(vec![]), Some(&table)).unwrap();
        assert_eq!(loaded.warnings(), &[HyqeError::UnnecessaryForeignObject]);
    }

    #[test]
    fn test_arity_and_width_validation() {
        assert!(matches!(
            load_program(&with_decls(vec![json!({"qop": "CX", "args": [["q", 0]]})]), None),
            Err(HyqeError::MalformedProgram(_))
        ));
        assert!(matches!(
            load_program(
                &program(json!([{"data": "cvar_define", "data_type": "u8", "variable": "c", "size": 9}])),
                None
            ),
            Err(HyqeError::InvalidWidth { width: 9, max: 8 })
        ));
    }

    #[test]
    fn test_oversized_size_and_index_rejected() {
        // 2^32 + 8 must not wrap to a width of 8
        assert!(matches!(
            load_program(
                &program(json!([{"data": "cvar_define", "variable": "c", "size": 4294967304u64}])),
                None
            ),
            Err(HyqeError::MalformedProgram(_))
        ));
        for entry in [
            json!({"cop": "=", "args": [1], "returns": [["m", 4294967296u64]]}),
            json!({"qop": "X", "args": [["q", 4294967296u64]]}),
        ] {
            let result = load_program(&with_decls(vec![entry.clone()]), None);
            assert!(
                matches!(result, Err(HyqeError::MalformedProgram(_))),
                "entry {} gave {:?}",
                entry,
                result
            );
        }
    }

    #[test]
    fn test_unknown_operator() {
        let result = load_program(
            &with_decls(vec![json!({"cop": "**", "args": ["m", 2], "returns": ["m"]})]),
            None,
        );
        assert_eq!(result, Err(HyqeError::UnknownOperator("**".into())));
    }
}
