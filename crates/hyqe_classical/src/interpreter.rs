//! Classical interpreter
//!
//! Gantree: L3_Classical → ClassicalInterpreter
//!
//! Evaluates expressions against the shot environment, writes assignments,
//! folds measurement results back and marshals foreign calls.

use crate::environment::ShotEnvironment;
use crate::execution::Execution;
use hyqe_core::{DataType, HyqeError, HyqeResult, RegisterValue};
use hyqe_ir::{BitRef, COp, Expr, ForeignCall, ForeignObject, LoadedProgram, Op, Target};
use std::collections::BTreeMap;

/// Measurement results to fold back: result bit → outcome
pub type MeasurementResults = BTreeMap<BitRef, u8>;

/// Classical interpreter for one shot at a time
/// Gantree: ClassicalInterpreter // 고전 해석기
pub struct ClassicalInterpreter {
    /// Live classical state
    env: ShotEnvironment,

    /// Foreign object collaborator
    foreign: Option<Box<dyn ForeignObject>>,

    /// Type every expression is evaluated in
    expression_type: DataType,
}

impl ClassicalInterpreter {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create for a loaded program
    pub fn new(program: &LoadedProgram) -> HyqeResult<Self> {
        Ok(Self {
            env: ShotEnvironment::from_program(program)?,
            foreign: None,
            expression_type: DataType::I64,
        })
    }

    /// Attach a foreign object
    pub fn with_foreign(mut self, foreign: Box<dyn ForeignObject>) -> Self {
        self.foreign = Some(foreign);
        self
    }

    /// Set the expression evaluation type
    pub fn with_expression_type(mut self, dtype: DataType) -> Self {
        self.expression_type = dtype;
        self
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Reinitialize every register to zero
    /// Gantree: reset(&mut) // 샷마다 호출
    pub fn reset(&mut self) {
        self.env.reset();
    }

    /// Shot environment
    pub fn env(&self) -> &ShotEnvironment {
        &self.env
    }

    /// Mutable shot environment
    pub fn env_mut(&mut self) -> &mut ShotEnvironment {
        &mut self.env
    }

    /// Foreign object, if configured
    pub fn foreign_mut(&mut self) -> Option<&mut (dyn ForeignObject + 'static)> {
        self.foreign.as_deref_mut()
    }

    /// Expression evaluation type
    pub fn expression_type(&self) -> DataType {
        self.expression_type
    }

    /// Walk an op list, yielding op buffers lazily
    /// Gantree: execute(ops) -> Execution // pull 기반 반복자
    pub fn execute<'a>(&'a mut self, ops: &'a [Op]) -> Execution<'a> {
        Execution::new(self, ops)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Evaluate an expression in the expression type
    /// Gantree: eval_expr(expr) -> Result<CRV> // 재귀 평가
    pub fn eval_expr(&self, expr: &Expr) -> HyqeResult<RegisterValue> {
        let dtype = self.expression_type;
        match expr {
            Expr::Literal(v) => Ok(RegisterValue::literal(dtype, *v)),
            Expr::Register(name) => Ok(RegisterValue::literal(dtype, self.env.value(name)?)),
            Expr::Bit(bit) => {
                let set = self.env.bit(&bit.register, bit.index)?;
                Ok(RegisterValue::literal(dtype, set as i64))
            }
            Expr::Op { op, args } => {
                let result = match args.as_slice() {
                    [arg] => self.eval_expr(arg)?.apply_unary(*op)?,
                    [lhs, rhs] if op.is_comparison() => self
                        .comparison_operand(lhs, rhs)?
                        .apply(*op, &self.comparison_operand(rhs, lhs)?)?,
                    [lhs, rhs] => self.eval_expr(lhs)?.apply(*op, &self.eval_expr(rhs)?)?,
                    _ => {
                        return Err(HyqeError::UnknownOperator(format!(
                            "'{}' with {} operands",
                            op,
                            args.len()
                        )))
                    }
                };
                // comparisons yield one bit; widen back for the enclosing expression
                result.resize(dtype, dtype.bits())
            }
        }
    }

    /// A literal compared against a register is read at that register's
    /// type and width, so `flag == 1` holds for a set 1-bit signed flag.
    fn comparison_operand(&self, expr: &Expr, other: &Expr) -> HyqeResult<RegisterValue> {
        match (expr, other) {
            (Expr::Literal(v), Expr::Register(name)) => {
                let reg = self.env.get(name)?;
                let wrapped = RegisterValue::with_value(reg.dtype(), reg.width(), *v)?;
                Ok(RegisterValue::literal(self.expression_type, wrapped.as_int()))
            }
            _ => self.eval_expr(expr),
        }
    }

    /// Evaluate to a plain integer
    pub fn eval_int(&self, expr: &Expr) -> HyqeResult<i64> {
        self.eval_expr(expr).map(|v| v.as_int())
    }

    /// Write a value to a whole register or one bit
    /// Gantree: assign(target, value) // 폭 마스킹
    pub fn assign(&mut self, target: &Target, value: i64) -> HyqeResult<()> {
        match target {
            Target::Register(name) => self.env.set(name, value),
            Target::Bit(bit) => self.env.set_bit(&bit.register, bit.index, value & 1 == 1),
        }
    }

    /// Fold measurement outcomes into the environment
    /// Gantree: receive_results(results) // 멱등 대입
    pub fn receive_results(&mut self, results: &MeasurementResults) -> HyqeResult<()> {
        for (bit, outcome) in results {
            self.assign(&Target::Bit(bit.clone()), *outcome as i64)?;
        }
        Ok(())
    }

    // ========================================================================
    // Classical / Foreign Ops
    // ========================================================================

    /// Run a classical op against the environment
    pub fn execute_cop(&mut self, cop: &COp) -> HyqeResult<()> {
        match cop {
            COp::Assign { values, targets } => {
                // evaluate every value before writing any target
                let values = values
                    .iter()
                    .map(|v| self.eval_int(v))
                    .collect::<HyqeResult<Vec<_>>>()?;
                for (target, value) in targets.iter().zip(values) {
                    self.assign(target, value)?;
                }
                Ok(())
            }
            COp::Compute { expr, target } => {
                let value = self.eval_int(expr)?;
                self.assign(target, value)
            }
            COp::Result { sources, names } => {
                for (source, name) in sources.iter().zip(names) {
                    self.env.add_export(source, name);
                }
                Ok(())
            }
        }
    }

    /// Marshal arguments, invoke the foreign object and assign results
    /// Gantree: handle_foreign_call(call) // 외부 호출
    pub fn handle_foreign_call(&mut self, call: &ForeignCall) -> HyqeResult<()> {
        let args = call
            .args
            .iter()
            .map(|a| self.eval_int(a))
            .collect::<HyqeResult<Vec<_>>>()?;

        let foreign = self
            .foreign
            .as_deref_mut()
            .ok_or_else(|| HyqeError::MissingForeignObject(call.function.clone()))?;

        log::debug!("foreign call {}({:?})", call.function, args);
        let values = foreign
            .exec(&call.function, &args, call.namespace.as_deref())?
            .into_values();

        if call.returns.is_empty() {
            return Ok(());
        }
        if values.len() != call.returns.len() {
            return Err(HyqeError::ForeignRuntimeError {
                function: call.function.clone(),
                message: format!(
                    "returned {} value(s) for {} target(s)",
                    values.len(),
                    call.returns.len()
                ),
            });
        }
        for (target, value) in call.returns.iter().zip(values) {
            self.assign(target, value)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClassicalInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassicalInterpreter")
            .field("env", &self.env)
            .field("foreign", &self.foreign.is_some())
            .field("expression_type", &self.expression_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyqe_core::ClassicalOperator;
    use hyqe_ir::{ForeignValue, FunctionTable};
    use serde_json::json;

    fn program() -> LoadedProgram {
        LoadedProgram::from_value(
            &json!({
                "ops": [
                    {"data": "cvar_define", "data_type": "i64", "variable": "a", "size": 4},
                    {"data": "cvar_define", "data_type": "u8", "variable": "m", "size": 2},
                    {"data": "cvar_define", "data_type": "i64", "variable": "s", "size": 8}
                ]
            }),
            None,
        )
        .unwrap()
    }

    fn interpreter() -> ClassicalInterpreter {
        ClassicalInterpreter::new(&program()).unwrap()
    }

    #[test]
    fn test_eval_literals_and_refs() {
        let mut interp = interpreter();
        interp.env_mut().set("a", 5).unwrap();

        assert_eq!(interp.eval_int(&Expr::Literal(7)).unwrap(), 7);
        assert_eq!(interp.eval_int(&Expr::register("a")).unwrap(), 5);
        assert_eq!(interp.eval_int(&Expr::bit("a", 2)).unwrap(), 1);
        assert_eq!(interp.eval_int(&Expr::bit("a", 1)).unwrap(), 0);
    }

    #[test]
    fn test_eval_nested() {
        let mut interp = interpreter();
        interp.env_mut().set("a", 6).unwrap();

        // (a + 2) * 3 == 24
        let expr = Expr::binary(
            ClassicalOperator::Eq,
            Expr::binary(
                ClassicalOperator::Mul,
                Expr::binary(ClassicalOperator::Add, Expr::register("a"), Expr::Literal(2)),
                Expr::Literal(3),
            ),
            Expr::Literal(24),
        );
        assert_eq!(interp.eval_int(&expr).unwrap(), 1);

        // comparison result used arithmetically
        let expr = Expr::binary(
            ClassicalOperator::Add,
            Expr::binary(ClassicalOperator::Gt, Expr::register("a"), Expr::Literal(1)),
            Expr::Literal(10),
        );
        assert_eq!(interp.eval_int(&expr).unwrap(), 11);
    }

    #[test]
    fn test_unary_by_arity() {
        let interp = interpreter();
        let not = Expr::unary(ClassicalOperator::Not, Expr::Literal(0));
        assert_eq!(interp.eval_int(&not).unwrap(), -1);
        let neg = Expr::unary(ClassicalOperator::Sub, Expr::Literal(4));
        assert_eq!(interp.eval_int(&neg).unwrap(), -4);
    }

    #[test]
    fn test_eval_errors() {
        let interp = interpreter();
        assert_eq!(
            interp.eval_int(&Expr::register("nope")),
            Err(HyqeError::UnknownRegister("nope".into()))
        );
        let div = Expr::binary(ClassicalOperator::Div, Expr::Literal(1), Expr::Literal(0));
        assert_eq!(interp.eval_int(&div), Err(HyqeError::DivisionByZero));

        let bad = Expr::Op {
            op: ClassicalOperator::Add,
            args: vec![],
        };
        assert!(matches!(
            interp.eval_int(&bad),
            Err(HyqeError::UnknownOperator(_))
        ));
    }

    #[test]
    fn test_assign_masks_width() {
        let mut interp = interpreter();
        interp
            .assign(&Target::Register("a".into()), 0b1_0110)
            .unwrap();
        // a is 4 bits wide: 0b0110
        assert_eq!(interp.env().value("a").unwrap(), 6);

        // s is a signed byte: 0xFF reads back as -1
        interp.assign(&Target::Register("s".into()), 0x1FF).unwrap();
        assert_eq!(interp.env().value("s").unwrap(), -1);
    }

    #[test]
    fn test_narrow_signed_register_goes_negative() {
        let mut interp = interpreter();
        interp
            .execute_cop(&COp::Compute {
                expr: Expr::binary(ClassicalOperator::Sub, Expr::Literal(0), Expr::Literal(3)),
                target: Target::Register("a".into()),
            })
            .unwrap();
        assert_eq!(interp.env().value("a").unwrap(), -3);

        let negative = Expr::binary(ClassicalOperator::Lt, Expr::register("a"), Expr::Literal(0));
        assert_eq!(interp.eval_int(&negative).unwrap(), 1);

        // a literal outside the 4-bit range wraps the same way the register does
        interp.env_mut().set("a", 13).unwrap();
        let equal = Expr::binary(ClassicalOperator::Eq, Expr::Literal(13), Expr::register("a"));
        assert_eq!(interp.eval_int(&equal).unwrap(), 1);
        assert_eq!(interp.eval_int(&Expr::register("a")).unwrap(), -3);
    }

    #[test]
    fn test_set_one_bit_flag_equals_one() {
        let mut interp = ClassicalInterpreter::new(
            &LoadedProgram::from_value(
                &json!({"ops": [{"data": "cvar_define", "variable": "f", "size": 1}]}),
                None,
            )
            .unwrap(),
        )
        .unwrap();
        interp.assign(&Target::Bit(BitRef::new("f", 0)), 1).unwrap();
        assert_eq!(interp.env().value("f").unwrap(), -1);

        let set = Expr::binary(ClassicalOperator::Eq, Expr::register("f"), Expr::Literal(1));
        assert_eq!(interp.eval_int(&set).unwrap(), 1);
        let clear = Expr::binary(ClassicalOperator::Eq, Expr::register("f"), Expr::Literal(0));
        assert_eq!(interp.eval_int(&clear).unwrap(), 0);
    }

    #[test]
    fn test_assign_bit() {
        let mut interp = interpreter();
        let target = Target::Bit(BitRef::new("m", 1));
        interp.assign(&target, 1).unwrap();
        assert_eq!(interp.env().value("m").unwrap(), 2);

        // only the low bit lands
        interp.assign(&target, 2).unwrap();
        assert_eq!(interp.env().value("m").unwrap(), 0);
        interp.assign(&target, 3).unwrap();
        assert_eq!(interp.env().value("m").unwrap(), 2);
        interp.assign(&Target::Bit(BitRef::new("m", 0)), -1).unwrap();
        assert_eq!(interp.env().value("m").unwrap(), 3);
        assert!(matches!(
            interp.assign(&Target::Bit(BitRef::new("m", 2)), 1),
            Err(HyqeError::BitOutOfRange { .. })
        ));
    }

    #[test]
    fn test_receive_results_idempotent() {
        let mut interp = interpreter();
        let mut results = MeasurementResults::new();
        results.insert(BitRef::new("m", 0), 1);
        results.insert(BitRef::new("m", 1), 0);

        interp.receive_results(&results).unwrap();
        let once = interp.env().clone();
        interp.receive_results(&results).unwrap();
        assert_eq!(interp.env(), &once);
        assert_eq!(interp.env().value("m").unwrap(), 1);
    }

    #[test]
    fn test_execute_cop_assign_and_compute() {
        let mut interp = interpreter();
        interp
            .execute_cop(&COp::Assign {
                values: vec![Expr::Literal(3), Expr::Literal(1)],
                targets: vec![
                    Target::Register("a".into()),
                    Target::Bit(BitRef::new("m", 0)),
                ],
            })
            .unwrap();
        interp
            .execute_cop(&COp::Compute {
                expr: Expr::binary(ClassicalOperator::Shl, Expr::register("a"), Expr::Literal(1)),
                target: Target::Register("s".into()),
            })
            .unwrap();

        assert_eq!(interp.env().value("a").unwrap(), 3);
        assert_eq!(interp.env().value("m").unwrap(), 1);
        assert_eq!(interp.env().value("s").unwrap(), 6);
    }

    #[test]
    fn test_result_cop_records_export() {
        let mut interp = interpreter();
        interp
            .execute_cop(&COp::Result {
                sources: vec!["m".into()],
                names: vec!["c".into()],
            })
            .unwrap();
        assert_eq!(interp.env().exports()[0].name, "c");
    }

    #[test]
    fn test_foreign_call() {
        let table = FunctionTable::new()
            .with_function("add", |a| Ok(ForeignValue::Int(a[0] + a[1])))
            .with_function("pair", |_| Ok(ForeignValue::Seq(vec![1, 0])));
        let mut interp = interpreter().with_foreign(Box::new(table));
        interp.env_mut().set("a", 4).unwrap();

        interp
            .handle_foreign_call(&ForeignCall {
                function: "add".into(),
                namespace: None,
                args: vec![Expr::register("a"), Expr::Literal(3)],
                returns: vec![Target::Register("s".into())],
            })
            .unwrap();
        assert_eq!(interp.env().value("s").unwrap(), 7);

        interp
            .handle_foreign_call(&ForeignCall {
                function: "pair".into(),
                namespace: None,
                args: vec![],
                returns: vec![
                    Target::Bit(BitRef::new("m", 0)),
                    Target::Bit(BitRef::new("m", 1)),
                ],
            })
            .unwrap();
        assert_eq!(interp.env().value("m").unwrap(), 1);

        let mismatch = interp.handle_foreign_call(&ForeignCall {
            function: "pair".into(),
            namespace: None,
            args: vec![],
            returns: vec![Target::Register("s".into())],
        });
        assert!(matches!(
            mismatch,
            Err(HyqeError::ForeignRuntimeError { .. })
        ));
    }

    #[test]
    fn test_foreign_call_into_bit_keeps_low_bit() {
        let table = FunctionTable::new()
            .with_function("two", |_| Ok(ForeignValue::Int(2)))
            .with_function("three", |_| Ok(ForeignValue::Int(3)));
        let mut interp = interpreter().with_foreign(Box::new(table));
        let call = |function: &str, index: u32| ForeignCall {
            function: function.into(),
            namespace: None,
            args: vec![],
            returns: vec![Target::Bit(BitRef::new("m", index))],
        };

        interp.handle_foreign_call(&call("three", 1)).unwrap();
        assert_eq!(interp.env().value("m").unwrap(), 2);
        interp.handle_foreign_call(&call("two", 1)).unwrap();
        assert_eq!(interp.env().value("m").unwrap(), 0);
    }

    #[test]
    fn test_missing_foreign_object() {
        let mut interp = interpreter();
        let result = interp.handle_foreign_call(&ForeignCall {
            function: "f".into(),
            namespace: None,
            args: vec![],
            returns: vec![],
        });
        assert_eq!(result, Err(HyqeError::MissingForeignObject("f".into())));
    }
}
