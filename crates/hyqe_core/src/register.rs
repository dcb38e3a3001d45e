//! Classical register values for HYQE
//!
//! Gantree: L0_Foundation → RegisterValue
//!
//! Fixed-width, bit-addressable integer values. Every write is masked to the
//! declared width. A signed register reads back as the two's complement of
//! its declared width, so a 4-bit signed register spans -8..=7.

use crate::error::{HyqeError, HyqeResult};
use crate::operator::ClassicalOperator;
use crate::types::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Live value of a classical register
/// Gantree: RegisterValue // 고정 폭 정수
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterValue {
    /// Element type
    dtype: DataType,

    /// Declared width in bits (1..=dtype.bits())
    /// Gantree: width: u32 // 선언 폭
    width: u32,

    /// Low `width` bits of the value; higher bits always zero
    raw: u64,
}

impl RegisterValue {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a zero value of the given type and width
    /// Gantree: new(dtype, width) -> Result<Self> // 생성+검증
    pub fn new(dtype: DataType, width: u32) -> HyqeResult<Self> {
        if width == 0 || width > dtype.bits() {
            return Err(HyqeError::InvalidWidth {
                width,
                max: dtype.bits(),
            });
        }
        Ok(Self {
            dtype,
            width,
            raw: 0,
        })
    }

    /// Create with an initial value (masked to width)
    pub fn with_value(dtype: DataType, width: u32, value: i64) -> HyqeResult<Self> {
        let mut reg = Self::new(dtype, width)?;
        reg.set(value);
        Ok(reg)
    }

    /// Unsigned register of the given width
    pub fn unsigned(width: u32) -> HyqeResult<Self> {
        Self::new(DataType::U64, width)
    }

    /// Signed register of the given width
    pub fn signed(width: u32) -> HyqeResult<Self> {
        Self::new(DataType::I64, width)
    }

    /// Single-bit truth value
    pub fn bit(value: bool) -> Self {
        Self {
            dtype: DataType::U8,
            width: 1,
            raw: value as u64,
        }
    }

    /// Full-width value of `dtype`
    pub fn literal(dtype: DataType, value: i64) -> Self {
        let mut reg = Self {
            dtype,
            width: dtype.bits(),
            raw: 0,
        };
        reg.set(value);
        reg
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Element type
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// Declared width in bits
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raw masked bits
    pub fn as_u64(&self) -> u64 {
        self.raw
    }

    /// Integer value (sign-extended from the top declared bit when signed)
    ///
    /// A 64-bit unsigned value above `i64::MAX` is returned reinterpreted.
    /// Gantree: as_int(&self) -> i64 // 정수값
    pub fn as_int(&self) -> i64 {
        if self.is_negative() {
            (self.raw | !self.mask()) as i64
        } else {
            self.raw as i64
        }
    }

    /// Check if nonzero
    pub fn is_truthy(&self) -> bool {
        self.raw != 0
    }

    /// Bits as a string, most significant bit first
    pub fn to_bitstring(&self) -> String {
        (0..self.width)
            .rev()
            .map(|i| if (self.raw >> i) & 1 == 1 { '1' } else { '0' })
            .collect()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Assign a value, masking to width
    /// Gantree: set(&mut, v) // 폭 마스킹
    pub fn set(&mut self, value: i64) {
        self.raw = (value as u64) & self.mask();
    }

    /// Read one bit
    pub fn get_bit(&self, index: u32) -> HyqeResult<bool> {
        self.check_bit(index)?;
        Ok((self.raw >> index) & 1 == 1)
    }

    /// Write one bit
    /// Gantree: set_bit(&mut, i, b) // 비트 설정
    pub fn set_bit(&mut self, index: u32, value: bool) -> HyqeResult<()> {
        self.check_bit(index)?;
        if value {
            self.raw |= 1 << index;
        } else {
            self.raw &= !(1 << index);
        }
        Ok(())
    }

    /// Reinterpret the integer value under another type and width
    pub fn resize(&self, dtype: DataType, width: u32) -> HyqeResult<Self> {
        let mut reg = Self::new(dtype, width)?;
        reg.set_wide(self.as_wide());
        Ok(reg)
    }

    // ========================================================================
    // Operators
    // ========================================================================

    /// Apply a binary operator; both operands must share a width
    /// Gantree: apply(op, rhs) -> Result<Self> // 이항 연산
    pub fn apply(&self, op: ClassicalOperator, rhs: &Self) -> HyqeResult<Self> {
        self.check_width(rhs)?;
        let (a, b) = (self.as_wide(), rhs.as_wide());

        let result = match op {
            ClassicalOperator::And => self.with_raw(self.raw & rhs.raw),
            ClassicalOperator::Or => self.with_raw(self.raw | rhs.raw),
            ClassicalOperator::Xor => self.with_raw(self.raw ^ rhs.raw),
            ClassicalOperator::Add => self.with_wide(a.wrapping_add(b)),
            ClassicalOperator::Sub => self.with_wide(a.wrapping_sub(b)),
            ClassicalOperator::Mul => self.with_wide(a.wrapping_mul(b)),
            ClassicalOperator::Div => self.with_wide(floor_div(a, b)?),
            ClassicalOperator::Rem => self.with_wide(a - b * floor_div(a, b)?),
            ClassicalOperator::Shl => {
                let shift = shift_amount(b)?;
                if shift >= 64 {
                    self.with_raw(0)
                } else {
                    self.with_raw(self.raw << shift)
                }
            }
            ClassicalOperator::Shr => self.with_wide(a >> shift_amount(b)?.min(127)),
            ClassicalOperator::Eq => Self::bit(a == b),
            ClassicalOperator::Ne => Self::bit(a != b),
            ClassicalOperator::Lt => Self::bit(a < b),
            ClassicalOperator::Gt => Self::bit(a > b),
            ClassicalOperator::Le => Self::bit(a <= b),
            ClassicalOperator::Ge => Self::bit(a >= b),
            ClassicalOperator::Not => {
                return Err(HyqeError::UnknownOperator(format!(
                    "'{}' takes one operand",
                    op
                )))
            }
        };
        Ok(result)
    }

    /// Apply a unary operator (`~` or `-`)
    pub fn apply_unary(&self, op: ClassicalOperator) -> HyqeResult<Self> {
        match op {
            ClassicalOperator::Not => Ok(self.with_raw(!self.raw)),
            ClassicalOperator::Sub => Ok(self.with_wide(self.as_wide().wrapping_neg())),
            _ => Err(HyqeError::UnknownOperator(format!(
                "'{}' takes two operands",
                op
            ))),
        }
    }

    /// `self & rhs`
    pub fn bitand(&self, rhs: &Self) -> HyqeResult<Self> {
        self.apply(ClassicalOperator::And, rhs)
    }

    /// `self | rhs`
    pub fn bitor(&self, rhs: &Self) -> HyqeResult<Self> {
        self.apply(ClassicalOperator::Or, rhs)
    }

    /// `self ^ rhs`
    pub fn bitxor(&self, rhs: &Self) -> HyqeResult<Self> {
        self.apply(ClassicalOperator::Xor, rhs)
    }

    /// `~self`
    pub fn not(&self) -> Self {
        self.with_raw(!self.raw)
    }

    /// `self + rhs`
    pub fn add(&self, rhs: &Self) -> HyqeResult<Self> {
        self.apply(ClassicalOperator::Add, rhs)
    }

    /// `self - rhs`
    pub fn sub(&self, rhs: &Self) -> HyqeResult<Self> {
        self.apply(ClassicalOperator::Sub, rhs)
    }

    /// `self * rhs`
    pub fn mul(&self, rhs: &Self) -> HyqeResult<Self> {
        self.apply(ClassicalOperator::Mul, rhs)
    }

    /// `self // rhs`
    pub fn floordiv(&self, rhs: &Self) -> HyqeResult<Self> {
        self.apply(ClassicalOperator::Div, rhs)
    }

    /// `self % rhs`
    pub fn rem(&self, rhs: &Self) -> HyqeResult<Self> {
        self.apply(ClassicalOperator::Rem, rhs)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn mask(&self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    fn is_negative(&self) -> bool {
        self.dtype.is_signed() && (self.raw >> (self.width - 1)) & 1 == 1
    }

    fn as_wide(&self) -> i128 {
        if self.dtype.is_signed() {
            self.as_int() as i128
        } else {
            self.raw as i128
        }
    }

    fn set_wide(&mut self, value: i128) {
        self.raw = (value as u64) & self.mask();
    }

    fn with_raw(&self, raw: u64) -> Self {
        Self {
            raw: raw & self.mask(),
            ..*self
        }
    }

    fn with_wide(&self, value: i128) -> Self {
        let mut reg = *self;
        reg.set_wide(value);
        reg
    }

    fn check_width(&self, rhs: &Self) -> HyqeResult<()> {
        if self.width != rhs.width {
            return Err(HyqeError::WidthMismatch {
                expected: self.width,
                found: rhs.width,
            });
        }
        Ok(())
    }

    fn check_bit(&self, index: u32) -> HyqeResult<()> {
        if index >= self.width {
            return Err(HyqeError::BitOutOfRange {
                bit: index,
                width: self.width,
            });
        }
        Ok(())
    }
}

/// Floor division (rounds toward negative infinity)
fn floor_div(a: i128, b: i128) -> HyqeResult<i128> {
    if b == 0 {
        return Err(HyqeError::DivisionByZero);
    }
    let q = a.wrapping_div(b);
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn shift_amount(b: i128) -> HyqeResult<u32> {
    if b < 0 {
        return Err(HyqeError::NegativeShift(b as i64));
    }
    Ok(b.min(u32::MAX as i128) as u32)
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_int())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_width() {
        assert!(RegisterValue::new(DataType::U8, 8).is_ok());
        assert!(RegisterValue::new(DataType::U8, 9).is_err());
        assert!(RegisterValue::new(DataType::I64, 0).is_err());
    }

    #[test]
    fn test_unsigned_width_masking() {
        for width in [1u32, 3, 8, 17, 63] {
            let modulus = 1i128 << width;
            for v in [-5i64, -1, 0, 1, 7, 255, 1 << 20, i64::MAX] {
                let mut reg = RegisterValue::unsigned(width).unwrap();
                reg.set(v);
                let expected = (v as i128).rem_euclid(modulus) as i64;
                assert_eq!(reg.as_int(), expected, "width={} v={}", width, v);
            }
        }
    }

    #[test]
    fn test_unsigned_full_width() {
        let mut reg = RegisterValue::unsigned(64).unwrap();
        reg.set(-1);
        assert_eq!(reg.as_u64(), u64::MAX);
    }

    #[test]
    fn test_signed_wraparound() {
        let mut reg = RegisterValue::new(DataType::I8, 8).unwrap();
        reg.set(127);
        assert_eq!(reg.as_int(), 127);
        reg.set(128);
        assert_eq!(reg.as_int(), -128);
        reg.set(-1);
        assert_eq!(reg.as_int(), -1);
        assert_eq!(reg.as_u64(), 0xFF);
        reg.set(257);
        assert_eq!(reg.as_int(), 1);
    }

    #[test]
    fn test_narrow_signed_wraps_at_declared_width() {
        let mut reg = RegisterValue::signed(4).unwrap();
        reg.set(-1);
        assert_eq!(reg.as_int(), -1);
        assert_eq!(reg.as_u64(), 0b1111);
        reg.set(8);
        assert_eq!(reg.as_int(), -8);
        reg.set(7);
        assert_eq!(reg.as_int(), 7);
        reg.set(-3);
        assert_eq!(reg.to_bitstring(), "1101");

        // arithmetic wraps in the narrow width too
        let sum = RegisterValue::with_value(DataType::I64, 4, 7)
            .unwrap()
            .add(&RegisterValue::with_value(DataType::I64, 4, 1).unwrap())
            .unwrap();
        assert_eq!(sum.as_int(), -8);
        let lt = RegisterValue::with_value(DataType::I64, 4, -3)
            .unwrap()
            .apply(ClassicalOperator::Lt, &RegisterValue::signed(4).unwrap())
            .unwrap();
        assert!(lt.is_truthy());

        let mut flag = RegisterValue::signed(1).unwrap();
        flag.set(1);
        assert_eq!(flag.as_int(), -1);
    }

    #[test]
    fn test_bits() {
        let mut reg = RegisterValue::unsigned(4).unwrap();
        reg.set_bit(0, true).unwrap();
        reg.set_bit(2, true).unwrap();
        assert_eq!(reg.as_int(), 5);
        assert!(reg.get_bit(2).unwrap());
        assert!(!reg.get_bit(1).unwrap());

        reg.set_bit(0, false).unwrap();
        assert_eq!(reg.as_int(), 4);

        assert!(matches!(
            reg.get_bit(4),
            Err(HyqeError::BitOutOfRange { bit: 4, width: 4 })
        ));
    }

    #[test]
    fn test_bitstring() {
        let reg = RegisterValue::with_value(DataType::U8, 4, 0b0110).unwrap();
        assert_eq!(reg.to_bitstring(), "0110");
        assert_eq!(RegisterValue::bit(true).to_bitstring(), "1");
    }

    #[test]
    fn test_arithmetic_wraps() {
        let a = RegisterValue::with_value(DataType::U8, 3, 6).unwrap();
        let b = RegisterValue::with_value(DataType::U8, 3, 3).unwrap();
        assert_eq!(a.add(&b).unwrap().as_int(), 1); // 9 mod 8
        assert_eq!(b.sub(&a).unwrap().as_int(), 5); // -3 mod 8
        assert_eq!(a.mul(&b).unwrap().as_int(), 2); // 18 mod 8
    }

    #[test]
    fn test_floor_division_and_modulo() {
        let a = RegisterValue::literal(DataType::I64, -7);
        let b = RegisterValue::literal(DataType::I64, 2);
        assert_eq!(a.floordiv(&b).unwrap().as_int(), -4);
        assert_eq!(a.rem(&b).unwrap().as_int(), 1);

        let zero = RegisterValue::literal(DataType::I64, 0);
        assert_eq!(a.floordiv(&zero), Err(HyqeError::DivisionByZero));
    }

    #[test]
    fn test_bitwise() {
        let a = RegisterValue::with_value(DataType::U8, 4, 0b1100).unwrap();
        let b = RegisterValue::with_value(DataType::U8, 4, 0b1010).unwrap();
        assert_eq!(a.bitand(&b).unwrap().as_int(), 0b1000);
        assert_eq!(a.bitor(&b).unwrap().as_int(), 0b1110);
        assert_eq!(a.bitxor(&b).unwrap().as_int(), 0b0110);
        assert_eq!(a.not().as_int(), 0b0011);
    }

    #[test]
    fn test_shifts() {
        let a = RegisterValue::with_value(DataType::U8, 4, 0b0011).unwrap();
        let two = RegisterValue::with_value(DataType::U8, 4, 2).unwrap();
        assert_eq!(a.apply(ClassicalOperator::Shl, &two).unwrap().as_int(), 0b1100);

        let neg = RegisterValue::literal(DataType::I64, -8);
        let one = RegisterValue::literal(DataType::I64, 1);
        assert_eq!(neg.apply(ClassicalOperator::Shr, &one).unwrap().as_int(), -4);
    }

    #[test]
    fn test_comparisons_return_single_bit() {
        let a = RegisterValue::literal(DataType::I64, 3);
        let b = RegisterValue::literal(DataType::I64, 5);

        let lt = a.apply(ClassicalOperator::Lt, &b).unwrap();
        assert_eq!(lt.width(), 1);
        assert_eq!(lt.as_int(), 1);
        assert_eq!(a.apply(ClassicalOperator::Ge, &b).unwrap().as_int(), 0);
        assert_eq!(a.apply(ClassicalOperator::Ne, &b).unwrap().as_int(), 1);
    }

    #[test]
    fn test_width_mismatch() {
        let a = RegisterValue::unsigned(4).unwrap();
        let b = RegisterValue::unsigned(8).unwrap();
        assert_eq!(
            a.add(&b),
            Err(HyqeError::WidthMismatch {
                expected: 4,
                found: 8
            })
        );
    }

    #[test]
    fn test_unary() {
        let a = RegisterValue::literal(DataType::I64, 5);
        assert_eq!(
            a.apply_unary(ClassicalOperator::Sub).unwrap().as_int(),
            -5
        );
        assert_eq!(a.apply_unary(ClassicalOperator::Not).unwrap().as_int(), !5);
        assert!(a.apply_unary(ClassicalOperator::Add).is_err());
    }

    #[test]
    fn test_resize() {
        let wide = RegisterValue::literal(DataType::I64, -1);
        let narrow = wide.resize(DataType::U8, 3).unwrap();
        assert_eq!(narrow.as_int(), 7);
    }
}
