//! Shared value arithmetic.
//!
//! These are used both by the plain arithmetic handlers and by the
//! compound-assignment opcodes, which carry the operator kind in the
//! instruction's extended value.

use std::rc::Rc;

use crate::runtime::Value;
use crate::vm::error::VmError;
use crate::vm::opcode::AssignOpKind;

pub fn add_values(left: &Value, right: &Value) -> Result<Value, VmError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(match a.checked_add(*b) {
            Some(sum) => Value::Integer(sum),
            None => Value::Float(*a as f64 + *b as f64),
        }),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
        (Value::Integer(a), Value::Float(b)) => Ok(Value::Float(*a as f64 + b)),
        (Value::Float(a), Value::Integer(b)) => Ok(Value::Float(a + *b as f64)),
        // Array + Array is union: left operand's entries win.
        (Value::Array(a), Value::Array(b)) => {
            let mut result = Rc::clone(a);
            let merged = Rc::make_mut(&mut result);
            for (k, v) in b.iter() {
                if !merged.has_key(k) {
                    merged.set(k.clone(), v.clone());
                }
            }
            Ok(Value::Array(result))
        }
        _ => Ok(Value::Float(left.to_float() + right.to_float())),
    }
}

pub fn sub_values(left: &Value, right: &Value) -> Result<Value, VmError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(match a.checked_sub(*b) {
            Some(diff) => Value::Integer(diff),
            None => Value::Float(*a as f64 - *b as f64),
        }),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a - b)),
        (Value::Integer(a), Value::Float(b)) => Ok(Value::Float(*a as f64 - b)),
        (Value::Float(a), Value::Integer(b)) => Ok(Value::Float(a - *b as f64)),
        _ => Ok(Value::Float(left.to_float() - right.to_float())),
    }
}

pub fn mul_values(left: &Value, right: &Value) -> Result<Value, VmError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(match a.checked_mul(*b) {
            Some(product) => Value::Integer(product),
            None => Value::Float(*a as f64 * *b as f64),
        }),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a * b)),
        (Value::Integer(a), Value::Float(b)) => Ok(Value::Float(*a as f64 * b)),
        (Value::Float(a), Value::Integer(b)) => Ok(Value::Float(a * *b as f64)),
        _ => Ok(Value::Float(left.to_float() * right.to_float())),
    }
}

/// Division always produces a Float.
pub fn div_values(left: &Value, right: &Value) -> Result<Value, VmError> {
    let divisor = right.to_float();
    if divisor == 0.0 {
        return Err(VmError::DivisionByZero);
    }
    Ok(Value::Float(left.to_float() / divisor))
}

/// Modulo is integer-only.
pub fn mod_values(left: &Value, right: &Value) -> Result<Value, VmError> {
    let divisor = right.to_int();
    if divisor == 0 {
        return Err(VmError::ModuloByZero);
    }
    Ok(Value::Integer(left.to_int().wrapping_rem(divisor)))
}

/// Int ** Int stays Int when the result has no fractional component and
/// fits; everything else is Float.
pub fn pow_values(left: &Value, right: &Value) -> Result<Value, VmError> {
    let result = left.to_float().powf(right.to_float());
    let both_int = matches!((left, right), (Value::Integer(_), Value::Integer(_)));
    if both_int && result.fract() == 0.0 && result.abs() < i64::MAX as f64 {
        Ok(Value::Integer(result as i64))
    } else {
        Ok(Value::Float(result))
    }
}

pub fn negate_value(value: &Value) -> Value {
    match value {
        Value::Integer(n) => Value::Integer(n.wrapping_neg()),
        Value::Float(f) => Value::Float(-f),
        _ => Value::Integer(-value.to_int()),
    }
}

pub fn concat_values(left: &Value, right: &Value) -> Value {
    let mut s = left.to_string_val();
    s.push_str(&right.to_string_val());
    Value::String(s)
}

/// Shift amounts are taken modulo the 64-bit word width.
pub fn shift_left_values(left: &Value, right: &Value) -> Value {
    Value::Integer(left.to_int() << (right.to_int() & 63))
}

pub fn shift_right_values(left: &Value, right: &Value) -> Value {
    Value::Integer(left.to_int() >> (right.to_int() & 63))
}

/// Apply the compound-assignment operator named by `extended_value`.
pub fn apply_assign_op(
    kind: AssignOpKind,
    current: &Value,
    operand: &Value,
) -> Result<Value, VmError> {
    match kind {
        AssignOpKind::Add => add_values(current, operand),
        AssignOpKind::Sub => sub_values(current, operand),
        AssignOpKind::Mul => mul_values(current, operand),
        AssignOpKind::Div => div_values(current, operand),
        AssignOpKind::Mod => mod_values(current, operand),
        AssignOpKind::ShiftLeft => Ok(shift_left_values(current, operand)),
        AssignOpKind::ShiftRight => Ok(shift_right_values(current, operand)),
        AssignOpKind::Concat => Ok(concat_values(current, operand)),
        AssignOpKind::BwOr => Ok(Value::Integer(current.to_int() | operand.to_int())),
        AssignOpKind::BwAnd => Ok(Value::Integer(current.to_int() & operand.to_int())),
        AssignOpKind::BwXor => Ok(Value::Integer(current.to_int() ^ operand.to_int())),
        AssignOpKind::Pow => pow_values(current, operand),
    }
}

pub fn assign_op_from_extended(extended_value: u32) -> Result<AssignOpKind, VmError> {
    AssignOpKind::try_from(extended_value as u8).map_err(|_| {
        VmError::MalformedInstruction(format!(
            "bad compound assignment operator {}",
            extended_value
        ))
    })
}
