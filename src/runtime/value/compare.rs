//! Loose equality, strict identity, and ordered comparison.

use super::coerce::is_numeric_string;
use super::Value;

impl Value {
    /// Loose equality (`==`).
    ///
    /// Numeric pairs compare as floats. String pairs compare by bytes.
    /// A numeric/string pair compares numerically when the string is
    /// numeric, otherwise as strings.
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null | Value::Undef, Value::Null | Value::Undef) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(_) | Value::Float(_), Value::String(s)) => {
                if is_numeric_string(s) {
                    self.to_float() == other.to_float()
                } else {
                    self.to_string_val() == *s
                }
            }
            (Value::String(s), Value::Integer(_) | Value::Float(_)) => {
                if is_numeric_string(s) {
                    self.to_float() == other.to_float()
                } else {
                    *s == other.to_string_val()
                }
            }
            (Value::Array(a), Value::Array(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                a.iter().all(|(k, v)| match b.get(k) {
                    Some(bv) => v.loose_equals(bv),
                    None => false,
                })
            }
            (Value::Object(a), Value::Object(b)) => {
                if std::rc::Rc::ptr_eq(a, b) {
                    return true;
                }
                let a = a.borrow();
                let b = b.borrow();
                a.class_name == b.class_name
                    && a.properties.len() == b.properties.len()
                    && a.properties.iter().all(|(name, slot)| {
                        b.get_property(name)
                            .map(|other| slot.value.loose_equals(&other.value))
                            .unwrap_or(false)
                    })
            }
            (Value::Resource(a), Value::Resource(b)) => a.borrow().id == b.borrow().id,
            _ => self.to_bool() == other.to_bool(),
        }
    }

    /// Strict identity (`===`): same kind and same payload. Arrays must
    /// agree on key order; objects must be the same instance.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Undef, Value::Undef) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va.identical(vb))
            }
            (Value::Object(a), Value::Object(b)) => a.borrow().id == b.borrow().id,
            (Value::Resource(a), Value::Resource(b)) => a.borrow().id == b.borrow().id,
            _ => false,
        }
    }

    /// Ordered comparison returning -1, 0 or 1.
    ///
    /// Numeric operands (or a numeric operand against a string) compare
    /// numerically; two strings compare numerically only when both are
    /// numeric, otherwise by bytes.
    pub fn compare(&self, other: &Value) -> i64 {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b) as i64,
            (Value::String(a), Value::String(b)) => {
                if is_numeric_string(a) && is_numeric_string(b) {
                    float_cmp(self.to_float(), other.to_float())
                } else {
                    a.cmp(b) as i64
                }
            }
            (Value::Bool(_), _) | (_, Value::Bool(_)) => {
                (self.to_bool() as i64).cmp(&(other.to_bool() as i64)) as i64
            }
            (Value::Integer(_) | Value::Float(_), _) | (_, Value::Integer(_) | Value::Float(_)) => {
                float_cmp(self.to_float(), other.to_float())
            }
            (Value::Array(a), Value::Array(b)) => {
                let by_len = a.len().cmp(&b.len()) as i64;
                if by_len != 0 {
                    by_len
                } else if self.loose_equals(other) {
                    0
                } else {
                    1
                }
            }
            _ => float_cmp(self.to_float(), other.to_float()),
        }
    }
}

fn float_cmp(a: f64, b: f64) -> i64 {
    if a < b {
        -1
    } else if a > b {
        1
    } else {
        0
    }
}
