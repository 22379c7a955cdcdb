//! Value coercions. All conversions are total: they never fail.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LEADING_NUMERIC: Regex =
        Regex::new(r"^[ \t\n\r]*([+-]?(?:\d+(?:\.\d*)?(?:[eE][+-]?\d+)?|\.\d+(?:[eE][+-]?\d+)?))")
            .unwrap();
    static ref FULL_NUMERIC: Regex = Regex::new(
        r"^[ \t\n\r]*[+-]?(?:\d+(?:\.\d*)?(?:[eE][+-]?\d+)?|\.\d+(?:[eE][+-]?\d+)?)[ \t\n\r]*$"
    )
    .unwrap();
}

/// Parse the leading numeric prefix of a string, PHP-style.
/// Returns 0.0 when the string has no numeric prefix.
pub fn leading_numeric(s: &str) -> f64 {
    LEADING_NUMERIC
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// True when the whole string (modulo surrounding whitespace) is numeric.
pub fn is_numeric_string(s: &str) -> bool {
    FULL_NUMERIC.is_match(s)
}

impl super::Value {
    pub fn to_bool(&self) -> bool {
        match self {
            super::Value::Null | super::Value::Undef => false,
            super::Value::Bool(b) => *b,
            super::Value::Integer(n) => *n != 0,
            super::Value::Float(n) => *n != 0.0,
            super::Value::String(s) => !s.is_empty() && s != "0",
            super::Value::Array(arr) => !arr.is_empty(),
            super::Value::Object(_) => true,
            super::Value::Resource(_) => true,
        }
    }

    pub fn to_int(&self) -> i64 {
        match self {
            super::Value::Null | super::Value::Undef => 0,
            super::Value::Bool(b) => {
                if *b {
                    1
                } else {
                    0
                }
            }
            super::Value::Integer(n) => *n,
            super::Value::Float(n) => *n as i64,
            super::Value::String(s) => leading_numeric(s) as i64,
            super::Value::Array(arr) => {
                if arr.is_empty() {
                    0
                } else {
                    1
                }
            }
            super::Value::Object(_) => 1,
            super::Value::Resource(res) => res.borrow().id as i64,
        }
    }

    pub fn to_float(&self) -> f64 {
        match self {
            super::Value::Null | super::Value::Undef => 0.0,
            super::Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            super::Value::Integer(n) => *n as f64,
            super::Value::Float(n) => *n,
            super::Value::String(s) => leading_numeric(s),
            super::Value::Array(arr) => {
                if arr.is_empty() {
                    0.0
                } else {
                    1.0
                }
            }
            super::Value::Object(_) => 1.0,
            super::Value::Resource(res) => res.borrow().id as f64,
        }
    }

    pub fn to_string_val(&self) -> String {
        match self {
            super::Value::Null | super::Value::Undef => String::new(),
            super::Value::Bool(b) => {
                if *b {
                    "1".to_string()
                } else {
                    String::new()
                }
            }
            super::Value::Integer(n) => n.to_string(),
            super::Value::Float(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    n.to_string()
                }
            }
            super::Value::String(s) => s.clone(),
            super::Value::Array(_) => "Array".to_string(),
            super::Value::Object(obj) => format!("Object({})", obj.borrow().class_name),
            super::Value::Resource(res) => format!("Resource id #{}", res.borrow().id),
        }
    }
}
