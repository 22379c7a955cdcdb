use std::fmt;
use std::hash::{Hash, Hasher};

/// Normalized array key. String keys that are canonical integer
/// representations become Integer keys; floats truncate toward zero,
/// booleans become 0/1, null becomes the empty string.
#[derive(Debug, Clone)]
pub enum ArrayKey {
    Integer(i64),
    String(String),
}

impl PartialEq for ArrayKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ArrayKey::Integer(a), ArrayKey::Integer(b)) => a == b,
            (ArrayKey::String(a), ArrayKey::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ArrayKey {}

impl Hash for ArrayKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ArrayKey::Integer(n) => {
                0u8.hash(state);
                n.hash(state);
            }
            ArrayKey::String(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Integer(n) => write!(f, "{}", n),
            ArrayKey::String(s) => write!(f, "{}", s),
        }
    }
}

/// True for strings like "0", "7", "-42" but not "010", "+7" or "1.0".
fn is_canonical_int(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return false;
    }
    if s.starts_with('-') && digits == "0" {
        return false;
    }
    s.parse::<i64>().is_ok()
}

impl ArrayKey {
    pub fn from_value(value: &super::Value) -> ArrayKey {
        match value {
            super::Value::Integer(n) => ArrayKey::Integer(*n),
            super::Value::Float(n) => ArrayKey::Integer(*n as i64),
            super::Value::Bool(b) => ArrayKey::Integer(if *b { 1 } else { 0 }),
            super::Value::Null | super::Value::Undef => ArrayKey::String(String::new()),
            super::Value::String(s) => {
                if is_canonical_int(s) {
                    ArrayKey::Integer(s.parse().unwrap_or(0))
                } else {
                    ArrayKey::String(s.clone())
                }
            }
            super::Value::Array(_) => ArrayKey::String("Array".to_string()),
            super::Value::Object(obj) => {
                ArrayKey::String(format!("Object({})", obj.borrow().class_name))
            }
            super::Value::Resource(res) => {
                ArrayKey::String(format!("Resource id #{}", res.borrow().id))
            }
        }
    }

    pub fn to_value(&self) -> super::Value {
        match self {
            ArrayKey::Integer(n) => super::Value::Integer(*n),
            ArrayKey::String(s) => super::Value::String(s.clone()),
        }
    }
}
