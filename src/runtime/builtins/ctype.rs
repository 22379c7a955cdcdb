//! Character type built-in functions
//!
//! Byte-oriented, like the C locale: every byte of the string must
//! satisfy the predicate, and the empty string is always false.

use crate::runtime::Value;
use crate::vm::error::VmError;

fn check(args: &[Value], name: &str, predicate: impl Fn(u8) -> bool) -> Result<Value, VmError> {
    let value = args.first().ok_or_else(|| {
        VmError::InvalidArgument(format!("{}() expects exactly 1 parameter, 0 given", name))
    })?;
    let text = value.to_string_val();
    let result = !text.is_empty() && text.bytes().all(predicate);
    Ok(Value::Bool(result))
}

/// ctype_alpha - Check for alphabetic character(s)
pub fn ctype_alpha(args: &[Value]) -> Result<Value, VmError> {
    check(args, "ctype_alpha", |b| b.is_ascii_alphabetic())
}

/// ctype_digit - Check for numeric character(s)
pub fn ctype_digit(args: &[Value]) -> Result<Value, VmError> {
    check(args, "ctype_digit", |b| b.is_ascii_digit())
}

/// ctype_alnum - Check for alphanumeric character(s)
pub fn ctype_alnum(args: &[Value]) -> Result<Value, VmError> {
    check(args, "ctype_alnum", |b| b.is_ascii_alphanumeric())
}

/// ctype_lower - Check for lowercase character(s)
pub fn ctype_lower(args: &[Value]) -> Result<Value, VmError> {
    check(args, "ctype_lower", |b| b.is_ascii_lowercase())
}

/// ctype_upper - Check for uppercase character(s)
pub fn ctype_upper(args: &[Value]) -> Result<Value, VmError> {
    check(args, "ctype_upper", |b| b.is_ascii_uppercase())
}

/// ctype_space - Check for whitespace character(s)
pub fn ctype_space(args: &[Value]) -> Result<Value, VmError> {
    check(args, "ctype_space", |b| b.is_ascii_whitespace() || b == 0x0b)
}

/// ctype_punct - Check for printable non-alphanumeric character(s)
pub fn ctype_punct(args: &[Value]) -> Result<Value, VmError> {
    check(args, "ctype_punct", |b| b.is_ascii_punctuation())
}

/// ctype_xdigit - Check for hexadecimal digit(s)
pub fn ctype_xdigit(args: &[Value]) -> Result<Value, VmError> {
    check(args, "ctype_xdigit", |b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    #[test]
    fn empty_string_is_always_false() {
        assert_eq!(ctype_alpha(&[s("")]).unwrap(), Value::Bool(false));
        assert_eq!(ctype_digit(&[s("")]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn predicates() {
        assert_eq!(ctype_alpha(&[s("Abc")]).unwrap(), Value::Bool(true));
        assert_eq!(ctype_alpha(&[s("a1")]).unwrap(), Value::Bool(false));
        assert_eq!(ctype_digit(&[s("0123")]).unwrap(), Value::Bool(true));
        assert_eq!(ctype_alnum(&[s("a1")]).unwrap(), Value::Bool(true));
        assert_eq!(ctype_lower(&[s("abc")]).unwrap(), Value::Bool(true));
        assert_eq!(ctype_upper(&[s("ABC")]).unwrap(), Value::Bool(true));
        assert_eq!(ctype_space(&[s(" \t\n")]).unwrap(), Value::Bool(true));
        assert_eq!(ctype_punct(&[s("!?.")]).unwrap(), Value::Bool(true));
        assert_eq!(ctype_xdigit(&[s("DeadBeef")]).unwrap(), Value::Bool(true));
        assert_eq!(ctype_xdigit(&[s("0xg")]).unwrap(), Value::Bool(false));
    }
}
