//! Additional math built-in functions

use crate::runtime::Value;
use crate::vm::error::VmError;

fn number(args: &[Value], name: &str) -> Result<f64, VmError> {
    args.first().map(|v| v.to_float()).ok_or_else(|| {
        VmError::InvalidArgument(format!("{}() expects exactly 1 parameter, 0 given", name))
    })
}

/// sin - Sine
pub fn sin(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "sin")?.sin()))
}

/// cos - Cosine
pub fn cos(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "cos")?.cos()))
}

/// tan - Tangent
pub fn tan(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "tan")?.tan()))
}

/// asin - Arc sine
pub fn asin(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "asin")?.asin()))
}

/// acos - Arc cosine
pub fn acos(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "acos")?.acos()))
}

/// atan - Arc tangent
pub fn atan(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "atan")?.atan()))
}

/// atan2 - Arc tangent of two variables
pub fn atan2(args: &[Value]) -> Result<Value, VmError> {
    if args.len() < 2 {
        return Err(VmError::InvalidArgument(
            "atan2() expects exactly 2 parameters".to_string(),
        ));
    }
    Ok(Value::Float(args[0].to_float().atan2(args[1].to_float())))
}

/// sinh - Hyperbolic sine
pub fn sinh(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "sinh")?.sinh()))
}

/// cosh - Hyperbolic cosine
pub fn cosh(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "cosh")?.cosh()))
}

/// tanh - Hyperbolic tangent
pub fn tanh(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "tanh")?.tanh()))
}

/// exp - e raised to a power
pub fn exp(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "exp")?.exp()))
}

/// log - Natural logarithm, or logarithm in an arbitrary base
pub fn log(args: &[Value]) -> Result<Value, VmError> {
    let value = number(args, "log")?;
    match args.get(1) {
        Some(base) => Ok(Value::Float(value.log(base.to_float()))),
        None => Ok(Value::Float(value.ln())),
    }
}

/// log10 - Base-10 logarithm
pub fn log10(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "log10")?.log10()))
}

/// deg2rad - Convert degrees to radians
pub fn deg2rad(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "deg2rad")?.to_radians()))
}

/// rad2deg - Convert radians to degrees
pub fn rad2deg(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(number(args, "rad2deg")?.to_degrees()))
}

/// hypot - sqrt(x*x + y*y)
pub fn hypot(args: &[Value]) -> Result<Value, VmError> {
    if args.len() < 2 {
        return Err(VmError::InvalidArgument(
            "hypot() expects exactly 2 parameters".to_string(),
        ));
    }
    Ok(Value::Float(args[0].to_float().hypot(args[1].to_float())))
}

/// is_nan - Whether a float is NAN
pub fn is_nan(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Bool(number(args, "is_nan")?.is_nan()))
}

/// is_finite - Whether a float is finite
pub fn is_finite(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Bool(number(args, "is_finite")?.is_finite()))
}

/// is_infinite - Whether a float is infinite
pub fn is_infinite(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Bool(number(args, "is_infinite")?.is_infinite()))
}

fn int_arg(args: &[Value], name: &str) -> Result<i64, VmError> {
    args.first().map(|v| v.to_int()).ok_or_else(|| {
        VmError::InvalidArgument(format!("{}() expects exactly 1 parameter, 0 given", name))
    })
}

/// dechex - Decimal to hexadecimal string
pub fn dechex(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::String(format!("{:x}", int_arg(args, "dechex")? as u64)))
}

/// hexdec - Hexadecimal string to decimal
pub fn hexdec(args: &[Value]) -> Result<Value, VmError> {
    let s = args.first().map(|v| v.to_string_val()).unwrap_or_default();
    let digits: String = s.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    Ok(Value::Integer(
        i64::from_str_radix(&digits, 16).unwrap_or(0),
    ))
}

/// decbin - Decimal to binary string
pub fn decbin(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::String(format!("{:b}", int_arg(args, "decbin")? as u64)))
}

/// bindec - Binary string to decimal
pub fn bindec(args: &[Value]) -> Result<Value, VmError> {
    let s = args.first().map(|v| v.to_string_val()).unwrap_or_default();
    let digits: String = s.chars().filter(|c| *c == '0' || *c == '1').collect();
    Ok(Value::Integer(i64::from_str_radix(&digits, 2).unwrap_or(0)))
}

/// decoct - Decimal to octal string
pub fn decoct(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::String(format!("{:o}", int_arg(args, "decoct")? as u64)))
}

/// octdec - Octal string to decimal
pub fn octdec(args: &[Value]) -> Result<Value, VmError> {
    let s = args.first().map(|v| v.to_string_val()).unwrap_or_default();
    let digits: String = s.chars().filter(|c| ('0'..='7').contains(c)).collect();
    Ok(Value::Integer(i64::from_str_radix(&digits, 8).unwrap_or(0)))
}

/// base_convert - Convert a number between arbitrary bases (2..36)
pub fn base_convert(args: &[Value]) -> Result<Value, VmError> {
    if args.len() < 3 {
        return Err(VmError::InvalidArgument(
            "base_convert() expects exactly 3 parameters".to_string(),
        ));
    }
    let digits = args[0].to_string_val().to_lowercase();
    let from_base = args[1].to_int();
    let to_base = args[2].to_int();
    if !(2..=36).contains(&from_base) || !(2..=36).contains(&to_base) {
        return Err(VmError::InvalidArgument(
            "base_convert(): Bases must be between 2 and 36".to_string(),
        ));
    }

    let mut value: u64 = 0;
    for c in digits.chars() {
        if let Some(digit) = c.to_digit(36) {
            if (digit as i64) < from_base {
                value = value
                    .wrapping_mul(from_base as u64)
                    .wrapping_add(digit as u64);
            }
        }
    }

    if value == 0 {
        return Ok(Value::String("0".to_string()));
    }
    let alphabet = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    let mut rest = value;
    while rest > 0 {
        out.push(alphabet[(rest % to_base as u64) as usize]);
        rest /= to_base as u64;
    }
    out.reverse();
    Ok(Value::String(String::from_utf8_lossy(&out).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trig_basics() {
        assert_eq!(sin(&[Value::Float(0.0)]).unwrap(), Value::Float(0.0));
        assert_eq!(cos(&[Value::Float(0.0)]).unwrap(), Value::Float(1.0));
        assert_eq!(
            atan2(&[Value::Float(0.0), Value::Float(1.0)]).unwrap(),
            Value::Float(0.0)
        );
    }

    #[test]
    fn log_with_base() {
        assert_eq!(
            log(&[Value::Float(8.0), Value::Float(2.0)]).unwrap(),
            Value::Float(3.0)
        );
        assert_eq!(log10(&[Value::Float(100.0)]).unwrap(), Value::Float(2.0));
    }

    #[test]
    fn base_conversions_round_trip() {
        assert_eq!(
            dechex(&[Value::Integer(255)]).unwrap(),
            Value::String("ff".into())
        );
        assert_eq!(
            hexdec(&[Value::String("ff".into())]).unwrap(),
            Value::Integer(255)
        );
        assert_eq!(
            decbin(&[Value::Integer(5)]).unwrap(),
            Value::String("101".into())
        );
        assert_eq!(
            bindec(&[Value::String("101".into())]).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(
            octdec(&[decoct(&[Value::Integer(64)]).unwrap()]).unwrap(),
            Value::Integer(64)
        );
    }

    #[test]
    fn base_convert_examples() {
        assert_eq!(
            base_convert(&[Value::String("ff".into()), Value::Integer(16), Value::Integer(2)])
                .unwrap(),
            Value::String("11111111".into())
        );
        assert_eq!(
            base_convert(&[Value::String("0".into()), Value::Integer(10), Value::Integer(36)])
                .unwrap(),
            Value::String("0".into())
        );
        assert!(base_convert(&[
            Value::String("1".into()),
            Value::Integer(1),
            Value::Integer(10)
        ])
        .is_err());
    }

    #[test]
    fn float_classification() {
        assert_eq!(
            is_nan(&[Value::Float(f64::NAN)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            is_infinite(&[Value::Float(f64::INFINITY)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(is_finite(&[Value::Float(1.0)]).unwrap(), Value::Bool(true));
    }
}
