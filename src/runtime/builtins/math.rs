//! Math built-in functions

use crate::runtime::Value;
use crate::vm::error::VmError;

fn require(args: &[Value], count: usize, name: &str) -> Result<(), VmError> {
    if args.len() < count {
        return Err(VmError::InvalidArgument(format!(
            "{}() expects at least {} parameter(s), {} given",
            name,
            count,
            args.len()
        )));
    }
    Ok(())
}

/// abs - Absolute value
pub fn abs(args: &[Value]) -> Result<Value, VmError> {
    require(args, 1, "abs")?;
    match &args[0] {
        Value::Integer(n) => Ok(Value::Integer(n.wrapping_abs())),
        Value::Float(n) => Ok(Value::Float(n.abs())),
        v => Ok(Value::Float(v.to_float().abs())),
    }
}

/// ceil - Round fractions up
pub fn ceil(args: &[Value]) -> Result<Value, VmError> {
    require(args, 1, "ceil")?;
    Ok(Value::Float(args[0].to_float().ceil()))
}

/// floor - Round fractions down
pub fn floor(args: &[Value]) -> Result<Value, VmError> {
    require(args, 1, "floor")?;
    Ok(Value::Float(args[0].to_float().floor()))
}

/// round - Round a float to a given precision
pub fn round(args: &[Value]) -> Result<Value, VmError> {
    require(args, 1, "round")?;
    let value = args[0].to_float();
    let precision = args.get(1).map(|v| v.to_int()).unwrap_or(0) as i32;
    let factor = 10_f64.powi(precision);
    Ok(Value::Float((value * factor).round() / factor))
}

/// sqrt - Square root
pub fn sqrt(args: &[Value]) -> Result<Value, VmError> {
    require(args, 1, "sqrt")?;
    Ok(Value::Float(args[0].to_float().sqrt()))
}

/// pow - Exponential expression
pub fn pow(args: &[Value]) -> Result<Value, VmError> {
    require(args, 2, "pow")?;
    crate::vm::helpers::pow_values(&args[0], &args[1])
}

/// max - Find the highest value
pub fn max(args: &[Value]) -> Result<Value, VmError> {
    require(args, 1, "max")?;
    let mut best = args[0].clone();
    for candidate in args.iter().skip(1) {
        if candidate.compare(&best) > 0 {
            best = candidate.clone();
        }
    }
    Ok(best)
}

/// min - Find the lowest value
pub fn min(args: &[Value]) -> Result<Value, VmError> {
    require(args, 1, "min")?;
    let mut best = args[0].clone();
    for candidate in args.iter().skip(1) {
        if candidate.compare(&best) < 0 {
            best = candidate.clone();
        }
    }
    Ok(best)
}

/// intdiv - Integer division
pub fn intdiv(args: &[Value]) -> Result<Value, VmError> {
    require(args, 2, "intdiv")?;
    let divisor = args[1].to_int();
    if divisor == 0 {
        return Err(VmError::DivisionByZero);
    }
    Ok(Value::Integer(args[0].to_int().wrapping_div(divisor)))
}

/// fmod - Floating-point remainder
pub fn fmod(args: &[Value]) -> Result<Value, VmError> {
    require(args, 2, "fmod")?;
    Ok(Value::Float(args[0].to_float() % args[1].to_float()))
}

/// pi - The value of pi
pub fn pi(_args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(std::f64::consts::PI))
}

/// rand - Generate a random integer, optionally within [min, max]
pub fn rand(args: &[Value]) -> Result<Value, VmError> {
    let (low, high) = if args.len() >= 2 {
        (args[0].to_int(), args[1].to_int())
    } else {
        (0, i32::MAX as i64)
    };
    if low > high {
        return Err(VmError::InvalidArgument(
            "rand(): Argument #1 ($min) must be less than or equal to argument #2 ($max)"
                .to_string(),
        ));
    }
    Ok(Value::Integer(fastrand::i64(low..=high)))
}
