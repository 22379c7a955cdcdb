//! Type and variable introspection built-in functions

use crate::runtime::value::coerce::is_numeric_string;
use crate::runtime::Value;
use crate::vm::error::VmError;

fn arg<'a>(args: &'a [Value], name: &str) -> Result<&'a Value, VmError> {
    args.first().ok_or_else(|| {
        VmError::InvalidArgument(format!("{}() expects exactly 1 parameter, 0 given", name))
    })
}

/// gettype - Get the type of a variable
pub fn gettype(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::String(arg(args, "gettype")?.get_type().to_string()))
}

/// get_debug_type - Get the type name the way type errors report it
pub fn get_debug_type(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::String(arg(args, "get_debug_type")?.type_name()))
}

/// intval - Get the integer value of a variable
pub fn intval(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Integer(arg(args, "intval")?.to_int()))
}

/// floatval - Get the float value of a variable
pub fn floatval(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Float(arg(args, "floatval")?.to_float()))
}

/// strval - Get the string value of a variable
pub fn strval(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::String(arg(args, "strval")?.to_string_val()))
}

/// boolval - Get the boolean value of a variable
pub fn boolval(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Bool(arg(args, "boolval")?.to_bool()))
}

/// is_null - Whether a variable is null
pub fn is_null(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Bool(matches!(
        arg(args, "is_null")?,
        Value::Null | Value::Undef
    )))
}

/// is_bool - Whether a variable is a boolean
pub fn is_bool(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Bool(matches!(arg(args, "is_bool")?, Value::Bool(_))))
}

/// is_int - Whether a variable is an integer
pub fn is_int(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Bool(matches!(
        arg(args, "is_int")?,
        Value::Integer(_)
    )))
}

/// is_float - Whether a variable is a float
pub fn is_float(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Bool(matches!(arg(args, "is_float")?, Value::Float(_))))
}

/// is_string - Whether a variable is a string
pub fn is_string(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Bool(matches!(
        arg(args, "is_string")?,
        Value::String(_)
    )))
}

/// is_array - Whether a variable is an array
pub fn is_array(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Bool(arg(args, "is_array")?.is_array()))
}

/// is_object - Whether a variable is an object
pub fn is_object(args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Bool(arg(args, "is_object")?.is_object()))
}

/// is_numeric - Whether a variable is a number or a numeric string
pub fn is_numeric(args: &[Value]) -> Result<Value, VmError> {
    let result = match arg(args, "is_numeric")? {
        Value::Integer(_) | Value::Float(_) => true,
        Value::String(s) => is_numeric_string(s),
        _ => false,
    };
    Ok(Value::Bool(result))
}
