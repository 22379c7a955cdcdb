//! Date and time built-in functions

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

use crate::runtime::Value;
use crate::vm::error::VmError;

/// time - Current Unix timestamp
pub fn time(_args: &[Value]) -> Result<Value, VmError> {
    Ok(Value::Integer(Utc::now().timestamp()))
}

/// microtime - Current Unix timestamp with microseconds
pub fn microtime(args: &[Value]) -> Result<Value, VmError> {
    let now = Utc::now();
    let as_float = args.first().map(|v| v.to_bool()).unwrap_or(false);
    if as_float {
        let seconds = now.timestamp() as f64 + now.timestamp_subsec_micros() as f64 / 1_000_000.0;
        Ok(Value::Float(seconds))
    } else {
        let fraction = now.timestamp_subsec_micros() as f64 / 1_000_000.0;
        Ok(Value::String(format!(
            "{:.8} {}",
            fraction,
            now.timestamp()
        )))
    }
}

/// date - Format a timestamp
///
/// Supported format characters: Y m d H i s U. Unrecognized characters
/// pass through; a backslash escapes the next character.
pub fn date(args: &[Value]) -> Result<Value, VmError> {
    let format = args
        .first()
        .ok_or_else(|| {
            VmError::InvalidArgument("date() expects at least 1 parameter, 0 given".to_string())
        })?
        .to_string_val();
    let timestamp = args
        .get(1)
        .map(|v| v.to_int())
        .unwrap_or_else(|| Utc::now().timestamp());
    let moment: DateTime<Utc> = Utc
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| VmError::InvalidArgument(format!("date(): Invalid timestamp {}", timestamp)))?;

    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            'Y' => out.push_str(&moment.year().to_string()),
            'm' => out.push_str(&format!("{:02}", moment.month())),
            'd' => out.push_str(&format!("{:02}", moment.day())),
            'H' => out.push_str(&format!("{:02}", moment.hour())),
            'i' => out.push_str(&format!("{:02}", moment.minute())),
            's' => out.push_str(&format!("{:02}", moment.second())),
            'U' => out.push_str(&moment.timestamp().to_string()),
            other => out.push(other),
        }
    }
    Ok(Value::String(out))
}
