//! String built-in functions

use crate::runtime::{PhpArray, Value};
use crate::vm::error::VmError;

fn arg(args: &[Value], index: usize, name: &str, expected: usize) -> Result<Value, VmError> {
    args.get(index).cloned().ok_or_else(|| {
        VmError::InvalidArgument(format!(
            "{}() expects at least {} parameter(s), {} given",
            name,
            expected,
            args.len()
        ))
    })
}

/// strlen - Get string length in bytes
pub fn strlen(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "strlen", 1)?.to_string_val();
    Ok(Value::Integer(s.len() as i64))
}

/// substr - Return part of a string
pub fn substr(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "substr", 2)?.to_string_val();
    let start = arg(args, 1, "substr", 2)?.to_int();
    let bytes = s.as_bytes();
    let len = bytes.len() as i64;

    let start_idx = if start < 0 {
        (len + start).max(0) as usize
    } else {
        start.min(len) as usize
    };

    let slice = if args.len() >= 3 {
        let length = args[2].to_int();
        if length < 0 {
            let end_idx = ((len + length).max(start_idx as i64)) as usize;
            &bytes[start_idx..end_idx]
        } else {
            let end_idx = (start_idx + length as usize).min(bytes.len());
            &bytes[start_idx..end_idx]
        }
    } else {
        &bytes[start_idx..]
    };

    Ok(Value::String(String::from_utf8_lossy(slice).into_owned()))
}

/// strtoupper - Make a string uppercase
pub fn strtoupper(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "strtoupper", 1)?.to_string_val();
    Ok(Value::String(s.to_uppercase()))
}

/// strtolower - Make a string lowercase
pub fn strtolower(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "strtolower", 1)?.to_string_val();
    Ok(Value::String(s.to_lowercase()))
}

const DEFAULT_TRIM: &str = " \t\n\r\0\x0B";

fn trim_set(args: &[Value]) -> Vec<char> {
    args.get(1)
        .map(|v| v.to_string_val())
        .unwrap_or_else(|| DEFAULT_TRIM.to_string())
        .chars()
        .collect()
}

/// trim - Strip whitespace (or other characters) from both ends
pub fn trim(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "trim", 1)?.to_string_val();
    let set = trim_set(args);
    Ok(Value::String(s.trim_matches(|c| set.contains(&c)).to_string()))
}

/// ltrim - Strip from the beginning
pub fn ltrim(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "ltrim", 1)?.to_string_val();
    let set = trim_set(args);
    Ok(Value::String(
        s.trim_start_matches(|c| set.contains(&c)).to_string(),
    ))
}

/// rtrim - Strip from the end
pub fn rtrim(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "rtrim", 1)?.to_string_val();
    let set = trim_set(args);
    Ok(Value::String(
        s.trim_end_matches(|c| set.contains(&c)).to_string(),
    ))
}

/// str_repeat - Repeat a string
pub fn str_repeat(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "str_repeat", 2)?.to_string_val();
    let times = arg(args, 1, "str_repeat", 2)?.to_int().max(0) as usize;
    Ok(Value::String(s.repeat(times)))
}

/// str_replace - Replace all occurrences of the search string
pub fn str_replace(args: &[Value]) -> Result<Value, VmError> {
    let search = arg(args, 0, "str_replace", 3)?;
    let replace = arg(args, 1, "str_replace", 3)?.to_string_val();
    let subject = arg(args, 2, "str_replace", 3)?.to_string_val();
    let result = match search {
        Value::Array(needles) => {
            let mut out = subject;
            for (_, needle) in needles.iter() {
                out = out.replace(&needle.to_string_val(), &replace);
            }
            out
        }
        other => subject.replace(&other.to_string_val(), &replace),
    };
    Ok(Value::String(result))
}

/// strpos - Find the byte position of the first occurrence
pub fn strpos(args: &[Value]) -> Result<Value, VmError> {
    let haystack = arg(args, 0, "strpos", 2)?.to_string_val();
    let needle = arg(args, 1, "strpos", 2)?.to_string_val();
    let offset = args.get(2).map(|v| v.to_int().max(0) as usize).unwrap_or(0);
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    if offset > haystack.len() {
        return Ok(Value::Bool(false));
    }
    if needle.is_empty() {
        return Ok(Value::Integer(offset as i64));
    }
    let found = haystack[offset..]
        .windows(needle.len())
        .position(|window| window == needle);
    match found {
        Some(pos) => Ok(Value::Integer((pos + offset) as i64)),
        None => Ok(Value::Bool(false)),
    }
}

/// str_contains - Determine if a string contains a substring
pub fn str_contains(args: &[Value]) -> Result<Value, VmError> {
    let haystack = arg(args, 0, "str_contains", 2)?.to_string_val();
    let needle = arg(args, 1, "str_contains", 2)?.to_string_val();
    Ok(Value::Bool(haystack.contains(&needle)))
}

/// str_starts_with - Check if a string starts with a substring
pub fn str_starts_with(args: &[Value]) -> Result<Value, VmError> {
    let haystack = arg(args, 0, "str_starts_with", 2)?.to_string_val();
    let needle = arg(args, 1, "str_starts_with", 2)?.to_string_val();
    Ok(Value::Bool(haystack.starts_with(&needle)))
}

/// str_ends_with - Check if a string ends with a substring
pub fn str_ends_with(args: &[Value]) -> Result<Value, VmError> {
    let haystack = arg(args, 0, "str_ends_with", 2)?.to_string_val();
    let needle = arg(args, 1, "str_ends_with", 2)?.to_string_val();
    Ok(Value::Bool(haystack.ends_with(&needle)))
}

/// ucfirst - Uppercase the first character
pub fn ucfirst(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "ucfirst", 1)?.to_string_val();
    let mut chars = s.chars();
    let result = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => s,
    };
    Ok(Value::String(result))
}

/// lcfirst - Lowercase the first character
pub fn lcfirst(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "lcfirst", 1)?.to_string_val();
    let mut chars = s.chars();
    let result = match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => s,
    };
    Ok(Value::String(result))
}

/// strrev - Reverse a string
pub fn strrev(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "strrev", 1)?.to_string_val();
    Ok(Value::String(s.chars().rev().collect()))
}

/// str_pad - Pad a string to a certain length
pub fn str_pad(args: &[Value]) -> Result<Value, VmError> {
    const PAD_RIGHT: i64 = 1;
    const PAD_LEFT: i64 = 0;
    const PAD_BOTH: i64 = 2;

    let s = arg(args, 0, "str_pad", 2)?.to_string_val();
    let target = arg(args, 1, "str_pad", 2)?.to_int();
    let pad = args
        .get(2)
        .map(|v| v.to_string_val())
        .unwrap_or_else(|| " ".to_string());
    let pad_type = args.get(3).map(|v| v.to_int()).unwrap_or(PAD_RIGHT);

    if target <= s.len() as i64 || pad.is_empty() {
        return Ok(Value::String(s));
    }
    let missing = target as usize - s.len();
    let fill = |n: usize| pad.chars().cycle().take(n).collect::<String>();
    let result = match pad_type {
        PAD_LEFT => fill(missing) + &s,
        PAD_BOTH => {
            let left = missing / 2;
            fill(left) + &s + &fill(missing - left)
        }
        _ => s + &fill(missing),
    };
    Ok(Value::String(result))
}

/// explode - Split a string by a delimiter
pub fn explode(args: &[Value]) -> Result<Value, VmError> {
    let delimiter = arg(args, 0, "explode", 2)?.to_string_val();
    let subject = arg(args, 1, "explode", 2)?.to_string_val();
    if delimiter.is_empty() {
        return Err(VmError::InvalidArgument(
            "explode(): Argument #1 ($separator) must not be empty".to_string(),
        ));
    }
    let mut array = PhpArray::new();
    for part in subject.split(&delimiter) {
        array.append(Value::String(part.to_string()));
    }
    Ok(Value::array(array))
}

/// implode - Join array elements with a string
pub fn implode(args: &[Value]) -> Result<Value, VmError> {
    let (glue, pieces) = match (args.first(), args.get(1)) {
        (Some(Value::Array(pieces)), _) => (String::new(), pieces.clone()),
        (Some(glue), Some(Value::Array(pieces))) => (glue.to_string_val(), pieces.clone()),
        _ => {
            return Err(VmError::InvalidArgument(
                "implode() expects an array argument".to_string(),
            ))
        }
    };
    let joined = pieces
        .values()
        .map(|v| v.to_string_val())
        .collect::<Vec<_>>()
        .join(&glue);
    Ok(Value::String(joined))
}

/// chr - Generate a single-byte string from a number
pub fn chr(args: &[Value]) -> Result<Value, VmError> {
    let code = arg(args, 0, "chr", 1)?.to_int().rem_euclid(256) as u8;
    Ok(Value::String(
        String::from_utf8_lossy(&[code]).into_owned(),
    ))
}

/// ord - Convert the first byte of a string to a number
pub fn ord(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "ord", 1)?.to_string_val();
    Ok(Value::Integer(
        s.as_bytes().first().copied().unwrap_or(0) as i64
    ))
}

/// bin2hex - Convert binary data into hexadecimal representation
pub fn bin2hex(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "bin2hex", 1)?.to_string_val();
    let mut result = String::with_capacity(s.len() * 2);
    for b in s.bytes() {
        result.push_str(&format!("{:02x}", b));
    }
    Ok(Value::String(result))
}

/// hex2bin - Decode a hexadecimally encoded binary string
pub fn hex2bin(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "hex2bin", 1)?.to_string_val();
    if s.len() % 2 != 0 {
        return Ok(Value::Bool(false));
    }
    let mut bytes = Vec::with_capacity(s.len() / 2);
    for chunk in s.as_bytes().chunks(2) {
        let pair = std::str::from_utf8(chunk).unwrap_or("");
        match u8::from_str_radix(pair, 16) {
            Ok(byte) => bytes.push(byte),
            Err(_) => return Ok(Value::Bool(false)),
        }
    }
    Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

/// sprintf - Return a formatted string
///
/// Supports %s %d %f %x %X %o %b %% with optional width, precision,
/// zero-fill and left-justify flags.
pub fn sprintf(args: &[Value]) -> Result<Value, VmError> {
    let format = arg(args, 0, "sprintf", 1)?.to_string_val();
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    let mut next_arg = 1usize;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        let mut left_justify = false;
        let mut zero_fill = false;
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => left_justify = true,
                '0' => zero_fill = true,
                _ => break,
            }
            chars.next();
        }
        let mut width = 0usize;
        while let Some(&digit) = chars.peek() {
            if digit.is_ascii_digit() {
                width = width * 10 + digit.to_digit(10).unwrap_or(0) as usize;
                chars.next();
            } else {
                break;
            }
        }
        let mut precision: Option<usize> = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut p = 0usize;
            while let Some(&digit) = chars.peek() {
                if digit.is_ascii_digit() {
                    p = p * 10 + digit.to_digit(10).unwrap_or(0) as usize;
                    chars.next();
                } else {
                    break;
                }
            }
            precision = Some(p);
        }

        let spec = chars.next().ok_or_else(|| {
            VmError::InvalidArgument("sprintf(): Missing format specifier".to_string())
        })?;
        let value = args.get(next_arg).cloned().unwrap_or(Value::Null);
        next_arg += 1;

        let rendered = match spec {
            's' => {
                let mut s = value.to_string_val();
                if let Some(p) = precision {
                    s.truncate(p);
                }
                s
            }
            'd' => value.to_int().to_string(),
            'f' | 'F' => format!("{:.*}", precision.unwrap_or(6), value.to_float()),
            'x' => format!("{:x}", value.to_int()),
            'X' => format!("{:X}", value.to_int()),
            'o' => format!("{:o}", value.to_int()),
            'b' => format!("{:b}", value.to_int()),
            other => {
                return Err(VmError::InvalidArgument(format!(
                    "sprintf(): Unknown format specifier \"%{}\"",
                    other
                )))
            }
        };

        if rendered.len() >= width {
            out.push_str(&rendered);
        } else if left_justify {
            out.push_str(&rendered);
            out.push_str(&" ".repeat(width - rendered.len()));
        } else {
            let fill = if zero_fill && spec != 's' { '0' } else { ' ' };
            let padding: String = std::iter::repeat(fill).take(width - rendered.len()).collect();
            if fill == '0' && rendered.starts_with('-') {
                out.push('-');
                out.push_str(&padding);
                out.push_str(&rendered[1..]);
            } else {
                out.push_str(&padding);
                out.push_str(&rendered);
            }
        }
    }
    Ok(Value::String(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    #[test]
    fn basic_string_ops() {
        assert_eq!(strlen(&[s("héllo")]).unwrap(), Value::Integer(6));
        assert_eq!(strtoupper(&[s("abc")]).unwrap(), s("ABC"));
        assert_eq!(strrev(&[s("abc")]).unwrap(), s("cba"));
        assert_eq!(ucfirst(&[s("php")]).unwrap(), s("Php"));
        assert_eq!(trim(&[s("  hi  ")]).unwrap(), s("hi"));
        assert_eq!(trim(&[s("xxhixx"), s("x")]).unwrap(), s("hi"));
    }

    #[test]
    fn substr_handles_negative_offsets() {
        assert_eq!(substr(&[s("abcdef"), Value::Integer(2)]).unwrap(), s("cdef"));
        assert_eq!(
            substr(&[s("abcdef"), Value::Integer(-2)]).unwrap(),
            s("ef")
        );
        assert_eq!(
            substr(&[s("abcdef"), Value::Integer(1), Value::Integer(3)]).unwrap(),
            s("bcd")
        );
        assert_eq!(
            substr(&[s("abcdef"), Value::Integer(1), Value::Integer(-2)]).unwrap(),
            s("bcd")
        );
    }

    #[test]
    fn strpos_returns_false_on_miss() {
        assert_eq!(strpos(&[s("hello"), s("ll")]).unwrap(), Value::Integer(2));
        assert_eq!(strpos(&[s("hello"), s("z")]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn explode_implode_round_trip() {
        let parts = explode(&[s(","), s("a,b,c")]).unwrap();
        assert_eq!(implode(&[s(","), parts]).unwrap(), s("a,b,c"));
        assert!(explode(&[s(""), s("abc")]).is_err());
    }

    #[test]
    fn str_pad_variants() {
        assert_eq!(
            str_pad(&[s("5"), Value::Integer(3), s("0"), Value::Integer(0)]).unwrap(),
            s("005")
        );
        assert_eq!(str_pad(&[s("ab"), Value::Integer(5)]).unwrap(), s("ab   "));
    }

    #[test]
    fn sprintf_specifiers() {
        assert_eq!(
            sprintf(&[s("%s is %d"), s("x"), Value::Integer(7)]).unwrap(),
            s("x is 7")
        );
        assert_eq!(
            sprintf(&[s("%05d"), Value::Integer(-42)]).unwrap(),
            s("-0042")
        );
        assert_eq!(
            sprintf(&[s("%.2f"), Value::Float(3.14159)]).unwrap(),
            s("3.14")
        );
        assert_eq!(sprintf(&[s("%x"), Value::Integer(255)]).unwrap(), s("ff"));
        assert_eq!(sprintf(&[s("100%%")]).unwrap(), s("100%"));
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(bin2hex(&[s("AB")]).unwrap(), s("4142"));
        assert_eq!(hex2bin(&[s("4142")]).unwrap(), s("AB"));
        assert_eq!(hex2bin(&[s("zz")]).unwrap(), Value::Bool(false));
    }
}
