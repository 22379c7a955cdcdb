//! Output built-in functions
//!
//! var_dump and print_r keep a stack of the containers on the current
//! traversal path (array handle pointers, object ids) and print
//! *RECURSION* instead of descending into one twice.

use std::rc::Rc;

use crate::runtime::{ArrayKey, Value};
use crate::vm::error::VmError;

/// print - Output a string, returning 1
pub fn print(output: &mut String, args: &[Value]) -> Result<Value, VmError> {
    let value = args.first().ok_or_else(|| {
        VmError::InvalidArgument("print() expects exactly 1 parameter, 0 given".to_string())
    })?;
    output.push_str(&value.to_string_val());
    Ok(Value::Integer(1))
}

/// var_dump - Dump structured information about variables
pub fn var_dump(output: &mut String, args: &[Value]) -> Result<Value, VmError> {
    let mut seen = Vec::new();
    for value in args {
        dump_value(output, value, 0, &mut seen);
    }
    Ok(Value::Null)
}

fn dump_value(output: &mut String, value: &Value, indent: usize, seen: &mut Vec<*const ()>) {
    let prefix = "  ".repeat(indent);
    match value {
        Value::Null | Value::Undef => {
            output.push_str(&format!("{}NULL\n", prefix));
        }
        Value::Bool(b) => {
            output.push_str(&format!("{}bool({})\n", prefix, b));
        }
        Value::Integer(n) => {
            output.push_str(&format!("{}int({})\n", prefix, n));
        }
        Value::Float(n) => {
            output.push_str(&format!("{}float({})\n", prefix, n));
        }
        Value::String(s) => {
            output.push_str(&format!("{}string({}) \"{}\"\n", prefix, s.len(), s));
        }
        Value::Array(array) => {
            let identity = Rc::as_ptr(array) as *const ();
            if seen.contains(&identity) {
                output.push_str(&format!("{}*RECURSION*\n", prefix));
                return;
            }
            seen.push(identity);
            output.push_str(&format!("{}array({}) {{\n", prefix, array.len()));
            for (key, element) in array.iter() {
                match key {
                    ArrayKey::Integer(n) => {
                        output.push_str(&format!("{}  [{}]=>\n", prefix, n));
                    }
                    ArrayKey::String(s) => {
                        output.push_str(&format!("{}  [\"{}\"]=>\n", prefix, s));
                    }
                }
                dump_value(output, element, indent + 1, seen);
            }
            output.push_str(&format!("{}}}\n", prefix));
            seen.pop();
        }
        Value::Object(object) => {
            let identity = Rc::as_ptr(object) as *const ();
            if seen.contains(&identity) {
                output.push_str(&format!("{}*RECURSION*\n", prefix));
                return;
            }
            seen.push(identity);
            let obj = object.borrow();
            output.push_str(&format!(
                "{}object({})#{} ({}) {{\n",
                prefix,
                obj.class_name,
                obj.id,
                obj.properties.len()
            ));
            for (name, slot) in &obj.properties {
                output.push_str(&format!("{}  [\"{}\"]=>\n", prefix, name));
                dump_value(output, &slot.value, indent + 1, seen);
            }
            output.push_str(&format!("{}}}\n", prefix));
            seen.pop();
        }
        Value::Resource(res) => {
            let res = res.borrow();
            output.push_str(&format!(
                "{}resource({}) of type ({})\n",
                prefix, res.id, res.kind
            ));
        }
    }
}

/// var_export - Parsable string representation of a variable
///
/// Writes to the output buffer; a truthy second argument returns the
/// rendering instead.
pub fn var_export(output: &mut String, args: &[Value]) -> Result<Value, VmError> {
    let value = args.first().ok_or_else(|| {
        VmError::InvalidArgument("var_export() expects at least 1 parameter, 0 given".to_string())
    })?;
    let mut rendered = String::new();
    let mut seen = Vec::new();
    export_value(&mut rendered, value, 0, &mut seen);
    if args.get(1).map(|v| v.to_bool()).unwrap_or(false) {
        Ok(Value::String(rendered))
    } else {
        output.push_str(&rendered);
        Ok(Value::Null)
    }
}

fn export_value(out: &mut String, value: &Value, indent: usize, seen: &mut Vec<*const ()>) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Null | Value::Undef => out.push_str("NULL"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(n) => out.push_str(&n.to_string()),
        Value::Float(n) => {
            if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                out.push_str(&format!("{:.1}", n));
            } else {
                out.push_str(&n.to_string());
            }
        }
        Value::String(s) => {
            out.push('\'');
            out.push_str(&s.replace('\\', "\\\\").replace('\'', "\\'"));
            out.push('\'');
        }
        Value::Array(array) => {
            let identity = Rc::as_ptr(array) as *const ();
            if seen.contains(&identity) {
                out.push_str("NULL");
                return;
            }
            seen.push(identity);
            out.push_str(&format!("{}array (\n", if indent == 0 { "" } else { "\n" }));
            for (key, element) in array.iter() {
                match key {
                    ArrayKey::Integer(n) => out.push_str(&format!("{}  {} => ", pad, n)),
                    ArrayKey::String(s) => out.push_str(&format!(
                        "{}  '{}' => ",
                        pad,
                        s.replace('\\', "\\\\").replace('\'', "\\'")
                    )),
                }
                export_value(out, element, indent + 1, seen);
                out.push_str(",\n");
            }
            out.push_str(&format!("{})", pad));
            seen.pop();
        }
        Value::Object(object) => {
            let identity = Rc::as_ptr(object) as *const ();
            if seen.contains(&identity) {
                out.push_str("NULL");
                return;
            }
            seen.push(identity);
            let obj = object.borrow();
            out.push_str(&format!("\\{}::__set_state(array(\n", obj.class_name));
            for (name, slot) in &obj.properties {
                out.push_str(&format!("{}   '{}' => ", pad, name));
                export_value(out, &slot.value, indent + 1, seen);
                out.push_str(",\n");
            }
            out.push_str(&format!("{}))", pad));
            seen.pop();
        }
        Value::Resource(res) => {
            out.push_str(&format!("NULL /* resource id #{} */", res.borrow().id));
        }
    }
}

/// print_r - Human-readable representation of a variable
pub fn print_r(output: &mut String, args: &[Value]) -> Result<Value, VmError> {
    let value = args.first().ok_or_else(|| {
        VmError::InvalidArgument("print_r() expects at least 1 parameter, 0 given".to_string())
    })?;
    let mut seen = Vec::new();
    print_r_value(output, value, 0, &mut seen);
    Ok(Value::Bool(true))
}

fn print_r_value(output: &mut String, value: &Value, indent: usize, seen: &mut Vec<*const ()>) {
    match value {
        Value::Array(array) => {
            let identity = Rc::as_ptr(array) as *const ();
            if seen.contains(&identity) {
                output.push_str("Array\n *RECURSION*");
                return;
            }
            seen.push(identity);
            let pad = "    ".repeat(indent);
            output.push_str(&format!("Array\n{}(\n", pad));
            for (key, element) in array.iter() {
                output.push_str(&format!("{}    [{}] => ", pad, key));
                print_r_value(output, element, indent + 2, seen);
                output.push('\n');
            }
            output.push_str(&format!("{})\n", pad));
            seen.pop();
        }
        Value::Object(object) => {
            let identity = Rc::as_ptr(object) as *const ();
            if seen.contains(&identity) {
                output.push_str("Object\n *RECURSION*");
                return;
            }
            seen.push(identity);
            let obj = object.borrow();
            let pad = "    ".repeat(indent);
            output.push_str(&format!("{} Object\n{}(\n", obj.class_name, pad));
            for (name, slot) in &obj.properties {
                output.push_str(&format!("{}    [{}] => ", pad, name));
                print_r_value(output, &slot.value, indent + 2, seen);
                output.push('\n');
            }
            output.push_str(&format!("{})\n", pad));
            seen.pop();
        }
        other => output.push_str(&other.to_string_val()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::PhpArray;
    use pretty_assertions::assert_eq;

    #[test]
    fn dumps_scalars() {
        let mut out = String::new();
        var_dump(&mut out, &[Value::Integer(3), Value::Bool(false)]).unwrap();
        assert_eq!(out, "int(3)\nbool(false)\n");
    }

    #[test]
    fn dumps_arrays_with_keys() {
        let mut arr = PhpArray::new();
        arr.append(Value::Integer(7));
        arr.set(ArrayKey::String("k".into()), Value::String("v".into()));
        let mut out = String::new();
        var_dump(&mut out, &[Value::array(arr)]).unwrap();
        assert_eq!(
            out,
            "array(2) {\n  [0]=>\n  int(7)\n  [\"k\"]=>\n  string(1) \"v\"\n}\n"
        );
    }

    #[test]
    fn self_referential_object_prints_recursion() {
        use crate::runtime::{ObjectInstance, PropertySlot};
        use crate::vm::class::ClassEntry;
        use std::cell::RefCell;
        use std::sync::Arc;

        let class = Arc::new(ClassEntry::new("Node"));
        let object = Rc::new(RefCell::new(ObjectInstance::new(class, 1)));
        object
            .borrow_mut()
            .set_property("next", PropertySlot::public(Value::Object(object.clone())));

        let mut out = String::new();
        var_dump(&mut out, &[Value::Object(object)]).unwrap();
        assert!(out.contains("*RECURSION*"));
    }

    #[test]
    fn shared_but_acyclic_containers_dump_fully() {
        let shared = Rc::new(PhpArray::new());
        let mut outer = PhpArray::new();
        outer.append(Value::Array(shared.clone()));
        outer.append(Value::Array(shared));

        let mut out = String::new();
        var_dump(&mut out, &[Value::array(outer)]).unwrap();
        // The same handle twice on one level is sharing, not recursion.
        assert!(!out.contains("*RECURSION*"));
        assert_eq!(out.matches("array(0)").count(), 2);
    }

    #[test]
    fn var_export_renders_parsable_arrays() {
        let mut arr = PhpArray::new();
        arr.append(Value::Integer(5));
        arr.set(ArrayKey::String("k".into()), Value::String("it's".into()));
        let rendered = var_export(
            &mut String::new(),
            &[Value::array(arr), Value::Bool(true)],
        )
        .unwrap();
        assert_eq!(
            rendered,
            Value::String("array (\n  0 => 5,\n  'k' => 'it\\'s',\n)".into())
        );
    }

    #[test]
    fn var_export_scalars() {
        let mut out = String::new();
        var_export(&mut out, &[Value::Float(13.0)]).unwrap();
        var_export(&mut out, &[Value::Bool(true)]).unwrap();
        var_export(&mut out, &[Value::Null]).unwrap();
        assert_eq!(out, "13.0trueNULL");
    }

    #[test]
    fn print_returns_one() {
        let mut out = String::new();
        assert_eq!(
            print(&mut out, &[Value::String("hi".into())]).unwrap(),
            Value::Integer(1)
        );
        assert_eq!(out, "hi");
    }
}
