use std::rc::Rc;

use crate::runtime::{ArrayKey, PhpArray, Value};
use crate::vm::error::VmError;
use crate::vm::helpers;
use crate::vm::opcode::{Instruction, Operand};
use crate::vm::Vm;

/// Auto-vivification: any non-array container becomes a fresh array.
fn ensure_array(value: Value) -> Rc<PhpArray> {
    match value {
        Value::Array(handle) => handle,
        _ => Rc::new(PhpArray::new()),
    }
}

pub fn execute_init_array(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let array = PhpArray::with_capacity(instr.extended_value as usize);
    vm.write_operand(&instr.result, Value::array(array))
}

/// `result[op2] = op1`, appending when op2 is unused. The result operand
/// names the array slot being built.
pub fn execute_add_array_element(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    let mut handle = ensure_array(vm.take_operand(&instr.result)?);
    let array = Rc::make_mut(&mut handle);
    if instr.op2.is_unused() {
        array.append(value);
    } else {
        let key = ArrayKey::from_value(&vm.read_operand(&instr.op2)?);
        array.set(key, value);
    }
    vm.write_operand(&instr.result, Value::Array(handle))
}

fn fetch_dim(vm: &Vm, container: &Value, key_operand: &Operand) -> Result<Value, VmError> {
    let key = vm.read_operand(key_operand)?;
    Ok(match container {
        Value::Array(array) => array
            .get(&ArrayKey::from_value(&key))
            .cloned()
            .unwrap_or(Value::Null),
        // Byte-indexed string access; out of range yields "".
        Value::String(s) => {
            let index = key.to_int();
            if index >= 0 && (index as usize) < s.len() {
                let byte = s.as_bytes()[index as usize];
                Value::String(String::from_utf8_lossy(&[byte]).into_owned())
            } else {
                Value::String(String::new())
            }
        }
        _ => Value::Null,
    })
}

pub fn execute_fetch_dim_r(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let container = vm.read_operand(&instr.op1)?;
    let element = fetch_dim(vm, &container, &instr.op2)?;
    vm.write_operand(&instr.result, element)
}

/// The silent variant used under isset()/empty(): same lookup, no
/// diagnostics on the miss path.
pub fn execute_fetch_dim_is(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    execute_fetch_dim_r(vm, instr)
}

/// Write-mode fetch: op1 is vivified into an array, the element is
/// created as Null if absent, and the vivified array is written back
/// into op1's slot.
pub fn execute_fetch_dim_w(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let mut handle = ensure_array(vm.take_operand(&instr.op1)?);
    let array = Rc::make_mut(&mut handle);
    let element = if instr.op2.is_unused() {
        array.append(Value::Null);
        Value::Null
    } else {
        let key = ArrayKey::from_value(&vm.read_operand(&instr.op2)?);
        match array.get(&key) {
            Some(value) => value.clone(),
            None => {
                array.set(key, Value::Null);
                Value::Null
            }
        }
    };
    vm.write_operand(&instr.op1, Value::Array(handle))?;
    vm.write_operand(&instr.result, element)
}

/// `op1[op2] = value`, where the value rides in the result operand.
pub fn execute_assign_dim(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.result)?;
    let mut handle = ensure_array(vm.take_operand(&instr.op1)?);
    let array = Rc::make_mut(&mut handle);
    if instr.op2.is_unused() {
        array.append(value);
    } else {
        let key = ArrayKey::from_value(&vm.read_operand(&instr.op2)?);
        array.set(key, value);
    }
    vm.write_operand(&instr.op1, Value::Array(handle))
}

/// `op1[op2] OP= value`, with the operator kind in extended_value.
pub fn execute_assign_dim_op(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let op = helpers::assign_op_from_extended(instr.extended_value)?;
    if instr.op2.is_unused() {
        return Err(VmError::MalformedInstruction(
            "compound dimension assignment requires a key".to_string(),
        ));
    }
    let operand = vm.read_operand(&instr.result)?;
    let key = ArrayKey::from_value(&vm.read_operand(&instr.op2)?);
    let mut handle = ensure_array(vm.take_operand(&instr.op1)?);
    let array = Rc::make_mut(&mut handle);
    let current = array.get(&key).cloned().unwrap_or(Value::Null);
    array.set(key, helpers::apply_assign_op(op, &current, &operand)?);
    vm.write_operand(&instr.op1, Value::Array(handle))
}

pub fn execute_unset_dim(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let container = vm.take_operand(&instr.op1)?;
    match container {
        Value::Array(mut handle) => {
            let key = ArrayKey::from_value(&vm.read_operand(&instr.op2)?);
            Rc::make_mut(&mut handle).unset(&key);
            vm.write_operand(&instr.op1, Value::Array(handle))
        }
        other => vm.write_operand(&instr.op1, other),
    }
}

/// isset/empty on an array element, string offset, or object property.
/// extended_value bit 0 selects the empty() variant.
pub fn execute_isset_isempty_dim_obj(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let container = vm.read_operand(&instr.op1)?;
    let want_empty = instr.extended_value & 1 != 0;
    let result = match &container {
        Value::Object(object) => {
            let name = vm.read_operand(&instr.op2)?.to_string_val();
            if want_empty {
                let value = super::property_access::read_property_quiet(vm, object, &name)?;
                !value.to_bool()
            } else {
                super::property_access::property_isset(vm, object, &name)?
            }
        }
        _ => {
            let element = fetch_dim(vm, &container, &instr.op2)?;
            let exists = match &container {
                Value::Array(array) => {
                    let key = ArrayKey::from_value(&vm.read_operand(&instr.op2)?);
                    array
                        .get(&key)
                        .map(|v| !matches!(v, Value::Null | Value::Undef))
                        .unwrap_or(false)
                }
                Value::String(s) => {
                    let index = vm.read_operand(&instr.op2)?.to_int();
                    index >= 0 && (index as usize) < s.len()
                }
                _ => false,
            };
            if want_empty {
                !(exists && element.to_bool())
            } else {
                exists
            }
        }
    };
    vm.write_operand(&instr.result, Value::Bool(result))
}

pub fn execute_count(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    let count = match value {
        Value::Array(array) => array.len() as i64,
        Value::Null | Value::Undef => 0,
        _ => 1,
    };
    vm.write_operand(&instr.result, Value::Integer(count))
}

/// Loose-equality membership: op1 is the needle, op2 the haystack.
pub fn execute_in_array(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let needle = vm.read_operand(&instr.op1)?;
    let haystack = vm.read_operand(&instr.op2)?;
    let found = match haystack {
        Value::Array(array) => array.contains(&needle),
        _ => false,
    };
    vm.write_operand(&instr.result, Value::Bool(found))
}

/// Key existence regardless of the stored value: op1 is the key.
pub fn execute_array_key_exists(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let key = vm.read_operand(&instr.op1)?;
    let array = vm.read_operand(&instr.op2)?;
    let exists = match array {
        Value::Array(array) => array.has_key(&ArrayKey::from_value(&key)),
        _ => false,
    };
    vm.write_operand(&instr.result, Value::Bool(exists))
}
