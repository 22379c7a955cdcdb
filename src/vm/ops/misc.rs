use crate::runtime::Value;
use crate::vm::error::VmError;
use crate::vm::opcode::Instruction;
use crate::vm::Vm;

pub fn execute_fetch_constant(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.constant_value(instr.op1.value)?;
    vm.write_operand(&instr.result, value)
}

pub fn execute_assign(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, value)
}

pub fn execute_fetch_r(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    vm.write_operand(&instr.result, value)
}

/// The slot reverts to the never-initialized state.
pub fn execute_unset(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    vm.write_operand(&instr.op1, Value::Undef)
}

pub fn execute_isset(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    let set = !matches!(value, Value::Null | Value::Undef);
    vm.write_operand(&instr.result, Value::Bool(set))
}

pub fn execute_empty(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    vm.write_operand(&instr.result, Value::Bool(!value.to_bool()))
}

pub fn execute_echo(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    vm.output.push_str(&value.to_string_val());
    Ok(())
}

pub(crate) fn increment(value: &Value) -> Value {
    match value {
        Value::Integer(n) => match n.checked_add(1) {
            Some(next) => Value::Integer(next),
            None => Value::Float(*n as f64 + 1.0),
        },
        Value::Float(f) => Value::Float(f + 1.0),
        Value::Null | Value::Undef => Value::Integer(1),
        other => Value::Integer(other.to_int().saturating_add(1)),
    }
}

pub(crate) fn decrement(value: &Value) -> Value {
    match value {
        Value::Integer(n) => match n.checked_sub(1) {
            Some(next) => Value::Integer(next),
            None => Value::Float(*n as f64 - 1.0),
        },
        Value::Float(f) => Value::Float(f - 1.0),
        // Decrementing null leaves it null.
        Value::Null | Value::Undef => Value::Null,
        other => Value::Integer(other.to_int().saturating_sub(1)),
    }
}

pub fn execute_pre_inc(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    let new_value = increment(&value);
    vm.write_operand(&instr.op1, new_value.clone())?;
    vm.write_operand(&instr.result, new_value)
}

pub fn execute_pre_dec(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    let new_value = decrement(&value);
    vm.write_operand(&instr.op1, new_value.clone())?;
    vm.write_operand(&instr.result, new_value)
}

pub fn execute_post_inc(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    vm.write_operand(&instr.op1, increment(&value))?;
    vm.write_operand(&instr.result, value)
}

pub fn execute_post_dec(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    vm.write_operand(&instr.op1, decrement(&value))?;
    vm.write_operand(&instr.result, value)
}
