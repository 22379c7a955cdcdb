use crate::runtime::Value;
use crate::vm::error::VmError;
use crate::vm::helpers;
use crate::vm::opcode::Instruction;
use crate::vm::Vm;

pub fn execute_bw_and(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, Value::Integer(left.to_int() & right.to_int()))
}

pub fn execute_bw_or(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, Value::Integer(left.to_int() | right.to_int()))
}

pub fn execute_bw_xor(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, Value::Integer(left.to_int() ^ right.to_int()))
}

pub fn execute_bw_not(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    vm.write_operand(&instr.result, Value::Integer(!value.to_int()))
}

pub fn execute_shift_left(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, helpers::shift_left_values(&left, &right))
}

pub fn execute_shift_right(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, helpers::shift_right_values(&left, &right))
}

pub fn execute_bool_not(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    vm.write_operand(&instr.result, Value::Bool(!value.to_bool()))
}
