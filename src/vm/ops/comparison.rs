use crate::runtime::Value;
use crate::vm::error::VmError;
use crate::vm::opcode::Instruction;
use crate::vm::Vm;

pub fn execute_is_equal(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, Value::Bool(left.loose_equals(&right)))
}

pub fn execute_is_not_equal(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, Value::Bool(!left.loose_equals(&right)))
}

pub fn execute_is_identical(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, Value::Bool(left.identical(&right)))
}

pub fn execute_is_not_identical(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, Value::Bool(!left.identical(&right)))
}

pub fn execute_is_smaller(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, Value::Bool(left.compare(&right) < 0))
}

pub fn execute_is_smaller_or_equal(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, Value::Bool(left.compare(&right) <= 0))
}

pub fn execute_spaceship(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    vm.write_operand(&instr.result, Value::Integer(left.compare(&right)))
}
