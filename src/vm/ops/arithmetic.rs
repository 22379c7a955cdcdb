use crate::vm::error::VmError;
use crate::vm::helpers;
use crate::vm::opcode::Instruction;
use crate::vm::Vm;

pub fn execute_add(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    let result = helpers::add_values(&left, &right)?;
    vm.write_operand(&instr.result, result)
}

pub fn execute_sub(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    let result = helpers::sub_values(&left, &right)?;
    vm.write_operand(&instr.result, result)
}

pub fn execute_mul(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    let result = helpers::mul_values(&left, &right)?;
    vm.write_operand(&instr.result, result)
}

pub fn execute_div(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    let result = helpers::div_values(&left, &right)?;
    vm.write_operand(&instr.result, result)
}

pub fn execute_mod(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    let result = helpers::mod_values(&left, &right)?;
    vm.write_operand(&instr.result, result)
}

pub fn execute_pow(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let left = vm.read_operand(&instr.op1)?;
    let right = vm.read_operand(&instr.op2)?;
    let result = helpers::pow_values(&left, &right)?;
    vm.write_operand(&instr.result, result)
}

pub fn execute_negate(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    vm.write_operand(&instr.result, helpers::negate_value(&value))
}
