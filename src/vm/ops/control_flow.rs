use crate::vm::error::VmError;
use crate::vm::opcode::Instruction;
use crate::vm::Vm;

/// Jump targets are absolute instruction indices in the current frame.
pub fn execute_jmp(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    vm.current_frame_mut().jump_to(instr.op1.value as usize);
    Ok(())
}

pub fn execute_jmp_z(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let condition = vm.read_operand(&instr.op1)?;
    if !condition.to_bool() {
        vm.current_frame_mut().jump_to(instr.op2.value as usize);
    }
    Ok(())
}

pub fn execute_jmp_nz(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let condition = vm.read_operand(&instr.op1)?;
    if condition.to_bool() {
        vm.current_frame_mut().jump_to(instr.op2.value as usize);
    }
    Ok(())
}

/// Record the return value and step past the end of the instruction
/// list so the dispatch loop pops the frame.
pub fn execute_return(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    let frame = vm.current_frame_mut();
    frame.return_value = value;
    frame.finish();
    Ok(())
}
