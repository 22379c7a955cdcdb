use crate::vm::builtins;
use crate::vm::error::VmError;
use crate::vm::execution;
use crate::vm::frame::{PendingCall, PendingTarget};
use crate::vm::opcode::Instruction;
use crate::vm::Vm;

/// Begin assembling a function call. Resolution happens here: an
/// unknown name fails before any argument is sent.
pub fn execute_init_fcall(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let name = vm.read_operand(&instr.op2)?.to_string_val();
    let target = match vm.get_function(&name) {
        Some(function) => PendingTarget::Function(function),
        None if builtins::is_builtin(&name) => PendingTarget::Builtin(name),
        None => return Err(VmError::UndefinedFunction(name)),
    };
    vm.current_frame_mut().pending_call = Some(PendingCall::new(target, instr.extended_value));
    Ok(())
}

/// Append an argument to the pending call.
pub fn execute_send_val(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    match vm.current_frame_mut().pending_call.as_mut() {
        Some(pending) => {
            pending.args.push(value);
            Ok(())
        }
        None => Err(VmError::MalformedInstruction(
            "SendVal with no pending call".to_string(),
        )),
    }
}

/// Consume the pending call: push the callee frame (built-ins dispatch
/// directly), run it to completion, and plumb the return value into the
/// caller's result operand.
pub fn execute_do_fcall(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let pending = match vm.current_frame_mut().pending_call.take() {
        Some(pending) => pending,
        None => {
            return Err(VmError::MalformedInstruction(
                "DoFcall with no pending call".to_string(),
            ))
        }
    };
    let return_value = execution::run_pending(vm, pending)?;
    vm.write_operand(&instr.result, return_value)
}
