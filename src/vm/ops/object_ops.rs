use crate::runtime::Value;
use crate::vm::class::MagicMethod;
use crate::vm::error::VmError;
use crate::vm::execution;
use crate::vm::opcode::Instruction;
use crate::vm::Vm;

/// Instantiate the class named by op1. The constructor is not invoked
/// here; the compiler emits InitMethodCall("__construct") + DoFcall
/// after the New.
pub fn execute_new(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let class_name = vm.read_operand(&instr.op1)?.to_string_val();
    let object = vm.instantiate_class(&class_name)?;
    vm.write_operand(&instr.result, Value::Object(object))
}

/// Shallow copy with a fresh id; `__clone` runs on the new instance.
pub fn execute_clone(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let source = match vm.read_operand(&instr.op1)? {
        Value::Object(object) => object,
        other => {
            return Err(VmError::NotAnObject(format!(
                "__clone method called on non-object ({})",
                other.get_type()
            )))
        }
    };
    let copy = vm.clone_instance(&source);
    let class_name = copy.borrow().class_name.clone();
    if let Some((magic_clone, declaring)) = vm.find_magic_in_chain(&class_name, MagicMethod::Clone)
    {
        execution::call_method_on(vm, &magic_clone, copy.clone(), declaring, Vec::new())?;
    }
    vm.write_operand(&instr.result, Value::Object(copy))
}

/// Non-objects are simply not instances of anything; never errors.
pub fn execute_instanceof(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    let target = vm.read_operand(&instr.op2)?.to_string_val();
    let result = match value {
        Value::Object(object) => {
            let class_name = object.borrow().class_name.clone();
            vm.is_instance_of(&class_name, &target)
        }
        _ => false,
    };
    vm.write_operand(&instr.result, Value::Bool(result))
}

pub fn execute_get_class(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.op1)?;
    let result = match value {
        Value::Object(object) => Value::String(object.borrow().class_name.clone()),
        _ => Value::Bool(false),
    };
    vm.write_operand(&instr.result, result)
}

pub fn execute_fetch_this(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let this = vm
        .current_frame()
        .this_object
        .clone()
        .ok_or(VmError::NoThisContext)?;
    vm.write_operand(&instr.result, Value::Object(this))
}
