use std::sync::Arc;

use crate::runtime::Value;
use crate::vm::class::{MagicMethod, MethodDef, Visibility};
use crate::vm::error::VmError;
use crate::vm::frame::{PendingCall, PendingTarget};
use crate::vm::opcode::Instruction;
use crate::vm::Vm;

/// A private method is callable from its declaring class, a protected
/// one from anywhere in the hierarchy. An invisible method falls back
/// to the `__call` path, like a missing one.
fn method_visible(vm: &Vm, def: &Arc<MethodDef>, declaring_class: &str) -> bool {
    let context = vm.current_frame().current_class.clone();
    match def.visibility {
        Visibility::Public => true,
        Visibility::Protected => match context {
            Some(ctx) => {
                vm.is_instance_of(&ctx, declaring_class) || vm.is_instance_of(declaring_class, &ctx)
            }
            None => false,
        },
        Visibility::Private => context
            .map(|ctx| ctx.eq_ignore_ascii_case(declaring_class))
            .unwrap_or(false),
    }
}

/// Begin assembling an instance method call on object op1.
pub fn execute_init_method_call(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let method_name = vm.read_operand(&instr.op2)?.to_string_val();
    let object = match vm.read_operand(&instr.op1)? {
        Value::Object(object) => object,
        other => {
            return Err(VmError::NotAnObject(format!(
                "Call to a member function {}() on {}",
                method_name,
                other.get_type()
            )))
        }
    };
    let class_name = object.borrow().class_name.clone();

    let target = match vm.find_method_in_chain(&class_name, &method_name) {
        Some((def, declaring_class)) if method_visible(vm, &def, &declaring_class) => {
            PendingTarget::Method {
                def,
                object,
                declaring_class,
                called_class: class_name,
            }
        }
        _ => match vm.find_magic_in_chain(&class_name, MagicMethod::Call) {
            Some((def, declaring_class)) => PendingTarget::MagicCall {
                def,
                object: Some(object),
                declaring_class,
                called_class: class_name,
                method_name,
            },
            None => {
                return Err(VmError::UndefinedMethod {
                    class: class_name,
                    method: method_name,
                })
            }
        },
    };
    vm.current_frame_mut().pending_call = Some(PendingCall::new(target, instr.extended_value));
    Ok(())
}

/// Begin assembling a static call. Op1 names the class; `self`, `parent`
/// and `static` resolve against the current frame. An instance method
/// reached this way still binds the caller's `$this` when it is an
/// instance of the resolved class (e.g. `parent::__construct`).
pub fn execute_init_static_method_call(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let raw_class = vm.read_operand(&instr.op1)?.to_string_val();
    let method_name = vm.read_operand(&instr.op2)?.to_string_val();
    let via_keyword = matches!(
        raw_class.to_ascii_lowercase().as_str(),
        "self" | "parent" | "static"
    );
    let class_name = vm.resolve_class_name(&raw_class)?;
    if vm.find_class(&class_name).is_none() {
        return Err(VmError::UndefinedClass(class_name));
    }

    // Late static binding: keyword resolutions keep the caller's called
    // class; a literal class name rebinds it.
    let called_class = if via_keyword {
        vm.current_frame()
            .called_class
            .clone()
            .unwrap_or_else(|| class_name.clone())
    } else {
        class_name.clone()
    };

    let target = match vm.find_method_in_chain(&class_name, &method_name) {
        Some((def, declaring_class)) if method_visible(vm, &def, &declaring_class) => {
            let this = vm.current_frame().this_object.clone().filter(|object| {
                let object_class = object.borrow().class_name.clone();
                !def.is_static && vm.is_instance_of(&object_class, &class_name)
            });
            match this {
                Some(object) => PendingTarget::Method {
                    def,
                    object,
                    declaring_class,
                    called_class,
                },
                None => PendingTarget::StaticMethod {
                    def,
                    declaring_class,
                    called_class,
                },
            }
        }
        _ => match vm.find_magic_in_chain(&class_name, MagicMethod::CallStatic) {
            Some((def, declaring_class)) => PendingTarget::MagicCall {
                def,
                object: None,
                declaring_class,
                called_class,
                method_name,
            },
            None => {
                return Err(VmError::UndefinedMethod {
                    class: class_name,
                    method: method_name,
                })
            }
        },
    };
    vm.current_frame_mut().pending_call = Some(PendingCall::new(target, instr.extended_value));
    Ok(())
}
