use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::runtime::{ObjectInstance, PropertySlot, Value};
use crate::vm::class::{MagicMethod, MethodDef, Visibility};
use crate::vm::error::VmError;
use crate::vm::execution;
use crate::vm::helpers;
use crate::vm::opcode::Instruction;
use crate::vm::Vm;

/// Visibility check against the caller's lexical class context.
/// An inaccessible property behaves like a missing one, which routes
/// the access through the magic-method path.
fn is_visible(vm: &Vm, visibility: Visibility, object_class: &str) -> bool {
    let context = vm.current_frame().current_class.clone();
    match visibility {
        Visibility::Public => true,
        Visibility::Protected => match context {
            Some(ctx) => {
                vm.is_instance_of(&ctx, object_class) || vm.is_instance_of(object_class, &ctx)
            }
            None => false,
        },
        Visibility::Private => context
            .map(|ctx| ctx.eq_ignore_ascii_case(object_class))
            .unwrap_or(false),
    }
}

/// Accessor hook lookup: the property declaration names the hook method.
fn find_hook(
    vm: &Vm,
    object: &Rc<RefCell<ObjectInstance>>,
    name: &str,
    get: bool,
) -> Option<(Arc<MethodDef>, String)> {
    let class_name = object.borrow().class_name.clone();
    let hook_name = {
        let obj = object.borrow();
        let def = obj.class.get_property_def(name)?;
        if get {
            def.get_hook.clone()?
        } else {
            def.set_hook.clone()?
        }
    };
    vm.find_method_in_chain(&class_name, &hook_name)
}

/// Property read honoring hooks and `__get`. Missing or inaccessible
/// properties yield Null; never errors on non-missing lookups.
pub(crate) fn read_property_quiet(
    vm: &mut Vm,
    object: &Rc<RefCell<ObjectInstance>>,
    name: &str,
) -> Result<Value, VmError> {
    if let Some((hook, declaring)) = find_hook(vm, object, name, true) {
        return execution::call_method_on(vm, &hook, object.clone(), declaring, Vec::new());
    }

    let direct = {
        let obj = object.borrow();
        match obj.get_property(name) {
            Some(slot) if is_visible(vm, slot.visibility, &obj.class_name) => {
                Some(slot.value.clone())
            }
            _ => None,
        }
    };
    if let Some(value) = direct {
        return Ok(value);
    }

    let class_name = object.borrow().class_name.clone();
    if let Some((magic_get, declaring)) = vm.find_magic_in_chain(&class_name, MagicMethod::Get) {
        return execution::call_method_on(
            vm,
            &magic_get,
            object.clone(),
            declaring,
            vec![Value::String(name.to_string())],
        );
    }
    Ok(Value::Null)
}

/// isset() on a property: `__isset` wins when the primary lookup fails.
pub(crate) fn property_isset(
    vm: &mut Vm,
    object: &Rc<RefCell<ObjectInstance>>,
    name: &str,
) -> Result<bool, VmError> {
    let direct = {
        let obj = object.borrow();
        match obj.get_property(name) {
            Some(slot) if is_visible(vm, slot.visibility, &obj.class_name) => {
                Some(!matches!(slot.value, Value::Null | Value::Undef))
            }
            _ => None,
        }
    };
    if let Some(set) = direct {
        return Ok(set);
    }

    let class_name = object.borrow().class_name.clone();
    if let Some((magic_isset, declaring)) = vm.find_magic_in_chain(&class_name, MagicMethod::Isset)
    {
        let result = execution::call_method_on(
            vm,
            &magic_isset,
            object.clone(),
            declaring,
            vec![Value::String(name.to_string())],
        )?;
        return Ok(result.to_bool());
    }
    Ok(false)
}

/// Property write honoring hooks and `__set`. When both miss, the
/// property is created as public.
pub(crate) fn write_property(
    vm: &mut Vm,
    object: &Rc<RefCell<ObjectInstance>>,
    name: &str,
    value: Value,
) -> Result<(), VmError> {
    if let Some((hook, declaring)) = find_hook(vm, object, name, false) {
        execution::call_method_on(vm, &hook, object.clone(), declaring, vec![value])?;
        return Ok(());
    }

    let wrote = {
        let mut obj = object.borrow_mut();
        let class_name = obj.class_name.clone();
        match obj.get_property_mut(name) {
            Some(slot) => {
                if is_visible(vm, slot.visibility, &class_name) {
                    slot.value = value.clone();
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    };
    if wrote {
        return Ok(());
    }

    let (exists, class_name) = {
        let obj = object.borrow();
        (obj.get_property(name).is_some(), obj.class_name.clone())
    };
    if let Some((magic_set, declaring)) = vm.find_magic_in_chain(&class_name, MagicMethod::Set) {
        execution::call_method_on(
            vm,
            &magic_set,
            object.clone(),
            declaring,
            vec![Value::String(name.to_string()), value],
        )?;
        return Ok(());
    }
    if !exists {
        object
            .borrow_mut()
            .set_property(name, PropertySlot::public(value));
    }
    Ok(())
}

/// Reads op1 as an object, auto-vivifying the slot through `vivify`
/// when it does not hold one.
fn object_operand(
    vm: &mut Vm,
    instr: &Instruction,
    vivify: bool,
) -> Result<Option<Rc<RefCell<ObjectInstance>>>, VmError> {
    match vm.read_operand(&instr.op1)? {
        Value::Object(object) => Ok(Some(object)),
        _ if vivify => {
            let fresh = vm.vivify_std_object()?;
            vm.write_operand(&instr.op1, fresh.clone())?;
            match fresh {
                Value::Object(object) => Ok(Some(object)),
                _ => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

/// Read-mode property fetch: non-objects yield Null and never error.
pub fn execute_fetch_obj_r(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let name = vm.read_operand(&instr.op2)?.to_string_val();
    let value = match object_operand(vm, instr, false)? {
        Some(object) => read_property_quiet(vm, &object, &name)?,
        None => Value::Null,
    };
    vm.write_operand(&instr.result, value)
}

/// The silent variant used under isset()/empty().
pub fn execute_fetch_obj_is(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    execute_fetch_obj_r(vm, instr)
}

/// Write-mode fetch: vivifies op1 and creates the property as a public
/// Null slot when absent.
pub fn execute_fetch_obj_w(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let name = vm.read_operand(&instr.op2)?.to_string_val();
    let object = match object_operand(vm, instr, true)? {
        Some(object) => object,
        None => return vm.write_operand(&instr.result, Value::Null),
    };
    let value = {
        let mut obj = object.borrow_mut();
        match obj.get_property(&name) {
            Some(slot) => slot.value.clone(),
            None => {
                obj.set_property(&name, PropertySlot::public(Value::Null));
                Value::Null
            }
        }
    };
    vm.write_operand(&instr.result, value)
}

/// `op1->op2 = value`, where the value rides in the result operand.
pub fn execute_assign_obj(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let value = vm.read_operand(&instr.result)?;
    let name = vm.read_operand(&instr.op2)?.to_string_val();
    if let Some(object) = object_operand(vm, instr, true)? {
        write_property(vm, &object, &name, value)?;
    }
    Ok(())
}

/// `op1->op2 OP= value`, with the operator kind in extended_value.
/// Bypasses magic methods: the slot is adjusted directly.
pub fn execute_assign_obj_op(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let op = helpers::assign_op_from_extended(instr.extended_value)?;
    let operand = vm.read_operand(&instr.result)?;
    let name = vm.read_operand(&instr.op2)?.to_string_val();
    if let Some(object) = object_operand(vm, instr, true)? {
        let current = object
            .borrow()
            .get_property(&name)
            .map(|slot| slot.value.clone())
            .unwrap_or(Value::Null);
        let new_value = helpers::apply_assign_op(op, &current, &operand)?;
        let mut obj = object.borrow_mut();
        match obj.get_property_mut(&name) {
            Some(slot) => slot.value = new_value,
            None => obj.set_property(&name, PropertySlot::public(new_value)),
        }
    }
    Ok(())
}

pub fn execute_unset_obj(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    let name = vm.read_operand(&instr.op2)?.to_string_val();
    let object = match object_operand(vm, instr, false)? {
        Some(object) => object,
        None => return Ok(()),
    };
    let removed = object.borrow_mut().remove_property(&name);
    if !removed {
        let class_name = object.borrow().class_name.clone();
        if let Some((magic_unset, declaring)) =
            vm.find_magic_in_chain(&class_name, MagicMethod::Unset)
        {
            execution::call_method_on(
                vm,
                &magic_unset,
                object.clone(),
                declaring,
                vec![Value::String(name)],
            )?;
        }
    }
    Ok(())
}

/// Shared engine for the four property step opcodes. A missing property
/// counts as integer 0 before the adjustment.
fn step_property(
    vm: &mut Vm,
    instr: &Instruction,
    increment: bool,
    return_new: bool,
) -> Result<(), VmError> {
    let name = vm.read_operand(&instr.op2)?.to_string_val();
    let object = match object_operand(vm, instr, false)? {
        Some(object) => object,
        None => {
            return Err(VmError::NotAnObject(format!(
                "Attempt to increment/decrement property \"{}\" on non-object",
                name
            )))
        }
    };
    let old_value = object
        .borrow()
        .get_property(&name)
        .map(|slot| slot.value.clone())
        .unwrap_or(Value::Integer(0));
    let new_value = if increment {
        super::misc::increment(&old_value)
    } else {
        super::misc::decrement(&old_value)
    };
    {
        let mut obj = object.borrow_mut();
        match obj.get_property_mut(&name) {
            Some(slot) => slot.value = new_value.clone(),
            None => obj.set_property(&name, PropertySlot::public(new_value.clone())),
        }
    }
    let reported = if return_new { new_value } else { old_value };
    vm.write_operand(&instr.result, reported)
}

pub fn execute_pre_inc_obj(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    step_property(vm, instr, true, true)
}

pub fn execute_pre_dec_obj(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    step_property(vm, instr, false, true)
}

pub fn execute_post_inc_obj(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    step_property(vm, instr, true, false)
}

pub fn execute_post_dec_obj(vm: &mut Vm, instr: &Instruction) -> Result<(), VmError> {
    step_property(vm, instr, false, false)
}
