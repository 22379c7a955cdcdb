//! VM execution loop.
//!
//! `run_frame` drives the top frame: fetch, advance, dispatch. Calls
//! push a callee frame and re-enter the loop recursively, so a callee
//! runs to completion before the caller observes its return value.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::runtime::{ObjectInstance, PhpArray, Value};
use crate::vm::builtins;
use crate::vm::error::VmError;
use crate::vm::frame::{Frame, PendingCall, PendingTarget};
use crate::vm::opcode::CompiledFunction;
use crate::vm::Vm;

pub fn execute_vm(vm: &mut Vm, function: Arc<CompiledFunction>) -> Result<Value, VmError> {
    let base_depth = vm.frames.len();
    vm.push_frame(Frame::new(function, base_depth))?;
    let result = run_frame(vm);
    if result.is_err() {
        // No intra-VM recovery: drop whatever frames the failed run left
        // behind so the embedder can keep using the instance.
        vm.frames.truncate(base_depth);
    }
    result
}

/// Run the top frame until its instruction pointer passes the end of the
/// instruction list, then pop it and yield its return value.
pub(crate) fn run_frame(vm: &mut Vm) -> Result<Value, VmError> {
    loop {
        let frame = vm.current_frame();
        if frame.ip >= frame.function.instructions.len() {
            break;
        }
        let instr = frame.function.instructions[frame.ip];
        vm.current_frame_mut().ip += 1;
        vm.execute_instruction(&instr)?;
    }
    let frame = vm.frames.pop().expect("no call frame available");
    Ok(frame.return_value)
}

/// Object/class context a callee frame starts with.
#[derive(Debug, Clone, Default)]
pub(crate) struct FrameContext {
    pub this_object: Option<Rc<RefCell<ObjectInstance>>>,
    pub current_class: Option<String>,
    pub called_class: Option<String>,
}

/// Build a frame for `function`, copy the arguments into its first
/// `num_params` locals, and run it to completion.
pub(crate) fn call_function(
    vm: &mut Vm,
    function: Arc<CompiledFunction>,
    args: Vec<Value>,
    ctx: FrameContext,
) -> Result<Value, VmError> {
    let num_params = function.num_params as usize;
    let mut frame = Frame::new(function, vm.frames.len());
    frame.this_object = ctx.this_object;
    frame.current_class = ctx.current_class;
    frame.called_class = ctx.called_class;
    for (slot, arg) in args.into_iter().take(num_params).enumerate() {
        frame.set_local(slot as u32, arg);
    }
    vm.push_frame(frame)?;
    run_frame(vm)
}

/// Consume a pending call. Built-ins dispatch directly, bypassing frame
/// creation; everything else becomes a callee frame.
pub(crate) fn run_pending(vm: &mut Vm, pending: PendingCall) -> Result<Value, VmError> {
    let PendingCall { target, args } = pending;
    match target {
        PendingTarget::Builtin(name) => builtins::call_builtin(&name, &args, &mut vm.output),
        PendingTarget::Function(function) => {
            call_function(vm, function, args, FrameContext::default())
        }
        PendingTarget::Method {
            def,
            object,
            declaring_class,
            called_class,
        } => call_function(
            vm,
            def.body.clone(),
            args,
            FrameContext {
                this_object: Some(object),
                current_class: Some(declaring_class),
                called_class: Some(called_class),
            },
        ),
        PendingTarget::StaticMethod {
            def,
            declaring_class,
            called_class,
        } => call_function(
            vm,
            def.body.clone(),
            args,
            FrameContext {
                this_object: None,
                current_class: Some(declaring_class),
                called_class: Some(called_class),
            },
        ),
        PendingTarget::MagicCall {
            def,
            object,
            declaring_class,
            called_class,
            method_name,
        } => {
            // __call / __callStatic receive (name, argument array).
            let mut packed = PhpArray::with_capacity(args.len());
            for arg in args {
                packed.append(arg);
            }
            call_function(
                vm,
                def.body.clone(),
                vec![Value::String(method_name), Value::array(packed)],
                FrameContext {
                    this_object: object,
                    current_class: Some(declaring_class),
                    called_class: Some(called_class),
                },
            )
        }
    }
}

/// Invoke a method on an object immediately. Used for magic methods
/// (`__get`, `__set`, `__clone`, ...) scheduled from inside a handler.
pub(crate) fn call_method_on(
    vm: &mut Vm,
    def: &Arc<crate::vm::class::MethodDef>,
    object: Rc<RefCell<ObjectInstance>>,
    declaring_class: String,
    args: Vec<Value>,
) -> Result<Value, VmError> {
    let called_class = object.borrow().class_name.clone();
    call_function(
        vm,
        def.body.clone(),
        args,
        FrameContext {
            this_object: Some(object),
            current_class: Some(declaring_class),
            called_class: Some(called_class),
        },
    )
}
