//! Call frame management for the bytecode VM.
//!
//! A frame owns its local slot array. CV, Var, and TmpVar operands all
//! index the same array; there is no separate operand stack.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::runtime::{ObjectInstance, Value};
use crate::vm::class::MethodDef;
use crate::vm::opcode::CompiledFunction;

/// A call frame represents a single function or method invocation.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The compiled function being executed.
    pub function: Arc<CompiledFunction>,
    /// Instruction pointer (index into the instruction list).
    pub ip: usize,
    /// Local slots, indexed by operand value. Grows on demand.
    pub locals: Vec<Value>,
    /// Value produced by Return; Null until then.
    pub return_value: Value,
    /// Depth of the frame stack when this frame was pushed.
    pub base_pointer: usize,
    /// `$this` for method frames.
    pub this_object: Option<Rc<RefCell<ObjectInstance>>>,
    /// Lexical class scope: the class the running method was defined in.
    pub current_class: Option<String>,
    /// Late-static-binding scope: the class the call was made through.
    pub called_class: Option<String>,
    /// Call-assembly state built by Init* / SendVal, consumed by DoFcall.
    pub pending_call: Option<PendingCall>,
}

impl Frame {
    pub fn new(function: Arc<CompiledFunction>, base_pointer: usize) -> Self {
        let num_locals = function.num_locals as usize;
        Self {
            function,
            ip: 0,
            locals: vec![Value::Undef; num_locals],
            return_value: Value::Null,
            base_pointer,
            this_object: None,
            current_class: None,
            called_class: None,
            pending_call: None,
        }
    }

    /// Read a slot. Out-of-range reads yield Null and never panic.
    pub fn get_local(&self, slot: u32) -> Value {
        self.locals
            .get(slot as usize)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Take a slot's value out, leaving Undef behind. Used by handlers
    /// that mutate a container in place before writing it back.
    pub fn take_local(&mut self, slot: u32) -> Value {
        match self.locals.get_mut(slot as usize) {
            Some(v) => std::mem::replace(v, Value::Undef),
            None => Value::Null,
        }
    }

    /// Write a slot, growing the array to the maximum of the requested
    /// index + 1 and twice the current length.
    pub fn set_local(&mut self, slot: u32, value: Value) {
        let index = slot as usize;
        if index >= self.locals.len() {
            let new_len = (index + 1).max(self.locals.len() * 2);
            self.locals.resize(new_len, Value::Undef);
        }
        self.locals[index] = value;
    }

    #[inline]
    pub fn jump_to(&mut self, target: usize) {
        self.ip = target;
    }

    /// Advance past the end of the instruction list so the dispatch loop
    /// pops this frame.
    pub fn finish(&mut self) {
        self.ip = self.function.instructions.len();
    }
}

/// The callee a pending call resolved to.
#[derive(Debug, Clone)]
pub enum PendingTarget {
    /// A user-registered compiled function.
    Function(Arc<CompiledFunction>),
    /// A built-in, dispatched without a frame.
    Builtin(String),
    /// An instance method.
    Method {
        def: Arc<MethodDef>,
        object: Rc<RefCell<ObjectInstance>>,
        declaring_class: String,
        called_class: String,
    },
    /// A static method.
    StaticMethod {
        def: Arc<MethodDef>,
        declaring_class: String,
        called_class: String,
    },
    /// A __call / __callStatic trampoline: the collected arguments are
    /// packed into (method name, argument array) at DoFcall time.
    MagicCall {
        def: Arc<MethodDef>,
        object: Option<Rc<RefCell<ObjectInstance>>>,
        declaring_class: String,
        called_class: String,
        method_name: String,
    },
}

/// Explicit call-builder value: created by Init*, grown by SendVal,
/// consumed by DoFcall. A SendVal or DoFcall without one is malformed
/// bytecode.
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub target: PendingTarget,
    pub args: Vec<Value>,
}

impl PendingCall {
    pub fn new(target: PendingTarget, argc_hint: u32) -> Self {
        Self {
            target,
            args: Vec::with_capacity(argc_hint as usize),
        }
    }
}
