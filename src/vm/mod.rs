//! Register-based bytecode virtual machine.
//!
//! The VM executes an already-assembled instruction stream against a
//! constant pool. Each instruction carries three tagged operands that a
//! uniform accessor resolves to values; handlers compute a result and
//! write it back through a uniform setter. Calls push frames and drive
//! the dispatch loop recursively until the callee returns.

pub mod bytecode;
pub mod class;
pub mod class_registration;
pub mod error;
pub mod execution;
pub mod frame;
pub mod opcode;

pub mod builtins;
pub(crate) mod helpers;
mod methods;
mod objects;
mod ops;

use std::collections::HashMap;
use std::sync::Arc;

use crate::runtime::Value;
use class::ClassEntry;
use error::VmError;
use frame::Frame;
use opcode::{CompiledFunction, Constant, Instruction, Opcode, Operand, OperandKind};

pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// The virtual machine. Owns its frame stack, constant pool, output
/// buffer, and registries; a single instance is single-threaded and runs
/// each entry function to completion.
pub struct Vm {
    /// Call frame stack, bounded by `max_depth`.
    frames: Vec<Frame>,
    /// Constant pool; read-only once execution starts.
    constants: Vec<Constant>,
    /// User-registered functions. Built-ins resolve through the bridge
    /// in `builtins` instead.
    functions: HashMap<String, Arc<CompiledFunction>>,
    /// Class and interface definitions.
    classes: HashMap<String, Arc<ClassEntry>>,
    /// Host-visible global variables.
    globals: HashMap<String, Value>,
    /// Accumulated Echo/print output.
    output: String,
    max_depth: usize,
    next_object_id: u64,
}

impl Vm {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Create a VM with a custom call-stack depth limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        let mut classes = HashMap::new();
        class_registration::register_builtin_classes(&mut classes);
        Self {
            frames: Vec::with_capacity(16),
            constants: Vec::new(),
            functions: HashMap::new(),
            classes,
            globals: HashMap::new(),
            output: String::new(),
            max_depth,
            next_object_id: 1,
        }
    }

    /// Replace the constant pool. Indices in subsequently executed
    /// instructions refer into this pool.
    pub fn set_constants(&mut self, constants: Vec<Constant>) {
        self.constants = constants;
    }

    /// Append a constant, returning its pool index.
    pub fn add_constant(&mut self, constant: Constant) -> u32 {
        self.constants.push(constant);
        (self.constants.len() - 1) as u32
    }

    /// Register a user-defined callable.
    pub fn register_function(&mut self, name: impl Into<String>, function: CompiledFunction) {
        self.functions.insert(name.into(), Arc::new(function));
    }

    /// Register a class or interface, running load-time assembly checks
    /// before the entry becomes visible.
    pub fn register_class(&mut self, class: ClassEntry) -> Result<(), VmError> {
        class_registration::validate_class(&self.classes, &class)?;
        self.classes.insert(class.name.clone(), Arc::new(class));
        Ok(())
    }

    pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    pub fn get_global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn get_output(&self) -> &str {
        &self.output
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Run an instruction stream as the entry function and return its
    /// return value. On error the VM is left as-is: output produced
    /// before the failure stays in the buffer.
    pub fn execute(&mut self, instructions: Vec<Instruction>) -> Result<Value, VmError> {
        let mut entry = CompiledFunction::new("{main}");
        entry.instructions = instructions;
        execution::execute_vm(self, Arc::new(entry))
    }

    /// Run a named registered function with the given arguments.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, VmError> {
        match self.get_function(name) {
            Some(function) => {
                let base_depth = self.frames.len();
                let result = execution::call_function(
                    self,
                    function,
                    args,
                    execution::FrameContext::default(),
                );
                if result.is_err() {
                    self.frames.truncate(base_depth);
                }
                result
            }
            None if builtins::is_builtin(name) => {
                builtins::call_builtin(name, &args, &mut self.output)
            }
            None => Err(VmError::UndefinedFunction(name.to_string())),
        }
    }

    // ---- operand access -------------------------------------------------

    pub(crate) fn constant_value(&self, index: u32) -> Result<Value, VmError> {
        self.constants
            .get(index as usize)
            .map(|c| c.to_value())
            .ok_or(VmError::ConstantOutOfRange(index))
    }

    /// Uniform operand read: constants resolve through the pool, slot
    /// kinds read the current frame, unused operands yield Null.
    pub(crate) fn read_operand(&self, operand: &Operand) -> Result<Value, VmError> {
        match operand.kind {
            OperandKind::Unused => Ok(Value::Null),
            OperandKind::Const => self.constant_value(operand.value),
            OperandKind::TmpVar | OperandKind::Var | OperandKind::CV => {
                Ok(self.current_frame().get_local(operand.value))
            }
        }
    }

    /// Like `read_operand`, but moves the value out of a slot so the
    /// caller can mutate a container without cloning its handle.
    pub(crate) fn take_operand(&mut self, operand: &Operand) -> Result<Value, VmError> {
        match operand.kind {
            OperandKind::Unused => Ok(Value::Null),
            OperandKind::Const => self.constant_value(operand.value),
            OperandKind::TmpVar | OperandKind::Var | OperandKind::CV => {
                Ok(self.current_frame_mut().take_local(operand.value))
            }
        }
    }

    /// Uniform result write. Writes to unused operands are dropped;
    /// a constant result operand is malformed bytecode.
    pub(crate) fn write_operand(&mut self, operand: &Operand, value: Value) -> Result<(), VmError> {
        match operand.kind {
            OperandKind::Unused => Ok(()),
            OperandKind::Const => Err(VmError::MalformedInstruction(
                "constant used as a result operand".to_string(),
            )),
            OperandKind::TmpVar | OperandKind::Var | OperandKind::CV => {
                self.current_frame_mut().set_local(operand.value, value);
                Ok(())
            }
        }
    }

    #[inline]
    pub(crate) fn current_frame(&self) -> &Frame {
        self.frames.last().expect("no call frame available")
    }

    #[inline]
    pub(crate) fn current_frame_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("no call frame available")
    }

    pub(crate) fn push_frame(&mut self, frame: Frame) -> Result<(), VmError> {
        if self.frames.len() >= self.max_depth {
            return Err(VmError::StackOverflow(self.max_depth));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub(crate) fn next_object_id(&mut self) -> u64 {
        let id = self.next_object_id;
        self.next_object_id += 1;
        id
    }

    /// Case-insensitive class lookup (class names are case-insensitive).
    pub(crate) fn find_class(&self, name: &str) -> Option<Arc<ClassEntry>> {
        if let Some(class) = self.classes.get(name) {
            return Some(class.clone());
        }
        self.classes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    /// Case-insensitive function lookup (function names are too).
    pub(crate) fn get_function(&self, name: &str) -> Option<Arc<CompiledFunction>> {
        if let Some(function) = self.functions.get(name) {
            return Some(function.clone());
        }
        self.functions
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    // ---- dispatch -------------------------------------------------------

    /// Execute a single instruction.
    pub(crate) fn execute_instruction(&mut self, instr: &Instruction) -> Result<(), VmError> {
        match instr.opcode {
            Opcode::Nop => Ok(()),

            // ==================== Arithmetic ====================
            Opcode::Add => ops::execute_add(self, instr),
            Opcode::Sub => ops::execute_sub(self, instr),
            Opcode::Mul => ops::execute_mul(self, instr),
            Opcode::Div => ops::execute_div(self, instr),
            Opcode::Mod => ops::execute_mod(self, instr),
            Opcode::Pow => ops::execute_pow(self, instr),
            Opcode::Negate => ops::execute_negate(self, instr),

            // ==================== Bitwise & Logical ====================
            Opcode::BwAnd => ops::execute_bw_and(self, instr),
            Opcode::BwOr => ops::execute_bw_or(self, instr),
            Opcode::BwXor => ops::execute_bw_xor(self, instr),
            Opcode::BwNot => ops::execute_bw_not(self, instr),
            Opcode::ShiftLeft => ops::execute_shift_left(self, instr),
            Opcode::ShiftRight => ops::execute_shift_right(self, instr),
            Opcode::BoolNot => ops::execute_bool_not(self, instr),

            // ==================== Comparison ====================
            Opcode::IsEqual => ops::execute_is_equal(self, instr),
            Opcode::IsNotEqual => ops::execute_is_not_equal(self, instr),
            Opcode::IsIdentical => ops::execute_is_identical(self, instr),
            Opcode::IsNotIdentical => ops::execute_is_not_identical(self, instr),
            Opcode::IsSmaller => ops::execute_is_smaller(self, instr),
            Opcode::IsSmallerOrEqual => ops::execute_is_smaller_or_equal(self, instr),
            Opcode::Spaceship => ops::execute_spaceship(self, instr),

            // ==================== Control Flow ====================
            Opcode::Jmp => ops::execute_jmp(self, instr),
            Opcode::JmpZ => ops::execute_jmp_z(self, instr),
            Opcode::JmpNZ => ops::execute_jmp_nz(self, instr),
            Opcode::Return => ops::execute_return(self, instr),

            // ==================== Constants & Locals ====================
            Opcode::FetchConstant => ops::execute_fetch_constant(self, instr),
            Opcode::Assign => ops::execute_assign(self, instr),
            Opcode::FetchR => ops::execute_fetch_r(self, instr),
            Opcode::Unset => ops::execute_unset(self, instr),
            Opcode::Isset => ops::execute_isset(self, instr),
            Opcode::Empty => ops::execute_empty(self, instr),

            // ==================== Strings & Output ====================
            Opcode::Concat => ops::execute_concat(self, instr),
            Opcode::FastConcat => ops::execute_fast_concat(self, instr),
            Opcode::Echo => ops::execute_echo(self, instr),

            // ==================== Increment / Decrement ====================
            Opcode::PreInc => ops::execute_pre_inc(self, instr),
            Opcode::PreDec => ops::execute_pre_dec(self, instr),
            Opcode::PostInc => ops::execute_post_inc(self, instr),
            Opcode::PostDec => ops::execute_post_dec(self, instr),

            // ==================== Arrays ====================
            Opcode::InitArray => ops::execute_init_array(self, instr),
            Opcode::AddArrayElement => ops::execute_add_array_element(self, instr),
            Opcode::FetchDimR => ops::execute_fetch_dim_r(self, instr),
            Opcode::FetchDimW => ops::execute_fetch_dim_w(self, instr),
            Opcode::FetchDimIs => ops::execute_fetch_dim_is(self, instr),
            Opcode::AssignDim => ops::execute_assign_dim(self, instr),
            Opcode::AssignDimOp => ops::execute_assign_dim_op(self, instr),
            Opcode::UnsetDim => ops::execute_unset_dim(self, instr),
            Opcode::IssetIsemptyDimObj => ops::execute_isset_isempty_dim_obj(self, instr),
            Opcode::Count => ops::execute_count(self, instr),
            Opcode::InArray => ops::execute_in_array(self, instr),
            Opcode::ArrayKeyExists => ops::execute_array_key_exists(self, instr),

            // ==================== Objects ====================
            Opcode::New => ops::execute_new(self, instr),
            Opcode::FetchObjR => ops::execute_fetch_obj_r(self, instr),
            Opcode::FetchObjW => ops::execute_fetch_obj_w(self, instr),
            Opcode::FetchObjIs => ops::execute_fetch_obj_is(self, instr),
            Opcode::AssignObj => ops::execute_assign_obj(self, instr),
            Opcode::AssignObjOp => ops::execute_assign_obj_op(self, instr),
            Opcode::UnsetObj => ops::execute_unset_obj(self, instr),
            Opcode::PreIncObj => ops::execute_pre_inc_obj(self, instr),
            Opcode::PreDecObj => ops::execute_pre_dec_obj(self, instr),
            Opcode::PostIncObj => ops::execute_post_inc_obj(self, instr),
            Opcode::PostDecObj => ops::execute_post_dec_obj(self, instr),
            Opcode::Clone => ops::execute_clone(self, instr),
            Opcode::Instanceof => ops::execute_instanceof(self, instr),
            Opcode::GetClass => ops::execute_get_class(self, instr),
            Opcode::FetchThis => ops::execute_fetch_this(self, instr),

            // ==================== Calls ====================
            Opcode::InitFcall => ops::execute_init_fcall(self, instr),
            Opcode::InitMethodCall => ops::execute_init_method_call(self, instr),
            Opcode::InitStaticMethodCall => ops::execute_init_static_method_call(self, instr),
            Opcode::SendVal => ops::execute_send_val(self, instr),
            Opcode::DoFcall => ops::execute_do_fcall(self, instr),
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
