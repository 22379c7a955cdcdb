//! HTVM: a register-based bytecode virtual machine for a PHP-lineage
//! scripting language.
//!
//! The crate consumes an already-assembled instruction stream plus a
//! constant pool (a parser/compiler is an external collaborator) and
//! provides the dynamic value model, the frame-based executor, and the
//! built-in function surface.
//!
//! ```
//! use htvm::{Constant, Instruction, Opcode, Operand, Value, Vm};
//!
//! let mut vm = Vm::new();
//! vm.set_constants(vec![Constant::Int(10), Constant::Int(3)]);
//! let program = vec![
//!     Instruction::with_operands(Opcode::Add, Operand::constant(0), Operand::constant(1), Operand::cv(0)),
//!     Instruction::with_operands(Opcode::Echo, Operand::cv(0), Operand::unused(), Operand::unused()),
//! ];
//! vm.execute(program).unwrap();
//! assert_eq!(vm.get_output(), "13");
//! ```

pub mod runtime;
pub mod vm;

pub use runtime::{ArrayKey, ObjectInstance, PhpArray, PropertySlot, ResourceHandle, Value};
pub use vm::bytecode::{decode_unit, encode_unit, BytecodeUnit};
pub use vm::class::{ClassEntry, MagicMethod, MethodDef, PropertyDef, Visibility};
pub use vm::error::VmError;
pub use vm::opcode::{
    AssignOpKind, CompiledFunction, Constant, Instruction, Opcode, Operand, OperandKind,
};
pub use vm::Vm;
