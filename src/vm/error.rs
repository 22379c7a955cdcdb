//! VM error taxonomy.
//!
//! Every variant is an error kind; the `Display` rendering is the
//! user-facing message. Handler errors terminate dispatch immediately and
//! unwind out of `execute` — there is no intra-VM recovery.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Modulo by zero")]
    ModuloByZero,

    #[error("Call to undefined function {0}()")]
    UndefinedFunction(String),

    #[error("Call to undefined method {class}::{method}()")]
    UndefinedMethod { class: String, method: String },

    #[error("Class \"{0}\" not found")]
    UndefinedClass(String),

    #[error("Cannot instantiate abstract class {0}")]
    CannotInstantiateAbstract(String),

    #[error("Cannot instantiate interface {0}")]
    CannotInstantiateInterface(String),

    #[error("Class {child} cannot extend final class {parent}")]
    CannotExtendFinal { child: String, parent: String },

    #[error("Cannot override final method {class}::{method}()")]
    CannotOverrideFinal { class: String, method: String },

    #[error("Class {class} contains abstract method {interface}::{method} and must implement it")]
    InterfaceMethodMissing {
        class: String,
        interface: String,
        method: String,
    },

    #[error("Using $this when not in object context")]
    NoThisContext,

    #[error("{0}")]
    NotAnObject(String),

    #[error("Maximum call stack depth of {0} exceeded")]
    StackOverflow(usize),

    #[error("Unknown opcode byte 0x{0:02x}")]
    UnknownOpcode(u8),

    #[error("Malformed instruction: {0}")]
    MalformedInstruction(String),

    #[error("Constant index {0} out of range")]
    ConstantOutOfRange(u32),

    #[error("{0}")]
    InvalidArgument(String),
}
