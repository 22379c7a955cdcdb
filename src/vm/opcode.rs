//! Bytecode instruction set for the HTVM virtual machine.
//!
//! The VM is register-based: every instruction carries three operands
//! (two sources and a result), each tagged with an operand kind that
//! says how its 32-bit value field is interpreted.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

use crate::runtime::Value;

/// Operation selector for a single dispatch step.
///
/// Operand roles are noted per opcode; operands not mentioned are unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0,

    // ==================== Arithmetic ====================
    /// result = op1 + op2 (Int when both are Int, Float otherwise)
    Add = 1,
    /// result = op1 - op2
    Sub = 2,
    /// result = op1 * op2
    Mul = 3,
    /// result = op1 / op2 (always Float; zero divisor is an error)
    Div = 4,
    /// result = op1 % op2 on integers (zero divisor is an error)
    Mod = 5,
    /// result = op1 ** op2 (Int when both are Int and the result is whole)
    Pow = 6,
    /// result = -op1
    Negate = 7,

    // ==================== Bitwise ====================
    /// result = op1 & op2 on integers
    BwAnd = 8,
    /// result = op1 | op2 on integers
    BwOr = 9,
    /// result = op1 ^ op2 on integers
    BwXor = 10,
    /// result = ~op1 on integers
    BwNot = 11,
    /// result = op1 << (op2 mod 64)
    ShiftLeft = 12,
    /// result = op1 >> (op2 mod 64)
    ShiftRight = 13,

    // ==================== Logical ====================
    /// result = !to_bool(op1)
    BoolNot = 14,

    // ==================== Comparison ====================
    /// result = op1 == op2 (loose)
    IsEqual = 15,
    /// result = op1 != op2 (loose)
    IsNotEqual = 16,
    /// result = op1 === op2 (strict)
    IsIdentical = 17,
    /// result = op1 !== op2 (strict)
    IsNotIdentical = 18,
    /// result = op1 < op2
    IsSmaller = 19,
    /// result = op1 <= op2
    IsSmallerOrEqual = 20,
    /// result = op1 <=> op2 as -1 / 0 / 1
    Spaceship = 21,

    // ==================== Control Flow ====================
    /// ip = op1.value (absolute index)
    Jmp = 22,
    /// if !to_bool(op1) then ip = op2.value
    JmpZ = 23,
    /// if to_bool(op1) then ip = op2.value
    JmpNZ = 24,

    // ==================== Constants & Locals ====================
    /// result = constant pool entry op1.value
    FetchConstant = 25,
    /// result = op2
    Assign = 26,
    /// result = op1
    FetchR = 27,
    /// op1 slot becomes Undef
    Unset = 28,
    /// result = op1 is neither Null nor Undef
    Isset = 29,
    /// result = !to_bool(op1)
    Empty = 30,

    // ==================== Strings ====================
    /// result = to_string(op1) . to_string(op2)
    Concat = 31,
    /// result = to_string(op1) . to_string(op2)
    FastConcat = 32,

    // ==================== Output ====================
    /// append to_string(op1) to the output buffer
    Echo = 33,

    // ==================== Increment / Decrement ====================
    /// op1 += 1; result (if used) = new value
    PreInc = 34,
    /// op1 -= 1; result (if used) = new value
    PreDec = 35,
    /// result (if used) = old value; op1 += 1
    PostInc = 36,
    /// result (if used) = old value; op1 -= 1
    PostDec = 37,

    // ==================== Arrays ====================
    /// result = fresh empty array (extended_value is a capacity hint)
    InitArray = 38,
    /// result[op2] = op1, or append op1 when op2 is unused
    AddArrayElement = 39,
    /// result = op1[op2] for read
    FetchDimR = 40,
    /// result = op1[op2] for write; auto-vivifies op1 and the element
    FetchDimW = 41,
    /// result = op1[op2], silent variant
    FetchDimIs = 42,
    /// op1[op2] = result-operand value; auto-vivifies op1
    AssignDim = 43,
    /// op1[op2] = op1[op2] OP result-operand value; OP in extended_value
    AssignDimOp = 44,
    /// delete key op2 from op1
    UnsetDim = 45,
    /// result = isset/empty of op1[op2]; extended_value 1 selects empty
    IssetIsemptyDimObj = 46,
    /// result = element count of op1
    Count = 47,
    /// result = loose membership of op1 in array op2
    InArray = 48,
    /// result = key op1 exists in array op2
    ArrayKeyExists = 49,

    // ==================== Objects ====================
    /// result = new instance of class named by op1
    New = 50,
    /// result = op1->op2 for read
    FetchObjR = 51,
    /// result = op1->op2 for write; auto-vivifies op1
    FetchObjW = 52,
    /// result = op1->op2, silent variant
    FetchObjIs = 53,
    /// op1->op2 = result-operand value; auto-vivifies op1
    AssignObj = 54,
    /// op1->op2 = op1->op2 OP result-operand value; OP in extended_value
    AssignObjOp = 55,
    /// delete property op2 from op1
    UnsetObj = 56,
    /// ++op1->op2; result (if used) = new value
    PreIncObj = 57,
    /// --op1->op2; result (if used) = new value
    PreDecObj = 58,
    /// op1->op2++; result (if used) = old value
    PostIncObj = 59,
    /// op1->op2--; result (if used) = old value
    PostDecObj = 60,
    /// result = shallow copy of op1 with a fresh object id
    Clone = 61,
    /// result = op1 instanceof class named by op2
    Instanceof = 62,
    /// result = class name of op1, or false for non-objects
    GetClass = 63,
    /// result = $this of the current frame
    FetchThis = 64,

    // ==================== Calls ====================
    /// begin a pending function call; op2 names the function,
    /// extended_value is the argument-count hint
    InitFcall = 65,
    /// begin a pending method call on object op1; op2 names the method
    InitMethodCall = 66,
    /// begin a pending static call; op1 names the class (or
    /// self/parent/static), op2 names the method
    InitStaticMethodCall = 67,
    /// append op1 to the pending call's parameters
    SendVal = 68,
    /// run the pending call; result = the callee's return value
    DoFcall = 69,
    /// set the frame's return value to op1 and leave the frame
    Return = 70,
}

/// How an operand's value field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum OperandKind {
    /// No operand; reads yield Null, writes are dropped.
    Unused = 0,
    /// Index into the constant pool.
    Const = 1,
    /// Temporary scratch slot in the frame.
    TmpVar = 2,
    /// Frame slot.
    Var = 4,
    /// Compiled variable: a named local resolved to a frame slot.
    CV = 8,
}

/// A single tagged operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub kind: OperandKind,
    pub value: u32,
}

impl Operand {
    pub fn unused() -> Self {
        Self {
            kind: OperandKind::Unused,
            value: 0,
        }
    }

    pub fn constant(index: u32) -> Self {
        Self {
            kind: OperandKind::Const,
            value: index,
        }
    }

    pub fn tmp(slot: u32) -> Self {
        Self {
            kind: OperandKind::TmpVar,
            value: slot,
        }
    }

    pub fn var(slot: u32) -> Self {
        Self {
            kind: OperandKind::Var,
            value: slot,
        }
    }

    pub fn cv(slot: u32) -> Self {
        Self {
            kind: OperandKind::CV,
            value: slot,
        }
    }

    pub fn is_unused(&self) -> bool {
        self.kind == OperandKind::Unused
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OperandKind::Unused => write!(f, "-"),
            OperandKind::Const => write!(f, "c{}", self.value),
            OperandKind::TmpVar => write!(f, "t{}", self.value),
            OperandKind::Var => write!(f, "v{}", self.value),
            OperandKind::CV => write!(f, "cv{}", self.value),
        }
    }
}

/// One fixed-size instruction record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub op1: Operand,
    pub op2: Operand,
    pub result: Operand,
    pub extended_value: u32,
    pub lineno: u32,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            op1: Operand::unused(),
            op2: Operand::unused(),
            result: Operand::unused(),
            extended_value: 0,
            lineno: 0,
        }
    }

    pub fn with_operands(opcode: Opcode, op1: Operand, op2: Operand, result: Operand) -> Self {
        Self {
            opcode,
            op1,
            op2,
            result,
            extended_value: 0,
            lineno: 0,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20} {:>6} {:>6} {:>6}",
            format!("{:?}", self.opcode),
            self.op1.to_string(),
            self.op2.to_string(),
            self.result.to_string()
        )?;
        if self.extended_value != 0 {
            write!(f, " ext={}", self.extended_value)?;
        }
        Ok(())
    }
}

/// Operator kind carried in `extended_value` by AssignDimOp / AssignObjOp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum AssignOpKind {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Div = 3,
    Mod = 4,
    ShiftLeft = 5,
    ShiftRight = 6,
    Concat = 7,
    BwOr = 8,
    BwAnd = 9,
    BwXor = 10,
    Pow = 11,
}

/// Compiled function representation: the unit a frame executes.
#[derive(Debug, Clone)]
pub struct CompiledFunction {
    pub name: String,
    /// Parameters land in slots `0..num_params` when the frame is built.
    pub num_params: u8,
    /// Slot count hint; frames grow past it on demand.
    pub num_locals: u16,
    pub instructions: Vec<Instruction>,
}

impl CompiledFunction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_params: 0,
            num_locals: 0,
            instructions: Vec::new(),
        }
    }
}

/// Raw literal in the constant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Constant {
    pub fn to_value(&self) -> Value {
        match self {
            Constant::Null => Value::Null,
            Constant::Bool(b) => Value::Bool(*b),
            Constant::Int(n) => Value::Integer(*n),
            Constant::Float(f) => Value::Float(*f),
            Constant::String(s) => Value::String(s.clone()),
        }
    }

    /// Composite values cannot live in the pool.
    pub fn from_value(value: &Value) -> Option<Constant> {
        match value {
            Value::Null | Value::Undef => Some(Constant::Null),
            Value::Bool(b) => Some(Constant::Bool(*b)),
            Value::Integer(n) => Some(Constant::Int(*n)),
            Value::Float(f) => Some(Constant::Float(*f)),
            Value::String(s) => Some(Constant::String(s.clone())),
            Value::Array(_) | Value::Object(_) | Value::Resource(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn opcode_bytes_round_trip() {
        for op in [Opcode::Nop, Opcode::Add, Opcode::DoFcall, Opcode::Return] {
            let byte: u8 = op.into();
            assert_eq!(Opcode::try_from(byte).unwrap(), op);
        }
        assert!(Opcode::try_from(0xffu8).is_err());
    }

    #[test]
    fn operand_kinds_use_flag_values() {
        assert_eq!(u8::from(OperandKind::Var), 4);
        assert_eq!(u8::from(OperandKind::CV), 8);
        assert!(OperandKind::try_from(3u8).is_err());
    }

    #[test]
    fn constants_round_trip_through_values() {
        for c in [
            Constant::Null,
            Constant::Bool(true),
            Constant::Int(-42),
            Constant::Float(2.5),
            Constant::String("hello".into()),
        ] {
            assert_eq!(Constant::from_value(&c.to_value()), Some(c));
        }
        assert_eq!(Constant::from_value(&Value::empty_array()), None);
    }
}
