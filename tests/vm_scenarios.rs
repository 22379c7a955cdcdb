//! End-to-end execution scenarios driven through the host embedding API.

use htvm::{
    ClassEntry, CompiledFunction, Constant, Instruction, MethodDef, Opcode, Operand, PropertyDef,
    Value, Vm, VmError,
};
use pretty_assertions::assert_eq;

fn instr(opcode: Opcode, op1: Operand, op2: Operand, result: Operand) -> Instruction {
    Instruction::with_operands(opcode, op1, op2, result)
}

fn jump_target(index: u32) -> Operand {
    Operand {
        kind: htvm::OperandKind::Unused,
        value: index,
    }
}

#[test]
fn arithmetic_and_echo() {
    let mut vm = Vm::new();
    vm.set_constants(vec![Constant::Int(10), Constant::Int(3)]);
    let result = vm
        .execute(vec![
            instr(Opcode::Assign, Operand::unused(), Operand::constant(0), Operand::cv(0)),
            instr(Opcode::Assign, Operand::unused(), Operand::constant(1), Operand::cv(1)),
            instr(Opcode::Add, Operand::cv(0), Operand::cv(1), Operand::cv(2)),
            instr(Opcode::Echo, Operand::cv(2), Operand::unused(), Operand::unused()),
            Instruction::new(Opcode::Return),
        ])
        .unwrap();
    assert_eq!(vm.get_output(), "13");
    assert_eq!(result, Value::Null);
}

#[test]
fn conditional_jump_skips_the_true_branch() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::Bool(false),
        Constant::String("A".into()),
        Constant::String("B".into()),
    ]);
    vm.execute(vec![
        instr(Opcode::Assign, Operand::unused(), Operand::constant(0), Operand::cv(0)),
        instr(Opcode::JmpZ, Operand::cv(0), jump_target(4), Operand::unused()),
        instr(Opcode::Assign, Operand::unused(), Operand::constant(1), Operand::cv(1)),
        instr(Opcode::Echo, Operand::cv(1), Operand::unused(), Operand::unused()),
        instr(Opcode::Assign, Operand::unused(), Operand::constant(2), Operand::cv(2)),
        instr(Opcode::Echo, Operand::cv(2), Operand::unused(), Operand::unused()),
        Instruction::new(Opcode::Return),
    ])
    .unwrap();
    assert_eq!(vm.get_output(), "B");
}

#[test]
fn array_append_and_count() {
    let mut vm = Vm::new();
    vm.set_constants(vec![Constant::Int(7), Constant::Int(8), Constant::Int(9)]);
    let result = vm
        .execute(vec![
            instr(Opcode::InitArray, Operand::unused(), Operand::unused(), Operand::cv(0)),
            instr(Opcode::AddArrayElement, Operand::constant(0), Operand::unused(), Operand::cv(0)),
            instr(Opcode::AddArrayElement, Operand::constant(1), Operand::unused(), Operand::cv(0)),
            instr(Opcode::AddArrayElement, Operand::constant(2), Operand::unused(), Operand::cv(0)),
            instr(Opcode::Count, Operand::cv(0), Operand::unused(), Operand::cv(1)),
            instr(Opcode::Return, Operand::cv(1), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::Integer(3));
}

#[test]
fn function_call_with_params() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("add".into()),
        Constant::Int(5),
        Constant::Int(3),
    ]);

    let mut add = CompiledFunction::new("add");
    add.num_params = 2;
    add.num_locals = 3;
    add.instructions = vec![
        instr(Opcode::Add, Operand::cv(0), Operand::cv(1), Operand::tmp(2)),
        instr(Opcode::Return, Operand::tmp(2), Operand::unused(), Operand::unused()),
    ];
    vm.register_function("add", add);

    let mut init = instr(Opcode::InitFcall, Operand::unused(), Operand::constant(0), Operand::unused());
    init.extended_value = 2;
    let result = vm
        .execute(vec![
            init,
            instr(Opcode::SendVal, Operand::constant(1), Operand::unused(), Operand::unused()),
            instr(Opcode::SendVal, Operand::constant(2), Operand::unused(), Operand::unused()),
            instr(Opcode::DoFcall, Operand::unused(), Operand::unused(), Operand::cv(0)),
            instr(Opcode::Return, Operand::cv(0), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::Integer(8));
}

#[test]
fn object_construction_and_property() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("Person".into()),
        Constant::String("__construct".into()),
        Constant::String("Alice".into()),
        Constant::String("name".into()),
    ]);

    let mut person = ClassEntry::new("Person");
    person.add_property(PropertyDef::new("name", Value::String(String::new())));
    let mut ctor = CompiledFunction::new("Person::__construct");
    ctor.num_params = 1;
    ctor.num_locals = 2;
    ctor.instructions = vec![
        instr(Opcode::FetchThis, Operand::unused(), Operand::unused(), Operand::tmp(1)),
        instr(Opcode::AssignObj, Operand::tmp(1), Operand::constant(3), Operand::cv(0)),
        Instruction::new(Opcode::Return),
    ];
    person.add_method(MethodDef::new("__construct", ctor));
    vm.register_class(person).unwrap();

    let mut init = instr(Opcode::InitMethodCall, Operand::cv(0), Operand::constant(1), Operand::unused());
    init.extended_value = 1;
    let result = vm
        .execute(vec![
            instr(Opcode::New, Operand::constant(0), Operand::unused(), Operand::cv(0)),
            init,
            instr(Opcode::SendVal, Operand::constant(2), Operand::unused(), Operand::unused()),
            instr(Opcode::DoFcall, Operand::unused(), Operand::unused(), Operand::unused()),
            instr(Opcode::FetchObjR, Operand::cv(0), Operand::constant(3), Operand::cv(1)),
            instr(Opcode::Return, Operand::cv(1), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::String("Alice".into()));
}

#[test]
fn instanceof_through_interface_inheritance() {
    let mut vm = Vm::new();
    vm.set_constants(vec![Constant::String("C".into()), Constant::String("I".into())]);

    let mut iface = ClassEntry::interface("I");
    iface.add_method(MethodDef::abstract_signature("m", 0));
    vm.register_class(iface).unwrap();

    let mut parent = ClassEntry::new("P");
    parent.interfaces.push("I".to_string());
    parent.add_method(MethodDef::new("m", CompiledFunction::new("P::m")));
    vm.register_class(parent).unwrap();

    let mut child = ClassEntry::new("C");
    child.parent = Some("P".to_string());
    vm.register_class(child).unwrap();

    let result = vm
        .execute(vec![
            instr(Opcode::New, Operand::constant(0), Operand::unused(), Operand::cv(0)),
            instr(Opcode::Instanceof, Operand::cv(0), Operand::constant(1), Operand::cv(1)),
            instr(Opcode::Return, Operand::cv(1), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn division_by_zero_keeps_prior_output() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("before".into()),
        Constant::Int(1),
        Constant::Int(0),
    ]);
    let err = vm
        .execute(vec![
            instr(Opcode::Echo, Operand::constant(0), Operand::unused(), Operand::unused()),
            instr(Opcode::Div, Operand::constant(1), Operand::constant(2), Operand::cv(0)),
        ])
        .unwrap_err();
    assert_eq!(err, VmError::DivisionByZero);
    assert_eq!(vm.get_output(), "before");
}

#[test]
fn modulo_by_zero_fails() {
    let mut vm = Vm::new();
    vm.set_constants(vec![Constant::Int(7), Constant::Int(0)]);
    let err = vm
        .execute(vec![instr(
            Opcode::Mod,
            Operand::constant(0),
            Operand::constant(1),
            Operand::cv(0),
        )])
        .unwrap_err();
    assert_eq!(err, VmError::ModuloByZero);
}

#[test]
fn instanceof_on_non_object_is_false_not_an_error() {
    let mut vm = Vm::new();
    vm.set_constants(vec![Constant::Int(3), Constant::String("I".into())]);
    let result = vm
        .execute(vec![
            instr(Opcode::Instanceof, Operand::constant(0), Operand::constant(1), Operand::cv(0)),
            instr(Opcode::Return, Operand::cv(0), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::Bool(false));
}

#[test]
fn property_read_on_non_object_yields_null() {
    let mut vm = Vm::new();
    vm.set_constants(vec![Constant::Int(3), Constant::String("name".into())]);
    let result = vm
        .execute(vec![
            instr(Opcode::FetchObjR, Operand::constant(0), Operand::constant(1), Operand::cv(0)),
            instr(Opcode::Return, Operand::cv(0), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::Null);
}

#[test]
fn property_write_auto_vivifies_std_class() {
    let mut vm = Vm::new();
    vm.set_constants(vec![Constant::String("x".into()), Constant::Int(5)]);
    let result = vm
        .execute(vec![
            // cv0 was never initialized; the write conjures a stdClass.
            instr(Opcode::AssignObj, Operand::cv(0), Operand::constant(0), Operand::constant(1)),
            instr(Opcode::GetClass, Operand::cv(0), Operand::unused(), Operand::cv(1)),
            instr(Opcode::FetchObjR, Operand::cv(0), Operand::constant(0), Operand::cv(2)),
            instr(Opcode::Concat, Operand::cv(1), Operand::cv(2), Operand::cv(3)),
            instr(Opcode::Return, Operand::cv(3), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::String("stdClass5".into()));
}

#[test]
fn string_byte_indexing() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("hello".into()),
        Constant::Int(1),
        Constant::Int(99),
    ]);
    vm.execute(vec![
        instr(Opcode::Assign, Operand::unused(), Operand::constant(0), Operand::cv(0)),
        instr(Opcode::FetchDimR, Operand::cv(0), Operand::constant(1), Operand::cv(1)),
        instr(Opcode::FetchDimR, Operand::cv(0), Operand::constant(2), Operand::cv(2)),
        instr(Opcode::Echo, Operand::cv(1), Operand::unused(), Operand::unused()),
        instr(Opcode::Echo, Operand::cv(2), Operand::unused(), Operand::unused()),
    ])
    .unwrap();
    assert_eq!(vm.get_output(), "e");
}

#[test]
fn stack_overflow_at_configured_depth() {
    let mut vm = Vm::with_max_depth(8);
    vm.set_constants(vec![Constant::String("spin".into())]);

    let mut spin = CompiledFunction::new("spin");
    spin.instructions = vec![
        instr(Opcode::InitFcall, Operand::unused(), Operand::constant(0), Operand::unused()),
        instr(Opcode::DoFcall, Operand::unused(), Operand::unused(), Operand::unused()),
        Instruction::new(Opcode::Return),
    ];
    vm.register_function("spin", spin);

    let err = vm
        .execute(vec![
            instr(Opcode::InitFcall, Operand::unused(), Operand::constant(0), Operand::unused()),
            instr(Opcode::DoFcall, Operand::unused(), Operand::unused(), Operand::unused()),
        ])
        .unwrap_err();
    assert_eq!(err, VmError::StackOverflow(8));
}

#[test]
fn builtin_dispatch_through_the_call_protocol() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("strtoupper".into()),
        Constant::String("php".into()),
    ]);
    let result = vm
        .execute(vec![
            instr(Opcode::InitFcall, Operand::unused(), Operand::constant(0), Operand::unused()),
            instr(Opcode::SendVal, Operand::constant(1), Operand::unused(), Operand::unused()),
            instr(Opcode::DoFcall, Operand::unused(), Operand::unused(), Operand::cv(0)),
            instr(Opcode::Return, Operand::cv(0), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::String("PHP".into()));
}

#[test]
fn undefined_function_fails_at_init() {
    let mut vm = Vm::new();
    vm.set_constants(vec![Constant::String("nope".into())]);
    let err = vm
        .execute(vec![instr(
            Opcode::InitFcall,
            Operand::unused(),
            Operand::constant(0),
            Operand::unused(),
        )])
        .unwrap_err();
    assert_eq!(err, VmError::UndefinedFunction("nope".to_string()));
}

#[test]
fn send_val_without_pending_call_is_malformed() {
    let mut vm = Vm::new();
    vm.set_constants(vec![Constant::Int(1)]);
    let err = vm
        .execute(vec![instr(
            Opcode::SendVal,
            Operand::constant(0),
            Operand::unused(),
            Operand::unused(),
        )])
        .unwrap_err();
    assert!(matches!(err, VmError::MalformedInstruction(_)));
}

#[test]
fn static_method_call() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("Counter".into()),
        Constant::String("initial".into()),
        Constant::Int(42),
    ]);

    let mut counter = ClassEntry::new("Counter");
    let mut initial = CompiledFunction::new("Counter::initial");
    initial.instructions = vec![instr(
        Opcode::Return,
        Operand::constant(2),
        Operand::unused(),
        Operand::unused(),
    )];
    let mut def = MethodDef::new("initial", initial);
    def.is_static = true;
    counter.add_method(def);
    vm.register_class(counter).unwrap();

    let result = vm
        .execute(vec![
            instr(Opcode::InitStaticMethodCall, Operand::constant(0), Operand::constant(1), Operand::unused()),
            instr(Opcode::DoFcall, Operand::unused(), Operand::unused(), Operand::cv(0)),
            instr(Opcode::Return, Operand::cv(0), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::Integer(42));
}

#[test]
fn magic_call_receives_name_and_packed_args() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("Ghost".into()),
        Constant::String("missing".into()),
        Constant::Int(1),
        Constant::Int(2),
    ]);

    // __call($name, $args) { return $name . count($args); }
    let mut ghost = ClassEntry::new("Ghost");
    let mut magic = CompiledFunction::new("Ghost::__call");
    magic.num_params = 2;
    magic.num_locals = 4;
    magic.instructions = vec![
        instr(Opcode::Count, Operand::cv(1), Operand::unused(), Operand::tmp(2)),
        instr(Opcode::Concat, Operand::cv(0), Operand::tmp(2), Operand::tmp(3)),
        instr(Opcode::Return, Operand::tmp(3), Operand::unused(), Operand::unused()),
    ];
    ghost.add_method(MethodDef::new("__call", magic));
    vm.register_class(ghost).unwrap();

    let mut init = instr(Opcode::InitMethodCall, Operand::cv(0), Operand::constant(1), Operand::unused());
    init.extended_value = 2;
    let result = vm
        .execute(vec![
            instr(Opcode::New, Operand::constant(0), Operand::unused(), Operand::cv(0)),
            init,
            instr(Opcode::SendVal, Operand::constant(2), Operand::unused(), Operand::unused()),
            instr(Opcode::SendVal, Operand::constant(3), Operand::unused(), Operand::unused()),
            instr(Opcode::DoFcall, Operand::unused(), Operand::unused(), Operand::cv(1)),
            instr(Opcode::Return, Operand::cv(1), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::String("missing2".into()));
}

#[test]
fn clone_copies_values_and_gets_a_fresh_identity() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("Point".into()),
        Constant::String("x".into()),
        Constant::Int(1),
        Constant::Int(9),
    ]);

    let mut point = ClassEntry::new("Point");
    point.add_property(PropertyDef::new("x", Value::Integer(0)));
    vm.register_class(point).unwrap();

    let result = vm
        .execute(vec![
            instr(Opcode::New, Operand::constant(0), Operand::unused(), Operand::cv(0)),
            instr(Opcode::AssignObj, Operand::cv(0), Operand::constant(1), Operand::constant(2)),
            instr(Opcode::Clone, Operand::cv(0), Operand::unused(), Operand::cv(1)),
            // Mutating the original after the clone must not show through.
            instr(Opcode::AssignObj, Operand::cv(0), Operand::constant(1), Operand::constant(3)),
            instr(Opcode::FetchObjR, Operand::cv(1), Operand::constant(1), Operand::cv(2)),
            instr(Opcode::IsIdentical, Operand::cv(0), Operand::cv(1), Operand::cv(3)),
            instr(Opcode::Concat, Operand::cv(2), Operand::cv(3), Operand::cv(4)),
            instr(Opcode::Return, Operand::cv(4), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    // Clone kept x = 1, and the two objects are not identical.
    assert_eq!(result, Value::String("1".into()));
}

#[test]
fn late_static_binding_resolves_through_the_called_class() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("Child".into()),
        Constant::String("make".into()),
        Constant::String("static".into()),
        Constant::String("name".into()),
        Constant::String("Base".into()),
        Constant::String("Child!".into()),
    ]);

    // Base::make() { return static::name(); }  Base::name() / Child::name()
    let mut base = ClassEntry::new("Base");
    let mut make = CompiledFunction::new("Base::make");
    make.num_locals = 1;
    make.instructions = vec![
        instr(Opcode::InitStaticMethodCall, Operand::constant(2), Operand::constant(3), Operand::unused()),
        instr(Opcode::DoFcall, Operand::unused(), Operand::unused(), Operand::tmp(0)),
        instr(Opcode::Return, Operand::tmp(0), Operand::unused(), Operand::unused()),
    ];
    let mut make_def = MethodDef::new("make", make);
    make_def.is_static = true;
    base.add_method(make_def);

    let mut base_name = CompiledFunction::new("Base::name");
    base_name.instructions = vec![instr(
        Opcode::Return,
        Operand::constant(4),
        Operand::unused(),
        Operand::unused(),
    )];
    let mut base_name_def = MethodDef::new("name", base_name);
    base_name_def.is_static = true;
    base.add_method(base_name_def);
    vm.register_class(base).unwrap();

    let mut child = ClassEntry::new("Child");
    child.parent = Some("Base".to_string());
    let mut child_name = CompiledFunction::new("Child::name");
    child_name.instructions = vec![instr(
        Opcode::Return,
        Operand::constant(5),
        Operand::unused(),
        Operand::unused(),
    )];
    let mut child_name_def = MethodDef::new("name", child_name);
    child_name_def.is_static = true;
    child.add_method(child_name_def);
    vm.register_class(child).unwrap();

    let result = vm
        .execute(vec![
            instr(Opcode::InitStaticMethodCall, Operand::constant(0), Operand::constant(1), Operand::unused()),
            instr(Opcode::DoFcall, Operand::unused(), Operand::unused(), Operand::cv(0)),
            instr(Opcode::Return, Operand::cv(0), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::String("Child!".into()));
}

#[test]
fn compound_dimension_assignment_uses_the_encoded_operator() {
    let mut vm = Vm::new();
    vm.set_constants(vec![Constant::Int(0), Constant::Int(10), Constant::Int(3)]);
    let mut assign_mul = instr(
        Opcode::AssignDimOp,
        Operand::cv(0),
        Operand::constant(0),
        Operand::constant(2),
    );
    assign_mul.extended_value = htvm::AssignOpKind::Mul as u32;
    let result = vm
        .execute(vec![
            instr(Opcode::InitArray, Operand::unused(), Operand::unused(), Operand::cv(0)),
            instr(Opcode::AssignDim, Operand::cv(0), Operand::constant(0), Operand::constant(1)),
            assign_mul,
            instr(Opcode::FetchDimR, Operand::cv(0), Operand::constant(0), Operand::cv(1)),
            instr(Opcode::Return, Operand::cv(1), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::Integer(30));
}

#[test]
fn isset_empty_and_unset_on_slots() {
    let mut vm = Vm::new();
    vm.set_constants(vec![Constant::Int(0), Constant::Int(7)]);
    vm.execute(vec![
        instr(Opcode::Assign, Operand::unused(), Operand::constant(1), Operand::cv(0)),
        instr(Opcode::Isset, Operand::cv(0), Operand::unused(), Operand::cv(1)),
        instr(Opcode::Echo, Operand::cv(1), Operand::unused(), Operand::unused()),
        instr(Opcode::Unset, Operand::cv(0), Operand::unused(), Operand::unused()),
        instr(Opcode::Isset, Operand::cv(0), Operand::unused(), Operand::cv(1)),
        instr(Opcode::Empty, Operand::cv(0), Operand::unused(), Operand::cv(2)),
        // "" for false, "1" for true
        instr(Opcode::Echo, Operand::cv(1), Operand::unused(), Operand::unused()),
        instr(Opcode::Echo, Operand::cv(2), Operand::unused(), Operand::unused()),
    ])
    .unwrap();
    assert_eq!(vm.get_output(), "11");
}

#[test]
fn post_increment_reports_the_old_value() {
    let mut vm = Vm::new();
    vm.set_constants(vec![Constant::Int(5)]);
    vm.execute(vec![
        instr(Opcode::Assign, Operand::unused(), Operand::constant(0), Operand::cv(0)),
        instr(Opcode::PostInc, Operand::cv(0), Operand::unused(), Operand::tmp(1)),
        instr(Opcode::Echo, Operand::tmp(1), Operand::unused(), Operand::unused()),
        instr(Opcode::Echo, Operand::cv(0), Operand::unused(), Operand::unused()),
        instr(Opcode::PreDec, Operand::cv(0), Operand::unused(), Operand::tmp(1)),
        instr(Opcode::Echo, Operand::tmp(1), Operand::unused(), Operand::unused()),
    ])
    .unwrap();
    assert_eq!(vm.get_output(), "565");
}

#[test]
fn magic_get_handles_missing_properties() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("Lazy".into()),
        Constant::String("anything".into()),
        Constant::String("got:".into()),
    ]);

    // __get($name) { return "got:" . $name; }
    let mut lazy = ClassEntry::new("Lazy");
    let mut magic_get = CompiledFunction::new("Lazy::__get");
    magic_get.num_params = 1;
    magic_get.num_locals = 2;
    magic_get.instructions = vec![
        instr(Opcode::Concat, Operand::constant(2), Operand::cv(0), Operand::tmp(1)),
        instr(Opcode::Return, Operand::tmp(1), Operand::unused(), Operand::unused()),
    ];
    lazy.add_method(MethodDef::new("__get", magic_get));
    vm.register_class(lazy).unwrap();

    let result = vm
        .execute(vec![
            instr(Opcode::New, Operand::constant(0), Operand::unused(), Operand::cv(0)),
            instr(Opcode::FetchObjR, Operand::cv(0), Operand::constant(1), Operand::cv(1)),
            instr(Opcode::Return, Operand::cv(1), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::String("got:anything".into()));
}

#[test]
fn fetch_this_outside_a_method_fails() {
    let mut vm = Vm::new();
    let err = vm
        .execute(vec![instr(
            Opcode::FetchThis,
            Operand::unused(),
            Operand::unused(),
            Operand::cv(0),
        )])
        .unwrap_err();
    assert_eq!(err, VmError::NoThisContext);
}

#[test]
fn abstract_and_interface_instantiation_fail() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("Shape".into()),
        Constant::String("Base".into()),
    ]);
    let mut iface = ClassEntry::interface("Shape");
    iface.add_method(MethodDef::abstract_signature("area", 0));
    vm.register_class(iface).unwrap();
    let mut base = ClassEntry::new("Base");
    base.is_abstract = true;
    vm.register_class(base).unwrap();

    let err = vm
        .execute(vec![instr(
            Opcode::New,
            Operand::constant(0),
            Operand::unused(),
            Operand::cv(0),
        )])
        .unwrap_err();
    assert_eq!(err, VmError::CannotInstantiateInterface("Shape".to_string()));

    let err = vm
        .execute(vec![instr(
            Opcode::New,
            Operand::constant(1),
            Operand::unused(),
            Operand::cv(0),
        )])
        .unwrap_err();
    assert_eq!(err, VmError::CannotInstantiateAbstract("Base".to_string()));
}

#[test]
fn property_get_hook_intercepts_reads() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("Boxed".into()),
        Constant::String("value".into()),
        Constant::String("hooked".into()),
    ]);

    let mut boxed = ClassEntry::new("Boxed");
    let mut prop = PropertyDef::new("value", Value::Integer(1));
    prop.get_hook = Some("getValue".to_string());
    boxed.add_property(prop);
    let mut hook = CompiledFunction::new("Boxed::getValue");
    hook.instructions = vec![instr(
        Opcode::Return,
        Operand::constant(2),
        Operand::unused(),
        Operand::unused(),
    )];
    boxed.add_method(MethodDef::new("getValue", hook));
    vm.register_class(boxed).unwrap();

    let result = vm
        .execute(vec![
            instr(Opcode::New, Operand::constant(0), Operand::unused(), Operand::cv(0)),
            instr(Opcode::FetchObjR, Operand::cv(0), Operand::constant(1), Operand::cv(1)),
            instr(Opcode::Return, Operand::cv(1), Operand::unused(), Operand::unused()),
        ])
        .unwrap();
    assert_eq!(result, Value::String("hooked".into()));
}

#[test]
fn dim_isset_empty_and_unset() {
    let mut vm = Vm::new();
    vm.set_constants(vec![
        Constant::String("k".into()),
        Constant::Int(0),
        Constant::String("missing".into()),
    ]);
    let mut is_empty = instr(
        Opcode::IssetIsemptyDimObj,
        Operand::cv(0),
        Operand::constant(0),
        Operand::cv(3),
    );
    is_empty.extended_value = 1;
    vm.execute(vec![
        instr(Opcode::InitArray, Operand::unused(), Operand::unused(), Operand::cv(0)),
        // $a['k'] = 0
        instr(Opcode::AssignDim, Operand::cv(0), Operand::constant(0), Operand::constant(1)),
        instr(Opcode::IssetIsemptyDimObj, Operand::cv(0), Operand::constant(0), Operand::cv(1)),
        instr(Opcode::IssetIsemptyDimObj, Operand::cv(0), Operand::constant(2), Operand::cv(2)),
        is_empty,
        instr(Opcode::Echo, Operand::cv(1), Operand::unused(), Operand::unused()),
        instr(Opcode::Echo, Operand::cv(2), Operand::unused(), Operand::unused()),
        instr(Opcode::Echo, Operand::cv(3), Operand::unused(), Operand::unused()),
        // Remove the key, then re-check isset.
        instr(Opcode::UnsetDim, Operand::cv(0), Operand::constant(0), Operand::unused()),
        instr(Opcode::IssetIsemptyDimObj, Operand::cv(0), Operand::constant(0), Operand::cv(1)),
        instr(Opcode::Echo, Operand::cv(1), Operand::unused(), Operand::unused()),
    ])
    .unwrap();
    // isset($a['k']) = true, isset($a['missing']) = false,
    // empty($a['k']) = true (0 is falsy), isset after unset = false.
    assert_eq!(vm.get_output(), "11");
}

#[test]
fn unit_round_trip_executes_identically() {
    let constants = vec![Constant::Int(2), Constant::Int(8)];
    let instructions = vec![
        instr(Opcode::Pow, Operand::constant(0), Operand::constant(1), Operand::cv(0)),
        instr(Opcode::Echo, Operand::cv(0), Operand::unused(), Operand::unused()),
    ];

    let unit = htvm::BytecodeUnit {
        instructions: instructions.clone(),
        constants: constants.clone(),
    };
    let decoded = htvm::decode_unit(&htvm::encode_unit(&unit)).unwrap();

    let mut direct = Vm::new();
    direct.set_constants(constants);
    direct.execute(instructions).unwrap();

    let mut round_tripped = Vm::new();
    round_tripped.set_constants(decoded.constants);
    round_tripped.execute(decoded.instructions).unwrap();

    assert_eq!(direct.get_output(), round_tripped.get_output());
    assert_eq!(direct.get_output(), "256");
}
