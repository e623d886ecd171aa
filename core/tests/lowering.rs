use lucix_core::ast::generate_ast_from_source;
use lucix_core::config::CompileMode;
use lucix_core::ir::module::{FunctionPrototype, IrModule};
use lucix_core::ir::op::{IROp, Terminator};
use lucix_core::ir::verify::verify_module;
use lucix_core::ir::{CodeGen, IrType, lower_ast_to_ir};
use lucix_core::script::Script;
use lucix_core::LucixErrorExt;

fn lower(src: &str, mode: CompileMode) -> Result<Vec<IrModule>, Box<dyn LucixErrorExt>> {
    let ast = generate_ast_from_source(&Script::from_source("t.lx", src)).expect("parse");
    lower_ast_to_ir(&ast, "t", mode)
}

fn lower_ok(src: &str) -> Vec<IrModule> {
    let units = lower(src, CompileMode::PerFunction).expect("lowering failed");
    for unit in &units {
        verify_module(unit).expect("generated IR must verify");
    }
    units
}

const ADD: &str = "fn add(a i32, b i32) i32 { return a + b; } fn test() i32 { return add(2, 3); }";

#[test]
fn parameters_are_spilled_then_loaded() {
    let units = lower_ok(ADD);
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].name, "add");

    let text = units[0].to_string();
    assert!(text.contains("define i32 @add(i32 %a, i32 %b) {"));
    assert!(text.contains("store i32 %0, ptr %a.0"));
    assert!(text.contains("%4 = add i32 %2, %3"));
    assert!(text.contains("ret i32 %4"));
}

#[test]
fn call_to_earlier_unit_adds_extern_declaration() {
    let units = lower_ok(ADD);
    let test = &units[1];
    assert_eq!(
        test.declarations,
        vec![FunctionPrototype::new("add", vec![IrType::I32, IrType::I32], IrType::I32)]
    );
    let text = test.to_string();
    assert!(text.contains("declare i32 @add(i32, i32)"));
    assert!(text.contains("%2 = call i32 @add(i32 %0, i32 %1)"));
}

#[test]
fn per_unit_mode_keeps_calls_local() {
    let units = lower(ADD, CompileMode::PerUnit).expect("lowering failed");
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].name, "t");
    assert_eq!(units[0].functions.len(), 2);
    assert!(units[0].declarations.is_empty());
}

#[test]
fn inner_declaration_shadows_outer_until_block_ends() {
    let units = lower_ok(
        "fn test() i32 { var x i32 = 1; { var x i32 = 10; x = x + 1; } return x; }",
    );
    let text = units[0].to_string();
    assert!(text.contains("store i32 %4, ptr %x.1"));
    assert!(text.contains("%5 = load i32, ptr %x.0"));
    assert!(text.contains("ret i32 %5"));
}

#[test]
fn initializer_sees_the_enclosing_binding() {
    let units = lower_ok("fn test() i32 { var x i32 = 1; { var x i32 = x + 1; return x; } }");
    let text = units[0].to_string();
    assert!(text.contains("%1 = load i32, ptr %x.0"));
    assert!(text.contains("store i32 %3, ptr %x.1"));
}

#[test]
fn arguments_are_evaluated_left_to_right() {
    let units = lower_ok(
        "fn f(a i32, b i32) i32 { return a - b; } \
         fn test() i32 { var x i32 = 1; return f(x + 1, x - 1); }",
    );
    let ops = &units[1].functions[0].blocks[0].ops;
    let add = ops.iter().position(|op| matches!(op, IROp::Add { .. }));
    let sub = ops.iter().position(|op| matches!(op, IROp::Sub { .. }));
    let call = ops.iter().position(|op| matches!(op, IROp::Call { .. }));
    assert!(add < sub && sub < call, "ops out of order: {:?}", ops);
    assert!(units[1].to_string().contains("%7 = call i32 @f(i32 %3, i32 %6)"));
}

#[test]
fn if_else_produces_then_else_and_continuation() {
    let units = lower_ok(
        "fn test() i32 { var x i32 = 4; if x > 3 { return 1; } else { x = 0; } return x; }",
    );
    let func = &units[0].functions[0];
    let labels: Vec<&str> = func.blocks.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, ["entry", "then", "else", "if_cont"]);

    // `return` inside the arm wins over the merge branch.
    assert!(matches!(func.blocks[1].terminator, Some(Terminator::Ret { .. })));
    assert_eq!(
        func.blocks[2].terminator,
        Some(Terminator::Br { target: func.blocks[3].id })
    );

    let text = func.to_string();
    assert!(text.contains("icmp sgt"));
    assert!(text.contains("zext i1"));
    assert!(text.contains("icmp ne"));
    assert!(text.contains("label %then, label %else"));
}

#[test]
fn if_without_else_still_gets_an_else_block() {
    let units = lower_ok("fn test() i32 { var x i32 = 0; if 1 { x = 2; } return x; }");
    let func = &units[0].functions[0];
    assert_eq!(func.blocks.len(), 4);
    assert_eq!(
        func.blocks[2].terminator,
        Some(Terminator::Br { target: func.blocks[3].id })
    );
}

#[test]
fn code_after_return_lands_in_unreachable_block() {
    let units = lower_ok("fn test() i32 { return 1; var y i32 = 2; }");
    let func = &units[0].functions[0];
    assert_eq!(func.blocks.len(), 2);
    assert_eq!(func.blocks[1].label, "dead");
    assert_eq!(func.blocks[1].terminator, Some(Terminator::Unreachable));
}

#[test]
fn void_function_falls_off_with_ret_void() {
    let units = lower_ok("fn noop() { var x i32 = 1; }");
    assert!(units[0].to_string().contains("ret void"));
    assert_eq!(units[0].functions[0].prototype.ret, IrType::Void);
}

#[test]
fn regeneration_is_deterministic() {
    let first: Vec<String> = lower_ok(ADD).iter().map(|u| u.to_string()).collect();
    let second: Vec<String> = lower_ok(ADD).iter().map(|u| u.to_string()).collect();
    assert_eq!(first, second);
}

#[test]
fn undeclared_function_is_fatal_after_earlier_units() {
    let ast = generate_ast_from_source(&Script::from_source(
        "t.lx",
        "fn ok() i32 { return 1; }\nfn test() i32 { return missing(); }",
    ))
    .expect("parse");
    let mut units: Vec<IrModule> = Vec::new();
    let mut codegen = CodeGen::new("t", CompileMode::PerFunction);
    let err = codegen.generate(&ast, &mut units).unwrap_err();

    assert_eq!(err.message(), "cannot resolve function missing");
    assert_eq!(err.issuer(), "lucix.codegen.registry");
    assert_eq!(err.location().map(|l| l.line), Some(2));
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].name, "ok");

    let registry = codegen.registry();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.resolve("ok").map(|r| r.unit.as_str()), Some("ok"));
    assert!(registry.resolve("test").is_none());
}

#[test]
fn undeclared_variable_is_fatal() {
    let err = lower("fn test() i32 { return y; }", CompileMode::PerFunction).unwrap_err();
    assert_eq!(err.message(), "cannot resolve symbol y");
    assert_eq!(err.issuer(), "lucix.codegen.scope");
}

#[test]
fn variable_is_not_visible_after_its_block() {
    let err = lower(
        "fn test() i32 { { var z i32 = 1; } return z; }",
        CompileMode::PerFunction,
    )
    .unwrap_err();
    assert_eq!(err.message(), "cannot resolve symbol z");
}

#[test]
fn function_cannot_call_itself() {
    let err = lower("fn f() i32 { return f(); }", CompileMode::PerFunction).unwrap_err();
    assert_eq!(err.message(), "cannot resolve function f");
}

#[test]
fn wrong_argument_count_is_rejected() {
    let err = lower(
        "fn f(a i32) i32 { return a; } fn test() i32 { return f(); }",
        CompileMode::PerFunction,
    )
    .unwrap_err();
    assert!(err.message().contains("takes 1 argument(s) but 0 were given"));
}

#[test]
fn void_call_cannot_be_used_as_value() {
    let err = lower(
        "fn v() { } fn test() i32 { return v(); }",
        CompileMode::PerFunction,
    )
    .unwrap_err();
    assert!(err.message().contains("does not produce a value"));
}

#[test]
fn return_value_from_void_function_is_rejected() {
    assert!(lower("fn v() { return 1; }", CompileMode::PerFunction).is_err());
    assert!(lower("fn f() i32 { return; }", CompileMode::PerFunction).is_err());
}
