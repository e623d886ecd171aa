use lucix_core::ast::{AstNode, AstNodeKind, Parameter, generate_ast_from_source};
use lucix_core::config::CompileMode;
use lucix_core::ir::lower_ast_to_ir;
use lucix_core::reports::{Report, Severity};
use lucix_core::script::Script;
use lucix_core::{Level, LucixErrorExt};

fn function(name: &str, params: Vec<Parameter>, return_type: &str, body: Vec<AstNode>) -> AstNode {
    AstNode::bare(AstNodeKind::FunctionDeclaration {
        name: name.to_string(),
        params,
        return_type: return_type.to_string(),
        body: Box::new(AstNode::bare(AstNodeKind::Block { statements: body })),
    })
}

#[test]
fn hand_built_tree_lowers_like_parsed_source() {
    let ret = AstNode::bare(AstNodeKind::Return {
        value: Some(Box::new(AstNode::bare(AstNodeKind::Integer { value: 7 }))),
    });
    let root = AstNode::bare(AstNodeKind::Application {
        functions: vec![function("test", vec![], "i32", vec![ret])],
    });
    let built = lower_ast_to_ir(&root, "t", CompileMode::PerFunction).expect("lower");

    let parsed = generate_ast_from_source(&Script::from_source("t.lx", "fn test() i32 { return 7; }"))
        .expect("parse");
    let from_source = lower_ast_to_ir(&parsed, "t", CompileMode::PerFunction).expect("lower");

    assert_eq!(built[0].to_string(), from_source[0].to_string());
}

#[test]
fn unknown_type_name_is_critical() {
    let root = AstNode::bare(AstNodeKind::Application {
        functions: vec![function(
            "f",
            vec![Parameter {
                name: "x".into(),
                type_name: "f64".into(),
            }],
            "i32",
            vec![],
        )],
    });
    let err = lower_ast_to_ir(&root, "t", CompileMode::PerFunction).unwrap_err();
    assert_eq!(err.level(), Level::Critical);
    assert_eq!(err.message(), "unknown type 'f64'");
    assert_eq!(Report::from_error(err.as_ref()).severity, Severity::Fatal);
}

#[test]
fn statements_at_top_level_are_rejected() {
    let root = AstNode::bare(AstNodeKind::Integer { value: 1 });
    assert!(lower_ast_to_ir(&root, "t", CompileMode::PerFunction).is_err());
}

#[test]
fn syntax_errors_carry_their_position() {
    let err = generate_ast_from_source(&Script::from_source("bad.lx", "fn test() i32 {\n  return 1\n}"))
        .unwrap_err();
    let loc = err.location().expect("location");
    assert_eq!(loc.file, "bad.lx");
    assert!(loc.line >= 2);
    let report = Report::from_error(err.as_ref());
    assert_eq!(report.code.map(|c| c.to_string()), Some("E_2".to_string()));
}
