//! file: core/src/ast/kind.rs
//! description: AST node kind definitions and operator enums.
//!
//! One variant per syntax construct the code generator lowers. Lowering
//! dispatches on `AstNodeKind` directly; there is no visitor hierarchy.
//!
use super::node::AstNode;

/// Binary operators accepted by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add, // +
    Sub, // -
    Lt,  // <
    Gt,  // >
}

impl BinaryOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "+" => Some(BinaryOperator::Add),
            "-" => Some(BinaryOperator::Sub),
            "<" => Some(BinaryOperator::Lt),
            ">" => Some(BinaryOperator::Gt),
            _ => None,
        }
    }

    pub fn is_relational(&self) -> bool {
        matches!(self, BinaryOperator::Lt | BinaryOperator::Gt)
    }

    pub fn token(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus, // -
}

/// A declared function parameter: `name type`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AstNodeKind {
    /// Root of a source file.
    Application { functions: Vec<AstNode> },

    /// `fn name(params) type? { ... }`. A missing return type is the empty
    /// type name, which the type catalog maps to "no value".
    FunctionDeclaration {
        name: String,
        params: Vec<Parameter>,
        return_type: String,
        body: Box<AstNode>,
    },
    VariableDeclaration {
        name: String,
        type_name: String,
        initializer: Option<Box<AstNode>>,
    },

    Block { statements: Vec<AstNode> },
    If {
        condition: Box<AstNode>,
        then_block: Box<AstNode>,
        else_block: Option<Box<AstNode>>,
    },
    Assignment { target: String, value: Box<AstNode> },
    Return { value: Option<Box<AstNode>> },

    Call { callee: String, args: Vec<AstNode> },
    BinaryOp {
        left: Box<AstNode>,
        op: BinaryOperator,
        right: Box<AstNode>,
    },
    UnaryOp { op: UnaryOperator, expr: Box<AstNode> },
    Identifier { name: String },
    Integer { value: i32 },
}

impl AstNodeKind {
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            AstNodeKind::Call { .. }
                | AstNodeKind::BinaryOp { .. }
                | AstNodeKind::UnaryOp { .. }
                | AstNodeKind::Identifier { .. }
                | AstNodeKind::Integer { .. }
        )
    }

    /// Ordered child nodes, in evaluation order.
    pub fn children(&self) -> Vec<&AstNode> {
        match self {
            AstNodeKind::Application { functions } => functions.iter().collect(),
            AstNodeKind::FunctionDeclaration { body, .. } => vec![body.as_ref()],
            AstNodeKind::VariableDeclaration { initializer, .. } => {
                initializer.iter().map(|b| b.as_ref()).collect()
            }
            AstNodeKind::Block { statements } => statements.iter().collect(),
            AstNodeKind::If {
                condition,
                then_block,
                else_block,
            } => {
                let mut out = vec![condition.as_ref(), then_block.as_ref()];
                if let Some(e) = else_block {
                    out.push(e.as_ref());
                }
                out
            }
            AstNodeKind::Assignment { value, .. } => vec![value.as_ref()],
            AstNodeKind::Return { value } => value.iter().map(|b| b.as_ref()).collect(),
            AstNodeKind::Call { args, .. } => args.iter().collect(),
            AstNodeKind::BinaryOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            AstNodeKind::UnaryOp { expr, .. } => vec![expr.as_ref()],
            AstNodeKind::Identifier { .. } | AstNodeKind::Integer { .. } => Vec::new(),
        }
    }

    /// Literal text carried by leaf-like nodes.
    pub fn text(&self) -> Option<String> {
        match self {
            AstNodeKind::Identifier { name } => Some(name.clone()),
            AstNodeKind::Integer { value } => Some(value.to_string()),
            AstNodeKind::FunctionDeclaration { name, .. }
            | AstNodeKind::VariableDeclaration { name, .. } => Some(name.clone()),
            AstNodeKind::Assignment { target, .. } => Some(target.clone()),
            AstNodeKind::Call { callee, .. } => Some(callee.clone()),
            AstNodeKind::BinaryOp { op, .. } => Some(op.token().to_string()),
            AstNodeKind::UnaryOp { .. } => Some("-".to_string()),
            _ => None,
        }
    }
}

use std::fmt;

impl fmt::Display for AstNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstNodeKind::Application { .. } => write!(f, "Application"),
            AstNodeKind::FunctionDeclaration { .. } => write!(f, "FunctionDeclaration"),
            AstNodeKind::VariableDeclaration { .. } => write!(f, "VariableDeclaration"),
            AstNodeKind::Block { .. } => write!(f, "Block"),
            AstNodeKind::If { .. } => write!(f, "If"),
            AstNodeKind::Assignment { .. } => write!(f, "Assignment"),
            AstNodeKind::Return { .. } => write!(f, "Return"),
            AstNodeKind::Call { .. } => write!(f, "Call"),
            AstNodeKind::BinaryOp { .. } => write!(f, "BinaryOp"),
            AstNodeKind::UnaryOp { .. } => write!(f, "UnaryOp"),
            AstNodeKind::Identifier { .. } => write!(f, "Identifier"),
            AstNodeKind::Integer { .. } => write!(f, "Integer"),
        }
    }
}
