//! file: core/src/ast/stmt.rs
//! description: parsing helpers for functions, blocks and statements.
//!
use crate::{
    ast::{AstNode, AstNodeKind, Parameter, Rule, rules},
    error::LucixErrorExt,
    script,
};

use super::expr::parse_expression_rule;

/// Parse the `application` rule: every function declaration in file order.
pub(crate) fn parse_application_rule(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let mut functions = Vec::new();
    for inner in inner_pairs {
        match inner.as_rule() {
            Rule::function_declaration => {
                functions.push(parse_function_declaration_rule(inner, script)?)
            }
            Rule::EOI => break,
            other => {
                return Err(rules::syntax_error(
                    format!("Unexpected rule {:?} at top level.", other),
                    "lucix.ast.stmt.parse_application_rule",
                    &location,
                    &span,
                ));
            }
        }
    }
    Ok(AstNode::new(
        AstNodeKind::Application { functions },
        location,
        span,
    ))
}

fn parse_function_declaration_rule(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);

    let name = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?
        .as_str()
        .to_string();

    let mut params = Vec::new();
    let mut return_type = String::new();
    let mut body = None;

    for inner in inner_pairs {
        match inner.as_rule() {
            Rule::function_parameters => {
                for param in inner.into_inner() {
                    params.push(parse_parameter_rule(param, script)?);
                }
            }
            Rule::type_name => return_type = inner.as_str().to_string(),
            Rule::block => body = Some(parse_block_rule(inner, script)?),
            other => {
                return Err(rules::syntax_error(
                    format!("Unexpected rule {:?} in function declaration.", other),
                    "lucix.ast.stmt.parse_function_declaration_rule",
                    &location,
                    &span,
                ));
            }
        }
    }

    let body = body.ok_or_else(|| {
        rules::syntax_error(
            format!("Function '{}' has no body.", name),
            "lucix.ast.stmt.parse_function_declaration_rule",
            &location,
            &span,
        )
    })?;

    Ok(AstNode::new(
        AstNodeKind::FunctionDeclaration {
            name,
            params,
            return_type,
            body: Box::new(body),
        },
        location,
        span,
    ))
}

fn parse_parameter_rule(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<Parameter, Box<dyn LucixErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let name = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let type_name = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    Ok(Parameter {
        name: name.as_str().to_string(),
        type_name: type_name.as_str().to_string(),
    })
}

pub(crate) fn parse_block_rule(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let statements = inner_pairs
        .map(|stmt| parse_statement_rule(stmt, script))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AstNode::new(AstNodeKind::Block { statements }, location, span))
}

fn parse_statement_rule(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let next_rule = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    match next_rule.as_rule() {
        Rule::variable_declaration => parse_variable_declaration_rule(next_rule, script),
        Rule::if_statement => parse_if_statement_rule(next_rule, script),
        Rule::return_statement => parse_return_statement_rule(next_rule, script),
        Rule::assignment => parse_assignment_rule(next_rule, script),
        Rule::block => parse_block_rule(next_rule, script),
        Rule::expression_statement => {
            let (mut inner, location, span) = rules::get_data_from_rule(&next_rule, script);
            let expr = rules::fetch_next_pair(&mut inner, &location, &span)?;
            parse_expression_rule(expr, script)
        }
        other => Err(rules::syntax_error(
            format!("Unexpected statement rule {:?}.", other),
            "lucix.ast.stmt.parse_statement_rule",
            &location,
            &span,
        )),
    }
}

fn parse_variable_declaration_rule(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let name = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let type_name = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let initializer = match inner_pairs.next() {
        Some(expr) => Some(Box::new(parse_expression_rule(expr, script)?)),
        None => None,
    };
    Ok(AstNode::new(
        AstNodeKind::VariableDeclaration {
            name: name.as_str().to_string(),
            type_name: type_name.as_str().to_string(),
            initializer,
        },
        location,
        span,
    ))
}

fn parse_if_statement_rule(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let condition = parse_expression_rule(
        rules::fetch_next_pair(&mut inner_pairs, &location, &span)?,
        script,
    )?;
    let then_block = parse_block_rule(
        rules::fetch_next_pair(&mut inner_pairs, &location, &span)?,
        script,
    )?;
    let else_block = match inner_pairs.next() {
        Some(block) => Some(Box::new(parse_block_rule(block, script)?)),
        None => None,
    };
    Ok(AstNode::new(
        AstNodeKind::If {
            condition: Box::new(condition),
            then_block: Box::new(then_block),
            else_block,
        },
        location,
        span,
    ))
}

fn parse_return_statement_rule(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let value = match inner_pairs.next() {
        Some(expr) => Some(Box::new(parse_expression_rule(expr, script)?)),
        None => None,
    };
    Ok(AstNode::new(AstNodeKind::Return { value }, location, span))
}

fn parse_assignment_rule(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let target = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let value = parse_expression_rule(
        rules::fetch_next_pair(&mut inner_pairs, &location, &span)?,
        script,
    )?;
    Ok(AstNode::new(
        AstNodeKind::Assignment {
            target: target.as_str().to_string(),
            value: Box::new(value),
        },
        location,
        span,
    ))
}
