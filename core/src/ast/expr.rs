use crate::{
    ast::{AstNode, AstNodeKind, BinaryOperator, Rule, UnaryOperator, rules},
    error::LucixErrorExt,
    script,
};

/// Parse `expression`: a left-associative chain of `<` / `>` over additive terms.
pub(crate) fn parse_expression_rule(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    match pair.as_rule() {
        Rule::expression | Rule::additive => parse_binary_chain(pair, script),
        other => {
            let (_, location, span) = rules::get_data_from_rule(&pair, script);
            Err(rules::syntax_error(
                format!("Unexpected expression rule {:?}.", other),
                "lucix.ast.expr.parse_expression_rule",
                &location,
                &span,
            ))
        }
    }
}

/// Both precedence levels share the `operand (op operand)*` shape.
fn parse_binary_chain(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);

    let first = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let mut node = parse_operand(first, script)?;

    while let Some(op_pair) = inner_pairs.next() {
        let op = BinaryOperator::from_token(op_pair.as_str()).ok_or_else(|| {
            rules::syntax_error(
                format!("Invalid operator '{}'.", op_pair.as_str()),
                "lucix.ast.expr.parse_binary_chain",
                &location,
                &span,
            )
        })?;
        let right_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
        let right = parse_operand(right_pair, script)?;
        let op_location = rules::get_location_from_pair(&op_pair, script);
        node = AstNode::new(
            AstNodeKind::BinaryOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
            },
            op_location,
            span.clone(),
        );
    }

    Ok(node)
}

fn parse_operand(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    match pair.as_rule() {
        Rule::additive | Rule::expression => parse_binary_chain(pair, script),
        Rule::unary => {
            let (mut inner, location, span) = rules::get_data_from_rule(&pair, script);
            let next = rules::fetch_next_pair(&mut inner, &location, &span)?;
            parse_operand(next, script)
        }
        Rule::negation => {
            let (mut inner, location, span) = rules::get_data_from_rule(&pair, script);
            let operand = rules::fetch_next_pair(&mut inner, &location, &span)?;
            Ok(AstNode::new(
                AstNodeKind::UnaryOp {
                    op: UnaryOperator::Minus,
                    expr: Box::new(parse_operand(operand, script)?),
                },
                location,
                span,
            ))
        }
        Rule::primary => parse_primary_rule(pair, script),
        other => {
            let (_, location, span) = rules::get_data_from_rule(&pair, script);
            Err(rules::syntax_error(
                format!("Unexpected operand rule {:?}.", other),
                "lucix.ast.expr.parse_operand",
                &location,
                &span,
            ))
        }
    }
}

fn parse_primary_rule(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let inner = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    match inner.as_rule() {
        Rule::integer => {
            let text = inner.as_str();
            let value = text.parse::<i32>().map_err(|_| {
                rules::syntax_error(
                    format!("Integer literal {} does not fit in 32 bits.", text),
                    "lucix.ast.expr.parse_primary_rule",
                    &location,
                    &span,
                )
            })?;
            Ok(AstNode::new(AstNodeKind::Integer { value }, location, span))
        }
        Rule::identifier => Ok(AstNode::new(
            AstNodeKind::Identifier {
                name: inner.as_str().to_string(),
            },
            location,
            span,
        )),
        Rule::call => parse_call_rule(inner, script),
        Rule::expression => parse_expression_rule(inner, script),
        other => Err(rules::syntax_error(
            format!("Unexpected primary rule {:?}.", other),
            "lucix.ast.expr.parse_primary_rule",
            &location,
            &span,
        )),
    }
}

fn parse_call_rule(
    pair: pest::iterators::Pair<Rule>,
    script: &script::Script,
) -> Result<AstNode, Box<dyn LucixErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let callee = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?
        .as_str()
        .to_string();
    let args = match inner_pairs.next() {
        Some(arguments) => arguments
            .into_inner()
            .map(|arg| parse_expression_rule(arg, script))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    Ok(AstNode::new(
        AstNodeKind::Call { callee, args },
        location,
        span,
    ))
}
