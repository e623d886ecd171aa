use pest_derive::Parser;

use crate::error::{Level, LucixErrorExt};
use crate::location;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct RulesParser;

pub(crate) fn fetch_next_pair<'a>(
    pairs: &mut pest::iterators::Pairs<'a, Rule>,
    location: &Option<location::Location>,
    span: &Option<location::Span>,
) -> Result<pest::iterators::Pair<'a, Rule>, Box<dyn LucixErrorExt>> {
    match pairs.next() {
        Some(pair) => Ok(pair),
        None => Err(syntax_error(
            "Expected more inner pairs but found none.",
            "lucix.ast.rules.fetch_next_pair",
            location,
            span,
        )),
    }
}

pub(crate) fn syntax_error(
    message: impl Into<String>,
    issuer: &str,
    location: &Option<location::Location>,
    span: &Option<location::Span>,
) -> Box<dyn LucixErrorExt> {
    Box::new(crate::ast::err::SyntaxError::with(
        Level::Error,
        message.into(),
        issuer.to_string(),
        location.clone(),
        span.clone(),
    ))
}

pub(crate) fn get_data_from_rule<'a>(
    rule: &pest::iterators::Pair<'a, Rule>,
    script: &crate::script::Script,
) -> (
    pest::iterators::Pairs<'a, Rule>,
    Option<location::Location>,
    Option<location::Span>,
) {
    let inner_rules = rule.clone().into_inner();
    let span = get_span_from_pair(rule, script);
    let location = get_location_from_pair(rule, script);
    (inner_rules, location, span)
}

pub fn get_location_from_pair(
    rule: &pest::iterators::Pair<Rule>,
    script: &crate::script::Script,
) -> Option<location::Location> {
    Some(location::Location::from_position(
        &script.name,
        rule.as_span().start_pos(),
    ))
}

pub fn get_span_from_pair(
    rule: &pest::iterators::Pair<Rule>,
    script: &crate::script::Script,
) -> Option<location::Span> {
    Some(location::Span::from_pest(&script.name, rule.as_span()))
}
