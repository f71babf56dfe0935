//! Front end: a pest grammar over the rule language and the lowering of
//! its parse tree into the flat object pool. Host-supplied port names are
//! prepended to the pool so they claim the lowest register indices.

use crate::canon;
use crate::pool::{FactSide, Obj, Pool};
use matches::debug_assert_matches;
use pest::iterators::Pair;
use pest::{Parser, Span};
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "vera.pest"]
pub struct VeraParser;

type Result<T> = std::result::Result<T, pest::error::Error<Rule>>;

pub(crate) fn new_parser_error(span: Span, message: String) -> pest::error::Error<Rule> {
    pest::error::Error::new_from_span(pest::error::ErrorVariant::CustomError { message }, span)
}

/// Parses a source into the object pool, with `ports` occupying the pool
/// prefix in the order given.
pub fn parse<'s>(source: &'s str, ports: &[&'s str]) -> Result<Pool<'s>> {
    let program = VeraParser::parse(Rule::program, source)?.next().unwrap();
    process_program(program, ports)
}

fn process_program<'s>(pair: Pair<'s, Rule>, ports: &[&'s str]) -> Result<Pool<'s>> {
    debug_assert_matches!(pair.as_rule(), Rule::program);

    let mut pool = Pool::new();
    for &name in ports {
        pool.push(Obj::Port {
            name,
            register: None,
        });
    }

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::delim | Rule::EOI => {}
            Rule::vrule => process_rule(item, &mut pool)?,
            _ => unreachable!(),
        }
    }

    Ok(pool)
}

fn process_rule<'s>(pair: Pair<'s, Rule>, pool: &mut Pool<'s>) -> Result<()> {
    debug_assert_matches!(pair.as_rule(), Rule::vrule);

    let mut pairs = pair.into_inner();
    let lhs = pairs.next().unwrap();
    let rhs = pairs.next().unwrap();
    debug_assert_matches!(lhs.as_rule(), Rule::lhs);
    debug_assert_matches!(rhs.as_rule(), Rule::rhs);

    pool.push(Obj::Lhs);
    for fact in lhs.into_inner() {
        process_lhs_fact(fact, pool);
    }

    pool.push(Obj::Rhs);
    for fact in rhs.into_inner() {
        process_rhs_fact(fact, pool)?;
    }

    Ok(())
}

// The grammar keeps interior whitespace inside the captured run; only the
// edges are trimmed here. Canonicalization happens at interning time.
fn fact_text<'s>(pair: &Pair<'s, Rule>) -> &'s str {
    debug_assert_matches!(pair.as_rule(), Rule::fact_text);
    pair.as_str().trim_matches(canon::is_space)
}

fn process_lhs_fact<'s>(pair: Pair<'s, Rule>, pool: &mut Pool<'s>) {
    debug_assert_matches!(pair.as_rule(), Rule::lhs_fact);

    let mut pairs = pair.into_inner();
    let text = fact_text(&pairs.next().unwrap());
    let keep = pairs.next().is_some();

    pool.push(Obj::Fact {
        text,
        register: None,
        side: FactSide::Lhs { keep },
    });
}

fn process_rhs_fact<'s>(pair: Pair<'s, Rule>, pool: &mut Pool<'s>) -> Result<()> {
    debug_assert_matches!(pair.as_rule(), Rule::rhs_fact);

    let mut pairs = pair.into_inner();
    let text = fact_text(&pairs.next().unwrap());
    let count = match pairs.next() {
        Some(uint) => process_count(uint)?,
        None => 1,
    };

    pool.push(Obj::Fact {
        text,
        register: None,
        side: FactSide::Rhs { count },
    });

    Ok(())
}

fn process_count(pair: Pair<Rule>) -> Result<u32> {
    debug_assert_matches!(pair.as_rule(), Rule::uint);

    let span = pair.as_span();
    let inner = pair.into_inner().next().unwrap();
    let parsed = match inner.as_rule() {
        Rule::hex_uint => u32::from_str_radix(inner.into_inner().next().unwrap().as_str(), 16),
        Rule::oct_uint => u32::from_str_radix(inner.into_inner().next().unwrap().as_str(), 8),
        Rule::bin_uint => u32::from_str_radix(inner.into_inner().next().unwrap().as_str(), 2),
        Rule::dec_uint => u32::from_str_radix(inner.as_str(), 10),
        _ => unreachable!(),
    };

    let count = parsed
        .map_err(|err| new_parser_error(span.clone(), format!("Parsing count failed: {}", err)))?;
    if count == 0 {
        return Err(new_parser_error(span, "Fact count must be positive".to_owned()));
    }

    Ok(count)
}
