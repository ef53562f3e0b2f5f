use chrono::NaiveDate;
use serde_json::Value;

use crate::model::Operator;

/// Evaluate one operator against a resolved fact value and the rule's value.
///
/// Unresolvable comparisons (missing values, unparsable dates, mismatched
/// array lengths) evaluate to false, a defined failure rather than a silent
/// pass.
pub fn evaluate_operator(operator: Operator, fact: &Value, rule: &Value) -> bool {
    match operator {
        Operator::Equal => loose_eq(fact, rule),
        Operator::NotEqual => !loose_eq(fact, rule),
        Operator::In => rule
            .as_array()
            .is_some_and(|candidates| candidates.iter().any(|c| loose_eq(fact, c))),
        Operator::NotIn => rule
            .as_array()
            .is_some_and(|candidates| !candidates.iter().any(|c| loose_eq(fact, c))),
        Operator::LessThan => numeric_cmp(fact, rule).is_some_and(|ord| ord.is_lt()),
        Operator::LessThanInclusive => numeric_cmp(fact, rule).is_some_and(|ord| ord.is_le()),
        Operator::GreaterThan => numeric_cmp(fact, rule).is_some_and(|ord| ord.is_gt()),
        Operator::GreaterThanInclusive => numeric_cmp(fact, rule).is_some_and(|ord| ord.is_ge()),
        Operator::DateIsNotAfter => date_compare(fact, rule, |f, r| f <= r),
        Operator::DateIsNotBefore => date_compare(fact, rule, |f, r| f >= r),
    }
}

/// Equality that tolerates the string-typed cells tables carry: numbers and
/// booleans compare equal to their canonical string forms.
fn loose_eq(fact: &Value, rule: &Value) -> bool {
    if fact == rule {
        return true;
    }
    match (fact, rule) {
        (Value::String(s), other) | (other, Value::String(s)) => match other {
            Value::Number(n) => s
                .trim()
                .parse::<f64>()
                .ok()
                .zip(n.as_f64())
                .is_some_and(|(a, b)| a == b),
            Value::Bool(b) => s.trim().eq_ignore_ascii_case(if *b { "true" } else { "false" }),
            _ => false,
        },
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn numeric_cmp(fact: &Value, rule: &Value) -> Option<std::cmp::Ordering> {
    let fact = as_number(fact)?;
    let rule = as_number(rule)?;
    fact.partial_cmp(&rule)
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y/%m/%d"))
        .ok()
}

/// Date comparison over the three supported shapes: scalar/scalar,
/// equal-length array/array (elementwise), and scalar against every element
/// of an array. All pairs must satisfy `cmp` for the comparison to pass.
fn date_compare(fact: &Value, rule: &Value, cmp: impl Fn(NaiveDate, NaiveDate) -> bool) -> bool {
    match (fact, rule) {
        (Value::Array(facts), Value::Array(rules)) => {
            if facts.len() != rules.len() {
                return false;
            }
            facts.iter().zip(rules).all(|(f, r)| {
                match (parse_date(f), parse_date(r)) {
                    (Some(f), Some(r)) => cmp(f, r),
                    _ => false,
                }
            })
        }
        (fact, Value::Array(rules)) => {
            let Some(fact) = parse_date(fact) else {
                return false;
            };
            rules
                .iter()
                .all(|r| parse_date(r).is_some_and(|r| cmp(fact, r)))
        }
        (Value::Array(facts), rule) => {
            let Some(rule) = parse_date(rule) else {
                return false;
            };
            facts
                .iter()
                .all(|f| parse_date(f).is_some_and(|f| cmp(f, rule)))
        }
        (fact, rule) => match (parse_date(fact), parse_date(rule)) {
            (Some(fact), Some(rule)) => cmp(fact, rule),
            _ => false,
        },
    }
}
