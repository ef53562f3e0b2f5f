use serde_json::{Value, json};
use tracing::debug;

use crate::model::{Condition, ConditionNode, Conditions, Rule};
use crate::operators::evaluate_operator;

/// One rule whose conditions did not hold against a fact.
#[derive(Debug, Clone)]
pub struct RuleFailure {
    pub rule_name: String,
    pub event_type: String,
    /// Serialized conditions, for diagnostics.
    pub conditions: Value,
    /// Serialized evaluation outcome, for diagnostics.
    pub result: Value,
}

/// Evaluates a rule set against entity-graph facts.
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule against one fact; a rule whose conditions evaluate
    /// false produces one failure.
    pub fn run(&self, fact: &Value) -> Vec<RuleFailure> {
        let mut failures = Vec::new();
        for rule in &self.rules {
            let passed = eval_conditions(&rule.conditions, fact);
            if !passed {
                debug!(rule = rule.display_name(), "rule conditions not met");
                failures.push(RuleFailure {
                    rule_name: rule.display_name().to_string(),
                    event_type: rule.event.event_type.clone(),
                    conditions: serde_json::to_value(&rule.conditions).unwrap_or(Value::Null),
                    result: json!({ "passed": false }),
                });
            }
        }
        failures
    }

    /// Run every rule against every fact, in fact order.
    pub fn run_all(&self, facts: &[Value]) -> Vec<RuleFailure> {
        facts.iter().flat_map(|fact| self.run(fact)).collect()
    }
}

fn eval_conditions(conditions: &Conditions, fact: &Value) -> bool {
    match conditions {
        Conditions::All(nodes) => nodes.iter().all(|node| eval_node(node, fact)),
        Conditions::Any(nodes) => nodes.iter().any(|node| eval_node(node, fact)),
    }
}

fn eval_node(node: &ConditionNode, fact: &Value) -> bool {
    match node {
        ConditionNode::Group(group) => eval_conditions(group, fact),
        ConditionNode::Leaf(condition) => eval_leaf(condition, fact),
    }
}

fn eval_leaf(condition: &Condition, fact: &Value) -> bool {
    let root = match fact.get(&condition.fact) {
        Some(value) => value,
        None => return false,
    };
    let resolved = match &condition.path {
        Some(path) => resolve_path(root, path),
        None => root.clone(),
    };
    if resolved.is_null() {
        return false;
    }
    evaluate_operator(condition.operator, &resolved, &condition.value)
}

/// Resolve a dot path (optionally `$.`-prefixed) against a fact value.
///
/// Objects are traversed by key. When an array is met mid-path, the
/// remaining segments are resolved per element and the hits are collected
/// into an array; this is how a condition addresses a field of every
/// nested child (e.g. every diagnosis date of every participant).
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let trimmed = path.trim().trim_start_matches("$.");
    if trimmed.is_empty() {
        return root.clone();
    }
    let segments: Vec<&str> = trimmed.split('.').collect();
    resolve_segments(root, &segments)
}

fn resolve_segments(value: &Value, segments: &[&str]) -> Value {
    let Some((head, rest)) = segments.split_first() else {
        return value.clone();
    };
    match value {
        Value::Object(map) => match map.get(*head) {
            Some(next) => resolve_segments(next, rest),
            None => Value::Null,
        },
        Value::Array(items) => {
            let mut collected = Vec::new();
            for item in items {
                match resolve_segments(item, segments) {
                    Value::Null => {}
                    Value::Array(nested) => collected.extend(nested),
                    hit => collected.push(hit),
                }
            }
            if collected.is_empty() {
                Value::Null
            } else {
                Value::Array(collected)
            }
        }
        _ => Value::Null,
    }
}
