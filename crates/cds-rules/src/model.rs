use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of condition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equal,
    NotEqual,
    In,
    NotIn,
    LessThan,
    LessThanInclusive,
    GreaterThan,
    GreaterThanInclusive,
    /// Every fact date is on or before the rule date(s).
    DateIsNotAfter,
    /// Every fact date is on or after the rule date(s).
    DateIsNotBefore,
}

/// A leaf condition: one operator applied to a resolved fact value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    /// Top-level fact key (e.g. "study").
    pub fact: String,
    /// Dot path into the fact, optionally prefixed `$.`
    /// (e.g. `$.participants.diagnoses.date_of_diagnosis`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub operator: Operator,
    pub value: Value,
}

/// Boolean grouping of conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Conditions {
    All(Vec<ConditionNode>),
    Any(Vec<ConditionNode>),
}

/// A node in the condition tree: either a nested group or a leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Group(Conditions),
    Leaf(Condition),
}

/// Event recorded when a rule's conditions do not hold against a fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

/// One declarative rule: named conditions plus the event its failure raises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub name: Option<String>,
    pub conditions: Conditions,
    pub event: Event,
}

impl Rule {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed rule")
    }
}
