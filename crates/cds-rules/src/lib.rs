//! Declarative rule engine.
//!
//! Rules are externally authored JSON documents grouped per dictionary
//! version: a boolean condition tree over fact paths plus an event naming
//! the failure. The operator set is closed (standard comparisons plus two
//! clinical date comparators) and evaluation never runs user code.

mod engine;
mod loader;
mod model;
mod operators;

pub use engine::{RuleEngine, RuleFailure};
pub use loader::{RuleCache, load_rules};
pub use model::{Condition, ConditionNode, Conditions, Event, Operator, Rule};
pub use operators::evaluate_operator;
