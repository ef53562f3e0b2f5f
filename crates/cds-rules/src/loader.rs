use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use cds_store::ObjectStore;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::model::Rule;

/// Per-dictionary-version rule cache, write-once for the process lifetime.
/// Sound only because published dictionary versions are immutable.
#[derive(Debug, Default)]
pub struct RuleCache {
    entries: RwLock<HashMap<String, Arc<Vec<Rule>>>>,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rules for a dictionary version, fetching from the store on first
    /// use. Concurrent first loads may both fetch; the first insert wins.
    pub fn get_or_load(
        &self,
        store: &dyn ObjectStore,
        rules_prefix: &str,
        dictionary_version: &str,
    ) -> Arc<Vec<Rule>> {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(rules) = entries.get(dictionary_version) {
                return Arc::clone(rules);
            }
        }
        let loaded = Arc::new(load_rules(store, rules_prefix, dictionary_version));
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            entries
                .entry(dictionary_version.to_string())
                .or_insert(loaded),
        )
    }
}

/// Fetch the rule set stored under `<rules_prefix>/<dictionary_version>`.
///
/// Each stored file holds either one JSON rule object or an array of them.
/// An unreadable or unparsable file is logged and skipped; a listing failure
/// yields an empty set. Rule evaluation is additive and must not take the
/// whole validation run down.
pub fn load_rules(store: &dyn ObjectStore, rules_prefix: &str, dictionary_version: &str) -> Vec<Rule> {
    let prefix = format!("{rules_prefix}/{dictionary_version}");
    let files = match store.list_files(&prefix) {
        Ok(files) => files,
        Err(err) => {
            warn!(%prefix, %err, "could not list rule files");
            return Vec::new();
        }
    };

    let mut rules = Vec::new();
    for file in files {
        let content = match store.read_to_string(&file) {
            Ok(content) => content,
            Err(err) => {
                error!(%file, %err, "failed to load rule file");
                continue;
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(items)) => {
                for item in items {
                    push_rule(&mut rules, item, &file);
                }
            }
            Ok(item) => push_rule(&mut rules, item, &file),
            Err(err) => {
                error!(%file, %err, "failed to parse rule file");
            }
        }
    }

    debug!(
        version = dictionary_version,
        count = rules.len(),
        "loaded rule set"
    );
    rules
}

fn push_rule(rules: &mut Vec<Rule>, value: Value, file: &str) {
    match serde_json::from_value::<Rule>(value) {
        Ok(rule) => rules.push(rule),
        Err(err) => {
            error!(%file, %err, "skipping malformed rule");
        }
    }
}
