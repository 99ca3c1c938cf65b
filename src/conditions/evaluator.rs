//! If-header evaluation against current lock and entity-tag state.

use super::types::{Condition, ConditionKind, ConditionList, IfHeader, TaggedConditionList};
use crate::error::Result;
use crate::locks::LockToken;
use std::collections::HashMap;
use tracing::debug;

/// Current server state the evaluator matches conditions against.
pub trait ConditionState {
    /// Tokens of the unexpired locks applying to `path`.
    fn valid_tokens(&self, path: &str) -> Result<Vec<LockToken>>;

    /// Current entity tag of `path`, quotes included. `None` when the resource
    /// is missing or has no entity tag.
    fn current_etag(&self, path: &str) -> Result<Option<String>>;
}

/// Evaluate `header`: every group must hold, a group holds when any of its
/// lists holds, a list holds when all of its conditions do.
pub fn evaluate(header: &IfHeader, state: &dyn ConditionState) -> Result<bool> {
    let mut evaluator = Evaluator {
        state,
        tokens: HashMap::new(),
        etags: HashMap::new(),
    };

    for group in &header.groups {
        if !evaluator.group_holds(group)? {
            debug!(path = %group.path, "If header condition group not satisfied");
            return Ok(false);
        }
    }
    Ok(true)
}

struct Evaluator<'a> {
    state: &'a dyn ConditionState,
    tokens: HashMap<String, Vec<LockToken>>,
    etags: HashMap<String, Option<String>>,
}

impl Evaluator<'_> {
    fn group_holds(&mut self, group: &TaggedConditionList) -> Result<bool> {
        for list in &group.lists {
            if self.list_holds(&group.path, list)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn list_holds(&mut self, path: &str, list: &ConditionList) -> Result<bool> {
        for condition in &list.conditions {
            if !self.condition_holds(path, condition)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn condition_holds(&mut self, path: &str, condition: &Condition) -> Result<bool> {
        let matched = match &condition.kind {
            ConditionKind::Token(token) => self.tokens_for(path)?.contains(token),
            ConditionKind::ETag(etag) => self.etag_for(path)? == Some(etag),
        };
        Ok(matched != condition.not)
    }

    fn tokens_for(&mut self, path: &str) -> Result<&Vec<LockToken>> {
        if !self.tokens.contains_key(path) {
            let tokens = self.state.valid_tokens(path)?;
            self.tokens.insert(path.to_string(), tokens);
        }
        Ok(&self.tokens[path])
    }

    fn etag_for(&mut self, path: &str) -> Result<Option<&String>> {
        if !self.etags.contains_key(path) {
            let etag = self.state.current_etag(path)?;
            self.etags.insert(path.to_string(), etag);
        }
        Ok(self.etags[path].as_ref())
    }
}
