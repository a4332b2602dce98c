// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Qualified-name scopes.
//!
//! Scoping is a path stack over two flat maps. The path starts at `"$"`;
//! function definitions push their name, compound statements push `"$"`,
//! while bodies push `"while"`, if/else arms push `"if"` and `"else"`, and
//! struct bodies push the tag. A name declared at path `p` is stored under
//! the key `p.name`, lookup probes ever shorter path prefixes, and leaving
//! a scope purges every key under it.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::raw_type::RawType;

pub struct ScopeContext {
    path: Vec<String>,
    declarations: HashMap<String, Rc<RawType>>,
    definitions: HashSet<String>,
}

impl ScopeContext {
    pub fn new() -> Self {
        ScopeContext {
            path: vec!["$".to_string()],
            declarations: HashMap::new(),
            definitions: HashSet::new(),
        }
    }

    pub fn enter(&mut self, segment: impl Into<String>) {
        self.path.push(segment.into());
    }

    /// Leaves the current scope, purging everything declared under it.
    pub fn leave(&mut self) {
        let prefix = format!("{}.", self.current_path());
        self.declarations.retain(|k, _| !k.starts_with(&prefix));
        self.definitions.retain(|k| !k.starts_with(&prefix));
        self.path.pop();
    }

    /// Leaves without purging. Struct bodies use this: members must stay
    /// reachable under `tag.member` until the enclosing scope dies.
    pub fn leave_keep(&mut self) {
        self.path.pop();
    }

    pub fn at_file_scope(&self) -> bool {
        self.path.len() == 1
    }

    pub fn current_path(&self) -> String {
        self.path.join(".")
    }

    /// The qualified name `name` would get if declared here.
    pub fn qualify(&self, name: &str) -> String {
        format!("{}.{name}", self.current_path())
    }

    /// Innermost-outward lookup: probes `p1.….pn.name`, then
    /// `p1.….pn-1.name`, down to `p1.name`.
    pub fn lookup(&self, name: &str) -> Option<(String, Rc<RawType>)> {
        for depth in (1..=self.path.len()).rev() {
            let key = format!("{}.{name}", self.path[..depth].join("."));
            if let Some(ty) = self.declarations.get(&key) {
                return Some((key, ty.clone()));
            }
        }
        None
    }

    pub fn get(&self, qualified: &str) -> Option<Rc<RawType>> {
        self.declarations.get(qualified).cloned()
    }

    pub fn declare(&mut self, qualified: String, ty: Rc<RawType>) {
        self.declarations.insert(qualified, ty);
    }

    pub fn define(&mut self, qualified: String) {
        self.definitions.insert(qualified);
    }

    pub fn is_defined(&self, qualified: &str) -> bool {
        self.definitions.contains(qualified)
    }
}

impl Default for ScopeContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> Rc<RawType> {
        Rc::new(RawType::Int)
    }

    #[test]
    fn qualifies_against_the_path() {
        let mut scope = ScopeContext::new();
        assert_eq!(scope.qualify("g"), "$.g");
        scope.enter("main");
        scope.enter("$");
        assert_eq!(scope.qualify("a"), "$.main.$.a");
        scope.enter("while");
        assert_eq!(scope.qualify("a"), "$.main.$.while.a");
    }

    #[test]
    fn lookup_walks_outward() {
        let mut scope = ScopeContext::new();
        scope.declare("$.g".into(), int());
        scope.enter("main");
        scope.declare("$.main.p".into(), int());
        scope.enter("$");
        scope.declare("$.main.$.a".into(), int());

        assert_eq!(scope.lookup("a").map(|(k, _)| k), Some("$.main.$.a".into()));
        assert_eq!(scope.lookup("p").map(|(k, _)| k), Some("$.main.p".into()));
        assert_eq!(scope.lookup("g").map(|(k, _)| k), Some("$.g".into()));
        assert_eq!(scope.lookup("missing"), None);
    }

    #[test]
    fn inner_declaration_shadows_outer() {
        let mut scope = ScopeContext::new();
        scope.declare("$.a".into(), int());
        scope.enter("main");
        scope.enter("$");
        scope.declare("$.main.$.a".into(), Rc::new(RawType::Char));
        let (key, ty) = scope.lookup("a").unwrap();
        assert_eq!(key, "$.main.$.a");
        assert_eq!(*ty, RawType::Char);
    }

    #[test]
    fn leave_purges_by_prefix() {
        let mut scope = ScopeContext::new();
        scope.enter("main");
        scope.enter("$");
        scope.declare("$.main.$.a".into(), int());
        scope.define("$.main.$.a".into());
        scope.enter("while");
        scope.declare("$.main.$.while.i".into(), int());
        scope.leave();
        assert_eq!(scope.lookup("i"), None);
        assert!(scope.lookup("a").is_some());
        scope.leave();
        assert_eq!(scope.lookup("a"), None);
        assert!(!scope.is_defined("$.main.$.a"));
    }

    #[test]
    fn leave_keep_retains_members() {
        let mut scope = ScopeContext::new();
        scope.enter("s");
        scope.declare("$.s.x".into(), int());
        scope.leave_keep();
        assert!(scope.get("$.s.x").is_some());
        // the members die with the enclosing scope instead
        let mut inner = ScopeContext::new();
        inner.enter("f");
        inner.enter("$");
        inner.enter("s");
        inner.declare("$.f.$.s.x".into(), int());
        inner.leave_keep();
        inner.leave();
        assert!(inner.get("$.f.$.s.x").is_none());
    }
}
