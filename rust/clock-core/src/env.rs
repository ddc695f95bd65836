//! Lexical scopes.
//!
//! The original interpreter keeps two parallel namespaces (variables
//! and functions) switched by an `is_function` mode flag on the
//! environment. This collapses both into one namespace per scope —
//! functions are ordinary values — which removes the flag entirely
//! (see `SPEC_FULL.md` §4.3/§9).

use crate::value::RuntimeValue;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

pub type ScopeRef = Rc<RefCell<Scope>>;

pub struct Scope {
    vars: FxHashMap<String, RuntimeValue>,
    parent: Option<ScopeRef>,
}

impl Scope {
    pub fn root() -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            vars: FxHashMap::default(),
            parent: None,
        }))
    }

    pub fn child(parent: &ScopeRef) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            vars: FxHashMap::default(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Binds in the current scope, shadowing an outer binding if present.
    pub fn declare(scope: &ScopeRef, name: &str, value: RuntimeValue) {
        scope.borrow_mut().vars.insert(name.to_string(), value);
    }

    /// Looks up a name by walking the parent chain.
    pub fn get(scope: &ScopeRef, name: &str) -> Option<RuntimeValue> {
        let this = scope.borrow();
        if let Some(v) = this.vars.get(name) {
            return Some(v.clone());
        }
        this.parent.as_ref().and_then(|p| Scope::get(p, name))
    }

    /// Writes into whichever scope in the chain already owns `name`,
    /// walking outward the same way [`Scope::get`] does. Falls back to
    /// declaring in the current scope only if `name` is unbound
    /// anywhere in the chain. Without this, a block's own throwaway
    /// child scope (created fresh on every loop iteration or switch
    /// case) would swallow every assignment to an outer variable
    /// instead of mutating it (see `SPEC_FULL.md` §9).
    pub fn assign(scope: &ScopeRef, name: &str, value: RuntimeValue) {
        if scope.borrow().vars.contains_key(name) {
            scope.borrow_mut().vars.insert(name.to_string(), value);
            return;
        }
        let parent = scope.borrow().parent.clone();
        match parent {
            Some(parent) => Scope::assign(&parent, name, value),
            None => Scope::declare(scope, name, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scope_sees_parent_bindings() {
        let root = Scope::root();
        Scope::declare(&root, "x", RuntimeValue::Int(1));
        let child = Scope::child(&root);
        assert!(matches!(Scope::get(&child, "x"), Some(RuntimeValue::Int(1))));
    }

    #[test]
    fn assign_mutates_the_outer_scope_that_owns_the_name() {
        let root = Scope::root();
        Scope::declare(&root, "x", RuntimeValue::Int(1));
        let child = Scope::child(&root);
        Scope::assign(&child, "x", RuntimeValue::Int(2));
        assert!(matches!(Scope::get(&root, "x"), Some(RuntimeValue::Int(2))));
        assert!(matches!(Scope::get(&child, "x"), Some(RuntimeValue::Int(2))));
    }

    #[test]
    fn assign_declares_locally_when_the_name_is_unbound_anywhere() {
        let root = Scope::root();
        let child = Scope::child(&root);
        Scope::assign(&child, "y", RuntimeValue::Int(5));
        assert!(Scope::get(&root, "y").is_none());
        assert!(matches!(Scope::get(&child, "y"), Some(RuntimeValue::Int(5))));
    }
}
