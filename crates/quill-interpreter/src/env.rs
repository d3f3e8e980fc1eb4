//! Environments and bindings for the Quill interpreter.
//!
//! Environments form a chain of frames walked for identifier resolution.
//! Frames are shared (`Rc`) because a frame created for a call or block can
//! be referenced from deeper frames while they run; a frame is released when
//! the last reference to it goes away. Bindings never form cycles, so
//! reference counting is sufficient.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use quill_syntax::error::{runtime_error, Result};

use crate::value::Value;

/// A variable slot: the current value plus its const flag.
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub is_const: bool,
}

/// A shared handle to one frame in the environment chain.
#[derive(Clone)]
pub struct Env {
    scope: Rc<RefCell<Scope>>,
}

struct Scope {
    vars: HashMap<String, Binding>,
    parent: Option<Env>,
}

impl Env {
    /// Creates the root frame of a chain.
    pub fn new_root() -> Self {
        Self {
            scope: Rc::new(RefCell::new(Scope {
                vars: HashMap::new(),
                parent: None,
            })),
        }
    }

    /// Creates a child frame whose lookups fall through to `self`.
    pub fn child(&self) -> Env {
        Self {
            scope: Rc::new(RefCell::new(Scope {
                vars: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Binds `name` in this frame, replacing any existing local binding.
    pub fn define(&self, name: String, value: Value, is_const: bool) {
        self.scope
            .borrow_mut()
            .vars
            .insert(name, Binding { value, is_const });
    }

    /// True when `name` is bound in this frame (parents are not consulted).
    pub fn exists_local(&self, name: &str) -> bool {
        self.scope.borrow().vars.contains_key(name)
    }

    /// Resolves `name` by walking the chain outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        let scope = self.scope.borrow();
        if let Some(binding) = scope.vars.get(name) {
            return Some(binding.value.clone());
        }
        scope.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Assigns to `name`: updates the nearest non-const slot up the chain, or
    /// creates a fresh non-const binding in this (innermost) frame when the
    /// name is not visible anywhere.
    pub fn assign(&self, name: &str, value: Value) -> Result<()> {
        if self.update_existing(name, &value)? {
            return Ok(());
        }
        self.define(name.to_string(), value, false);
        Ok(())
    }

    fn update_existing(&self, name: &str, value: &Value) -> Result<bool> {
        let mut scope = self.scope.borrow_mut();
        if let Some(binding) = scope.vars.get_mut(name) {
            if binding.is_const {
                return runtime_error(format!("Cannot assign to const variable '{}'", name));
            }
            binding.value = value.clone();
            return Ok(true);
        }
        match &scope.parent {
            Some(parent) => parent.update_existing(name, value),
            None => Ok(false),
        }
    }
}
