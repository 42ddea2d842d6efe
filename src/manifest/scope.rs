//! Lexical scopes.
//!
//! A scope is a frame of bindings plus an optional parent. Lambdas capture
//! the scope they were created in and run in a child of it.

use super::value::{Callable, Value};
use crate::error::ManifestError;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Clone, Default)]
pub struct Scope(Rc<RefCell<Frame>>);

#[derive(Default)]
struct Frame {
    vars: HashMap<String, Value>,
    parent: Option<Scope>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a nested scope whose lookups fall back to `self`.
    pub fn child(&self) -> Self {
        Scope(Rc::new(RefCell::new(Frame {
            vars: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Bind `name` in this frame, replacing any previous binding.
    pub fn create(&self, name: &str, value: Value) {
        self.0.borrow_mut().vars.insert(name.to_string(), value);
    }

    /// Assign to the nearest frame that already binds `name`.
    pub fn set(&self, name: &str, value: Value) -> Result<(), ManifestError> {
        let mut frame = self.0.borrow_mut();
        if let Some(slot) = frame.vars.get_mut(name) {
            *slot = value;
            return Ok(());
        }
        match &frame.parent {
            Some(parent) => parent.set(name, value),
            None => Err(ManifestError::UnboundSymbol(name.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let frame = self.0.borrow();
        match frame.vars.get(name) {
            Some(value) => Some(value.clone()),
            None => frame.parent.as_ref()?.get(name),
        }
    }

    /// Empty this frame, its ancestors and every frame captured by a
    /// lambda reachable from them.
    ///
    /// A lambda bound in the frame it captured keeps that frame alive
    /// through its own `Rc`; clearing the bindings breaks the cycle.
    pub(crate) fn clear_reachable(&self) {
        let mut seen = HashSet::new();
        let mut pending = vec![self.clone()];

        while let Some(scope) = pending.pop() {
            if !seen.insert(Rc::as_ptr(&scope.0)) {
                continue;
            }
            let (vars, parent) = {
                let mut frame = scope.0.borrow_mut();
                (std::mem::take(&mut frame.vars), frame.parent.take())
            };
            let mut values: Vec<Value> = vars.into_values().collect();
            while let Some(value) = values.pop() {
                match value {
                    Value::List(items) => values.extend(items),
                    Value::Callable(Callable::Lambda(lambda)) => pending.push(lambda.scope.clone()),
                    _ => {}
                }
            }
            pending.extend(parent);
        }
    }
}
