use std::collections::HashMap;

use crate::object::Value;

/// Variables bound during a session. Lives exactly as long as its evaluator.
#[derive(Debug, Default)]
pub struct Heap {
    store: HashMap<String, Value>,
}

impl Heap {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.store.get(name).cloned()
    }

    /// Binds `name`, handing back whatever it was bound to before.
    pub fn set(&mut self, name: &str, value: Value) -> Option<Value> {
        self.store.insert(name.to_string(), value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Bound names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.store.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
