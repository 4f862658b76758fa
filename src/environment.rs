use crate::value::{error::RuntimeErrorKind, Value};
use compact_str::{CompactString, ToCompactString};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

/// A scope shared between every closure that captured it.
#[derive(Clone)]
pub struct SharedEnvironment {
    inner: Arc<Mutex<Environment>>,
}

struct Environment {
    values: HashMap<CompactString, Value>,
    parent: Option<SharedEnvironment>,
}

// Closures stored in a scope point back at it, so the bindings are not printed.
impl std::fmt::Debug for SharedEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SharedEnvironment")
            .field("names", &inner.values.keys().collect::<Vec<_>>())
            .field("has_parent", &inner.parent.is_some())
            .finish()
    }
}

impl Default for SharedEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedEnvironment {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Environment {
                values: HashMap::new(),
                parent: None,
            })),
        }
    }

    pub fn new_scope(&self) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Environment {
                values: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Looks the name up in this scope, then outwards through the enclosing scopes.
    pub fn access(&self, name: &str) -> Option<Value> {
        let parent = {
            let inner = self.inner.lock();
            if let Some(value) = inner.values.get(name) {
                return Some(value.clone());
            }
            inner.parent.clone()
        };
        parent.and_then(|parent| parent.access(name))
    }

    /// Overwrites the nearest existing binding. Fails if no scope defines the name.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        let parent = {
            let mut inner = self.inner.lock();
            if let Some(slot) = inner.values.get_mut(name) {
                *slot = value;
                return Ok(());
            }
            inner.parent.clone()
        };
        match parent {
            Some(parent) => parent.assign(name, value),
            None => Err(RuntimeErrorKind::UndefinedVariable),
        }
    }

    /// Binds the name in this scope, shadowing outer bindings.
    pub fn declare(&self, name: &str, value: Value) {
        let mut inner = self.inner.lock();
        inner.values.insert(name.to_compact_string(), value);
    }

    /// The bindings of this scope only, sorted by name.
    pub fn bindings(&self) -> Vec<(CompactString, Value)> {
        let inner = self.inner.lock();
        let mut bindings: Vec<_> = inner
            .values
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        bindings.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));
        bindings
    }
}
