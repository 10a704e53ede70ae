//! Inbound event handler registry.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

/// Callback invoked with the payload of an inbound event.
pub type Handler = Arc<dyn Fn(Value) + Send + Sync>;

/// At most one handler per event name.
///
/// Installing a handler for a name that already has one replaces it, so
/// handlers rebuilt after a state change never deliver twice.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    inner: Arc<RwLock<HashMap<String, Handler>>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("events", &self.events())
            .finish()
    }
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler` for `event`. Returns `true` if a previous handler was replaced.
    pub fn set(&self, event: impl Into<String>, handler: Handler) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(event.into(), handler).is_some()
    }

    /// Removes the handler for `event`. Returns `true` if one was installed.
    pub fn remove(&self, event: &str) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(event).is_some()
    }

    /// Handler for `event`, cloned out so it runs without the lock held.
    #[must_use]
    pub fn get(&self, event: &str) -> Option<Handler> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(event).cloned()
    }

    #[must_use]
    pub fn contains(&self, event: &str) -> bool {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.contains_key(event)
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Event names with a handler installed, sorted.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(hits: &Arc<AtomicUsize>) -> Handler {
        let hits = Arc::clone(hits);
        Arc::new(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_set_replaces_instead_of_stacking() {
        let registry = HandlerRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        assert!(!registry.set("message received", counter(&first)));
        assert!(registry.set("message received", counter(&second)));
        assert_eq!(registry.len(), 1);

        let handler = registry.get("message received").unwrap();
        handler(Value::Null);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let registry = HandlerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        registry.set("typing", counter(&hits));
        registry.set("stop typing", counter(&hits));
        assert_eq!(registry.events(), vec!["stop typing", "typing"]);

        assert!(registry.remove("typing"));
        assert!(!registry.remove("typing"));
        assert!(!registry.contains("typing"));

        registry.clear();
        assert!(registry.is_empty());
    }
}
