use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::HandlerError;
use crate::handler::SchemeHandler;

/// Handlers of one signer process, looked up by scheme name. Registration order is kept.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn SchemeHandler>>,
    index: HashMap<String, usize>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, handler: Arc<dyn SchemeHandler>) -> Result<(), HandlerError> {
        let scheme = handler.scheme_name().to_string();
        if self.index.contains_key(&scheme) {
            return Err(HandlerError::DuplicateScheme(scheme));
        }
        debug!(scheme, "Handler added");
        self.index.insert(scheme, self.handlers.len());
        self.handlers.push(handler);
        Ok(())
    }

    pub fn get(&self, scheme: &str) -> Option<Arc<dyn SchemeHandler>> {
        self.index.get(scheme).map(|&i| self.handlers[i].clone())
    }

    pub fn find(&self, scheme: &str) -> Result<Arc<dyn SchemeHandler>, HandlerError> {
        self.get(scheme)
            .ok_or_else(|| HandlerError::UnknownScheme(scheme.to_string()))
    }

    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|h| h.scheme_name())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockHandler;

    #[test]
    fn handlers_are_found_by_scheme() {
        let mut registry = HandlerRegistry::new();
        registry.add(Arc::new(MockHandler::new("B"))).unwrap();
        registry.add(Arc::new(MockHandler::new("A"))).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find("A").unwrap().scheme_name(), "A");
        assert_eq!(registry.schemes().collect::<Vec<_>>(), vec!["B", "A"]);
        assert!(registry.get("C").is_none());
        assert!(matches!(registry.find("C"), Err(HandlerError::UnknownScheme(s)) if s == "C"));
    }

    #[test]
    fn duplicate_scheme_is_rejected() {
        let mut registry = HandlerRegistry::new();
        registry.add(Arc::new(MockHandler::new("A"))).unwrap();
        let err = registry.add(Arc::new(MockHandler::new("A"))).unwrap_err();
        assert!(matches!(err, HandlerError::DuplicateScheme(s) if s == "A"));
        assert_eq!(registry.len(), 1);
    }
}
