//! Application state management

use std::sync::Arc;

use crate::{config::Config, listing::NoteLister, store::NoteStore};

/// Application state shared across handlers
#[derive(Debug)]
pub struct AppState<S> {
    config: Arc<Config>,
    lister: NoteLister<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            lister: self.lister.clone(),
        }
    }
}

impl<S: NoteStore> AppState<S> {
    /// Create state over `store`
    pub fn new(config: Config, store: Arc<S>) -> Self {
        Self {
            config: Arc::new(config),
            lister: NoteLister::new(store),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The note store
    pub fn store(&self) -> &Arc<S> {
        self.lister.store()
    }

    /// The pagination engine over [`store`](Self::store)
    pub fn lister(&self) -> &NoteLister<S> {
        &self.lister
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryNoteStore;

    #[test]
    fn test_state_shares_store() {
        let store = Arc::new(MemoryNoteStore::new());
        let state = AppState::new(Config::default(), Arc::clone(&store));
        let cloned = state.clone();

        assert!(Arc::ptr_eq(state.store(), &store));
        assert!(Arc::ptr_eq(cloned.store(), state.lister().store()));
        assert_eq!(cloned.config().service.name, "notes-service");
    }
}
