//! Application state for the shift ledger API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::Mutex;

use crate::config::ConfigLoader;
use crate::store::InMemoryStore;

/// Source of the current wall-clock time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Shared application state.
///
/// Holds the policy configuration, the record store and the clock handlers
/// read `now` from. Writes are serialised through the store mutex.
#[derive(Clone)]
pub struct AppState {
    /// The loaded policy configuration.
    config: Arc<ConfigLoader>,
    /// The record store.
    store: Arc<Mutex<InMemoryStore>>,
    /// Wall clock.
    clock: Clock,
}

impl AppState {
    /// Creates a state that reads the local wall clock.
    pub fn new(config: ConfigLoader, store: InMemoryStore) -> Self {
        Self::with_clock(
            config,
            store,
            Arc::new(|| chrono::Local::now().naive_local()),
        )
    }

    /// Creates a state with an explicit clock.
    pub fn with_clock(config: ConfigLoader, store: InMemoryStore, clock: Clock) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
            clock,
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the shared store.
    pub fn store(&self) -> &Arc<Mutex<InMemoryStore>> {
        &self.store
    }

    /// The current time according to the state's clock.
    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }
}
