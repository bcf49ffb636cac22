use std::sync::Arc;

use storage::ItemStore;
use vocab_core::scheduler::Scheduler;

use crate::Clock;
use crate::error::AppServicesError;
use crate::library_service::LibraryService;
use crate::sessions::{CompletionHook, SessionEngine};

/// Assembles app-facing services over one shared item store.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    scheduler: Scheduler,
    store: ItemStore,
    library: Arc<LibraryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        scheduler: Scheduler,
    ) -> Result<Self, AppServicesError> {
        let store = ItemStore::sqlite(db_url).await?;
        Ok(Self::from_store(store, clock, scheduler))
    }

    /// Build services over a volatile in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock, scheduler: Scheduler) -> Self {
        Self::from_store(ItemStore::in_memory(), clock, scheduler)
    }

    #[must_use]
    pub fn from_store(store: ItemStore, clock: Clock, scheduler: Scheduler) -> Self {
        let library = Arc::new(
            LibraryService::new(clock, store.clone()).with_scheduler(scheduler.clone()),
        );
        Self {
            clock,
            scheduler,
            store,
            library,
        }
    }

    #[must_use]
    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    #[must_use]
    pub fn library(&self) -> Arc<LibraryService> {
        Arc::clone(&self.library)
    }

    /// A fresh engine sharing this store, clock and scheduler.
    #[must_use]
    pub fn session_engine(&self) -> SessionEngine {
        SessionEngine::new(self.store.clone())
            .with_clock(self.clock)
            .with_scheduler(self.scheduler.clone())
    }

    /// Like [`AppServices::session_engine`] with a completion hook attached.
    #[must_use]
    pub fn session_engine_with_hook(&self, hook: CompletionHook) -> SessionEngine {
        self.session_engine().with_on_complete(hook)
    }
}
