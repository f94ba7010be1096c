use std::sync::Arc;

use calendify_core::{
    CalendarService, EntityStore, EventService, LogNotifier, MemoryStore, Notifier, PasswordHasher,
    UserService,
};

use crate::hasher::Sha256PasswordHasher;

/// Shared application state: one store handle threaded through every
/// service, no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub calendars: Arc<CalendarService>,
    pub events: Arc<EventService>,
    pub hasher: Arc<dyn PasswordHasher>,
}

impl AppState {
    pub fn new() -> Self {
        let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

        AppState {
            users: Arc::new(UserService::new(store.clone(), notifier.clone())),
            calendars: Arc::new(CalendarService::new(store.clone(), notifier.clone())),
            events: Arc::new(EventService::new(store, notifier)),
            hasher: Arc::new(Sha256PasswordHasher),
        }
    }
}
