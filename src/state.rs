use std::{sync::Arc, time::Duration};

use sqlx::PgPool;

use crate::{
    repository::{Store, memory::MemoryStore, postgres::PostgresStore},
    services::checkout_service::CheckoutEngine,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub checkout: CheckoutEngine,
}

impl AppState {
    pub fn new<S: Store + 'static>(store: Arc<S>, checkout_timeout: Option<Duration>) -> Self {
        let checkout = CheckoutEngine::new(store.clone(), checkout_timeout);
        Self { store, checkout }
    }

    pub fn in_memory(store: MemoryStore, checkout_timeout: Option<Duration>) -> Self {
        Self::new(Arc::new(store), checkout_timeout)
    }

    pub fn postgres(pool: PgPool, checkout_timeout: Option<Duration>) -> Self {
        Self::new(Arc::new(PostgresStore::new(pool)), checkout_timeout)
    }
}
