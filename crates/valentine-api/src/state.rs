use std::sync::Arc;

use valentine_db::Database;
use valentine_gateway::dispatcher::Dispatcher;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub dispatcher: Dispatcher,
}

impl AppStateInner {
    pub fn new(db: Database, dispatcher: Dispatcher) -> AppState {
        Arc::new(Self { db, dispatcher })
    }
}
