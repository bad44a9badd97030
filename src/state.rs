use crate::models::Transaction;
use std::sync::Arc;

/// Shared handle to the transaction table. The table is loaded once at
/// startup and read-only afterwards, so a plain `Arc` is enough.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<Vec<Transaction>>,
}

impl AppState {
    pub fn new(table: Vec<Transaction>) -> Self {
        Self {
            table: Arc::new(table),
        }
    }
}
