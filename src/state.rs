//! Shared application state.
//!
//! Built once at startup and cloned into every handler. Holds the two
//! process-wide collaborators behind trait objects: the stored-procedure
//! runner and the error observer. No mutable state is shared across
//! requests; the pool inside the runner is internally synchronized.

use crate::config::Config;
use crate::database::{create_pool, MssqlRunner, ProcedureRunner};
use crate::error::ServerError;
use crate::observer::{ErrorObserver, TracingObserver};
use std::sync::Arc;

/// Application state injected into the axum router.
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<dyn ProcedureRunner>,
    pub observer: Arc<dyn ErrorObserver>,
}

impl AppState {
    /// Production state: bb8 pool from config, tracing observer.
    pub async fn from_config(config: &Config) -> Result<Self, ServerError> {
        let pool = create_pool(&config.database).await?;
        Ok(Self {
            runner: Arc::new(MssqlRunner::new(pool)),
            observer: Arc::new(TracingObserver),
        })
    }

    /// Assemble state from explicit collaborators. Used by tests to inject
    /// a mock runner and a counting observer.
    pub fn with_parts(runner: Arc<dyn ProcedureRunner>, observer: Arc<dyn ErrorObserver>) -> Self {
        Self { runner, observer }
    }
}
