//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the content store named by the configuration
//! - Build services over the store handle
//! - Resolve every handler-definition unit into the route table
//!
//! # Design Decisions
//! - Fail fast: a bad store URL or a conflicting route aborts startup
//! - The route table is frozen before any listener binds

use std::sync::Arc;

use thiserror::Error;

use crate::api;
use crate::config::AppConfig;
use crate::host::Dispatcher;
use crate::routing::{RouteError, RouteTable};
use crate::services::Services;
use crate::store::{self, ContentStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("opening content store: {0}")]
    Store(#[from] StoreError),

    #[error("resolving routes: {0}")]
    Route(#[from] RouteError),
}

/// Everything a host needs to serve.
#[derive(Clone)]
pub struct Application {
    pub config: AppConfig,
    pub services: Services,
    pub dispatcher: Arc<Dispatcher>,
}

/// Build the application from validated configuration.
pub fn bootstrap(config: AppConfig) -> Result<Application, StartupError> {
    let store = store::open(&config.store.database_url)?;
    assemble(config, store)
}

/// Build the application over an already-open store.
pub fn assemble(config: AppConfig, store: Arc<dyn ContentStore>) -> Result<Application, StartupError> {
    let services = Services::new(store, config.admin.token_ttl_hours);
    let table = RouteTable::resolve(api::units(&services))?;

    tracing::info!(routes = table.len(), "Route table resolved");

    Ok(Application {
        config,
        dispatcher: Arc::new(Dispatcher::new(Arc::new(table))),
        services,
    })
}
