//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O: any combination
//! of adapters (Diesel, in-memory) can sit behind the services.

use crate::domain::{AccountService, CatalogService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub catalog: CatalogService,
}

impl HttpState {
    /// Bundle the domain services for handler injection.
    pub fn new(accounts: AccountService, catalog: CatalogService) -> Self {
        Self { accounts, catalog }
    }
}
