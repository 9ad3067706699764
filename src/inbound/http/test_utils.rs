//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

use std::sync::Arc;

use crate::domain::{AccountService, CatalogService};
use crate::inbound::http::state::HttpState;
use crate::test_support::{InMemoryImageStore, InMemoryStore, StubPasswordHasher};

/// In-memory backing stores behind a [`HttpState`] built by [`test_state`].
pub struct TestBackends {
    pub store: Arc<InMemoryStore>,
    pub images: Arc<InMemoryImageStore>,
}

/// Build handler state over fresh in-memory adapters.
pub fn test_state() -> (TestBackends, HttpState) {
    let store = Arc::new(InMemoryStore::new());
    let images = Arc::new(InMemoryImageStore::new());
    let accounts = AccountService::new(store.clone(), Arc::new(StubPasswordHasher));
    let catalog = CatalogService::new(store.clone(), store.clone(), images.clone());
    (
        TestBackends { store, images },
        HttpState::new(accounts, catalog),
    )
}
