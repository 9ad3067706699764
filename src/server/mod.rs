//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpServer, web};

use bookshelf::domain::{AccountService, CatalogService};
use bookshelf::inbound::http::attributes::{create_author, create_tag, list_authors, list_tags};
use bookshelf::inbound::http::books::{
    create_book, delete_book, get_book, list_books, patch_book, replace_book, upload_book_image,
};
use bookshelf::inbound::http::health::{HealthState, live, ready};
use bookshelf::inbound::http::state::HttpState;
use bookshelf::inbound::http::users::{
    current_user, login, logout, register, update_current_user,
};
use bookshelf::outbound::persistence::{
    DbPool, DieselAttributeRepository, DieselBookRepository, DieselUserRepository, PoolConfig,
};
use bookshelf::outbound::security::Argon2PasswordHasher;
use bookshelf::outbound::storage::FsImageStore;
#[cfg(debug_assertions)]
use bookshelf::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Build the handler state from configuration: connection pool, adapters,
/// and the domain services on top of them.
async fn build_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;

    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let attributes = Arc::new(DieselAttributeRepository::new(pool.clone()));
    let books = Arc::new(DieselBookRepository::new(pool));
    let images = Arc::new(FsImageStore::open(&config.media_root)?);

    let accounts = AccountService::new(users, Arc::new(Argon2PasswordHasher::new()));
    let catalog = CatalogService::new(attributes, books, images);
    Ok(HttpState::new(accounts, catalog))
}

fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

fn build_app(
    state: HttpState,
    health_state: web::Data<HealthState>,
    key: Key,
    cookie_secure: bool,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .wrap(session_middleware(key, cookie_secure))
        .service(register)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(update_current_user)
        .service(list_tags)
        .service(create_tag)
        .service(list_authors)
        .service(create_author)
        .service(list_books)
        .service(create_book)
        .service(get_book)
        .service(replace_book)
        .service(patch_book)
        .service(delete_book)
        .service(upload_book_image);

    let app = App::new()
        .app_data(web::Data::new(state))
        .app_data(health_state)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Run the HTTP server until shutdown.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let state = build_state(&config).await?;
    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();
    let key = config.session_key.clone();
    let cookie_secure = config.cookie_secure;

    let server = HttpServer::new(move || {
        build_app(
            state.clone(),
            server_health_state.clone(),
            key.clone(),
            cookie_secure,
        )
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    server.run().await
}
