//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: all HTTP paths from the inbound layer, the shared error
//! schema wrappers, and the session cookie security scheme. The generated
//! document backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/users/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bookshelf backend API",
        description = "Multi-tenant book catalog: each user manages a private collection of books, tags, and authors."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::attributes::list_tags,
        crate::inbound::http::attributes::create_tag,
        crate::inbound::http::attributes::list_authors,
        crate::inbound::http::attributes::create_author,
        crate::inbound::http::books::list_books,
        crate::inbound::http::books::create_book,
        crate::inbound::http::books::get_book,
        crate::inbound::http::books::replace_book,
        crate::inbound::http::books::patch_book,
        crate::inbound::http::books::delete_book,
        crate::inbound::http::books::upload_book_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema))
)]
pub struct ApiDoc;
