//! Tag and author API handlers.
//!
//! ```text
//! GET  /api/v1/tags?assigned_only=1
//! POST /api/v1/tags      {"name":"Realism"}
//! GET  /api/v1/authors?assigned_only=1
//! POST /api/v1/authors   {"name":"Oscar Wilde"}
//! ```
//!
//! The two collections share handlers parameterised by [`AttributeKind`];
//! their contracts are identical.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Attribute, AttributeKind};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_assigned_only;

/// Query parameters accepted by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct AttributeListQuery {
    /// Integer flag; non-zero restricts the listing to attributes linked to
    /// at least one of the caller's books.
    pub assigned_only: Option<String>,
}

/// Request body for creating a tag or author.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateAttributeRequest {
    pub name: Option<String>,
}

/// A tag or author as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttributeResponse {
    pub id: i64,
    pub name: String,
}

impl From<Attribute> for AttributeResponse {
    fn from(value: Attribute) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

async fn list_attributes(
    state: &HttpState,
    session: &SessionContext,
    kind: AttributeKind,
    query: AttributeListQuery,
) -> ApiResult<web::Json<Vec<AttributeResponse>>> {
    let owner = session.require_user_id()?;
    let assigned_only = parse_assigned_only(query.assigned_only.as_deref())?;
    let attributes = state
        .catalog
        .list_attributes(owner, kind, assigned_only)
        .await?;
    Ok(web::Json(
        attributes.into_iter().map(AttributeResponse::from).collect(),
    ))
}

async fn create_attribute(
    state: &HttpState,
    session: &SessionContext,
    kind: AttributeKind,
    payload: CreateAttributeRequest,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let attribute = state
        .catalog
        .create_attribute(owner, kind, payload.name.as_deref())
        .await?;
    Ok(HttpResponse::Created().json(AttributeResponse::from(attribute)))
}

/// List the caller's tags, ordered by name descending.
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    params(
        ("assigned_only" = Option<String>, Query, description = "Non-zero integer restricts to tags linked to the caller's books")
    ),
    responses(
        (status = 200, description = "Tags", body = [AttributeResponse]),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "listTags"
)]
#[get("/tags")]
pub async fn list_tags(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AttributeListQuery>,
) -> ApiResult<web::Json<Vec<AttributeResponse>>> {
    list_attributes(&state, &session, AttributeKind::Tag, query.into_inner()).await
}

/// Create a tag for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/tags",
    request_body = CreateAttributeRequest,
    responses(
        (status = 201, description = "Tag created", body = AttributeResponse),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "createTag"
)]
#[post("/tags")]
pub async fn create_tag(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateAttributeRequest>,
) -> ApiResult<HttpResponse> {
    create_attribute(&state, &session, AttributeKind::Tag, payload.into_inner()).await
}

/// List the caller's authors, ordered by name descending.
#[utoipa::path(
    get,
    path = "/api/v1/authors",
    params(
        ("assigned_only" = Option<String>, Query, description = "Non-zero integer restricts to authors linked to the caller's books")
    ),
    responses(
        (status = 200, description = "Authors", body = [AttributeResponse]),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "listAuthors"
)]
#[get("/authors")]
pub async fn list_authors(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AttributeListQuery>,
) -> ApiResult<web::Json<Vec<AttributeResponse>>> {
    list_attributes(&state, &session, AttributeKind::Author, query.into_inner()).await
}

/// Create an author for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/authors",
    request_body = CreateAttributeRequest,
    responses(
        (status = 201, description = "Author created", body = AttributeResponse),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["authors"],
    operation_id = "createAuthor"
)]
#[post("/authors")]
pub async fn create_author(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateAttributeRequest>,
) -> ApiResult<HttpResponse> {
    create_attribute(&state, &session, AttributeKind::Author, payload.into_inner()).await
}
