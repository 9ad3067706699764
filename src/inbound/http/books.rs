//! Book API handlers.
//!
//! ```text
//! GET    /api/v1/books?tags=1,2&authors=3
//! POST   /api/v1/books
//! GET    /api/v1/books/{id}
//! PUT    /api/v1/books/{id}
//! PATCH  /api/v1/books/{id}
//! DELETE /api/v1/books/{id}
//! POST   /api/v1/books/{id}/image
//! ```
//!
//! List responses carry relation ids; the detail response expands tags and
//! authors into full objects. PUT applies the replace strategy (omitted
//! relation lists are cleared), PATCH the merge strategy.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::catalog::BookDetail;
use crate::domain::{Book, BookFilter, BookPatch, Price, RelationStrategy, parse_id_filter};
use crate::inbound::http::ApiResult;
use crate::inbound::http::attributes::AttributeResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request body shared by create and update.
///
/// Every field is optional at the transport level; which ones are required,
/// and what an omission means, depends on the operation and is decided in
/// the domain.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookBody {
    pub title: Option<String>,
    pub pages: Option<i32>,
    pub year: Option<i32>,
    /// Decimal string or number with at most two decimal places.
    #[schema(value_type = Option<String>, example = "20.00")]
    pub price: Option<Price>,
    pub link: Option<String>,
    pub tags: Option<Vec<i64>>,
    pub authors: Option<Vec<i64>>,
}

impl From<BookBody> for BookPatch {
    fn from(value: BookBody) -> Self {
        Self {
            title: value.title,
            pages: value.pages,
            year: value.year,
            price: value.price,
            link: value.link,
            tag_ids: value.tags,
            author_ids: value.authors,
        }
    }
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Deserialize)]
pub struct BookListQuery {
    /// Comma-separated tag ids; books linked to at least one match.
    pub tags: Option<String>,
    /// Comma-separated author ids; books linked to at least one match.
    pub authors: Option<String>,
}

/// A book as returned by list, create, and update responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub pages: i32,
    pub year: i32,
    #[schema(value_type = String, example = "20.00")]
    pub price: Price,
    pub link: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Vec<i64>,
    pub authors: Vec<i64>,
}

impl From<Book> for BookResponse {
    fn from(value: Book) -> Self {
        Self {
            id: value.id,
            title: value.title,
            pages: value.pages,
            year: value.year,
            price: value.price,
            link: value.link,
            cover_image: value.cover_image,
            tags: value.tag_ids.into_iter().collect(),
            authors: value.author_ids.into_iter().collect(),
        }
    }
}

/// A book with expanded relations, returned by the detail endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDetailResponse {
    pub id: i64,
    pub title: String,
    pub pages: i32,
    pub year: i32,
    #[schema(value_type = String, example = "20.00")]
    pub price: Price,
    pub link: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Vec<AttributeResponse>,
    pub authors: Vec<AttributeResponse>,
}

impl From<BookDetail> for BookDetailResponse {
    fn from(value: BookDetail) -> Self {
        let BookDetail {
            book,
            tags,
            authors,
        } = value;
        Self {
            id: book.id,
            title: book.title,
            pages: book.pages,
            year: book.year,
            price: book.price,
            link: book.link,
            cover_image: book.cover_image,
            tags: tags.into_iter().map(AttributeResponse::from).collect(),
            authors: authors.into_iter().map(AttributeResponse::from).collect(),
        }
    }
}

/// List the caller's books, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/books",
    params(
        ("tags" = Option<String>, Query, description = "Comma-separated tag ids; empty means unfiltered"),
        ("authors" = Option<String>, Query, description = "Comma-separated author ids; empty means unfiltered")
    ),
    responses(
        (status = 200, description = "Books", body = [BookResponse]),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "listBooks"
)]
#[get("/books")]
pub async fn list_books(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<BookListQuery>,
) -> ApiResult<web::Json<Vec<BookResponse>>> {
    let owner = session.require_user_id()?;
    let filter = BookFilter {
        tag_ids: parse_id_filter("tags", query.tags.as_deref())?,
        author_ids: parse_id_filter("authors", query.authors.as_deref())?,
    };
    let books = state.catalog.list_books(owner, &filter).await?;
    Ok(web::Json(books.into_iter().map(BookResponse::from).collect()))
}

/// Create a book for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/books",
    request_body = BookBody,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "createBook"
)]
#[post("/books")]
pub async fn create_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BookBody>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let book = state
        .catalog
        .create_book(owner, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(BookResponse::from(book)))
}

/// Fetch one of the caller's books with expanded relations.
#[utoipa::path(
    get,
    path = "/api/v1/books/{id}",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book detail", body = BookDetailResponse),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "getBook"
)]
#[get("/books/{id}")]
pub async fn get_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<BookDetailResponse>> {
    let owner = session.require_user_id()?;
    let detail = state
        .catalog
        .get_book_detail(owner, path.into_inner())
        .await?;
    Ok(web::Json(BookDetailResponse::from(detail)))
}

/// Fully update one of the caller's books.
///
/// Relation lists omitted from the body are cleared.
#[utoipa::path(
    put,
    path = "/api/v1/books/{id}",
    params(("id" = i64, Path, description = "Book id")),
    request_body = BookBody,
    responses(
        (status = 200, description = "Updated book", body = BookResponse),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "replaceBook"
)]
#[put("/books/{id}")]
pub async fn replace_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<BookBody>,
) -> ApiResult<web::Json<BookResponse>> {
    update_book(
        &state,
        &session,
        path.into_inner(),
        payload.into_inner(),
        RelationStrategy::Replace,
    )
    .await
}

/// Partially update one of the caller's books.
///
/// Omitted fields, including relation lists, stay untouched.
#[utoipa::path(
    patch,
    path = "/api/v1/books/{id}",
    params(("id" = i64, Path, description = "Book id")),
    request_body = BookBody,
    responses(
        (status = 200, description = "Updated book", body = BookResponse),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "patchBook"
)]
#[patch("/books/{id}")]
pub async fn patch_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<BookBody>,
) -> ApiResult<web::Json<BookResponse>> {
    update_book(
        &state,
        &session,
        path.into_inner(),
        payload.into_inner(),
        RelationStrategy::Merge,
    )
    .await
}

async fn update_book(
    state: &HttpState,
    session: &SessionContext,
    id: i64,
    payload: BookBody,
    strategy: RelationStrategy,
) -> ApiResult<web::Json<BookResponse>> {
    let owner = session.require_user_id()?;
    let book = state
        .catalog
        .update_book(owner, id, payload.into(), strategy)
        .await?;
    Ok(web::Json(BookResponse::from(book)))
}

/// Delete one of the caller's books.
#[utoipa::path(
    delete,
    path = "/api/v1/books/{id}",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "deleteBook"
)]
#[delete("/books/{id}")]
pub async fn delete_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    state.catalog.delete_book(owner, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Attach a cover image to one of the caller's books.
///
/// The body is the raw image file; PNG and JPEG are accepted.
#[utoipa::path(
    post,
    path = "/api/v1/books/{id}/image",
    params(("id" = i64, Path, description = "Book id")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Cover stored", body = BookResponse),
        (status = 400, description = "Not an image", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "uploadBookImage"
)]
#[post("/books/{id}/image")]
pub async fn upload_book_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Bytes,
) -> ApiResult<web::Json<BookResponse>> {
    let owner = session.require_user_id()?;
    let book = state
        .catalog
        .attach_cover_image(owner, path.into_inner(), &payload)
        .await?;
    Ok(web::Json(BookResponse::from(book)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AttributeKind;
    use crate::inbound::http::test_utils::{TestBackends, test_session_middleware, test_state};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::{Value, json};

    fn test_app(
        state: crate::inbound::http::state::HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(crate::inbound::http::users::login)
                    .service(list_books)
                    .service(create_book)
                    .service(get_book)
                    .service(replace_book)
                    .service(patch_book)
                    .service(delete_book)
                    .service(upload_book_image),
            )
    }

    async fn seeded_session(
        backends: &TestBackends,
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        email: &str,
    ) -> actix_web::cookie::Cookie<'static> {
        backends.store.seed_user(email, "Reader", "hashed:testpass");
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users/login")
                .set_json(json!({ "email": email, "password": "testpass" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    fn sample_payload(title: &str) -> Value {
        json!({
            "title": title,
            "pages": 500,
            "year": 1984,
            "price": 5.00,
        })
    }

    #[actix_web::test]
    async fn listing_requires_authentication() {
        let (_, state) = test_state();
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/books").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn create_with_tags_then_filter_by_tag() {
        // The end-to-end catalogue scenario: two tags, a tagged book, and a
        // second caller whose identically named tag must stay invisible.
        let (backends, state) = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = seeded_session(&backends, &app, "test@email.com").await;

        let owner = crate::domain::UserId::new(1);
        let realism = backends
            .store
            .seed_attribute(owner, AttributeKind::Tag, "Realism");
        let history = backends
            .store
            .seed_attribute(owner, AttributeKind::Tag, "History");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/books")
                .cookie(cookie.clone())
                .set_json(json!({
                    "title": "Withering heights",
                    "tags": [realism.id, history.id],
                    "pages": 300,
                    "year": 1892,
                    "price": 20.00,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            created.get("price").and_then(Value::as_str),
            Some("20.00"),
            "price serialises as a fixed two-decimal string"
        );
        let tag_ids = created.get("tags").and_then(Value::as_array).expect("tags");
        assert_eq!(tag_ids.len(), 2);

        // Another caller's identically named tag must not satisfy the filter.
        let other = backends
            .store
            .seed_user("other@email.com", "Other", "hashed:testpass");
        backends
            .store
            .seed_attribute(other, AttributeKind::Tag, "Realism");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/books?tags={}", realism.id))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let listed: Value = actix_test::read_body_json(res).await;
        let titles: Vec<&str> = listed
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|book| book.get("title").and_then(Value::as_str))
            .collect();
        assert_eq!(titles, vec!["Withering heights"]);
    }

    #[actix_web::test]
    async fn empty_filter_parameter_means_unfiltered() {
        let (backends, state) = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = seeded_session(&backends, &app, "test@email.com").await;

        for title in ["First", "Second"] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/books")
                    .cookie(cookie.clone())
                    .set_json(sample_payload(title))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::CREATED);
        }

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/books?tags=&authors=")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let listed: Value = actix_test::read_body_json(res).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn malformed_filter_is_rejected() {
        let (backends, state) = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = seeded_session(&backends, &app, "test@email.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/books?tags=1,x")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn detail_expands_relations() {
        let (backends, state) = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = seeded_session(&backends, &app, "test@email.com").await;

        let owner = crate::domain::UserId::new(1);
        let tag = backends
            .store
            .seed_attribute(owner, AttributeKind::Tag, "Thriller");
        let author = backends
            .store
            .seed_attribute(owner, AttributeKind::Author, "Pio Baroja");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/books")
                .cookie(cookie.clone())
                .set_json(json!({
                    "title": "Sample book",
                    "pages": 500,
                    "year": 1984,
                    "price": "5.00",
                    "tags": [tag.id],
                    "authors": [author.id],
                }))
                .to_request(),
        )
        .await;
        let created: Value = actix_test::read_body_json(res).await;
        let id = created.get("id").and_then(Value::as_i64).expect("id");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/books/{id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let detail: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            detail
                .get("tags")
                .and_then(Value::as_array)
                .and_then(|tags| tags[0].get("name"))
                .and_then(Value::as_str),
            Some("Thriller")
        );
        assert_eq!(
            detail
                .get("authors")
                .and_then(Value::as_array)
                .and_then(|authors| authors[0].get("name"))
                .and_then(Value::as_str),
            Some("Pio Baroja")
        );
    }

    #[actix_web::test]
    async fn foreign_books_answer_not_found() {
        let (backends, state) = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = seeded_session(&backends, &app, "test@email.com").await;

        let other = backends
            .store
            .seed_user("other@email.com", "Other", "hashed:testpass");
        use crate::domain::ports::{BookRepository, NewBookRecord};
        let foreign = backends
            .store
            .insert(NewBookRecord {
                owner: other,
                title: "Hidden".to_owned(),
                pages: 1,
                year: 1984,
                price: crate::domain::Price::parse("1.00").expect("price"),
                link: None,
                tag_ids: Default::default(),
                author_ids: Default::default(),
            })
            .await
            .expect("seed book");

        for request in [
            actix_test::TestRequest::get().uri(&format!("/api/v1/books/{}", foreign.id)),
            actix_test::TestRequest::delete().uri(&format!("/api/v1/books/{}", foreign.id)),
        ] {
            let res = actix_test::call_service(&app, request.cookie(cookie.clone()).to_request())
                .await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND);
        }
    }

    #[actix_web::test]
    async fn put_clears_tags_patch_keeps_them() {
        let (backends, state) = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = seeded_session(&backends, &app, "test@email.com").await;

        let owner = crate::domain::UserId::new(1);
        let tag = backends
            .store
            .seed_attribute(owner, AttributeKind::Tag, "Realism");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/books")
                .cookie(cookie.clone())
                .set_json(json!({
                    "title": "Withering heights",
                    "tags": [tag.id],
                    "pages": 300,
                    "year": 1892,
                    "price": 20.00,
                }))
                .to_request(),
        )
        .await;
        let created: Value = actix_test::read_body_json(res).await;
        let id = created.get("id").and_then(Value::as_i64).expect("id");

        // PATCH without tags leaves the link intact.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/books/{id}"))
                .cookie(cookie.clone())
                .set_json(json!({ "title": "Renamed" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let patched: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            patched.get("tags").and_then(Value::as_array).map(Vec::len),
            Some(1)
        );

        // PUT without tags clears the link.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/books/{id}"))
                .cookie(cookie)
                .set_json(sample_payload("Withering heights"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let replaced: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            replaced.get("tags").and_then(Value::as_array).map(Vec::len),
            Some(0)
        );
    }

    #[actix_web::test]
    async fn image_upload_round_trips() {
        let (backends, state) = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = seeded_session(&backends, &app, "test@email.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/books")
                .cookie(cookie.clone())
                .set_json(sample_payload("Sample book"))
                .to_request(),
        )
        .await;
        let created: Value = actix_test::read_body_json(res).await;
        let id = created.get("id").and_then(Value::as_i64).expect("id");

        let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        png.extend_from_slice(b"image bytes");
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/books/{id}/image"))
                .cookie(cookie.clone())
                .set_payload(png)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        let path = body
            .get("coverImage")
            .and_then(Value::as_str)
            .expect("cover path");
        assert!(path.ends_with(".png"));
        assert_eq!(backends.images.len(), 1);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/books/{id}/image"))
                .cookie(cookie)
                .set_payload("not an image")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn delete_returns_no_content() {
        let (backends, state) = test_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = seeded_session(&backends, &app, "test@email.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/books")
                .cookie(cookie.clone())
                .set_json(sample_payload("Doomed"))
                .to_request(),
        )
        .await;
        let created: Value = actix_test::read_body_json(res).await;
        let id = created.get("id").and_then(Value::as_i64).expect("id");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/books/{id}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/books/{id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
