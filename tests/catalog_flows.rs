//! End-to-end catalog flows over in-memory persistence: two users, private
//! collections, relational filtering, assigned-only listings, and the
//! replace-vs-merge update contract.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use bookshelf::domain::{AccountService, CatalogService};
use bookshelf::inbound::http::attributes::{create_author, create_tag, list_authors, list_tags};
use bookshelf::inbound::http::books::{
    create_book, delete_book, get_book, list_books, patch_book, replace_book, upload_book_image,
};
use bookshelf::inbound::http::state::HttpState;
use bookshelf::inbound::http::users::{login, register};
use bookshelf::test_support::{InMemoryImageStore, InMemoryStore, StubPasswordHasher};

fn app_state() -> HttpState {
    let store = Arc::new(InMemoryStore::new());
    let images = Arc::new(InMemoryImageStore::new());
    let accounts = AccountService::new(store.clone(), Arc::new(StubPasswordHasher));
    let catalog = CatalogService::new(store.clone(), store, images);
    HttpState::new(accounts, catalog)
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_name("session".to_owned())
                        .cookie_secure(false)
                        .build(),
                )
                .service(
                    web::scope("/api/v1")
                        .service(register)
                        .service(login)
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
                        .service(upload_book_image),
                ),
        )
        .await
    };
}

/// Register and log in, returning the session cookie.
macro_rules! signup {
    ($app:expr, $email:expr) => {{
        let res = test::call_service(
            $app,
            test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(json!({ "email": $email, "password": "testpass", "name": "Reader" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let res = test::call_service(
            $app,
            test::TestRequest::post()
                .uri("/api/v1/users/login")
                .set_json(json!({ "email": $email, "password": "testpass" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        res.response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie")
            .into_owned()
    }};
}

async fn post_json(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &Cookie<'static>,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri(uri)
            .cookie(cookie.clone())
            .set_json(body)
            .to_request(),
    )
    .await;
    let status = res.status();
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

async fn get_json(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &Cookie<'static>,
    uri: &str,
) -> (StatusCode, Value) {
    let res = test::call_service(
        app,
        test::TestRequest::get()
            .uri(uri)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let status = res.status();
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

fn titles(listing: &Value) -> Vec<&str> {
    listing
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|book| book.get("title").and_then(Value::as_str))
        .collect()
}

#[actix_web::test]
async fn tagged_book_scenario_end_to_end() {
    // Create two tags, attach them to a new book, then filter by one tag.
    // A second user's identically named tag must not satisfy the filter.
    let app = test_app!(app_state());
    let alice = signup!(&app, "alice@email.com");

    let (status, realism) = post_json(&app, &alice, "/api/v1/tags", json!({ "name": "Realism" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, history) = post_json(&app, &alice, "/api/v1/tags", json!({ "name": "History" })).await;
    let realism_id = realism.get("id").and_then(Value::as_i64).expect("id");
    let history_id = history.get("id").and_then(Value::as_i64).expect("id");

    let (status, book) = post_json(
        &app,
        &alice,
        "/api/v1/books",
        json!({
            "title": "Withering heights",
            "tags": [realism_id, history_id],
            "pages": 300,
            "year": 1892,
            "price": 20.00,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book.get("price").and_then(Value::as_str), Some("20.00"));

    // The other user's "Realism" gets a different id and stays invisible.
    let bob = signup!(&app, "bob@email.com");
    let (_, bobs_realism) = post_json(&app, &bob, "/api/v1/tags", json!({ "name": "Realism" })).await;
    assert_ne!(bobs_realism.get("id"), realism.get("id"));

    let (status, listing) =
        get_json(&app, &alice, &format!("/api/v1/books?tags={realism_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&listing), vec!["Withering heights"]);

    let (_, bobs_listing) =
        get_json(&app, &bob, &format!("/api/v1/books?tags={realism_id}")).await;
    assert_eq!(bobs_listing.as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn collections_are_private_per_user() {
    let app = test_app!(app_state());
    let alice = signup!(&app, "alice@email.com");
    let bob = signup!(&app, "bob@email.com");

    post_json(&app, &alice, "/api/v1/tags", json!({ "name": "Science" })).await;
    post_json(&app, &bob, "/api/v1/tags", json!({ "name": "History" })).await;
    let (_, book) = post_json(
        &app,
        &bob,
        "/api/v1/books",
        json!({ "title": "Bob book", "pages": 10, "year": 2000, "price": "3.00" }),
    )
    .await;
    let bob_book_id = book.get("id").and_then(Value::as_i64).expect("id");

    let (_, tags) = get_json(&app, &alice, "/api/v1/tags").await;
    let names: Vec<&str> = tags
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|t| t.get("name").and_then(Value::as_str))
        .collect();
    assert_eq!(names, vec!["Science"]);

    let (_, books) = get_json(&app, &alice, "/api/v1/books").await;
    assert_eq!(books.as_array().map(Vec::len), Some(0));

    // Bob's book reads as missing for alice, exactly like a bad id.
    let (status, _) = get_json(&app, &alice, &format!("/api/v1/books/{bob_book_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get_json(&app, &alice, "/api/v1/books/99999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn cross_owner_relation_references_are_rejected() {
    let app = test_app!(app_state());
    let alice = signup!(&app, "alice@email.com");
    let bob = signup!(&app, "bob@email.com");

    let (_, bobs_tag) = post_json(&app, &bob, "/api/v1/tags", json!({ "name": "Realism" })).await;
    let bobs_tag_id = bobs_tag.get("id").and_then(Value::as_i64).expect("id");

    let (status, body) = post_json(
        &app,
        &alice,
        "/api/v1/books",
        json!({
            "title": "Sneaky",
            "tags": [bobs_tag_id],
            "pages": 1,
            "year": 2000,
            "price": "1.00",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let field = body
        .get("details")
        .and_then(|d| d.get("errors"))
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|e| e.get("field"))
        .and_then(Value::as_str);
    assert_eq!(field, Some("tags"));
}

#[actix_web::test]
async fn assigned_only_deduplicates_shared_attributes() {
    let app = test_app!(app_state());
    let alice = signup!(&app, "alice@email.com");

    let (_, tag) = post_json(&app, &alice, "/api/v1/tags", json!({ "name": "Thriller" })).await;
    let tag_id = tag.get("id").and_then(Value::as_i64).expect("id");
    post_json(&app, &alice, "/api/v1/tags", json!({ "name": "Unused" })).await;
    let (_, author) = post_json(&app, &alice, "/api/v1/authors", json!({ "name": "Pio Baroja" })).await;
    let author_id = author.get("id").and_then(Value::as_i64).expect("id");

    for title in ["First book", "Second book"] {
        let (status, _) = post_json(
            &app,
            &alice,
            "/api/v1/books",
            json!({
                "title": title,
                "tags": [tag_id],
                "authors": [author_id],
                "pages": 100,
                "year": 1984,
                "price": "5.00",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, tags) = get_json(&app, &alice, "/api/v1/tags?assigned_only=1").await;
    assert_eq!(tags.as_array().map(Vec::len), Some(1), "tag listed once");
    let (_, authors) = get_json(&app, &alice, "/api/v1/authors?assigned_only=1").await;
    assert_eq!(authors.as_array().map(Vec::len), Some(1), "author listed once");

    let (_, all_tags) = get_json(&app, &alice, "/api/v1/tags?assigned_only=0").await;
    assert_eq!(all_tags.as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn absent_and_empty_filters_return_everything() {
    let app = test_app!(app_state());
    let alice = signup!(&app, "alice@email.com");

    for title in ["First", "Second"] {
        post_json(
            &app,
            &alice,
            "/api/v1/books",
            json!({ "title": title, "pages": 1, "year": 2000, "price": "1.00" }),
        )
        .await;
    }

    let (_, unfiltered) = get_json(&app, &alice, "/api/v1/books").await;
    assert_eq!(unfiltered.as_array().map(Vec::len), Some(2));
    let (_, empty_param) = get_json(&app, &alice, "/api/v1/books?tags=").await;
    assert_eq!(empty_param.as_array().map(Vec::len), Some(2));
    // Newest first.
    assert_eq!(titles(&unfiltered), vec!["Second", "First"]);
}

#[actix_web::test]
async fn replace_clears_merge_keeps_relations() {
    let app = test_app!(app_state());
    let alice = signup!(&app, "alice@email.com");

    let (_, tag) = post_json(&app, &alice, "/api/v1/tags", json!({ "name": "Realism" })).await;
    let tag_id = tag.get("id").and_then(Value::as_i64).expect("id");
    let (_, book) = post_json(
        &app,
        &alice,
        "/api/v1/books",
        json!({
            "title": "Withering heights",
            "tags": [tag_id],
            "pages": 300,
            "year": 1892,
            "price": "20.00",
        }),
    )
    .await;
    let book_id = book.get("id").and_then(Value::as_i64).expect("id");

    // Partial update omitting tags: the tag stays.
    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/books/{book_id}"))
            .cookie(alice.clone())
            .set_json(json!({ "year": 1900 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let patched: Value = test::read_body_json(res).await;
    assert_eq!(patched.get("tags").and_then(Value::as_array).map(Vec::len), Some(1));
    assert_eq!(patched.get("year").and_then(Value::as_i64), Some(1900));

    // Full update omitting tags: the tag is cleared.
    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/books/{book_id}"))
            .cookie(alice.clone())
            .set_json(json!({
                "title": "Withering heights",
                "pages": 300,
                "year": 1892,
                "price": "20.00",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let replaced: Value = test::read_body_json(res).await;
    assert_eq!(replaced.get("tags").and_then(Value::as_array).map(Vec::len), Some(0));
}

#[actix_web::test]
async fn cover_image_upload_validates_content() {
    let app = test_app!(app_state());
    let alice = signup!(&app, "alice@email.com");

    let (_, book) = post_json(
        &app,
        &alice,
        "/api/v1/books",
        json!({ "title": "Sample book", "pages": 1, "year": 2000, "price": "1.00" }),
    )
    .await;
    let book_id = book.get("id").and_then(Value::as_i64).expect("id");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/books/{book_id}/image"))
            .cookie(alice.clone())
            .set_payload("plain text, not an image")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0];
    jpeg.extend_from_slice(b"jpeg payload");
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/books/{book_id}/image"))
            .cookie(alice.clone())
            .set_payload(jpeg)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let path = body
        .get("coverImage")
        .and_then(Value::as_str)
        .expect("cover path");
    assert!(path.starts_with("covers/") && path.ends_with(".jpg"));

    // The detail view carries the stored path too.
    let (_, detail) = get_json(&app, &alice, &format!("/api/v1/books/{book_id}")).await;
    assert_eq!(detail.get("coverImage").and_then(Value::as_str), Some(path));
}
