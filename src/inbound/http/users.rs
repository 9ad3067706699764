//! Users API handlers.
//!
//! ```text
//! POST /api/v1/users          {"email":"...","password":"...","name":"..."}
//! POST /api/v1/users/login    {"email":"...","password":"..."}
//! POST /api/v1/users/logout
//! GET  /api/v1/users/me
//! PATCH /api/v1/users/me      {"name":"...","password":"..."}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ProfilePatch, RegistrationInput, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration request body.
///
/// All three fields are required; they are optional here so validation can
/// report every missing field at once instead of failing on deserialisation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial profile update body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Public user profile; the credential never appears here.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.as_i64(),
            email: value.email.into(),
            name: value.name,
        }
    }
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let user = state
        .accounts
        .register(RegistrationInput {
            email: payload.email,
            name: payload.name,
            password: payload.password,
        })
        .await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Invalid credentials", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .accounts
        .authenticate(&payload.email, &payload.password)
        .await?;
    session.persist_user(user.id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    responses((status = 200, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/users/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::Ok().finish()
}

/// Fetch the authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current profile", body = UserResponse),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.accounts.profile(user_id).await?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Update the authenticated user's profile.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileUpdateRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let user_id = session.require_user_id()?;
    let payload = payload.into_inner();
    let user = state
        .accounts
        .update_profile(
            user_id,
            ProfilePatch {
                name: payload.name,
                password: payload.password,
            },
        )
        .await?;
    Ok(web::Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::{Value, json};

    fn test_app(
        state: HttpState,
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
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(register)
                    .service(login)
                    .service(logout)
                    .service(current_user)
                    .service(update_current_user),
            )
    }

    fn register_payload() -> Value {
        json!({
            "email": "test@email.com",
            "password": "testpass",
            "name": "Test name",
        })
    }

    #[actix_web::test]
    async fn register_returns_created_without_password() {
        let (_, state) = crate::inbound::http::test_utils::test_state();
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(register_payload())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("email").and_then(Value::as_str),
            Some("test@email.com")
        );
        assert_eq!(body.get("name").and_then(Value::as_str), Some("Test name"));
        assert!(body.get("password").is_none());
    }

    #[actix_web::test]
    async fn register_rejects_duplicates() {
        let (_, state) = crate::inbound::http::test_utils::test_state();
        let app = actix_test::init_service(test_app(state)).await;

        for expected in [StatusCode::CREATED, StatusCode::BAD_REQUEST] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/users")
                    .set_json(register_payload())
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), expected);
        }
    }

    #[actix_web::test]
    async fn register_rejects_short_passwords() {
        let (backends, state) = crate::inbound::http::test_utils::test_state();
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(json!({
                    "email": "test@email.com",
                    "password": "pw",
                    "name": "Test",
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        // Failed registrations must not leave a user behind.
        use crate::domain::EmailAddress;
        use crate::domain::ports::UserRepository;
        let stored = backends
            .store
            .find_credentials(&EmailAddress::new("test@email.com").expect("email"))
            .await
            .expect("lookup");
        assert!(stored.is_none());
    }

    async fn login_cookie(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        email: &str,
        password: &str,
    ) -> actix_web::cookie::Cookie<'static> {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users/login")
                .set_json(json!({ "email": email, "password": password }))
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

    #[actix_web::test]
    async fn login_establishes_a_session() {
        let (_, state) = crate::inbound::http::test_utils::test_state();
        let app = actix_test::init_service(test_app(state)).await;

        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(register_payload())
                .to_request(),
        )
        .await;
        let cookie = login_cookie(&app, "test@email.com", "testpass").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/users/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("email").and_then(Value::as_str),
            Some("test@email.com")
        );
    }

    #[actix_web::test]
    async fn login_rejects_wrong_credentials() {
        let (_, state) = crate::inbound::http::test_utils::test_state();
        let app = actix_test::init_service(test_app(state)).await;

        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(register_payload())
                .to_request(),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users/login")
                .set_json(json!({ "email": "test@email.com", "password": "wrong" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn me_requires_authentication() {
        let (_, state) = crate::inbound::http::test_utils::test_state();
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/users/me")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn profile_patch_updates_name() {
        let (_, state) = crate::inbound::http::test_utils::test_state();
        let app = actix_test::init_service(test_app(state)).await;

        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(register_payload())
                .to_request(),
        )
        .await;
        let cookie = login_cookie(&app, "test@email.com", "testpass").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri("/api/v1/users/me")
                .cookie(cookie)
                .set_json(json!({ "name": "Renamed" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("name").and_then(Value::as_str), Some("Renamed"));
    }
}
