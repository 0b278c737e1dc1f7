use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::post,
};
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use uuid::Uuid;

use crate::{
    Config,
    auth::{self, UserClaims, hash_password, verify_password},
    model::{
        CrudRepository, ResourceTyped,
        entity::{UserEntity, UserEntityCreateUpdate},
    },
    web::{
        AppState, AuthenticatedUser, WebError, WebResult, error::ErrorResponse,
        middlewares::AUTH_TOKEN,
    },
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UserCreateUpdateBody {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SigninQuery {
    /// Local path to return to once signed in
    next: Option<String>,
}

impl SigninQuery {
    /// `next` when it is a path on this site.
    fn local_next(&self) -> Option<&str> {
        self.next
            .as_deref()
            .filter(|next| next.starts_with('/') && !next.starts_with("//"))
    }
}

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/signup", post(user_signup_handler))
        .route("/signin", post(user_signin_handler))
        .with_state(state)
}

/// Issues the session cookie for `user_id`.
async fn start_session(cookies: &Cookies, user_id: Uuid) -> WebResult<()> {
    let jwt_key = Config::get_or_init(false).await.app().jwt();
    let token = auth::generate_token(UserClaims::for_user(user_id), jwt_key)
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    let mut cookie = Cookie::new(AUTH_TOKEN, token);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signup",
    request_body = UserCreateUpdateBody,
    description = "Creates new user in database",
    responses(
        (status = 200, description = "User created successfully", body = UserEntity),
        (status = 409, description = "User already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account"
)]
async fn user_signup_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<UserCreateUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_username(state.pool(), &admin, &payload.username)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let payload = UserEntityCreateUpdate {
        username: payload.username,
        password_hash: hash,
        role: None,
    };

    let created = UserEntity::create(state.pool(), &admin, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    start_session(&cookies, created.id()).await?;
    tracing::info!("user {} signed up", created.id());

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signin",
    description = "Authorizes user in the system. Authoring endpoints send anonymous \
                   visitors here with a `next` query parameter",
    request_body = UserCreateUpdateBody,
    params(SigninQuery),
    responses(
        (status = 200, description = "User signed in", body = UserEntity),
        (status = 303, description = "User signed in, sent back to `next`"),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
)]
async fn user_signin_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<SigninQuery>,
    Json(payload): Json<UserCreateUpdateBody>,
) -> WebResult<Response> {
    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_username(state.pool(), &admin, &payload.username)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::auth_invalid_credentials())?;

    let is_verified =
        verify_password(found.hash(), &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    start_session(&cookies, found.id()).await?;

    if let Some(next) = query.local_next() {
        return Ok(Redirect::to(next).into_response());
    }
    Ok((StatusCode::OK, Json(found)).into_response())
}

#[cfg(test)]
mod test {
    use super::*;

    fn query(next: Option<&str>) -> SigninQuery {
        SigninQuery {
            next: next.map(String::from),
        }
    }

    #[test]
    fn only_local_paths_are_followed() {
        assert_eq!(
            query(Some("/api/v1/quizzes/create/1")).local_next(),
            Some("/api/v1/quizzes/create/1")
        );
        assert_eq!(query(Some("https://evil.example/")).local_next(), None);
        assert_eq!(query(Some("//evil.example/")).local_next(), None);
        assert_eq!(query(None).local_next(), None);
    }
}
