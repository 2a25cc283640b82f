use axum::{extract::State, http::StatusCode, response::Redirect, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::info;

use service::auth::domain::{AuthUser, LoginInput, SignupInput};

use crate::errors::ApiError;
use crate::session;
use crate::state::ServerState;

/// Result page for signup/login; the client follows `redirect`.
#[derive(Debug, Serialize)]
pub struct AuthPage {
    pub success: bool,
    pub user: AuthUser,
    pub redirect: &'static str,
}

#[utoipa::path(post, path = "/signup", tag = "auth", request_body = crate::openapi::SignupRequest, responses((status = 201, description = "Signed up", body = crate::openapi::AuthPageDoc), (status = 400, description = "Bad Request"), (status = 409, description = "Email already in use")))]
pub async fn signup(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<SignupInput>,
) -> Result<(StatusCode, CookieJar, Json<AuthPage>), ApiError> {
    let user = {
        let mut store = state.users.open_for_write().await?;
        state.auth.signup(&mut store, input).await?
    };
    let token = state.auth.issue_token(&user.email)?;
    let jar = session::start_session(jar, token, state.cookies.cookie_secure);
    Ok((StatusCode::CREATED, jar, Json(AuthPage { success: true, user, redirect: "/app/dashboard" })))
}

#[utoipa::path(post, path = "/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in", body = crate::openapi::AuthPageDoc), (status = 401, description = "Invalid email or password")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<AuthPage>), ApiError> {
    let store = state.users.open().await?;
    let session = state.auth.login(&store, input)?;
    let jar = session::start_session(jar, session.token, state.cookies.cookie_secure);
    Ok((jar, Json(AuthPage { success: true, user: session.user, redirect: "/app/dashboard" })))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    info!("logout");
    (session::end_session(jar), Redirect::to("/"))
}
