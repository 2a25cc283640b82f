//! Cookie-backed session.
//!
//! Handlers that need a signed-in user take a [`SessionContext`] argument;
//! nothing else reads the cookie.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use models::User;
use service::{errors::ServiceError, storage::JsonUserStore};
use tracing::warn;

use crate::errors::ApiError;
use crate::state::ServerState;

pub const AUTH_COOKIE: &str = "auth_token";

/// Proof that the request carries a valid session for `email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub email: String,
}

#[async_trait]
impl FromRequestParts<ServerState> for SessionContext {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(AUTH_COOKIE).map(|c| c.value().to_string()) else {
            return Err(Redirect::to("/login"));
        };
        match state.auth.verify_token(&token) {
            Ok(claims) => Ok(Self { email: claims.sub }),
            Err(e) => {
                warn!(path = %parts.uri.path(), err = %e, "session token rejected");
                Err(Redirect::to("/login"))
            }
        }
    }
}

/// Add the session cookie for a freshly issued token.
pub fn start_session(jar: CookieJar, token: String, secure: bool) -> CookieJar {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    jar.add(cookie)
}

pub fn end_session(jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    jar.remove(cookie)
}

impl SessionContext {
    /// The signed-in user's record in `store`.
    ///
    /// A valid token for an account missing from the document is treated as
    /// an expired session.
    pub fn user<'a>(&self, store: &'a JsonUserStore) -> Result<&'a User, ApiError> {
        store.user_by_email(&self.email).map_err(|e| match e {
            ServiceError::NotFound(_) => {
                warn!(email = %self.email, "session refers to unknown user");
                ApiError::SessionExpired
            }
            other => other.into(),
        })
    }
}
