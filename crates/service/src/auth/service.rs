use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use models::user;
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, AuthUser, LoginInput, SessionClaims, SignupInput};
use super::errors::AuthError;
use crate::errors::ServiceError;
use crate::storage::JsonUserStore;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

/// Auth business service independent of web framework
pub struct AuthService {
    cfg: AuthConfig,
}

impl AuthService {
    pub fn new(cfg: AuthConfig) -> Self { Self { cfg } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, AuthConfig, domain::SignupInput};
    /// use service::storage::JsonUserStore;
    /// let path = std::env::temp_dir().join(format!("doc_users_{}.json", uuid::Uuid::new_v4()));
    /// let svc = AuthService::new(AuthConfig { jwt_secret: "secret".into(), token_ttl: chrono::Duration::hours(1) });
    /// let mut store = tokio_test::block_on(JsonUserStore::load(&path)).unwrap();
    /// let input = SignupInput { name: "Ann".into(), email: "ann@x.com".into(), password: "pw1".into(), confirm_password: "pw1".into() };
    /// let user = tokio_test::block_on(svc.signup(&mut store, input)).unwrap();
    /// assert_eq!(user.email, "ann@x.com");
    /// # let _ = std::fs::remove_file(&path);
    /// ```
    #[instrument(skip(self, store, input), fields(email = %input.email))]
    pub async fn signup(&self, store: &mut JsonUserStore, input: SignupInput) -> Result<AuthUser, AuthError> {
        if input.password != input.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".into()));
        }
        if input.password.is_empty() {
            return Err(AuthError::Validation("password required".into()));
        }
        let email = input.email.trim();
        user::validate_name(&input.name).map_err(ServiceError::from)?;
        user::validate_email(email).map_err(ServiceError::from)?;

        let created = store.add_user(input.name.trim(), email, &input.password).await?;
        info!(email = %created.email, "user_registered");
        Ok(AuthUser::from(created))
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, store, input), fields(email = %input.email))]
    pub fn login(&self, store: &JsonUserStore, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = match store.validate_login(input.email.trim(), &input.password) {
            Ok(u) => u,
            Err(ServiceError::NotFound(_)) | Err(ServiceError::InvalidCredentials) => {
                debug!("login rejected");
                return Err(AuthError::Unauthorized);
            }
            Err(e) => return Err(e.into()),
        };
        let token = self.issue_token(&user.email)?;
        info!(email = %user.email, "user_logged_in");
        Ok(AuthSession { user: AuthUser::from(user), token })
    }

    /// Signed HS256 token whose subject is `email`.
    pub fn issue_token(&self, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: email.to_string(),
            iat: now.timestamp().max(0) as usize,
            exp: (now + self.cfg.token_ttl).timestamp().max(0) as usize,
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Decode and check signature and expiry.
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let key = DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<SessionClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_users_path;

    fn svc() -> AuthService {
        AuthService::new(AuthConfig { jwt_secret: "test-secret".into(), token_ttl: Duration::hours(1) })
    }

    fn signup_input(email: &str, pw: &str, confirm: &str) -> SignupInput {
        SignupInput { name: "Ann".into(), email: email.into(), password: pw.into(), confirm_password: confirm.into() }
    }

    #[tokio::test]
    async fn signup_then_login_issues_token() -> Result<(), anyhow::Error> {
        let path = temp_users_path("auth_ok");
        let mut store = JsonUserStore::load(&path).await?;
        let svc = svc();

        let user = svc.signup(&mut store, signup_input("ann@x.com", "pw1", "pw1")).await?;
        assert_eq!(user, AuthUser { name: "Ann".into(), email: "ann@x.com".into() });

        let session = svc.login(&store, LoginInput { email: "ann@x.com".into(), password: "pw1".into() })?;
        let claims = svc.verify_token(&session.token)?;
        assert_eq!(claims.sub, "ann@x.com");
        assert!(claims.exp > claims.iat);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn signup_rejects_mismatch_duplicate_and_bad_email() -> Result<(), anyhow::Error> {
        let path = temp_users_path("auth_bad");
        let mut store = JsonUserStore::load(&path).await?;
        let svc = svc();

        let mismatch = svc.signup(&mut store, signup_input("ann@x.com", "pw1", "pw2")).await.unwrap_err();
        assert!(matches!(mismatch, AuthError::Validation(ref m) if m == "Passwords do not match"));

        let bad_email = svc.signup(&mut store, signup_input("ann.x.com", "pw1", "pw1")).await.unwrap_err();
        assert!(matches!(bad_email, AuthError::Validation(_)));

        svc.signup(&mut store, signup_input("ann@x.com", "pw1", "pw1")).await?;
        let dup = svc.signup(&mut store, signup_input("ann@x.com", "pw9", "pw9")).await.unwrap_err();
        assert!(matches!(dup, AuthError::Conflict));
        assert_eq!(store.all_users().len(), 1);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn surrounding_whitespace_in_email_is_ignored() -> Result<(), anyhow::Error> {
        let path = temp_users_path("auth_trim");
        let mut store = JsonUserStore::load(&path).await?;
        let svc = svc();

        let user = svc.signup(&mut store, signup_input("  ann@x.com ", "pw1", "pw1")).await?;
        assert_eq!(user.email, "ann@x.com");
        let dup = svc.signup(&mut store, signup_input("ann@x.com", "pw2", "pw2")).await.unwrap_err();
        assert!(matches!(dup, AuthError::Conflict));
        assert_eq!(store.all_users().len(), 1);

        let session = svc.login(&store, LoginInput { email: " ann@x.com".into(), password: "pw1".into() })?;
        assert_eq!(svc.verify_token(&session.token)?.sub, "ann@x.com");
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn login_failures_collapse_to_unauthorized() -> Result<(), anyhow::Error> {
        let path = temp_users_path("auth_login");
        let mut store = JsonUserStore::load(&path).await?;
        let svc = svc();
        svc.signup(&mut store, signup_input("ann@x.com", "pw1", "pw1")).await?;

        let wrong = svc.login(&store, LoginInput { email: "ann@x.com".into(), password: "nope".into() });
        assert!(matches!(wrong, Err(AuthError::Unauthorized)));
        let unknown = svc.login(&store, LoginInput { email: "bob@x.com".into(), password: "pw1".into() });
        assert!(matches!(unknown, Err(AuthError::Unauthorized)));
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[test]
    fn tampered_expired_or_foreign_tokens_fail() {
        let svc = svc();
        let token = svc.issue_token("ann@x.com").unwrap();

        let other = AuthService::new(AuthConfig { jwt_secret: "other".into(), token_ttl: Duration::hours(1) });
        assert!(matches!(other.verify_token(&token), Err(AuthError::TokenError(_))));

        let expired = AuthService::new(AuthConfig { jwt_secret: "test-secret".into(), token_ttl: Duration::hours(-2) });
        let old = expired.issue_token("ann@x.com").unwrap();
        assert!(matches!(svc.verify_token(&old), Err(AuthError::TokenError(_))));

        assert!(svc.verify_token("not-a-token").is_err());
    }
}
