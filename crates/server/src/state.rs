use std::sync::Arc;

use service::{
    auth::{AuthConfig, AuthService},
    storage::UserStoreHandle,
};

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub cookie_secure: bool,
}

/// Shared by every handler. Holds no user data: the store is reopened per request.
#[derive(Clone)]
pub struct ServerState {
    pub users: UserStoreHandle,
    pub auth: Arc<AuthService>,
    pub cookies: ServerAuthConfig,
}

impl ServerState {
    pub fn from_config(cfg: &configs::AppConfig) -> Self {
        let auth = AuthService::new(AuthConfig {
            jwt_secret: cfg.auth.jwt_secret.clone(),
            token_ttl: chrono::Duration::hours(cfg.auth.token_ttl_hours),
        });
        Self {
            users: UserStoreHandle::new(&cfg.storage.users_file),
            auth: Arc::new(auth),
            cookies: ServerAuthConfig { cookie_secure: cfg.auth.cookie_secure },
        }
    }
}
