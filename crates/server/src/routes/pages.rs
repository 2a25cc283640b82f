use axum::{extract::State, response::Redirect, Json};
use serde::Serialize;

use models::TicketCounts;
use service::{auth::domain::AuthUser, tickets};

use crate::errors::ApiError;
use crate::session::SessionContext;
use crate::state::ServerState;

#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub user: AuthUser,
    pub counts: TicketCounts,
}

pub async fn app_root() -> Redirect {
    Redirect::to("/app/dashboard")
}

#[utoipa::path(get, path = "/app/dashboard", tag = "app", responses((status = 200, description = "Signed-in user and ticket counts", body = crate::openapi::DashboardDoc), (status = 303, description = "Not signed in; redirect to /login")))]
pub async fn dashboard(
    State(state): State<ServerState>,
    session: SessionContext,
) -> Result<Json<DashboardPage>, ApiError> {
    let store = state.users.open().await?;
    let user = session.user(&store)?;
    Ok(Json(DashboardPage {
        user: AuthUser::from(user),
        counts: tickets::ticket_counts(&user.tickets),
    }))
}

/// Which page the client should show; the markup itself lives in `frontend/`.
#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub page: &'static str,
}

pub async fn login_page() -> Json<PageInfo> {
    Json(PageInfo { page: "login" })
}

pub async fn signup_page() -> Json<PageInfo> {
    Json(PageInfo { page: "signup" })
}
