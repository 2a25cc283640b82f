use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct SignupRequest { pub name: String, pub email: String, pub password: String, pub confirm_password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct AuthUserDoc { pub name: String, pub email: String }

#[derive(ToSchema)]
pub struct AuthPageDoc { pub success: bool, pub user: AuthUserDoc, pub redirect: String }

/// `status` is one of `open|in_progress|closed`, `priority` one of `low|medium|high`
#[derive(ToSchema)]
pub struct TicketRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

#[derive(ToSchema)]
pub struct TicketDoc {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

#[derive(ToSchema)]
pub struct TicketCountsDoc { pub total: usize, pub open: usize, pub in_progress: usize, pub closed: usize }

#[derive(ToSchema)]
pub struct DashboardDoc { pub user: AuthUserDoc, pub counts: TicketCountsDoc }

#[derive(ToSchema)]
pub struct TicketsPageDoc {
    pub tickets: Vec<TicketDoc>,
    pub edit_ticket: Option<TicketDoc>,
    pub ticket: Option<TicketDoc>,
    /// `created|updated|deleted`
    pub flash: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::signup,
        crate::routes::auth::login,
        crate::routes::pages::dashboard,
        crate::routes::tickets::list,
        crate::routes::tickets::create,
        crate::routes::tickets::update,
        crate::routes::tickets::delete,
    ),
    components(
        schemas(
            HealthResponse,
            SignupRequest,
            LoginRequest,
            AuthUserDoc,
            AuthPageDoc,
            TicketRequest,
            TicketDoc,
            TicketCountsDoc,
            DashboardDoc,
            TicketsPageDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "app")
    )
)]
pub struct ApiDoc;
