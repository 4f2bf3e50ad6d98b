//! # Server Configuration
//!
//! Router assembly, shared state and the HTTP listener for the directory API.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, patch, post},
};
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{admin_auth_middleware, user_auth_middleware};
use crate::config::AppConfig;
use crate::handlers::{self, admin, organizations, reference, submissions};
use crate::repositories::{OrganizationRepository, ReferenceRepository};
use crate::telemetry::{TRACE_ID_HEADER, trace_context_middleware};
use crate::workflow::SubmissionWorkflow;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<DatabaseConnection>,
    pub workflow: SubmissionWorkflow,
    pub organizations: OrganizationRepository,
    pub references: ReferenceRepository,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, db: DatabaseConnection) -> Self {
        let db = Arc::new(db);
        Self {
            workflow: SubmissionWorkflow::new(Arc::clone(&db)),
            organizations: OrganizationRepository::new(),
            references: ReferenceRepository::new(),
            config,
            db,
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let user_guard =
        middleware::from_fn_with_state(Arc::clone(&state.config), user_auth_middleware);
    let admin_guard =
        middleware::from_fn_with_state(Arc::clone(&state.config), admin_auth_middleware);

    // user and admin methods share this path; the extractors guard each one
    let shared_submission_routes = Router::new().route(
        "/api/submissions",
        post(submissions::create_submission).get(submissions::list_submissions),
    );

    let user_submission_routes = Router::new()
        .route("/api/submissions/my", get(submissions::list_my_submissions))
        .route_layer(user_guard);

    let review_routes = Router::new()
        .route(
            "/api/submissions/pending",
            get(submissions::list_pending_submissions),
        )
        .route("/api/submissions/{id}", get(submissions::get_submission))
        .route(
            "/api/submissions/{id}/approve",
            post(submissions::approve_submission),
        )
        .route(
            "/api/submissions/{id}/reject",
            post(submissions::reject_submission),
        )
        .route(
            "/api/admin/{kind}",
            get(reference::list_all).post(reference::create_entry),
        )
        .route(
            "/api/admin/{kind}/{id}",
            patch(reference::update_entry).delete(reference::delete_entry),
        )
        .route_layer(admin_guard);

    let organization_routes = Router::new()
        .route(
            "/api/organizations",
            get(organizations::list_organizations).post(organizations::create_organization),
        )
        .route(
            "/api/organizations/{id}",
            get(organizations::get_organization)
                .patch(organizations::update_organization)
                .delete(organizations::delete_organization),
        );

    let session_routes = Router::new()
        .route("/api/admin/auth", post(admin::login))
        .route("/api/admin/session", get(admin::session))
        .route("/api/admin/logout", post(admin::logout));

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/api/{kind}", get(reference::list_active))
        .merge(shared_submission_routes)
        .merge(user_submission_routes)
        .merge(review_routes)
        .merge(organization_routes)
        .merge(session_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(trace_context_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([HeaderName::from_static(TRACE_ID_HEADER)]);

    if origins.is_empty() {
        layer
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Starts the server and serves until `shutdown` is cancelled
pub async fn run_server(
    config: Arc<AppConfig>,
    db: DatabaseConnection,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let app = create_app(AppState::new(Arc::clone(&config), db));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, profile = %config.profile, "Directory API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Directory API stopped");
    Ok(())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "user_token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by the identity provider"))
                    .build(),
            ),
        );
        components.add_security_scheme(
            "admin_session",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token returned by POST /api/admin/auth"))
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::readyz,
        crate::handlers::submissions::create_submission,
        crate::handlers::submissions::list_my_submissions,
        crate::handlers::submissions::list_submissions,
        crate::handlers::submissions::list_pending_submissions,
        crate::handlers::submissions::get_submission,
        crate::handlers::submissions::approve_submission,
        crate::handlers::submissions::reject_submission,
        crate::handlers::organizations::list_organizations,
        crate::handlers::organizations::get_organization,
        crate::handlers::organizations::create_organization,
        crate::handlers::organizations::update_organization,
        crate::handlers::organizations::delete_organization,
        crate::handlers::reference::list_active,
        crate::handlers::reference::list_all,
        crate::handlers::reference::create_entry,
        crate::handlers::reference::update_entry,
        crate::handlers::reference::delete_entry,
        crate::handlers::admin::login,
        crate::handlers::admin::session,
        crate::handlers::admin::logout,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::SubmissionStatus,
            crate::error::ApiError,
            crate::handlers::types::SubmissionDto,
            crate::handlers::types::OrganizationDto,
            crate::handlers::types::HealthResponse,
            crate::handlers::types::SuccessResponse,
            crate::handlers::submissions::RejectRequest,
            crate::handlers::organizations::OrganizationRequest,
            crate::handlers::admin::AdminLoginRequest,
            crate::handlers::admin::AdminLoginResponse,
            crate::handlers::admin::AdminSessionStatus,
            crate::repositories::ReferenceRecord,
            crate::repositories::ReferenceInput,
            crate::repositories::ReferencePatch,
            crate::workflow::SubmissionPayload,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "submissions", description = "Organization submission review workflow"),
        (name = "organizations", description = "Directory organizations"),
        (name = "reference", description = "Regions, organization types, subtypes and services"),
        (name = "admin", description = "Back-office session management")
    ),
    info(
        title = "Impact Directory API",
        description = "Directory of social-impact organizations in Saudi Arabia and their submission review workflow",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
