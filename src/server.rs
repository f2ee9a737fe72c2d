//! # Server Configuration
//!
//! Router assembly, shared state, OpenAPI document and the serve loop for
//! the timetable API.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{TokenService, auth_middleware};
use crate::config::{AppConfig, ConfigError};
use crate::handlers;
use crate::password::PasswordHasher;
use crate::telemetry::trace_id_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub tokens: Arc<TokenService>,
    pub hasher: PasswordHasher,
}

impl AppState {
    /// Build the state; fails when the token secret or hashing cost is unusable.
    pub fn new(config: Arc<AppConfig>, db: DatabaseConnection) -> Result<Self, ConfigError> {
        let tokens = TokenService::from_config(&config)?;
        let hasher = PasswordHasher::new(config.password_hash_iterations);

        Ok(Self {
            config,
            db,
            tokens: Arc::new(tokens),
            hasher,
        })
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/me", get(handlers::auth::me))
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/teachers",
            get(handlers::teachers::list_teachers).post(handlers::teachers::create_teacher),
        )
        .route("/api/teachers/{id}", delete(handlers::teachers::delete_teacher))
        .route(
            "/api/teachers/{id}/subjects",
            post(handlers::teachers::assign_subject),
        )
        .route(
            "/api/rooms",
            get(handlers::rooms::list_rooms).post(handlers::rooms::create_room),
        )
        .route("/api/rooms/{id}", delete(handlers::rooms::delete_room))
        .route(
            "/api/groups",
            get(handlers::groups::list_groups).post(handlers::groups::create_group),
        )
        .route("/api/groups/{id}", delete(handlers::groups::delete_group))
        .route(
            "/api/groups/{id}/subjects",
            post(handlers::groups::assign_subject),
        )
        .route(
            "/api/subjects",
            get(handlers::subjects::list_subjects).post(handlers::subjects::create_subject),
        )
        .route("/api/subjects/{id}", delete(handlers::subjects::delete_subject))
        .route(
            "/api/constraints",
            get(handlers::constraints::list_constraints)
                .post(handlers::constraints::create_constraint),
        )
        .route(
            "/api/schedule",
            get(handlers::schedule::list_schedule)
                .post(handlers::schedule::create_schedule_entry),
        )
        .route(
            "/api/export/schedule",
            get(handlers::schedule::export_schedule),
        )
        .route("/api/logs", get(handlers::logs::list_logs))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/login", post(handlers::auth::login))
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id_middleware))
        .layer(CorsLayer::permissive())
}

/// Starts the server and serves until ctrl-c or SIGTERM
pub async fn run_server(config: Arc<AppConfig>, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let profile = config.profile.clone();
    let state = AppState::new(config, db.clone())?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, profile = %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, closing database pool");
    db.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
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
        crate::handlers::health,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::users::list_users,
        crate::handlers::users::create_user,
        crate::handlers::teachers::list_teachers,
        crate::handlers::teachers::create_teacher,
        crate::handlers::teachers::delete_teacher,
        crate::handlers::teachers::assign_subject,
        crate::handlers::rooms::list_rooms,
        crate::handlers::rooms::create_room,
        crate::handlers::rooms::delete_room,
        crate::handlers::groups::list_groups,
        crate::handlers::groups::create_group,
        crate::handlers::groups::delete_group,
        crate::handlers::groups::assign_subject,
        crate::handlers::subjects::list_subjects,
        crate::handlers::subjects::create_subject,
        crate::handlers::subjects::delete_subject,
        crate::handlers::constraints::list_constraints,
        crate::handlers::constraints::create_constraint,
        crate::handlers::schedule::list_schedule,
        crate::handlers::schedule::create_schedule_entry,
        crate::handlers::schedule::export_schedule,
        crate::handlers::logs::list_logs,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::Role,
            crate::models::TargetKind,
            crate::error::ApiError,
            crate::handlers::HealthResponse,
            crate::handlers::types::LinkSubjectRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UserResponse,
            crate::handlers::teachers::CreateTeacherRequest,
            crate::handlers::teachers::TeacherResponse,
            crate::handlers::rooms::CreateRoomRequest,
            crate::handlers::rooms::RoomResponse,
            crate::handlers::groups::CreateGroupRequest,
            crate::handlers::groups::GroupResponse,
            crate::handlers::subjects::CreateSubjectRequest,
            crate::handlers::subjects::SubjectResponse,
            crate::handlers::constraints::CreateConstraintRequest,
            crate::handlers::constraints::ConstraintResponse,
            crate::handlers::schedule::CreateScheduleEntryRequest,
            crate::handlers::schedule::ScheduleEntryResponse,
            crate::handlers::schedule::ScheduleExportResponse,
            crate::handlers::logs::LogResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "root", description = "Service information and health"),
        (name = "auth", description = "Login and current user"),
        (name = "users", description = "User accounts"),
        (name = "teachers", description = "Teachers and their subjects"),
        (name = "rooms", description = "Rooms"),
        (name = "groups", description = "Student groups and their subjects"),
        (name = "subjects", description = "Subjects"),
        (name = "constraints", description = "Scheduling constraints"),
        (name = "schedule", description = "Timetable entries and export"),
        (name = "logs", description = "Activity log"),
    ),
    info(
        title = "Timetable API",
        description = "University timetable management: teachers, rooms, groups, subjects, constraints and schedule entries",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
