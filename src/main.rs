mod access;
mod app;
mod authz;
mod db;
mod errors;
mod events;
mod lifecycle;
mod models;
mod routes;
mod session;
mod utils;

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::documents::list_documents,
        routes::documents::get_document,
        routes::documents::create_document,
        routes::documents::update_document,
        routes::documents::delete_document,
        routes::dashboard::summary,
        routes::alerts::due_documents,
        routes::accesses::get_accesses,
        routes::accesses::replace_accesses,
    ),
    components(
        schemas(
            models::document::Document,
            models::document::DocumentWithStatus,
            models::document::DocumentCreateRequest,
            models::document::DocumentUpdateRequest,
            models::access::AccessView,
            models::access::AccessUpdateRequest,
            access::CompanyAssignment,
            access::ApplyReport,
            access::ApplyFailure,
            lifecycle::StatusBadge,
            lifecycle::ExpirationStatus,
            lifecycle::Thresholds,
            routes::dashboard::DashboardSummary,
            routes::health::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database checks"),
        (name = "Documents", description = "Document records with computed lifecycle status"),
        (name = "Dashboard", description = "Status bucket summaries"),
        (name = "Alerts", description = "Exact-day expiration selection for the alert job"),
        (name = "Accesses", description = "Role and company assignment management")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();
    init_tracing();

    let pool = db::init().await?;
    let app = app::create_app(pool).await?;

    let app = app.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let port = std::env::var("APP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8000);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
