use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use carpool_match::config::{LogFormat, Settings, StoreBackend};
use carpool_match::core::{MatchEngine, MatchSettings};
use carpool_match::routes::{self, AppState};
use carpool_match::services::{CarpoolService, InMemoryStore, LatestMatchCache, PostgresStore, SubmissionStore};
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors (malformed body or missing required fields)
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("All fields are required: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Plain => subscriber.init(),
    }
}

async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn SubmissionStore>> {
    match settings.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory submission store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let url = settings.store.database_url.as_deref().ok_or_else(|| {
                error!("store.backend is postgres but no database URL is configured");
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "missing store.database_url")
            })?;

            let store = PostgresStore::from_settings(
                url,
                settings.store.max_connections,
                settings.store.min_connections,
                settings.store.acquire_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::other(e.to_string())
            })?;

            info!(
                "PostgreSQL submission store initialized (max: {} connections)",
                settings.store.max_connections.unwrap_or(10)
            );
            Ok(Arc::new(store))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging.level, settings.logging.log_format());

    info!("Starting carpool matching service...");

    let store = build_store(&settings).await?;

    let match_settings = MatchSettings::from(&settings.matching);
    let engine = MatchEngine::new(store.clone(), match_settings);

    info!("Match engine initialized with settings: {:?}", match_settings);

    let carpool = CarpoolService::new(
        store,
        engine,
        settings.pricing.rate_table(),
        Arc::new(LatestMatchCache::new()),
    );

    let app_state = AppState { carpool };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
