use actix_web::{web, HttpResponse, Responder};

use crate::models::{
    ErrorResponse, FindRideResponse, HealthResponse, MessageResponse, ProvideServiceResponse,
    SubmissionRequest,
};
use crate::services::{CarpoolError, CarpoolService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub carpool: CarpoolService,
}

/// Configure all ride-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/find-ride", web::post().to(find_ride))
        .route("/provide-service", web::post().to(provide_service))
        .route("/get-taker-match", web::get().to(get_taker_match))
        .route("/get-provider-match", web::get().to(get_provider_match));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = match state.carpool.store().health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            false
        }
    };

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Map a flow error to an HTTP response
fn error_response(context: &str, err: CarpoolError) -> HttpResponse {
    match err {
        CarpoolError::Validation(message) => {
            tracing::info!("{}: validation failed: {}", context, message);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: "Validation failed".to_string(),
                message,
                status_code: 400,
            })
        }
        CarpoolError::Store(e) if !e.is_retryable() => {
            tracing::error!("{}: store error: {}", context, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: context.to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
        CarpoolError::Store(e) => {
            tracing::error!("{}: store unavailable: {}", context, e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: context.to_string(),
                message: e.to_string(),
                status_code: 503,
            })
        }
        CarpoolError::Metrics(e) => {
            tracing::error!("{}: metrics error: {}", context, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: context.to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Find ride endpoint (taker)
///
/// POST /api/v1/find-ride
///
/// Persists the taker, runs matching and records the match on success.
async fn find_ride(
    state: web::Data<AppState>,
    req: web::Json<SubmissionRequest>,
) -> impl Responder {
    let outcome = match state.carpool.request_ride(req.into_inner()).await {
        Ok(outcome) => outcome,
        Err(e) => return error_response("Failed to submit request", e),
    };

    let response = match outcome.matched {
        Some((_, provider_view)) => FindRideResponse {
            matched: true,
            message: "Match found!".to_string(),
            submission_id: outcome.taker.id,
            provider_match: Some(provider_view),
        },
        None => FindRideResponse {
            matched: false,
            message: format!(
                "No match found within the {}-minute window.",
                state.carpool.engine().settings().window.num_minutes()
            ),
            submission_id: outcome.taker.id,
            provider_match: None,
        },
    };

    HttpResponse::Ok().json(response)
}

/// Provide service endpoint (provider)
///
/// POST /api/v1/provide-service
async fn provide_service(
    state: web::Data<AppState>,
    req: web::Json<SubmissionRequest>,
) -> impl Responder {
    match state.carpool.offer_ride(req.into_inner()).await {
        Ok(provider) => HttpResponse::Ok().json(ProvideServiceResponse {
            message: "Service offer submitted successfully!".to_string(),
            submission_id: provider.id,
        }),
        Err(e) => error_response("Failed to submit service offer", e),
    }
}

/// GET /api/v1/get-taker-match
async fn get_taker_match(state: web::Data<AppState>) -> impl Responder {
    match state.carpool.taker_match() {
        Some(view) => HttpResponse::Ok().json(view),
        None => HttpResponse::NotFound().json(MessageResponse {
            message: "No match found for taker.".to_string(),
        }),
    }
}

/// GET /api/v1/get-provider-match
async fn get_provider_match(state: web::Data<AppState>) -> impl Responder {
    match state.carpool.provider_match() {
        Some(view) => HttpResponse::Ok().json(view),
        None => HttpResponse::NotFound().json(MessageResponse {
            message: "No match found for provider.".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MatchEngine, RateTable};
    use crate::models::{NewSubmission, Role, Submission};
    use crate::services::{InMemoryStore, LatestMatchCache, StoreError, SubmissionStore};
    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn state() -> AppState {
        state_with(Arc::new(InMemoryStore::new()))
    }

    /// Store whose appends fail with a fixed error
    struct RejectingStore {
        transient: bool,
    }

    #[async_trait]
    impl SubmissionStore for RejectingStore {
        async fn append(&self, _submission: NewSubmission) -> Result<Submission, StoreError> {
            if self.transient {
                Err(StoreError::SqlxError(sqlx::Error::PoolTimedOut))
            } else {
                Err(StoreError::SqlxError(sqlx::Error::RowNotFound))
            }
        }

        async fn query_recent_by_role(
            &self,
            _role: Role,
            _since: DateTime<Utc>,
        ) -> Result<Vec<Submission>, StoreError> {
            Ok(Vec::new())
        }

        async fn health_check(&self) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    fn state_with(store: Arc<dyn SubmissionStore>) -> AppState {
        let engine = MatchEngine::with_default_settings(store.clone());
        AppState {
            carpool: CarpoolService::new(store, engine, RateTable::default(), Arc::new(LatestMatchCache::new())),
        }
    }

    fn offer() -> Value {
        json!({
            "userName": "Priya",
            "contactNo": "9000000003",
            "source": {"lat": 12.905, "lng": 77.505},
            "destination": {"lat": 12.95, "lng": 77.60},
            "vehicleType": "car"
        })
    }

    #[actix_web::test]
    async fn test_store_errors_split_by_retryability() {
        for (transient, expected) in [
            (true, StatusCode::SERVICE_UNAVAILABLE),
            (false, StatusCode::INTERNAL_SERVER_ERROR),
        ] {
            let app = test::init_service(
                App::new()
                    .app_data(web::Data::new(state_with(Arc::new(RejectingStore { transient }))))
                    .configure(configure),
            )
            .await;

            let req = test::TestRequest::post().uri("/provide-service").set_json(offer()).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);
        }
    }

    #[actix_web::test]
    async fn test_blank_name_is_bad_request() {
        let store = Arc::new(InMemoryStore::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(store.clone())))
                .configure(configure),
        )
        .await;

        let mut body = offer();
        body["userName"] = json!("   ");
        let req = test::TestRequest::post().uri("/provide-service").set_json(body).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(store.is_empty().await);
    }

    #[actix_web::test]
    async fn test_match_endpoints_404_before_any_match() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/get-taker-match").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/get-provider-match").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "No match found for provider.");
    }

    #[actix_web::test]
    async fn test_provider_with_unknown_vehicle_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/provide-service")
            .set_json(json!({
                "userName": "Priya",
                "contactNo": "9000000003",
                "source": {"lat": 12.905, "lng": 77.505},
                "destination": {"lat": 12.95, "lng": 77.60},
                "vehicleType": "tractor"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_health_reports_healthy_for_memory_store() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "healthy");
    }
}
