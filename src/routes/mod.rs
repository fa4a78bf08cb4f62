// Route exports
pub mod rides;

use actix_web::web;

pub use rides::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(rides::configure),
    );
}
