//! # takeoff_api - HTTP surface for the Takeoff estimator
//!
//! JSON endpoints over `takeoff_core`:
//!
//! | Method | Path |
//! |--------|------|
//! | POST | `/api/calculate-concrete` |
//! | POST | `/api/calculate-steel` |
//! | POST | `/api/estimate-cost` |
//! | POST | `/api/calculate-block` |
//! | POST | `/api/calculate-rebar` |
//! | POST | `/api/estimate-building` |
//! | POST | `/api/cost-reports` |
//! | GET | `/api/cost-reports/{id}` |
//! | GET | `/api/projects/{projectRef}/cost-reports` |
//! | GET | `/api/engineers/{engineerId}/cost-reports` |
//! | GET | `/api/owners/{ownerId}/cost-reports` |
//! | GET | `/health` |

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

pub use config::ServerConfig;
pub use state::AppState;

pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/calculate-concrete", post(routes::calculate_concrete))
        .route("/api/calculate-steel", post(routes::calculate_steel))
        .route("/api/estimate-cost", post(routes::estimate_cost_handler))
        .route("/api/calculate-block", post(routes::calculate_block))
        .route("/api/calculate-rebar", post(routes::calculate_rebar))
        .route("/api/estimate-building", post(routes::estimate_building_handler))
        .route("/api/cost-reports", post(routes::create_cost_report))
        .route("/api/cost-reports/{id}", get(routes::get_cost_report))
        .route("/api/projects/{project_ref}/cost-reports", get(routes::list_project_reports))
        .route("/api/engineers/{engineer_id}/cost-reports", get(routes::list_engineer_reports))
        .route("/api/owners/{owner_id}/cost-reports", get(routes::list_owner_reports))
        .with_state(app_state)
}

/// Install the global subscriber. `RUST_LOG` filters; `info` by default.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
