//! HTTP API for trip seat holds and bookings.
//!
//! Exposes availability, hold, booking and cancellation endpoints over the
//! booking core, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod identity;
pub mod reaper;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use booking::{
    BookingOrchestrator, FlatFarePricing, InMemoryBookingRepository, InMemoryTripCatalog, Trip,
};
use common::{Clock, SystemClock};
use inventory::InventoryRegistry;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/trips/{trip_id}/availability",
            get(routes::trips::availability),
        )
        .route("/trips/{trip_id}/holds", post(routes::trips::hold))
        .route("/trips/{trip_id}/holds/release", post(routes::trips::release))
        .route("/trips/{trip_id}/complete", post(routes::trips::complete))
        .route("/bookings", post(routes::bookings::create))
        .route("/bookings/{id}", get(routes::bookings::get))
        .route("/bookings/{id}/confirm", post(routes::bookings::confirm))
        .route("/bookings/{id}/cancel", post(routes::bookings::cancel))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state on the system clock.
pub fn create_default_state(config: &Config, trips: Vec<Trip>) -> Arc<AppState> {
    create_state_with_clock(config, trips, Arc::new(SystemClock))
}

/// Creates application state with in-memory storage and collaborators.
pub fn create_state_with_clock(
    config: &Config,
    trips: Vec<Trip>,
    clock: Arc<dyn Clock>,
) -> Arc<AppState> {
    let catalog = InMemoryTripCatalog::with_trips(trips);
    let orchestrator = BookingOrchestrator::new(
        InventoryRegistry::new(config.expiry_policy(), clock),
        Arc::new(catalog.clone()),
        Arc::new(InMemoryBookingRepository::new()),
        config.booking_policy(),
    )
    .with_pricing(Arc::new(FlatFarePricing::new()));

    Arc::new(AppState {
        orchestrator,
        catalog,
        default_hold_ttl: config.hold_ttl(),
    })
}
