//! Shared application state.

use booking::{BookingOrchestrator, InMemoryTripCatalog};

/// State shared by every handler.
pub struct AppState {
    pub orchestrator: BookingOrchestrator,
    /// Seeded at startup; also reachable through the orchestrator.
    pub catalog: InMemoryTripCatalog,
    /// Hold lifetime used when a request names none.
    pub default_hold_ttl: chrono::Duration,
}
