//! The fixed intent → engine table
//!
//! A match, not a registry, so routing stays auditable: adding an intent
//! fails to compile until it gets a row here and one in the permission
//! table.

use wayfinder_core::Intent;

/// Which engine serves an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Deterministic reads from the record store
    Database,
    /// Semantic retrieval over the knowledge corpus
    Rag,
}

/// Route for one intent; total over the closed intent set
pub const fn route_for(intent: Intent) -> Route {
    match intent {
        Intent::Recommendation
        | Intent::SavedItems
        | Intent::Analytics
        | Intent::Revenue
        | Intent::Moderation => Route::Database,
        Intent::Policy | Intent::Navigation | Intent::Troubleshooting => Route::Rag,
    }
}
