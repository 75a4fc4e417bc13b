use std::sync::Arc;

use crate::auth::accounts::AccountStore;
use crate::auth::session::SessionStore;
use crate::intake::generator::ProfileGenerator;
use crate::intake::store::ProfileStore;
use crate::storage::BlobStore;
use crate::waitlist::gateway::WaitlistGateway;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every backend sits behind a trait object so the router can be exercised
/// against in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    pub waitlist: Arc<dyn WaitlistGateway>,
    /// Raw resume files from the intake endpoint.
    pub blobs: Arc<dyn BlobStore>,
    pub generator: Arc<dyn ProfileGenerator>,
    pub profiles: Arc<dyn ProfileStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub sessions: Arc<dyn SessionStore>,
}
