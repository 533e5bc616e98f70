//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{IpRepository, NetworkRepository};
use crate::infrastructure::{SeaOrmIpRepository, SeaOrmNetworkRepository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    /// Backs the IP REST resource
    pub ip_repo: Arc<dyn IpRepository>,
    /// Backs the admin network endpoints
    pub network_repo: Arc<dyn NetworkRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        let ip_repo = Arc::new(SeaOrmIpRepository::new(db.clone()));
        let network_repo = Arc::new(SeaOrmNetworkRepository::new(db.clone()));

        Self {
            db,
            ip_repo,
            network_repo,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl AsRef<DatabaseConnection> for AppState {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Lets handlers that only need the pool extract `State<DatabaseConnection>`
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
