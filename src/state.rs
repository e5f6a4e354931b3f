use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{RegistrationService, SeaOrmRegistrationService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub registration_service: Arc<dyn RegistrationService>,
}

impl SharedState {
    /// Opens the database, applies migrations and wires the services.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let registration_service = Arc::new(SeaOrmRegistrationService::new(
            store.clone(),
            config.security.clone(),
        ));

        Ok(Self::with_services(config, store, registration_service))
    }

    /// Builds state around an existing store and service implementation.
    #[must_use]
    pub fn with_services(
        config: Config,
        store: Store,
        registration_service: Arc<dyn RegistrationService>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            registration_service,
        }
    }
}
