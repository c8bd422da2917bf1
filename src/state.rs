use std::{sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;

use crate::{
    cache::MovieListCache,
    configuration::Config,
    db::{PgStore, Store},
    metadata::{MetadataService, OmdbClient},
};

/// Process-wide dependencies: the persistent store and the metadata service
/// behind their collaborator traits, and the one cache instance every request
/// shares. Constructed at startup, torn down with the process.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub cache: MovieListCache,
    pub metadata: Arc<dyn MetadataService>,
    pub config: Config,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub fn new(store: Arc<dyn Store>, metadata: Arc<dyn MetadataService>, config: Config) -> Self {
        let cache = MovieListCache::new(Duration::from_secs(config.cache.ttl_seconds));

        AppState {
            store,
            cache,
            metadata,
            config,
        }
    }

    pub async fn init(config: Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .min_connections(5)
            .max_connections(30)
            .connect_lazy_with(config.database.with_db());

        if config.application.run_migration {
            tracing::warn!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
        }

        let metadata = OmdbClient::new(
            config.metadata.base_url.clone(),
            config.metadata.api_key.clone(),
        );

        Ok(AppState::new(
            Arc::new(PgStore::new(pool)),
            Arc::new(metadata),
            config,
        ))
    }
}
