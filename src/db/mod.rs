use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Error,
    model::{FeedItem, MovieRecord, UserRecord},
};

pub mod error;
pub mod movies;
pub mod users;

/// The narrow contract the core holds against the persistent store: by-id
/// lookups and single-document-atomic writes. No multi-document transactions
/// are used or required.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_movie_by_id(&self, id: Uuid) -> Result<Option<MovieRecord>, Error>;

    async fn find_movies_by_ids(&self, ids: &[Uuid]) -> Result<Vec<MovieRecord>, Error>;

    async fn find_movie_by_title(&self, title: &str) -> Result<Option<MovieRecord>, Error>;

    async fn search_movies_by_title(&self, query: &str) -> Result<Vec<MovieRecord>, Error>;

    /// Upsert keyed on the movie id.
    async fn save_movie(&self, record: &MovieRecord) -> Result<(), Error>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, Error>;

    /// Upsert keyed on the user id.
    async fn save_user(&self, user: &UserRecord) -> Result<(), Error>;

    /// Writes back a pruned rolling feed without touching the rest of the
    /// user document.
    async fn update_feed(&self, user_id: Uuid, feed: &[FeedItem]) -> Result<(), Error>;
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_movie_by_id(&self, id: Uuid) -> Result<Option<MovieRecord>, Error> {
        movies::find_by_id(&self.pool, id).await
    }

    async fn find_movies_by_ids(&self, ids: &[Uuid]) -> Result<Vec<MovieRecord>, Error> {
        movies::find_by_ids(&self.pool, ids).await
    }

    async fn find_movie_by_title(&self, title: &str) -> Result<Option<MovieRecord>, Error> {
        movies::find_by_title(&self.pool, title).await
    }

    async fn search_movies_by_title(&self, query: &str) -> Result<Vec<MovieRecord>, Error> {
        movies::search_by_title(&self.pool, query).await
    }

    async fn save_movie(&self, record: &MovieRecord) -> Result<(), Error> {
        movies::save(&self.pool, record).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, Error> {
        users::find_by_id(&self.pool, id).await
    }

    async fn save_user(&self, user: &UserRecord) -> Result<(), Error> {
        users::save(&self.pool, user).await
    }

    async fn update_feed(&self, user_id: Uuid, feed: &[FeedItem]) -> Result<(), Error> {
        users::update_feed(&self.pool, user_id, feed).await
    }
}
