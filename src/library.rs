use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    cache::MovieListCache,
    db::Store,
    error::Error,
    model::{MovieRecord, PersonalizedMovie},
};

/// Projects a batch of shared records onto one user, dropping records the
/// user has no complete presence in and de-duplicating by movie id.
pub fn personalize_all(records: Vec<MovieRecord>, user_id: Uuid) -> Vec<PersonalizedMovie> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|record| record.personalize(user_id))
        .filter(|movie| seen.insert(movie.id))
        .collect()
}

/// The read path used at every API boundary that needs a user's personalized
/// movie list: serve the warm cache entry, otherwise rebuild the list from
/// the store and warm the cache on the way out. Endpoints never read the
/// store while a fresh entry exists.
#[tracing::instrument(name = "movies for user", skip_all, fields(%user_id))]
pub async fn movies_for_user(
    store: &dyn Store,
    cache: &MovieListCache,
    user_id: Uuid,
    movie_ids: &[Uuid],
) -> Result<Vec<PersonalizedMovie>, Error> {
    if let Some(movies) = cache.get(user_id) {
        tracing::debug!("cache hit");
        return Ok(movies);
    }

    let records = store.find_movies_by_ids(movie_ids).await?;
    let movies = personalize_all(records, user_id);
    cache.put(user_id, movies.clone());
    tracing::debug!("movie list cached");

    Ok(movies)
}
