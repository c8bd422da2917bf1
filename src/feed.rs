use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    cache::MovieListCache, db::Store, error::Error, library, model::PersonalizedMovie,
    model::UserRecord,
};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub movie: PersonalizedMovie,
    pub username: String,
    pub user_id: Uuid,
    pub avatar: Option<serde_json::Value>,
}

/// Builds the rolling one-month feed of a user's friends' movie activity.
///
/// Each friend's stored feed is pruned to the strict trailing window and the
/// pruned list is written back, so expired entries are garbage-collected
/// lazily on every read rather than by a background job. Movies resolve
/// through the friend-scoped read path, which also warms the friend's cache
/// on a miss. One friend's lookup failure fails the whole aggregation.
#[tracing::instrument(name = "build friend feed", skip_all, fields(user_id = %user.id))]
pub async fn build_feed(
    store: &dyn Store,
    cache: &MovieListCache,
    user: &UserRecord,
    window: Duration,
) -> Result<Vec<FeedEntry>, Error> {
    let cutoff = Utc::now() - window;
    let mut entries: Vec<FeedEntry> = Vec::new();

    for friend_id in &user.friends {
        let friend = store
            .find_user_by_id(*friend_id)
            .await?
            .ok_or(Error::NotFound)?;

        let monthly_feed: Vec<_> = friend
            .feed
            .iter()
            .filter(|item| item.date > cutoff)
            .cloned()
            .collect();
        store.update_feed(friend.id, &monthly_feed).await?;

        if monthly_feed.is_empty() {
            continue;
        }

        let movies =
            library::movies_for_user(store, cache, friend.id, &friend.movies).await?;

        entries.extend(monthly_feed.iter().filter_map(|item| {
            let movie = movies.iter().find(|m| m.id == item.movie)?.clone();
            Some(FeedEntry {
                movie,
                username: friend.username.clone(),
                user_id: friend.id,
                avatar: friend.avatar.clone(),
            })
        }));
    }

    // Ordered by the viewing date carried in the resolved movie, not the
    // feed-entry date; the two are written together in `log_movie`.
    entries.sort_by(|a, b| b.movie.date_added.date.cmp(&a.movie.date_added.date));

    Ok(entries)
}
