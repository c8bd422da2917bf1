use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Duration;
use uuid::Uuid;

use crate::{
    error::Error,
    feed::{self, FeedEntry},
    library,
    model::{PersonalizedMovie, UserRecord},
    state::SharedAppState,
};

#[derive(serde::Serialize, serde::Deserialize)]
pub struct FriendProfile {
    pub movies: Vec<PersonalizedMovie>,
    pub username: String,
    pub avatar: Option<serde_json::Value>,
    pub friends: Vec<Uuid>,
    pub favorite_movie: Option<PersonalizedMovie>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct UrlPath {
    pub id: Uuid,
}

#[tracing::instrument(name = "[GET] friends/feed", skip_all, fields(user_id = %user.id))]
pub async fn feed(
    Extension(user): Extension<Arc<UserRecord>>,
    State(app_state): State<SharedAppState>,
) -> Result<Json<Vec<FeedEntry>>, Error> {
    let window = Duration::days(app_state.config.cache.feed_window_days);
    let entries =
        feed::build_feed(app_state.store.as_ref(), &app_state.cache, &user, window).await?;

    Ok(Json(entries))
}

#[tracing::instrument(name = "[GET] friends/{id}", skip_all, fields(friend_id = %path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<FriendProfile>, Error> {
    let target = app_state
        .store
        .find_user_by_id(path.id)
        .await?
        .ok_or(Error::NotFound)?;

    let movies = library::movies_for_user(
        app_state.store.as_ref(),
        &app_state.cache,
        target.id,
        &target.movies,
    )
    .await?;

    let favorite_movie = target
        .favorite_movie
        .and_then(|id| movies.iter().find(|m| m.id == id).cloned());

    Ok(Json(FriendProfile {
        movies,
        username: target.username,
        avatar: target.avatar,
        friends: target.friends,
        favorite_movie,
    }))
}
