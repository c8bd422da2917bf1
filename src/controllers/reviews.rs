use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{error::Error, model::UserRecord, state::SharedAppState};

use super::movies::log_patch;

#[derive(serde::Deserialize, serde::Serialize, Debug, Validate)]
pub struct ReviewRequest {
    #[validate(length(min = 1, max = 5000))]
    pub review: String,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Validate)]
pub struct VoteRequest {
    #[validate(range(min = -1, max = 1))]
    pub vote: i32,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct ReviewResponse {
    pub review_id: Uuid,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct MoviePath {
    pub id: Uuid,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ReviewPath {
    pub id: Uuid,
    pub review_id: Uuid,
}

#[tracing::instrument(name = "[POST] movies/{id}/reviews", skip_all, fields(user_id = %user.id, movie_id = %path.id))]
pub async fn store(
    Extension(user): Extension<Arc<UserRecord>>,
    State(app_state): State<SharedAppState>,
    Path(path): Path<MoviePath>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, Error> {
    request.validate().map_err(Error::Validation)?;

    let mut record = app_state
        .store
        .find_movie_by_id(path.id)
        .await?
        .ok_or(Error::NotFound)?;

    let review_id = record.add_review(request.review.clone(), user.id, &user.username)?;
    app_state.store.save_movie(&record).await?;

    // Only the author's own cache entry is patched; friends' cached copies
    // stay stale until their TTL expires or their next warm.
    log_patch(
        app_state.cache.add_review(
            user.id,
            &user.username,
            &request.review,
            path.id,
            review_id,
        ),
        "add review",
    );

    let mut author = (*user).clone();
    author.add_authored_review(review_id);
    app_state.store.save_user(&author).await?;

    Ok(Json(ReviewResponse { review_id }))
}

#[tracing::instrument(name = "[PATCH] movies/{id}/reviews/{review_id}", skip_all, fields(user_id = %user.id, movie_id = %path.id))]
pub async fn update(
    Extension(user): Extension<Arc<UserRecord>>,
    State(app_state): State<SharedAppState>,
    Path(path): Path<ReviewPath>,
    Json(request): Json<ReviewRequest>,
) -> Result<StatusCode, Error> {
    request.validate().map_err(Error::Validation)?;

    let mut record = app_state
        .store
        .find_movie_by_id(path.id)
        .await?
        .ok_or(Error::NotFound)?;

    record.update_review(path.review_id, &user.username, &request.review)?;
    app_state.store.save_movie(&record).await?;

    log_patch(
        app_state.cache.update_review(
            path.id,
            path.review_id,
            &user.username,
            user.id,
            &request.review,
        ),
        "update review",
    );

    Ok(StatusCode::OK)
}

#[tracing::instrument(name = "[DELETE] movies/{id}/reviews/{review_id}", skip_all, fields(user_id = %user.id, movie_id = %path.id))]
pub async fn destroy(
    Extension(user): Extension<Arc<UserRecord>>,
    State(app_state): State<SharedAppState>,
    Path(path): Path<ReviewPath>,
) -> Result<StatusCode, Error> {
    let mut record = app_state
        .store
        .find_movie_by_id(path.id)
        .await?
        .ok_or(Error::NotFound)?;

    let upvoters = record.delete_review(path.review_id, &user.username)?;
    app_state.store.save_movie(&record).await?;

    // Every user who upvoted the deleted review loses the bookkeeping entry
    // that prevented them from double-voting.
    for upvoter_id in upvoters {
        let Some(mut upvoter) = app_state.store.find_user_by_id(upvoter_id).await? else {
            continue;
        };
        upvoter.retract_upvote(path.id, path.review_id);
        app_state.store.save_user(&upvoter).await?;
        tracing::debug!(user_id = %upvoter_id, "review upvote bookkeeping retracted");
    }

    log_patch(
        app_state
            .cache
            .delete_review(path.id, path.review_id, &user.username, user.id),
        "delete review",
    );

    let mut author = (*user).clone();
    author.remove_authored_review(path.review_id);
    app_state.store.save_user(&author).await?;

    Ok(StatusCode::OK)
}

/// Vote changes are too entangled to patch in place (shared review state,
/// two documents of bookkeeping), so the voter's cache entry is invalidated
/// wholesale instead.
#[tracing::instrument(name = "[POST] movies/{id}/reviews/{review_id}/vote", skip_all, fields(user_id = %user.id, movie_id = %path.id))]
pub async fn vote(
    Extension(user): Extension<Arc<UserRecord>>,
    State(app_state): State<SharedAppState>,
    Path(path): Path<ReviewPath>,
    Json(request): Json<VoteRequest>,
) -> Result<StatusCode, Error> {
    request.validate().map_err(Error::Validation)?;

    let already_upvoted = user.has_upvoted(path.id, path.review_id);

    if request.vote == 1 && !already_upvoted {
        let mut record = app_state
            .store
            .find_movie_by_id(path.id)
            .await?
            .ok_or(Error::NotFound)?;

        if record.upvote_review(path.review_id, user.id)? {
            app_state.store.save_movie(&record).await?;

            let mut voter = (*user).clone();
            voter.record_upvote(path.id, path.review_id);
            app_state.store.save_user(&voter).await?;

            app_state.cache.remove(user.id);
        }
    } else if request.vote == -1 && already_upvoted {
        let mut record = app_state
            .store
            .find_movie_by_id(path.id)
            .await?
            .ok_or(Error::NotFound)?;

        if record.retract_upvote(path.review_id, user.id)? {
            app_state.store.save_movie(&record).await?;

            let mut voter = (*user).clone();
            voter.retract_upvote(path.id, path.review_id);
            app_state.store.save_user(&voter).await?;

            app_state.cache.remove(user.id);
        }
    }

    Ok(StatusCode::OK)
}
