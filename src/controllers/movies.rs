use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    cache::PatchOutcome,
    error::Error,
    library,
    metadata::MetadataCandidate,
    model::{
        MovieRecord, PersonalizedMovie, RatingEntry, ThemeEntry, UserRecord, ViewingEntry,
    },
    state::SharedAppState,
};

#[derive(serde::Deserialize, serde::Serialize, Debug, Validate)]
pub struct LogMovieRequest {
    pub imdb_id: String,
    #[validate(range(min = 0, max = 10))]
    pub entertainment_rating: i32,
    #[validate(range(min = 0, max = 10))]
    pub plot_rating: i32,
    #[validate(range(min = 0, max = 10))]
    pub style_rating: i32,
    #[validate(range(min = 0, max = 10))]
    pub bias_rating: i32,
    pub themes: Vec<String>,
    pub director_gender: Option<String>,
    pub writer_gender: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Validate)]
pub struct LogExistingMovieRequest {
    pub id: Uuid,
    #[validate(range(min = 0, max = 10))]
    pub entertainment_rating: i32,
    #[validate(range(min = 0, max = 10))]
    pub plot_rating: i32,
    #[validate(range(min = 0, max = 10))]
    pub style_rating: i32,
    #[validate(range(min = 0, max = 10))]
    pub bias_rating: i32,
    pub themes: Vec<String>,
    pub date: DateTime<Utc>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Validate)]
pub struct UpdateRatingRequest {
    #[validate(range(min = 0, max = 10))]
    pub entertainment_rating: i32,
    #[validate(range(min = 0, max = 10))]
    pub plot_rating: i32,
    #[validate(range(min = 0, max = 10))]
    pub style_rating: i32,
    #[validate(range(min = 0, max = 10))]
    pub bias_rating: i32,
    pub themes: Vec<String>,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct MetadataSearchResponse {
    pub results: Vec<MetadataCandidate>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct UrlPath {
    pub id: Uuid,
}

#[tracing::instrument(name = "[GET] movies", skip_all, fields(user_id = %user.id))]
pub async fn index(
    Extension(user): Extension<Arc<UserRecord>>,
    State(app_state): State<SharedAppState>,
) -> Result<Json<Vec<PersonalizedMovie>>, Error> {
    let movies = library::movies_for_user(
        app_state.store.as_ref(),
        &app_state.cache,
        user.id,
        &user.movies,
    )
    .await?;

    Ok(Json(movies))
}

#[tracing::instrument(name = "[POST] movies", skip_all, fields(user_id = %user.id))]
pub async fn store(
    Extension(user): Extension<Arc<UserRecord>>,
    State(app_state): State<SharedAppState>,
    Json(request): Json<LogMovieRequest>,
) -> Result<Json<PersonalizedMovie>, Error> {
    request.validate().map_err(Error::Validation)?;

    let meta = app_state.metadata.lookup_by_id(&request.imdb_id).await?;

    // Warm before patching so the add lands in a live entry.
    ensure_warm(&app_state, &user).await?;

    let rating = RatingEntry::new(
        user.id,
        request.entertainment_rating,
        request.plot_rating,
        request.style_rating,
        request.bias_rating,
    );
    let themes = ThemeEntry {
        themes: request.themes.clone(),
        user_id: user.id,
    };
    let viewing = ViewingEntry {
        date: request.date,
        user_id: user.id,
    };

    let mut record = match app_state.store.find_movie_by_title(&meta.title).await? {
        Some(existing) => {
            if user.movies.contains(&existing.id) {
                tracing::info!("movie already seen by user");
                return Err(Error::AlreadyLogged);
            }
            existing
        }
        None => MovieRecord {
            id: Uuid::new_v4(),
            title: meta.title,
            year: meta.year,
            rated: meta.rated,
            genres: meta.genres,
            director: meta.director,
            director_gender: request.director_gender.clone().unwrap_or_else(|| "n/a".into()),
            writer: meta.writer,
            writer_gender: request.writer_gender.clone().unwrap_or_else(|| "n/a".into()),
            plot: meta.plot,
            runtime: meta.runtime,
            poster: meta.poster,
            ratings: Vec::new(),
            themes: Vec::new(),
            date_added: Vec::new(),
            reviews: Vec::new(),
            ratings_count: 0,
            total_rating_average: None,
            entertainment_rating_average: None,
            plot_rating_average: None,
            style_rating_average: None,
            bias_rating_average: None,
        },
    };

    record.add_rating(rating);
    record.add_themes(themes);
    record.add_viewing(viewing);
    app_state.store.save_movie(&record).await?;

    let mut owner = (*user).clone();
    owner.log_movie(record.id, request.date);
    app_state.store.save_user(&owner).await?;

    let personal = record
        .personalize(user.id)
        .ok_or_else(|| Error::Other(anyhow!("freshly logged movie is incomplete")))?;
    log_patch(
        app_state.cache.add_movie(user.id, personal.clone()),
        "add movie",
    );

    Ok(Json(personal))
}

#[tracing::instrument(name = "[POST] movies/existing", skip_all, fields(user_id = %user.id))]
pub async fn store_existing(
    Extension(user): Extension<Arc<UserRecord>>,
    State(app_state): State<SharedAppState>,
    Json(request): Json<LogExistingMovieRequest>,
) -> Result<Json<PersonalizedMovie>, Error> {
    request.validate().map_err(Error::Validation)?;

    if user.movies.contains(&request.id) {
        tracing::info!("movie already seen by user");
        return Err(Error::AlreadyLogged);
    }

    let mut record = app_state
        .store
        .find_movie_by_id(request.id)
        .await?
        .ok_or(Error::NotFound)?;

    ensure_warm(&app_state, &user).await?;

    record.add_rating(RatingEntry::new(
        user.id,
        request.entertainment_rating,
        request.plot_rating,
        request.style_rating,
        request.bias_rating,
    ));
    record.add_themes(ThemeEntry {
        themes: request.themes.clone(),
        user_id: user.id,
    });
    record.add_viewing(ViewingEntry {
        date: request.date,
        user_id: user.id,
    });
    app_state.store.save_movie(&record).await?;

    let mut owner = (*user).clone();
    owner.log_movie(record.id, request.date);
    app_state.store.save_user(&owner).await?;

    let personal = record
        .personalize(user.id)
        .ok_or_else(|| Error::Other(anyhow!("freshly logged movie is incomplete")))?;
    log_patch(
        app_state.cache.add_movie(user.id, personal.clone()),
        "add existing movie",
    );

    Ok(Json(personal))
}

#[tracing::instrument(name = "[POST] movies/{id}", skip_all, fields(user_id = %user.id, movie_id = %path.id))]
pub async fn update(
    Extension(user): Extension<Arc<UserRecord>>,
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    Json(request): Json<UpdateRatingRequest>,
) -> Result<StatusCode, Error> {
    request.validate().map_err(Error::Validation)?;

    let mut record = app_state
        .store
        .find_movie_by_id(path.id)
        .await?
        .ok_or(Error::NotFound)?;

    let rating = RatingEntry::new(
        user.id,
        request.entertainment_rating,
        request.plot_rating,
        request.style_rating,
        request.bias_rating,
    );
    record.update_rating(user.id, rating.clone(), request.themes.clone());
    app_state.store.save_movie(&record).await?;

    if app_state
        .cache
        .update_rating(user.id, path.id, &rating, &request.themes)
    {
        tracing::info!("cache updated");
    } else {
        tracing::debug!("stale cache entry, rating patch skipped");
    }

    Ok(StatusCode::OK)
}

#[tracing::instrument(name = "[DELETE] movies/{id}", skip_all, fields(user_id = %user.id, movie_id = %path.id))]
pub async fn destroy(
    Extension(user): Extension<Arc<UserRecord>>,
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    let mut record = app_state
        .store
        .find_movie_by_id(path.id)
        .await?
        .ok_or(Error::NotFound)?;

    // Warm first so the removal patches a live entry instead of being lost.
    ensure_warm(&app_state, &user).await?;
    log_patch(app_state.cache.remove_movie(user.id, path.id), "remove movie");

    record.remove_presence(user.id);
    app_state.store.save_movie(&record).await?;

    let mut owner = (*user).clone();
    owner.remove_movie(path.id);
    app_state.store.save_user(&owner).await?;

    Ok(StatusCode::OK)
}

#[tracing::instrument(name = "[GET] movies/search/{query}", skip_all)]
pub async fn search(
    State(app_state): State<SharedAppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<MovieRecord>>, Error> {
    let movies = app_state.store.search_movies_by_title(&query).await?;
    Ok(Json(movies))
}

#[tracing::instrument(name = "[GET] movies/metadata/{title}", skip_all)]
pub async fn metadata(
    State(app_state): State<SharedAppState>,
    Path(title): Path<String>,
) -> Result<Json<MetadataSearchResponse>, Error> {
    let results = app_state.metadata.lookup_by_title(&title).await?;
    Ok(Json(MetadataSearchResponse { results }))
}

/// The read path, invoked for its cache-warming side effect only.
async fn ensure_warm(app_state: &SharedAppState, user: &UserRecord) -> Result<(), Error> {
    if app_state.cache.get(user.id).is_none() {
        library::movies_for_user(
            app_state.store.as_ref(),
            &app_state.cache,
            user.id,
            &user.movies,
        )
        .await?;
    }
    Ok(())
}

pub(crate) fn log_patch(outcome: PatchOutcome, operation: &str) {
    match outcome {
        PatchOutcome::Patched => tracing::debug!("cache patched: {}", operation),
        PatchOutcome::MissIgnored => {
            tracing::warn!("cache patch ignored, entry is cold: {}", operation)
        }
    }
}
