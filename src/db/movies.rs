use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{MovieRecord, RatingEntry, Review, ThemeEntry, ViewingEntry},
};

use super::error::StoreError;

const MOVIE_COLUMNS: &str = r#"
    id, title, year, rated, genres,
    director, director_gender, writer, writer_gender,
    plot, runtime, poster,
    ratings, themes, date_added, reviews,
    ratings_count, total_rating_average, entertainment_rating_average,
    plot_rating_average, style_rating_average, bias_rating_average
"#;

fn movie_from_row(row: &PgRow) -> MovieRecord {
    MovieRecord {
        id: row.get("id"),
        title: row.get("title"),
        year: row.get("year"),
        rated: row.get("rated"),
        genres: row.get("genres"),
        director: row.get("director"),
        director_gender: row.get("director_gender"),
        writer: row.get("writer"),
        writer_gender: row.get("writer_gender"),
        plot: row.get("plot"),
        runtime: row.get("runtime"),
        poster: row.get("poster"),
        ratings: row.get::<Json<Vec<RatingEntry>>, _>("ratings").0,
        themes: row.get::<Json<Vec<ThemeEntry>>, _>("themes").0,
        date_added: row.get::<Json<Vec<ViewingEntry>>, _>("date_added").0,
        reviews: row.get::<Json<Vec<Review>>, _>("reviews").0,
        ratings_count: row.get("ratings_count"),
        total_rating_average: row.get("total_rating_average"),
        entertainment_rating_average: row.get("entertainment_rating_average"),
        plot_rating_average: row.get("plot_rating_average"),
        style_rating_average: row.get("style_rating_average"),
        bias_rating_average: row.get("bias_rating_average"),
    }
}

#[tracing::instrument(name = "find movie by id", skip_all, fields(%id))]
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<MovieRecord>, Error> {
    let row = sqlx::query(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1;"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::Store(StoreError::Database(e)))?;

    Ok(row.as_ref().map(movie_from_row))
}

#[tracing::instrument(name = "find movies by ids", skip_all, fields(count = ids.len()))]
pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<MovieRecord>, Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ANY($1);"
    ))
    .bind(ids.to_vec())
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Store(StoreError::Database(e)))?;

    Ok(rows.iter().map(movie_from_row).collect())
}

#[tracing::instrument(name = "find movie by title", skip_all, fields(title))]
pub async fn find_by_title(pool: &PgPool, title: &str) -> Result<Option<MovieRecord>, Error> {
    let row = sqlx::query(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies WHERE title = $1;"
    ))
    .bind(title)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::Store(StoreError::Database(e)))?;

    Ok(row.as_ref().map(movie_from_row))
}

#[tracing::instrument(name = "search movies by title", skip_all, fields(query))]
pub async fn search_by_title(pool: &PgPool, query: &str) -> Result<Vec<MovieRecord>, Error> {
    let rows = sqlx::query(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies WHERE title ILIKE '%' || $1 || '%';"
    ))
    .bind(query)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Store(StoreError::Database(e)))?;

    Ok(rows.iter().map(movie_from_row).collect())
}

#[tracing::instrument(name = "save movie", skip_all, fields(movie_id = %record.id))]
pub async fn save(pool: &PgPool, record: &MovieRecord) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO movies (
            id, title, year, rated, genres,
            director, director_gender, writer, writer_gender,
            plot, runtime, poster,
            ratings, themes, date_added, reviews,
            ratings_count, total_rating_average, entertainment_rating_average,
            plot_rating_average, style_rating_average, bias_rating_average
        )
        VALUES (
            $1, $2, $3, $4, $5,
            $6, $7, $8, $9,
            $10, $11, $12,
            $13, $14, $15, $16,
            $17, $18, $19, $20, $21, $22
        )
        ON CONFLICT (id) DO UPDATE SET
            poster = EXCLUDED.poster,
            ratings = EXCLUDED.ratings,
            themes = EXCLUDED.themes,
            date_added = EXCLUDED.date_added,
            reviews = EXCLUDED.reviews,
            ratings_count = EXCLUDED.ratings_count,
            total_rating_average = EXCLUDED.total_rating_average,
            entertainment_rating_average = EXCLUDED.entertainment_rating_average,
            plot_rating_average = EXCLUDED.plot_rating_average,
            style_rating_average = EXCLUDED.style_rating_average,
            bias_rating_average = EXCLUDED.bias_rating_average;
    "#,
    )
    .bind(record.id)
    .bind(&record.title)
    .bind(&record.year)
    .bind(&record.rated)
    .bind(&record.genres)
    .bind(&record.director)
    .bind(&record.director_gender)
    .bind(&record.writer)
    .bind(&record.writer_gender)
    .bind(&record.plot)
    .bind(&record.runtime)
    .bind(&record.poster)
    .bind(Json(&record.ratings))
    .bind(Json(&record.themes))
    .bind(Json(&record.date_added))
    .bind(Json(&record.reviews))
    .bind(record.ratings_count)
    .bind(record.total_rating_average)
    .bind(record.entertainment_rating_average)
    .bind(record.plot_rating_average)
    .bind(record.style_rating_average)
    .bind(record.bias_rating_average)
    .execute(pool)
    .await
    .map_err(|e| Error::Store(StoreError::Database(e)))?;

    Ok(())
}
