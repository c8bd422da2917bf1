use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{FeedItem, UpvoteHistory, UserRecord},
};

use super::error::StoreError;

const USER_COLUMNS: &str = r#"
    id, username, email, movies, feed,
    friends, friend_requests, reviews, upvoted_reviews,
    avatar, favorite_movie, date_registered
"#;

fn user_from_row(row: &PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        movies: row.get::<Json<Vec<Uuid>>, _>("movies").0,
        feed: row.get::<Json<Vec<FeedItem>>, _>("feed").0,
        friends: row.get::<Json<Vec<Uuid>>, _>("friends").0,
        friend_requests: row.get::<Json<Vec<Uuid>>, _>("friend_requests").0,
        reviews: row.get::<Json<Vec<Uuid>>, _>("reviews").0,
        upvoted_reviews: row
            .get::<Json<Vec<UpvoteHistory>>, _>("upvoted_reviews")
            .0,
        avatar: row.get("avatar"),
        favorite_movie: row.get("favorite_movie"),
        date_registered: row.get("date_registered"),
    }
}

#[tracing::instrument(name = "find user by id", skip_all, fields(%id))]
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>, Error> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1;"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::Store(StoreError::Database(e)))?;

    Ok(row.as_ref().map(user_from_row))
}

#[tracing::instrument(name = "save user", skip_all, fields(user_id = %user.id))]
pub async fn save(pool: &PgPool, user: &UserRecord) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO users (
            id, username, email, movies, feed,
            friends, friend_requests, reviews, upvoted_reviews,
            avatar, favorite_movie, date_registered
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (id) DO UPDATE SET
            movies = EXCLUDED.movies,
            feed = EXCLUDED.feed,
            friends = EXCLUDED.friends,
            friend_requests = EXCLUDED.friend_requests,
            reviews = EXCLUDED.reviews,
            upvoted_reviews = EXCLUDED.upvoted_reviews,
            avatar = EXCLUDED.avatar,
            favorite_movie = EXCLUDED.favorite_movie;
    "#,
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(Json(&user.movies))
    .bind(Json(&user.feed))
    .bind(Json(&user.friends))
    .bind(Json(&user.friend_requests))
    .bind(Json(&user.reviews))
    .bind(Json(&user.upvoted_reviews))
    .bind(&user.avatar)
    .bind(user.favorite_movie)
    .bind(user.date_registered)
    .execute(pool)
    .await
    .map_err(|e| Error::Store(StoreError::Database(e)))?;

    Ok(())
}

#[tracing::instrument(name = "update user feed", skip_all, fields(%user_id, entries = feed.len()))]
pub async fn update_feed(pool: &PgPool, user_id: Uuid, feed: &[FeedItem]) -> Result<(), Error> {
    sqlx::query("UPDATE users SET feed = $1 WHERE id = $2;")
        .bind(Json(feed))
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| Error::Store(StoreError::Database(e)))?;

    Ok(())
}
