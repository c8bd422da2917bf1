use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Error;

/// One user's ratings of a movie. `total_rating` is fixed at write time as the
/// sum of the four axes and is never recomputed from the parts afterwards.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RatingEntry {
    pub entertainment_rating: i32,
    pub plot_rating: i32,
    pub style_rating: i32,
    pub bias_rating: i32,
    pub total_rating: i32,
    pub user_id: Uuid,
}

impl RatingEntry {
    pub fn new(
        user_id: Uuid,
        entertainment_rating: i32,
        plot_rating: i32,
        style_rating: i32,
        bias_rating: i32,
    ) -> Self {
        RatingEntry {
            entertainment_rating,
            plot_rating,
            style_rating,
            bias_rating,
            total_rating: entertainment_rating + plot_rating + style_rating + bias_rating,
            user_id,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ThemeEntry {
    pub themes: Vec<String>,
    pub user_id: Uuid,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ViewingEntry {
    pub date: DateTime<Utc>,
    pub user_id: Uuid,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: Uuid,
    pub text: String,
    pub user_id: Uuid,
    pub username: String,
    pub upvotes: i32,
    pub upvoted_by: Vec<Uuid>,
    pub date_added: DateTime<Utc>,
}

impl Review {
    pub fn new(text: String, user_id: Uuid, username: String) -> Self {
        Review {
            id: Uuid::new_v4(),
            text,
            user_id,
            username,
            upvotes: 0,
            upvoted_by: Vec::new(),
            date_added: Utc::now(),
        }
    }
}

/// A movie document shared by every user who has logged the title. Per-user
/// data lives in the `ratings`/`themes`/`date_added` collections, at most one
/// entry per user in each.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub id: Uuid,
    pub title: String,
    pub year: String,
    pub rated: String,
    pub genres: Vec<String>,
    pub director: Vec<String>,
    pub director_gender: String,
    pub writer: Vec<String>,
    pub writer_gender: String,
    pub plot: String,
    pub runtime: String,
    pub poster: String,
    pub ratings: Vec<RatingEntry>,
    pub themes: Vec<ThemeEntry>,
    pub date_added: Vec<ViewingEntry>,
    pub reviews: Vec<Review>,
    pub ratings_count: i32,
    pub total_rating_average: Option<f64>,
    pub entertainment_rating_average: Option<f64>,
    pub plot_rating_average: Option<f64>,
    pub style_rating_average: Option<f64>,
    pub bias_rating_average: Option<f64>,
}

impl MovieRecord {
    pub fn rating_for(&self, user_id: Uuid) -> Option<&RatingEntry> {
        self.ratings.iter().find(|r| r.user_id == user_id)
    }

    pub fn themes_for(&self, user_id: Uuid) -> Option<&ThemeEntry> {
        self.themes.iter().find(|t| t.user_id == user_id)
    }

    pub fn viewing_for(&self, user_id: Uuid) -> Option<&ViewingEntry> {
        self.date_added.iter().find(|d| d.user_id == user_id)
    }

    /// Projects the shared record onto a single user: the user's own rating,
    /// themes and viewing date flattened next to the shared metadata. Returns
    /// `None` unless all three per-user entries are present, which keeps
    /// partially written records out of every list.
    pub fn personalize(&self, user_id: Uuid) -> Option<PersonalizedMovie> {
        let rating = self.rating_for(user_id)?;
        let themes = self.themes_for(user_id)?;
        let viewing = self.viewing_for(user_id)?;

        Some(PersonalizedMovie {
            id: self.id,
            title: self.title.clone(),
            year: self.year.clone(),
            rated: self.rated.clone(),
            genres: self.genres.clone(),
            director: self.director.clone(),
            director_gender: self.director_gender.clone(),
            writer: self.writer.clone(),
            writer_gender: self.writer_gender.clone(),
            plot: self.plot.clone(),
            runtime: self.runtime.clone(),
            poster: self.poster.clone(),
            entertainment_rating: rating.entertainment_rating,
            plot_rating: rating.plot_rating,
            style_rating: rating.style_rating,
            bias_rating: rating.bias_rating,
            total_rating: rating.total_rating,
            themes: themes.themes.clone(),
            date_added: viewing.clone(),
            reviews: self.reviews.clone(),
        })
    }

    pub fn add_rating(&mut self, rating: RatingEntry) {
        self.ratings.push(rating);
        self.recompute_rating_averages();
    }

    pub fn add_themes(&mut self, themes: ThemeEntry) {
        self.themes.push(themes);
    }

    pub fn add_viewing(&mut self, viewing: ViewingEntry) {
        self.date_added.push(viewing);
    }

    /// Replaces the user's rating and theme entries in place.
    pub fn update_rating(&mut self, user_id: Uuid, rating: RatingEntry, themes: Vec<String>) {
        for entry in self.ratings.iter_mut().filter(|r| r.user_id == user_id) {
            *entry = rating.clone();
        }
        for entry in self.themes.iter_mut().filter(|t| t.user_id == user_id) {
            entry.themes = themes.clone();
        }
        self.recompute_rating_averages();
    }

    /// Strips every trace of the user from the shared record. The record
    /// itself is never deleted, even when the last user leaves.
    pub fn remove_presence(&mut self, user_id: Uuid) {
        self.ratings.retain(|r| r.user_id != user_id);
        self.themes.retain(|t| t.user_id != user_id);
        self.date_added.retain(|d| d.user_id != user_id);
        self.recompute_rating_averages();
    }

    /// One review per username per movie.
    pub fn add_review(
        &mut self,
        text: String,
        user_id: Uuid,
        username: &str,
    ) -> Result<Uuid, Error> {
        if self.reviews.iter().any(|r| r.username == username) {
            return Err(Error::DuplicateReview);
        }

        let review = Review::new(text, user_id, username.to_string());
        let review_id = review.id;
        self.reviews.push(review);
        Ok(review_id)
    }

    /// Deletes a review, double-keyed on id and username so a guessed id is
    /// not enough to delete someone else's review. Returns the users whose
    /// upvote history must be retracted.
    pub fn delete_review(&mut self, review_id: Uuid, username: &str) -> Result<Vec<Uuid>, Error> {
        let position = self
            .reviews
            .iter()
            .position(|r| r.id == review_id)
            .ok_or(Error::NotFound)?;

        if self.reviews[position].username != username {
            return Err(Error::UnauthorizedMutation);
        }

        let removed = self.reviews.remove(position);
        Ok(removed.upvoted_by)
    }

    pub fn update_review(
        &mut self,
        review_id: Uuid,
        username: &str,
        text: &str,
    ) -> Result<(), Error> {
        let review = self
            .reviews
            .iter_mut()
            .find(|r| r.id == review_id)
            .ok_or(Error::NotFound)?;

        if review.username != username {
            return Err(Error::UnauthorizedMutation);
        }

        review.text = text.to_string();
        Ok(())
    }

    /// Returns `false` when the user has already upvoted the review.
    pub fn upvote_review(&mut self, review_id: Uuid, user_id: Uuid) -> Result<bool, Error> {
        let review = self
            .reviews
            .iter_mut()
            .find(|r| r.id == review_id)
            .ok_or(Error::NotFound)?;

        if review.upvoted_by.contains(&user_id) {
            return Ok(false);
        }

        review.upvotes += 1;
        review.upvoted_by.push(user_id);
        Ok(true)
    }

    /// Returns `false` when there is no upvote by the user to retract.
    pub fn retract_upvote(&mut self, review_id: Uuid, user_id: Uuid) -> Result<bool, Error> {
        let review = self
            .reviews
            .iter_mut()
            .find(|r| r.id == review_id)
            .ok_or(Error::NotFound)?;

        let Some(position) = review.upvoted_by.iter().position(|u| *u == user_id) else {
            return Ok(false);
        };

        review.upvotes -= 1;
        review.upvoted_by.remove(position);
        Ok(true)
    }

    /// Derived aggregates, recomputed whenever `ratings` changes.
    pub fn recompute_rating_averages(&mut self) {
        self.ratings_count = self.ratings.len() as i32;

        if self.ratings.is_empty() {
            self.total_rating_average = None;
            self.entertainment_rating_average = None;
            self.plot_rating_average = None;
            self.style_rating_average = None;
            self.bias_rating_average = None;
            return;
        }

        let count = self.ratings.len() as f64;
        let mut total = 0f64;
        let mut entertainment = 0f64;
        let mut plot = 0f64;
        let mut style = 0f64;
        let mut bias = 0f64;
        for rating in &self.ratings {
            total += f64::from(rating.total_rating);
            entertainment += f64::from(rating.entertainment_rating);
            plot += f64::from(rating.plot_rating);
            style += f64::from(rating.style_rating);
            bias += f64::from(rating.bias_rating);
        }

        self.total_rating_average = Some(total / count);
        self.entertainment_rating_average = Some(entertainment / count);
        self.plot_rating_average = Some(plot / count);
        self.style_rating_average = Some(style / count);
        self.bias_rating_average = Some(bias / count);
    }
}

/// The shape the cache stores and the UI consumes. Derived on demand, never
/// persisted.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct PersonalizedMovie {
    pub id: Uuid,
    pub title: String,
    pub year: String,
    pub rated: String,
    pub genres: Vec<String>,
    pub director: Vec<String>,
    pub director_gender: String,
    pub writer: Vec<String>,
    pub writer_gender: String,
    pub plot: String,
    pub runtime: String,
    pub poster: String,
    pub entertainment_rating: i32,
    pub plot_rating: i32,
    pub style_rating: i32,
    pub bias_rating: i32,
    pub total_rating: i32,
    pub themes: Vec<String>,
    pub date_added: ViewingEntry,
    pub reviews: Vec<Review>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub movie: Uuid,
    pub date: DateTime<Utc>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpvoteHistory {
    pub movie_id: Uuid,
    pub reviews: Vec<Uuid>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub movies: Vec<Uuid>,
    pub feed: Vec<FeedItem>,
    pub friends: Vec<Uuid>,
    pub friend_requests: Vec<Uuid>,
    pub reviews: Vec<Uuid>,
    pub upvoted_reviews: Vec<UpvoteHistory>,
    pub avatar: Option<serde_json::Value>,
    pub favorite_movie: Option<Uuid>,
    pub date_registered: DateTime<Utc>,
}

impl UserRecord {
    /// Adds the movie to the ownership list and the rolling feed. Logging the
    /// same movie twice is a no-op, reported as `false`.
    pub fn log_movie(&mut self, movie_id: Uuid, date: DateTime<Utc>) -> bool {
        if self.movies.contains(&movie_id) {
            return false;
        }

        self.movies.push(movie_id);
        self.feed.push(FeedItem {
            movie: movie_id,
            date,
        });
        true
    }

    pub fn remove_movie(&mut self, movie_id: Uuid) {
        self.movies.retain(|m| *m != movie_id);
    }

    pub fn has_upvoted(&self, movie_id: Uuid, review_id: Uuid) -> bool {
        self.upvoted_reviews
            .iter()
            .find(|h| h.movie_id == movie_id)
            .is_some_and(|h| h.reviews.contains(&review_id))
    }

    pub fn record_upvote(&mut self, movie_id: Uuid, review_id: Uuid) {
        match self
            .upvoted_reviews
            .iter_mut()
            .find(|h| h.movie_id == movie_id)
        {
            Some(history) => history.reviews.push(review_id),
            None => self.upvoted_reviews.push(UpvoteHistory {
                movie_id,
                reviews: vec![review_id],
            }),
        }
    }

    /// Returns `false` when no matching upvote was recorded.
    pub fn retract_upvote(&mut self, movie_id: Uuid, review_id: Uuid) -> bool {
        let Some(history) = self
            .upvoted_reviews
            .iter_mut()
            .find(|h| h.movie_id == movie_id)
        else {
            return false;
        };

        let Some(position) = history.reviews.iter().position(|r| *r == review_id) else {
            return false;
        };

        history.reviews.remove(position);
        true
    }

    pub fn add_authored_review(&mut self, review_id: Uuid) {
        if !self.reviews.contains(&review_id) {
            self.reviews.push(review_id);
        }
    }

    pub fn remove_authored_review(&mut self, review_id: Uuid) {
        self.reviews.retain(|r| *r != review_id);
    }
}
