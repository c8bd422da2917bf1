use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use uuid::Uuid;

use crate::model::{PersonalizedMovie, RatingEntry, Review};

/// Result of an in-place cache patch. A patch against a cold cache is dropped
/// on purpose: the durable store was already updated and the next read-through
/// rebuilds the list. It is reported instead of swallowed so callers can log
/// it and tests can assert on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Patched,
    MissIgnored,
}

struct CacheSlot {
    movies: Vec<PersonalizedMovie>,
    expires_at: Instant,
}

/// Per-user, TTL-bound cache of fully personalized movie lists.
///
/// One instance is owned by `AppState` and shared process-wide. Every method
/// takes the map lock once, so each individual operation is atomic; the
/// get-then-put cycle of the read path spans two calls and keeps the accepted
/// lost-update window between concurrent requests for the same user. The TTL
/// bounds how long any such staleness can live.
pub struct MovieListCache {
    ttl: Duration,
    slots: Mutex<HashMap<Uuid, CacheSlot>>,
}

impl MovieListCache {
    pub fn new(ttl: Duration) -> Self {
        MovieListCache {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// `None` means cold: never cached, expired, or invalidated. An empty
    /// movie list is a valid warm value and comes back as `Some(vec![])`.
    pub fn get(&self, user_id: Uuid) -> Option<Vec<PersonalizedMovie>> {
        let mut slots = self.slots.lock().expect("movie cache mutex poisoned");

        match slots.get(&user_id) {
            Some(slot) if slot.expires_at > Instant::now() => Some(slot.movies.clone()),
            Some(_) => {
                slots.remove(&user_id);
                None
            }
            None => None,
        }
    }

    /// Replaces any existing entry and resets the expiry clock.
    pub fn put(&self, user_id: Uuid, movies: Vec<PersonalizedMovie>) {
        let mut slots = self.slots.lock().expect("movie cache mutex poisoned");
        slots.insert(
            user_id,
            CacheSlot {
                movies,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Wholesale invalidation for one user. Used on logout and after
    /// mutations that are invalidated instead of patched (vote changes).
    pub fn remove(&self, user_id: Uuid) {
        let mut slots = self.slots.lock().expect("movie cache mutex poisoned");
        slots.remove(&user_id);
    }

    pub fn flush_all(&self) {
        let mut slots = self.slots.lock().expect("movie cache mutex poisoned");
        slots.clear();
    }

    /// Take-patch-reinsert cycle shared by every mutator: the entry comes out,
    /// is patched in place, and goes back. `apply` reports whether it changed
    /// the list; only a real change earns a fresh TTL. An entry a patch could
    /// not match keeps its original deadline.
    fn patch<F>(&self, user_id: Uuid, apply: F) -> PatchOutcome
    where
        F: FnOnce(&mut Vec<PersonalizedMovie>) -> bool,
    {
        let mut slots = self.slots.lock().expect("movie cache mutex poisoned");

        let Some(mut slot) = slots.remove(&user_id) else {
            return PatchOutcome::MissIgnored;
        };
        if slot.expires_at <= Instant::now() {
            return PatchOutcome::MissIgnored;
        }

        if apply(&mut slot.movies) {
            slot.expires_at = Instant::now() + self.ttl;
        }
        slots.insert(user_id, slot);

        PatchOutcome::Patched
    }

    pub fn add_movie(&self, user_id: Uuid, movie: PersonalizedMovie) -> PatchOutcome {
        self.patch(user_id, |movies| {
            movies.push(movie);
            true
        })
    }

    pub fn remove_movie(&self, user_id: Uuid, movie_id: Uuid) -> PatchOutcome {
        self.patch(user_id, |movies| {
            match movies.iter().position(|m| m.id == movie_id) {
                Some(position) => {
                    movies.remove(position);
                    true
                }
                None => false,
            }
        })
    }

    /// Overwrites the five rating fields and the themes of one cached movie.
    /// `false` reports a stale cache: the movie is not in the user's warm
    /// entry (or the entry is cold), and nothing was touched.
    pub fn update_rating(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        rating: &RatingEntry,
        themes: &[String],
    ) -> bool {
        let mut updated = false;
        self.patch(user_id, |movies| {
            if let Some(movie) = movies.iter_mut().find(|m| m.id == movie_id) {
                movie.entertainment_rating = rating.entertainment_rating;
                movie.plot_rating = rating.plot_rating;
                movie.style_rating = rating.style_rating;
                movie.bias_rating = rating.bias_rating;
                movie.total_rating = rating.total_rating;
                movie.themes = themes.to_vec();
                updated = true;
            }
            updated
        });
        updated
    }

    /// Appends a fresh review (zero upvotes) to the cached movie. Only the
    /// reviewing user's own entry is patched; friends' cached copies stay
    /// stale until their TTL expires or their next warm.
    pub fn add_review(
        &self,
        user_id: Uuid,
        username: &str,
        text: &str,
        movie_id: Uuid,
        review_id: Uuid,
    ) -> PatchOutcome {
        self.patch(user_id, |movies| {
            match movies.iter_mut().find(|m| m.id == movie_id) {
                Some(movie) => {
                    movie.reviews.push(Review {
                        id: review_id,
                        text: text.to_string(),
                        user_id,
                        username: username.to_string(),
                        upvotes: 0,
                        upvoted_by: Vec::new(),
                        date_added: chrono::Utc::now(),
                    });
                    true
                }
                None => false,
            }
        })
    }

    /// Removes the review matching both id and username.
    pub fn delete_review(
        &self,
        movie_id: Uuid,
        review_id: Uuid,
        username: &str,
        user_id: Uuid,
    ) -> PatchOutcome {
        self.patch(user_id, |movies| {
            match movies.iter_mut().find(|m| m.id == movie_id) {
                Some(movie) => {
                    let before = movie.reviews.len();
                    movie
                        .reviews
                        .retain(|r| !(r.id == review_id && r.username == username));
                    movie.reviews.len() != before
                }
                None => false,
            }
        })
    }

    pub fn update_review(
        &self,
        movie_id: Uuid,
        review_id: Uuid,
        username: &str,
        user_id: Uuid,
        text: &str,
    ) -> PatchOutcome {
        self.patch(user_id, |movies| {
            let review = movies
                .iter_mut()
                .find(|m| m.id == movie_id)
                .and_then(|movie| {
                    movie
                        .reviews
                        .iter_mut()
                        .find(|r| r.id == review_id && r.username == username)
                });

            match review {
                Some(review) => {
                    review.text = text.to_string();
                    true
                }
                None => false,
            }
        })
    }
}
