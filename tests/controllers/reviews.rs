use axum::http::StatusCode;
use chrono::Utc;
use cinelog::{
    controllers::reviews::{ReviewRequest, ReviewResponse, VoteRequest},
    model::PersonalizedMovie,
};
use uuid::Uuid;

use crate::{AppStateTest, create_fake_movie, create_fake_user, log_fake_movie, read_json};

#[tokio::test]
async fn store_should_attach_a_review() {
    let test_state = AppStateTest::new();

    let mut user = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut user, Utc::now());
    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(user.clone());

    let request = ReviewRequest {
        review: "Walks into the Zone, comes back changed.".to_string(),
    };
    let response = test_state
        .post_json(&format!("/movies/{}/reviews", movie.id), &user, &request)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: ReviewResponse = read_json(response).await;

    let stored_movie = test_state.store.movie(movie.id).unwrap();
    assert_eq!(stored_movie.reviews.len(), 1);
    assert_eq!(stored_movie.reviews[0].id, body.review_id);
    assert_eq!(stored_movie.reviews[0].username, user.username);
    assert_eq!(stored_movie.reviews[0].upvotes, 0);

    let stored_user = test_state.store.user(user.id).unwrap();
    assert!(stored_user.reviews.contains(&body.review_id));
}

#[tokio::test]
async fn store_should_reject_a_second_review_per_user() {
    let test_state = AppStateTest::new();

    let mut user = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut user, Utc::now());
    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(user.clone());

    let request = ReviewRequest {
        review: "First review.".to_string(),
    };
    let response = test_state
        .post_json(&format!("/movies/{}/reviews", movie.id), &user, &request)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = ReviewRequest {
        review: "Second review.".to_string(),
    };
    let response = test_state
        .post_json(&format!("/movies/{}/reviews", movie.id), &user, &request)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn store_should_reject_an_empty_review() {
    let test_state = AppStateTest::new();

    let mut user = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut user, Utc::now());
    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(user.clone());

    let request = ReviewRequest {
        review: String::new(),
    };
    let response = test_state
        .post_json(&format!("/movies/{}/reviews", movie.id), &user, &request)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_should_rewrite_the_review_text() {
    let test_state = AppStateTest::new();

    let mut user = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut user, Utc::now());
    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(user.clone());

    let request = ReviewRequest {
        review: "Draft.".to_string(),
    };
    let response = test_state
        .post_json(&format!("/movies/{}/reviews", movie.id), &user, &request)
        .await;
    let body: ReviewResponse = read_json(response).await;

    let request = ReviewRequest {
        review: "Final.".to_string(),
    };
    let response = test_state
        .patch_json(
            &format!("/movies/{}/reviews/{}", movie.id, body.review_id),
            &user,
            &request,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored_movie = test_state.store.movie(movie.id).unwrap();
    assert_eq!(stored_movie.reviews[0].text, "Final.");
}

#[tokio::test]
async fn update_should_reject_a_foreign_review() {
    let test_state = AppStateTest::new();

    let mut author = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut author, Utc::now());
    let review_id = movie
        .add_review("Mine.".to_string(), author.id, &author.username)
        .unwrap();
    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(author);

    let intruder = create_fake_user();
    test_state.store.insert_user(intruder.clone());

    let request = ReviewRequest {
        review: "Hijacked.".to_string(),
    };
    let response = test_state
        .patch_json(
            &format!("/movies/{}/reviews/{}", movie.id, review_id),
            &intruder,
            &request,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn destroy_should_retract_upvoter_bookkeeping() {
    let test_state = AppStateTest::new();

    let mut author = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut author, Utc::now());
    let review_id = movie
        .add_review("Mine.".to_string(), author.id, &author.username)
        .unwrap();

    let mut upvoter = create_fake_user();
    movie.upvote_review(review_id, upvoter.id).unwrap();
    upvoter.record_upvote(movie.id, review_id);

    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(author.clone());
    test_state.store.insert_user(upvoter.clone());

    let response = test_state
        .delete(&format!("/movies/{}/reviews/{}", movie.id, review_id), &author)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored_movie = test_state.store.movie(movie.id).unwrap();
    assert!(stored_movie.reviews.is_empty());

    let stored_author = test_state.store.user(author.id).unwrap();
    assert!(stored_author.reviews.is_empty());

    let stored_upvoter = test_state.store.user(upvoter.id).unwrap();
    assert!(!stored_upvoter.has_upvoted(movie.id, review_id));
}

#[tokio::test]
async fn destroy_should_reject_a_foreign_review() {
    let test_state = AppStateTest::new();

    let mut author = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut author, Utc::now());
    let review_id = movie
        .add_review("Mine.".to_string(), author.id, &author.username)
        .unwrap();
    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(author);

    let intruder = create_fake_user();
    test_state.store.insert_user(intruder.clone());

    let response = test_state
        .delete(
            &format!("/movies/{}/reviews/{}", movie.id, review_id),
            &intruder,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn destroy_should_error_when_review_is_missing() {
    let test_state = AppStateTest::new();

    let mut user = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut user, Utc::now());
    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(user.clone());

    let response = test_state
        .delete(
            &format!("/movies/{}/reviews/{}", movie.id, Uuid::new_v4()),
            &user,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vote_should_upvote_once_and_ignore_repeats() {
    let test_state = AppStateTest::new();

    let mut author = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut author, Utc::now());
    let review_id = movie
        .add_review("Mine.".to_string(), author.id, &author.username)
        .unwrap();
    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(author);

    let voter = create_fake_user();
    test_state.store.insert_user(voter.clone());

    let uri = format!("/movies/{}/reviews/{}/vote", movie.id, review_id);

    let response = test_state
        .post_json(&uri, &voter, &VoteRequest { vote: 1 })
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored_movie = test_state.store.movie(movie.id).unwrap();
    assert_eq!(stored_movie.reviews[0].upvotes, 1);

    let stored_voter = test_state.store.user(voter.id).unwrap();
    assert!(stored_voter.has_upvoted(movie.id, review_id));

    // Second upvote from the same user is a no-op.
    let stored_voter = test_state.store.user(voter.id).unwrap();
    let response = test_state
        .post_json(&uri, &stored_voter, &VoteRequest { vote: 1 })
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored_movie = test_state.store.movie(movie.id).unwrap();
    assert_eq!(stored_movie.reviews[0].upvotes, 1);
}

#[tokio::test]
async fn vote_should_retract_an_existing_upvote() {
    let test_state = AppStateTest::new();

    let mut author = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut author, Utc::now());
    let review_id = movie
        .add_review("Mine.".to_string(), author.id, &author.username)
        .unwrap();

    let mut voter = create_fake_user();
    movie.upvote_review(review_id, voter.id).unwrap();
    voter.record_upvote(movie.id, review_id);

    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(author);
    test_state.store.insert_user(voter.clone());

    let response = test_state
        .post_json(
            &format!("/movies/{}/reviews/{}/vote", movie.id, review_id),
            &voter,
            &VoteRequest { vote: -1 },
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored_movie = test_state.store.movie(movie.id).unwrap();
    assert_eq!(stored_movie.reviews[0].upvotes, 0);

    let stored_voter = test_state.store.user(voter.id).unwrap();
    assert!(!stored_voter.has_upvoted(movie.id, review_id));
}

#[tokio::test]
async fn vote_should_invalidate_the_voters_cache_entry() {
    let test_state = AppStateTest::new();

    let mut author = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut author, Utc::now());
    let review_id = movie
        .add_review("Mine.".to_string(), author.id, &author.username)
        .unwrap();
    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(author);

    let voter = create_fake_user();
    test_state.store.insert_user(voter.clone());

    // Warm the voter's entry, then vote.
    let response = test_state.get("/movies", &voter).await;
    let _: Vec<PersonalizedMovie> = read_json(response).await;
    assert!(test_state.app_state.cache.get(voter.id).is_some());

    let response = test_state
        .post_json(
            &format!("/movies/{}/reviews/{}/vote", movie.id, review_id),
            &voter,
            &VoteRequest { vote: 1 },
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(test_state.app_state.cache.get(voter.id).is_none());
}
