use axum::http::StatusCode;
use chrono::{Duration, Utc};
use cinelog::{controllers::friends::FriendProfile, feed::FeedEntry};
use uuid::Uuid;

use crate::{AppStateTest, create_fake_movie, create_fake_user, log_fake_movie, read_json};

#[tokio::test]
async fn feed_should_be_empty_without_friends() {
    let test_state = AppStateTest::new();

    let user = create_fake_user();
    test_state.store.insert_user(user.clone());

    let response = test_state.get("/friends/feed", &user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let entries: Vec<FeedEntry> = read_json(response).await;
    assert!(entries.is_empty());
}

#[tokio::test]
async fn feed_should_drop_entries_older_than_the_window() {
    let test_state = AppStateTest::new();

    let mut friend = create_fake_user();
    let mut recent = create_fake_movie("Stalker");
    let mut ancient = create_fake_movie("Solaris");
    log_fake_movie(&mut recent, &mut friend, Utc::now() - Duration::days(5));
    log_fake_movie(&mut ancient, &mut friend, Utc::now() - Duration::days(40));
    test_state.store.insert_movie(recent.clone());
    test_state.store.insert_movie(ancient);
    test_state.store.insert_user(friend.clone());

    let mut user = create_fake_user();
    user.friends.push(friend.id);
    test_state.store.insert_user(user.clone());

    let response = test_state.get("/friends/feed", &user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let entries: Vec<FeedEntry> = read_json(response).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].movie.id, recent.id);
    assert_eq!(entries[0].username, friend.username);

    // Expired entries are pruned from the stored feed as a side effect.
    let stored_friend = test_state.store.user(friend.id).unwrap();
    assert_eq!(stored_friend.feed.len(), 1);
    assert_eq!(stored_friend.feed[0].movie, recent.id);
}

#[tokio::test]
async fn feed_should_be_sorted_by_most_recent_viewing() {
    let test_state = AppStateTest::new();

    let mut friend = create_fake_user();
    let mut older = create_fake_movie("Solaris");
    let mut newer = create_fake_movie("Stalker");
    log_fake_movie(&mut older, &mut friend, Utc::now() - Duration::days(3));
    log_fake_movie(&mut newer, &mut friend, Utc::now() - Duration::days(1));
    test_state.store.insert_movie(older.clone());
    test_state.store.insert_movie(newer.clone());
    test_state.store.insert_user(friend.clone());

    let mut user = create_fake_user();
    user.friends.push(friend.id);
    test_state.store.insert_user(user.clone());

    let response = test_state.get("/friends/feed", &user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let entries: Vec<FeedEntry> = read_json(response).await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].movie.id, newer.id);
    assert_eq!(entries[1].movie.id, older.id);
}

#[tokio::test]
async fn feed_should_carry_the_friends_personalization() {
    let test_state = AppStateTest::new();

    let mut friend = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut friend, Utc::now());
    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(friend.clone());

    let mut user = create_fake_user();
    user.friends.push(friend.id);
    test_state.store.insert_user(user.clone());

    let response = test_state.get("/friends/feed", &user).await;
    let entries: Vec<FeedEntry> = read_json(response).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, friend.id);
    assert_eq!(entries[0].movie.total_rating, 14);

    // Resolving the feed warms the friend's cache entry on the way.
    assert!(test_state.app_state.cache.get(friend.id).is_some());
}

#[tokio::test]
async fn feed_should_fail_when_a_friend_is_missing() {
    let test_state = AppStateTest::new();

    let mut user = create_fake_user();
    user.friends.push(Uuid::new_v4());
    test_state.store.insert_user(user.clone());

    let response = test_state.get("/friends/feed", &user).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn show_should_return_the_friends_profile() {
    let test_state = AppStateTest::new();

    let mut friend = create_fake_user();
    let mut movie = create_fake_movie("Stalker");
    log_fake_movie(&mut movie, &mut friend, Utc::now());
    friend.favorite_movie = Some(movie.id);
    test_state.store.insert_movie(movie.clone());
    test_state.store.insert_user(friend.clone());

    let user = create_fake_user();
    test_state.store.insert_user(user.clone());

    let response = test_state.get(&format!("/friends/{}", friend.id), &user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let profile: FriendProfile = read_json(response).await;
    assert_eq!(profile.username, friend.username);
    assert_eq!(profile.movies.len(), 1);
    assert_eq!(
        profile.favorite_movie.as_ref().map(|m| m.id),
        Some(movie.id)
    );
}

#[tokio::test]
async fn show_should_error_when_user_is_missing() {
    let test_state = AppStateTest::new();

    let user = create_fake_user();
    test_state.store.insert_user(user.clone());

    let response = test_state
        .get(&format!("/friends/{}", Uuid::new_v4()), &user)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
