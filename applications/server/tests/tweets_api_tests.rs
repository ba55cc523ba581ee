/// Tweet and like API tests
/// Drive the full router against a real SQLite file
mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::TestApp;
use serde_json::json;

/// Create, read, delete, read-again round trip
#[tokio::test]
async fn test_tweet_lifecycle() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let token = app.token_for(&alice);

    let before = DateTime::from_timestamp_micros(Utc::now().timestamp_micros()).unwrap();

    let (status, created) = app
        .send(
            "POST",
            "/tweets",
            Some(&token),
            Some(json!({"title": "hello", "content": "world"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "alice@example.com");
    assert_eq!(created["user_id"], alice.id.to_string());
    assert_eq!(created["title"], "hello");
    assert_eq!(created["content"], "world");

    let created_at: DateTime<Utc> = serde_json::from_value(created["created_at"].clone()).unwrap();
    assert!(created_at >= before);

    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = app.send("GET", &format!("/tweets/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(fetched, created);

    let (status, deleted) = app
        .send("DELETE", &format!("/tweets/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(deleted, created);

    let (status, body) = app.send("GET", &format!("/tweets/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

/// Every tweet and like route rejects a missing token before touching storage
#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let token = app.token_for(&alice);

    let (_, created) = app
        .send(
            "POST",
            "/tweets",
            Some(&token),
            Some(json!({"title": "hello", "content": "world"})),
        )
        .await;
    let id = created["id"].as_str().unwrap();
    let (status, _) = app
        .send("POST", &format!("/tweets/{id}/like"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let tweet_uri = format!("/tweets/{id}");
    let like_uri = format!("/tweets/{id}/like");
    let dislike_uri = format!("/tweets/{id}/dislike");
    let requests = [
        ("POST", "/tweets", Some(json!({"title": "other", "content": "x"}))),
        ("GET", "/tweets", None),
        ("GET", tweet_uri.as_str(), None),
        ("PATCH", tweet_uri.as_str(), Some(json!({"content": "hijacked"}))),
        ("DELETE", tweet_uri.as_str(), None),
        ("POST", like_uri.as_str(), None),
        ("DELETE", dislike_uri.as_str(), None),
    ];

    for (method, uri, body) in requests {
        for bad_token in [None, Some("not-a-jwt")] {
            let (status, error) = app.send(method, uri, bad_token, body.clone()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert!(error["error"].is_string(), "{method} {uri}");
        }
    }

    assert_eq!(app.count("tweets").await, 1);
    assert_eq!(app.count("likes").await, 1);

    let (status, fetched) = app.send("GET", &tweet_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(fetched, created);
}

/// Bodies that do not deserialize get the JSON error shape
#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let token = app.token_for(&alice);

    let (status, body) = app
        .send("POST", "/tweets", Some(&token), Some(json!({"title": "only"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("content"));

    let (status, body) = app
        .send_raw("POST", "/tweets", Some(&token), "application/json", "{not json")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(app.count("tweets").await, 0);
}

/// A refresh token cannot be used as a bearer token
#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let refresh = app.auth_service.create_refresh_token(&alice.id).unwrap();

    let (status, _) = app.send("GET", "/tweets", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let bob = app.create_user("bob", false).await;

    for (user, title) in [(&alice, "first"), (&bob, "second"), (&alice, "third")] {
        let (status, _) = app
            .send(
                "POST",
                "/tweets",
                Some(&app.token_for(user)),
                Some(json!({"title": title, "content": "body"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .send("GET", "/tweets", Some(&app.token_for(&bob)), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let items = body.as_array().unwrap();
    let titles: Vec<&str> = items.iter().map(|t| t["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["third", "second", "first"]);
    assert_eq!(items[1]["email"], "bob@example.com");
    assert_eq!(items[0]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_duplicate_title_conflicts() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let token = app.token_for(&alice);
    let body = json!({"title": "same", "content": "one"});

    let (status, _) = app.send("POST", "/tweets", Some(&token), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.send("POST", "/tweets", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.count("tweets").await, 1);
}

#[tokio::test]
async fn test_blank_title_is_bad_request() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;

    let (status, _) = app
        .send(
            "POST",
            "/tweets",
            Some(&app.token_for(&alice)),
            Some(json!({"title": "  ", "content": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// PATCH only changes the fields it carries
#[tokio::test]
async fn test_partial_update() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let token = app.token_for(&alice);

    let (_, created) = app
        .send(
            "POST",
            "/tweets",
            Some(&token),
            Some(json!({"title": "draft", "content": "original"})),
        )
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = app
        .send(
            "PATCH",
            &format!("/tweets/{id}"),
            Some(&token),
            Some(json!({"content": "edited"})),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(updated["title"], "draft");
    assert_eq!(updated["content"], "edited");
    assert_eq!(updated["created_at"], created["created_at"]);

    let (status, unchanged) = app
        .send("PATCH", &format!("/tweets/{id}"), Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(unchanged, updated);
}

#[tokio::test]
async fn test_update_to_taken_title_conflicts() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let token = app.token_for(&alice);

    app.send("POST", "/tweets", Some(&token), Some(json!({"title": "a", "content": "x"})))
        .await;
    let (_, second) = app
        .send("POST", "/tweets", Some(&token), Some(json!({"title": "b", "content": "y"})))
        .await;
    let id = second["id"].as_str().unwrap();

    let (status, _) = app
        .send("PATCH", &format!("/tweets/{id}"), Some(&token), Some(json!({"title": "a"})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

/// Only the author (or a superuser) may modify a tweet
#[tokio::test]
async fn test_ownership_enforced() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let bob = app.create_user("bob", false).await;
    let admin = app.create_user("admin", true).await;

    let (_, created) = app
        .send(
            "POST",
            "/tweets",
            Some(&app.token_for(&alice)),
            Some(json!({"title": "mine", "content": "x"})),
        )
        .await;
    let uri = format!("/tweets/{}", created["id"].as_str().unwrap());

    let (status, _) = app
        .send("PATCH", &uri, Some(&app.token_for(&bob)), Some(json!({"content": "hijacked"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("DELETE", &uri, Some(&app.token_for(&bob)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send("PATCH", &uri, Some(&app.token_for(&admin)), Some(json!({"content": "moderated"})))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["content"], "moderated");
    assert_eq!(body["email"], "alice@example.com");

    let (status, _) = app.send("DELETE", &uri, Some(&app.token_for(&admin)), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let token = app.token_for(&alice);
    let missing = chirp_core::TweetId::generate();

    let (status, _) = app.send("GET", &format!("/tweets/{missing}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send("PATCH", &format!("/tweets/{missing}"), Some(&token), Some(json!({"title": "x"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("DELETE", &format!("/tweets/{missing}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("GET", "/tweets/42", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_like_and_dislike() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let bob = app.create_user("bob", false).await;
    let bob_token = app.token_for(&bob);

    let (_, created) = app
        .send(
            "POST",
            "/tweets",
            Some(&app.token_for(&alice)),
            Some(json!({"title": "likeable", "content": "x"})),
        )
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .send("POST", &format!("/tweets/{id}/like"), Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["message"].is_string());
    assert_eq!(app.count("likes").await, 1);

    let (status, _) = app
        .send("POST", &format!("/tweets/{id}/like"), Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.count("likes").await, 1);

    // Alice never liked it, so there is nothing of hers to remove
    let (status, _) = app
        .send("DELETE", &format!("/tweets/{id}/dislike"), Some(&app.token_for(&alice)), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send("DELETE", &format!("/tweets/{id}/dislike"), Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["message"].is_string());
    assert_eq!(app.count("likes").await, 0);
}

#[tokio::test]
async fn test_like_missing_tweet_is_not_found() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let missing = chirp_core::TweetId::generate();

    let (status, _) = app
        .send("POST", &format!("/tweets/{missing}/like"), Some(&app.token_for(&alice)), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.count("likes").await, 0);
}

/// Deleting a tweet removes its likes
#[tokio::test]
async fn test_delete_cascades_to_likes() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let token = app.token_for(&alice);

    let (_, created) = app
        .send("POST", "/tweets", Some(&token), Some(json!({"title": "t", "content": "c"})))
        .await;
    let id = created["id"].as_str().unwrap();

    app.send("POST", &format!("/tweets/{id}/like"), Some(&token), None)
        .await;
    assert_eq!(app.count("likes").await, 1);

    let (status, _) = app.send("DELETE", &format!("/tweets/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(app.count("likes").await, 0);
}
