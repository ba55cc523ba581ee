//! Integration tests for the likes vertical slice


use chirp_core::{types::*, ChirpError};
use chirp_storage::likes;
use test_helpers::*;

#[tokio::test]
async fn test_like_then_find() {
    let test_db = TestDb::new().await;
    let mut conn = test_db.conn().await;

    let user = create_test_user(&mut conn, "alice").await;
    let tweet = create_test_tweet(&mut conn, user.id, "likeable").await;

    let like = likes::create(&mut conn, tweet.id, user.id).await.unwrap();
    assert_eq!(like.tweet_id, tweet.id);
    assert_eq!(like.user_id, user.id);

    let found = likes::find(&mut conn, tweet.id, user.id).await.unwrap().unwrap();
    assert_eq!(found, like);
}

#[tokio::test]
async fn test_same_user_cannot_like_twice() {
    let test_db = TestDb::new().await;
    let mut conn = test_db.conn().await;

    let user = create_test_user(&mut conn, "alice").await;
    let tweet = create_test_tweet(&mut conn, user.id, "once").await;

    likes::create(&mut conn, tweet.id, user.id).await.unwrap();
    let err = likes::create(&mut conn, tweet.id, user.id).await.unwrap_err();

    assert!(matches!(err, ChirpError::Duplicate(_)));
    assert_eq!(likes::count_for_tweet(&mut conn, tweet.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_unlike_removes_exactly_the_callers_like() {
    let test_db = TestDb::new().await;
    let mut conn = test_db.conn().await;

    let alice = create_test_user(&mut conn, "alice").await;
    let bob = create_test_user(&mut conn, "bob").await;
    let tweet = create_test_tweet(&mut conn, alice.id, "popular").await;

    likes::create(&mut conn, tweet.id, alice.id).await.unwrap();
    let bobs = likes::create(&mut conn, tweet.id, bob.id).await.unwrap();
    assert_eq!(likes::count_for_tweet(&mut conn, tweet.id).await.unwrap(), 2);

    assert!(likes::delete(&mut conn, bobs.id).await.unwrap());

    assert_eq!(likes::count_for_tweet(&mut conn, tweet.id).await.unwrap(), 1);
    assert!(likes::find(&mut conn, tweet.id, bob.id).await.unwrap().is_none());
    assert!(likes::find(&mut conn, tweet.id, alice.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_like_requires_existing_tweet() {
    let test_db = TestDb::new().await;
    let mut conn = test_db.conn().await;

    let user = create_test_user(&mut conn, "alice").await;
    let result = likes::create(&mut conn, TweetId::generate(), user.id).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_delete_missing_like_reports_false() {
    let test_db = TestDb::new().await;
    let mut conn = test_db.conn().await;

    assert!(!likes::delete(&mut conn, LikeId::generate()).await.unwrap());
}
