/// Tweet domain types and the response shaper
use crate::types::{TweetId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Email reported for a tweet whose author is missing from the user set
pub const UNKNOWN_AUTHOR: &str = "Unknown user";

/// Current time truncated to the microsecond precision the store keeps
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

/// Tweet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    /// Unique tweet identifier
    pub id: TweetId,

    /// Author
    pub user_id: UserId,

    /// Title, unique across all tweets
    pub title: String,

    /// Body text
    pub content: String,

    /// Server-assigned creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Tweet {
    /// Create a new tweet with a fresh id and the current timestamp
    pub fn new(user_id: UserId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: TweetId::generate(),
            user_id,
            title: title.into(),
            content: content.into(),
            created_at: now(),
        }
    }
}

/// Data needed to create a tweet
#[derive(Debug, Clone)]
pub struct CreateTweet {
    pub user_id: UserId,
    pub title: String,
    pub content: String,
}

/// Partial tweet update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateTweet {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl UpdateTweet {
    /// True when neither field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Externally visible tweet: the tweet plus its author's email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetResponse {
    pub id: TweetId,
    pub user_id: UserId,
    pub email: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl TweetResponse {
    /// Join a tweet with its author's email from `emails`, falling back to
    /// [`UNKNOWN_AUTHOR`] when the author id is not in the map
    pub fn shape(tweet: Tweet, emails: &HashMap<UserId, String>) -> Self {
        let email = emails
            .get(&tweet.user_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        Self::with_email(tweet, email)
    }

    /// Build a response when the author's email is already known
    pub fn with_email(tweet: Tweet, email: impl Into<String>) -> Self {
        Self {
            id: tweet.id,
            user_id: tweet.user_id,
            email: email.into(),
            title: tweet.title,
            content: tweet.content,
            created_at: tweet.created_at,
        }
    }
}
