/// Like domain type
use crate::types::{LikeId, TweetId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's like of a tweet. At most one per (user, tweet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: LikeId,
    pub tweet_id: TweetId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Like {
    /// Create a new like stamped with the current time
    pub fn new(tweet_id: TweetId, user_id: UserId) -> Self {
        Self {
            id: LikeId::generate(),
            tweet_id,
            user_id,
            created_at: super::now(),
        }
    }
}
