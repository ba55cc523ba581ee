//! Chirp Core
//!
//! Domain types and error handling shared by the Chirp storage layer and server.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Tweet`, `Like` and their typed identifiers
//! - **Views**: `TweetResponse`, the externally visible projection of a tweet
//! - **Error Handling**: Unified `ChirpError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use chirp_core::types::{Tweet, TweetResponse, UserId};
//! use std::collections::HashMap;
//!
//! let author = UserId::generate();
//! let tweet = Tweet::new(author, "hello", "world");
//!
//! // Authors missing from the email index are reported as "Unknown user"
//! let response = TweetResponse::shape(tweet, &HashMap::new());
//! assert_eq!(response.email, "Unknown user");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{ChirpError, Result};

pub use types::{
    CreateTweet, Like, LikeId, NewUser, Tweet, TweetId, TweetResponse, UpdateTweet, UpdateUser,
    User, UserId, UNKNOWN_AUTHOR,
};
