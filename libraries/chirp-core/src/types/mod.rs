mod ids;
mod like;
mod tweet;
mod user;

pub use ids::{LikeId, TweetId, UserId};
pub use like::Like;
pub use tweet::{now, CreateTweet, Tweet, TweetResponse, UpdateTweet, UNKNOWN_AUTHOR};
pub use user::{NewUser, UpdateUser, User};
