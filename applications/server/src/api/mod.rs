/// API route modules
pub mod auth;
pub mod health;
pub mod likes;
pub mod tweets;
pub mod users;
