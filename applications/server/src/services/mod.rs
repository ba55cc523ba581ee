/// Server services
///
/// Each operation takes the caller and a connection (normally the request's
/// transaction) explicitly; nothing is resolved from ambient state.
pub mod auth;
pub mod likes;
pub mod tweets;
pub mod users;

pub use auth::AuthService;
