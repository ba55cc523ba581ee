/// HTTP routing
use crate::{api, middleware, state::AppState};
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full application router
///
/// Everything except health, registration, login, token refresh and the
/// token-based password/verification flows requires a bearer access token.
pub fn create_router(app_state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/auth/register", post(api::auth::register))
        .route("/auth/jwt/login", post(api::auth::login))
        .route("/auth/jwt/refresh", post(api::auth::refresh))
        .route("/auth/forgot-password", post(api::auth::forgot_password))
        .route("/auth/reset-password", post(api::auth::reset_password))
        .route(
            "/auth/request-verify-token",
            post(api::auth::request_verify_token),
        )
        .route("/auth/verify", post(api::auth::verify));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        // Account
        .route("/auth/jwt/logout", post(api::auth::logout))
        .route("/auth/me", get(api::users::me).patch(api::users::update_me))
        .route(
            "/auth/:id",
            get(api::users::get_user).patch(api::users::update_user),
        )
        // Tweets
        .route(
            "/tweets",
            get(api::tweets::list_tweets).post(api::tweets::create_tweet),
        )
        .route(
            "/tweets/:id",
            get(api::tweets::get_tweet)
                .patch(api::tweets::update_tweet)
                .delete(api::tweets::delete_tweet),
        )
        // Likes
        .route("/tweets/:id/like", post(api::likes::like_tweet))
        .route("/tweets/:id/dislike", delete(api::likes::dislike_tweet))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth_middleware,
        ));

    public_routes
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
