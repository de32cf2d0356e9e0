use axum::{
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::models::AppState;

// Embed the default stylesheet in the binary
const DEFAULT_STYLESHEET: &str = include_str!("../static/styles.css");

pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/records",
            get(handlers::records::records_get).post(handlers::records::grid_post),
        )
        .route("/filters", post(handlers::records::filters_post))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            handlers::middleware::auth_middleware,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/", get(handlers::auth::root_get))
        .route(
            "/login",
            get(handlers::auth::login_get).post(handlers::auth::login_post),
        )
        .route("/logout", post(handlers::auth::logout_post))
        .route(
            "/static/styles.css",
            get(|| async { ([(CONTENT_TYPE, "text/css")], DEFAULT_STYLESHEET) }),
        )
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
