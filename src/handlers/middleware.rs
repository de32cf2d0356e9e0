use std::time::Instant;

use axum::{
    extract::{State, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::models::AppState;
use crate::handlers::helpers::session_id_from_jar;

pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let active = session_id_from_jar(&jar)
        .map(|sid| state.touch_session(&sid, Instant::now()))
        .unwrap_or(false);
    if active {
        next.run(request).await
    } else {
        Redirect::to("/login").into_response()
    }
}
