use askama::Template;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::models::{AppState, CurrentUser, Flash};
use crate::services::ExportFormat;

pub const SESSION_COOKIE: &str = "session_id";

pub fn session_id_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

pub fn current_user_from_jar(state: &AppState, jar: &CookieJar) -> Option<CurrentUser> {
    let sid = session_id_from_jar(jar)?;
    state.sessions().get(&sid).map(|s| s.user.clone())
}

pub fn push_flash(state: &AppState, sid: &str, flash: Flash) {
    state.flashes().entry(sid.to_string()).or_default().push(flash);
}

pub fn take_flash_messages(state: &AppState, jar: &CookieJar) -> Vec<Flash> {
    let Some(sid) = session_id_from_jar(jar) else {
        return vec![];
    };
    state.flashes().remove(&sid).unwrap_or_default()
}

pub fn render_template<T: Template>(t: T) -> Response {
    match t.render() {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            tracing::error!(%e, "Template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

pub fn download_response(format: ExportFormat, filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, format.mime().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}
