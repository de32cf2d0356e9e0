use std::time::Instant;

use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{AppState, Role, Session};
use crate::services::{load_initial_table, random_session_id};
use crate::templates::{LoginTemplate, RoleOption};

use super::helpers::{current_user_from_jar, push_flash, render_template, session_id_from_jar, take_flash_messages, SESSION_COOKIE};

#[derive(Deserialize)]
pub struct LoginForm {
    pub role: String,
    pub username: String,
    pub password: String,
}

fn login_page(state: &AppState, jar: &CookieJar, role: Option<Role>, username: &str, error: Option<String>) -> Response {
    let flash_messages = take_flash_messages(state, jar);
    let has_flash_messages = !flash_messages.is_empty();
    render_template(LoginTemplate {
        flash_messages,
        has_flash_messages,
        roles: RoleOption::list(&state.credentials.roles(), role),
        username: username.to_string(),
        error,
    })
}

pub async fn login_get(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if current_user_from_jar(&state, &jar).is_some() {
        return Redirect::to("/records").into_response();
    }
    login_page(&state, &jar, None, "", None)
}

pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> impl IntoResponse {
    let role = Role::parse(&form.role);
    let result = match role {
        Some(role) => {
            let credentials = state.credentials.clone();
            let username = form.username.clone();
            let password = form.password.clone();
            // PBKDF2 verification is CPU bound; keep it off the async workers.
            tokio::task::spawn_blocking(move || credentials.authenticate(role, &username, &password))
                .await
                .unwrap_or(Err(AppError::InvalidCredentials))
        }
        None => Err(AppError::InvalidCredentials),
    };

    let user = match result {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(username = %form.username, role = %form.role, "Login failed");
            return login_page(&state, &jar, role, &form.username, Some(e.to_string()));
        }
    };

    let (table, load_notice) = load_initial_table(state.store.as_deref(), &user.username).await;
    let pruned = state.prune_idle_sessions(Instant::now());
    if pruned > 0 {
        tracing::info!(pruned, "Dropped idle sessions");
    }
    let sid = random_session_id();
    tracing::info!(username = %user.username, role = user.role.label(), rows = table.len(), "Session started");
    state.sessions().insert(sid.clone(), Session::new(user, table));
    if let Some(flash) = load_notice {
        push_flash(&state, &sid, flash);
    }

    let mut cookie = Cookie::new(SESSION_COOKIE, sid);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    (jar.add(cookie), Redirect::to("/records")).into_response()
}

pub async fn logout_post(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(sid) = session_id_from_jar(&jar) {
        if let Some(session) = state.sessions().remove(&sid) {
            tracing::info!(username = %session.user.username, "Session ended");
        }
        state.flashes().remove(&sid);
    }
    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    (jar.remove(removal), Redirect::to("/login")).into_response()
}

pub async fn root_get(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if current_user_from_jar(&state, &jar).is_some() {
        return Redirect::to("/records").into_response();
    }
    Redirect::to("/login").into_response()
}
