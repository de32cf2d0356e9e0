use axum::{
    body::Bytes,
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::models::{AppState, Flash, ViewFilter, COLUMNS};
use crate::services::{
    append_blank_row, apply_filter, apply_grid, apply_stamps, export_filename, failure_message,
    filter_options, parse_grid_form, save_rows, status_line, ExportFormat,
};
use crate::templates::{GridRowView, RecordsTemplate, SelectOption};
use crate::util::parse_urlencoded_body;

use super::helpers::{download_response, push_flash, render_template, session_id_from_jar, take_flash_messages};

pub async fn records_get(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let Some(sid) = session_id_from_jar(&jar) else {
        return Redirect::to("/login").into_response();
    };
    let page = {
        let sessions = state.sessions();
        let Some(session) = sessions.get(&sid) else {
            return Redirect::to("/login").into_response();
        };
        let options = filter_options(&session.table);
        let rows: Vec<GridRowView> = session
            .visible_indices()
            .into_iter()
            .enumerate()
            .map(|(pos, idx)| GridRowView::new(pos, idx, &session.table[idx]))
            .collect();
        RecordsTemplate {
            flash_messages: Vec::new(),
            has_flash_messages: false,
            current_user: session.user.clone(),
            period_options: SelectOption::list(options.periods, &session.filters.period_selection()),
            property_options: SelectOption::list(options.property_ids, &session.filters.property_selection()),
            status_line: status_line(&session.filters, rows.len(), session.table.len()),
            filtered: session.filters.is_active(),
            columns: COLUMNS.to_vec(),
            row_count: rows.len(),
            rows,
            revision: session.revision,
            table_label: state.table_label().to_string(),
            warehouse_configured: state.store.is_some(),
        }
    };
    let flash_messages = take_flash_messages(&state, &jar);
    render_template(RecordsTemplate {
        has_flash_messages: !flash_messages.is_empty(),
        flash_messages,
        ..page
    })
}

#[derive(Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub property_id: String,
}

pub async fn filters_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<FilterForm>,
) -> impl IntoResponse {
    let Some(sid) = session_id_from_jar(&jar) else {
        return Redirect::to("/login");
    };
    match ViewFilter::from_selection(&form.period, &form.property_id) {
        Ok(filter) => {
            if let Some(session) = state.sessions().get_mut(&sid) {
                session.filters = filter;
            }
        }
        Err(e) => push_flash(&state, &sid, Flash::error(e.to_string())),
    }
    Redirect::to("/records")
}

enum GridAction {
    Apply,
    AddRow,
    Export(ExportFormat),
    Save,
}

impl GridAction {
    fn parse(s: &str) -> Option<GridAction> {
        match s {
            "" | "apply" => Some(GridAction::Apply),
            "add_row" => Some(GridAction::AddRow),
            "export_xlsx" => Some(GridAction::Export(ExportFormat::Xlsx)),
            "export_csv" => Some(GridAction::Export(ExportFormat::Csv)),
            "save" => Some(GridAction::Save),
            _ => None,
        }
    }
}

/// Every grid button lands here: the submitted grid is merged first, then the action runs.
pub async fn grid_post(State(state): State<AppState>, jar: CookieJar, body: Bytes) -> Response {
    let Some(sid) = session_id_from_jar(&jar) else {
        return Redirect::to("/login").into_response();
    };
    let form = parse_urlencoded_body(&body);
    let raw_action = form
        .get("action")
        .and_then(|v| v.first())
        .map(|s| s.as_str())
        .unwrap_or("");
    let Some(action) = GridAction::parse(raw_action) else {
        push_flash(&state, &sid, Flash::error(format!("Unknown action: {}", raw_action)));
        return Redirect::to("/records").into_response();
    };
    let submission = match parse_grid_form(&form) {
        Ok(s) => s,
        Err(e) => {
            push_flash(&state, &sid, Flash::error(e.to_string()));
            return Redirect::to("/records").into_response();
        }
    };

    // Work under the session lock, then release it before any await.
    let mut notices: Vec<Flash> = Vec::new();
    let pending_save = {
        let mut sessions = state.sessions();
        let Some(session) = sessions.get_mut(&sid) else {
            return Redirect::to("/login").into_response();
        };
        let change = match apply_grid(session, &submission) {
            Ok(c) => c,
            Err(e) => {
                drop(sessions);
                push_flash(&state, &sid, Flash::error(e.to_string()));
                return Redirect::to("/records").into_response();
            }
        };
        match action {
            GridAction::Apply => {
                let mut msg = format!("Applied edits to {} rows.", change.updated);
                if change.deleted > 0 {
                    msg.push_str(&format!(" Removed {} rows from the grid.", change.deleted));
                }
                notices.push(Flash::info(msg));
                None
            }
            GridAction::AddRow => {
                let idx = append_blank_row(session, chrono::Local::now());
                let added = &session.table[idx];
                if !session.filters.matches(added) {
                    notices.push(Flash::info(format!(
                        "Added a row for property {} ({}); it is hidden by the current filters.",
                        added.property_id, added.period
                    )));
                }
                None
            }
            GridAction::Export(format) => {
                let view = apply_filter(&session.table, &session.filters);
                drop(sessions);
                return match format.encode(&view) {
                    Ok(bytes) => {
                        let filename = export_filename(format, chrono::Local::now());
                        tracing::info!(%filename, rows = view.len(), bytes = bytes.len(), "Exported view");
                        download_response(format, &filename, bytes)
                    }
                    Err(e) => {
                        tracing::error!(%e, "Export failed");
                        push_flash(&state, &sid, Flash::error(e.to_string()));
                        Redirect::to("/records").into_response()
                    }
                };
            }
            GridAction::Save => Some((
                session.table.clone(),
                session.user.username.clone(),
                session.revision,
            )),
        }
    };

    if let Some((rows, username, revision)) = pending_save {
        match save_rows(state.store.as_deref(), &rows, &username).await {
            Ok(summary) => {
                if let Some(session) = state.sessions().get_mut(&sid) {
                    if session.revision == revision && session.table.len() == rows.len() {
                        apply_stamps(&mut session.table, &summary, &username);
                    }
                }
                notices.push(summary.message(state.table_label()));
            }
            Err(e) => {
                tracing::error!(%e, %username, "Save failed");
                notices.push(failure_message(&e));
            }
        }
    }

    for notice in notices {
        push_flash(&state, &sid, notice);
    }
    Redirect::to("/records").into_response()
}
