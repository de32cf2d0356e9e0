mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use common::{MemoryStore, Statement};
use propex::routes::build_router;
use propex::services::seed_records;

const FORM: &str = "application/x-www-form-urlencoded";

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

fn post(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, FORM);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::empty()).unwrap()
}

fn location(resp: &Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

async fn body_text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Logs in and returns the `session_id=...` pair to send back.
async fn login(app: &Router, role: &str, user: &str, pass: &str) -> String {
    let body = format!("role={}&username={}&password={}", role, user, pass);
    let resp = send(app, post("/login", None, &body)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/records");
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    set_cookie.split(';').next().unwrap().to_string()
}

const ONE_ROW_GRID: &str = "revision=0&row_count=1&r0_source=0&r0_period=2025-04\
&r0_property_name=Newsec+Sweden+HQ+1&r0_unit_count=50&r0_occupancy_rate=0.98\
&r0_total_rent=120000&r0_comment=Updated&r0_edited=on";

#[tokio::test]
async fn records_require_a_session() {
    let app = build_router(common::state_with_store(None));
    let resp = send(&app, get("/records", None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let resp = send(&app, get("/records", Some("session_id=forged"))).await;
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn root_sends_anonymous_users_to_login() {
    let app = build_router(common::state_with_store(None));
    let resp = send(&app, get("/", None)).await;
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn login_page_lists_the_roles() {
    let app = build_router(common::state_with_store(None));
    let resp = send(&app, get("/login", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    for label in ["Admin", "Property Manager", "Finance Team", "Data Engineer"] {
        assert!(html.contains(label), "missing role {}", label);
    }
}

#[tokio::test]
async fn wrong_password_stays_on_login() {
    let app = build_router(common::state_with_store(None));
    let resp = send(
        &app,
        post("/login", None, "role=admin&username=admin&password=nope"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    let html = body_text(resp).await;
    assert!(html.contains("Invalid username or password for selected role."));
}

#[tokio::test]
async fn login_shows_seed_grid_without_warehouse() {
    let app = build_router(common::state_with_store(None));
    let cookie = login(&app, "finance_team", "finance", "finance123").await;

    let resp = send(&app, get("/records", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    let html = body_text(resp).await;
    assert!(html.contains("Welcome, finance (Finance Team)"));
    assert!(html.contains("Newsec Sweden HQ 10"));
    assert!(html.contains("No filters applied"));
}

#[tokio::test]
async fn filtered_save_updates_one_warehouse_row() {
    let store = Arc::new(MemoryStore::with_rows(seed_records("admin")));
    let app = build_router(common::state_with_store(Some(store.clone())));
    let cookie = login(&app, "finance_team", "finance", "finance123").await;

    let resp = send(
        &app,
        post("/filters", Some(&cookie), "period=2025-04&property_id=1001"),
    )
    .await;
    assert_eq!(location(&resp), "/records");

    let body = format!("{}&action=save", ONE_ROW_GRID);
    let resp = send(&app, post("/records", Some(&cookie), &body)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    assert_eq!(
        store.statements(),
        vec![Statement::Update("2025-04".into(), 1001)]
    );
    assert_eq!(store.row_count(), 20);
    let stored = store.find("2025-04", 1001).unwrap();
    assert_eq!(stored.comment, "Updated");
    assert_eq!(stored.last_modified_by, "finance");

    let html = body_text(send(&app, get("/records", Some(&cookie))).await).await;
    assert!(html.contains("Data saved to [dbo].[PropertyExport]: 1 records updated."));
    assert!(html.contains("Filtered: Showing 1 of 20 records"));
}

#[tokio::test]
async fn save_without_password_reports_missing_setting() {
    let app = build_router(common::state_with_store(None));
    let cookie = login(&app, "admin", "admin", "admin123").await;
    send(
        &app,
        post("/filters", Some(&cookie), "period=2025-04&property_id=1001"),
    )
    .await;

    let body = format!("{}&action=save", ONE_ROW_GRID);
    send(&app, post("/records", Some(&cookie), &body)).await;

    let html = body_text(send(&app, get("/records", Some(&cookie))).await).await;
    assert!(html.contains("SYNAPSE_PASSWORD environment variable not set."));
}

#[tokio::test]
async fn csv_export_downloads_the_view() {
    let app = build_router(common::state_with_store(None));
    let cookie = login(&app, "admin", "admin", "admin123").await;
    send(
        &app,
        post("/filters", Some(&cookie), "period=2025-04&property_id=1001"),
    )
    .await;

    let body = format!("{}&action=export_csv", ONE_ROW_GRID);
    let resp = send(&app, post("/records", Some(&cookie), &body)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/csv");
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"property_export_"));
    assert!(disposition.ends_with(".csv\""));

    let text = body_text(resp).await;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Year-Month,Property ID"));
    assert!(lines[1].starts_with("2025-04,1001,Newsec Sweden HQ 1,50,"));
    assert!(lines[1].contains(",Updated,"));
}

#[tokio::test]
async fn bad_cell_shows_error_and_keeps_table() {
    let app = build_router(common::state_with_store(None));
    let cookie = login(&app, "admin", "admin", "admin123").await;
    send(
        &app,
        post("/filters", Some(&cookie), "period=2025-04&property_id=1001"),
    )
    .await;

    let body = ONE_ROW_GRID.replace("r0_unit_count=50", "r0_unit_count=lots") + "&action=apply";
    send(&app, post("/records", Some(&cookie), &body)).await;

    let html = body_text(send(&app, get("/records", Some(&cookie))).await).await;
    assert!(html.contains("Unit Count must be a whole number"));
    assert!(html.contains("April data for unit 1"));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = build_router(common::state_with_store(None));
    let cookie = login(&app, "data_engineer", "engineer", "engineer123").await;

    let resp = send(&app, post("/logout", Some(&cookie), "")).await;
    assert_eq!(location(&resp), "/login");

    let resp = send(&app, get("/records", Some(&cookie))).await;
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn stylesheet_is_served() {
    let app = build_router(common::state_with_store(None));
    let resp = send(&app, get("/static/styles.css", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/css");
}

#[tokio::test]
async fn oversized_grid_is_refused_and_server_keeps_serving() {
    let app = build_router(common::state_with_store(None));
    let cookie = login(&app, "admin", "admin", "admin123").await;

    let resp = send(
        &app,
        post("/records", Some(&cookie), "revision=0&row_count=100000000000&action=apply"),
    )
    .await;
    assert_eq!(location(&resp), "/records");

    let html = body_text(send(&app, get("/records", Some(&cookie))).await).await;
    assert!(html.contains("Grid form has too many rows"));
    assert!(html.contains("Newsec Sweden HQ 10"));
}

#[tokio::test]
async fn idle_session_is_sent_back_to_login() {
    let mut state = common::state_with_store(None);
    state.session_idle_timeout = std::time::Duration::ZERO;
    let app = build_router(state);
    let cookie = login(&app, "admin", "admin", "admin123").await;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let resp = send(&app, get("/records", Some(&cookie))).await;
    assert_eq!(location(&resp), "/login");
}
