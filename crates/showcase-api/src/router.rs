use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::LOGIN_PATH;
use crate::state::AppState;
use crate::{admin, auth, certificates, projects, student};

/// Every route of the site. Shared by the server binary and the HTTP tests.
pub fn build_router(state: AppState) -> Router {
    let upload_dir = state.config.upload_dir.clone();
    let max_upload_bytes = state.config.max_upload_bytes;

    let public_routes = Router::new()
        .route("/", get(|| async { Redirect::to(LOGIN_PATH) }))
        .route("/health", get(health))
        .route("/showcase", get(projects::showcase))
        .route("/student/register", get(auth::register_page).post(auth::register))
        .route("/student/login", get(auth::student_login_page).post(auth::student_login))
        .route("/admin/login", get(auth::admin_login_page).post(auth::admin_login))
        .nest_service("/uploads", ServeDir::new(upload_dir));

    // Guards are extractors on each handler, so these need no route layer.
    let student_routes = Router::new()
        .route("/logout", get(auth::logout))
        .route("/student/dashboard", get(student::dashboard))
        .route("/student/profile", get(student::profile_page).post(student::update_profile))
        .route(
            "/student/upload-project",
            get(projects::upload_page).post(projects::upload_project),
        )
        .route("/student/my-projects", get(student::my_projects))
        .route("/download-certificate/{id}", get(certificates::download_certificate));

    let admin_routes = Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/approve/{id}", post(admin::approve))
        .route("/admin/reject/{id}", post(admin::reject));

    Router::new()
        .merge(public_routes)
        .merge(student_routes)
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
