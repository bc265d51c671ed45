use axum::{
    Json,
    extract::State,
    response::Response,
};
use axum_extra::extract::CookieJar;

use showcase_db::ReviewOutcome;
use showcase_types::api::{AdminDashboard, Flash};
use showcase_types::{Decision, Project, ProjectStatus, Role};

use crate::error::{AppError, AppResult};
use crate::flash;
use crate::middleware::{AdminUser, ProjectId};
use crate::state::{AppState, with_db};

pub async fn dashboard(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<AdminDashboard>)> {
    let (pending, total_students, total_projects, approved_projects) = with_db(&state, |db| {
        Ok((
            db.list_projects_by_status(ProjectStatus::Pending)?,
            db.count_students()?,
            db.count_projects()?,
            db.count_projects_by_status(ProjectStatus::Approved)?,
        ))
    })
    .await?;

    let pending_projects = pending
        .into_iter()
        .map(Project::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let (jar, flash) = flash::take(jar);
    Ok((
        jar,
        Json(AdminDashboard {
            flash,
            pending_projects,
            total_students,
            total_projects,
            approved_projects,
        }),
    ))
}

/// POST /admin/approve/{id}: approve and issue the certificate.
pub async fn approve(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
    jar: CookieJar,
) -> AppResult<Response> {
    review(state, jar, project_id, Decision::Approve).await
}

/// POST /admin/reject/{id}
pub async fn reject(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
    jar: CookieJar,
) -> AppResult<Response> {
    review(state, jar, project_id, Decision::Reject).await
}

async fn review(state: AppState, jar: CookieJar, project_id: i64, decision: Decision) -> AppResult<Response> {
    let home = Role::Admin.home_path();
    let outcome = with_db(&state, move |db| db.review_project(project_id, decision)).await?;

    let project_name = match outcome {
        ReviewOutcome::NotFound => return Err(AppError::NotFound),
        ReviewOutcome::Refused { refusal, .. } => return Err(AppError::redirect(home, refusal.to_string())),
        ReviewOutcome::Moved { project_name, .. } | ReviewOutcome::Unchanged { project_name } => {
            project_name
        }
    };

    let flash = match decision {
        Decision::Approve => Flash::success(format!("Project \"{project_name}\" approved!")),
        Decision::Reject => Flash::error(format!("Project \"{project_name}\" rejected.")),
    };
    Ok(flash::redirect(jar, home, flash))
}
