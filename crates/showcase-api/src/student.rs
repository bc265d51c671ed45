use axum::{Form, Json, extract::State, response::Response};
use axum_extra::extract::CookieJar;
use tracing::info;

use showcase_db::ProfileUpdate;
use showcase_types::Project;
use showcase_types::api::{Flash, ProfileForm, ProfilePage, ProjectListPage, StudentDashboard};

use crate::error::{AppError, AppResult};
use crate::flash;
use crate::middleware::StudentUser;
use crate::state::{AppState, with_db};

const PROFILE_PATH: &str = "/student/profile";

pub async fn dashboard(
    StudentUser(user): StudentUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<StudentDashboard>)> {
    let user_id = user.id;
    let (total, approved, pending) =
        with_db(&state, move |db| db.project_counts_for_user(user_id)).await?;

    let (jar, flash) = flash::take(jar);
    Ok((
        jar,
        Json(StudentDashboard {
            flash,
            user,
            total,
            approved,
            pending,
        }),
    ))
}

pub async fn profile_page(
    StudentUser(user): StudentUser,
    jar: CookieJar,
) -> (CookieJar, Json<ProfilePage>) {
    let (jar, flash) = flash::take(jar);
    (jar, Json(ProfilePage { flash, user }))
}

/// Name and email only. Certificates already issued keep the old name.
pub async fn update_profile(
    StudentUser(user): StudentUser,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    let name = form.name.trim().to_string();
    let email = form.email.trim().to_string();
    if name.is_empty() || email.is_empty() {
        return Err(AppError::redirect(PROFILE_PATH, "Please fill all required fields."));
    }

    let user_id = user.id;
    match with_db(&state, move |db| db.update_profile(user_id, &name, &email)).await? {
        ProfileUpdate::Updated => {
            info!(user_id, "Profile updated");
            Ok(flash::redirect(jar, PROFILE_PATH, Flash::success("Profile updated successfully!")))
        }
        ProfileUpdate::EmailTaken => Err(AppError::redirect(PROFILE_PATH, "Email already registered.")),
        ProfileUpdate::NotFound => Err(AppError::NotFound),
    }
}

/// The student's own submissions, newest first.
pub async fn my_projects(
    StudentUser(user): StudentUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ProjectListPage>)> {
    let user_id = user.id;
    let rows = with_db(&state, move |db| db.list_projects_for_user(user_id)).await?;
    let projects = rows
        .into_iter()
        .map(Project::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let (jar, flash) = flash::take(jar);
    Ok((jar, Json(ProjectListPage { flash, projects })))
}
