use axum::{
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use tracing::info;

use showcase_certificate::CertificateFields;
use showcase_db::parse_timestamp;
use showcase_types::{ProjectStatus, Role};

use crate::error::{AppError, AppResult};
use crate::middleware::{CurrentUser, ProjectId};
use crate::projects::sanitize_filename;
use crate::state::{AppState, with_db};

/// GET /download-certificate/{id}: render the certificate PNG as an attachment.
///
/// Only the owning student or an admin may download, and only once the
/// project is approved and its certificate row exists.
pub async fn download_certificate(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ProjectId(project_id): ProjectId,
) -> AppResult<Response> {
    let (project, certificate) = with_db(&state, move |db| {
        Ok((db.get_project(project_id)?, db.get_certificate_for_project(project_id)?))
    })
    .await?;

    let project = project.ok_or(AppError::NotFound)?;

    if project.user_id != user.id && user.role != Role::Admin {
        return Err(AppError::redirect(Role::Student.home_path(), "Access denied."));
    }

    let approved = project.status.parse::<ProjectStatus>().ok() == Some(ProjectStatus::Approved);
    let certificate = match certificate {
        Some(certificate) if approved => certificate,
        _ => {
            let back = match user.role {
                Role::Student => "/student/my-projects",
                Role::Admin => Role::Admin.home_path(),
            };
            return Err(AppError::redirect(back, "Certificate not available."));
        }
    };

    let issued_at = parse_timestamp(&certificate.issued_at)?;
    let render_state = state.clone();
    let png = tokio::task::spawn_blocking(move || {
        render_state.renderer.render_png(&CertificateFields {
            student_name: &certificate.student_name,
            project_name: &certificate.project_name,
            roll_number: &certificate.roll_number,
            issued_at,
        })
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking join error: {}", e)))??;

    info!(project_id, user_id = user.id, bytes = png.len(), "Certificate downloaded");

    let disposition = format!(
        "attachment; filename=\"certificate_{}.png\"",
        sanitize_filename(&project.name)
    );
    let disposition = HeaderValue::from_str(&disposition).map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        png,
    )
        .into_response())
}
