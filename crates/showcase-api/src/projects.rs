use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::{error, info};
use uuid::Uuid;

use showcase_db::NewProject;
use showcase_types::api::{Flash, FormPage, ShowcasePage};
use showcase_types::{Project, ShowcaseEntry};

use crate::error::{AppError, AppResult};
use crate::flash;
use crate::middleware::StudentUser;
use crate::state::{AppState, with_db};

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "mp4", "avi", "mov", "pdf"];
pub const MIN_DESCRIPTION_CHARS: usize = 10;

const UPLOAD_PATH: &str = "/student/upload-project";
const MY_PROJECTS_PATH: &str = "/student/my-projects";

#[derive(Default)]
struct UploadForm {
    project_name: String,
    description: String,
    tech_stack: String,
    project_link: String,
    media: Option<(String, Bytes)>,
}

pub async fn upload_page(
    StudentUser(_user): StudentUser,
    jar: CookieJar,
) -> (CookieJar, Json<FormPage>) {
    let (jar, flash) = flash::take(jar);
    (jar, Json(FormPage { flash }))
}

/// POST /student/upload-project (multipart).
///
/// Validates the text fields, stores the optional media file under a
/// collision-free name, then creates the project as `pending`.
pub async fn upload_project(
    StudentUser(user): StudentUser,
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = read_form(multipart).await?;

    let project_name = form.project_name.trim().to_string();
    // Counted and stored as submitted; only a blank description is refused outright
    let description = form.description;
    let tech_stack = form.tech_stack.trim().to_string();
    let project_link = Some(form.project_link.trim().to_string()).filter(|l| !l.is_empty());

    if project_name.is_empty() || description.trim().is_empty() || tech_stack.is_empty() {
        return Err(AppError::redirect(UPLOAD_PATH, "Please fill all required fields."));
    }
    if description.chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(AppError::redirect(
            UPLOAD_PATH,
            format!("Description must be at least {MIN_DESCRIPTION_CHARS} characters."),
        ));
    }

    let media_file = match form.media {
        Some((original, _)) if !allowed_file(&original) => {
            return Err(AppError::redirect(UPLOAD_PATH, "File type not allowed."));
        }
        Some((original, data)) => {
            let stored = stored_filename(&user.roll_number, &original);
            save_upload(&state, &stored, &data).await?;
            Some(stored)
        }
        None => None,
    };

    let stored = media_file.clone();
    let user_id = user.id;
    let roll_number = user.roll_number.clone();
    let inserted = with_db(&state, move |db| {
        db.insert_project(&NewProject {
            name: &project_name,
            description: &description,
            tech_stack: &tech_stack,
            project_link: project_link.as_deref(),
            media_file: media_file.as_deref(),
            roll_number: &roll_number,
            user_id,
        })
    })
    .await;

    let project_id = match inserted {
        Ok(id) => id,
        Err(e) => {
            if let Some(stored) = stored {
                tokio::fs::remove_file(state.config.upload_dir.join(stored)).await.ok();
            }
            return Err(e);
        }
    };

    info!(project_id, user_id, media = ?stored, "Project uploaded");
    Ok(flash::redirect(jar, MY_PROJECTS_PATH, Flash::success("Project uploaded successfully!")))
}

/// Public listing of every approved project, newest first.
pub async fn showcase(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ShowcasePage>)> {
    let rows = with_db(&state, |db| db.list_showcase()).await?;
    let projects = rows
        .into_iter()
        .map(|(row, student_name)| -> anyhow::Result<ShowcaseEntry> {
            Ok(ShowcaseEntry {
                project: Project::try_from(row)?,
                student_name,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let (jar, flash) = flash::take(jar);
    Ok((jar, Json(ShowcasePage { flash, projects })))
}

async fn read_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "media_file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(upload_error)?;
                // Browsers send an empty part when no file was picked
                if !filename.is_empty() {
                    form.media = Some((filename, data));
                }
            }
            "project_name" => form.project_name = field.text().await.map_err(upload_error)?,
            "description" => form.description = field.text().await.map_err(upload_error)?,
            "tech_stack" => form.tech_stack = field.text().await.map_err(upload_error)?,
            "project_link" => form.project_link = field.text().await.map_err(upload_error)?,
            _ => {}
        }
    }

    Ok(form)
}

fn upload_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::redirect(UPLOAD_PATH, "File is too large.")
    } else {
        AppError::redirect(UPLOAD_PATH, "Invalid upload.")
    }
}

async fn save_upload(state: &AppState, stored: &str, data: &[u8]) -> AppResult<()> {
    let dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        error!("Failed to create upload directory {}: {}", dir.display(), e);
        AppError::Internal(e.into())
    })?;

    let path = dir.join(stored);
    tokio::fs::write(&path, data).await.map_err(|e| {
        error!("Failed to write upload {}: {}", path.display(), e);
        AppError::Internal(e.into())
    })
}

/// Extension allow-list check, case-insensitive. Names without an extension are refused.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// `{roll}_{YYYYmmddHHMMSS}_{uuid}_{name}`. The random component makes two
/// uploads in the same second with the same original name distinct.
pub fn stored_filename(roll_number: &str, original: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        sanitize_filename(roll_number),
        chrono::Utc::now().format("%Y%m%d%H%M%S"),
        Uuid::new_v4().simple(),
        sanitize_filename(original)
    )
}

/// Reduce a client-supplied name to a safe single path component.
///
/// Drops any directory part, maps whitespace and anything outside
/// `[A-Za-z0-9._-]` to `_`, and strips leading dots and underscores.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let trimmed = cleaned.trim_start_matches(['.', '_']).trim_end_matches('_');
    if trimmed.is_empty() { "file".to_string() } else { trimmed.to_string() }
}
