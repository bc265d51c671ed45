//! Role guards.
//!
//! Each guard is an extractor: a handler that takes `StudentUser` or
//! `AdminUser` cannot run for the wrong role. Rejections are redirects with a
//! flash message rather than error statuses, matching the rest of the site.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use showcase_types::{Role, User};

use crate::auth::{self, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::{AppState, with_db};

pub const LOGIN_PATH: &str = "/student/login";

/// The session's user if there is a valid session, without rejecting anonymous visitors.
pub struct MaybeUser(pub Option<User>);

/// Any logged-in user, student or admin.
pub struct CurrentUser(pub User);

/// A logged-in student. Admins are sent to their own dashboard.
pub struct StudentUser(pub User);

/// A logged-in admin.
pub struct AdminUser(pub User);

/// Numeric project id from the path. Anything that is not an `i64` is a 404,
/// the same as an id that matches no project.
pub struct ProjectId(pub i64);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(claims) = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| auth::decode_session(&state.config.session, cookie.value()))
        else {
            return Ok(MaybeUser(None));
        };

        // The role always comes from the current row, not from the token.
        let user_id = claims.sub;
        let row = with_db(state, move |db| db.get_user_by_id(user_id)).await?;
        let user = row.map(User::try_from).transpose()?;
        Ok(MaybeUser(user))
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(user)) => Ok(CurrentUser(user)),
            MaybeUser(None) => Err(AppError::redirect(LOGIN_PATH, "Please login to access this page.")),
        }
    }
}

impl FromRequestParts<AppState> for StudentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        match user.role {
            Role::Student => Ok(StudentUser(user)),
            Role::Admin => Err(AppError::redirect(
                Role::Admin.home_path(),
                "This page is for students only.",
            )),
        }
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(user)) if user.role == Role::Admin => Ok(AdminUser(user)),
            _ => Err(AppError::redirect(LOGIN_PATH, "Access denied. Admin privileges required.")),
        }
    }
}

impl<S> FromRequestParts<S> for ProjectId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        Ok(ProjectId(id))
    }
}
