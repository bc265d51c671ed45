use serde::{Deserialize, Serialize};

use crate::models::{Project, Role, ShowcaseEntry, User};

// -- Session --

/// Claims carried in the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

// -- Forms --
//
// Every field defaults to empty so a missing field reaches the handler's
// validation (and its flash message) instead of a 422 from the extractor.

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

// -- Flash --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// One-shot message shown on the page after a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Error, message: message.into() }
    }
}

// -- Page views --

/// Login, registration and upload forms carry nothing but the pending flash.
#[derive(Debug, Serialize)]
pub struct FormPage {
    pub flash: Option<Flash>,
}

#[derive(Debug, Serialize)]
pub struct StudentDashboard {
    pub flash: Option<Flash>,
    pub user: User,
    pub total: i64,
    pub approved: i64,
    pub pending: i64,
}

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub flash: Option<Flash>,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ProjectListPage {
    pub flash: Option<Flash>,
    pub projects: Vec<Project>,
}

#[derive(Debug, Serialize)]
pub struct ShowcasePage {
    pub flash: Option<Flash>,
    pub projects: Vec<ShowcaseEntry>,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub flash: Option<Flash>,
    pub pending_projects: Vec<Project>,
    pub total_students: i64,
    pub total_projects: i64,
    pub approved_projects: i64,
}
