/// Shared types for the project showcase portal.
///
/// `models` holds the domain records and the review state machine,
/// `api` holds session claims, form payloads and the page view models
/// returned by the HTTP layer.
pub mod api;
pub mod models;

pub use models::{
    Certificate, Decision, Project, ProjectStatus, ReviewRefusal, Role, ShowcaseEntry, User,
};
