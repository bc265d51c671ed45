pub mod admin;
pub mod auth;
pub mod certificates;
pub mod config;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod password;
pub mod projects;
pub mod router;
pub mod state;
pub mod student;
