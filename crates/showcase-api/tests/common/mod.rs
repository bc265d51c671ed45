#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use showcase_api::auth::{self, SESSION_COOKIE};
use showcase_api::config::ServerConfig;
use showcase_api::flash::{self, FLASH_COOKIE};
use showcase_api::router::build_router;
use showcase_api::state::{AppState, AppStateInner};
use showcase_certificate::CertificateRenderer;
use showcase_db::Database;
use showcase_types::api::Flash;

pub const PASSWORD: &str = "secret123";

const BOUNDARY: &str = "showcase-test-boundary";

/// Full router over an in-memory database and a throwaway upload directory.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(tweak: impl FnOnce(&mut ServerConfig)) -> Self {
        let uploads = tempfile::tempdir().expect("tempdir");
        let mut config = ServerConfig {
            upload_dir: uploads.path().to_path_buf(),
            ..ServerConfig::default()
        };
        config.session.secret = "test-secret".into();
        tweak(&mut config);

        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().expect("in-memory db"),
            config,
            renderer: CertificateRenderer::builtin(),
        });

        Self {
            router: build_router(state.clone()),
            state,
            uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
        cookie: Option<&str>,
    ) -> Response {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                    .as_bytes(),
            );
        }
        if let Some((filename, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"media_file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::post(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn register(&self, name: &str, email: &str, roll: &str) -> Response {
        let body = format!("name={name}&email={email}&roll_number={roll}&password={PASSWORD}");
        self.post_form("/student/register", &body, None).await
    }

    /// Register and log in a student, returning the `Cookie` header value for its session.
    pub async fn student(&self, name: &str, email: &str, roll: &str) -> String {
        let response = self.register(name, email, roll).await;
        assert_eq!(location(&response), "/student/login");

        let body = format!("email={email}&password={PASSWORD}");
        let response = self.post_form("/student/login", &body, None).await;
        assert_eq!(location(&response), "/student/dashboard");
        session_header(&response)
    }

    /// Bootstrap the configured admin and log in as it.
    pub async fn admin(&self) -> String {
        auth::bootstrap_admin(&self.state.db, &self.state.config.admin).expect("bootstrap");
        let admin = &self.state.config.admin;
        let body = format!("email={}&password={}", admin.email, admin.password);
        let response = self.post_form("/admin/login", &body, None).await;
        assert_eq!(location(&response), "/admin/dashboard");
        session_header(&response)
    }

    pub async fn upload(&self, cookie: &str, name: &str, file: Option<(&str, &[u8])>) -> Response {
        let fields = [
            ("project_name", name),
            ("description", "A compiler for a tiny language."),
            ("tech_stack", "Rust"),
            ("project_link", "https://example.com/tiny"),
        ];
        self.post_multipart("/student/upload-project", &fields, file, Some(cookie)).await
    }

    /// Upload a project and return its id from the student's project list.
    pub async fn uploaded_project(&self, cookie: &str, name: &str) -> i64 {
        let response = self.upload(cookie, name, None).await;
        assert_eq!(location(&response), "/student/my-projects");

        let page = body_json(self.get("/student/my-projects", Some(cookie)).await).await;
        page["projects"]
            .as_array()
            .and_then(|projects| projects.iter().find(|p| p["name"] == name))
            .and_then(|p| p["id"].as_i64())
            .expect("uploaded project is listed")
    }

    pub async fn approve(&self, admin: &str, project_id: i64) -> Response {
        self.post_form(&format!("/admin/approve/{project_id}"), "", Some(admin)).await
    }

    pub async fn reject(&self, admin: &str, project_id: i64) -> Response {
        self.post_form(&format!("/admin/reject/{project_id}"), "", Some(admin)).await
    }
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Value of a cookie set by `response`, if any.
pub fn set_cookie(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.to_string())
}

pub fn session_header(response: &Response) -> String {
    let token = set_cookie(response, SESSION_COOKIE).expect("session cookie");
    format!("{SESSION_COOKIE}={token}")
}

/// The flash message a redirect leaves behind.
pub fn flash(response: &Response) -> Option<Flash> {
    set_cookie(response, FLASH_COOKIE).and_then(|raw| flash::decode(&raw))
}

pub fn flash_message(response: &Response) -> String {
    flash(response).map(|f| f.message).unwrap_or_default()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}
