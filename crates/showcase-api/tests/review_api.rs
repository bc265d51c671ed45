//! HTTP-level tests for admin review and certificate download.

mod common;

use axum::http::{StatusCode, header};
use common::{TestApp, body_bytes, body_json, flash, flash_message, location};
use showcase_types::api::FlashLevel;

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[tokio::test]
async fn approval_issues_exactly_one_certificate() {
    let app = TestApp::new();
    let student = app.student("Ann+Lee", "ann@example.com", "R1").await;
    let admin = app.admin().await;
    let project_id = app.uploaded_project(&student, "Tiny Compiler").await;

    let response = app.approve(&admin, project_id).await;
    assert_eq!(location(&response), "/admin/dashboard");
    let flash = flash(&response).unwrap();
    assert_eq!(flash.level, FlashLevel::Success);
    assert_eq!(flash.message, "Project \"Tiny Compiler\" approved!");

    let certificate = app.state.db.get_certificate_for_project(project_id).unwrap().unwrap();
    assert_eq!(certificate.student_name, "Ann Lee");
    assert_eq!(certificate.project_name, "Tiny Compiler");
    assert_eq!(certificate.roll_number, "R1");

    // A second approval is refused and writes nothing
    let response = app.approve(&admin, project_id).await;
    assert_eq!(location(&response), "/admin/dashboard");
    assert_eq!(flash_message(&response), "Project is already approved.");
    assert_eq!(app.state.db.count_certificates_for_project(project_id).unwrap(), 1);

    let dashboard = body_json(app.get("/student/dashboard", Some(&student)).await).await;
    assert_eq!(dashboard["approved"], 1);
    assert_eq!(dashboard["pending"], 0);
}

#[tokio::test]
async fn approved_projects_cannot_be_rejected() {
    let app = TestApp::new();
    let student = app.student("Ann", "ann@example.com", "R1").await;
    let admin = app.admin().await;
    let project_id = app.uploaded_project(&student, "Final").await;

    app.approve(&admin, project_id).await;
    let response = app.reject(&admin, project_id).await;

    assert_eq!(flash_message(&response), "Approved projects cannot be rejected.");
    let row = app.state.db.get_project(project_id).unwrap().unwrap();
    assert_eq!(row.status, "approved");
    assert_eq!(app.state.db.count_certificates_for_project(project_id).unwrap(), 1);
}

#[tokio::test]
async fn rejection_issues_no_certificate_until_approved() {
    let app = TestApp::new();
    let student = app.student("Ann", "ann@example.com", "R1").await;
    let admin = app.admin().await;
    let project_id = app.uploaded_project(&student, "Second Chance").await;

    let response = app.reject(&admin, project_id).await;
    let flash = flash(&response).unwrap();
    assert_eq!(flash.level, FlashLevel::Error);
    assert_eq!(flash.message, "Project \"Second Chance\" rejected.");
    assert!(app.state.db.get_certificate_for_project(project_id).unwrap().is_none());

    let response = app.get(&format!("/download-certificate/{project_id}"), Some(&student)).await;
    assert_eq!(location(&response), "/student/my-projects");
    assert_eq!(flash_message(&response), "Certificate not available.");

    // Rejected is not terminal
    app.approve(&admin, project_id).await;
    assert_eq!(app.state.db.count_certificates_for_project(project_id).unwrap(), 1);
}

#[tokio::test]
async fn reviewing_an_unknown_project_is_not_found() {
    let app = TestApp::new();
    let admin = app.admin().await;

    assert_eq!(app.approve(&admin, 999).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.reject(&admin, 999).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_review_ids_are_not_found() {
    let app = TestApp::new();
    let admin = app.admin().await;

    for id in ["abc", "1.5", "99999999999999999999"] {
        for action in ["approve", "reject"] {
            let response = app.post_form(&format!("/admin/{action}/{id}"), "", Some(&admin)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{action} {id}");
        }
    }
}

#[tokio::test]
async fn admin_dashboard_lists_pending_work() {
    let app = TestApp::new();
    let ann = app.student("Ann", "ann@example.com", "R1").await;
    let bob = app.student("Bob", "bob@example.com", "R2").await;
    let admin = app.admin().await;

    let approved = app.uploaded_project(&ann, "Done").await;
    app.uploaded_project(&ann, "Waiting A").await;
    app.uploaded_project(&bob, "Waiting B").await;
    app.approve(&admin, approved).await;

    let json = body_json(app.get("/admin/dashboard", Some(&admin)).await).await;
    assert_eq!(json["total_students"], 2);
    assert_eq!(json["total_projects"], 3);
    assert_eq!(json["approved_projects"], 1);

    let pending = json["pending_projects"].as_array().unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0]["name"], "Waiting B");
    assert!(pending.iter().all(|p| p["status"] == "pending"));
}

// ---------------------------------------------------------------------------
// Certificate download
// ---------------------------------------------------------------------------

#[tokio::test]
async fn owner_downloads_a_png_attachment() {
    let app = TestApp::new();
    let student = app.student("Ann", "ann@example.com", "R1").await;
    let admin = app.admin().await;
    let project_id = app.uploaded_project(&student, "Tiny Compiler").await;
    app.approve(&admin, project_id).await;

    let response = app.get(&format!("/download-certificate/{project_id}"), Some(&student)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"certificate_Tiny_Compiler.png\""
    );

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(PNG_MAGIC));
}

#[tokio::test]
async fn admin_may_download_any_certificate() {
    let app = TestApp::new();
    let student = app.student("Ann", "ann@example.com", "R1").await;
    let admin = app.admin().await;
    let project_id = app.uploaded_project(&student, "Tiny Compiler").await;
    app.approve(&admin, project_id).await;

    let response = app.get(&format!("/download-certificate/{project_id}"), Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.starts_with(PNG_MAGIC));
}

#[tokio::test]
async fn other_students_are_denied() {
    let app = TestApp::new();
    let ann = app.student("Ann", "ann@example.com", "R1").await;
    let bob = app.student("Bob", "bob@example.com", "R2").await;
    let admin = app.admin().await;
    let project_id = app.uploaded_project(&ann, "Mine").await;
    app.approve(&admin, project_id).await;

    let response = app.get(&format!("/download-certificate/{project_id}"), Some(&bob)).await;
    assert_eq!(location(&response), "/student/dashboard");
    assert_eq!(flash_message(&response), "Access denied.");
}

#[tokio::test]
async fn pending_project_has_no_certificate_for_admin_either() {
    let app = TestApp::new();
    let student = app.student("Ann", "ann@example.com", "R1").await;
    let admin = app.admin().await;
    let project_id = app.uploaded_project(&student, "Pending").await;

    let response = app.get(&format!("/download-certificate/{project_id}"), Some(&admin)).await;
    assert_eq!(location(&response), "/admin/dashboard");
    assert_eq!(flash_message(&response), "Certificate not available.");
}

#[tokio::test]
async fn unknown_project_certificate_is_not_found() {
    let app = TestApp::new();
    let student = app.student("Ann", "ann@example.com", "R1").await;

    let response = app.get("/download-certificate/404", Some(&student)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_certificate_id_is_not_found() {
    let app = TestApp::new();
    let student = app.student("Ann", "ann@example.com", "R1").await;

    for id in ["abc", "99999999999999999999"] {
        let response = app.get(&format!("/download-certificate/{id}"), Some(&student)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{id}");
    }
}
