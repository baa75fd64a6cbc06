//! Contract tests for the admin notes and faculty endpoints.

use kithab_client::{ApiConfig, ApiError, KithabClient, NoteTarget};
use kithab_core::{
    AuthToken, BranchId, FacultyForm, FacultyId, FormMode, NoteId, RegulationId, Semester,
    SubjectId,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn admin_client(server: &MockServer) -> KithabClient {
    KithabClient::new(ApiConfig::new(&server.uri()).unwrap())
        .unwrap()
        .authorized(AuthToken::new("admin-token"))
}

// ── GET /admin/notes ─────────────────────────────────────────────────

#[tokio::test]
async fn notes_query_carries_full_selection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/notes"))
        .and(query_param("regulation", "r1"))
        .and(query_param("branch", "b1"))
        .and(query_param("semester", "2"))
        .and(query_param("subject", "s1"))
        .and(header("Authorization", "Bearer admin-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "_id": "n1",
            "title": "Unit 1",
            "uploadedBy": {
                "_id": "f1",
                "name": "Dr. Rao",
                "email": "rao@example.edu",
                "employeeId": "E100",
                "designation": "Professor",
                "uploadedNotes": ["n1", "n2", "n3"]
            }
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let target = NoteTarget {
        regulation: RegulationId::new("r1").unwrap(),
        branch: BranchId::new("b1").unwrap(),
        semester: Semester::new(2).unwrap(),
        subject: SubjectId::new("s1").unwrap(),
    };
    let notes = admin_client(&server).admin().notes(&target).await.unwrap();
    assert_eq!(notes.len(), 1);
    let uploader = notes[0].uploaded_by.as_ref().unwrap();
    assert_eq!(uploader.label(), "Dr. Rao (Professor)");
    assert_eq!(uploader.uploaded_notes, 3);
}

#[tokio::test]
async fn note_file_url_resolves() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/notes/n1/file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "url": "https://cdn.example.edu/n1.pdf" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/notes/n2/file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = admin_client(&server);
    let url = client.admin().note_file_url(&NoteId::new("n1").unwrap()).await.unwrap();
    assert_eq!(url.as_deref(), Some("https://cdn.example.edu/n1.pdf"));
    let none = client.admin().note_file_url(&NoteId::new("n2").unwrap()).await.unwrap();
    assert_eq!(none, None);
}

#[tokio::test]
async fn delete_note_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/admin/notes/n1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = admin_client(&server)
        .admin()
        .delete_note(&NoteId::new("n1").unwrap())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "request failed: 401 Unauthorized");
}

// ── /admin/faculty ───────────────────────────────────────────────────

#[tokio::test]
async fn faculty_list_and_create() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/faculty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "f1", "employeeId": "E100", "name": "Dr. Rao", "email": "rao@example.edu", "designation": "Professor", "uploadedNotes": [] }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/faculty"))
        .and(body_json(json!({
            "employeeId": "E200",
            "name": "Ms. Iyer",
            "email": "iyer@example.edu",
            "designation": "Lecturer",
            "password": "secret1"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = admin_client(&server);
    let existing = client.admin().faculty().await.unwrap();
    assert_eq!(existing.len(), 1);

    let form = FacultyForm {
        employee_id: "E200".into(),
        name: "Ms. Iyer".into(),
        email: "iyer@example.edu".into(),
        designation: "Lecturer".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
    };
    assert!(form.validate(&FormMode::Add, &existing).is_empty());
    let new = form.into_new_faculty(&existing).unwrap();
    client.admin().create_faculty(&new).await.unwrap();
}

#[tokio::test]
async fn update_without_password_omits_it() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/faculty/f1"))
        .and(body_json(json!({
            "name": "Dr. Rao",
            "email": "rao@example.edu",
            "designation": "Head of Department"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let id = FacultyId::new("f1").unwrap();
    let form = FacultyForm {
        employee_id: "E100".into(),
        name: "Dr. Rao".into(),
        email: "rao@example.edu".into(),
        designation: "Head of Department".into(),
        password: String::new(),
        confirm_password: String::new(),
    };
    let update = form.into_update(&id, &[]).unwrap();
    admin_client(&server).admin().update_faculty(&id, &update).await.unwrap();
}

#[tokio::test]
async fn delete_faculty_and_list_uploads() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/admin/faculty/f1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/faculty/f2/uploads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "n1", "title": "Unit 1" },
            { "_id": "n2", "title": "Unit 2" }
        ])))
        .mount(&server)
        .await;

    let client = admin_client(&server);
    client.admin().delete_faculty(&FacultyId::new("f1").unwrap()).await.unwrap();
    let uploads = client
        .admin()
        .faculty_uploads(&FacultyId::new("f2").unwrap())
        .await
        .unwrap();
    assert_eq!(uploads.len(), 2);
}

#[tokio::test]
async fn admin_calls_need_a_token() {
    let server = MockServer::start().await;
    let client = KithabClient::new(ApiConfig::new(&server.uri()).unwrap()).unwrap();
    let err = client.admin().faculty().await.unwrap_err();
    assert!(matches!(err, ApiError::NotAuthenticated));
}
