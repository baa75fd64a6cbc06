//! End-to-end command flows against a mock backend, with the session kept in
//! a temporary file.

use std::path::Path;

use kithab_cli::account::{run_login, run_logout, LoginArgs};
use kithab_cli::upload::{run_uploads, UploadsArgs, UploadsCommand};
use kithab_cli::{AppContext, CliConfig};
use kithab_core::Role;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, session_file: &Path) -> CliConfig {
    CliConfig {
        backend_url: server.uri(),
        admin_id: Some("ADMIN01".into()),
        timeout_secs: 5,
        session_file: Some(session_file.to_path_buf()),
    }
}

fn live_token() -> String {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 3600;
    kithab_session::token::unsigned(&json!({ "exp": exp }))
        .expose()
        .to_string()
}

async fn mount_faculty_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/faculty/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": live_token(),
            "faculty": { "_id": "f1", "name": "Dr. Rao", "employeeId": "E100" }
        })))
        .mount(server)
        .await;
}

fn login_args() -> LoginArgs {
    LoginArgs {
        id: "E100".into(),
        password: Some("secret".into()),
    }
}

#[tokio::test]
async fn login_persists_and_next_invocation_resumes() {
    let server = MockServer::start().await;
    mount_faculty_login(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    let ctx = AppContext::open(config(&server, &session_file), false).unwrap();
    assert_eq!(run_login(&login_args(), &ctx).await.unwrap(), 0);
    assert!(session_file.exists());

    // A fresh context reads the same file.
    let again = AppContext::open(config(&server, &session_file), false).unwrap();
    let (_client, account) = again.require(Role::Faculty).unwrap();
    assert_eq!(account.name, "Dr. Rao");

    let err = again.require(Role::Admin).unwrap_err().to_string();
    assert!(err.contains("requires the admin role"), "{err}");

    run_logout(&again).unwrap();
    assert!(!session_file.exists());
}

#[tokio::test]
async fn unauthorized_response_ends_the_session() {
    let server = MockServer::start().await;
    mount_faculty_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/notes/my-uploads"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token revoked" })))
        .mount(&server)
        .await;
    for meta in ["/meta/regulations", "/meta/branches", "/meta/subjects"] {
        Mock::given(method("GET"))
            .and(path(meta))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
    }
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    let ctx = AppContext::open(config(&server, &session_file), false).unwrap();
    run_login(&login_args(), &ctx).await.unwrap();

    let args = UploadsArgs {
        command: UploadsCommand::List(Default::default()),
    };
    let err = run_uploads(&args, &ctx).await.unwrap_err().to_string();
    assert!(err.starts_with("Token revoked"), "{err}");
    assert!(!ctx.session().is_authenticated());
    assert!(!session_file.exists());
}

#[tokio::test]
async fn commands_need_a_login() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = AppContext::open(config(&server, &dir.path().join("none.json")), false).unwrap();

    let args = UploadsArgs {
        command: UploadsCommand::Delete { id: "n1".into() },
    };
    let err = run_uploads(&args, &ctx).await.unwrap_err().to_string();
    assert!(err.starts_with("not logged in"), "{err}");
}
