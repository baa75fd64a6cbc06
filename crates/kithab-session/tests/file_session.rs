//! Session lifecycle against the on-disk store, the way the CLI uses it:
//! one process logs in, a later process restores.

use std::time::Duration;

use chrono::Utc;
use kithab_core::{Account, LoginGrant, Role};
use kithab_session::token;
use kithab_session::{FileStore, LogoutReason, Session, SessionState, SessionStore};
use serde_json::json;

fn grant(expires_in_ms: i64) -> LoginGrant {
    let exp = (Utc::now().timestamp_millis() + expires_in_ms) as f64 / 1000.0;
    LoginGrant {
        token: token::unsigned(&json!({"exp": exp, "id": "a1", "role": "admin"})),
        account: Account {
            id: Some("a1".into()),
            name: "Admin".into(),
            role: Role::Admin,
            email: None,
            employee_id: None,
            designation: None,
        },
    }
}

#[tokio::test]
async fn login_survives_into_next_process() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let first = Session::new(FileStore::new(&path));
    first.establish(grant(60_000)).unwrap();
    drop(first);

    let second = Session::new(FileStore::new(&path));
    let account = second.restore().unwrap().unwrap();
    assert_eq!(account.role, Role::Admin);
    assert!(second.token().is_some());
}

#[tokio::test]
async fn expiry_removes_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let session = Session::new(FileStore::new(&path));

    session.establish(grant(5)).unwrap();
    assert!(path.exists());

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(!path.exists());
}

#[tokio::test]
async fn corrupt_file_is_discarded_on_restore() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "][").unwrap();

    let session = Session::new(FileStore::new(&path));
    let reasons = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = reasons.clone();
    session.on_logout(move |r| sink.lock().push(r));

    assert!(session.restore().unwrap().is_none());
    assert!(session.store().load().unwrap().is_none());
    assert_eq!(*reasons.lock(), vec![LogoutReason::InvalidToken]);
}

#[tokio::test]
async fn unauthorized_logout_clears_everything() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::new(FileStore::new(dir.path().join("s.json")));
    session.establish(grant(60_000)).unwrap();

    session.logout_with(LogoutReason::Unauthorized);
    assert!(session.account().is_none());
    assert!(session.store().load().unwrap().is_none());
}
