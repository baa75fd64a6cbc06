//! Admin management endpoints: notes by full selection and faculty accounts.

use reqwest::Method;
use serde::Deserialize;

use kithab_core::{Faculty, FacultyId, FacultyUpdate, NewFaculty, Note, NoteId};

use crate::client::KithabClient;
use crate::error::ApiError;
use crate::notes::NoteTarget;

#[derive(Debug, Deserialize)]
struct FileUrlResponse {
    #[serde(default)]
    url: Option<String>,
}

/// `/admin/notes*` and `/admin/faculty*` endpoints. Every call needs a token.
#[derive(Debug)]
pub struct AdminClient<'a> {
    client: &'a KithabClient,
}

impl<'a> AdminClient<'a> {
    pub(crate) fn new(client: &'a KithabClient) -> Self {
        Self { client }
    }

    // ─── Notes ───────────────────────────────────────────────────────

    /// `GET /admin/notes?regulation&branch&semester&subject`.
    pub async fn notes(&self, target: &NoteTarget) -> Result<Vec<Note>, ApiError> {
        let path = "admin/notes";
        let semester = target.semester.to_string();
        let request = self.client.authed(Method::GET, path)?.query(&[
            ("regulation", target.regulation.as_str()),
            ("branch", target.branch.as_str()),
            ("semester", semester.as_str()),
            ("subject", target.subject.as_str()),
        ]);
        let value: serde_json::Value = self.client.send_json(request, path).await?;
        Ok(Note::list_from_value(value))
    }

    /// `GET /admin/notes/:id/file`. `None` when the backend has no file.
    pub async fn note_file_url(&self, id: &NoteId) -> Result<Option<String>, ApiError> {
        let path = format!("admin/notes/{}/file", id.as_str());
        let resp: Option<FileUrlResponse> = self
            .client
            .send_json(self.client.authed(Method::GET, &path)?, &path)
            .await?;
        Ok(resp
            .and_then(|r| r.url)
            .filter(|url| !url.trim().is_empty()))
    }

    /// `DELETE /admin/notes/:id`.
    pub async fn delete_note(&self, id: &NoteId) -> Result<(), ApiError> {
        let path = format!("admin/notes/{}", id.as_str());
        self.client
            .send(self.client.authed(Method::DELETE, &path)?, &path)
            .await?;
        tracing::info!(note = %id, "note deleted by admin");
        Ok(())
    }

    // ─── Faculty ─────────────────────────────────────────────────────

    /// `GET /admin/faculty`.
    pub async fn faculty(&self) -> Result<Vec<Faculty>, ApiError> {
        let path = "admin/faculty";
        let value: serde_json::Value = self
            .client
            .send_json(self.client.authed(Method::GET, path)?, path)
            .await?;
        Ok(Faculty::list_from_value(value))
    }

    /// `POST /admin/faculty`.
    pub async fn create_faculty(&self, faculty: &NewFaculty) -> Result<(), ApiError> {
        let path = "admin/faculty";
        let request = self.client.authed(Method::POST, path)?.json(faculty);
        self.client.send(request, path).await?;
        tracing::info!(employee_id = %faculty.employee_id, "faculty created");
        Ok(())
    }

    /// `PUT /admin/faculty/:id`. The password is sent only when set.
    pub async fn update_faculty(&self, id: &FacultyId, update: &FacultyUpdate) -> Result<(), ApiError> {
        let path = format!("admin/faculty/{}", id.as_str());
        let request = self.client.authed(Method::PUT, &path)?.json(update);
        self.client.send(request, &path).await?;
        tracing::info!(faculty = %id, "faculty updated");
        Ok(())
    }

    /// `DELETE /admin/faculty/:id`.
    pub async fn delete_faculty(&self, id: &FacultyId) -> Result<(), ApiError> {
        let path = format!("admin/faculty/{}", id.as_str());
        self.client
            .send(self.client.authed(Method::DELETE, &path)?, &path)
            .await?;
        tracing::info!(faculty = %id, "faculty deleted");
        Ok(())
    }

    /// `GET /admin/faculty/:id/uploads`.
    pub async fn faculty_uploads(&self, id: &FacultyId) -> Result<Vec<Note>, ApiError> {
        let path = format!("admin/faculty/{}/uploads", id.as_str());
        let value: serde_json::Value = self
            .client
            .send_json(self.client.authed(Method::GET, &path)?, &path)
            .await?;
        Ok(Note::list_from_value(value))
    }
}
