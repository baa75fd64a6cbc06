//! Note endpoints: browsing by subject, the faculty upload flow and the
//! faculty's own uploads.
//!
//! ## Upload Flow
//!
//! 1. Size check against [`MAX_UPLOAD_BYTES`], before any network call.
//! 2. `POST /notes/upload` with the file's name and type. The backend answers
//!    with a presigned descriptor per file.
//! 3. `PUT` the raw bytes to the descriptor's `uploadUrl`. This goes straight
//!    to storage and carries no bearer.
//! 4. `POST /notes/save-notes` with the selection and the descriptor echoed
//!    back unchanged.
//! 5. Refetch `/notes/my-uploads` for the recent-uploads panel.

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use kithab_core::{BranchId, Note, NoteId, RegulationId, Semester, SubjectId, UploadedFile};

use crate::client::KithabClient;
use crate::error::ApiError;

/// Largest file accepted for upload.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Message for files over [`MAX_UPLOAD_BYTES`].
pub const FILE_TOO_LARGE: &str = "File size exceeds 50MB, try after compressing file";

/// How many uploads the recent panel shows.
pub const RECENT_UPLOADS: usize = 5;

/// Where a note is filed. Every level is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTarget {
    /// Regulation.
    pub regulation: RegulationId,
    /// Branch.
    pub branch: BranchId,
    /// Semester.
    pub semester: Semester,
    /// Subject.
    pub subject: SubjectId,
}

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFile {
    /// File name.
    pub name: String,
    /// MIME type sent to storage.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl NoteFile {
    /// Size in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the file is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of a completed upload.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// The descriptor that was saved.
    pub file: UploadedFile,
    /// The newest uploads after saving, at most [`RECENT_UPLOADS`].
    pub recent: Vec<Note>,
}

/// Presign request entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    /// File name.
    pub original_name: String,
    /// MIME type.
    pub file_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignRequest<'a> {
    files_meta: &'a [FileMeta],
}

#[derive(Debug, Deserialize)]
struct PresignResponse {
    #[serde(default)]
    files: Vec<UploadedFile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveNotesRequest<'a> {
    regulation: &'a str,
    branch: &'a str,
    // Sent as a string, the way the backend stores it from the form.
    semester: String,
    subject: &'a str,
    uploaded_files: &'a [UploadedFile],
}

#[derive(Debug, Deserialize)]
struct NotesEnvelope {
    #[serde(default)]
    notes: serde_json::Value,
}

/// `/notes/*` endpoints.
#[derive(Debug)]
pub struct NotesClient<'a> {
    client: &'a KithabClient,
}

impl<'a> NotesClient<'a> {
    pub(crate) fn new(client: &'a KithabClient) -> Self {
        Self { client }
    }

    /// `GET /notes/subject/:id`. Public.
    pub async fn by_subject(&self, subject: &SubjectId) -> Result<Vec<Note>, ApiError> {
        let path = format!("notes/subject/{}", subject.as_str());
        let env: Option<NotesEnvelope> = self
            .client
            .send_json(self.client.request(Method::GET, &path)?, &path)
            .await?;
        Ok(env.map(|e| Note::list_from_value(e.notes)).unwrap_or_default())
    }

    /// `GET /notes/my-uploads`, newest first.
    pub async fn my_uploads(&self) -> Result<Vec<Note>, ApiError> {
        let path = "notes/my-uploads";
        let value: serde_json::Value = self
            .client
            .send_json(self.client.authed(Method::GET, path)?, path)
            .await?;
        let mut notes = Note::list_from_value(value);
        Note::sort_newest_first(&mut notes);
        Ok(notes)
    }

    /// `POST /notes/upload`: one presigned descriptor per entry.
    pub async fn request_upload(&self, files: &[FileMeta]) -> Result<Vec<UploadedFile>, ApiError> {
        let path = "notes/upload";
        let request = self
            .client
            .authed(Method::POST, path)?
            .json(&PresignRequest { files_meta: files });
        let resp: PresignResponse = self.client.send_json(request, path).await?;
        Ok(resp.files)
    }

    /// `PUT` bytes to a presigned storage URL.
    pub async fn put_file(&self, upload_url: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), ApiError> {
        let request = self
            .client
            .external(Method::PUT, upload_url)?
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        self.client.send(request, "storage upload").await?;
        Ok(())
    }

    /// Fetch a stored file by its public URL. No bearer is sent.
    pub async fn fetch_file(&self, file_url: &str) -> Result<Vec<u8>, ApiError> {
        let resp = self
            .client
            .send(self.client.external(Method::GET, file_url)?, "file download")
            .await?;
        let bytes = resp.bytes().await.map_err(|source| ApiError::Http {
            endpoint: "file download".into(),
            source,
        })?;
        Ok(bytes.to_vec())
    }

    /// `POST /notes/save-notes`.
    pub async fn save_notes(&self, target: &NoteTarget, files: &[UploadedFile]) -> Result<(), ApiError> {
        let path = "notes/save-notes";
        let body = SaveNotesRequest {
            regulation: target.regulation.as_str(),
            branch: target.branch.as_str(),
            semester: target.semester.to_string(),
            subject: target.subject.as_str(),
            uploaded_files: files,
        };
        let request = self.client.authed(Method::POST, path)?.json(&body);
        self.client.send(request, path).await?;
        Ok(())
    }

    /// `DELETE /notes/:id`.
    pub async fn delete(&self, id: &NoteId) -> Result<(), ApiError> {
        let path = format!("notes/{}", id.as_str());
        self.client
            .send(self.client.authed(Method::DELETE, &path)?, &path)
            .await?;
        tracing::info!(note = %id, "note deleted");
        Ok(())
    }

    /// Run the whole upload flow for one file.
    ///
    /// # Errors
    ///
    /// Files over [`MAX_UPLOAD_BYTES`] are rejected with [`FILE_TOO_LARGE`]
    /// before any request is made. A presign response with no descriptor or
    /// no `uploadUrl` is a [`ApiError::MissingField`].
    pub async fn upload_note(&self, target: &NoteTarget, file: NoteFile) -> Result<UploadReceipt, ApiError> {
        if file.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::Rejected(FILE_TOO_LARGE.into()));
        }
        if !self.client.has_token() {
            return Err(ApiError::NotAuthenticated);
        }

        let meta = [FileMeta {
            original_name: file.name.clone(),
            file_type: file.content_type.clone(),
        }];
        let descriptor = self
            .request_upload(&meta)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::MissingField {
                endpoint: "notes/upload".into(),
                field: "files",
            })?;
        let upload_url = descriptor
            .upload_url
            .clone()
            .ok_or_else(|| ApiError::MissingField {
                endpoint: "notes/upload".into(),
                field: "uploadUrl",
            })?;

        tracing::debug!(file = %file.name, bytes = file.len(), "uploading to storage");
        self.put_file(&upload_url, &file.content_type, file.bytes).await?;
        self.save_notes(target, std::slice::from_ref(&descriptor)).await?;
        tracing::info!(file = %file.name, subject = %target.subject, "note uploaded");

        let recent = Note::recent(self.my_uploads().await?, RECENT_UPLOADS);
        Ok(UploadReceipt {
            file: descriptor,
            recent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> NoteTarget {
        NoteTarget {
            regulation: RegulationId::new("r1").unwrap(),
            branch: BranchId::new("b1").unwrap(),
            semester: Semester::new(3).unwrap(),
            subject: SubjectId::new("s1").unwrap(),
        }
    }

    #[test]
    fn test_save_notes_body_sends_semester_as_string() {
        let t = target();
        let files = vec![UploadedFile {
            original_name: "unit1.pdf".into(),
            key: Some("k/unit1.pdf".into()),
            ..Default::default()
        }];
        let body = SaveNotesRequest {
            regulation: t.regulation.as_str(),
            branch: t.branch.as_str(),
            semester: t.semester.to_string(),
            subject: t.subject.as_str(),
            uploaded_files: &files,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["semester"], "3");
        assert_eq!(json["uploadedFiles"][0]["originalName"], "unit1.pdf");
        assert_eq!(json["uploadedFiles"][0]["key"], "k/unit1.pdf");
    }

    #[test]
    fn test_presign_body_shape() {
        let meta = [FileMeta {
            original_name: "a.pdf".into(),
            file_type: "application/pdf".into(),
        }];
        let json = serde_json::to_value(PresignRequest { files_meta: &meta }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "filesMeta": [{ "originalName": "a.pdf", "fileType": "application/pdf" }] })
        );
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_before_network() {
        // Port 9 is never contacted: the size check comes first.
        let client = KithabClient::new(crate::ApiConfig::new("http://127.0.0.1:9").unwrap())
            .unwrap()
            .authorized(kithab_core::AuthToken::new("t"));
        let file = NoteFile {
            name: "big.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: vec![0; (MAX_UPLOAD_BYTES + 1) as usize],
        };
        let err = client.notes().upload_note(&target(), file).await.unwrap_err();
        assert_eq!(err.to_string(), FILE_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_upload_requires_token() {
        let client = KithabClient::new(crate::ApiConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        let file = NoteFile {
            name: "a.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: vec![1, 2, 3],
        };
        let err = client.notes().upload_note(&target(), file).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }
}
