//! # Notes
//!
//! An uploaded note and the files attached to it. Note payloads come from
//! several endpoints (`/notes/subject/:id`, `/notes/my-uploads`,
//! `/admin/notes`, `/admin/faculty/:id/uploads`) and the backend populates
//! different references on each, so every reference is normalized to a
//! [`NamedRef`] carrying the id and, when populated, the display name.

use serde::{Deserialize, Serialize};

use crate::identity::NoteId;
use crate::meta::Semester;
use crate::temporal::Timestamp;
use crate::wire::{lenient, lenient_vec, NumberShape, RefShape};

/// MIME type the portal opens in place instead of downloading.
pub const PDF_MIME: &str = "application/pdf";

/// Replace characters that are illegal in file names on common platforms.
///
/// Each run of `\ / : " * ? < > |` collapses to a single `_`.
pub fn sanitize_file_name(name: &str) -> String {
    const ILLEGAL: &[char] = &['\\', '/', ':', '"', '*', '?', '<', '>', '|'];
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if ILLEGAL.contains(&c) {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

// ─── References ──────────────────────────────────────────────────────

/// A normalized reference: bare id plus the display name when populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    /// Referenced document id.
    pub id: String,
    /// Display name, if the backend populated the reference.
    pub name: Option<String>,
}

impl NamedRef {
    fn from_shape(shape: &RefShape) -> Option<Self> {
        Some(Self {
            id: shape.id()?,
            name: shape.name().map(str::to_string),
        })
    }

    /// The name when known, otherwise the id.
    pub fn display(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

// ─── Files ───────────────────────────────────────────────────────────

/// One stored file belonging to a note.
///
/// The same descriptor comes back from the presign call (with an
/// `uploadUrl`) and is echoed verbatim to `/notes/save-notes`, so fields this
/// type does not model are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// File name as chosen by the uploader.
    #[serde(default)]
    pub original_name: String,
    /// Public URL of the stored object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// Storage key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Presigned PUT target, present only on presign responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,
    /// Unmodelled fields, preserved for round-tripping.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UploadedFile {
    /// Whether the file should be opened rather than downloaded.
    pub fn is_pdf(&self) -> bool {
        self.file_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(PDF_MIME))
    }
}

// ─── Uploader ────────────────────────────────────────────────────────

/// The faculty member who uploaded a note, as populated on admin views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uploader {
    /// Backend document id, when known.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Employee id.
    pub employee_id: Option<String>,
    /// Job title.
    pub designation: Option<String>,
    /// Number of notes this faculty member has uploaded.
    pub uploaded_notes: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUploader {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    id: Option<RefShape>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    employee_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    designation: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    uploaded_notes: Vec<serde_json::Value>,
}

impl Uploader {
    fn from_value(value: serde_json::Value) -> Option<Self> {
        if let Ok(shape) = serde_json::from_value::<RefShape>(value.clone()) {
            if !matches!(shape, RefShape::Embedded(_)) {
                return Some(Self {
                    id: shape.id(),
                    ..Self::default()
                });
            }
        }
        let raw: RawUploader = serde_json::from_value(value).ok()?;
        Some(Self {
            id: raw.id.and_then(|r| r.id()),
            name: raw.name,
            email: raw.email,
            employee_id: raw.employee_id,
            designation: raw.designation,
            uploaded_notes: raw.uploaded_notes.len(),
        })
    }

    /// `"name (designation)"`, or `"Unknown"` when the uploader was not
    /// populated.
    pub fn label(&self) -> String {
        match (&self.name, &self.designation) {
            (Some(name), Some(designation)) => format!("{name} ({designation})"),
            (Some(name), None) => name.clone(),
            _ => "Unknown".to_string(),
        }
    }
}

// ─── Note ────────────────────────────────────────────────────────────

/// A note in normalized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Note id.
    pub id: NoteId,
    /// Title shown in listings and used as the download file name prefix.
    pub title: String,
    /// Regulation the note is filed under.
    pub regulation: Option<NamedRef>,
    /// Branch the note is filed under.
    pub branch: Option<NamedRef>,
    /// Subject the note is filed under.
    pub subject: Option<NamedRef>,
    /// Semester the note is filed under.
    pub semester: Option<Semester>,
    /// Uploader, populated on some views.
    pub uploaded_by: Option<Uploader>,
    /// Primary file URL.
    pub file_url: Option<String>,
    /// Primary file MIME type.
    pub mime_type: Option<String>,
    /// Attached files.
    pub uploaded_files: Vec<UploadedFile>,
    /// Creation time.
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNote {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    id: Option<RefShape>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    regulation: Option<RefShape>,
    #[serde(default, deserialize_with = "lenient")]
    branch: Option<RefShape>,
    #[serde(default, deserialize_with = "lenient")]
    subject: Option<RefShape>,
    #[serde(default, deserialize_with = "lenient")]
    semester: Option<NumberShape>,
    #[serde(default)]
    uploaded_by: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient")]
    file_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    mime_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    uploaded_files: Vec<UploadedFile>,
    #[serde(default, deserialize_with = "lenient")]
    created_at: Option<String>,
}

impl Note {
    /// Normalize one note from its JSON payload. Notes without an id are
    /// dropped.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        let raw: RawNote = serde_json::from_value(value).ok()?;
        let id = raw.id.and_then(|r| r.id()).and_then(|s| NoteId::new(s).ok())?;
        Some(Self {
            id,
            title: raw.title.unwrap_or_default(),
            regulation: raw.regulation.as_ref().and_then(NamedRef::from_shape),
            branch: raw.branch.as_ref().and_then(NamedRef::from_shape),
            subject: raw.subject.as_ref().and_then(NamedRef::from_shape),
            semester: raw.semester.as_ref().and_then(Semester::from_shape),
            uploaded_by: raw.uploaded_by.and_then(Uploader::from_value),
            file_url: raw.file_url,
            mime_type: raw.mime_type,
            uploaded_files: raw.uploaded_files,
            created_at: raw.created_at.and_then(|s| Timestamp::parse(&s).ok()),
        })
    }

    /// Normalize a JSON array of notes. Anything but an array is empty.
    pub fn list_from_value(value: serde_json::Value) -> Vec<Self> {
        let serde_json::Value::Array(items) = value else {
            return Vec::new();
        };
        let total = items.len();
        let notes: Vec<Self> = items.into_iter().filter_map(Self::from_value).collect();
        if notes.len() < total {
            tracing::debug!(dropped = total - notes.len(), "notes without a usable id were dropped");
        }
        notes
    }

    /// Whether the primary file is a PDF.
    pub fn is_pdf(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(PDF_MIME))
    }

    /// Download file name for one attached file: `"{title}_{clean name}"`.
    pub fn download_name(&self, file: &UploadedFile) -> String {
        format!("{}_{}", self.title, sanitize_file_name(&file.original_name))
    }

    /// Every downloadable URL on the note: the primary file first, then each
    /// attached file not already listed.
    pub fn file_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = Vec::new();
        let attached = self.uploaded_files.iter().filter_map(|f| f.file_url.as_deref());
        for url in self.file_url.as_deref().into_iter().chain(attached) {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    }

    /// Sort newest first. Notes without a timestamp go last, keeping their
    /// relative order.
    pub fn sort_newest_first(notes: &mut [Note]) {
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    /// The `n` newest notes.
    pub fn recent(mut notes: Vec<Note>, n: usize) -> Vec<Note> {
        Self::sort_newest_first(&mut notes);
        notes.truncate(n);
        notes
    }
}
