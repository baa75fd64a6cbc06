//! # Faculty Accounts
//!
//! The faculty record as listed by `/admin/faculty`, the add/edit form with
//! its client-side validation, and the request bodies the form produces.
//!
//! ## Validation
//!
//! - employee id, name, email and designation are required;
//! - on add, or whenever either password field is filled in, both password
//!   fields are required, must match and be at least six characters;
//! - email and employee id must not collide with another faculty member in
//!   the full (unfiltered) list. The record being edited is excluded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::FacultyId;
use crate::wire::{lenient, lenient_vec, RefShape};

/// Minimum password length accepted by the form.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A faculty member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    /// Backend document id.
    pub id: FacultyId,
    /// Employee id, used as the login id.
    pub employee_id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Job title.
    pub designation: String,
    /// Ids of the notes this faculty member uploaded.
    pub uploaded_notes: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFaculty {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    id: Option<RefShape>,
    #[serde(default, deserialize_with = "lenient")]
    employee_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    designation: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    uploaded_notes: Vec<RefShape>,
}

impl Faculty {
    /// Normalize one faculty record. Records without an id are dropped.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        let raw: RawFaculty = serde_json::from_value(value).ok()?;
        let id = raw.id.and_then(|r| r.id()).and_then(|s| FacultyId::new(s).ok())?;
        Some(Self {
            id,
            employee_id: raw.employee_id.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            email: raw.email.unwrap_or_default(),
            designation: raw.designation.unwrap_or_default(),
            uploaded_notes: raw.uploaded_notes.iter().filter_map(RefShape::id).collect(),
        })
    }

    /// Normalize a JSON array of faculty records.
    pub fn list_from_value(value: serde_json::Value) -> Vec<Self> {
        match value {
            serde_json::Value::Array(items) => items.into_iter().filter_map(Self::from_value).collect(),
            _ => Vec::new(),
        }
    }
}

/// Case-insensitive substring search on names. A blank query returns the
/// whole list.
pub fn search_by_name<'a>(faculty: &'a [Faculty], query: &str) -> Vec<&'a Faculty> {
    let query = query.trim().to_lowercase();
    faculty
        .iter()
        .filter(|f| query.is_empty() || f.name.to_lowercase().contains(&query))
        .collect()
}

// ─── Form ────────────────────────────────────────────────────────────

/// A field of the faculty form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    /// Employee id.
    EmployeeId,
    /// Name.
    Name,
    /// Email.
    Email,
    /// Designation.
    Designation,
    /// Password.
    Password,
    /// Password confirmation.
    ConfirmPassword,
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::EmployeeId => "employeeId",
            Self::Name => "name",
            Self::Email => "email",
            Self::Designation => "designation",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
        };
        f.write_str(s)
    }
}

/// Per-field validation messages. At most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    fn set(&mut self, field: FormField, message: &str) {
        self.0.insert(field, message.to_string());
    }

    /// Message for one field.
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether validation passed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All messages, in field order.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Whether the form creates a new record or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// Create a faculty member.
    Add,
    /// Edit the faculty member with this id.
    Edit(FacultyId),
}

/// Raw form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacultyForm {
    /// Employee id.
    pub employee_id: String,
    /// Name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Designation.
    pub designation: String,
    /// Password; may be left empty when editing.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
}

/// `POST /admin/faculty` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFaculty {
    /// Employee id.
    pub employee_id: String,
    /// Name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Designation.
    pub designation: String,
    /// Initial password.
    pub password: String,
}

/// `PUT /admin/faculty/:id` body. The password is sent only when changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacultyUpdate {
    /// Name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Designation.
    pub designation: String,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl FacultyForm {
    /// Prefill the form for editing an existing record.
    pub fn from_faculty(faculty: &Faculty) -> Self {
        Self {
            employee_id: faculty.employee_id.clone(),
            name: faculty.name.clone(),
            email: faculty.email.clone(),
            designation: faculty.designation.clone(),
            ..Self::default()
        }
    }

    /// Validate against the full faculty list.
    pub fn validate(&self, mode: &FormMode, existing: &[Faculty]) -> FieldErrors {
        let mut errors = FieldErrors::default();

        if blank(&self.employee_id) {
            errors.set(FormField::EmployeeId, "Employee ID is required");
        }
        if blank(&self.name) {
            errors.set(FormField::Name, "Name is required");
        }
        if blank(&self.email) {
            errors.set(FormField::Email, "Email is required");
        }
        if blank(&self.designation) {
            errors.set(FormField::Designation, "Designation is required");
        }

        let wants_password =
            matches!(mode, FormMode::Add) || !self.password.is_empty() || !self.confirm_password.is_empty();
        if wants_password {
            if self.password.is_empty() {
                errors.set(FormField::Password, "Password is required");
            } else if self.password.chars().count() < MIN_PASSWORD_LEN {
                errors.set(FormField::Password, "Password must be at least 6 characters");
            }
            if self.confirm_password.is_empty() {
                errors.set(FormField::ConfirmPassword, "Confirm password is required");
            } else if !self.password.is_empty() && self.password != self.confirm_password {
                errors.set(FormField::ConfirmPassword, "Passwords do not match");
            }
        }

        let editing = match mode {
            FormMode::Add => None,
            FormMode::Edit(id) => Some(id),
        };
        let others = || existing.iter().filter(move |f| Some(&f.id) != editing);
        if !blank(&self.email) && others().any(|f| f.email == self.email.trim()) {
            errors.set(FormField::Email, "Email already exists");
        }
        if !blank(&self.employee_id) && others().any(|f| f.employee_id == self.employee_id.trim()) {
            errors.set(FormField::EmployeeId, "Employee ID already exists");
        }

        errors
    }

    /// Validate for creation and build the request body.
    ///
    /// # Errors
    ///
    /// Returns the field messages when validation fails.
    pub fn into_new_faculty(self, existing: &[Faculty]) -> Result<NewFaculty, FieldErrors> {
        let errors = self.validate(&FormMode::Add, existing);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NewFaculty {
            employee_id: self.employee_id.trim().to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            designation: self.designation.trim().to_string(),
            password: self.password,
        })
    }

    /// Validate an edit of `id` and build the request body.
    ///
    /// # Errors
    ///
    /// Returns the field messages when validation fails.
    pub fn into_update(self, id: &FacultyId, existing: &[Faculty]) -> Result<FacultyUpdate, FieldErrors> {
        let errors = self.validate(&FormMode::Edit(id.clone()), existing);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(FacultyUpdate {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            designation: self.designation.trim().to_string(),
            password: (!self.password.is_empty()).then_some(self.password),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roster() -> Vec<Faculty> {
        Faculty::list_from_value(json!([
            {"_id": "f1", "employeeId": "E1", "name": "Asha Rao", "email": "asha@x.edu", "designation": "Professor", "uploadedNotes": ["n1", {"_id": "n2"}]},
            {"_id": "f2", "employeeId": "E2", "name": "Ravi Kumar", "email": "ravi@x.edu", "designation": "Lecturer"}
        ]))
    }

    fn form() -> FacultyForm {
        FacultyForm {
            employee_id: "E3".into(),
            name: "Meera".into(),
            email: "meera@x.edu".into(),
            designation: "Lecturer".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        }
    }

    #[test]
    fn test_list_from_value() {
        let list = roster();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].uploaded_notes, vec!["n1", "n2"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let list = roster();
        let hits = search_by_name(&list, "  RAO ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].employee_id, "E1");
        assert_eq!(search_by_name(&list, "").len(), 2);
    }

    // ── Add ──────────────────────────────────────────────────────────

    #[test]
    fn test_valid_add() {
        let body = form().into_new_faculty(&roster()).unwrap();
        assert_eq!(body.employee_id, "E3");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["employeeId"], json!("E3"));
    }

    #[test]
    fn test_add_requires_everything() {
        let errors = FacultyForm::default().validate(&FormMode::Add, &[]);
        for field in [
            FormField::EmployeeId,
            FormField::Name,
            FormField::Email,
            FormField::Designation,
            FormField::Password,
            FormField::ConfirmPassword,
        ] {
            assert!(errors.get(field).is_some(), "{field} should be flagged");
        }
    }

    #[test]
    fn test_password_rules() {
        let mut f = form();
        f.password = "abc".into();
        f.confirm_password = "abc".into();
        let errors = f.validate(&FormMode::Add, &[]);
        assert_eq!(errors.get(FormField::Password), Some("Password must be at least 6 characters"));

        let mut f = form();
        f.confirm_password = "different".into();
        let errors = f.validate(&FormMode::Add, &[]);
        assert_eq!(errors.get(FormField::ConfirmPassword), Some("Passwords do not match"));
    }

    #[test]
    fn test_duplicates_flagged() {
        let mut f = form();
        f.email = "asha@x.edu".into();
        f.employee_id = "E2".into();
        let errors = f.validate(&FormMode::Add, &roster());
        assert_eq!(errors.get(FormField::Email), Some("Email already exists"));
        assert_eq!(errors.get(FormField::EmployeeId), Some("Employee ID already exists"));
    }

    // ── Edit ─────────────────────────────────────────────────────────

    #[test]
    fn test_edit_excludes_self_and_skips_password() {
        let list = roster();
        let f = FacultyForm::from_faculty(&list[0]);
        let update = f.into_update(&list[0].id, &list).unwrap();
        assert_eq!(update.password, None);
        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_edit_with_password_validates_it() {
        let list = roster();
        let mut f = FacultyForm::from_faculty(&list[1]);
        f.password = "newpass".into();
        let errors = f.clone().validate(&FormMode::Edit(list[1].id.clone()), &list);
        assert_eq!(errors.get(FormField::ConfirmPassword), Some("Confirm password is required"));

        f.confirm_password = "newpass".into();
        let update = f.into_update(&list[1].id, &list).unwrap();
        assert_eq!(update.password.as_deref(), Some("newpass"));
    }

    #[test]
    fn test_edit_colliding_with_other_record() {
        let list = roster();
        let mut f = FacultyForm::from_faculty(&list[1]);
        f.email = "asha@x.edu".into();
        let err = f.into_update(&list[1].id, &list).unwrap_err();
        assert_eq!(err.to_string(), "email: Email already exists");
    }
}
