#![deny(missing_docs)]

//! # kithab-core — Foundational Types for the Kithab Notes Portal
//!
//! Every other crate in the workspace depends on `kithab-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype identifiers.** `RegulationId`, `BranchId`, `SubjectId`,
//!    `NoteId`, `FacultyId` are distinct types. A branch id cannot be passed
//!    where a subject id is expected.
//!
//! 2. **Normalize at the boundary.** The backend hands out foreign keys either
//!    as a bare id or as an embedded `{ _id }` object, and semesters as
//!    integers, numeric strings or `{ $numberInt }` wrappers. The [`wire`]
//!    module absorbs all of that once, at ingestion. Domain types in [`meta`]
//!    and [`note`] only ever hold bare identifiers and a canonical
//!    [`Semester`].
//!
//! 3. **Immutable metadata snapshots.** A [`MetadataSnapshot`] is built once
//!    per screen and never mutated locally; a refetch builds a new one.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `kithab-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod account;
pub mod error;
pub mod faculty;
pub mod identity;
pub mod meta;
pub mod note;
pub mod temporal;
pub mod wire;

// Re-export primary types for ergonomic imports.
pub use account::{Account, AuthToken, Credentials, LoginGrant, Role};
pub use error::KithabError;
pub use faculty::{
    search_by_name, Faculty, FacultyForm, FacultyUpdate, FieldErrors, FormField, FormMode,
    NewFaculty,
};
pub use identity::{BranchId, FacultyId, NoteId, RegulationId, SubjectId};
pub use meta::{Branch, MetadataSnapshot, Regulation, Semester, Subject};
pub use note::{sanitize_file_name, NamedRef, Note, UploadedFile, Uploader};
pub use temporal::Timestamp;
