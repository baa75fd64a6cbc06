//! # Domain Identity Newtypes
//!
//! Newtype wrappers for every backend identifier. The backend issues opaque
//! document ids (24-hex object ids in practice), so the newtypes hold a
//! trimmed, non-empty string and make no further assumptions about format.
//!
//! Comparison between identifiers is plain string equality. All
//! normalization (embedded `{ _id }` objects, `$oid` wrappers, numeric ids)
//! happens in [`crate::wire`] before a value ever becomes one of these types.

use serde::{Deserialize, Serialize};

use crate::error::KithabError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Construct from a raw string, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns [`KithabError::InvalidIdentifier`] if the trimmed value is empty.
            pub fn new(value: impl Into<String>) -> Result<Self, KithabError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(KithabError::InvalidIdentifier {
                        kind: $kind,
                        value,
                    });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Access the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = KithabError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a regulation (curriculum version).
    RegulationId,
    "regulation"
);

string_id!(
    /// Identifier of a branch (department/program) under a regulation.
    BranchId,
    "branch"
);

string_id!(
    /// Identifier of a subject (course) under a branch.
    SubjectId,
    "subject"
);

string_id!(
    /// Identifier of an uploaded note.
    NoteId,
    "note"
);

string_id!(
    /// Backend document id of a faculty account (not the employee id).
    FacultyId,
    "faculty"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_whitespace() {
        let id = RegulationId::new("  r1 ").unwrap();
        assert_eq!(id.as_str(), "r1");
        assert_eq!(id.to_string(), "r1");
    }

    #[test]
    fn test_new_rejects_blank() {
        let err = BranchId::new("   ").unwrap_err();
        assert!(matches!(
            err,
            KithabError::InvalidIdentifier { kind: "branch", .. }
        ));
    }

    #[test]
    fn test_serde_is_transparent_string() {
        let id = SubjectId::new("s-42").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"s-42\"");
        let parsed: SubjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_deserialize_rejects_empty_string() {
        let result: Result<NoteId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
