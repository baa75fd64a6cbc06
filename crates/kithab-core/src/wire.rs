//! # Wire Shapes and Normalization
//!
//! The portal backend is loose about field shapes. The same logical foreign
//! key shows up as any of:
//!
//! ```text
//! "regulation": "66a1f0..."                    bare id
//! "regulation": { "_id": "66a1f0...", ... }    populated document
//! "regulation": { "$oid": "66a1f0..." }        extended JSON object id
//! ```
//!
//! and a semester as `2`, `"2"`, `2.0` or `{ "$numberInt": "2" }`.
//!
//! This module models those shapes as untagged enums ([`RefShape`],
//! [`NumberShape`]) and reduces them to a bare identifier or a plain integer.
//! Raw record fields are deserialized *leniently*: a field whose shape matches
//! none of the variants becomes `None` instead of failing the whole payload.
//! Malformed keys are therefore recovered locally and never propagate as
//! errors.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a field as `Some(T)` when it fits `T`, `None` otherwise.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Deserialize a list field, treating anything but an array as empty and
/// dropping elements that do not fit `T`.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    serde_json::Value::deserialize(deserializer).map(records)
}

/// Decode a bare JSON array of records, dropping elements that do not fit
/// `T`. Anything but an array yields an empty list.
pub fn records<T: DeserializeOwned>(value: serde_json::Value) -> Vec<T> {
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ─── Reference shapes ────────────────────────────────────────────────

/// Any of the shapes a document reference arrives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefShape {
    /// Bare string id.
    Id(String),
    /// Numeric id.
    Numeric(i64),
    /// Populated document carrying an `_id` (and usually a `name`).
    Embedded(EmbeddedRef),
    /// Extended JSON object id.
    ObjectId {
        /// The hex object id.
        #[serde(rename = "$oid")]
        oid: String,
    },
}

/// A populated document reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedRef {
    /// The referenced document's id, itself in any reference shape.
    #[serde(rename = "_id")]
    pub id: Box<RefShape>,
    /// Display name of the referenced document, when populated.
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

impl RefShape {
    /// Reduce to a bare, trimmed identifier. Blank ids yield `None`.
    pub fn id(&self) -> Option<String> {
        match self {
            Self::Id(s) => non_blank(s),
            Self::Numeric(n) => Some(n.to_string()),
            Self::Embedded(embedded) => embedded.id.id(),
            Self::ObjectId { oid } => non_blank(oid),
        }
    }

    /// Display name carried by a populated reference.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Embedded(embedded) => embedded.name.as_deref(),
            _ => None,
        }
    }
}

// ─── Numeric shapes ──────────────────────────────────────────────────

/// Any of the shapes a small integer (semester, semester count) arrives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberShape {
    /// JSON integer.
    Integer(i64),
    /// JSON float; accepted only when integral.
    Float(f64),
    /// Numeric string such as `"3"`.
    Text(String),
    /// Extended JSON wrapper such as `{ "$numberInt": "3" }`.
    Wrapped(WrappedNumber),
}

/// Extended JSON numeric wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedNumber {
    /// The wrapped payload, itself in any numeric shape.
    #[serde(rename = "$numberInt", alias = "$numberLong", alias = "$numberDouble")]
    pub value: Box<NumberShape>,
}

impl NumberShape {
    /// Coerce to an integer. Non-integral or non-numeric payloads yield `None`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Float(f) => integral(*f),
            Self::Text(s) => {
                let t = s.trim();
                t.parse::<i64>()
                    .ok()
                    .or_else(|| t.parse::<f64>().ok().and_then(integral))
            }
            Self::Wrapped(wrapped) => wrapped.value.as_integer(),
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

// ─── Raw metadata records ────────────────────────────────────────────

/// A regulation exactly as the backend sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRegulation {
    /// Document id.
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: Option<RefShape>,
    /// Display name.
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// How many semesters the regulation spans.
    #[serde(rename = "numberOfSemesters", default, deserialize_with = "lenient")]
    pub number_of_semesters: Option<NumberShape>,
}

/// A branch exactly as the backend sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBranch {
    /// Document id.
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: Option<RefShape>,
    /// Display name.
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Owning regulation, bare or populated.
    #[serde(default, deserialize_with = "lenient")]
    pub regulation: Option<RefShape>,
}

/// A subject exactly as the backend sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSubject {
    /// Document id.
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: Option<RefShape>,
    /// Display name.
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Course code.
    #[serde(default, deserialize_with = "lenient")]
    pub code: Option<String>,
    /// Owning branch, bare or populated.
    #[serde(default, deserialize_with = "lenient")]
    pub branch: Option<RefShape>,
    /// Semester in any numeric shape.
    #[serde(default, deserialize_with = "lenient")]
    pub semester: Option<NumberShape>,
}

/// `GET /meta/regulations` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegulationsEnvelope {
    /// The regulation records.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub regulations: Vec<RawRegulation>,
}

/// `GET /meta/branches` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchesEnvelope {
    /// The branch records.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub branches: Vec<RawBranch>,
}

/// `GET /meta/subjects` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectsEnvelope {
    /// The subject records.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub subjects: Vec<RawSubject>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn branch(value: serde_json::Value) -> RawBranch {
        serde_json::from_value(value).unwrap()
    }

    // ── Reference normalization ──────────────────────────────────────

    #[test]
    fn test_bare_and_embedded_refs_normalize_identically() {
        let bare = branch(json!({"_id": "b1", "name": "CSE", "regulation": "r1"}));
        let embedded = branch(json!({"_id": "b1", "name": "CSE", "regulation": {"_id": "r1", "name": "R20"}}));
        assert_eq!(bare.regulation.unwrap().id().as_deref(), Some("r1"));
        let reg = embedded.regulation.unwrap();
        assert_eq!(reg.id().as_deref(), Some("r1"));
        assert_eq!(reg.name(), Some("R20"));
    }

    #[test]
    fn test_oid_and_nested_oid_refs() {
        let oid = branch(json!({"_id": {"$oid": "b1"}, "regulation": {"$oid": "r1"}}));
        assert_eq!(oid.id.unwrap().id().as_deref(), Some("b1"));
        assert_eq!(oid.regulation.unwrap().id().as_deref(), Some("r1"));

        let nested = branch(json!({"_id": "b2", "regulation": {"_id": {"$oid": "r9"}}}));
        assert_eq!(nested.regulation.unwrap().id().as_deref(), Some("r9"));
    }

    #[test]
    fn test_malformed_ref_becomes_none() {
        let raw = branch(json!({"_id": "b1", "regulation": [1, 2, 3]}));
        assert!(raw.regulation.is_none());
        let raw = branch(json!({"_id": "b1", "regulation": true}));
        assert!(raw.regulation.is_none());
        let raw = branch(json!({"_id": "b1", "regulation": null}));
        assert!(raw.regulation.is_none());
    }

    #[test]
    fn test_blank_ref_has_no_id() {
        let raw = branch(json!({"_id": "b1", "regulation": "   "}));
        assert_eq!(raw.regulation.unwrap().id(), None);
    }

    // ── Numeric coercion ─────────────────────────────────────────────

    #[test]
    fn test_semester_shapes_coerce_to_same_integer() {
        for value in [json!(3), json!("3"), json!(" 3 "), json!(3.0), json!({"$numberInt": "3"}), json!({"$numberInt": 3})] {
            let shape: NumberShape = serde_json::from_value(value.clone()).unwrap();
            assert_eq!(shape.as_integer(), Some(3), "shape {value}");
        }
    }

    #[test]
    fn test_non_integral_numbers_rejected() {
        for value in [json!(2.5), json!("two"), json!("")] {
            let shape: NumberShape = serde_json::from_value(value.clone()).unwrap();
            assert_eq!(shape.as_integer(), None, "shape {value}");
        }
    }

    #[test]
    fn test_subject_with_wrapped_semester() {
        let raw: RawSubject = serde_json::from_value(json!({
            "_id": "s1",
            "name": "Data Structures",
            "code": "CS201",
            "branch": {"_id": "b1", "name": "CSE"},
            "semester": {"$numberInt": "2"}
        }))
        .unwrap();
        assert_eq!(raw.semester.unwrap().as_integer(), Some(2));
        assert_eq!(raw.branch.unwrap().id().as_deref(), Some("b1"));
    }

    #[test]
    fn test_envelope_defaults_to_empty() {
        let env: RegulationsEnvelope = serde_json::from_value(json!({})).unwrap();
        assert!(env.regulations.is_empty());
        let env: BranchesEnvelope = serde_json::from_value(json!({"branches": null})).unwrap();
        assert!(env.branches.is_empty());
    }

    #[test]
    fn test_records_skip_non_objects() {
        let raw: Vec<RawSubject> = records(json!([{"_id": "s1"}, 7, "x", {"_id": "s2"}]));
        assert_eq!(raw.len(), 2);
        assert!(records::<RawSubject>(json!({"subjects": []})).is_empty());
    }
}
