//! # Academic Metadata
//!
//! Regulations, branches and subjects in their normalized form, and the
//! [`MetadataSnapshot`] that bundles one fetch of all three.
//!
//! ```text
//! Regulation ──1:N──▶ Branch ──1:N──▶ Subject (tagged with one semester)
//! ```
//!
//! Records are converted from their [`crate::wire`] shapes exactly once, in
//! [`MetadataSnapshot::from_raw`]. A record without a usable id is dropped
//! (it could never be selected). A branch or subject whose parent reference
//! or semester cannot be normalized is kept, with the field set to `None`; it
//! simply never matches a selection.

use serde::{Deserialize, Serialize};

use crate::error::KithabError;
use crate::identity::{BranchId, RegulationId, SubjectId};
use crate::wire::{NumberShape, RawBranch, RawRegulation, RawSubject};

// ─── Semester ────────────────────────────────────────────────────────

/// Canonical semester number: an integer in `1..=255`.
///
/// Semesters stored on subjects, chosen by users and carried on notes are
/// all converted to this type before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Semester(u8);

impl Semester {
    /// Construct from a positive integer. Zero is rejected.
    pub fn new(n: u8) -> Option<Self> {
        (n >= 1).then_some(Self(n))
    }

    /// Coerce any backend numeric shape.
    pub fn from_shape(shape: &NumberShape) -> Option<Self> {
        shape
            .as_integer()
            .and_then(|n| u8::try_from(n).ok())
            .and_then(Self::new)
    }

    /// Parse user input such as `"3"`.
    ///
    /// # Errors
    ///
    /// Returns [`KithabError::InvalidSemester`] for anything that is not a
    /// positive integer in range.
    pub fn parse(s: &str) -> Result<Self, KithabError> {
        Self::from_shape(&NumberShape::Text(s.to_string()))
            .ok_or_else(|| KithabError::InvalidSemester(s.to_string()))
    }

    /// The semester number.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Semester {
    type Error = KithabError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n).ok_or_else(|| KithabError::InvalidSemester(n.to_string()))
    }
}

impl From<Semester> for u8 {
    fn from(s: Semester) -> Self {
        s.0
    }
}

impl std::fmt::Display for Semester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Records ─────────────────────────────────────────────────────────

/// A curriculum version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regulation {
    /// Regulation id.
    pub id: RegulationId,
    /// Display name, e.g. "R20".
    pub name: String,
    /// Number of semesters the regulation spans. Zero when unknown.
    pub number_of_semesters: u8,
}

impl Regulation {
    /// `1..=number_of_semesters`, in ascending order.
    pub fn semesters(&self) -> impl Iterator<Item = Semester> {
        (1..=self.number_of_semesters).filter_map(Semester::new)
    }

    fn from_raw(raw: RawRegulation) -> Option<Self> {
        let id = raw.id.and_then(|r| r.id()).and_then(|s| RegulationId::new(s).ok())?;
        let number_of_semesters = raw
            .number_of_semesters
            .and_then(|n| n.as_integer())
            .and_then(|n| u8::try_from(n).ok())
            .unwrap_or(0);
        Some(Self {
            id,
            name: raw.name.unwrap_or_default(),
            number_of_semesters,
        })
    }
}

/// A department/program under a regulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch id.
    pub id: BranchId,
    /// Display name, e.g. "CSE".
    pub name: String,
    /// Owning regulation; `None` when the backend reference was unusable.
    pub regulation_id: Option<RegulationId>,
}

impl Branch {
    fn from_raw(raw: RawBranch) -> Option<Self> {
        let id = raw.id.and_then(|r| r.id()).and_then(|s| BranchId::new(s).ok())?;
        let regulation_id = raw
            .regulation
            .and_then(|r| r.id())
            .and_then(|s| RegulationId::new(s).ok());
        Some(Self {
            id,
            name: raw.name.unwrap_or_default(),
            regulation_id,
        })
    }
}

/// A course under a branch, taught in one semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Subject id.
    pub id: SubjectId,
    /// Display name.
    pub name: String,
    /// Course code, e.g. "CS201".
    pub code: String,
    /// Owning branch; `None` when the backend reference was unusable.
    pub branch_id: Option<BranchId>,
    /// Semester; `None` when the backend value could not be coerced.
    pub semester: Option<Semester>,
}

impl Subject {
    /// Label used in selection lists: `"name (code)"`, or just the name when
    /// the code is blank.
    pub fn label(&self) -> String {
        if self.code.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.code)
        }
    }

    fn from_raw(raw: RawSubject) -> Option<Self> {
        let id = raw.id.and_then(|r| r.id()).and_then(|s| SubjectId::new(s).ok())?;
        let branch_id = raw
            .branch
            .and_then(|r| r.id())
            .and_then(|s| BranchId::new(s).ok());
        let semester = raw.semester.as_ref().and_then(Semester::from_shape);
        Some(Self {
            id,
            name: raw.name.unwrap_or_default(),
            code: raw.code.unwrap_or_default(),
            branch_id,
            semester,
        })
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────

/// One immutable fetch of the three metadata collections.
///
/// Source order is preserved; nothing here sorts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    regulations: Vec<Regulation>,
    branches: Vec<Branch>,
    subjects: Vec<Subject>,
}

impl MetadataSnapshot {
    /// Build a snapshot from already-normalized records.
    pub fn new(regulations: Vec<Regulation>, branches: Vec<Branch>, subjects: Vec<Subject>) -> Self {
        Self {
            regulations,
            branches,
            subjects,
        }
    }

    /// Normalize raw backend records into a snapshot.
    pub fn from_raw(
        regulations: Vec<RawRegulation>,
        branches: Vec<RawBranch>,
        subjects: Vec<RawSubject>,
    ) -> Self {
        let (reg_in, branch_in, subject_in) = (regulations.len(), branches.len(), subjects.len());
        let snapshot = Self {
            regulations: regulations.into_iter().filter_map(Regulation::from_raw).collect(),
            branches: branches.into_iter().filter_map(Branch::from_raw).collect(),
            subjects: subjects.into_iter().filter_map(Subject::from_raw).collect(),
        };
        let dropped = (reg_in - snapshot.regulations.len())
            + (branch_in - snapshot.branches.len())
            + (subject_in - snapshot.subjects.len());
        if dropped > 0 {
            tracing::debug!(dropped, "metadata records without a usable id were dropped");
        }
        snapshot
    }

    /// All regulations in source order.
    pub fn regulations(&self) -> &[Regulation] {
        &self.regulations
    }

    /// All branches in source order.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// All subjects in source order.
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Look up a regulation by id.
    pub fn regulation(&self, id: &RegulationId) -> Option<&Regulation> {
        self.regulations.iter().find(|r| &r.id == id)
    }

    /// Look up a branch by id.
    pub fn branch(&self, id: &BranchId) -> Option<&Branch> {
        self.branches.iter().find(|b| &b.id == id)
    }

    /// Look up a subject by id.
    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| &s.id == id)
    }

    /// Whether all three collections are empty (e.g. after a failed fetch).
    pub fn is_empty(&self) -> bool {
        self.regulations.is_empty() && self.branches.is_empty() && self.subjects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Vec<T> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_from_raw_normalizes_all_shapes() {
        let snapshot = MetadataSnapshot::from_raw(
            raw(json!([{"_id": "r1", "name": "R20", "numberOfSemesters": "8"}])),
            raw(json!([
                {"_id": "b1", "name": "CSE", "regulation": {"_id": "r1"}},
                {"_id": "b2", "name": "ECE", "regulation": "r1"}
            ])),
            raw(json!([
                {"_id": "s1", "name": "DS", "code": "CS201", "branch": {"_id": "b1"}, "semester": {"$numberInt": "3"}}
            ])),
        );

        assert_eq!(snapshot.regulations()[0].number_of_semesters, 8);
        let r1 = RegulationId::new("r1").unwrap();
        assert!(snapshot.branches().iter().all(|b| b.regulation_id.as_ref() == Some(&r1)));
        let subject = &snapshot.subjects()[0];
        assert_eq!(subject.branch_id.as_ref().map(BranchId::as_str), Some("b1"));
        assert_eq!(subject.semester, Semester::new(3));
    }

    #[test]
    fn test_records_without_id_are_dropped() {
        let snapshot = MetadataSnapshot::from_raw(
            raw(json!([{"name": "orphan"}, {"_id": "r1", "name": "R20", "numberOfSemesters": 4}])),
            raw(json!([{"_id": "", "name": "blank"}])),
            Vec::new(),
        );
        assert_eq!(snapshot.regulations().len(), 1);
        assert!(snapshot.branches().is_empty());
    }

    #[test]
    fn test_unusable_parent_kept_as_none() {
        let snapshot = MetadataSnapshot::from_raw(
            Vec::new(),
            raw(json!([{"_id": "b1", "name": "CSE", "regulation": {"nope": 1}}])),
            raw(json!([{"_id": "s1", "name": "X", "branch": "b1", "semester": "first"}])),
        );
        assert_eq!(snapshot.branches()[0].regulation_id, None);
        assert_eq!(snapshot.subjects()[0].semester, None);
    }

    #[test]
    fn test_missing_semester_count_is_zero() {
        let snapshot = MetadataSnapshot::from_raw(
            raw(json!([{"_id": "r1", "name": "R20"}])),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(snapshot.regulations()[0].semesters().count(), 0);
    }

    #[test]
    fn test_semesters_are_one_based() {
        let reg = Regulation {
            id: RegulationId::new("r1").unwrap(),
            name: "R20".into(),
            number_of_semesters: 4,
        };
        let sems: Vec<u8> = reg.semesters().map(Semester::get).collect();
        assert_eq!(sems, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_semester_parse() {
        assert_eq!(Semester::parse("2").unwrap().get(), 2);
        assert!(Semester::parse("0").is_err());
        assert!(Semester::parse("-1").is_err());
        assert!(Semester::parse("300").is_err());
        assert!(Semester::parse("abc").is_err());
    }

    #[test]
    fn test_subject_label() {
        let mut subject = Subject {
            id: SubjectId::new("s1").unwrap(),
            name: "Data Structures".into(),
            code: "CS201".into(),
            branch_id: None,
            semester: None,
        };
        assert_eq!(subject.label(), "Data Structures (CS201)");
        subject.code.clear();
        assert_eq!(subject.label(), "Data Structures");
    }
}
