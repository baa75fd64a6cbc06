//! # Levels, Values and Selections
//!
//! The four drill-down levels are totally ordered:
//!
//! ```text
//! Regulation(0) ──▶ Branch(1) ──▶ Semester(2) ──▶ Subject(3)
//! ```
//!
//! A [`Selection`] holds at most one value per level and maintains the
//! prefix invariant: a set level implies every shallower level is set.

use serde::{Deserialize, Serialize};

use kithab_core::{BranchId, RegulationId, Semester, SubjectId};

// ─── Level ───────────────────────────────────────────────────────────

/// One level of the drill-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Curriculum version.
    Regulation,
    /// Department under the regulation.
    Branch,
    /// Semester number within the regulation.
    Semester,
    /// Course under the branch and semester.
    Subject,
}

impl Level {
    /// All levels, shallowest first.
    pub const ALL: [Level; 4] = [Level::Regulation, Level::Branch, Level::Semester, Level::Subject];

    /// Zero-based depth.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Levels strictly shallower than `self`, shallowest first.
    pub fn ancestors(self) -> impl Iterator<Item = Level> {
        Self::ALL.into_iter().take(self.index())
    }

    /// `self` and every deeper level.
    pub fn and_deeper(self) -> impl Iterator<Item = Level> {
        Self::ALL.into_iter().skip(self.index())
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regulation => "regulation",
            Self::Branch => "branch",
            Self::Semester => "semester",
            Self::Subject => "subject",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Value ───────────────────────────────────────────────────────────

/// A value for one level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", content = "value", rename_all = "lowercase")]
pub enum LevelValue {
    /// A regulation.
    Regulation(RegulationId),
    /// A branch.
    Branch(BranchId),
    /// A semester.
    Semester(Semester),
    /// A subject.
    Subject(SubjectId),
}

impl LevelValue {
    /// The level this value belongs to.
    pub fn level(&self) -> Level {
        match self {
            Self::Regulation(_) => Level::Regulation,
            Self::Branch(_) => Level::Branch,
            Self::Semester(_) => Level::Semester,
            Self::Subject(_) => Level::Subject,
        }
    }
}

impl std::fmt::Display for LevelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regulation(id) => id.fmt(f),
            Self::Branch(id) => id.fmt(f),
            Self::Semester(s) => s.fmt(f),
            Self::Subject(id) => id.fmt(f),
        }
    }
}

/// One entry of a level's option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    /// The value to pass back to `set_level`.
    pub value: LevelValue,
    /// Human-readable label.
    pub label: String,
}

// ─── Selection ───────────────────────────────────────────────────────

/// The current choice across the four levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub(crate) regulation: Option<RegulationId>,
    pub(crate) branch: Option<BranchId>,
    pub(crate) semester: Option<Semester>,
    pub(crate) subject: Option<SubjectId>,
}

impl Selection {
    /// Selected regulation.
    pub fn regulation(&self) -> Option<&RegulationId> {
        self.regulation.as_ref()
    }

    /// Selected branch.
    pub fn branch(&self) -> Option<&BranchId> {
        self.branch.as_ref()
    }

    /// Selected semester.
    pub fn semester(&self) -> Option<Semester> {
        self.semester
    }

    /// Selected subject.
    pub fn subject(&self) -> Option<&SubjectId> {
        self.subject.as_ref()
    }

    /// The value at `level`, if set.
    pub fn get(&self, level: Level) -> Option<LevelValue> {
        match level {
            Level::Regulation => self.regulation.clone().map(LevelValue::Regulation),
            Level::Branch => self.branch.clone().map(LevelValue::Branch),
            Level::Semester => self.semester.map(LevelValue::Semester),
            Level::Subject => self.subject.clone().map(LevelValue::Subject),
        }
    }

    /// Whether `level` holds a value.
    pub fn is_set(&self, level: Level) -> bool {
        match level {
            Level::Regulation => self.regulation.is_some(),
            Level::Branch => self.branch.is_some(),
            Level::Semester => self.semester.is_some(),
            Level::Subject => self.subject.is_some(),
        }
    }

    /// Whether no level is set.
    pub fn is_empty(&self) -> bool {
        !self.is_set(Level::Regulation)
    }

    /// Whether every set level has all shallower levels set.
    pub fn holds_prefix_invariant(&self) -> bool {
        Level::ALL
            .windows(2)
            .all(|pair| self.is_set(pair[0]) || !self.is_set(pair[1]))
    }

    pub(crate) fn clear_from(&mut self, level: Level) {
        for l in level.and_deeper() {
            match l {
                Level::Regulation => self.regulation = None,
                Level::Branch => self.branch = None,
                Level::Semester => self.semester = None,
                Level::Subject => self.subject = None,
            }
        }
    }

    pub(crate) fn assign(&mut self, value: LevelValue) {
        match value {
            LevelValue::Regulation(id) => self.regulation = Some(id),
            LevelValue::Branch(id) => self.branch = Some(id),
            LevelValue::Semester(s) => self.semester = Some(s),
            LevelValue::Subject(id) => self.subject = Some(id),
        }
    }
}

/// A selection with all four levels set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteSelection {
    /// Regulation.
    pub regulation: RegulationId,
    /// Branch.
    pub branch: BranchId,
    /// Semester.
    pub semester: Semester,
    /// Subject.
    pub subject: SubjectId,
}

impl TryFrom<&Selection> for CompleteSelection {
    type Error = Level;

    /// Fails with the shallowest unset level.
    fn try_from(s: &Selection) -> Result<Self, Self::Error> {
        Ok(Self {
            regulation: s.regulation.clone().ok_or(Level::Regulation)?,
            branch: s.branch.clone().ok_or(Level::Branch)?,
            semester: s.semester.ok_or(Level::Semester)?,
            subject: s.subject.clone().ok_or(Level::Subject)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Regulation < Level::Branch);
        assert!(Level::Semester < Level::Subject);
        let ancestors: Vec<Level> = Level::Semester.ancestors().collect();
        assert_eq!(ancestors, vec![Level::Regulation, Level::Branch]);
        let deeper: Vec<Level> = Level::Semester.and_deeper().collect();
        assert_eq!(deeper, vec![Level::Semester, Level::Subject]);
    }

    #[test]
    fn test_clear_from_keeps_shallower() {
        let mut s = Selection::default();
        s.assign(LevelValue::Regulation(RegulationId::new("r1").unwrap()));
        s.assign(LevelValue::Branch(BranchId::new("b1").unwrap()));
        s.assign(LevelValue::Semester(Semester::new(2).unwrap()));
        s.clear_from(Level::Branch);
        assert!(s.is_set(Level::Regulation));
        assert!(!s.is_set(Level::Branch));
        assert!(!s.is_set(Level::Semester));
        assert!(s.holds_prefix_invariant());
    }

    #[test]
    fn test_complete_selection_reports_first_gap() {
        let mut s = Selection::default();
        s.assign(LevelValue::Regulation(RegulationId::new("r1").unwrap()));
        assert_eq!(CompleteSelection::try_from(&s), Err(Level::Branch));
    }

    #[test]
    fn test_level_value_serde_shape() {
        let v = LevelValue::Semester(Semester::new(3).unwrap());
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, serde_json::json!({"level": "semester", "value": 3}));
    }
}
