//! # Hierarchical Filter Engine
//!
//! One engine instance backs one screen. It owns a shared
//! [`MetadataSnapshot`] and the [`Selection`], and derives the option list
//! of every level from them.
//!
//! ## Options
//!
//! | Level      | Options                                                        |
//! |------------|----------------------------------------------------------------|
//! | regulation | every regulation                                               |
//! | branch     | branches of the selected regulation                            |
//! | semester   | `1..=numberOfSemesters` of the selected regulation             |
//! | subject    | subjects of the selected branch taught in the selected semester |
//!
//! A level whose inputs are unset has no options. Option lists keep the
//! snapshot's source order.
//!
//! ## Stale selections
//!
//! After [`HierarchyFilter::replace_snapshot`], a selected value that is no
//! longer offered by its level is cleared together with every deeper level.

use std::sync::Arc;

use kithab_core::{
    Branch, BranchId, MetadataSnapshot, Note, Regulation, RegulationId, Semester, Subject,
    SubjectId,
};

use crate::error::FilterError;
use crate::level::{CompleteSelection, Level, LevelValue, OptionItem, Selection};

/// The drill-down engine.
#[derive(Debug, Clone)]
pub struct HierarchyFilter {
    snapshot: Arc<MetadataSnapshot>,
    selection: Selection,
}

impl Default for HierarchyFilter {
    fn default() -> Self {
        Self::new(MetadataSnapshot::default())
    }
}

impl HierarchyFilter {
    /// Create an engine with an empty selection.
    pub fn new(snapshot: impl Into<Arc<MetadataSnapshot>>) -> Self {
        Self {
            snapshot: snapshot.into(),
            selection: Selection::default(),
        }
    }

    /// The metadata the engine derives options from.
    pub fn snapshot(&self) -> &MetadataSnapshot {
        &self.snapshot
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    // ─── Mutation ────────────────────────────────────────────────────

    /// Set `level` to `value` and clear every deeper level. `None` clears
    /// `level` and everything deeper.
    ///
    /// Setting a level to the value it already holds changes nothing.
    ///
    /// # Errors
    ///
    /// The selection is left unchanged when the value belongs to another
    /// level, a shallower level is unset, or the value is not among
    /// [`Self::options_for`]`(level)`.
    pub fn set_level(&mut self, level: Level, value: Option<LevelValue>) -> Result<(), FilterError> {
        let Some(value) = value else {
            self.selection.clear_from(level);
            tracing::debug!(%level, "selection cleared");
            return Ok(());
        };

        if value.level() != level {
            return Err(FilterError::LevelMismatch {
                level,
                value_level: value.level(),
            });
        }
        if self.selection.get(level).as_ref() == Some(&value) {
            return Ok(());
        }
        if let Some(missing) = level.ancestors().find(|l| !self.selection.is_set(*l)) {
            return Err(FilterError::AncestorUnset { level, missing });
        }
        if !self.is_option(&value) {
            return Err(FilterError::NotAnOption {
                level,
                value: value.to_string(),
            });
        }

        self.selection.clear_from(level);
        tracing::debug!(%level, %value, "selection changed");
        self.selection.assign(value);
        Ok(())
    }

    /// [`Self::set_level`] for the regulation.
    pub fn set_regulation(&mut self, id: Option<RegulationId>) -> Result<(), FilterError> {
        self.set_level(Level::Regulation, id.map(LevelValue::Regulation))
    }

    /// [`Self::set_level`] for the branch.
    pub fn set_branch(&mut self, id: Option<BranchId>) -> Result<(), FilterError> {
        self.set_level(Level::Branch, id.map(LevelValue::Branch))
    }

    /// [`Self::set_level`] for the semester.
    pub fn set_semester(&mut self, semester: Option<Semester>) -> Result<(), FilterError> {
        self.set_level(Level::Semester, semester.map(LevelValue::Semester))
    }

    /// [`Self::set_level`] for the subject.
    pub fn set_subject(&mut self, id: Option<SubjectId>) -> Result<(), FilterError> {
        self.set_level(Level::Subject, id.map(LevelValue::Subject))
    }

    /// Clear all four levels.
    pub fn reset(&mut self) {
        self.selection = Selection::default();
    }

    /// Swap in freshly fetched metadata, then drop any stale selection.
    ///
    /// Returns the level that was cleared, if any.
    pub fn replace_snapshot(&mut self, snapshot: impl Into<Arc<MetadataSnapshot>>) -> Option<Level> {
        self.snapshot = snapshot.into();
        self.revalidate()
    }

    /// Clear the shallowest selected level whose value is no longer an
    /// option, along with every deeper level.
    pub fn revalidate(&mut self) -> Option<Level> {
        let stale = Level::ALL.into_iter().find(|level| {
            self.selection
                .get(*level)
                .is_some_and(|value| !self.is_option(&value))
        })?;
        tracing::debug!(level = %stale, "stale selection cleared");
        self.selection.clear_from(stale);
        Some(stale)
    }

    // ─── Derivation ──────────────────────────────────────────────────

    /// Every regulation.
    pub fn regulation_options(&self) -> Vec<&Regulation> {
        self.snapshot.regulations().iter().collect()
    }

    /// Branches of the selected regulation.
    pub fn branch_options(&self) -> Vec<&Branch> {
        let Some(regulation) = &self.selection.regulation else {
            return Vec::new();
        };
        self.snapshot
            .branches()
            .iter()
            .filter(|b| b.regulation_id.as_ref() == Some(regulation))
            .collect()
    }

    /// Semesters of the selected regulation.
    pub fn semester_options(&self) -> Vec<Semester> {
        self.selection
            .regulation
            .as_ref()
            .and_then(|id| self.snapshot.regulation(id))
            .map(|r| r.semesters().collect())
            .unwrap_or_default()
    }

    /// Subjects of the selected branch in the selected semester.
    pub fn subject_options(&self) -> Vec<&Subject> {
        let (Some(branch), Some(semester)) = (&self.selection.branch, self.selection.semester) else {
            return Vec::new();
        };
        self.snapshot
            .subjects()
            .iter()
            .filter(|s| s.branch_id.as_ref() == Some(branch) && s.semester == Some(semester))
            .collect()
    }

    /// Options of `level` as value/label pairs.
    pub fn options_for(&self, level: Level) -> Vec<OptionItem> {
        match level {
            Level::Regulation => self
                .regulation_options()
                .into_iter()
                .map(|r| OptionItem {
                    value: LevelValue::Regulation(r.id.clone()),
                    label: r.name.clone(),
                })
                .collect(),
            Level::Branch => self
                .branch_options()
                .into_iter()
                .map(|b| OptionItem {
                    value: LevelValue::Branch(b.id.clone()),
                    label: b.name.clone(),
                })
                .collect(),
            Level::Semester => self
                .semester_options()
                .into_iter()
                .map(|s| OptionItem {
                    value: LevelValue::Semester(s),
                    label: s.to_string(),
                })
                .collect(),
            Level::Subject => self
                .subject_options()
                .into_iter()
                .map(|s| OptionItem {
                    value: LevelValue::Subject(s.id.clone()),
                    label: s.label(),
                })
                .collect(),
        }
    }

    fn is_option(&self, value: &LevelValue) -> bool {
        match value {
            LevelValue::Regulation(id) => self.snapshot.regulation(id).is_some(),
            LevelValue::Branch(id) => self.branch_options().iter().any(|b| &b.id == id),
            LevelValue::Semester(s) => self.semester_options().contains(s),
            LevelValue::Subject(id) => self.subject_options().iter().any(|s| &s.id == id),
        }
    }

    // ─── Completion ──────────────────────────────────────────────────

    /// All four levels set.
    pub fn is_complete(&self) -> bool {
        self.selection.is_set(Level::Subject)
    }

    /// The selection as owned values, when complete.
    pub fn complete_selection(&self) -> Option<CompleteSelection> {
        CompleteSelection::try_from(&self.selection).ok()
    }

    // ─── Note matching ───────────────────────────────────────────────

    /// Whether `note` falls under the selection. Unset levels match
    /// everything.
    pub fn matches_note(&self, note: &Note) -> bool {
        fn same(selected: Option<&str>, actual: Option<&str>) -> bool {
            selected.map_or(true, |s| actual == Some(s))
        }
        let sel = &self.selection;
        same(
            sel.regulation.as_ref().map(RegulationId::as_str),
            note.regulation.as_ref().map(|r| r.id.as_str()),
        ) && same(
            sel.branch.as_ref().map(BranchId::as_str),
            note.branch.as_ref().map(|r| r.id.as_str()),
        ) && sel.semester.map_or(true, |s| note.semester == Some(s))
            && same(
                sel.subject.as_ref().map(SubjectId::as_str),
                note.subject.as_ref().map(|r| r.id.as_str()),
            )
    }

    /// The notes that fall under the selection, in input order.
    pub fn filter_notes<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        notes.iter().filter(|n| self.matches_note(n)).collect()
    }
}
