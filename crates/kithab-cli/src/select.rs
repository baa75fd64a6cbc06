//! Drill-down selection from command-line flags.
//!
//! Each flag accepts either the backend id or the display name
//! (case-insensitive); subjects also match on their course code. Flags are
//! applied shallowest first through a [`HierarchyFilter`], so a branch that
//! is not under the chosen regulation is rejected the same way a picker
//! would never offer it.

use anyhow::{bail, Result};
use clap::Args;

use kithab_client::NoteTarget;
use kithab_filter::{CompleteSelection, HierarchyFilter, Level, LevelValue};

/// Message for commands that need all four levels.
pub const SELECTION_INCOMPLETE: &str = "Please select all fields";

/// The four selection flags.
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionArgs {
    /// Regulation id or name.
    #[arg(long, short = 'r')]
    pub regulation: Option<String>,
    /// Branch id or name.
    #[arg(long, short = 'b')]
    pub branch: Option<String>,
    /// Semester number.
    #[arg(long, short = 's')]
    pub semester: Option<String>,
    /// Subject id, name or code.
    #[arg(long)]
    pub subject: Option<String>,
}

impl SelectionArgs {
    /// Apply every given flag to `filter`.
    pub fn apply(&self, filter: &mut HierarchyFilter) -> Result<()> {
        let flags = [
            (Level::Regulation, &self.regulation),
            (Level::Branch, &self.branch),
            (Level::Semester, &self.semester),
            (Level::Subject, &self.subject),
        ];
        for (level, query) in flags {
            let Some(query) = query.as_deref() else {
                continue;
            };
            let value = resolve(filter, level, query)?;
            filter.set_level(level, Some(value))?;
        }
        Ok(())
    }
}

/// Find the option of `level` that `query` names.
pub fn resolve(filter: &HierarchyFilter, level: Level, query: &str) -> Result<LevelValue> {
    let query = query.trim();
    if let Some(missing) = level.ancestors().find(|l| !filter.selection().is_set(*l)) {
        bail!("choose a {missing} before the {level}");
    }
    let options = filter.options_for(level);
    if options.is_empty() {
        bail!("there is no {level} to choose from");
    }

    let found = options.iter().find(|option| {
        if option.value.to_string() == query || option.label.eq_ignore_ascii_case(query) {
            return true;
        }
        match &option.value {
            LevelValue::Subject(id) => filter
                .snapshot()
                .subject(id)
                .is_some_and(|s| s.name.eq_ignore_ascii_case(query) || s.code.eq_ignore_ascii_case(query)),
            _ => false,
        }
    });
    match found {
        Some(option) => Ok(option.value.clone()),
        None => {
            let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
            bail!("unknown {level} {query:?}; choose one of: {}", labels.join(", "))
        }
    }
}

/// The full selection, or an error listing what to pick next.
pub fn require_complete(filter: &HierarchyFilter) -> Result<CompleteSelection> {
    match CompleteSelection::try_from(filter.selection()) {
        Ok(selection) => Ok(selection),
        Err(level) => {
            print_options(filter, level);
            bail!(SELECTION_INCOMPLETE)
        }
    }
}

/// List the choices for `level` on stderr.
pub fn print_options(filter: &HierarchyFilter, level: Level) {
    let options = filter.options_for(level);
    if options.is_empty() {
        eprintln!("No {level} options available.");
        return;
    }
    eprintln!("Choose a {level} (--{level}):");
    for option in options {
        eprintln!("  {:<26} {}", option.value.to_string(), option.label);
    }
}

/// Where a note goes, from a complete selection.
pub fn note_target(selection: CompleteSelection) -> NoteTarget {
    NoteTarget {
        regulation: selection.regulation,
        branch: selection.branch,
        semester: selection.semester,
        subject: selection.subject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kithab_core::wire::{RawBranch, RawRegulation, RawSubject};
    use kithab_core::MetadataSnapshot;
    use serde_json::json;

    fn filter() -> HierarchyFilter {
        let regs: Vec<RawRegulation> = serde_json::from_value(json!([
            { "_id": "r1", "name": "R20", "numberOfSemesters": 4 },
            { "_id": "r2", "name": "R23", "numberOfSemesters": 8 }
        ]))
        .unwrap();
        let branches: Vec<RawBranch> = serde_json::from_value(json!([
            { "_id": "b1", "name": "CSE", "regulation": "r1" },
            { "_id": "b2", "name": "ECE", "regulation": "r2" }
        ]))
        .unwrap();
        let subjects: Vec<RawSubject> = serde_json::from_value(json!([
            { "_id": "s1", "name": "Data Structures", "code": "CS201", "branch": "b1", "semester": 2 }
        ]))
        .unwrap();
        HierarchyFilter::new(MetadataSnapshot::from_raw(regs, branches, subjects))
    }

    #[test]
    fn test_names_and_ids_resolve() {
        let mut f = filter();
        let args = SelectionArgs {
            regulation: Some("r20".into()),
            branch: Some("b1".into()),
            semester: Some("2".into()),
            subject: Some("cs201".into()),
        };
        args.apply(&mut f).unwrap();
        let complete = require_complete(&f).unwrap();
        assert_eq!(complete.subject.as_str(), "s1");
        assert_eq!(note_target(complete).semester.get(), 2);
    }

    #[test]
    fn test_branch_outside_regulation_rejected() {
        let mut f = filter();
        let args = SelectionArgs {
            regulation: Some("R20".into()),
            branch: Some("ECE".into()),
            ..Default::default()
        };
        let err = args.apply(&mut f).unwrap_err().to_string();
        assert!(err.starts_with("unknown branch \"ECE\""), "{err}");
        assert_eq!(f.selection().regulation().map(|r| r.as_str()), Some("r1"));
        assert!(f.selection().branch().is_none());
    }

    #[test]
    fn test_skipped_level_names_missing_ancestor() {
        let mut f = filter();
        let args = SelectionArgs {
            regulation: Some("R20".into()),
            semester: Some("2".into()),
            ..Default::default()
        };
        let err = args.apply(&mut f).unwrap_err().to_string();
        assert_eq!(err, "choose a branch before the semester");
    }

    #[test]
    fn test_semester_beyond_regulation_rejected() {
        let mut f = filter();
        let args = SelectionArgs {
            regulation: Some("R20".into()),
            branch: Some("CSE".into()),
            semester: Some("7".into()),
            ..Default::default()
        };
        assert!(args.apply(&mut f).is_err());
    }

    #[test]
    fn test_incomplete_selection_message() {
        let f = filter();
        let err = require_complete(&f).unwrap_err();
        assert_eq!(err.to_string(), SELECTION_INCOMPLETE);
    }
}
