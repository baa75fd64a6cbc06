//! End-to-end drill-down over metadata in the shapes the backend sends.

use kithab_core::wire::{BranchesEnvelope, RegulationsEnvelope, SubjectsEnvelope};
use kithab_core::{BranchId, MetadataSnapshot, RegulationId, Semester, SubjectId};
use kithab_filter::{HierarchyFilter, Level, LevelValue};
use serde_json::json;

fn fetched_snapshot() -> MetadataSnapshot {
    let regulations: RegulationsEnvelope = serde_json::from_value(json!({
        "regulations": [{"_id": "R1", "name": "R20", "numberOfSemesters": 4}]
    }))
    .unwrap();
    let branches: BranchesEnvelope = serde_json::from_value(json!({
        "branches": [{"_id": "B1", "name": "CSE", "regulation": {"_id": "R1", "name": "R20"}}]
    }))
    .unwrap();
    let subjects: SubjectsEnvelope = serde_json::from_value(json!({
        "subjects": [
            {"_id": "S1", "name": "Data Structures", "code": "CS201", "branch": {"_id": "B1"}, "semester": "2"},
            {"_id": "S2", "name": "Operating Systems", "code": "CS301", "branch": "B1", "semester": {"$numberInt": "3"}}
        ]
    }))
    .unwrap();
    MetadataSnapshot::from_raw(regulations.regulations, branches.branches, subjects.subjects)
}

fn subject_ids(f: &HierarchyFilter) -> Vec<String> {
    f.subject_options().iter().map(|s| s.id.to_string()).collect()
}

#[test]
fn semester_switch_swaps_subjects_and_clears_subject() {
    let mut f = HierarchyFilter::new(fetched_snapshot());

    f.set_regulation(Some(RegulationId::new("R1").unwrap())).unwrap();
    f.set_branch(Some(BranchId::new("B1").unwrap())).unwrap();
    f.set_semester(Some(Semester::new(2).unwrap())).unwrap();
    assert_eq!(subject_ids(&f), vec!["S1"]);

    f.set_subject(Some(SubjectId::new("S1").unwrap())).unwrap();
    assert!(f.is_complete());

    f.set_semester(Some(Semester::new(3).unwrap())).unwrap();
    assert_eq!(subject_ids(&f), vec!["S2"]);
    assert!(f.selection().subject().is_none());
    assert_eq!(f.selection().branch().map(BranchId::as_str), Some("B1"));
    assert!(!f.is_complete());
}

#[test]
fn options_render_as_value_label_pairs() {
    let mut f = HierarchyFilter::new(fetched_snapshot());
    let regs = f.options_for(Level::Regulation);
    assert_eq!(regs.len(), 1);
    assert_eq!(regs[0].label, "R20");

    f.set_level(Level::Regulation, Some(regs[0].value.clone())).unwrap();
    let semesters: Vec<String> = f
        .options_for(Level::Semester)
        .into_iter()
        .map(|o| o.label)
        .collect();
    assert_eq!(semesters, vec!["1", "2", "3", "4"]);

    f.set_level(Level::Branch, Some(LevelValue::Branch(BranchId::new("B1").unwrap())))
        .unwrap();
    f.set_level(Level::Semester, Some(LevelValue::Semester(Semester::new(2).unwrap())))
        .unwrap();
    let subjects = f.options_for(Level::Subject);
    assert_eq!(subjects[0].label, "Data Structures (CS201)");
}

#[test]
fn failed_fetch_leaves_empty_options() {
    let f = HierarchyFilter::new(MetadataSnapshot::default());
    for level in Level::ALL {
        assert!(f.options_for(level).is_empty());
    }
}
