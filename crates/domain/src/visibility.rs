//! Role-based catalogue visibility and search refinement.
//!
//! The visibility decision is never persisted: it is recomputed per request
//! from (role, subjects) x note subject. Refinement filters compose by
//! conjunction and always run after the role-based filter, never instead
//! of it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::note::Note;
use crate::profile::{Profile, Role};

/// Computes the subset of the catalogue the profile may see, preserving
/// the catalogue's existing (newest-first) order.
///
/// Admin and faculty see everything. A student sees exactly the notes
/// whose subject is in their enrolled set; a student enrolled in nothing
/// sees nothing (fail-closed, not an error).
#[must_use]
pub fn visible_notes(profile: &Profile, mut catalogue: Vec<Note>) -> Vec<Note> {
    match profile.role() {
        Role::Admin | Role::Faculty => catalogue,
        Role::Student => {
            catalogue.retain(|note| profile.has_subject(note.subject()));
            catalogue
        }
    }
}

/// Case-insensitive substring search over title, description, and
/// uploader name. A blank term leaves the listing unchanged.
#[must_use]
pub fn filter_by_search(mut notes: Vec<Note>, term: &str) -> Vec<Note> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return notes;
    }

    notes.retain(|note| {
        note.title().to_lowercase().contains(&term)
            || note
                .description()
                .is_some_and(|description| description.to_lowercase().contains(&term))
            || note
                .uploader_name()
                .is_some_and(|name| name.to_lowercase().contains(&term))
    });
    notes
}

/// Exact subject refinement. A blank selection means "all subjects".
#[must_use]
pub fn filter_by_subject(mut notes: Vec<Note>, subject: &str) -> Vec<Note> {
    if subject.trim().is_empty() {
        return notes;
    }

    notes.retain(|note| note.subject() == subject);
    notes
}

/// Exact department refinement. A blank selection means "all departments".
#[must_use]
pub fn filter_by_department(mut notes: Vec<Note>, department: &str) -> Vec<Note> {
    if department.trim().is_empty() {
        return notes;
    }

    notes.retain(|note| note.department() == department);
    notes
}

/// Unique, sorted values available to search/filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterFacets {
    departments: Vec<String>,
    subjects: Vec<String>,
}

impl FilterFacets {
    /// Returns the sorted unique departments.
    #[must_use]
    pub fn departments(&self) -> &[String] {
        self.departments.as_slice()
    }

    /// Returns the sorted unique subjects.
    #[must_use]
    pub fn subjects(&self) -> &[String] {
        self.subjects.as_slice()
    }
}

/// Projects filter facets from the faculty profile set: the unique sorted
/// union of departments and taught subjects. Pure, no side effects;
/// recompute whenever the faculty set changes.
#[must_use]
pub fn available_filter_facets(faculty_profiles: &[Profile]) -> FilterFacets {
    let mut departments = BTreeSet::new();
    let mut subjects = BTreeSet::new();

    for profile in faculty_profiles {
        if profile.role() != Role::Faculty {
            continue;
        }
        if !profile.department().trim().is_empty() {
            departments.insert(profile.department().to_owned());
        }
        for subject in profile.subjects() {
            subjects.insert(subject.clone());
        }
    }

    FilterFacets {
        departments: departments.into_iter().collect(),
        subjects: subjects.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use notenest_core::PrincipalId;
    use proptest::prelude::*;
    use url::Url;

    use crate::note::{Note, NoteId};
    use crate::profile::{Profile, ProfileId, Role};

    use super::{
        available_filter_facets, filter_by_department, filter_by_search, filter_by_subject,
        visible_notes,
    };

    fn profile(role: Role, department: &str, subjects: Vec<String>) -> Profile {
        Profile::new(
            ProfileId::new(),
            PrincipalId::new(),
            "Test User",
            "user@example.edu",
            None,
            department,
            role,
            subjects,
            Utc::now(),
            Utc::now(),
        )
        .unwrap_or_else(|_| panic!("test profile"))
    }

    fn note(title: &str, subject: &str, department: &str, uploader_name: Option<&str>) -> Note {
        let file_url = Url::parse("https://files.example.edu/notes/lecture.pdf")
            .unwrap_or_else(|_| panic!("url"));
        Note::new(
            NoteId::new(),
            title,
            None,
            subject,
            department,
            file_url,
            "lecture.pdf",
            Some(1024),
            ProfileId::new(),
            uploader_name.map(ToOwned::to_owned),
            Utc::now(),
            Utc::now(),
        )
        .unwrap_or_else(|_| panic!("test note"))
    }

    fn subjects(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn student_sees_only_enrolled_subjects() {
        let student = profile(Role::Student, "CS", subjects(&["Algorithms", "DB"]));
        let catalogue = vec![
            note("A", "Algorithms", "CS", None),
            note("B", "Networks", "CS", None),
            note("C", "DB", "CS", None),
        ];

        let visible = visible_notes(&student, catalogue);
        let titles: Vec<&str> = visible.iter().map(Note::title).collect();
        assert_eq!(titles, ["A", "C"]);
    }

    #[test]
    fn student_with_no_subjects_sees_nothing() {
        let student = profile(Role::Student, "CS", Vec::new());
        let catalogue = vec![note("A", "Algorithms", "CS", None)];
        assert!(visible_notes(&student, catalogue).is_empty());
    }

    #[test]
    fn faculty_and_admin_see_full_catalogue_in_order() {
        let catalogue = vec![
            note("Newest", "Algorithms", "CS", None),
            note("Older", "Networks", "CS", None),
        ];

        for role in [Role::Faculty, Role::Admin] {
            let viewer = profile(role, "CS", Vec::new());
            let visible = visible_notes(&viewer, catalogue.clone());
            let titles: Vec<&str> = visible.iter().map(Note::title).collect();
            assert_eq!(titles, ["Newest", "Older"]);
        }
    }

    #[test]
    fn search_matches_title_description_and_uploader() {
        let notes = vec![
            note("Graph Theory", "Algorithms", "CS", Some("Grace Hopper")),
            note("Untitled", "Networks", "CS", Some("Alan Kay")),
        ];

        assert_eq!(filter_by_search(notes.clone(), "graph").len(), 1);
        assert_eq!(filter_by_search(notes.clone(), "HOPPER").len(), 1);
        assert_eq!(filter_by_search(notes.clone(), "kay").len(), 1);
        assert_eq!(filter_by_search(notes.clone(), "  ").len(), 2);
        assert!(filter_by_search(notes, "nonexistent").is_empty());
    }

    #[test]
    fn refinements_compose_by_conjunction() {
        let notes = vec![
            note("A", "Algorithms", "CS", None),
            note("B", "Algorithms", "Math", None),
            note("C", "Networks", "CS", None),
        ];

        let refined = filter_by_department(filter_by_subject(notes, "Algorithms"), "CS");
        let titles: Vec<&str> = refined.iter().map(Note::title).collect();
        assert_eq!(titles, ["A"]);
    }

    #[test]
    fn facets_are_unique_sorted_and_faculty_only() {
        let faculty_a = profile(Role::Faculty, "Math", subjects(&["Calculus", "Algebra"]));
        let faculty_b = profile(Role::Faculty, "CS", subjects(&["Algorithms", "Algebra"]));
        let student = profile(Role::Student, "Physics", subjects(&["Mechanics"]));

        let facets = available_filter_facets(&[faculty_a, faculty_b, student]);
        assert_eq!(facets.departments(), ["CS", "Math"]);
        assert_eq!(facets.subjects(), ["Algebra", "Algorithms", "Calculus"]);
    }

    proptest! {
        #[test]
        fn student_visibility_is_exactly_the_enrolled_subset(
            note_subjects in proptest::collection::vec(0usize..4, 0..24),
            enrolled in proptest::collection::btree_set(0usize..4, 0..4),
        ) {
            let pool = ["Algorithms", "DB", "Networks", "Compilers"];
            let catalogue: Vec<Note> = note_subjects
                .iter()
                .enumerate()
                .map(|(index, subject)| note(&format!("note-{index}"), pool[*subject], "CS", None))
                .collect();
            let student = profile(
                Role::Student,
                "CS",
                enrolled.iter().map(|index| pool[*index].to_owned()).collect(),
            );

            let visible = visible_notes(&student, catalogue.clone());

            // Exactly the catalogue entries with an enrolled subject, in order.
            let expected: Vec<&str> = catalogue
                .iter()
                .filter(|note| student.has_subject(note.subject()))
                .map(Note::title)
                .collect();
            let actual: Vec<&str> = visible.iter().map(Note::title).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn privileged_roles_see_catalogue_unchanged(
            note_subjects in proptest::collection::vec(0usize..4, 0..24),
        ) {
            let pool = ["Algorithms", "DB", "Networks", "Compilers"];
            let catalogue: Vec<Note> = note_subjects
                .iter()
                .enumerate()
                .map(|(index, subject)| note(&format!("note-{index}"), pool[*subject], "CS", None))
                .collect();

            for role in [Role::Faculty, Role::Admin] {
                let viewer = profile(role, "CS", Vec::new());
                prop_assert_eq!(visible_notes(&viewer, catalogue.clone()), catalogue.clone());
            }
        }
    }
}
