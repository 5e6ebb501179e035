//! Shared fixtures for unit tests.
//!
//! Experiment "1" has a Control cohort ("1") and an Intervention cohort
//! ("2"), a pre assessment ("1") and a post assessment ("2") with the same
//! three questions each, and four participants who took both.

use crate::memory::MemoryStore;
use crate::model::{
    Assessment, AssessmentKind, Choice, Cohort, Experiment, InputKind, Participant,
    Participation, Question,
};

pub(crate) fn participation(assessment: &str, participant: &str, answers: &str) -> Participation {
    Participation {
        experiment_id: "1".into(),
        assessment_id: assessment.into(),
        participant_id: participant.into(),
        answers: Some(answers.into()),
        demographics: None,
    }
}

pub(crate) fn question(id: &str, assessment: &str, text: &str, kind: InputKind) -> Question {
    Question {
        id: id.into(),
        assessment_id: assessment.into(),
        text: text.into(),
        kind,
    }
}

pub(crate) fn choice(id: &str, question: &str, is_correct: bool) -> Choice {
    Choice {
        id: id.into(),
        question_id: question.into(),
        text: format!("choice {id}"),
        is_correct,
    }
}

/// Experiment "1" with its two cohorts and its pre and post assessments.
pub(crate) fn seed_cohorts(store: &MemoryStore) {
    store.insert_experiment(Experiment {
        id: "1".into(),
        name: "Fractions workshop".into(),
        description: String::new(),
        created_at: None,
    });

    for (id, name) in [("1", "Control"), ("2", "Intervention")] {
        store.insert_cohort(Cohort {
            id: id.into(),
            experiment_id: "1".into(),
            name: name.into(),
        });
    }

    for (id, kind) in [("1", AssessmentKind::Pre), ("2", AssessmentKind::Post)] {
        store.insert_assessment(Assessment {
            id: id.into(),
            experiment_id: "1".into(),
            kind,
            description: String::new(),
        });
    }
}

pub(crate) fn enroll(store: &MemoryStore, participant: &str, cohort: &str) {
    store.insert_participant(Participant {
        id: participant.into(),
        experiment_id: "1".into(),
        cohort_id: cohort.into(),
        access_token: format!("TOKEN-{participant}"),
    });
}

pub(crate) fn sample_store() -> MemoryStore {
    let store = MemoryStore::new();
    seed_cohorts(&store);

    // Pre: 1, 2, 3. Post: 4, 5, 6.
    for (offset, assessment) in [(0, "1"), (3, "2")] {
        store.insert_question(question(
            &(1 + offset).to_string(),
            assessment,
            "What is 2 + 2?",
            InputKind::SingleChoice,
        ));
        store.insert_question(question(
            &(2 + offset).to_string(),
            assessment,
            "Select every prime number",
            InputKind::MultipleChoice,
        ));
        store.insert_question(question(
            &(3 + offset).to_string(),
            assessment,
            "Explain your reasoning",
            InputKind::FreeText,
        ));
    }

    for (id, question, correct) in [
        ("1", "1", true),
        ("2", "1", false),
        ("3", "1", false),
        ("4", "2", true),
        ("5", "2", true),
        ("6", "2", false),
        ("7", "2", false),
        ("8", "4", true),
        ("9", "4", false),
        ("10", "4", false),
        ("11", "5", true),
        ("12", "5", true),
        ("13", "5", false),
        ("14", "5", false),
    ] {
        store.insert_choice(choice(id, question, correct));
    }

    for (id, cohort) in [("1", "1"), ("2", "1"), ("3", "2"), ("4", "2")] {
        enroll(&store, id, cohort);
    }

    for (assessment, participant, answers) in [
        ("1", "1", r#"{"1":["2"],"2":["4"],"3":["Words..."]}"#),
        ("1", "2", r#"{"1":["1"],"2":["4","6"]}"#),
        ("1", "3", r#"{"1":["3"],"2":["6","7"]}"#),
        ("1", "4", r#"{"1":["1"],"2":["4","5"]}"#),
        ("2", "1", r#"{"4":["8"],"5":["11"],"6":["More words"]}"#),
        ("2", "2", r#"{"4":["8"],"5":["11","12"]}"#),
        ("2", "3", r#"{"4":["8"],"5":["11","12"]}"#),
        ("2", "4", r#"{"4":["8"],"5":["11","12"]}"#),
    ] {
        store.upsert_participation(participation(assessment, participant, answers));
    }

    store
}
