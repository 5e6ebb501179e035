//! Per-question scoring of participations.
//!
//! Single-choice answers score 0 or 1. Multiple-choice answers earn `1/k`
//! per correct selection and lose `1/k` per incorrect one, where `k` is the
//! number of correct choices, never dropping below 0. Free-text answers are
//! never scored.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::{Result, ResultError};
use crate::loader::Dataset;
use crate::model::{compare_ids, Choice, InputKind};

/// Scores of one question keyed by cohort id.
///
/// Each list is ordered by participant id, so the list of a pre question and
/// the list of its matched post question line up slot by slot.
pub type CohortScores = BTreeMap<String, Vec<f64>>;

/// Score a single-choice answer.
pub fn score_single(choices: &[Choice], selected: &[String]) -> f64 {
    let [answer] = selected else {
        return 0.0;
    };
    let correct = choices.iter().any(|c| c.is_correct && &c.id == answer);
    if correct {
        1.0
    } else {
        0.0
    }
}

/// Score a multiple-choice answer in `[0, 1]`.
pub fn score_multiple(choices: &[Choice], selected: &[String]) -> f64 {
    let correct: HashSet<&str> = choices
        .iter()
        .filter(|c| c.is_correct)
        .map(|c| c.id.as_str())
        .collect();
    if correct.is_empty() {
        return 0.0;
    }

    let weight = 1.0 / correct.len() as f64;
    let selected: BTreeSet<&str> = selected.iter().map(String::as_str).collect();
    let score = selected.iter().fold(0.0, |acc, id| {
        if correct.contains(id) {
            acc + weight
        } else {
            acc - weight
        }
    });
    score.clamp(0.0, 1.0)
}

/// Score an answer according to the question kind. Free text yields `None`.
pub fn score_answer(kind: InputKind, choices: &[Choice], selected: &[String]) -> Option<f64> {
    match kind {
        InputKind::SingleChoice => Some(score_single(choices, selected)),
        InputKind::MultipleChoice => Some(score_multiple(choices, selected)),
        InputKind::FreeText => None,
    }
}

impl Dataset {
    /// Score every participation that answered `question_id`, grouped by
    /// the participant's cohort.
    ///
    /// A malformed answer payload anywhere in the experiment fails the whole
    /// query.
    pub fn question_score(&self, question_id: &str) -> Result<CohortScores> {
        let question = self
            .question(question_id)
            .ok_or_else(|| ResultError::QuestionNotFound(question_id.to_string()))?;
        let choices = self.choices(question_id);

        let mut scored: BTreeMap<String, Vec<(&str, f64)>> = BTreeMap::new();
        for participation in self.participations() {
            let Some(answers) = participation.answer_set()? else {
                continue;
            };
            let Some(selected) = answers.get(question_id) else {
                continue;
            };
            let Some(score) = score_answer(question.kind, choices, selected) else {
                continue;
            };

            let participant = self.participant(&participation.participant_id).ok_or_else(|| {
                ResultError::Integrity(format!(
                    "participation {} has no participant",
                    participation.key()
                ))
            })?;
            scored
                .entry(participant.cohort_id.clone())
                .or_default()
                .push((participant.id.as_str(), score));
        }

        Ok(scored
            .into_iter()
            .map(|(cohort_id, mut entries)| {
                entries.sort_by(|a, b| compare_ids(a.0, b.0));
                (cohort_id, entries.into_iter().map(|(_, s)| s).collect())
            })
            .collect())
    }
}
