//! Raw answer counts per cohort: how often each choice of each question and
//! each demographic option was picked.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ResultError};
use crate::loader::Dataset;
use crate::traits::ExperimentStore;

/// Selection counts of one choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionTally {
    pub assessment_id: String,
    pub question_id: String,
    pub text: String,
    /// Choice ids, in choice order.
    pub choices: Vec<String>,
    /// One row per cohort (cohort order), one count per choice.
    pub counts: Vec<Vec<usize>>,
}

/// Pick counts of one demographic question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicTally {
    pub demographic_id: String,
    pub text: String,
    /// Option texts, in option order.
    pub options: Vec<String>,
    /// One row per cohort (cohort order), one count per option.
    pub counts: Vec<Vec<usize>>,
}

impl Dataset {
    /// Count, per cohort, the participations that selected each choice.
    ///
    /// Questions nobody selected a choice of are left out.
    pub fn choice_tally(&self) -> Result<Vec<QuestionTally>> {
        let cohort_index: HashMap<&str, usize> = self
            .cohorts()
            .enumerate()
            .map(|(i, c)| (c.id.as_str(), i))
            .collect();

        // (question, cohort position, choice) -> participations
        let mut selected: HashMap<(String, usize, String), usize> = HashMap::new();
        for participation in self.participations() {
            let Some(answers) = participation.answer_set()? else {
                continue;
            };
            let cohort = self
                .participant(&participation.participant_id)
                .and_then(|p| cohort_index.get(p.cohort_id.as_str()))
                .copied()
                .ok_or_else(|| ResultError::UnknownCohort(participation.key()))?;

            for (question_id, choices) in answers.iter() {
                let distinct: BTreeSet<&String> = choices.iter().collect();
                for choice_id in distinct {
                    *selected
                        .entry((question_id.clone(), cohort, choice_id.clone()))
                        .or_default() += 1;
                }
            }
        }

        let cohorts = cohort_index.len();
        let mut tallies = Vec::new();
        for question in self.questions().filter(|q| q.kind.has_choices()) {
            let choices = self.choices(&question.id);
            let counts: Vec<Vec<usize>> = (0..cohorts)
                .map(|cohort| {
                    choices
                        .iter()
                        .map(|choice| {
                            selected
                                .get(&(question.id.clone(), cohort, choice.id.clone()))
                                .copied()
                                .unwrap_or(0)
                        })
                        .collect()
                })
                .collect();

            if counts.iter().flatten().all(|&n| n == 0) {
                continue;
            }
            tallies.push(QuestionTally {
                assessment_id: question.assessment_id.clone(),
                question_id: question.id.clone(),
                text: question.text.clone(),
                choices: choices.iter().map(|c| c.id.clone()).collect(),
                counts,
            });
        }

        Ok(tallies)
    }

    /// Count, per cohort, the participants that picked each option of each
    /// demographic question of the experiment.
    pub fn demographics_breakdown(
        &self,
        store: &dyn ExperimentStore,
    ) -> Result<Vec<DemographicTally>> {
        let experiment_id = self.experiment_id();
        let demographics = store.find_demographics(experiment_id).map_err(|e| {
            ResultError::store(format!("find demographics of experiment {experiment_id}"), e)
        })?;

        let cohort_index: HashMap<&str, usize> = self
            .cohorts()
            .enumerate()
            .map(|(i, c)| (c.id.as_str(), i))
            .collect();

        // A participant answering on several assessments counts once.
        let mut picks: HashSet<(usize, &str, String, String)> = HashSet::new();
        for participation in self.participations() {
            let Some(answers) = participation.demographic_answers()? else {
                continue;
            };
            let Some(participant) = self.participant(&participation.participant_id) else {
                continue;
            };
            let cohort = cohort_index
                .get(participant.cohort_id.as_str())
                .copied()
                .ok_or_else(|| ResultError::UnknownCohort(participant.cohort_id.clone()))?;

            for (demographic_id, options) in answers.iter() {
                for option in options {
                    picks.insert((
                        cohort,
                        participant.id.as_str(),
                        demographic_id.clone(),
                        option.clone(),
                    ));
                }
            }
        }

        let mut counts: HashMap<(usize, &str, &str), usize> = HashMap::new();
        for (cohort, _, demographic_id, option) in &picks {
            *counts
                .entry((*cohort, demographic_id.as_str(), option.as_str()))
                .or_default() += 1;
        }

        let mut tallies = Vec::with_capacity(demographics.len());
        for demographic in demographics {
            let options = store.find_demographic_options(&demographic.id).map_err(|e| {
                ResultError::store(format!("find options of demographic {}", demographic.id), e)
            })?;
            let rows = (0..cohort_index.len())
                .map(|cohort| {
                    options
                        .iter()
                        .map(|o| {
                            counts
                                .get(&(cohort, demographic.id.as_str(), o.id.as_str()))
                                .copied()
                                .unwrap_or(0)
                        })
                        .collect()
                })
                .collect();

            tallies.push(DemographicTally {
                options: options.into_iter().map(|o| o.text).collect(),
                demographic_id: demographic.id,
                text: demographic.text,
                counts: rows,
            });
        }

        Ok(tallies)
    }
}
