//! Per-cohort score columns for one matched question group.
//!
//! Each (assessment, question) entry of the group contributes one column per
//! cohort, headed `<assessment kind>_<cohort name>` (e.g. `pre_control`).
//! Columns can be exported as CSV or reinterpreted as aligned stats rows.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ResultError};
use crate::loader::Dataset;
use crate::model::AssessmentKind;
use crate::pairing::AssessmentQuestion;

/// Where a column comes from: the assessment kind and the position of the
/// cohort in the comparison's cohort list (0 is control, 1 intervention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRole {
    pub kind: AssessmentKind,
    pub cohort: usize,
}

/// One column of scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub header: String,
    #[serde(default)]
    pub role: Option<ColumnRole>,
    pub scores: Vec<f64>,
}

/// Score columns of one matched question group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comparison {
    columns: Vec<Column>,
    rows: usize,
}

/// One aligned slot of the four canonical columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRow {
    pub pre_control: f64,
    pub post_control: f64,
    pub pre_intervention: f64,
    pub post_intervention: f64,
}

const CANONICAL: [(&str, AssessmentKind, usize); 4] = [
    ("pre_control", AssessmentKind::Pre, 0),
    ("post_control", AssessmentKind::Post, 0),
    ("pre_intervention", AssessmentKind::Pre, 1),
    ("post_intervention", AssessmentKind::Post, 1),
];

impl Comparison {
    /// Build the columns of `group` for the given cohorts, in order.
    pub fn new(dataset: &Dataset, group: &[AssessmentQuestion], cohorts: &[String]) -> Result<Self> {
        let mut comparison = Comparison::default();

        for entry in group {
            let assessment = dataset
                .assessment(&entry.assessment_id)
                .ok_or_else(|| ResultError::UnknownAssessment(entry.assessment_id.clone()))?;
            if let Some(question) = dataset.question(&entry.question_id) {
                tracing::debug!(
                    question = %entry.question_id,
                    text = %question.text,
                    "comparing question"
                );
            }
            let mut scores = dataset.question_score(&entry.question_id)?;

            for (position, cohort_id) in cohorts.iter().enumerate() {
                let cohort = dataset
                    .cohort(cohort_id)
                    .ok_or_else(|| ResultError::UnknownCohort(cohort_id.clone()))?;
                let header = format!("{}_{}", assessment.kind, cohort.name.to_lowercase());
                comparison.push(
                    header,
                    Some(ColumnRole {
                        kind: assessment.kind,
                        cohort: position,
                    }),
                    scores.remove(cohort_id).unwrap_or_default(),
                )?;
            }
        }

        Ok(comparison)
    }

    /// Build a comparison from headed columns.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut comparison = Comparison::default();
        for (header, scores) in columns {
            comparison.push(header.into(), None, scores)?;
        }
        Ok(comparison)
    }

    /// Append a column. Headers are unique within a comparison.
    pub fn push(&mut self, header: String, role: Option<ColumnRole>, scores: Vec<f64>) -> Result<()> {
        if self.columns.iter().any(|c| c.header == header) {
            return Err(ResultError::DuplicateHeader(header));
        }
        self.rows = self.rows.max(scores.len());
        self.columns.push(Column {
            header,
            role,
            scores,
        });
        Ok(())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.header.as_str())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, header: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.header == header)
            .map(|c| c.scores.as_slice())
    }

    /// Length of the longest column.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Render as CSV: the header row, then one row per slot with scores
    /// to two decimals and blanks past the end of shorter columns.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        let headers: Vec<String> = self.columns.iter().map(|c| csv_field(&c.header)).collect();
        csv.push_str(&headers.join(","));
        csv.push('\n');

        for row in 0..self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| {
                    c.scores
                        .get(row)
                        .map(|score| format!("{score:.2}"))
                        .unwrap_or_default()
                })
                .collect();
            csv.push_str(&cells.join(","));
            csv.push('\n');
        }
        csv
    }

    /// Align the four canonical columns slot by slot.
    ///
    /// Columns are found by role, falling back to the canonical header
    /// names. Only slots present in all four columns are kept.
    pub fn to_stats_data(&self) -> Result<Vec<StatsRow>> {
        let mut found: Vec<&[f64]> = Vec::with_capacity(CANONICAL.len());
        for (header, kind, cohort) in CANONICAL {
            let column = self
                .columns
                .iter()
                .find(|c| c.role == Some(ColumnRole { kind, cohort }))
                .or_else(|| self.columns.iter().find(|c| c.header == header))
                .ok_or_else(|| ResultError::MissingColumn(header.to_string()))?;
            found.push(&column.scores);
        }

        let complete = found.iter().map(|c| c.len()).min().unwrap_or(0);
        if complete < self.rows {
            tracing::debug!(
                rows = self.rows,
                complete,
                "dropping slots missing from some columns"
            );
        }

        Ok((0..complete)
            .map(|i| StatsRow {
                pre_control: found[0][i],
                post_control: found[1][i],
                pre_intervention: found[2][i],
                post_intervention: found[3][i],
            })
            .collect())
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Column order of a stats CSV without canonical headers.
const STATS_CSV_ORDER: [&str; 4] = [
    "pre_control",
    "pre_intervention",
    "post_control",
    "post_intervention",
];

/// Read stats rows from a comparison CSV.
///
/// The first line is a header. When it names all four canonical columns,
/// cells are read by header; otherwise columns are, in order: pre control,
/// pre intervention, post control, post intervention. Rows with a blank
/// cell are skipped.
pub fn parse_stats_csv(content: &str) -> Result<Vec<StatsRow>> {
    let mut lines = content.lines().enumerate();
    let header: Vec<&str> = lines
        .next()
        .map(|(_, line)| line.split(',').map(str::trim).collect())
        .unwrap_or_default();

    // Index of each STATS_CSV_ORDER column within a row.
    let mut positions = [0, 1, 2, 3];
    let named: Option<Vec<usize>> = STATS_CSV_ORDER
        .iter()
        .map(|name| header.iter().position(|h| h == name))
        .collect();
    if let Some(named) = named {
        positions.copy_from_slice(&named);
    }
    let width = positions.iter().max().map_or(4, |&p| p + 1);

    let mut rows = Vec::new();
    for (index, line) in lines {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() < width {
            return Err(ResultError::Csv {
                line: line_no,
                message: format!("expected {width} columns, found {}", cells.len()),
            });
        }
        if positions.iter().any(|&p| cells[p].is_empty()) {
            continue;
        }

        let mut values = [0.0f64; 4];
        for (value, &p) in values.iter_mut().zip(&positions) {
            let cell = cells[p];
            *value = cell.parse().map_err(|_| ResultError::Csv {
                line: line_no,
                message: format!("not a number: {cell:?}"),
            })?;
        }

        rows.push(StatsRow {
            pre_control: values[0],
            pre_intervention: values[1],
            post_control: values[2],
            post_intervention: values[3],
        });
    }

    Ok(rows)
}
