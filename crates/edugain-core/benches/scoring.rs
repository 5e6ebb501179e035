use criterion::{black_box, criterion_group, criterion_main, Criterion};

use edugain_core::loader::Dataset;
use edugain_core::memory::MemoryStore;
use edugain_core::model::{
    Assessment, AssessmentKind, Choice, Cohort, InputKind, Participant, Participation, Question,
};
use edugain_core::scoring::score_multiple;

/// Two cohorts of `per_cohort` participants answering ten multiple-choice
/// questions before and after.
fn classroom(per_cohort: usize) -> MemoryStore {
    let store = MemoryStore::new();
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

    for q in 0..20 {
        let assessment = if q < 10 { "1" } else { "2" };
        store.insert_question(Question {
            id: q.to_string(),
            assessment_id: assessment.into(),
            text: format!("Question {}", q % 10),
            kind: InputKind::MultipleChoice,
        });
        for c in 0..4 {
            store.insert_choice(Choice {
                id: format!("{q}-{c}"),
                question_id: q.to_string(),
                text: format!("Option {c}"),
                is_correct: c < 2,
            });
        }
    }

    for p in 0..per_cohort * 2 {
        let cohort = if p % 2 == 0 { "1" } else { "2" };
        store.insert_participant(Participant {
            id: p.to_string(),
            experiment_id: "1".into(),
            cohort_id: cohort.into(),
            access_token: String::new(),
        });
        for (assessment, questions) in [("1", 0..10), ("2", 10..20)] {
            let answers: Vec<String> = questions
                .map(|q| format!(r#""{q}":["{q}-{}","{q}-{}"]"#, p % 4, (p + 1) % 4))
                .collect();
            store.upsert_participation(Participation {
                experiment_id: "1".into(),
                assessment_id: assessment.into(),
                participant_id: p.to_string(),
                answers: Some(format!("{{{}}}", answers.join(","))),
                demographics: None,
            });
        }
    }
    store
}

fn bench_score_multiple(c: &mut Criterion) {
    let choices: Vec<Choice> = (0..6)
        .map(|i| Choice {
            id: i.to_string(),
            question_id: "q".into(),
            text: String::new(),
            is_correct: i % 2 == 0,
        })
        .collect();
    let selected: Vec<String> = ["0", "1", "2", "4"].iter().map(|s| s.to_string()).collect();

    c.bench_function("score_multiple", |b| {
        b.iter(|| score_multiple(black_box(&choices), black_box(&selected)))
    });
}

fn bench_question_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("question_score");

    for per_cohort in [25, 250] {
        let store = classroom(per_cohort);
        let dataset = Dataset::load(&store, "1").unwrap();
        group.bench_function(format!("participants={}", per_cohort * 2), |b| {
            b.iter(|| dataset.question_score(black_box("3")).unwrap())
        });
    }

    group.finish();
}

fn bench_comparison_pairs(c: &mut Criterion) {
    let store = classroom(50);
    let dataset = Dataset::load(&store, "1").unwrap();

    c.bench_function("comparison_pairs", |b| {
        b.iter(|| black_box(&dataset).comparison_pairs())
    });
}

criterion_group!(
    benches,
    bench_score_multiple,
    bench_question_score,
    bench_comparison_pairs
);
criterion_main!(benches);
