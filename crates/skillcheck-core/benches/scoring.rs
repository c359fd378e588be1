use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skillcheck_core::model::{Language, Question, SkillLevel, TestDefinition};
use skillcheck_core::scoring::{percentage, ScoreCard};
use skillcheck_core::session::{SessionConfig, TestSession};
use skillcheck_core::traits::SystemClock;

fn make_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            id: format!("bench-{i}"),
            language: Language::Rust,
            difficulty: SkillLevel::Advanced,
            prompt: String::new(),
            code: None,
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: i % 4,
            estimated_time: None,
            created_by: None,
        })
        .collect()
}

fn bench_percentage(c: &mut Criterion) {
    c.bench_function("percentage", |b| {
        b.iter(|| percentage(black_box(37), black_box(53)))
    });
}

fn bench_grade(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade");

    for n in [10usize, 100, 1000] {
        let questions = make_questions(n);
        let answers: Vec<Option<usize>> = (0..n)
            .map(|i| if i % 3 == 0 { None } else { Some(i % 4) })
            .collect();
        group.bench_function(format!("n={n}"), |b| {
            b.iter(|| ScoreCard::grade(black_box(&questions), black_box(&answers)))
        });
    }

    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let questions = make_questions(50);
    c.bench_function("session_answer_all_and_finish", |b| {
        b.iter(|| {
            let definition = TestDefinition::Standard {
                language: Language::Rust,
                level: SkillLevel::Advanced,
                questions: questions.clone(),
            };
            let mut session = TestSession::initialize(
                definition,
                "bench",
                Arc::new(SystemClock),
                &SessionConfig::default(),
            )
            .unwrap();
            session.start().unwrap();
            for i in 0..50 {
                session.select_answer(i % 4).unwrap();
                session.next().unwrap();
            }
            black_box(session.result().map(|r| r.score))
        })
    });
}

criterion_group!(benches, bench_percentage, bench_grade, bench_session);
criterion_main!(benches);
