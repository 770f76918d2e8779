use std::rc::Rc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use quizcraft::catalog::{Difficulty, Grade};
use quizcraft::session::question::QuizQuestion;
use quizcraft::store::kv::{KeyValueStore, MemoryStore};
use quizcraft::store::question_bank::QuestionBank;

fn make_questions(count: usize, offset: usize) -> Vec<QuizQuestion> {
    (0..count)
        .map(|i| QuizQuestion::MultipleChoice {
            question: format!("Question {} about the town?", i + offset),
            options: vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string(),
            ],
            correct_answer: "c".to_string(),
        })
        .collect()
}

/// A bank with `per_group` questions in each (grade, difficulty) group.
fn seeded_bank(per_group: usize) -> QuestionBank {
    let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
    let bank = QuestionBank::new(store);
    let mut offset = 0;
    for grade in Grade::ALL {
        for difficulty in Difficulty::ALL {
            bank.append(&make_questions(per_group, offset), grade, "My Town", difficulty);
            offset += per_group;
        }
    }
    bank
}

fn bench_append(c: &mut Criterion) {
    let batch = make_questions(10, 100_000);

    c.bench_function("append 10 into bank of 360", |b| {
        b.iter_with_setup(
            || seeded_bank(30),
            |bank| bank.append(black_box(&batch), Grade::Seven, "Sports", Difficulty::Hard),
        )
    });

    c.bench_function("append 10 duplicates into bank of 360", |b| {
        let bank = seeded_bank(30);
        let duplicates = make_questions(10, 0);
        b.iter(|| bank.append(black_box(&duplicates), Grade::Five, "My Town", Difficulty::Easy))
    });
}

fn bench_get_filtered(c: &mut Criterion) {
    let bank = seeded_bank(30);

    c.bench_function("get_filtered over 360 records", |b| {
        b.iter(|| bank.get_filtered(black_box(Grade::Six), black_box(Difficulty::Medium)))
    });

    c.bench_function("count_filtered over 360 records", |b| {
        b.iter(|| bank.count_filtered(black_box(Grade::Eight), black_box(Difficulty::Easy)))
    });
}

criterion_group!(benches, bench_append, bench_get_filtered);
criterion_main!(benches);
