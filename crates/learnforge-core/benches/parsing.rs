use criterion::{black_box, criterion_group, criterion_main, Criterion};

use learnforge_core::grading::grade;
use learnforge_core::parser::parse_quiz_response;

fn bench_parse_quiz(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_quiz_response");

    let json_fenced = format!("Here is your quiz:\n```json\n{}\n```\n", generate_json(10));
    let json_object = format!("{{\"title\": \"Bench\", \"questions\": {}}}", generate_json(10));
    let text_small = generate_text(5);
    let text_large = generate_text(40);
    let garbage = "I'm sorry, I can't produce a quiz on that topic right now. ".repeat(50);

    group.bench_function("json_fenced", |b| {
        b.iter(|| parse_quiz_response(black_box(&json_fenced), black_box("bench")))
    });

    group.bench_function("json_object", |b| {
        b.iter(|| parse_quiz_response(black_box(&json_object), black_box("bench")))
    });

    group.bench_function("text_5_questions", |b| {
        b.iter(|| parse_quiz_response(black_box(&text_small), black_box("bench")))
    });

    group.bench_function("text_40_questions", |b| {
        b.iter(|| parse_quiz_response(black_box(&text_large), black_box("bench")))
    });

    group.bench_function("fallback", |b| {
        b.iter(|| parse_quiz_response(black_box(&garbage), black_box("python")))
    });

    group.finish();
}

fn bench_grading(c: &mut Criterion) {
    let questions = parse_quiz_response(&generate_text(10), "bench").into_questions();
    let answers: Vec<String> = (0..10).map(|i| ["A", "B", "C", "D"][i % 4].to_string()).collect();

    c.bench_function("grade_10", |b| {
        b.iter(|| grade(black_box(&questions), black_box(&answers)))
    });
}

fn generate_json(n: usize) -> String {
    let items: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"question": "Question number {i}?", "options": ["one {i}", "two {i}", "three {i}", "four {i}"], "correctAnswer": "B", "explanation": "Because [{i}]"}}"#
            )
        })
        .collect();
    format!("[{}]", items.join(",\n"))
}

fn generate_text(n: usize) -> String {
    let mut s = String::from("Sure! Here's a quiz.\n\n");
    for i in 1..=n {
        s.push_str(&format!(
            "**Question {i}:** What is fact {i}?\nA) first\nB) second\nC) third\nD) fourth\n**Correct Answer:** B\nExplanation: second is right.\n\n"
        ));
    }
    s
}

criterion_group!(benches, bench_parse_quiz, bench_grading);
criterion_main!(benches);
