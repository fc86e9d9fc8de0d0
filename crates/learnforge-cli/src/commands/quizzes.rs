//! The `learnforge quizzes` commands, talking to a running server.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use learnforge_core::parser::parse_quiz_response;

use super::read_input;
use crate::client::ApiClient;

pub async fn list(server: String, token: String) -> Result<()> {
    let mut client = ApiClient::new(&server, &token);
    let quizzes = client.list_quizzes().await?;

    if quizzes.is_empty() {
        println!("No saved quizzes.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Topic", "Questions", "Updated"]);
    for quiz in &quizzes {
        let count = quiz.parsed_questions().map(|q| q.len()).unwrap_or(0);
        table.add_row(vec![
            Cell::new(quiz.id),
            Cell::new(&quiz.title),
            Cell::new(&quiz.topic),
            Cell::new(count),
            Cell::new(&quiz.updated_at),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn push(
    server: String,
    token: String,
    input: PathBuf,
    topic: String,
    title: Option<String>,
) -> Result<()> {
    let raw = read_input(&input)?;
    let outcome = parse_quiz_response(&raw, &topic);
    if outcome.is_fallback() {
        eprintln!("Warning: response was not usable, saving fallback questions");
    }

    let title = title.unwrap_or_else(|| format!("{topic} Quiz"));
    let mut client = ApiClient::new(&server, &token);
    let quiz = client
        .create_quiz(&title, &topic, outcome.questions())
        .await?;

    println!(
        "Saved quiz {} \"{}\" with {} question(s)",
        quiz.id,
        quiz.title,
        outcome.questions().len()
    );
    Ok(())
}
