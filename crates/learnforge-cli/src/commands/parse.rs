//! The `learnforge parse` command.

use std::path::PathBuf;

use anyhow::Result;

use learnforge_core::parser::parse_quiz_response;

use super::{print_outcome, read_input};

pub fn execute(input: PathBuf, topic: String, format: String) -> Result<()> {
    let raw = read_input(&input)?;
    let outcome = parse_quiz_response(&raw, &topic);
    print_outcome(&outcome, &format)
}
