//! learnforge-core: Quiz model, response parsing, and generation plumbing.
//!
//! This crate defines the data model shared by the store, server and client,
//! the parser that turns free-form model output into quiz questions, and the
//! retrying gateway in front of a generative-language provider.

pub mod cache;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod grading;
pub mod learning_path;
pub mod model;
pub mod parser;
pub mod prompts;
pub mod traits;
