//! Per-request response forms.
//!
//! A form's stored fields are turned into a [`ResponseSchema`] each time it is rendered or
//! submitted, and submissions are checked against that schema in memory. Nothing here
//! touches the store.

mod answers;
mod schema;

pub use answers::{validate, Answer, AnswerValue, Submission};
pub use schema::{build, Question, QuestionKind, ResponseSchema};
