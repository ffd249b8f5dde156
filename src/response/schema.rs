use log::debug;
use serde::{Deserialize, Serialize};

use crate::db::models::{Field, FieldKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    Boolean,
    Integer,
}

/// One required input of a response form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub field_id: i64,
    pub label: String,
    pub kind: QuestionKind,
    pub help_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub questions: Vec<Question>,
}

impl ResponseSchema {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// One question per field, in the order given. Fields of unrecognized kind are skipped.
pub fn build(fields: &[Field]) -> ResponseSchema {
    let questions = fields
        .iter()
        .filter_map(|field| {
            let kind = match &field.kind {
                FieldKind::Boolean => QuestionKind::Boolean,
                FieldKind::Integer => QuestionKind::Integer,
                FieldKind::Unrecognized(code) => {
                    debug!("Skipping field {} with unrecognized kind '{code}'", field.id);
                    return None;
                }
            };
            Some(Question {
                field_id: field.id,
                label: field.label.clone(),
                kind,
                help_text: field.description.clone(),
            })
        })
        .collect();

    ResponseSchema { questions }
}
