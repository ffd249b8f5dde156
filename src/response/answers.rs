use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::{QuestionKind, ResponseSchema};
use crate::error::ValidationErrors;

/// Raw answers keyed by question label.
pub type Submission = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Boolean(bool),
    Integer(i64),
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Boolean(true) => f.write_str("Yes"),
            AnswerValue::Boolean(false) => f.write_str("No"),
            AnswerValue::Integer(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub label: String,
    pub answer: AnswerValue,
}

const REQUIRED: &str = "This field is required.";
const INVALID_BOOLEAN: &str = "Enter a valid boolean.";
const INVALID_INTEGER: &str = "Enter a whole number.";

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn parse_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Some(true),
            "false" | "off" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Check a submission against `schema`.
///
/// Every question is checked, so a failed submission reports all offending labels at once.
/// Keys that match no question are ignored.
pub fn validate(
    schema: &ResponseSchema,
    submitted: &Submission,
) -> Result<Vec<Answer>, ValidationErrors> {
    let mut answers = Vec::with_capacity(schema.questions.len());
    let mut errors = ValidationErrors::new();

    for question in &schema.questions {
        let raw = match submitted.get(&question.label) {
            Some(value) if !is_blank(value) => value,
            _ => {
                errors.add(&question.label, REQUIRED);
                continue;
            }
        };

        let parsed = match question.kind {
            QuestionKind::Boolean => parse_boolean(raw).map(AnswerValue::Boolean),
            QuestionKind::Integer => parse_integer(raw).map(AnswerValue::Integer),
        };

        match parsed {
            Some(answer) => answers.push(Answer {
                label: question.label.clone(),
                answer,
            }),
            None => {
                let message = match question.kind {
                    QuestionKind::Boolean => INVALID_BOOLEAN,
                    QuestionKind::Integer => INVALID_INTEGER,
                };
                errors.add(&question.label, message);
            }
        }
    }

    errors.into_result()?;
    Ok(answers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Field, FieldKind};
    use crate::response::build;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn survey_schema() -> ResponseSchema {
        build(&[
            Field {
                id: 1,
                form_id: 1,
                label: "Subscribed?".into(),
                kind: FieldKind::Boolean,
                description: None,
            },
            Field {
                id: 2,
                form_id: 1,
                label: "Age".into(),
                kind: FieldKind::Integer,
                description: Some("In whole years".into()),
            },
        ])
    }

    fn submission(value: Value) -> Submission {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn valid_submission_yields_answers_in_schema_order() {
        let answers = validate(
            &survey_schema(),
            &submission(json!({ "Age": "33", "Subscribed?": true })),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&answers).unwrap(),
            json!([
                { "label": "Subscribed?", "answer": true },
                { "label": "Age", "answer": 33 },
            ])
        );
    }

    #[test]
    fn bad_integer_fails_only_that_question() {
        let errors = validate(
            &survey_schema(),
            &submission(json!({ "Subscribed?": true, "Age": "abc" })),
        )
        .unwrap_err();

        assert_eq!(errors.fields(), ["Age"]);
        assert_eq!(errors.messages_for("Age"), [INVALID_INTEGER]);
    }

    #[test]
    fn missing_and_blank_answers_are_required() {
        let errors = validate(&survey_schema(), &submission(json!({ "Age": "  " }))).unwrap_err();
        assert_eq!(errors.fields(), ["Subscribed?", "Age"]);
        assert_eq!(errors.messages_for("Subscribed?"), [REQUIRED]);
    }

    #[test]
    fn boolean_like_inputs() {
        for (raw, expected) in [
            (json!(false), false),
            (json!("on"), true),
            (json!("No"), false),
            (json!(1), true),
            (json!("0"), false),
        ] {
            let answers = validate(
                &survey_schema(),
                &submission(json!({ "Subscribed?": raw, "Age": 40 })),
            )
            .unwrap();
            assert_eq!(answers[0].answer, AnswerValue::Boolean(expected));
        }

        let errors = validate(
            &survey_schema(),
            &submission(json!({ "Subscribed?": "maybe", "Age": 40 })),
        )
        .unwrap_err();
        assert_eq!(errors.messages_for("Subscribed?"), [INVALID_BOOLEAN]);
    }

    #[test]
    fn integer_rejects_fractions_and_overflow() {
        for raw in [json!(2.5), json!("99999999999999999999"), json!([1])] {
            let errors = validate(
                &survey_schema(),
                &submission(json!({ "Subscribed?": true, "Age": raw })),
            )
            .unwrap_err();
            assert_eq!(errors.fields(), ["Age"]);
        }

        let answers = validate(
            &survey_schema(),
            &submission(json!({ "Subscribed?": true, "Age": " -7 " })),
        )
        .unwrap();
        assert_eq!(answers[1].answer, AnswerValue::Integer(-7));
    }

    #[test]
    fn answers_render_for_humans() {
        assert_eq!(AnswerValue::Boolean(true).to_string(), "Yes");
        assert_eq!(AnswerValue::Integer(33).to_string(), "33");
    }
}
