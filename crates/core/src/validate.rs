//! Structural comparison of an actual response against an expected template.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::HttpResponse;
use crate::template::{IGNORE_MARKER, NOT_EMPTY_MARKER};

/// How fields present in the actual body but absent from the template are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Extra actual fields are tolerated.
    #[default]
    Lenient,
    /// Extra actual fields are reported as mismatches.
    Strict,
}

/// Expected status plus the rendered expected-response body.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedResponse {
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyDiff {
    Missing,
    Unexpected,
    ValueDiffers { expected: Value, actual: Value },
    TypeDiffers {
        expected: &'static str,
        actual: &'static str,
    },
    LengthDiffers { expected: usize, actual: usize },
    Empty,
    NotJson,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    StatusMismatch { expected: u16, actual: u16 },
    BodyMismatch { path: String, diff: BodyDiff },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusMismatch { expected, actual } => {
                write!(f, "status: expected {expected}, got {actual}")
            }
            Self::BodyMismatch { path, diff } => match diff {
                BodyDiff::Missing => write!(f, "{path}: missing"),
                BodyDiff::Unexpected => write!(f, "{path}: unexpected field"),
                BodyDiff::ValueDiffers { expected, actual } => {
                    write!(f, "{path}: expected {expected}, got {actual}")
                }
                BodyDiff::TypeDiffers { expected, actual } => {
                    write!(f, "{path}: expected {expected}, got {actual}")
                }
                BodyDiff::LengthDiffers { expected, actual } => {
                    write!(f, "{path}: expected {expected} elements, got {actual}")
                }
                BodyDiff::Empty => write!(f, "{path}: expected a non-empty value"),
                BodyDiff::NotJson => write!(f, "{path}: body is not JSON"),
            },
        }
    }
}

/// Outcome of one validation. Mismatches are collected, never short-circuited.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub passed: bool,
    pub mismatches: Vec<Mismatch>,
}

impl ValidationResult {
    fn from_mismatches(mismatches: Vec<Mismatch>) -> Self {
        Self {
            passed: mismatches.is_empty(),
            mismatches,
        }
    }

    pub fn status_mismatch(&self) -> Option<(u16, u16)> {
        self.mismatches.iter().find_map(|m| match m {
            Mismatch::StatusMismatch { expected, actual } => Some((*expected, *actual)),
            Mismatch::BodyMismatch { .. } => None,
        })
    }

    pub fn body_mismatches(&self) -> impl Iterator<Item = &Mismatch> {
        self.mismatches
            .iter()
            .filter(|m| matches!(m, Mismatch::BodyMismatch { .. }))
    }

    /// One line per mismatch.
    pub fn summary(&self) -> String {
        self.mismatches
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    mode: MatchMode,
}

impl Validator {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    pub fn validate(&self, expected: &ExpectedResponse, actual: &HttpResponse) -> ValidationResult {
        let mut mismatches = Vec::new();
        if expected.status != actual.status {
            mismatches.push(Mismatch::StatusMismatch {
                expected: expected.status,
                actual: actual.status,
            });
        }

        if !is_ignore(&expected.body) {
            match actual.json() {
                Some(body) => self.compare(&expected.body, &body, "$", &mut mismatches),
                None => mismatches.push(Mismatch::BodyMismatch {
                    path: "$".into(),
                    diff: BodyDiff::NotJson,
                }),
            }
        }

        ValidationResult::from_mismatches(mismatches)
    }

    pub fn compare_bodies(&self, expected: &Value, actual: &Value) -> ValidationResult {
        let mut mismatches = Vec::new();
        self.compare(expected, actual, "$", &mut mismatches);
        ValidationResult::from_mismatches(mismatches)
    }

    fn compare(&self, expected: &Value, actual: &Value, path: &str, out: &mut Vec<Mismatch>) {
        match (expected, actual) {
            (Value::String(marker), _) if marker == IGNORE_MARKER => {}
            (Value::String(marker), _) if marker == NOT_EMPTY_MARKER => {
                if is_empty(actual) {
                    out.push(body_mismatch(path, BodyDiff::Empty));
                }
            }
            (Value::Object(want), Value::Object(got)) => {
                for (key, want_value) in want {
                    let child = format!("{path}.{key}");
                    match got.get(key) {
                        Some(got_value) => self.compare(want_value, got_value, &child, out),
                        None if is_ignore(want_value) => {}
                        None => out.push(body_mismatch(&child, BodyDiff::Missing)),
                    }
                }
                if self.mode == MatchMode::Strict {
                    for key in got.keys().filter(|k| !want.contains_key(*k)) {
                        out.push(body_mismatch(&format!("{path}.{key}"), BodyDiff::Unexpected));
                    }
                }
            }
            (Value::Array(want), Value::Array(got)) => {
                if want.len() != got.len() {
                    out.push(body_mismatch(
                        path,
                        BodyDiff::LengthDiffers {
                            expected: want.len(),
                            actual: got.len(),
                        },
                    ));
                }
                for (i, (w, g)) in want.iter().zip(got).enumerate() {
                    self.compare(w, g, &format!("{path}[{i}]"), out);
                }
            }
            (want, got) if type_name(want) != type_name(got) => out.push(body_mismatch(
                path,
                BodyDiff::TypeDiffers {
                    expected: type_name(want),
                    actual: type_name(got),
                },
            )),
            (want, got) if want != got => out.push(body_mismatch(
                path,
                BodyDiff::ValueDiffers {
                    expected: want.clone(),
                    actual: got.clone(),
                },
            )),
            _ => {}
        }
    }
}

fn body_mismatch(path: &str, diff: BodyDiff) -> Mismatch {
    Mismatch::BodyMismatch {
        path: path.to_string(),
        diff,
    }
}

fn is_ignore(value: &Value) -> bool {
    value.as_str() == Some(IGNORE_MARKER)
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
