//! Schema-driven, mode-aware validation of a request record.

use std::fmt::Display;

use crate::{
    grouper::{ArrayGroups, group_array_fields},
    schema::{FieldRule, Schema},
    types::{FieldFamily, FieldValue, Record},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    Missing,
    TooLong(usize),
    PatternMismatch(String),
}

/// A single field-level problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub mode: Option<char>,
    pub kind: ValidationErrorKind,
    pub actual_value: Option<String>,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ValidationErrorKind::Missing => match self.mode {
                Some(mode) => write!(f, "Required field [{}] missing for mode [{}]", self.field, mode),
                None => write!(f, "Required field [{}] missing", self.field),
            },
            ValidationErrorKind::TooLong(limit) => write!(
                f,
                "Field [{}] has length [{}] which is longer than the maximum of [{}]",
                self.field,
                self.actual_value
                    .as_deref()
                    .map(|v| v.chars().count())
                    .unwrap_or_default(),
                limit
            ),
            ValidationErrorKind::PatternMismatch(pattern) => write!(
                f,
                "Field [{}] has value [{}] which does not match the pattern [{}]",
                self.field,
                self.actual_value.as_deref().unwrap_or_default(),
                pattern
            ),
        }
    }
}

/// All validation errors of one pass, reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport(pub Vec<ValidationError>);

impl ValidationReport {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.0
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Validate `record` against every rule of `schema`, in order.
///
/// Never short-circuits: the returned list holds every problem found. Whether a
/// non-empty list is fatal is for the caller to decide.
pub fn validate(
    record: &Record<FieldValue>,
    schema: &Schema,
    mode: Option<char>,
) -> Vec<ValidationError> {
    let groups = group_array_fields(record);
    let mut errors = Vec::new();

    for rule in schema.rules() {
        let family = FieldFamily::from_rule_name(&rule.name);

        if rule.required.applies_to(mode) && !is_present(record, &groups, &rule.name, family) {
            errors.push(ValidationError {
                field: rule.name.clone(),
                mode,
                kind: ValidationErrorKind::Missing,
                actual_value: None,
            });
        }

        if let Some(value) = record.get(&rule.name) {
            check_value(rule, &rule.name, value, mode, &mut errors);
        } else if let Some(family) = family {
            for key in groups.get(family) {
                if let Some(value) = record.get(key) {
                    check_value(rule, key, value, mode, &mut errors);
                }
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Validated {} fields against {} rules: {} errors",
        record.len(),
        schema.len(),
        errors.len()
    );

    errors
}

fn is_present(
    record: &Record<FieldValue>,
    groups: &ArrayGroups,
    name: &str,
    family: Option<FieldFamily>,
) -> bool {
    record.contains_key(name) || family.is_some_and(|family| groups.is_present(family))
}

fn check_value(
    rule: &FieldRule,
    field: &str,
    value: &FieldValue,
    mode: Option<char>,
    errors: &mut Vec<ValidationError>,
) {
    if rule.allow_empty && value.is_empty() {
        return;
    }

    let wire = value.to_wire();

    if let Some(limit) = rule.max_length {
        if value.char_len() > limit {
            errors.push(ValidationError {
                field: field.to_string(),
                mode,
                kind: ValidationErrorKind::TooLong(limit),
                actual_value: Some(wire.clone()),
            });
        }
    }

    if let Some(pattern) = &rule.pattern {
        if !pattern.is_full_match(&wire) {
            errors.push(ValidationError {
                field: field.to_string(),
                mode,
                kind: ValidationErrorKind::PatternMismatch(pattern.as_str().to_string()),
                actual_value: Some(wire),
            });
        }
    }
}
