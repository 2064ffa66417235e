//! Validation schema: an ordered list of field rules loaded from a JSON document.
//!
//! Rules are data, not code. Each entry of the source document looks like
//!
//! ```json
//! { "name": "PTOK", "required": ["Q", "P"], "maxLength": 32, "pattern": "[0-9A-Za-z]*", "allowEmpty": true }
//! ```
//!
//! `required` is either a boolean or the list of modes the field is required in.

use std::{collections::BTreeSet, io::Read, path::Path, sync::OnceLock};

use bon::Builder;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::SchemaLoadError;

const BUNDLED_SCHEMA: &str = include_str!("../resources/validate.json");

/// Raw rule as it appears in the schema document.
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[builder(into)]
    pub name: String,

    #[serde(default = "FieldRequired::never")]
    #[builder(default = FieldRequired::never())]
    pub required: FieldRequired,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub pattern: Option<String>,

    #[serde(default)]
    #[builder(default)]
    pub allow_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldRequired {
    Boolean(bool),
    VecString(Vec<String>),
}

impl FieldRequired {
    fn never() -> Self {
        FieldRequired::Boolean(false)
    }
}

/// Which transaction modes make a field mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredModes {
    Always,
    Never,
    Modes(BTreeSet<char>),
}

impl RequiredModes {
    /// Whether the field is required for `mode`. An empty mode set never requires.
    pub fn applies_to(&self, mode: Option<char>) -> bool {
        match self {
            RequiredModes::Always => true,
            RequiredModes::Never => false,
            RequiredModes::Modes(modes) => mode.is_some_and(|m| modes.contains(&m)),
        }
    }
}

/// A compiled field rule.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: String,
    pub required: RequiredModes,
    pub max_length: Option<usize>,
    pub pattern: Option<FieldPattern>,
    /// Empty values skip length and pattern checks.
    pub allow_empty: bool,
}

/// A pattern that must match the whole value.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    source: String,
    regex: Regex,
}

impl FieldPattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(FieldPattern {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the schema.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_full_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl TryFrom<FieldDefinition> for FieldRule {
    type Error = SchemaLoadError;

    fn try_from(definition: FieldDefinition) -> Result<Self, Self::Error> {
        let required = match definition.required {
            FieldRequired::Boolean(true) => RequiredModes::Always,
            FieldRequired::Boolean(false) => RequiredModes::Never,
            FieldRequired::VecString(modes) => {
                let mut set = BTreeSet::new();
                for mode in modes {
                    let mut chars = mode.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => {
                            set.insert(c);
                        }
                        _ => {
                            return Err(SchemaLoadError::InvalidMode {
                                field: definition.name,
                                mode,
                            });
                        }
                    }
                }
                if set.is_empty() {
                    RequiredModes::Never
                } else {
                    RequiredModes::Modes(set)
                }
            }
        };

        let pattern = definition
            .pattern
            .as_deref()
            .map(FieldPattern::new)
            .transpose()
            .map_err(|source| SchemaLoadError::InvalidPattern {
                field: definition.name.clone(),
                source,
            })?;

        Ok(FieldRule {
            name: definition.name,
            required,
            max_length: definition.max_length,
            pattern,
            allow_empty: definition.allow_empty,
        })
    }
}

/// Ordered, immutable set of field rules.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = FieldDefinition>,
    ) -> Result<Self, SchemaLoadError> {
        let rules = definitions
            .into_iter()
            .enumerate()
            .map(|(index, definition)| {
                if definition.name.is_empty() {
                    return Err(SchemaLoadError::EmptyName { index });
                }
                FieldRule::try_from(definition)
            })
            .collect::<Result<Vec<_>, _>>()?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Loaded validation schema with {} rules", rules.len());

        Ok(Schema { rules })
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaLoadError> {
        let definitions: Vec<FieldDefinition> = serde_json::from_str(json)?;
        Self::from_definitions(definitions)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SchemaLoadError> {
        let definitions: Vec<FieldDefinition> = serde_json::from_reader(reader)?;
        Self::from_definitions(definitions)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// The schema shipped with the crate, parsed on first use and shared afterwards.
    pub fn bundled() -> Result<&'static Schema, SchemaLoadError> {
        static BUNDLED: OnceLock<Schema> = OnceLock::new();

        if let Some(schema) = BUNDLED.get() {
            return Ok(schema);
        }
        let schema = Schema::from_json_str(BUNDLED_SCHEMA)?;
        Ok(BUNDLED.get_or_init(|| schema))
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
