use std::fmt::{Debug, Display};

pub type Record<V> = std::collections::HashMap<String, V>;

/// A single value stored on a request.
///
/// The wire format only knows strings, but setters keep the semantic type so
/// that single-character flags and amounts are not confused with free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Text(String),
    Char(char),
    Integer(i64),
}

impl FieldValue {
    /// The value as it goes on the wire.
    pub fn to_wire(&self) -> String {
        self.to_string()
    }

    /// Length of the wire rendering, in characters.
    pub fn char_len(&self) -> usize {
        match self {
            FieldValue::Text(s) => s.chars().count(),
            FieldValue::Char(_) => 1,
            FieldValue::Integer(i) => i.to_string().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Char(c) => write!(f, "{}", c),
            FieldValue::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<char> for FieldValue {
    fn from(value: char) -> Self {
        FieldValue::Char(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(value.into())
    }
}

/// Transaction mode codes understood by RIS.
///
/// Modes travel as a single character; this enum only names the common ones.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum InquiryMode {
    /// Default inquiry.
    Q,
    /// Phone-to-web order.
    P,
    /// Central full inquiry.
    W,
    /// Central threshold-only inquiry.
    J,
    /// Update without response.
    U,
    /// Update with response.
    X,
}

impl InquiryMode {
    pub fn as_char(self) -> char {
        match self {
            InquiryMode::Q => 'Q',
            InquiryMode::P => 'P',
            InquiryMode::W => 'W',
            InquiryMode::J => 'J',
            InquiryMode::U => 'U',
            InquiryMode::X => 'X',
        }
    }
}

impl From<InquiryMode> for char {
    fn from(mode: InquiryMode) -> Self {
        mode.as_char()
    }
}

impl Display for InquiryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
