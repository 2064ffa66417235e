//! Key/value view over a raw RIS response body.

use std::{fmt::Display, str::FromStr};

/// RIS automated decision (`AUTO`).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum AutoDecision {
    Approve,
    Review,
    Decline,
    Escalate,
}

impl FromStr for AutoDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(AutoDecision::Approve),
            "R" => Ok(AutoDecision::Review),
            "D" => Ok(AutoDecision::Decline),
            "E" => Ok(AutoDecision::Escalate),
            other => Err(format!("Unknown AUTO decision: {}", other)),
        }
    }
}

impl Display for AutoDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            AutoDecision::Approve => "A",
            AutoDecision::Review => "R",
            AutoDecision::Decline => "D",
            AutoDecision::Escalate => "E",
        };
        write!(f, "{}", code)
    }
}

/// Parsed response, one entry per `KEY=VALUE` line, in the order received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RisResponse {
    fields: Vec<(String, String)>,
}

impl RisResponse {
    pub fn parse(body: &str) -> Self {
        let mut response = RisResponse::default();
        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) => response.insert(key, value),
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Skipping malformed response line: {}", line);
                }
            }
        }
        response
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn mode(&self) -> Option<char> {
        self.get("MODE").and_then(|m| m.chars().next())
    }

    pub fn auto(&self) -> Option<AutoDecision> {
        self.get("AUTO").and_then(|a| a.parse().ok())
    }

    pub fn score(&self) -> Option<i32> {
        self.get("SCOR").and_then(|s| s.parse().ok())
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.get("TRAN")
    }

    pub fn session_id(&self) -> Option<&str> {
        self.get("SESS")
    }

    pub fn order_number(&self) -> Option<&str> {
        self.get("ORDR")
    }

    /// `ERROR_n` entries, in index order.
    pub fn errors(&self) -> Vec<&str> {
        self.indexed("ERROR_")
    }

    /// `WARNING_n` entries, in index order.
    pub fn warnings(&self) -> Vec<&str> {
        self.indexed("WARNING_")
    }

    pub fn has_errors(&self) -> bool {
        self.get("MODE") == Some("E") || !self.errors().is_empty()
    }

    /// All fields as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        self.fields
            .iter()
            .map(|(key, value)| (key.clone(), serde_json::Value::from(value.as_str())))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }

    /// A repeated key keeps its first position and its last value.
    fn insert(&mut self, key: &str, value: &str) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.fields.push((key.to_string(), value.to_string())),
        }
    }

    fn indexed(&self, prefix: &str) -> Vec<&str> {
        let mut entries: Vec<(usize, &str)> = self
            .fields
            .iter()
            .filter_map(|(key, value)| {
                let index = key.strip_prefix(prefix)?.parse().ok()?;
                Some((index, value.as_str()))
            })
            .collect();
        entries.sort_by_key(|(index, _)| *index);
        entries.into_iter().map(|(_, value)| value).collect()
    }
}
