//! The `Memory` input type.
//!
//! A memory is a trust-scored piece of grounding text supplied by the
//! caller per verification. The core never mutates memories; list order
//! is insignificant for correctness but acts as the final tie-breaker
//! (first wins) when trust and timestamp tie.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

fn default_trust() -> f64 {
    1.0
}

fn generated_id() -> String {
    Uuid::new_v4().to_string()
}

/// A trustable statement to ground claims against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Stable unique token. Generated when absent from caller input.
    #[serde(default = "generated_id")]
    pub id: String,

    /// Natural-language content.
    pub text: String,

    /// Trust score in [0.0, 1.0]. Defaults to 1.0.
    #[serde(default = "default_trust")]
    pub trust: f64,

    /// Optional monotonic ordinal; absence means "unknown".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Memory {
    /// Creates a fully-trusted memory with a generated id.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: generated_id(),
            text: text.into(),
            trust: 1.0,
            timestamp: None,
        }
    }

    /// Creates a memory with an explicit id and trust score.
    #[must_use]
    pub fn with_trust(id: impl Into<String>, text: impl Into<String>, trust: f64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            trust,
            timestamp: None,
        }
    }

    /// Sets the timestamp ordinal.
    #[must_use]
    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Validates boundary constraints on this memory.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when trust is outside [0.0, 1.0] or the
    /// text is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.trust) || self.trust.is_nan() {
            return Err(ValidationError::TrustOutOfRange {
                memory_id: self.id.clone(),
                value: self.trust,
            });
        }
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyMemoryText {
                memory_id: self.id.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_defaults() {
        let mem = Memory::new("User works at Microsoft");
        assert!((mem.trust - 1.0).abs() < f64::EPSILON);
        assert!(mem.timestamp.is_none());
        assert!(!mem.id.is_empty());
    }

    #[test]
    fn test_memory_ids_unique() {
        let a = Memory::new("a");
        let b = Memory::new("b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_memory_validation_rejects_bad_trust() {
        let mem = Memory::with_trust("m1", "text", 1.5);
        assert!(mem.validate().is_err());
        let mem = Memory::with_trust("m1", "text", -0.1);
        assert!(mem.validate().is_err());
    }

    #[test]
    fn test_memory_validation_rejects_empty_text() {
        let mem = Memory::with_trust("m1", "   ", 0.5);
        assert!(mem.validate().is_err());
    }

    #[test]
    fn test_memory_deserializes_file_format() {
        // The memory-file object shape: only `text` is required.
        let mem: Memory = serde_json::from_str(r#"{"text": "User lives in Seattle"}"#).unwrap();
        assert!((mem.trust - 1.0).abs() < f64::EPSILON);
        assert!(!mem.id.is_empty());

        let mem: Memory = serde_json::from_str(
            r#"{"id": "m7", "text": "x", "trust": 0.4, "timestamp": 12}"#,
        )
        .unwrap();
        assert_eq!(mem.id, "m7");
        assert_eq!(mem.timestamp, Some(12));
    }
}
