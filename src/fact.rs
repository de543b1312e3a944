//! Extracted-fact types.
//!
//! An [`ExtractedFact`] is one atomic claim pulled from text: a slot, the
//! raw value as it appeared, a normalized form used for comparison, the
//! byte span of the value in the source (used for rewrites), and the
//! origin that produced it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_value;

/// Byte span of a value in its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl SourceSpan {
    /// Creates a span from byte bounds.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Shifts a clause-relative span to a text-relative one.
    #[must_use]
    pub const fn shifted(self, by: usize) -> Self {
        Self::new(self.start + by, self.end + by)
    }
}

/// Which extraction stage produced a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Tier-1 regex/grammar pattern families.
    Pattern,
    /// Tier-1.5 verb-ontology / entity-taxonomy inference.
    Knowledge,
    /// Tier-2 semantic matcher.
    Neural,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern => write!(f, "pattern"),
            Self::Knowledge => write!(f, "knowledge"),
            Self::Neural => write!(f, "neural"),
        }
    }
}

/// Provenance of an extracted fact: the tier plus the pattern name or
/// verb category that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactOrigin {
    /// Extraction stage.
    pub tier: Tier,
    /// Pattern-family name or verb-category that produced the fact.
    pub rule: String,
}

impl FactOrigin {
    /// Origin for a Tier-1 pattern family.
    #[must_use]
    pub fn pattern(rule: impl Into<String>) -> Self {
        Self {
            tier: Tier::Pattern,
            rule: rule.into(),
        }
    }

    /// Origin for a Tier-1.5 verb-category inference.
    #[must_use]
    pub fn knowledge(rule: impl Into<String>) -> Self {
        Self {
            tier: Tier::Knowledge,
            rule: rule.into(),
        }
    }
}

/// One atomic claim extracted from text.
///
/// Invariant: `normalized` is always `normalize_value(&value)`; the
/// constructor enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFact {
    /// Canonical slot name (lowercase identifier).
    pub slot: String,
    /// Raw value as it appeared in the source text.
    pub value: String,
    /// Lowercased, article-stripped form used for comparison.
    pub normalized: String,
    /// Offsets of the value into the original text.
    pub source_span: SourceSpan,
    /// The stage and rule that produced this fact.
    pub origin: FactOrigin,
}

impl ExtractedFact {
    /// Creates a fact, deriving the normalized form from the value.
    #[must_use]
    pub fn new(
        slot: impl Into<String>,
        value: impl Into<String>,
        source_span: SourceSpan,
        origin: FactOrigin,
    ) -> Self {
        let value = value.into();
        let normalized = normalize_value(&value);
        Self {
            slot: slot.into(),
            value,
            normalized,
            source_span,
            origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_derived_from_value() {
        let fact = ExtractedFact::new(
            "location",
            "New York City",
            SourceSpan::new(0, 13),
            FactOrigin::pattern("named_slot"),
        );
        assert_eq!(fact.normalized, normalize_value(&fact.value));
        assert_eq!(fact.normalized, "new york city");
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(format!("{}", Tier::Pattern), "pattern");
        assert_eq!(format!("{}", Tier::Knowledge), "knowledge");
    }

    #[test]
    fn test_fact_serialization_round_trip() {
        let fact = ExtractedFact::new(
            "employer",
            "Amazon",
            SourceSpan::new(12, 18),
            FactOrigin::pattern("named_slot"),
        );
        let json = serde_json::to_string(&fact).unwrap();
        let back: ExtractedFact = serde_json::from_str(&json).unwrap();
        assert_eq!(fact, back);
    }
}
