//! Contradiction detection across memories.
//!
//! Contradictions are explicit objects, not hidden errors: when two
//! memories assert different values for a slot that can only hold one,
//! the engine records a [`ContradictionDetail`] carrying the evidence
//! and the resolved winners under both trust and recency policies.
//!
//! Slots partition into three disjoint groups: a fixed known-exclusive
//! set, an additive set where multiple values are legitimate, and the
//! dynamic remainder where conflicts are confirmed either by plain value
//! inequality (no matcher) or by the semantic matcher's
//! entailment-contradiction signal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::semantic::{Entailment, SemanticMatcher};

/// Slots where a subject can hold at most one value.
pub const KNOWN_EXCLUSIVE_SLOTS: &[&str] = &[
    "employer",
    "location",
    "name",
    "title",
    "occupation",
    "coffee",
    "favorite_color",
    "favorite_food",
    "pet",
    "pet_name",
    "school",
    "undergrad_school",
    "masters_school",
    "graduation_year",
    "age",
    "birthday",
    "birth_year",
    "height",
    "weight",
    "diet",
    "relationship",
    "salary",
    "budget",
    "database",
    "os",
    "editor",
    "framework",
    "cloud",
    "api_url",
    "api_style",
    "team_size",
    "timezone",
    "major",
    "minor",
    "degree",
    "first_language",
    "programming_years",
    "programming_experience",
    "phone",
    "email",
    "children",
    "siblings",
    "start_date",
    "end_date",
    "architecture",
];

/// Slots where multiple values coexist legitimately.
pub const ADDITIVE_SLOTS: &[&str] = &[
    "skill",
    "skills",
    "hobby",
    "hobbies",
    "language",
    "languages",
    "tool",
    "tools",
    "project",
    "projects",
    "library",
    "libraries",
    "dependency",
    "dependencies",
    "feature",
    "features",
    "requirement",
    "requirements",
    "programming_language",
    "likes",
    "goal",
];

/// Exclusivity class of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotClass {
    /// At most one value can be true.
    KnownExclusive,
    /// Multiple values are legitimate; never flagged.
    Additive,
    /// Neither; exclusivity is decided per conflict.
    Dynamic,
}

/// Classifies a slot by the two static sets plus a fallthrough.
#[must_use]
pub fn classify_slot(slot: &str) -> SlotClass {
    if KNOWN_EXCLUSIVE_SLOTS.contains(&slot) {
        SlotClass::KnownExclusive
    } else if ADDITIVE_SLOTS.contains(&slot) {
        SlotClass::Additive
    } else {
        SlotClass::Dynamic
    }
}

/// One memory's assertion about a slot, as seen by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryFact {
    /// Normalized value asserted by the memory.
    pub normalized: String,
    /// Asserting memory id.
    pub memory_id: String,
    /// Trust of the asserting memory.
    pub trust: f64,
    /// Timestamp ordinal of the asserting memory.
    pub timestamp: Option<i64>,
    /// Position of the memory in the caller's list; final tie-breaker.
    pub order: usize,
    /// Full memory text, used for entailment checks on dynamic slots.
    #[serde(skip)]
    pub text: String,
}

/// One resolved conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionDetail {
    /// The conflicting slot.
    pub slot: String,
    /// Distinct normalized values, in first-seen order.
    pub values: Vec<String>,
    /// Value from the memory with highest trust (ties: most recent
    /// timestamp, then first in list).
    pub most_trusted_value: String,
    /// Value from the memory with largest timestamp (ties: highest
    /// trust, then first in list).
    pub most_recent_value: String,
    /// Recommended handling.
    pub action: String,
    /// The asserting memories behind the conflict.
    pub sources: Vec<MemoryFact>,
}

impl ContradictionDetail {
    /// Gap between the most and least trusted conflicting memories.
    #[must_use]
    pub fn trust_gap(&self) -> f64 {
        let mut lo = f64::MAX;
        let mut hi = f64::MIN;
        for s in &self.sources {
            lo = lo.min(s.trust);
            hi = hi.max(s.trust);
        }
        if self.sources.is_empty() {
            0.0
        } else {
            hi - lo
        }
    }
}

const EXCLUSIVE_ACTION: &str = "Keep the most trusted value and retire the rest.";
const DYNAMIC_ACTION: &str = "Verify which value is current before relying on this slot.";

/// Detects contradictions over per-slot memory assertions.
///
/// `slot_facts` maps each slot to every assertion memories make about
/// it, in memory-list order. Additive slots are never flagged; dynamic
/// slots consult the matcher when one is available.
#[must_use]
pub fn detect_contradictions(
    slot_facts: &BTreeMap<String, Vec<MemoryFact>>,
    matcher: Option<&dyn SemanticMatcher>,
    entailment_threshold: f64,
) -> Vec<ContradictionDetail> {
    let mut details = Vec::new();

    for (slot, sources) in slot_facts {
        let class = classify_slot(slot);
        if class == SlotClass::Additive {
            continue;
        }

        let mut values: Vec<String> = Vec::new();
        for s in sources {
            if !values.contains(&s.normalized) {
                values.push(s.normalized.clone());
            }
        }
        if values.len() < 2 {
            continue;
        }

        if class == SlotClass::Dynamic {
            if let Some(matcher) = matcher {
                let confirmed = sources
                    .iter()
                    .find(|s| s.normalized == values[0])
                    .zip(sources.iter().find(|s| s.normalized == values[1]))
                    .is_some_and(|(a, b)| {
                        let judgment = matcher.entails(&a.text, &b.text);
                        judgment.label == Entailment::Contradict
                            && judgment.confidence >= entailment_threshold
                    });
                if !confirmed {
                    continue;
                }
            }
        }

        let most_trusted = most_trusted(sources);
        let most_recent = most_recent(sources);
        let action = match class {
            SlotClass::KnownExclusive => EXCLUSIVE_ACTION,
            _ => DYNAMIC_ACTION,
        };

        details.push(ContradictionDetail {
            slot: slot.clone(),
            values,
            most_trusted_value: most_trusted.normalized.clone(),
            most_recent_value: most_recent.normalized.clone(),
            action: action.to_string(),
            sources: sources.clone(),
        });
    }

    details
}

/// Highest trust; ties by most-recent timestamp, then first in list.
fn most_trusted(sources: &[MemoryFact]) -> &MemoryFact {
    let mut best = &sources[0];
    for s in &sources[1..] {
        if s.trust > best.trust {
            best = s;
        } else if (s.trust - best.trust).abs() < f64::EPSILON && s.timestamp > best.timestamp {
            best = s;
        }
    }
    best
}

/// Largest timestamp; ties by highest trust, then first in list.
/// With no timestamps at all this degrades to the trust policy.
fn most_recent(sources: &[MemoryFact]) -> &MemoryFact {
    let mut best = &sources[0];
    for s in &sources[1..] {
        if s.timestamp > best.timestamp {
            best = s;
        } else if s.timestamp == best.timestamp && s.trust > best.trust {
            best = s;
        }
    }
    best
}
