//! Fact merging across extraction tiers.
//!
//! Each tier speaks its own slot vocabulary; the merger owns the single
//! canonical alias table that collapses them. Tier-1 facts win on
//! conflict. A Tier-1.5 fact whose slot already carries a Tier-1 fact
//! with the same normalized value is a duplicate and is dropped; one with
//! a *different* value is retained separately as contradiction evidence,
//! never as a second claim on the same slot.
//!
//! Deprecation facts describe what is no longer current, so they never
//! become claims; they stay visible to the contradiction engine through
//! the raw knowledge-fact list.

use std::collections::BTreeMap;

use crate::extract::knowledge::KnowledgeFact;
use crate::fact::{ExtractedFact, FactOrigin, SourceSpan};
use crate::ontology::{SlotAliases, VerbCategory};

/// Knowledge facts below this confidence are too weak to claim a slot.
const MIN_CLAIM_CONFIDENCE: f64 = 0.4;

/// The union of Tier-1 and Tier-1.5 extraction.
#[derive(Debug, Clone, Default)]
pub struct MergedFacts {
    /// One claim per slot.
    pub facts: BTreeMap<String, ExtractedFact>,
    /// Tier-1.5 facts displaced by a Tier-1 fact with a different value;
    /// contradiction evidence only.
    pub shadowed: Vec<ExtractedFact>,
}

/// Merges pattern and knowledge facts into a single slot map.
#[must_use]
pub fn merge_facts(
    pattern: BTreeMap<String, ExtractedFact>,
    knowledge: &[KnowledgeFact],
    slots: &SlotAliases,
) -> MergedFacts {
    let mut merged = MergedFacts {
        facts: pattern,
        shadowed: Vec::new(),
    };
    let mut claim_confidence: BTreeMap<String, f64> = BTreeMap::new();

    for kf in knowledge {
        if kf.confidence < MIN_CLAIM_CONFIDENCE
            || kf.verb_category == VerbCategory::Deprecation
        {
            continue;
        }
        let slot = slots.slot_for(&kf.category).to_string();
        let fact = ExtractedFact::new(
            &slot,
            &kf.entity,
            SourceSpan::default(),
            FactOrigin::knowledge(kf.verb_category.as_str()),
        );

        if let Some(existing) = merged.facts.get(&slot) {
            if existing.origin.tier == crate::fact::Tier::Pattern {
                // Tier-1 wins; keep a diverging value as evidence.
                if existing.normalized != fact.normalized {
                    merged.shadowed.push(fact);
                }
                continue;
            }
            // Between knowledge facts, higher confidence wins; first
            // seen wins a tie.
            let held = claim_confidence.get(&slot).copied().unwrap_or(0.0);
            if kf.confidence <= held {
                continue;
            }
        }
        claim_confidence.insert(slot.clone(), kf.confidence);
        merged.facts.insert(slot, fact);
    }

    merged
}
