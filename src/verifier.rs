//! The verification pipeline entry point.
//!
//! [`GroundCheck`] wires the stages together: extract claims from the
//! draft, index what the memories assert, detect contradictions among
//! them, ground each claim through the five-strategy cascade, score the
//! result, and in strict mode rewrite hallucinated spans with grounded
//! values.
//!
//! A verification is synchronous and pure over (draft, memories, mode):
//! it never suspends, never touches shared state, and never raises from
//! inside — only boundary errors (malformed input, missing ontology,
//! missing matcher) propagate.

use std::collections::BTreeMap;

use tracing::debug;

use crate::contradiction::{detect_contradictions, ContradictionDetail, MemoryFact};
use crate::error::{GroundCheckError, GroundResult};
use crate::extract::{
    extract_knowledge_facts, extract_pattern_facts, merge_facts, KnowledgeFact,
};
use crate::fact::ExtractedFact;
use crate::grounding::{
    apply_substitutions, find_support_in_index, resolve_span, split_compound_values,
    MatchConfig, MemoryIndex, Substitution, Support,
};
use crate::memory::Memory;
use crate::ontology::Ontology;
use crate::report::{VerificationReport, VerifyMode};
use crate::score::{confidence_score, has_disclosure_language};
use crate::semantic::SemanticMatcher;

/// Tunable thresholds.
///
/// The defaults are behavioral constants observed in practice rather
/// than derived values, so they stay adjustable.
#[derive(Debug, Clone, Copy)]
pub struct VerifierConfig {
    /// Trust gap above which a contradiction obliges disclosure.
    pub trust_gap: f64,
    /// Minimum entailment confidence to confirm a dynamic-slot conflict.
    pub entailment_threshold: f64,
    /// Matching thresholds for the grounding cascade.
    pub matching: MatchConfig,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            trust_gap: 0.3,
            entailment_threshold: 0.55,
            matching: MatchConfig::default(),
        }
    }
}

/// Construction options.
#[derive(Debug, Default)]
pub struct GroundCheckOptions {
    /// Whether a semantic matcher will be injected. When true, the
    /// matcher must arrive through [`GroundCheck::with_matcher`].
    pub neural: bool,
    /// Ontology override; the embedded tables load when absent.
    pub ontology: Option<Ontology>,
    /// Threshold overrides.
    pub config: Option<VerifierConfig>,
}

/// The verifier.
pub struct GroundCheck {
    ontology: Ontology,
    matcher: Option<Box<dyn SemanticMatcher>>,
    config: VerifierConfig,
}

impl std::fmt::Debug for GroundCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroundCheck")
            .field("neural", &self.matcher.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GroundCheck {
    /// Creates a verifier without a semantic matcher.
    ///
    /// # Errors
    ///
    /// Returns [`GroundCheckError::SemanticUnavailable`] when the
    /// options promise a neural matcher, and an ontology error when the
    /// tables fail to load.
    pub fn new(options: GroundCheckOptions) -> GroundResult<Self> {
        if options.neural {
            return Err(GroundCheckError::SemanticUnavailable);
        }
        Self::construct(options, None)
    }

    /// Creates a verifier with an injected semantic matcher.
    ///
    /// # Errors
    ///
    /// Returns an ontology error when the tables fail to load.
    pub fn with_matcher(
        options: GroundCheckOptions,
        matcher: Box<dyn SemanticMatcher>,
    ) -> GroundResult<Self> {
        Self::construct(options, Some(matcher))
    }

    fn construct(
        options: GroundCheckOptions,
        matcher: Option<Box<dyn SemanticMatcher>>,
    ) -> GroundResult<Self> {
        let ontology = match options.ontology {
            Some(ontology) => ontology,
            None => Ontology::embedded()?,
        };
        Ok(Self {
            ontology,
            matcher,
            config: options.config.unwrap_or_default(),
        })
    }

    fn matcher(&self) -> Option<&dyn SemanticMatcher> {
        self.matcher.as_deref()
    }

    /// Extracts factual claims from text, merged across tiers.
    #[must_use]
    pub fn extract_claims(&self, text: &str) -> BTreeMap<String, ExtractedFact> {
        let pattern = extract_pattern_facts(text);
        let knowledge = extract_knowledge_facts(text, &self.ontology);
        merge_facts(pattern, &knowledge, &self.ontology.slots).facts
    }

    /// Extracts Tier-1.5 knowledge facts with full inference metadata.
    #[must_use]
    pub fn extract_knowledge_facts(&self, text: &str) -> Vec<KnowledgeFact> {
        extract_knowledge_facts(text, &self.ontology)
    }

    /// Finds the first memory supporting a claim.
    #[must_use]
    pub fn find_support(&self, claim: &ExtractedFact, memories: &[Memory]) -> Option<Support> {
        let index = MemoryIndex::build(memories, &self.ontology);
        for part in split_compound_values(&claim.value) {
            let normalized = crate::normalize::normalize_value(&part);
            if let Some(support) = find_support_in_index(
                &index,
                &claim.slot,
                &normalized,
                self.matcher(),
                &self.config.matching,
            ) {
                return Some(support);
            }
        }
        None
    }

    /// Verifies a draft against the supplied memories.
    ///
    /// # Errors
    ///
    /// Returns a validation error when a memory carries an out-of-range
    /// trust score or empty text. Nothing else propagates: extraction
    /// misses degrade to "claim not extracted".
    pub fn verify(
        &self,
        draft: &str,
        memories: &[Memory],
        mode: VerifyMode,
    ) -> GroundResult<VerificationReport> {
        for memory in memories {
            memory.validate()?;
        }

        if draft.trim().is_empty() {
            return Ok(VerificationReport::empty_pass());
        }

        let facts_extracted = self.extract_claims(draft);
        if facts_extracted.is_empty() {
            return Ok(VerificationReport::empty_pass());
        }

        let index = MemoryIndex::build(memories, &self.ontology);
        let contradiction_details = self.detect(&index);

        let mut hallucinations: Vec<String> = Vec::new();
        let mut grounding_map: BTreeMap<String, Option<String>> = BTreeMap::new();
        let mut support_trusts: Vec<f64> = Vec::new();
        let mut supported_slots = 0usize;

        for (slot, fact) in &facts_extracted {
            let parts = split_compound_values(&fact.value);
            let mut slot_support: Option<Support> = None;
            let mut all_supported = true;

            for part in &parts {
                let normalized = crate::normalize::normalize_value(part);
                if normalized.is_empty() {
                    continue;
                }
                match find_support_in_index(
                    &index,
                    slot,
                    &normalized,
                    self.matcher(),
                    &self.config.matching,
                ) {
                    Some(support) => {
                        if slot_support.is_none() {
                            slot_support = Some(support);
                        }
                    }
                    None => {
                        hallucinations.push(part.clone());
                        all_supported = false;
                    }
                }
            }

            if all_supported {
                if let Some(support) = &slot_support {
                    supported_slots += 1;
                    let trust = index
                        .candidates(slot)
                        .iter()
                        .find(|c| c.memory_id == support.memory_id)
                        .map_or(1.0, |c| c.trust);
                    support_trusts.push(trust);
                }
            }
            grounding_map.insert(
                slot.clone(),
                if all_supported {
                    slot_support.map(|s| s.memory_id)
                } else {
                    None
                },
            );
        }

        let conflicted_draft_slot = contradiction_details
            .iter()
            .any(|c| facts_extracted.contains_key(&c.slot));
        let passed = hallucinations.is_empty() && !conflicted_draft_slot;

        let mut requires_disclosure = contradiction_details
            .iter()
            .any(|c| c.trust_gap() > self.config.trust_gap)
            && !has_disclosure_language(draft);

        let confidence =
            confidence_score(facts_extracted.len(), supported_slots, &support_trusts);

        let corrected = if mode == VerifyMode::Strict && !passed {
            self.rewrite(
                draft,
                &facts_extracted,
                &grounding_map,
                &index,
                &contradiction_details,
                &mut requires_disclosure,
            )
        } else {
            None
        };

        debug!(
            claims = facts_extracted.len(),
            hallucinations = hallucinations.len(),
            contradictions = contradiction_details.len(),
            passed,
            "verification complete"
        );

        Ok(VerificationReport {
            passed,
            corrected,
            hallucinations,
            grounding_map,
            confidence,
            contradiction_details,
            requires_disclosure,
            facts_extracted,
        })
    }

    /// Detects contradictions among the indexed memory assertions.
    fn detect(&self, index: &MemoryIndex) -> Vec<ContradictionDetail> {
        let mut slot_facts: BTreeMap<String, Vec<MemoryFact>> = BTreeMap::new();
        for (slot, candidates) in index.iter() {
            let facts = candidates
                .iter()
                .map(|c| MemoryFact {
                    normalized: c.normalized.clone(),
                    memory_id: c.memory_id.clone(),
                    trust: c.trust,
                    timestamp: c.timestamp,
                    order: c.order,
                    text: c.memory_text.clone(),
                })
                .collect();
            slot_facts.insert(slot.clone(), facts);
        }
        detect_contradictions(
            &slot_facts,
            self.matcher(),
            self.config.entailment_threshold,
        )
    }

    /// Strict-mode rewrite: substitute each hallucinated slot whose
    /// memories hold a grounded value, right to left over the draft.
    fn rewrite(
        &self,
        draft: &str,
        facts: &BTreeMap<String, ExtractedFact>,
        grounding_map: &BTreeMap<String, Option<String>>,
        index: &MemoryIndex,
        contradictions: &[ContradictionDetail],
        requires_disclosure: &mut bool,
    ) -> Option<String> {
        let mut subs: Vec<Substitution> = Vec::new();

        for (slot, fact) in facts {
            if grounding_map.get(slot).is_some_and(|g| g.is_some()) {
                continue;
            }
            let candidates = index.candidates(slot);
            if candidates.is_empty() {
                continue;
            }

            let mut distinct: Vec<&str> = Vec::new();
            for c in candidates {
                if !distinct.contains(&c.normalized.as_str()) {
                    distinct.push(&c.normalized);
                }
            }

            let replacement = if distinct.len() == 1 {
                candidates[0].raw.clone()
            } else {
                // Competing values for the slot: take the most trusted
                // and flag the conflict for disclosure.
                *requires_disclosure = true;
                let detail = contradictions.iter().find(|c| c.slot == *slot);
                let winner = detail.map_or_else(
                    || candidates[0].normalized.clone(),
                    |d| d.most_trusted_value.clone(),
                );
                candidates
                    .iter()
                    .find(|c| c.normalized == winner)
                    .map_or_else(|| candidates[0].raw.clone(), |c| c.raw.clone())
            };

            if let Some(span) = resolve_span(draft, fact) {
                subs.push(Substitution { span, replacement });
            }
        }

        if subs.is_empty() {
            None
        } else {
            Some(apply_substitutions(draft, subs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::LexicalMatcher;

    fn verifier() -> GroundCheck {
        GroundCheck::new(GroundCheckOptions::default()).unwrap()
    }

    #[test]
    fn test_neural_without_matcher_fails_construction() {
        let err = GroundCheck::new(GroundCheckOptions {
            neural: true,
            ..GroundCheckOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, GroundCheckError::SemanticUnavailable));
    }

    #[test]
    fn test_with_matcher_constructs() {
        let gc = GroundCheck::with_matcher(
            GroundCheckOptions {
                neural: true,
                ..GroundCheckOptions::default()
            },
            Box::new(LexicalMatcher::new()),
        );
        assert!(gc.is_ok());
    }

    #[test]
    fn test_invalid_trust_rejected() {
        let gc = verifier();
        let memories = vec![Memory::with_trust("m1", "User works at Microsoft", 1.5)];
        let err = gc.verify("You work at Microsoft", &memories, VerifyMode::Strict);
        assert!(err.is_err());
    }

    #[test]
    fn test_empty_draft_passes() {
        let gc = verifier();
        let report = gc.verify("   ", &[], VerifyMode::Strict).unwrap();
        assert!(report.passed);
        assert!((report.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_claims_passes() {
        let gc = verifier();
        let report = gc
            .verify("Sounds good, talk soon!", &[], VerifyMode::Strict)
            .unwrap();
        assert!(report.passed);
        assert!(report.facts_extracted.is_empty());
    }

    #[test]
    fn test_grounding_map_mirrors_facts() {
        let gc = verifier();
        let memories = vec![Memory::with_trust("m1", "User works at Microsoft", 0.9)];
        let report = gc
            .verify(
                "You work at Amazon and live in Seattle",
                &memories,
                VerifyMode::Permissive,
            )
            .unwrap();
        for slot in report.facts_extracted.keys() {
            assert!(report.grounding_map.contains_key(slot));
        }
        for slot in report.grounding_map.keys() {
            assert!(report.facts_extracted.contains_key(slot));
        }
    }

    #[test]
    fn test_permissive_mode_never_rewrites() {
        let gc = verifier();
        let memories = vec![Memory::with_trust("m1", "User works at Microsoft", 0.9)];
        let report = gc
            .verify("You work at Amazon", &memories, VerifyMode::Permissive)
            .unwrap();
        assert!(!report.passed);
        assert!(report.corrected.is_none());
    }

    #[test]
    fn test_find_support_exposed() {
        let gc = verifier();
        let memories = vec![Memory::with_trust("m1", "User works at Microsoft", 0.9)];
        let claims = gc.extract_claims("You work at Microsoft");
        let support = gc.find_support(&claims["employer"], &memories).unwrap();
        assert_eq!(support.memory_id, "m1");
    }
}
