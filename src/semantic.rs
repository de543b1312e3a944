//! The semantic-matcher capability.
//!
//! The core compiles and runs without any neural backend; paraphrase
//! matching and entailment checking sit behind this trait, injected by
//! the caller when `neural` is enabled. Implementations may cache, pool
//! threads, or load models lazily — the core observes none of that and
//! only requires the three methods to be total.

use serde::{Deserialize, Serialize};

/// Three-way entailment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entailment {
    /// The premise supports the hypothesis.
    Entail,
    /// No directional relation.
    Neutral,
    /// The premise conflicts with the hypothesis.
    Contradict,
}

/// An entailment label with its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntailmentJudgment {
    /// The label.
    pub label: Entailment,
    /// Confidence in [0.0, 1.0].
    pub confidence: f64,
}

impl EntailmentJudgment {
    /// Creates a judgment, clamping confidence into range.
    #[must_use]
    pub fn new(label: Entailment, confidence: f64) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Capability contract for paraphrase and entailment matching.
///
/// Methods must never fail: a misbehaving backend should degrade to a
/// neutral answer, and the matching cascade falls back to the previous
/// strategy on its own.
pub trait SemanticMatcher: Send + Sync {
    /// Deterministic, finite embedding of a text.
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Similarity of two texts in [0.0, 1.0].
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Entailment relation from premise to hypothesis.
    fn entails(&self, premise: &str, hypothesis: &str) -> EntailmentJudgment;
}

/// Deterministic bag-of-words matcher.
///
/// A stand-in backend with no model behind it: embeddings are hashed
/// token counts, similarity is the Jaccard index over token sets, and
/// entailment is containment-based. Useful for tests and for callers who
/// want the neural code paths without a neural runtime.
#[derive(Debug, Clone)]
pub struct LexicalMatcher {
    dims: usize,
}

impl Default for LexicalMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalMatcher {
    /// Default embedding dimensionality.
    const DEFAULT_DIMS: usize = 64;

    /// Creates a matcher with the default dimensionality.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dims: Self::DEFAULT_DIMS,
        }
    }

    fn token_set(text: &str) -> Vec<String> {
        let mut tokens: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        tokens.sort_unstable();
        tokens.dedup();
        tokens
    }

    fn bucket(&self, token: &str) -> usize {
        // FNV-1a; stable across platforms and runs.
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for b in token.bytes() {
            hash ^= u64::from(b);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        (hash % self.dims as u64) as usize
    }
}

impl SemanticMatcher for LexicalMatcher {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for token in Self::token_set(text) {
            vector[self.bucket(&token)] += 1.0;
        }
        vector
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        let sa = Self::token_set(a);
        let sb = Self::token_set(b);
        if sa.is_empty() && sb.is_empty() {
            return 1.0;
        }
        let intersection = sa.iter().filter(|t| sb.binary_search(t).is_ok()).count();
        let union = sa.len() + sb.len() - intersection;
        if union == 0 {
            return 0.0;
        }
        intersection as f64 / union as f64
    }

    fn entails(&self, premise: &str, hypothesis: &str) -> EntailmentJudgment {
        let sim = self.similarity(premise, hypothesis);
        if sim >= 0.8 {
            EntailmentJudgment::new(Entailment::Entail, sim)
        } else if sim <= 0.2 {
            // Disjoint statements about the same slot read as conflicting
            // values under bag-of-words semantics.
            EntailmentJudgment::new(Entailment::Contradict, 1.0 - sim)
        } else {
            EntailmentJudgment::new(Entailment::Neutral, 0.5)
        }
    }
}
