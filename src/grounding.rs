//! Grounding: matching draft claims to supporting memories.
//!
//! Each claim is matched against the values memories assert for its slot
//! with five strategies tried in order, stopping at the first success:
//! exact, normalization (alias expansion), fuzzy (bounded edit
//! distance), synonym (static per-slot tables), and embedding (only when
//! a semantic matcher is available). A claim with no support is a
//! hallucination; in strict mode the corrector rewrites its span with
//! the grounded value, right to left so earlier offsets stay valid.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extract::{extract_knowledge_facts, extract_pattern_facts, merge_facts};
use crate::fact::{ExtractedFact, SourceSpan};
use crate::memory::Memory;
use crate::normalize::normalize_value;
use crate::ontology::Ontology;
use crate::semantic::SemanticMatcher;

/// Which strategy grounded a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Normalized strings are equal.
    Exact,
    /// Equal after alias expansion.
    Normalization,
    /// Within the edit-distance bound.
    Fuzzy,
    /// Same entry in a static synonym group.
    Synonym,
    /// Cosine similarity above threshold.
    Embedding,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Exact => "exact",
            Self::Normalization => "normalization",
            Self::Fuzzy => "fuzzy",
            Self::Synonym => "synonym",
            Self::Embedding => "embedding",
        };
        write!(f, "{s}")
    }
}

/// A successful grounding of one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Support {
    /// The supporting memory.
    pub memory_id: String,
    /// The strategy that matched.
    pub strategy: MatchStrategy,
    /// Match score in [0.0, 1.0].
    pub score: f64,
}

/// Matching thresholds; tunable because the shipped defaults are
/// behavioral constants, not derived ones.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    /// Fixed slack of the fuzzy bound: `max(slack, len / divisor)`.
    pub fuzzy_slack: usize,
    /// Length divisor of the fuzzy bound.
    pub fuzzy_divisor: usize,
    /// Minimum cosine similarity for an embedding match.
    pub embedding_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            fuzzy_slack: 2,
            fuzzy_divisor: 6,
            embedding_threshold: 0.75,
        }
    }
}

/// Abbreviations expanded during normalization matching.
static VALUE_ALIASES: &[(&str, &str)] = &[
    ("nyc", "new york city"),
    ("la", "los angeles"),
    ("sf", "san francisco"),
    ("dc", "washington dc"),
    ("uk", "united kingdom"),
    ("us", "united states"),
    ("usa", "united states"),
    ("ml", "machine learning"),
    ("ai", "artificial intelligence"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("swe", "software engineer"),
    ("pm", "product manager"),
    ("ds", "data scientist"),
    ("phd", "doctorate"),
    ("mit", "massachusetts institute of technology"),
];

/// Per-slot synonym groups; a claim and a candidate in the same group
/// match.
static SYNONYM_GROUPS: &[(&str, &[&[&str]])] = &[
    (
        "occupation",
        &[
            &["software engineer", "swe", "software developer", "programmer", "coder", "dev"],
            &["data scientist", "ds", "ml engineer", "machine learning engineer"],
            &["product manager", "pm", "product lead"],
            &["teacher", "instructor", "educator", "professor", "lecturer"],
            &["doctor", "physician", "md", "medical doctor"],
            &["lawyer", "attorney", "legal counsel"],
        ],
    ),
    (
        "title",
        &[
            &["software engineer", "swe", "software developer", "programmer", "coder", "dev"],
            &["data scientist", "ds", "ml engineer", "machine learning engineer"],
            &["product manager", "pm", "product lead"],
        ],
    ),
    (
        "degree",
        &[
            &["bachelors", "ba", "bs", "bachelor of arts", "bachelor of science", "undergraduate degree"],
            &["masters", "ma", "ms", "master of arts", "master of science", "graduate degree"],
            &["phd", "doctorate", "doctoral degree"],
        ],
    ),
];

/// Historical-slot prefixes that fall back to the canonical slot.
const HISTORICAL_PREFIXES: &[&str] = &["previous_", "prior_", "former_"];

static COMPOUND_SEP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*(?:,\s*(?:and|or)\s+|,\s*|\s+(?:and|or)\s+|/|;)\s*")
        .expect("compound separator regex")
});

/// Splits a compound value ("Python, JavaScript, and Ruby") into its
/// individual parts. A value with no separators comes back as itself.
#[must_use]
pub fn split_compound_values(value: &str) -> Vec<String> {
    let parts: Vec<String> = COMPOUND_SEP_RE
        .split(value)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter(|p| !matches!(p.to_lowercase().as_str(), "and" | "or" | "&" | "the" | "a" | "an"))
        .map(str::to_string)
        .collect();
    if parts.is_empty() {
        vec![value.trim().to_string()]
    } else {
        parts
    }
}

/// One value a memory asserts for some slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateValue {
    /// Normalized value.
    pub normalized: String,
    /// Raw value as extracted from the memory.
    pub raw: String,
    /// Asserting memory id.
    pub memory_id: String,
    /// Trust of the asserting memory.
    pub trust: f64,
    /// Timestamp of the asserting memory.
    pub timestamp: Option<i64>,
    /// Position of the memory in the caller's list.
    pub order: usize,
    /// Full memory text.
    pub memory_text: String,
}

/// Everything memories assert, indexed by slot.
///
/// Built once per verification; also feeds the contradiction engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    by_slot: BTreeMap<String, Vec<CandidateValue>>,
}

impl MemoryIndex {
    /// Extracts facts from every memory and indexes them by slot.
    #[must_use]
    pub fn build(memories: &[Memory], ontology: &Ontology) -> Self {
        let mut by_slot: BTreeMap<String, Vec<CandidateValue>> = BTreeMap::new();

        for (order, memory) in memories.iter().enumerate() {
            let pattern = extract_pattern_facts(&memory.text);
            let knowledge = extract_knowledge_facts(&memory.text, ontology);
            let merged = merge_facts(pattern, &knowledge, &ontology.slots);

            // Shadowed tier-1.5 values count as assertions too: a memory
            // whose tiers diverge is asserting both values, and the
            // contradiction engine must see both.
            let assertions = merged
                .facts
                .into_iter()
                .chain(merged.shadowed.into_iter().map(|f| (f.slot.clone(), f)));

            for (slot, fact) in assertions {
                for part in split_compound_values(&fact.value) {
                    let normalized = normalize_value(&part);
                    if normalized.is_empty() {
                        continue;
                    }
                    let entries = by_slot.entry(slot.clone()).or_default();
                    // The same memory asserting the same value twice is
                    // one assertion.
                    if entries
                        .iter()
                        .any(|c| c.memory_id == memory.id && c.normalized == normalized)
                    {
                        continue;
                    }
                    entries.push(CandidateValue {
                        normalized,
                        raw: part,
                        memory_id: memory.id.clone(),
                        trust: memory.trust,
                        timestamp: memory.timestamp,
                        order,
                        memory_text: memory.text.clone(),
                    });
                }
            }
        }

        Self { by_slot }
    }

    /// Candidates for a slot, honoring historical-prefix fallback
    /// (`previous_employer` resolves against `employer`).
    #[must_use]
    pub fn candidates(&self, slot: &str) -> &[CandidateValue] {
        if let Some(values) = self.by_slot.get(slot) {
            return values;
        }
        for prefix in HISTORICAL_PREFIXES {
            if let Some(stripped) = slot.strip_prefix(prefix) {
                if let Some(values) = self.by_slot.get(stripped) {
                    return values;
                }
            }
        }
        &[]
    }

    /// Iterates all indexed slots with their candidates.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<CandidateValue>)> {
        self.by_slot.iter()
    }
}

/// Expands abbreviations word-by-word over a normalized value.
fn apply_aliases(normalized: &str) -> String {
    normalized
        .split(' ')
        .map(|word| {
            VALUE_ALIASES
                .iter()
                .find(|(short, _)| *short == word)
                .map_or(word, |(_, long)| *long)
        })
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Two-row Levenshtein distance.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let sub = prev[j] + usize::from(ca != cb);
            curr[j + 1] = sub.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn in_same_synonym_group(slot: &str, a: &str, b: &str) -> bool {
    SYNONYM_GROUPS
        .iter()
        .filter(|(s, _)| *s == slot)
        .flat_map(|(_, groups)| groups.iter())
        .any(|group| group.contains(&a) && group.contains(&b))
}

/// Runs the five-strategy cascade for one claim value against one
/// candidate value. Both inputs are normalized.
#[must_use]
pub fn match_values(
    claimed: &str,
    candidate: &str,
    slot: &str,
    matcher: Option<&dyn SemanticMatcher>,
    config: &MatchConfig,
) -> Option<(MatchStrategy, f64)> {
    if claimed.is_empty() || candidate.is_empty() {
        return None;
    }

    if claimed == candidate {
        return Some((MatchStrategy::Exact, 1.0));
    }

    if apply_aliases(claimed) == apply_aliases(candidate) {
        return Some((MatchStrategy::Normalization, 0.95));
    }

    let len = claimed.chars().count().max(candidate.chars().count());
    let bound = config.fuzzy_slack.max(len / config.fuzzy_divisor.max(1));
    let dist = edit_distance(claimed, candidate);
    if dist <= bound && len > bound {
        let score = 1.0 - dist as f64 / len as f64;
        return Some((MatchStrategy::Fuzzy, score));
    }

    if in_same_synonym_group(slot, claimed, candidate) {
        return Some((MatchStrategy::Synonym, 0.9));
    }

    if let Some(matcher) = matcher {
        let sim = matcher.similarity(claimed, candidate);
        if sim >= config.embedding_threshold {
            return Some((MatchStrategy::Embedding, sim));
        }
    }

    None
}

/// Finds the first memory supporting a claim value for a slot.
#[must_use]
pub fn find_support_in_index(
    index: &MemoryIndex,
    slot: &str,
    claimed_normalized: &str,
    matcher: Option<&dyn SemanticMatcher>,
    config: &MatchConfig,
) -> Option<Support> {
    for candidate in index.candidates(slot) {
        if let Some((strategy, score)) = match_values(
            claimed_normalized,
            &candidate.normalized,
            slot,
            matcher,
            config,
        ) {
            return Some(Support {
                memory_id: candidate.memory_id.clone(),
                strategy,
                score,
            });
        }
    }
    None
}

/// A single span replacement in the draft.
#[derive(Debug, Clone)]
pub struct Substitution {
    /// Span to replace.
    pub span: SourceSpan,
    /// Replacement text.
    pub replacement: String,
}

/// Resolves a fact's span, falling back to a case-insensitive search for
/// facts whose extraction carried no offsets.
#[must_use]
pub fn resolve_span(draft: &str, fact: &ExtractedFact) -> Option<SourceSpan> {
    let span = fact.source_span;
    if span.end > span.start && span.end <= draft.len() {
        return Some(span);
    }
    let lowered = draft.to_lowercase();
    let needle = fact.value.to_lowercase();
    lowered
        .find(&needle)
        .map(|start| SourceSpan::new(start, start + needle.len()))
}

/// Applies substitutions right to left so earlier offsets remain valid.
/// The casing of each replacement's first character follows the text it
/// replaces.
#[must_use]
pub fn apply_substitutions(draft: &str, mut subs: Vec<Substitution>) -> String {
    subs.sort_by_key(|s| s.span.start);
    subs.dedup_by_key(|s| s.span.start);

    let mut out = draft.to_string();
    for sub in subs.into_iter().rev() {
        if sub.span.end > out.len() || sub.span.start >= sub.span.end {
            continue;
        }
        let original = &out[sub.span.start..sub.span.end];
        let replacement = match_case(original, &sub.replacement);
        out.replace_range(sub.span.start..sub.span.end, &replacement);
    }
    out
}

fn match_case(original: &str, replacement: &str) -> String {
    let Some(first_orig) = original.chars().next() else {
        return replacement.to_string();
    };
    let mut chars = replacement.chars();
    let Some(first_rep) = chars.next() else {
        return replacement.to_string();
    };
    let rest: String = chars.collect();
    if first_orig.is_uppercase() {
        format!("{}{rest}", first_rep.to_uppercase())
    } else if first_orig.is_lowercase() {
        format!("{}{rest}", first_rep.to_lowercase())
    } else {
        replacement.to_string()
    }
}
