//! Confidence and disclosure scoring.
//!
//! Confidence blends the supported-claim ratio with the trust of the
//! memories doing the supporting; a fully supported draft backed by
//! fully trusted memories scores 1.0, and an empty extraction scores 1.0
//! by definition. Disclosure checking looks for language that already
//! acknowledges a source conflict, so a draft that says "changed from X
//! to Y" is not asked to disclose again.

use once_cell::sync::Lazy;
use regex::Regex;

/// Keywords whose presence reads as acknowledging a change or conflict.
static DISCLOSURE_KEYWORDS: &[&str] = &[
    "changed from",
    "updated from",
    "previously",
    "used to",
    "formerly",
    "switched from",
    "moved from",
    "most recent",
    "latest",
];

static DISCLOSURE_STRUCTURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\(changed from .+?\)|\(updated from .+?\)|\(previously .+?\)|,\s*previously\s+.+?[,.]|used to be .+?[,.]|was .+?,\s*now\b|formerly .+?[,.]",
    )
    .expect("disclosure structure regex")
});

/// Computes the confidence score for a verification.
///
/// `support_trusts` carries the trust of the best supporting memory for
/// each grounded claim. With no extracted claims the draft is vacuously
/// grounded and scores 1.0.
#[must_use]
pub fn confidence_score(total_claims: usize, supported_claims: usize, support_trusts: &[f64]) -> f64 {
    if total_claims == 0 {
        return 1.0;
    }
    let ratio = supported_claims as f64 / total_claims as f64;
    if support_trusts.is_empty() {
        return ratio.clamp(0.0, 1.0);
    }
    let mean_trust = support_trusts.iter().sum::<f64>() / support_trusts.len() as f64;
    ((ratio + mean_trust) / 2.0).clamp(0.0, 1.0)
}

/// Returns true when the text already acknowledges a conflicting or
/// superseded source.
#[must_use]
pub fn has_disclosure_language(text: &str) -> bool {
    let lowered = text.to_lowercase();
    if DISCLOSURE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return true;
    }
    DISCLOSURE_STRUCTURE_RE.is_match(text)
}
