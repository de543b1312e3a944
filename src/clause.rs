//! Clause splitting.
//!
//! A sentence breaks into sub-clauses at commas (outside quoted spans and
//! balanced parentheses), semicolons, and the coordinating conjunctions
//! `and`, `or`, `but` when they join full clauses. Each sub-clause keeps
//! its ordinal index and byte offset into the original text so Tier-1
//! spans survive for the rewrite stage. Splitting never crosses sentence
//! boundaries.

use crate::normalize::tokenize;

/// A sub-clause of the input with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// The clause text, a trimmed slice of the original.
    pub text: String,
    /// 0-based ordinal of the clause across the whole input.
    pub index: usize,
    /// Byte offset of `text` within the original input.
    pub offset: usize,
}

/// Verbs that mark the right-hand side of a conjunction as a full clause.
const CLAUSE_VERBS: &[&str] = &[
    "is", "am", "are", "was", "were", "has", "have", "had", "use", "uses",
    "used", "work", "works", "live", "lives", "run", "runs", "need",
    "needs", "require", "requires", "prefer", "prefers", "should", "must",
    "supports", "handles", "chose", "picked", "selected", "decided",
    "agreed", "moved", "switched", "migrated", "went", "know", "knows",
    "equals", "studied", "graduated", "enjoy", "enjoys", "adopted",
    "dropped",
];

/// Minimum clause length; shorter fragments are discarded.
const MIN_CLAUSE_LEN: usize = 5;

/// Splits text into clauses, preserving byte offsets.
#[must_use]
pub fn split_clauses(text: &str) -> Vec<Clause> {
    let mut clauses = Vec::new();
    for (sent_off, sentence) in split_sentences(text) {
        split_sentence_clauses(sentence, sent_off, &mut clauses);
    }
    if clauses.is_empty() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            let offset = text.len() - text.trim_start().len();
            clauses.push(Clause {
                text: trimmed.to_string(),
                index: 0,
                offset,
            });
        }
    }
    clauses
}

/// Splits on sentence terminators (`.`, `!`, `?`), keeping periods that
/// sit between digits (`3.11`) inside their sentence.
fn split_sentences(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut sentences = Vec::new();
    let mut start = 0;
    for i in 0..bytes.len() {
        let c = bytes[i] as char;
        let terminal = match c {
            '!' | '?' => true,
            '.' => {
                let prev_digit = i > 0 && (bytes[i - 1] as char).is_ascii_digit();
                let next_digit = i + 1 < bytes.len() && (bytes[i + 1] as char).is_ascii_digit();
                !(prev_digit && next_digit)
            }
            _ => false,
        };
        if terminal {
            if i > start {
                sentences.push((start, &text[start..i]));
            }
            start = i + 1;
        }
    }
    if start < text.len() {
        sentences.push((start, &text[start..]));
    }
    sentences
}

fn split_sentence_clauses(sentence: &str, sent_off: usize, out: &mut Vec<Clause>) {
    let mut boundaries: Vec<(usize, usize)> = Vec::new(); // (cut_at, resume_at), sentence-relative
    let bytes = sentence.as_bytes();
    let mut paren_depth = 0_i32;
    let mut in_quote = false;

    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            '"' => in_quote = !in_quote,
            '(' => paren_depth += 1,
            ')' => paren_depth = (paren_depth - 1).max(0),
            ';' if !in_quote && paren_depth == 0 => {
                boundaries.push((i, i + 1));
            }
            ',' if !in_quote && paren_depth == 0 => {
                // A comma starts a new clause only when a lowercase
                // continuation follows ("…React, backend is FastAPI");
                // list values like "Python, Go, and COBOL" stay whole.
                // A trailing conjunction defers to the conjunction rule.
                if comma_starts_clause(&sentence[i + 1..]) {
                    boundaries.push((i, i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }

    // Coordinating conjunctions joining full clauses.
    for conj in ["and", "or", "but"] {
        for (pos, _) in sentence.match_indices(conj) {
            if !is_word_at(sentence, pos, conj.len()) {
                continue;
            }
            if joins_full_clause(&sentence[pos + conj.len()..]) {
                boundaries.push((pos, pos + conj.len()));
            }
        }
    }

    boundaries.sort_unstable();
    boundaries.dedup();

    let mut cursor = 0;
    for (cut, resume) in boundaries {
        if cut > cursor {
            push_clause(sentence, cursor, cut, sent_off, out);
        }
        cursor = resume;
    }
    if cursor < sentence.len() {
        push_clause(sentence, cursor, sentence.len(), sent_off, out);
    }
}

fn push_clause(sentence: &str, from: usize, to: usize, sent_off: usize, out: &mut Vec<Clause>) {
    let raw = &sentence[from..to];
    // A split at a conjunction can leave the list comma behind.
    let trimmed = raw.trim().trim_end_matches([',', ';']).trim_end();
    if trimmed.len() < MIN_CLAUSE_LEN {
        return;
    }
    let lead = raw.len() - raw.trim_start().len();
    out.push(Clause {
        text: trimmed.to_string(),
        index: out.len(),
        offset: sent_off + from + lead,
    });
}

/// True when the text after a comma reads as a new clause rather than
/// the next item of a list.
fn comma_starts_clause(rest: &str) -> bool {
    let trimmed = rest.trim_start();
    let Some(first) = trimmed.chars().next() else {
        return false;
    };
    if !first.is_ascii_lowercase() {
        return false;
    }
    let word: String = trimmed
        .chars()
        .take_while(|c| c.is_alphanumeric())
        .collect();
    !matches!(word.as_str(), "and" | "or" | "but")
}

/// Word-boundary check for a conjunction match inside a sentence.
fn is_word_at(sentence: &str, pos: usize, len: usize) -> bool {
    let bytes = sentence.as_bytes();
    let before_ok = pos == 0 || !(bytes[pos - 1] as char).is_alphanumeric();
    let end = pos + len;
    let after_ok = end >= bytes.len() || !(bytes[end] as char).is_alphanumeric();
    before_ok && after_ok
}

/// Heuristic for "this conjunction joins two full clauses": within the
/// next few tokens there is a subject followed by a recognizable verb.
/// `"frontend is React and backend is FastAPI"` splits; the value list
/// `"Python and Go"` does not.
fn joins_full_clause(rest: &str) -> bool {
    let tokens = tokenize(rest);
    let window = tokens.iter().take(4).collect::<Vec<_>>();
    if window.is_empty() {
        return false;
    }
    // Require a verb in a non-initial position so the conjunction is
    // followed by a subject, not a bare predicate continuation.
    window
        .iter()
        .skip(1)
        .any(|t| CLAUSE_VERBS.contains(&t.text.to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_splits_clauses() {
        let clauses = split_clauses("frontend is React, backend is FastAPI");
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].text, "frontend is React");
        assert_eq!(clauses[1].text, "backend is FastAPI");
        assert_eq!(clauses[1].index, 1);
    }

    #[test]
    fn test_offsets_point_into_original() {
        let text = "frontend is React, backend is FastAPI";
        let clauses = split_clauses(text);
        for c in &clauses {
            assert_eq!(&text[c.offset..c.offset + c.text.len()], c.text);
        }
    }

    #[test]
    fn test_conjunction_with_full_clause_splits() {
        let clauses = split_clauses("the backend is FastAPI and the database is Postgres");
        assert_eq!(clauses.len(), 2);
        assert!(clauses[1].text.contains("database is Postgres"));
    }

    #[test]
    fn test_conjunction_in_value_list_does_not_split() {
        let clauses = split_clauses("I know Python and Go");
        assert_eq!(clauses.len(), 1);
    }

    #[test]
    fn test_sentence_boundary_not_crossed() {
        let clauses = split_clauses("We use Postgres. We use Redis");
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].text, "We use Postgres");
    }

    #[test]
    fn test_decimal_period_stays_in_sentence() {
        let clauses = split_clauses("uptime should be 99.9% this quarter");
        assert_eq!(clauses.len(), 1);
        assert!(clauses[0].text.contains("99.9%"));
    }

    #[test]
    fn test_comma_inside_parens_ignored() {
        let clauses = split_clauses("the stack (React, FastAPI) is settled now");
        assert_eq!(clauses.len(), 1);
    }

    #[test]
    fn test_list_comma_before_conjunction_trimmed() {
        let clauses = split_clauses("frontend is React, and backend is FastAPI");
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].text, "frontend is React");
        assert_eq!(clauses[1].text, "backend is FastAPI");
    }

    #[test]
    fn test_tiny_fragments_dropped() {
        let clauses = split_clauses("yes, the database is Postgres");
        assert_eq!(clauses.len(), 1);
        assert!(clauses[0].text.contains("database"));
    }
}
