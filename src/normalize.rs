//! Text normalization and offset-carrying tokenization.
//!
//! Normalization is total and deterministic: lowercasing, stripping of
//! standalone articles and possessive pronouns, whitespace collapse, and
//! removal of sentence punctuation while preserving internal periods in
//! numeric and version tokens (`99.9%`, `v3.11`).
//!
//! The tokenizer emits a parallel stream of tokens carrying byte offsets
//! into the original text so the corrector can rewrite the draft in
//! place after extraction.

/// Articles and possessive pronouns stripped during normalization.
const STOP_PREFIXES: &[&str] = &[
    "a", "an", "the", "my", "your", "our", "their", "his", "her", "its",
];

/// A token with its byte span in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token text, as it appeared in the source.
    pub text: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Normalizes a value for comparison.
///
/// Lowercases, drops standalone articles/possessives, strips edge
/// punctuation per token (internal periods survive), and collapses
/// whitespace runs to single spaces.
#[must_use]
pub fn normalize_value(value: &str) -> String {
    let lowered = value.to_lowercase();
    let mut words: Vec<&str> = Vec::new();
    for raw in lowered.split_whitespace() {
        let trimmed = trim_edges(raw);
        if trimmed.is_empty() || STOP_PREFIXES.contains(&trimmed) {
            continue;
        }
        words.push(trimmed);
    }
    words.join(" ")
}

/// Characters that can make up the interior of a token.
fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '%' | '+' | '#' | '$' | '€' | '£')
}

/// Strips punctuation from both edges of a token.
///
/// Internal periods never sit at an edge after the trim, so `99.9%`,
/// `v3.11`, and `api.example.com` come through intact while the sentence
/// period of `Seattle.` is removed.
fn trim_edges(raw: &str) -> &str {
    raw.trim_start_matches(|c| !is_token_char(c))
        .trim_end_matches(|c| !is_token_char(c))
}

/// Tokenizes text into whitespace-delimited tokens with source offsets.
///
/// Punctuation is trimmed from token edges; the recorded span covers the
/// trimmed token, so spans are valid slice bounds into the original text.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (start, raw) in (SplitWs { text, pos: 0 }) {
        let lead = raw.len() - raw.trim_start_matches(|c| !is_token_char(c)).len();
        let trimmed = trim_edges(raw);
        if trimmed.is_empty() {
            continue;
        }
        tokens.push(Token {
            text: trimmed.to_string(),
            start: start + lead,
            end: start + lead + trimmed.len(),
        });
    }
    tokens
}

/// Like `split_whitespace`, but yields the byte offset of each chunk.
struct SplitWs<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for SplitWs<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        let skip = rest.len() - rest.trim_start().len();
        let start = self.pos + skip;
        if start >= self.text.len() {
            return None;
        }
        let chunk = &self.text[start..];
        let end_rel = chunk
            .char_indices()
            .find(|(_, c)| c.is_whitespace())
            .map_or(chunk.len(), |(i, _)| i);
        self.pos = start + end_rel;
        Some((start, &chunk[..end_rel]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_collapses() {
        assert_eq!(normalize_value("  New   York  City "), "new york city");
    }

    #[test]
    fn test_normalize_strips_articles_and_possessives() {
        assert_eq!(normalize_value("the Eiffel Tower"), "eiffel tower");
        assert_eq!(normalize_value("my favorite color"), "favorite color");
        assert_eq!(normalize_value("An Apple"), "apple");
    }

    #[test]
    fn test_normalize_preserves_decimals() {
        assert_eq!(normalize_value("99.9%"), "99.9%");
        assert_eq!(normalize_value("v3.11"), "v3.11");
    }

    #[test]
    fn test_normalize_drops_sentence_period() {
        assert_eq!(normalize_value("Seattle."), "seattle");
        assert_eq!(normalize_value("uptime is 99.9%."), "uptime is 99.9%");
    }

    #[test]
    fn test_normalize_is_total() {
        assert_eq!(normalize_value(""), "");
        assert_eq!(normalize_value("?!."), "");
    }

    #[test]
    fn test_tokenize_offsets_round_trip() {
        let text = "You work at Amazon and live in Seattle.";
        let tokens = tokenize(text);
        for tok in &tokens {
            assert_eq!(&text[tok.start..tok.end], tok.text);
        }
        assert_eq!(tokens.last().unwrap().text, "Seattle");
    }

    #[test]
    fn test_tokenize_keeps_version_token() {
        let tokens = tokenize("running Python 3.11.");
        assert_eq!(tokens[2].text, "3.11");
    }

    #[test]
    fn test_tokenize_skips_bare_punctuation() {
        let tokens = tokenize("yes — really");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["yes", "really"]);
    }
}
