//! Tier-1 pattern extraction.
//!
//! Nine pattern families run over each clause. Families are tried in
//! order and the first family that matches a clause consumes it, with one
//! exception: the named-slot family may emit several facts from a single
//! clause when multiple named slots appear.
//!
//! Slots are discovered dynamically: families 2–9 derive the slot name
//! from the captured subject, so the extractor is not limited to the
//! built-in lexicon.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::clause::{split_clauses, Clause};
use crate::fact::{ExtractedFact, FactOrigin, SourceSpan};

/// Built-in named-slot lexicon: copular subject → canonical slot.
static NAMED_SLOT_LEXICON: &[(&str, &str)] = &[
    ("name", "name"),
    ("full name", "name"),
    ("employer", "employer"),
    ("company", "employer"),
    ("location", "location"),
    ("city", "location"),
    ("hometown", "location"),
    ("title", "title"),
    ("job title", "title"),
    ("role", "title"),
    ("position", "title"),
    ("occupation", "occupation"),
    ("job", "occupation"),
    ("age", "age"),
    ("school", "school"),
    ("university", "school"),
    ("college", "school"),
    ("degree", "degree"),
    ("major", "major"),
    ("minor", "minor"),
    ("favorite color", "favorite_color"),
    ("favourite colour", "favorite_color"),
    ("favorite food", "favorite_food"),
    ("coffee", "coffee"),
    ("coffee preference", "coffee"),
    ("hobby", "hobby"),
    ("pet", "pet"),
    ("project", "project"),
    ("current project", "project"),
    ("graduation year", "graduation_year"),
    ("programming experience", "programming_experience"),
    ("birthday", "birthday"),
    ("birth year", "birth_year"),
    ("budget", "budget"),
    ("salary", "salary"),
    ("team size", "team_size"),
    ("height", "height"),
    ("weight", "weight"),
    ("diet", "diet"),
    ("database", "database"),
    ("editor", "editor"),
    ("framework", "framework"),
    ("email", "email"),
    ("phone", "phone"),
    ("timezone", "timezone"),
];

/// Subjects too generic to become slots.
static SUBJECT_BLOCKLIST: &[&str] = &[
    "it", "this", "that", "he", "she", "they", "we", "you", "i", "there",
    "thing", "stuff", "problem", "issue", "point", "question", "answer",
    "fact", "truth", "reason", "way", "idea", "what", "where", "when",
    "why", "who", "which", "how", "whose", "everyone", "everything",
    "something", "nothing", "always", "never",
];

static QUESTION_OPENERS: &[&str] = &[
    "what", "where", "when", "why", "how", "who", "which", "whose",
    "whom", "do", "does", "did", "can", "could", "should", "would", "is",
    "are", "am", "was", "were", "tell me",
];

// ── Family 1: named-slot triggers ────────────────────────────────────

static STRUCTURED_FACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:FACT|PREF):\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+?)\s*$")
        .expect("structured fact regex")
});

static NAME_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:my|your|user'?s?)\s+name\s+is\s+([A-Za-z][A-Za-z'\-]*(?:\s+[A-Z][A-Za-z'\-]*){0,2})",
    )
    .expect("name declaration regex")
});

static NAMED_AS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:i|you|user|he|she|they)\s+(?:am|is|are)\s+(?:named|called)\s+([A-Za-z][A-Za-z'\-]*(?:\s+[A-Z][A-Za-z'\-]*){0,2})",
    )
    .expect("named-as regex")
});

static CALL_ME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bcall\s+me\s+([A-Za-z][A-Za-z'\-]*)").expect("call-me regex")
});

static EMPLOYER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:i|you|user|he|she|they)\s+)?(?:currently\s+)?(?:work(?:s)?\s+(?:at|for)|(?:am|is|are)\s+employed\s+(?:by|at))\s+([A-Za-z][\w&.' \-]{0,40}?)(?:\s+(?:and|as|in|on|but|where|since|with)\b|\s*$)",
    )
    .expect("employer regex")
});

static LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:(?:i|you|user|he|she|they)\s+)?(?:lives?|resides?)\s+in|(?:am|is|are)\s+based\s+in|moved\s+to)\s+([A-Za-z][\w.' \-]{0,40}?)(?:\s+(?:and|near|with|but|where|since)\b|\s*$)",
    )
    .expect("location regex")
});

static AGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:i'?m|i\s+am|you\s+are|you'?re|user\s+is|he\s+is|she\s+is|they\s+are|my\s+age\s+is)\s+(\d{1,3})\s+years?\s+old\b",
    )
    .expect("age regex")
});

static FAVORITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:my|your|user'?s?|his|her|their)\s+favou?rite\s+([a-z][a-z ]{0,20}?)\s+is\s+(.{1,60})$",
    )
    .expect("favorite regex")
});

static POSSESSIVE_COPULAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:my|your|our|his|her|their)\s+([a-z][a-z' ]{0,30}?)\s+(?:is|am|are|was|were)\s+(.{1,80})$",
    )
    .expect("possessive copular regex")
});

// ── Families 2–9 ─────────────────────────────────────────────────────

static BARE_COPULAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:my|your|our|his|her|their|the)\s+)?([A-Za-z][a-z']*(?:\s+[a-z']+){0,2})\s+(?:is|are|was|were)\s+(.{1,80})$",
    )
    .expect("bare copular regex")
});

static HAVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:my|your|our|his|her|their|the)\s+)?([A-Za-z][a-z']*(?:\s+[a-z']+){0,2})\s+(?:has|have)\s+(.{1,80})$",
    )
    .expect("have regex")
});

static ACTION_VERB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:the|our|my|their)\s+)?([A-Za-z][a-z']*(?:\s+[a-z']+){0,2})\s+(?:uses?|handles?|supports?|runs?|manufactures?|chose|picked|selected|provides?|utilizes?|leverages?)\s+(.{1,80})$",
    )
    .expect("action verb regex")
});

static REQUIREMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:the|our|my|their)\s+)?([A-Za-z][a-z']*(?:\s+[a-z']+){0,2})\s+(?:requires?|needs?|demands?)\s+(.{1,80})$",
    )
    .expect("requirement regex")
});

static DECISION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:we|they|i|the\s+team)\s+(?:agreed|decided|chose|picked|opted|committed)\s+(?:to\s+)?(?:use\s+|go\s+with\s+|adopt\s+|implement\s+|switch\s+to\s+)?(.{1,80})$",
    )
    .expect("decision regex")
});

static PRESCRIPTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:the|our|my|their)\s+)?([A-Za-z][a-z_' ]{1,25}?)\s+(?:should\s+be|must\s+be|needs?\s+to\s+be|has\s+to\s+be|ought\s+to\s+be)\s+(.{1,60})$",
    )
    .expect("prescriptive regex")
});

static DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^((?:always|never)\s+(?:use|write|add|include|run|prefer|avoid|skip|enable|disable)\s+.{1,60})$",
    )
    .expect("directive regex")
});

static PASSIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:the|our|my|their)\s+)?([A-Za-z][a-z']*(?:\s+[a-z']+){0,2})\s+(?:is|are)\s+(?:handled|managed|done|performed|served|implemented|achieved|provided)\s+(?:via|by|through|using|with)\s+(.{1,80})$",
    )
    .expect("passive regex")
});

static CONFIG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:the|our|my|their)\s+)?([A-Za-z][a-z_' ]{1,25}?)\s+(?:is\s+set\s+to|is\s+configured\s+(?:as|to)|equals?|=)\s+(.{1,60})$",
    )
    .expect("config regex")
});

/// Value prefixes that mark a clause as belonging to a later family, so
/// the copular families must not consume it.
static DEFERRED_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:set\s+to|configured|handled|managed|done|performed|served|implemented|achieved|provided)\b",
    )
    .expect("deferred value regex")
});

/// Values that signal a continuation, not a fact.
static REJECT_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:that|not|also|just|still|always|never|really|very)\b")
        .expect("reject value regex")
});

/// Conjunction tail trimmed off captured values.
static VALUE_TAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:but|so|though|because|however|which)\b.*$").expect("value tail regex")
});

/// Returns true for interrogative text that must not yield facts.
#[must_use]
pub fn is_question(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed.contains('?') {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    QUESTION_OPENERS
        .iter()
        .any(|q| lowered.starts_with(&format!("{q} ")))
}

/// Extracts Tier-1 facts from text, keyed by slot.
#[must_use]
pub fn extract_pattern_facts(text: &str) -> BTreeMap<String, ExtractedFact> {
    let mut facts = BTreeMap::new();

    // Structured declarations bypass the pattern families entirely.
    if let Some(m) = STRUCTURED_FACT_RE.captures(text) {
        if let (Some(slot), Some(value)) = (m.get(1), m.get(2)) {
            let slug = slug(slot.as_str());
            if !slug.is_empty() {
                store(
                    &mut facts,
                    &slug,
                    value.as_str(),
                    SourceSpan::new(value.start(), value.end()),
                    "structured",
                );
                return facts;
            }
        }
    }

    for clause in split_clauses(text) {
        if is_question(&clause.text) {
            continue;
        }
        extract_clause(&clause, &mut facts);
    }
    facts
}

fn extract_clause(clause: &Clause, facts: &mut BTreeMap<String, ExtractedFact>) {
    // Family 1: named slots; the only family allowed to emit several
    // facts from one clause.
    let named = extract_named_slots(clause, facts);
    if named {
        return;
    }

    let families: &[(&Lazy<Regex>, &str)] = &[
        (&BARE_COPULAR_RE, "bare_copular"),
        (&HAVE_RE, "possessive_have"),
        (&ACTION_VERB_RE, "action_verb"),
        (&REQUIREMENT_RE, "requirement"),
        (&PRESCRIPTIVE_RE, "prescriptive"),
        (&PASSIVE_RE, "passive"),
        (&CONFIG_RE, "config"),
    ];

    // The decision and directive families have no subject capture, so
    // they sit outside the table at their places in the family order.
    for (re, rule) in &families[..4] {
        if try_subject_value(re, clause, rule, facts) {
            return;
        }
    }
    if let Some(m) = DECISION_RE.captures(&clause.text) {
        if let Some(value) = m.get(1) {
            let cleaned = clean_value(value.as_str());
            if !cleaned.is_empty() {
                let slot = decision_slot(&cleaned);
                store(
                    facts,
                    slot,
                    &cleaned,
                    SourceSpan::new(value.start(), value.start() + cleaned.len())
                        .shifted(clause.offset),
                    "decision",
                );
                return;
            }
        }
    }
    for (re, rule) in &families[4..5] {
        if try_subject_value(re, clause, rule, facts) {
            return;
        }
    }
    if let Some(m) = DIRECTIVE_RE.captures(&clause.text) {
        if let Some(value) = m.get(1) {
            store(
                facts,
                "policy",
                value.as_str(),
                SourceSpan::new(value.start(), value.end()).shifted(clause.offset),
                "prescriptive",
            );
            return;
        }
    }
    for (re, rule) in &families[5..] {
        if try_subject_value(re, clause, rule, facts) {
            return;
        }
    }
}

/// Runs one subject/value family against a clause. Returns true when the
/// family consumed the clause.
fn try_subject_value(
    re: &Lazy<Regex>,
    clause: &Clause,
    rule: &str,
    facts: &mut BTreeMap<String, ExtractedFact>,
) -> bool {
    let Some(m) = re.captures(&clause.text) else {
        return false;
    };
    let (Some(subject), Some(value)) = (m.get(1), m.get(2)) else {
        return false;
    };
    // Copular shapes that really belong to the passive/config families
    // fall through to them.
    if matches!(rule, "bare_copular" | "possessive_have")
        && DEFERRED_VALUE_RE.is_match(value.as_str())
    {
        return false;
    }
    let slot = slug(subject.as_str());
    if slot.len() < 2 || SUBJECT_BLOCKLIST.contains(&slot.as_str()) {
        return false;
    }
    let cleaned = clean_value(value.as_str());
    if cleaned.is_empty() || REJECT_VALUE_RE.is_match(&cleaned) {
        return false;
    }
    store(
        facts,
        &slot,
        &cleaned,
        SourceSpan::new(value.start(), value.start() + cleaned.len())
            .shifted(clause.offset),
        rule,
    );
    true
}

/// Family 1. Returns true when at least one named-slot fact was emitted.
fn extract_named_slots(clause: &Clause, facts: &mut BTreeMap<String, ExtractedFact>) -> bool {
    let mut emitted = false;
    let text = &clause.text;

    for re in [&NAME_DECL_RE, &NAMED_AS_RE, &CALL_ME_RE] {
        if let Some(m) = re.captures(text) {
            if let Some(value) = m.get(1) {
                emitted |= store(
                    facts,
                    "name",
                    value.as_str(),
                    SourceSpan::new(value.start(), value.end()).shifted(clause.offset),
                    "named_slot",
                );
                break;
            }
        }
    }

    if let Some(m) = EMPLOYER_RE.captures(text) {
        if let Some(value) = m.get(1) {
            emitted |= store(
                facts,
                "employer",
                value.as_str().trim(),
                SourceSpan::new(value.start(), value.start() + value.as_str().trim_end().len())
                    .shifted(clause.offset),
                "named_slot",
            );
        }
    }

    if let Some(m) = LOCATION_RE.captures(text) {
        if let Some(value) = m.get(1) {
            emitted |= store(
                facts,
                "location",
                value.as_str().trim(),
                SourceSpan::new(value.start(), value.start() + value.as_str().trim_end().len())
                    .shifted(clause.offset),
                "named_slot",
            );
        }
    }

    if let Some(m) = AGE_RE.captures(text) {
        if let Some(value) = m.get(1) {
            emitted |= store(
                facts,
                "age",
                value.as_str(),
                SourceSpan::new(value.start(), value.end()).shifted(clause.offset),
                "named_slot",
            );
        }
    }

    if let Some(m) = FAVORITE_RE.captures(text) {
        if let (Some(subject), Some(value)) = (m.get(1), m.get(2)) {
            let slot = format!("favorite_{}", slug(subject.as_str()));
            let cleaned = clean_value(value.as_str());
            if !cleaned.is_empty() {
                emitted |= store(
                    facts,
                    &slot,
                    &cleaned,
                    SourceSpan::new(value.start(), value.start() + cleaned.len())
                        .shifted(clause.offset),
                    "named_slot",
                );
            }
        }
    }

    // Possessive copular with a lexicon subject ("my coffee preference
    // is dark roast").
    if let Some(m) = POSSESSIVE_COPULAR_RE.captures(text) {
        if let (Some(subject), Some(value)) = (m.get(1), m.get(2)) {
            let key = subject.as_str().trim().to_lowercase();
            if let Some((_, slot)) = NAMED_SLOT_LEXICON.iter().find(|(k, _)| *k == key) {
                let cleaned = clean_value(value.as_str());
                if !cleaned.is_empty() && !REJECT_VALUE_RE.is_match(&cleaned) {
                    emitted |= store(
                        facts,
                        slot,
                        &cleaned,
                        SourceSpan::new(value.start(), value.start() + cleaned.len())
                            .shifted(clause.offset),
                        "named_slot",
                    );
                }
            }
        }
    }

    emitted
}

/// Slot heuristic for the decision family.
fn decision_slot(value: &str) -> &'static str {
    static API_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\b(?:REST|GraphQL|SOAP|gRPC)\b").expect("api regex"));
    static ARCH_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)arch|pattern|micro|mono").expect("arch regex"));
    if API_RE.is_match(value) {
        "api_style"
    } else if ARCH_RE.is_match(value) {
        "architecture"
    } else {
        "decision"
    }
}

/// Normalizes a captured subject into a slot name.
fn slug(subject: &str) -> String {
    let mut out = String::new();
    for word in subject.to_lowercase().split_whitespace() {
        let word: String = word
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if word.is_empty() {
            continue;
        }
        if out.is_empty() && matches!(word.as_str(), "my" | "your" | "our" | "his" | "her" | "their" | "the") {
            continue;
        }
        if !out.is_empty() {
            out.push('_');
        }
        out.push_str(&word);
    }
    out
}

/// Trims a captured value: whitespace, any conjunction tail, then
/// trailing list punctuation.
fn clean_value(value: &str) -> String {
    let trimmed = value.trim();
    let cut = VALUE_TAIL_RE
        .find(trimmed)
        .map_or(trimmed.len(), |m| m.start());
    trimmed[..cut]
        .trim()
        .trim_end_matches([',', ';', ':'])
        .trim_end()
        .to_string()
}

/// Inserts a fact unless the slot is already claimed (earlier rules win).
fn store(
    facts: &mut BTreeMap<String, ExtractedFact>,
    slot: &str,
    value: &str,
    span: SourceSpan,
    rule: &str,
) -> bool {
    if facts.contains_key(slot) || value.is_empty() {
        return false;
    }
    facts.insert(
        slot.to_string(),
        ExtractedFact::new(slot, value, span, FactOrigin::pattern(rule)),
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_and_live_extracted_together() {
        let facts = extract_pattern_facts("You work at Amazon and live in Seattle");
        assert_eq!(facts["employer"].value, "Amazon");
        assert_eq!(facts["location"].value, "Seattle");
    }

    #[test]
    fn test_spans_point_at_values() {
        let text = "You work at Amazon and live in Seattle";
        let facts = extract_pattern_facts(text);
        let span = facts["employer"].source_span;
        assert_eq!(&text[span.start..span.end], "Amazon");
        let span = facts["location"].source_span;
        assert_eq!(&text[span.start..span.end], "Seattle");
    }

    #[test]
    fn test_continuation_shares_subject() {
        // "and live in" never opens a new clause; the location trigger
        // still fires on the shared-subject continuation.
        let facts = extract_pattern_facts("I work at Stripe and live in Berlin");
        assert_eq!(facts["employer"].value, "Stripe");
        assert_eq!(facts["location"].value, "Berlin");
    }

    #[test]
    fn test_name_declaration() {
        let facts = extract_pattern_facts("Your name is Bob");
        assert_eq!(facts["name"].value, "Bob");

        let facts = extract_pattern_facts("User is named Alice");
        assert_eq!(facts["name"].value, "Alice");
    }

    #[test]
    fn test_clause_split_copulars() {
        let facts = extract_pattern_facts("frontend is React, backend is FastAPI");
        assert_eq!(facts["frontend"].value, "React");
        assert_eq!(facts["backend"].value, "FastAPI");
    }

    #[test]
    fn test_prescriptive_single_digit() {
        let facts = extract_pattern_facts("Max retries should be 5");
        assert_eq!(facts["max_retries"].value, "5");
    }

    #[test]
    fn test_question_rejected() {
        assert!(extract_pattern_facts("Where do you work?").is_empty());
        assert!(extract_pattern_facts("What is the database").is_empty());
    }

    #[test]
    fn test_structured_fact() {
        let facts = extract_pattern_facts("FACT: name = Nick");
        assert_eq!(facts["name"].value, "Nick");
        assert_eq!(facts["name"].origin.rule, "structured");
    }

    #[test]
    fn test_passive_family() {
        let facts = extract_pattern_facts("auth is handled by Keycloak");
        assert_eq!(facts["auth"].value, "Keycloak");
        assert_eq!(facts["auth"].origin.rule, "passive");
    }

    #[test]
    fn test_config_family() {
        let facts = extract_pattern_facts("port is set to 8080");
        assert_eq!(facts["port"].value, "8080");
        assert_eq!(facts["port"].origin.rule, "config");
    }

    #[test]
    fn test_requirement_family() {
        let facts = extract_pattern_facts("the deployment requires approval from two reviewers");
        assert_eq!(
            facts["deployment"].value,
            "approval from two reviewers"
        );
    }

    #[test]
    fn test_decision_family() {
        let facts = extract_pattern_facts("We decided to use GraphQL");
        assert_eq!(facts["api_style"].value, "GraphQL");
    }

    #[test]
    fn test_directive() {
        let facts = extract_pattern_facts("Always use tabs for indentation");
        assert!(facts.contains_key("policy"));
    }

    #[test]
    fn test_favorite_dynamic_slot() {
        let facts = extract_pattern_facts("My favorite color is blue");
        assert_eq!(facts["favorite_color"].value, "blue");
    }

    #[test]
    fn test_age() {
        let facts = extract_pattern_facts("You are 32 years old");
        assert_eq!(facts["age"].value, "32");
    }

    #[test]
    fn test_decimal_value_preserved() {
        let facts = extract_pattern_facts("uptime should be 99.9%");
        assert_eq!(facts["uptime"].value, "99.9%");
    }

    #[test]
    fn test_blocklisted_subject_rejected() {
        let facts = extract_pattern_facts("that is fine");
        assert!(facts.is_empty());
    }

    #[test]
    fn test_value_tail_trimmed() {
        let facts = extract_pattern_facts("my editor is Neovim because it is fast");
        assert_eq!(facts["editor"].value, "Neovim");
    }
}
