//! Tier-1.5 knowledge-driven extraction.
//!
//! Runs after the pattern families on the same clauses, consulting the
//! verb ontology and entity taxonomy to infer facts that regexes miss:
//! "migrated to Postgres" means the database is PostgreSQL even though no
//! copular pattern fires.
//!
//! Per clause: recognize entities over token windows, recognize verb
//! phrases, then route each entity to its nearest verb. Special rules:
//! negative-sentiment context implies deprecation without a verb,
//! tentative cues downgrade adoption/migration, verbless clauses inherit
//! the previous clause's verb category, and migration clauses fuse their
//! from/to entities into a single fact.

use serde::{Deserialize, Serialize};

use crate::clause::split_clauses;
use crate::extract::patterns::is_question;
use crate::normalize::{tokenize, Token};
use crate::ontology::{Ontology, VerbCategory};

/// Sentiment tokens that imply deprecation of a nearby entity.
const NEGATIVE_CONTEXT: &[&str] = &[
    "disaster", "failed", "broke", "broken", "nightmare", "headache", "mess",
];

/// How many tokens away a negative-sentiment word may sit from an entity
/// and still taint it.
const NEGATIVE_WINDOW: usize = 3;

/// A fact inferred by Tier-1.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeFact {
    /// Canonical entity name from the taxonomy.
    pub entity: String,
    /// Taxonomy category (e.g. `database`, `language`).
    pub category: String,
    /// Semantic category of the triggering verb.
    pub verb_category: VerbCategory,
    /// 0-based position of the source clause.
    pub clause_index: usize,
    /// Tentative facts score 0.5, confirmed facts 1.0.
    pub confidence: f64,
    /// For migration facts: the entity being migrated away from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_from: Option<String>,
}

#[derive(Debug, Clone)]
struct VerbHit {
    category: VerbCategory,
    start_tok: usize,
    end_tok: usize,
}

#[derive(Debug, Clone)]
struct EntityHit {
    canonical: String,
    category: String,
    start_tok: usize,
    end_tok: usize,
    byte_start: usize,
    byte_end: usize,
}

/// Extracts knowledge facts from text using the supplied ontology.
#[must_use]
pub fn extract_knowledge_facts(text: &str, ontology: &Ontology) -> Vec<KnowledgeFact> {
    let mut facts = Vec::new();
    let mut inherited: Option<VerbCategory> = None;

    for clause in split_clauses(text) {
        if is_question(&clause.text) {
            inherited = None;
            continue;
        }

        let tokens = tokenize(&clause.text);
        let lower: Vec<String> = tokens.iter().map(|t| t.text.to_lowercase()).collect();

        let verbs = find_verb_hits(&lower, ontology);
        let mut entities = find_entity_hits(&tokens, &lower, &verbs, ontology);

        // Negative-sentiment context: the entity is being complained
        // about, which reads as deprecation even with no verb.
        let mut kept = Vec::new();
        for entity in entities.drain(..) {
            if near_negative_context(&lower, &entity) {
                facts.push(KnowledgeFact {
                    entity: entity.canonical,
                    category: entity.category,
                    verb_category: VerbCategory::Deprecation,
                    clause_index: clause.index,
                    confidence: VerbCategory::Deprecation.confidence(),
                    migrated_from: None,
                });
            } else {
                kept.push(entity);
            }
        }
        entities = kept;

        let migration = verbs
            .iter()
            .find(|v| v.category == VerbCategory::Migration)
            .cloned();
        if let Some(verb) = migration {
            fuse_migration(&clause.text, clause.index, &verb, &verbs, &mut entities, &mut facts);
        }

        route_entities(&entities, &verbs, inherited, clause.index, &mut facts);

        if let Some(first) = verbs.first() {
            inherited = Some(effective_category(first, &verbs));
        }
    }

    facts
}

/// Scans token windows against the verb ontology, longest phrase first.
fn find_verb_hits(lower: &[String], ontology: &Ontology) -> Vec<VerbHit> {
    let max_words = ontology.verbs.max_words().clamp(1, 3);
    let mut used = vec![false; lower.len()];
    let mut hits = Vec::new();

    for n in (1..=max_words).rev() {
        if n > lower.len() {
            continue;
        }
        for i in 0..=(lower.len() - n) {
            if used[i..i + n].iter().any(|u| *u) {
                continue;
            }
            let phrase = lower[i..i + n].join(" ");
            if let Some(category) = ontology.verbs.category_of(&phrase) {
                hits.push(VerbHit {
                    category,
                    start_tok: i,
                    end_tok: i + n,
                });
                used[i..i + n].iter_mut().for_each(|u| *u = true);
            }
        }
    }
    hits.sort_by_key(|h| h.start_tok);
    hits
}

/// Scans token windows against the entity taxonomy, longest name first.
/// Windows overlapping a verb hit are skipped, so the "go" of "go with"
/// never matches the Go language.
fn find_entity_hits(
    tokens: &[Token],
    lower: &[String],
    verbs: &[VerbHit],
    ontology: &Ontology,
) -> Vec<EntityHit> {
    let max_words = ontology.entities.max_words().clamp(1, 4);
    let mut used = vec![false; lower.len()];
    for verb in verbs {
        used[verb.start_tok..verb.end_tok]
            .iter_mut()
            .for_each(|u| *u = true);
    }

    let mut hits = Vec::new();
    for n in (1..=max_words).rev() {
        if n > lower.len() {
            continue;
        }
        for i in 0..=(lower.len() - n) {
            if used[i..i + n].iter().any(|u| *u) {
                continue;
            }
            let phrase = lower[i..i + n].join(" ");
            if let Some(info) = ontology.entities.entity_of(&phrase) {
                hits.push(EntityHit {
                    canonical: info.canonical.clone(),
                    category: info.category.clone(),
                    start_tok: i,
                    end_tok: i + n,
                    byte_start: tokens[i].start,
                    byte_end: tokens[i + n - 1].end,
                });
                used[i..i + n].iter_mut().for_each(|u| *u = true);
            }
        }
    }
    hits.sort_by_key(|h| h.start_tok);
    hits
}

fn near_negative_context(lower: &[String], entity: &EntityHit) -> bool {
    lower.iter().enumerate().any(|(i, tok)| {
        if !NEGATIVE_CONTEXT.contains(&tok.as_str()) {
            return false;
        }
        let dist = if i >= entity.end_tok {
            i - entity.end_tok + 1
        } else if i < entity.start_tok {
            entity.start_tok - i
        } else {
            0
        };
        dist <= NEGATIVE_WINDOW
    })
}

/// Applies the tentative override: a tentative cue earlier in the clause
/// downgrades an adoption or migration verb.
fn effective_category(verb: &VerbHit, all: &[VerbHit]) -> VerbCategory {
    if matches!(verb.category, VerbCategory::Adoption | VerbCategory::Migration)
        && all
            .iter()
            .any(|v| v.category == VerbCategory::Tentative && v.start_tok < verb.start_tok)
    {
        VerbCategory::Tentative
    } else {
        verb.category
    }
}

/// Fuses a migration clause into a single from→to fact, consuming the
/// involved entities so no standalone adoption/deprecation is emitted
/// for them.
fn fuse_migration(
    clause_text: &str,
    clause_index: usize,
    verb: &VerbHit,
    all_verbs: &[VerbHit],
    entities: &mut Vec<EntityHit>,
    facts: &mut Vec<KnowledgeFact>,
) {
    if entities.is_empty() {
        return;
    }

    let lower = clause_text.to_lowercase();
    let from_pos = find_cue(&lower, " from ");
    let to_pos = find_cue(&lower, " to ");
    let arrow_pos = clause_text.find('→').or_else(|| clause_text.find("->"));

    let (from_idx, to_idx) = if let Some(arrow) = arrow_pos {
        // "X → Y": source ends before the arrow, target starts after it.
        let from = entities.iter().position(|e| e.byte_end <= arrow);
        let to = entities.iter().position(|e| e.byte_start > arrow);
        (from, to)
    } else {
        let from = from_pos.and_then(|p| entities.iter().position(|e| e.byte_start >= p));
        let mut to = to_pos.and_then(|p| entities.iter().position(|e| e.byte_start >= p));
        if let (Some(f), Some(t)) = (from, to) {
            if f == t {
                // The source sits between "from" and "to"; the target is
                // the entity after it.
                to = if f + 1 < entities.len() { Some(f + 1) } else { None };
            }
        }
        match (from, to) {
            (None, None) if entities.len() == 1 => (None, Some(0)),
            (None, None) => {
                // No cue words: entity before the verb is the source,
                // entity after it is the target.
                let to = entities.iter().position(|e| e.start_tok >= verb.end_tok);
                let from = entities.iter().position(|e| e.end_tok <= verb.start_tok);
                (from, to)
            }
            pair => pair,
        }
    };

    let category = effective_category(verb, all_verbs);
    match (from_idx, to_idx) {
        (from, Some(to)) => {
            let migrated_from = from.map(|i| entities[i].canonical.clone());
            let target = entities[to].clone();
            facts.push(KnowledgeFact {
                entity: target.canonical,
                category: target.category,
                verb_category: category,
                clause_index,
                confidence: category.confidence(),
                migrated_from,
            });
            let mut consumed: Vec<usize> = from.into_iter().chain(Some(to)).collect();
            consumed.sort_unstable();
            for idx in consumed.into_iter().rev() {
                entities.remove(idx);
            }
        }
        (Some(from), None) => {
            // "migrated off X" with no target in sight.
            let source = entities.remove(from);
            facts.push(KnowledgeFact {
                entity: source.canonical,
                category: source.category,
                verb_category: VerbCategory::Deprecation,
                clause_index,
                confidence: VerbCategory::Deprecation.confidence(),
                migrated_from: None,
            });
        }
        (None, None) => {}
    }
}

fn find_cue(lower: &str, cue: &str) -> Option<usize> {
    lower.find(cue).map(|p| p + cue.len())
}

/// Attaches each remaining entity to its nearest verb; verbless clauses
/// inherit the previous clause's category.
fn route_entities(
    entities: &[EntityHit],
    verbs: &[VerbHit],
    inherited: Option<VerbCategory>,
    clause_index: usize,
    facts: &mut Vec<KnowledgeFact>,
) {
    // Tentative hits only act as routing targets when nothing else is
    // present ("considering Rust").
    let targets: Vec<&VerbHit> = {
        let non_tentative: Vec<&VerbHit> = verbs
            .iter()
            .filter(|v| {
                v.category != VerbCategory::Tentative
                    && v.category != VerbCategory::Migration
            })
            .collect();
        if non_tentative.is_empty() {
            verbs
                .iter()
                .filter(|v| v.category == VerbCategory::Tentative)
                .collect()
        } else {
            non_tentative
        }
    };

    for entity in entities {
        let category = if let Some(nearest) = nearest_verb(entity, &targets) {
            effective_category(nearest, verbs)
        } else if let Some(cat) = inherited {
            cat
        } else {
            continue;
        };
        facts.push(KnowledgeFact {
            entity: entity.canonical.clone(),
            category: entity.category.clone(),
            verb_category: category,
            clause_index,
            confidence: category.confidence(),
            migrated_from: None,
        });
    }
}

fn nearest_verb<'a>(entity: &EntityHit, verbs: &[&'a VerbHit]) -> Option<&'a VerbHit> {
    verbs
        .iter()
        .min_by_key(|v| {
            if entity.start_tok >= v.end_tok {
                entity.start_tok - v.end_tok
            } else if entity.end_tok <= v.start_tok {
                v.start_tok - entity.end_tok
            } else {
                0
            }
        })
        .copied()
}
