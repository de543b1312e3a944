//! The curated knowledge tables behind Tier-1.5 extraction.
//!
//! Three tables, loaded once at construction into immutable structures
//! and threaded through the pipeline as an explicit value (no process
//! singletons, so tests stay hermetic and can supply overrides):
//!
//! - [`VerbOntology`] — canonical verb phrase → verb category, longest
//!   match wins.
//! - [`EntityTaxonomy`] — canonical entity name → category, plus an alias
//!   table; matched case-insensitively against token windows.
//! - [`SlotAliases`] — taxonomy category → Tier-1 slot name, owned by the
//!   fact merger.
//!
//! Malformed entries are skipped with a warning; duplicate entity names
//! across categories resolve first-seen.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::OntologyError;

/// Embedded default verb table.
const DEFAULT_VERBS: &str = include_str!("../data/verb_ontology.json");
/// Embedded default entity table.
const DEFAULT_ENTITIES: &str = include_str!("../data/entity_taxonomy.json");

/// Semantic category of a recognized verb phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbCategory {
    /// Taking something into use.
    Adoption,
    /// Moving from one thing to another.
    Migration,
    /// No longer using something.
    Deprecation,
    /// Considering, not committed.
    Tentative,
    /// What something can do.
    Capability,
    /// What something cannot do.
    Limitation,
    /// Ownership or responsibility.
    Assignment,
    /// A hard dependency or constraint.
    Requirement,
    /// A stated preference.
    Preference,
    /// Building or authoring something.
    Creation,
}

impl VerbCategory {
    /// All categories, in table order.
    pub const ALL: [Self; 10] = [
        Self::Adoption,
        Self::Migration,
        Self::Deprecation,
        Self::Tentative,
        Self::Capability,
        Self::Limitation,
        Self::Assignment,
        Self::Requirement,
        Self::Preference,
        Self::Creation,
    ];

    /// Parses a JSON table key into a category.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == key)
    }

    /// The snake_case table key for this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Adoption => "adoption",
            Self::Migration => "migration",
            Self::Deprecation => "deprecation",
            Self::Tentative => "tentative",
            Self::Capability => "capability",
            Self::Limitation => "limitation",
            Self::Assignment => "assignment",
            Self::Requirement => "requirement",
            Self::Preference => "preference",
            Self::Creation => "creation",
        }
    }

    /// Base confidence for facts inferred through this category:
    /// tentative claims score 0.5, confirmed claims 1.0.
    #[must_use]
    pub const fn confidence(self) -> f64 {
        match self {
            Self::Tentative => 0.5,
            _ => 1.0,
        }
    }
}

impl fmt::Display for VerbCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mapping from canonical verb phrases to verb categories.
#[derive(Debug, Clone, Default)]
pub struct VerbOntology {
    by_phrase: HashMap<String, VerbCategory>,
    max_words: usize,
}

impl VerbOntology {
    /// Parses the verb table from its JSON form: an object whose keys are
    /// the ten category names and whose values are arrays of phrases.
    ///
    /// # Errors
    ///
    /// Returns [`OntologyError::Unparseable`] for invalid JSON and
    /// [`OntologyError::EmptyTable`] when nothing usable remains.
    pub fn from_json_str(json: &str) -> Result<Self, OntologyError> {
        let raw: serde_json::Value =
            serde_json::from_str(json).map_err(|e| OntologyError::Unparseable {
                path: "verb_ontology.json".to_string(),
                reason: e.to_string(),
            })?;
        let Some(raw) = raw.as_object() else {
            return Err(OntologyError::Unparseable {
                path: "verb_ontology.json".to_string(),
                reason: "top level is not an object".to_string(),
            });
        };

        let mut by_phrase = HashMap::new();
        let mut max_words = 0;
        // serde_json maps iterate in sorted key order, which keeps the
        // first-seen duplicate rule deterministic across runs.
        for (key, value) in raw {
            let Some(category) = VerbCategory::from_key(key) else {
                warn!(category = %key, "skipping unknown verb category");
                continue;
            };
            let Some(items) = value.as_array() else {
                warn!(category = %key, "skipping verb category: not an array");
                continue;
            };
            for item in items {
                let Some(phrase) = item.as_str() else {
                    warn!(category = %key, "skipping non-string verb entry");
                    continue;
                };
                let phrase = phrase.trim().to_lowercase();
                let words = phrase.split_whitespace().count();
                if phrase.is_empty() || words > 3 {
                    warn!(phrase = %phrase, "skipping malformed verb phrase");
                    continue;
                }
                // First-seen wins on duplicates.
                by_phrase.entry(phrase).or_insert(category);
                max_words = max_words.max(words);
            }
        }

        if by_phrase.is_empty() {
            return Err(OntologyError::EmptyTable {
                table: "verb_ontology".to_string(),
            });
        }
        Ok(Self {
            by_phrase,
            max_words,
        })
    }

    /// Looks up a lowercase phrase.
    #[must_use]
    pub fn category_of(&self, phrase: &str) -> Option<VerbCategory> {
        self.by_phrase.get(phrase).copied()
    }

    /// Longest phrase length in words, bounding the scan window.
    #[must_use]
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Number of phrases in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_phrase.len()
    }

    /// Returns true when the table holds no phrases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_phrase.is_empty()
    }
}

/// A canonical entity with its taxonomy category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInfo {
    /// Canonical name as shipped in the table (original casing).
    pub canonical: String,
    /// Taxonomy category (e.g. `database`, `language`).
    pub category: String,
}

/// On-disk shape of the entity taxonomy file.
#[derive(Debug, Deserialize)]
struct EntityTaxonomyFile {
    categories: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    aliases: serde_json::Map<String, serde_json::Value>,
}

/// Mapping from entity names and aliases to canonical entities.
#[derive(Debug, Clone, Default)]
pub struct EntityTaxonomy {
    by_name: HashMap<String, EntityInfo>,
    max_words: usize,
}

impl EntityTaxonomy {
    /// Parses the entity table from its JSON form: `categories` mapping
    /// category → entity list, and `aliases` mapping alias → canonical.
    ///
    /// # Errors
    ///
    /// Returns [`OntologyError::Unparseable`] for invalid JSON and
    /// [`OntologyError::EmptyTable`] when nothing usable remains.
    pub fn from_json_str(json: &str) -> Result<Self, OntologyError> {
        let raw: EntityTaxonomyFile =
            serde_json::from_str(json).map_err(|e| OntologyError::Unparseable {
                path: "entity_taxonomy.json".to_string(),
                reason: e.to_string(),
            })?;

        let mut by_name: HashMap<String, EntityInfo> = HashMap::new();
        let mut max_words = 0;
        for (category, value) in &raw.categories {
            let Some(items) = value.as_array() else {
                warn!(category = %category, "skipping entity category: not an array");
                continue;
            };
            for item in items {
                let Some(name) = item.as_str() else {
                    warn!(category = %category, "skipping non-string entity entry");
                    continue;
                };
                let name = name.trim();
                let key = name.to_lowercase();
                let words = key.split_whitespace().count();
                if key.is_empty() || words > 4 {
                    warn!(entity = %name, "skipping malformed entity name");
                    continue;
                }
                if by_name.contains_key(&key) {
                    warn!(entity = %name, "duplicate entity name; keeping first-seen");
                    continue;
                }
                by_name.insert(
                    key,
                    EntityInfo {
                        canonical: name.to_string(),
                        category: category.clone(),
                    },
                );
                max_words = max_words.max(words);
            }
        }

        for (alias, value) in &raw.aliases {
            let Some(target) = value.as_str() else {
                warn!(alias = %alias, "skipping non-string alias target");
                continue;
            };
            let Some(info) = by_name.get(&target.to_lowercase()).cloned() else {
                warn!(alias = %alias, target = %target, "skipping alias to unknown entity");
                continue;
            };
            let key = alias.trim().to_lowercase();
            let words = key.split_whitespace().count();
            if key.is_empty() || words > 4 || by_name.contains_key(&key) {
                continue;
            }
            max_words = max_words.max(words);
            by_name.insert(key, info);
        }

        if by_name.is_empty() {
            return Err(OntologyError::EmptyTable {
                table: "entity_taxonomy".to_string(),
            });
        }
        Ok(Self { by_name, max_words })
    }

    /// Looks up a lowercase name or alias.
    #[must_use]
    pub fn entity_of(&self, name: &str) -> Option<&EntityInfo> {
        self.by_name.get(name)
    }

    /// Longest name length in words, bounding the scan window.
    #[must_use]
    pub fn max_words(&self) -> usize {
        self.max_words.min(4)
    }

    /// Number of names and aliases in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true when the table holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Many-to-one mapping from taxonomy category to Tier-1 slot name.
///
/// Owned by the fact merger: both tiers speak their own slot vocabulary
/// and this single table collapses them (no ad-hoc dedupe scattered
/// through the extractors).
#[derive(Debug, Clone)]
pub struct SlotAliases {
    map: HashMap<&'static str, &'static str>,
}

impl SlotAliases {
    /// Resolves a taxonomy category to its Tier-1 slot; categories with
    /// no alias keep their own name.
    #[must_use]
    pub fn slot_for<'a>(&'a self, category: &'a str) -> &'a str {
        self.map.get(category).copied().unwrap_or(category)
    }
}

impl Default for SlotAliases {
    fn default() -> Self {
        let map = HashMap::from([
            ("database", "database"),
            ("language", "programming_language"),
            ("frontend_framework", "framework"),
            ("backend_framework", "framework"),
            ("cloud_provider", "cloud"),
            ("orchestration", "orchestration"),
            ("message_queue", "message_queue"),
            ("monitoring", "monitoring"),
            ("os", "os"),
            ("editor", "editor"),
            ("testing", "testing"),
            ("vcs", "vcs"),
            ("auth", "auth"),
            ("package_manager", "package_manager"),
            ("api_style", "api_style"),
        ]);
        Self { map }
    }
}

/// The three tables as one immutable value.
#[derive(Debug, Clone)]
pub struct Ontology {
    /// Verb phrase table.
    pub verbs: VerbOntology,
    /// Entity name/alias table.
    pub entities: EntityTaxonomy,
    /// Category → slot mapping for the merger.
    pub slots: SlotAliases,
}

impl Ontology {
    /// Loads the tables shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`OntologyError`] if the embedded tables fail to parse.
    pub fn embedded() -> Result<Self, OntologyError> {
        Ok(Self {
            verbs: VerbOntology::from_json_str(DEFAULT_VERBS)?,
            entities: EntityTaxonomy::from_json_str(DEFAULT_ENTITIES)?,
            slots: SlotAliases::default(),
        })
    }

    /// Loads the tables from caller-supplied files.
    ///
    /// # Errors
    ///
    /// Returns [`OntologyError::Missing`] when a file is absent and
    /// [`OntologyError::Unparseable`] when one fails to parse.
    pub fn from_files(
        verb_path: impl AsRef<Path>,
        entity_path: impl AsRef<Path>,
    ) -> Result<Self, OntologyError> {
        let verbs_json = read_table(verb_path.as_ref())?;
        let entities_json = read_table(entity_path.as_ref())?;
        Ok(Self {
            verbs: VerbOntology::from_json_str(&verbs_json)?,
            entities: EntityTaxonomy::from_json_str(&entities_json)?,
            slots: SlotAliases::default(),
        })
    }
}

fn read_table(path: &Path) -> Result<String, OntologyError> {
    std::fs::read_to_string(path).map_err(|_| OntologyError::Missing {
        path: path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_tables_load() {
        let ontology = Ontology::embedded().unwrap();
        assert!(ontology.verbs.len() > 50);
        assert!(ontology.entities.len() > 100);
    }

    #[test]
    fn test_verb_lookup() {
        let ontology = Ontology::embedded().unwrap();
        assert_eq!(
            ontology.verbs.category_of("migrated from"),
            Some(VerbCategory::Migration)
        );
        assert_eq!(
            ontology.verbs.category_of("going with"),
            Some(VerbCategory::Adoption)
        );
        assert_eq!(ontology.verbs.category_of("frobnicate"), None);
    }

    #[test]
    fn test_entity_alias_resolution() {
        let ontology = Ontology::embedded().unwrap();
        let info = ontology.entities.entity_of("postgres").unwrap();
        assert_eq!(info.canonical, "PostgreSQL");
        assert_eq!(info.category, "database");
        // Case-insensitive by construction: lookups are lowercase.
        assert!(ontology.entities.entity_of("mysql").is_some());
    }

    #[test]
    fn test_multiword_entity() {
        let ontology = Ontology::embedded().unwrap();
        let info = ontology.entities.entity_of("spring boot").unwrap();
        assert_eq!(info.category, "backend_framework");
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let verbs =
            VerbOntology::from_json_str(r#"{"adoption": ["use", 42, null], "bogus": ["x"]}"#)
                .unwrap();
        assert_eq!(verbs.len(), 1);
        assert_eq!(verbs.category_of("use"), Some(VerbCategory::Adoption));
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = VerbOntology::from_json_str(r#"{"bogus": ["x"]}"#).unwrap_err();
        assert!(matches!(err, OntologyError::EmptyTable { .. }));
    }

    #[test]
    fn test_unparseable_rejected() {
        let err = VerbOntology::from_json_str("not json").unwrap_err();
        assert!(matches!(err, OntologyError::Unparseable { .. }));
    }

    #[test]
    fn test_duplicate_entities_first_seen() {
        let taxonomy = EntityTaxonomy::from_json_str(
            r#"{"categories": {"a": ["Thing"], "b": ["Thing"]}, "aliases": {}}"#,
        )
        .unwrap();
        assert_eq!(taxonomy.len(), 1);
        // Sorted-key iteration makes first-seen deterministic.
        assert_eq!(taxonomy.entity_of("thing").unwrap().category, "a");
    }

    #[test]
    fn test_slot_aliases() {
        let slots = SlotAliases::default();
        assert_eq!(slots.slot_for("language"), "programming_language");
        assert_eq!(slots.slot_for("database"), "database");
        assert_eq!(slots.slot_for("unmapped_category"), "unmapped_category");
    }

    #[test]
    fn test_tentative_confidence() {
        assert!((VerbCategory::Tentative.confidence() - 0.5).abs() < f64::EPSILON);
        assert!((VerbCategory::Adoption.confidence() - 1.0).abs() < f64::EPSILON);
    }
}
