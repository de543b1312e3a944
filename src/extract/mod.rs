//! The three-tier fact extractor.
//!
//! Tier-1 ([`patterns`]) runs regex families over clauses; Tier-1.5
//! ([`knowledge`]) infers facts from the verb ontology and entity
//! taxonomy; the [`merge`] stage unions both through the slot-alias
//! table so the same underlying fact is never counted twice. Tier-2 (the
//! semantic matcher) participates at matching time only, never during
//! extraction.

pub mod knowledge;
pub mod merge;
pub mod patterns;

pub use knowledge::{extract_knowledge_facts, KnowledgeFact};
pub use merge::{merge_facts, MergedFacts};
pub use patterns::{extract_pattern_facts, is_question};
