//! # GroundCheck — grounding verification for agent-generated text
//!
//! GroundCheck detects hallucinations in drafts produced by AI agents by
//! cross-checking them against a set of retrieved memories whose
//! reliability is known. Given a draft and a collection of trust-scored
//! memories it returns a structured verdict: which factual claims are
//! supported, which contradict the memories, an optionally rewritten
//! draft with hallucinated values replaced by grounded ones, a
//! confidence score, and a disclosure flag telling the caller whether
//! the user must be warned of conflicting sources.
//!
//! ## Core Concepts
//!
//! - **Memory**: a trust-scored piece of grounding text
//! - **Fact**: an atomic (slot, value) claim extracted from text
//! - **Grounding**: the relation from a draft claim to its supporting memory
//! - **Contradiction**: two memories asserting different values on an
//!   exclusive slot
//!
//! ## Usage
//!
//! ```rust
//! use groundcheck::{GroundCheck, GroundCheckOptions, Memory, VerifyMode};
//!
//! let verifier = GroundCheck::new(GroundCheckOptions::default())?;
//! let memories = vec![
//!     Memory::with_trust("m1", "User works at Microsoft", 0.9),
//!     Memory::with_trust("m2", "User lives in Seattle", 0.8),
//! ];
//!
//! let report = verifier.verify(
//!     "You work at Amazon and live in Seattle",
//!     &memories,
//!     VerifyMode::Strict,
//! )?;
//!
//! assert!(!report.passed);
//! assert_eq!(report.hallucinations, vec!["Amazon"]);
//! assert_eq!(
//!     report.corrected.as_deref(),
//!     Some("You work at Microsoft and live in Seattle"),
//! );
//! # Ok::<(), groundcheck::GroundCheckError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod clause;
pub mod contradiction;
pub mod error;
pub mod extract;
pub mod fact;
pub mod grounding;
pub mod memory;
pub mod normalize;
pub mod ontology;
pub mod report;
pub mod score;
pub mod semantic;
pub mod verifier;

// Re-export primary types at crate root for convenience
pub use contradiction::{classify_slot, ContradictionDetail, MemoryFact, SlotClass};
pub use error::{GroundCheckError, GroundResult, OntologyError, ValidationError};
pub use extract::{KnowledgeFact, MergedFacts};
pub use fact::{ExtractedFact, FactOrigin, SourceSpan, Tier};
pub use grounding::{MatchConfig, MatchStrategy, Support};
pub use memory::Memory;
pub use ontology::{EntityTaxonomy, Ontology, SlotAliases, VerbCategory, VerbOntology};
pub use report::{VerificationReport, VerifyMode};
pub use semantic::{Entailment, EntailmentJudgment, LexicalMatcher, SemanticMatcher};
pub use verifier::{GroundCheck, GroundCheckOptions, VerifierConfig};
