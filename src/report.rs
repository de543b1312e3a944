//! The verification report — the output contract.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::contradiction::ContradictionDetail;
use crate::error::ValidationError;
use crate::fact::ExtractedFact;

/// Verification mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyMode {
    /// Report problems and rewrite hallucinated values where a grounded
    /// replacement exists.
    Strict,
    /// Report problems without rewriting.
    Permissive,
}

impl fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Permissive => write!(f, "permissive"),
        }
    }
}

impl FromStr for VerifyMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            other => Err(ValidationError::UnknownMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// The structured verdict for one draft.
///
/// Maps are ordered so two runs on identical inputs serialize to
/// identical reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True iff no hallucinations and no contradiction touches a
    /// draft-extracted slot.
    pub passed: bool,

    /// Rewritten draft; present only in strict mode, on failure, when at
    /// least one hallucinated value had a grounded replacement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected: Option<String>,

    /// Raw values of unsupported claims.
    #[serde(default)]
    pub hallucinations: Vec<String>,

    /// Slot → supporting memory id, or None for ungrounded slots. Keys
    /// mirror `facts_extracted` exactly.
    #[serde(default)]
    pub grounding_map: BTreeMap<String, Option<String>>,

    /// Confidence in [0.0, 1.0].
    pub confidence: f64,

    /// Conflicts found among the supplied memories.
    #[serde(default)]
    pub contradiction_details: Vec<ContradictionDetail>,

    /// True when conflicting sources oblige the caller to warn the user.
    pub requires_disclosure: bool,

    /// Claims extracted from the draft, by slot.
    #[serde(default)]
    pub facts_extracted: BTreeMap<String, ExtractedFact>,
}

impl VerificationReport {
    /// Report for a draft with nothing to verify.
    #[must_use]
    pub fn empty_pass() -> Self {
        Self {
            passed: true,
            corrected: None,
            hallucinations: Vec::new(),
            grounding_map: BTreeMap::new(),
            confidence: 1.0,
            contradiction_details: Vec::new(),
            requires_disclosure: false,
            facts_extracted: BTreeMap::new(),
        }
    }
}
