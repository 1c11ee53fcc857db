use serde::{Deserialize, Serialize};

use super::enums::PlanSource;
use super::ValidationError;

/// One reaction of a retrosynthesis route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    #[serde(alias = "reaction_smiles", default)]
    pub rxn_smiles: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub notes: String,
}

/// Provider-independent retrosynthesis plan.
///
/// `target_smiles` is opaque: it is carried through, never parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPlan {
    pub source: PlanSource,
    pub target_smiles: String,
    pub steps: Vec<PlanStep>,
}

impl NormalizedPlan {
    /// Deterministic stand-in used whenever no provider plan is available.
    pub fn placeholder(target_smiles: &str) -> Self {
        Self {
            source: PlanSource::Placeholder,
            target_smiles: target_smiles.to_string(),
            steps: Vec::new(),
        }
    }

    pub fn user_provided(target_smiles: &str, steps: Vec<PlanStep>) -> Self {
        Self {
            source: PlanSource::UserProvided,
            target_smiles: target_smiles.to_string(),
            steps,
        }
    }
}

/// Plan body a caller may attach to a generate request.
///
/// Any `source` key the caller sends is ignored; the plan is always
/// tagged `user_provided`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProvidedPlan {
    #[serde(default)]
    pub steps: Vec<PlanStep>,
}

impl ProvidedPlan {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (idx, step) in self.steps.iter().enumerate() {
            if !(0.0..=1.0).contains(&step.confidence) {
                return Err(ValidationError::new(
                    format!("retrosynthesis_plan.steps[{idx}].confidence"),
                    "must be between 0 and 1",
                ));
            }
        }
        Ok(())
    }

    pub fn into_plan(self, target_smiles: &str) -> NormalizedPlan {
        NormalizedPlan::user_provided(target_smiles, self.steps)
    }
}
