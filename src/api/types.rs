//! Shared state and wire types for the HTTP layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::feedback_store::FeedbackStore;
use crate::models::{FeedbackOutcome, LabContext, ProcedureStep, ProvidedPlan, ValidationError};
use crate::retrosynthesis::PlanResolver;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub settings: Arc<Settings>,
    pub resolver: Arc<PlanResolver>,
    pub feedback: Arc<FeedbackStore>,
}

impl ApiContext {
    /// Wire collaborators from settings: RXN when a key is configured,
    /// feedback log at the configured path.
    pub fn new(settings: Settings) -> Self {
        let resolver = PlanResolver::from_settings(&settings);
        let feedback = FeedbackStore::new(settings.feedback_storage_path.clone());
        Self::with_parts(settings, resolver, feedback)
    }

    pub fn with_parts(settings: Settings, resolver: PlanResolver, feedback: FeedbackStore) -> Self {
        Self {
            settings: Arc::new(settings),
            resolver: Arc::new(resolver),
            feedback: Arc::new(feedback),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Generate procedure
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateProcedureRequest {
    /// Opaque; never parsed.
    pub target_smiles: String,
    pub lab_context: LabContext,
    pub retrosynthesis_plan: Option<ProvidedPlan>,
    pub notes: Option<String>,
}

impl GenerateProcedureRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.lab_context.validate()?;
        if let Some(plan) = &self.retrosynthesis_plan {
            plan.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateProcedureResponse {
    pub procedure: Vec<ProcedureStep>,
    pub risk_flags: Vec<String>,
    pub fallback_options: Vec<String>,
    pub citations: Vec<String>,
    pub disclaimer: &'static str,
    pub version: &'static str,
    pub request_id: String,
}

// ═══════════════════════════════════════════════════════════
// Feedback
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub request_id: String,
    pub edits: String,
    pub outcome: FeedbackOutcome,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub stored: bool,
}
