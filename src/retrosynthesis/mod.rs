//! Plan resolution: turns a target SMILES into a `NormalizedPlan`.
//!
//! The resolver never fails. Provider errors and a missing provider both
//! resolve to the placeholder plan, tagged so the caller can tell a real
//! plan from a fallback.

pub mod rxn;

pub use rxn::{normalize_rxn_response, RxnClient, RxnProvider};

use thiserror::Error;

use crate::config::Settings;
use crate::models::NormalizedPlan;
use crate::text::sanitize_smiles;

#[derive(Error, Debug)]
pub enum RetrosynthesisError {
    #[error("Retrosynthesis provider unreachable at {0}")]
    Connection(String),

    #[error("Retrosynthesis provider returned error (status {status}): {body}")]
    ProviderStatus { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Prediction {prediction_id} failed with status {status}")]
    PredictionFailed { prediction_id: String, status: String },

    #[error("Prediction {prediction_id} not ready after {attempts} polls")]
    Timeout { prediction_id: String, attempts: u32 },
}

/// A source of retrosynthesis plans for a target molecule.
pub trait RetrosynthesisProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Blocking; callers run this off the async executor.
    fn fetch_plan(&self, target_smiles: &str) -> Result<NormalizedPlan, RetrosynthesisError>;
}

/// Why the resolver fell back to the placeholder plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    NotConfigured,
    ProviderFailed(String),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "no retrosynthesis provider configured"),
            Self::ProviderFailed(e) => write!(f, "provider call failed: {e}"),
        }
    }
}

/// Outcome of plan resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanResolution {
    Resolved(NormalizedPlan),
    Fallback {
        plan: NormalizedPlan,
        reason: FallbackReason,
    },
}

impl PlanResolution {
    pub fn plan(&self) -> &NormalizedPlan {
        match self {
            Self::Resolved(plan) | Self::Fallback { plan, .. } => plan,
        }
    }

    pub fn into_plan(self) -> NormalizedPlan {
        match self {
            Self::Resolved(plan) | Self::Fallback { plan, .. } => plan,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

pub struct PlanResolver {
    provider: Option<Box<dyn RetrosynthesisProvider>>,
}

impl PlanResolver {
    pub fn new(provider: Option<Box<dyn RetrosynthesisProvider>>) -> Self {
        Self { provider }
    }

    /// Always answers with the placeholder plan.
    pub fn placeholder_only() -> Self {
        Self::new(None)
    }

    /// IBM RXN when an API key is configured, placeholder otherwise.
    pub fn from_settings(settings: &Settings) -> Self {
        let provider = RxnProvider::from_settings(settings)
            .map(|p| Box::new(p) as Box<dyn RetrosynthesisProvider>);
        Self::new(provider)
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Resolve a plan for `target_smiles`. Blocking when a provider is set.
    pub fn resolve(&self, target_smiles: &str) -> PlanResolution {
        let Some(provider) = &self.provider else {
            tracing::info!("Retrosynthesis provider not configured, using placeholder plan");
            return PlanResolution::Fallback {
                plan: NormalizedPlan::placeholder(target_smiles),
                reason: FallbackReason::NotConfigured,
            };
        };

        let query = sanitize_smiles(target_smiles);
        match provider.fetch_plan(&query) {
            Ok(mut plan) => {
                plan.target_smiles = target_smiles.to_string();
                PlanResolution::Resolved(plan)
            }
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "Provider call failed, using placeholder plan");
                PlanResolution::Fallback {
                    plan: NormalizedPlan::placeholder(target_smiles),
                    reason: FallbackReason::ProviderFailed(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::models::PlanSource;

    struct FailingProvider;

    impl RetrosynthesisProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn fetch_plan(&self, _target: &str) -> Result<NormalizedPlan, RetrosynthesisError> {
            Err(RetrosynthesisError::ProviderStatus {
                status: 503,
                body: "API Error".into(),
            })
        }
    }

    /// Records the query it was called with.
    struct RecordingProvider {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl RetrosynthesisProvider for RecordingProvider {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn fetch_plan(&self, target: &str) -> Result<NormalizedPlan, RetrosynthesisError> {
            self.seen.lock().unwrap().push(target.to_string());
            Ok(NormalizedPlan {
                source: PlanSource::IbmRxn,
                target_smiles: target.to_string(),
                steps: vec![],
            })
        }
    }

    #[test]
    fn unconfigured_resolver_falls_back() {
        let resolver = PlanResolver::placeholder_only();
        assert!(!resolver.is_configured());

        let resolution = resolver.resolve("CCO");
        assert!(resolution.is_fallback());
        assert_eq!(resolution.plan().source, PlanSource::Placeholder);
        assert!(matches!(
            resolution,
            PlanResolution::Fallback { reason: FallbackReason::NotConfigured, .. }
        ));
    }

    #[test]
    fn provider_error_falls_back_to_placeholder() {
        let resolver = PlanResolver::new(Some(Box::new(FailingProvider)));
        assert!(resolver.is_configured());

        let resolution = resolver.resolve("CCO");
        match &resolution {
            PlanResolution::Fallback { reason: FallbackReason::ProviderFailed(msg), .. } => {
                assert!(msg.contains("503"));
            }
            other => panic!("expected provider fallback, got {other:?}"),
        }
        let plan = resolution.into_plan();
        assert_eq!(plan.source, PlanSource::Placeholder);
        assert_eq!(plan.target_smiles, "CCO");
        assert!(plan.steps.is_empty());
    }

    #[test]
    fn provider_plan_is_used_and_query_sanitized() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let provider = RecordingProvider { seen: seen.clone() };
        let resolver = PlanResolver::new(Some(Box::new(provider)));

        let resolution = resolver.resolve(" CCO\n");
        assert!(!resolution.is_fallback());
        let plan = resolution.into_plan();
        assert_eq!(plan.source, PlanSource::IbmRxn);
        // Original string is kept on the plan.
        assert_eq!(plan.target_smiles, " CCO\n");
        assert_eq!(*seen.lock().unwrap(), vec!["CCO".to_string()]);
    }

    #[test]
    fn settings_without_key_build_placeholder_resolver() {
        let resolver = PlanResolver::from_settings(&Settings::default());
        assert!(!resolver.is_configured());
    }

    #[test]
    fn settings_with_key_build_rxn_resolver() {
        let settings = Settings {
            rxn_api_key: Some("test-key".into()),
            ..Settings::default()
        };
        assert!(PlanResolver::from_settings(&settings).is_configured());
    }

    #[test]
    fn fallback_reason_display() {
        assert_eq!(
            FallbackReason::NotConfigured.to_string(),
            "no retrosynthesis provider configured"
        );
        assert!(FallbackReason::ProviderFailed("boom".into())
            .to_string()
            .ends_with("boom"));
    }
}
