//! IBM RXN for Chemistry adapter.
//!
//! Flow: resolve project (configured id, else create `method-ai-default`)
//! → submit automatic retrosynthesis → poll until `SUCCESS` → normalize
//! the first retrosynthetic path.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{RetrosynthesisError, RetrosynthesisProvider};
use crate::config::Settings;
use crate::models::{NormalizedPlan, PlanSource, PlanStep};
use crate::text::truncate;

const API_PREFIX: &str = "rxn/api/api/v1";
const DEFAULT_PROJECT_NAME: &str = "method-ai-default";

/// HTTP client for the RXN REST API. Blocking.
pub struct RxnClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

#[derive(Deserialize)]
struct RxnEnvelope<T> {
    payload: T,
}

#[derive(Deserialize)]
struct IdPayload {
    id: String,
}

#[derive(Serialize)]
struct CreateProjectRequest<'a> {
    name: &'a str,
    invitations: [&'a str; 0],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrosynthesisRequest<'a> {
    project_id: &'a str,
    product: &'a str,
    fap: f64,
    max_steps: u32,
    n_beams: u32,
    pruning_steps: u32,
}

/// Prediction results as returned by the results endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RxnRetrosynthesisResults {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub retrosynthetic_paths: Vec<RxnPath>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RxnPath {
    #[serde(default)]
    pub reactions: Vec<RxnReaction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RxnReaction {
    #[serde(default)]
    pub rxn_smiles: String,
    #[serde(default)]
    pub confidence: f64,
}

impl RxnClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, RetrosynthesisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RetrosynthesisError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{API_PREFIX}/{path}", self.base_url)
    }

    pub fn create_project(&self, name: &str) -> Result<String, RetrosynthesisError> {
        let body = CreateProjectRequest { name, invitations: [] };
        let resp: RxnEnvelope<IdPayload> = self.send(self.client.post(self.url("projects")).json(&body))?;
        Ok(resp.payload.id)
    }

    /// Submit a prediction; returns its id.
    pub fn predict_automatic_retrosynthesis(
        &self,
        project_id: &str,
        product: &str,
    ) -> Result<String, RetrosynthesisError> {
        let body = RetrosynthesisRequest {
            project_id,
            product,
            fap: 0.6,
            max_steps: 3,
            n_beams: 10,
            pruning_steps: 2,
        };
        let resp: RxnEnvelope<IdPayload> =
            self.send(self.client.post(self.url("retrosynthesis")).json(&body))?;
        Ok(resp.payload.id)
    }

    pub fn get_retrosynthesis_results(
        &self,
        prediction_id: &str,
    ) -> Result<RxnRetrosynthesisResults, RetrosynthesisError> {
        let resp: RxnEnvelope<RxnRetrosynthesisResults> = self.send(
            self.client
                .get(self.url(&format!("retrosynthesis/{prediction_id}"))),
        )?;
        Ok(resp.payload)
    }

    fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<T, RetrosynthesisError> {
        let response = request
            .header(reqwest::header::AUTHORIZATION, self.api_key.as_str())
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    RetrosynthesisError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    RetrosynthesisError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else {
                    RetrosynthesisError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RetrosynthesisError::ProviderStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| RetrosynthesisError::MalformedResponse(e.to_string()))
    }
}

/// Turn RXN results into a normalized plan using the first path.
pub fn normalize_rxn_response(target_smiles: &str, results: &RxnRetrosynthesisResults) -> NormalizedPlan {
    let steps = results
        .retrosynthetic_paths
        .first()
        .map(|path| {
            path.reactions
                .iter()
                .enumerate()
                .map(|(idx, reaction)| PlanStep {
                    rxn_smiles: reaction.rxn_smiles.clone(),
                    confidence: reaction.confidence,
                    notes: format!("Step {} from IBM RXN", idx + 1),
                })
                .collect()
        })
        .unwrap_or_default();

    NormalizedPlan {
        source: PlanSource::IbmRxn,
        target_smiles: target_smiles.to_string(),
        steps,
    }
}

/// `RetrosynthesisProvider` backed by IBM RXN.
#[derive(Debug, Clone)]
pub struct RxnProvider {
    pub api_key: String,
    pub project_id: Option<String>,
    pub base_url: String,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl RxnProvider {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            project_id: None,
            base_url: base_url.to_string(),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(5),
            max_polls: 24,
        }
    }

    /// `None` when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let api_key = settings.rxn_api_key.as_deref()?;
        let mut provider = Self::new(api_key, &settings.rxn_base_url);
        provider.project_id = settings.rxn_project_id.clone();
        Some(provider)
    }

    fn wait_for_results(
        &self,
        client: &RxnClient,
        prediction_id: &str,
    ) -> Result<RxnRetrosynthesisResults, RetrosynthesisError> {
        for attempt in 1..=self.max_polls {
            let results = client.get_retrosynthesis_results(prediction_id)?;
            if results.status == "SUCCESS" {
                return Ok(results);
            }
            if matches!(results.status.as_str(), "ERROR" | "FAILED" | "FAILURE") {
                return Err(RetrosynthesisError::PredictionFailed {
                    prediction_id: prediction_id.to_string(),
                    status: results.status,
                });
            }
            tracing::debug!(prediction_id, attempt, status = %results.status, "RXN prediction not ready");
            if attempt < self.max_polls {
                std::thread::sleep(self.poll_interval);
            }
        }
        Err(RetrosynthesisError::Timeout {
            prediction_id: prediction_id.to_string(),
            attempts: self.max_polls,
        })
    }
}

impl RetrosynthesisProvider for RxnProvider {
    fn name(&self) -> &'static str {
        "ibm_rxn"
    }

    fn fetch_plan(&self, target_smiles: &str) -> Result<NormalizedPlan, RetrosynthesisError> {
        tracing::info!(target = %truncate(target_smiles, 50, "..."), "Calling IBM RXN");

        let client = RxnClient::new(&self.base_url, &self.api_key, self.request_timeout)?;
        let project_id = match &self.project_id {
            Some(id) => id.clone(),
            None => client.create_project(DEFAULT_PROJECT_NAME)?,
        };

        let prediction_id = client.predict_automatic_retrosynthesis(&project_id, target_smiles)?;
        let results = self.wait_for_results(&client, &prediction_id)?;
        Ok(normalize_rxn_response(target_smiles, &results))
    }
}
