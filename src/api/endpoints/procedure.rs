//! `POST /v1/generate-procedure`.
//!
//! Plan resolution (user plan, provider, or placeholder) → generator →
//! risk annotator → fixed response envelope. Resolution may block on the
//! provider, so the pipeline runs on a blocking worker.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, GenerateProcedureRequest, GenerateProcedureResponse};
use crate::config::API_VERSION;
use crate::models::NormalizedPlan;
use crate::procedure_generator::generate_procedure;
use crate::retrosynthesis::{PlanResolution, PlanResolver};
use crate::risk_annotator::annotate_risks;
use crate::text::truncate;

pub const DISCLAIMER: &str = "DRAFT PROCEDURE - This is a computer-generated draft intended for \
review by qualified professionals. It has not been validated and may contain errors. Users must \
verify all steps, assess risks, and ensure compliance with applicable regulations before \
execution. No warranty of safety, accuracy, or fitness for purpose is provided.";

/// Generate a draft lab procedure from a target molecule and lab context.
pub async fn generate(
    State(ctx): State<ApiContext>,
    payload: Result<Json<GenerateProcedureRequest>, JsonRejection>,
) -> Result<Json<GenerateProcedureResponse>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let request_id = Uuid::new_v4().to_string();
    tracing::info!(
        %request_id,
        target = %truncate(&req.target_smiles, 50, "..."),
        "Processing generate-procedure request"
    );

    let resolver = ctx.resolver.clone();
    let task_request_id = request_id.clone();
    let response = tokio::task::spawn_blocking(move || {
        build_response(&resolver, req, task_request_id)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("request {request_id} failed: {e}")))?;

    Ok(Json(response))
}

fn resolve_plan(
    resolver: &PlanResolver,
    req: &mut GenerateProcedureRequest,
    request_id: &str,
) -> NormalizedPlan {
    if let Some(provided) = req.retrosynthesis_plan.take() {
        tracing::info!(request_id, "Using user-provided retrosynthesis plan");
        return provided.into_plan(&req.target_smiles);
    }

    let resolution = resolver.resolve(&req.target_smiles);
    if let PlanResolution::Fallback { reason, .. } = &resolution {
        tracing::info!(request_id, %reason, "Falling back to placeholder plan");
    }
    tracing::info!(
        request_id,
        source = %resolution.plan().source,
        fallback = resolution.is_fallback(),
        "Resolved retrosynthesis plan"
    );
    resolution.into_plan()
}

fn build_response(
    resolver: &PlanResolver,
    mut req: GenerateProcedureRequest,
    request_id: String,
) -> GenerateProcedureResponse {
    let plan = resolve_plan(resolver, &mut req, &request_id);
    let procedure = generate_procedure(&plan, &req.lab_context, req.notes.as_deref());
    let annotation = annotate_risks(&procedure, &req.lab_context);

    tracing::debug!(
        request_id,
        steps = procedure.len(),
        risk_flags = annotation.risk_flags.len(),
        "Generated draft procedure"
    );

    GenerateProcedureResponse {
        procedure,
        risk_flags: annotation.risk_flags,
        fallback_options: annotation.fallback_options,
        citations: Vec::new(),
        disclaimer: DISCLAIMER,
        version: API_VERSION,
        request_id,
    }
}
