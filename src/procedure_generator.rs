//! Template-based draft procedure generator.
//!
//! Expands a normalized plan and a lab context into a fixed ten-step
//! skeleton. Output is deterministic: the same inputs always produce the
//! same steps. Plan content only affects the step 1 rationale (via its
//! source tag); it never changes step count or order.

use std::collections::BTreeMap;

use crate::models::{LabContext, NormalizedPlan, ParamValue, PlanSource, ProcedureStep};

/// Every generated procedure has exactly this many steps.
pub const STEP_COUNT: usize = 10;

/// Equipment listed in the apparatus step is capped at this many entries.
pub const MAX_APPARATUS_ITEMS: usize = 5;

/// Alternatives listed in the purification step are capped at this many entries.
pub const MAX_PURIFICATION_ALTERNATIVES: usize = 2;

/// Scales below this (mg) call for an analytical balance.
const ANALYTICAL_BALANCE_BELOW_MG: f64 = 100.0;

const BASE_PPE: &[&str] = &["lab_coat", "safety_glasses", "appropriate_gloves"];

/// Generate a draft procedure from a retrosynthesis plan and lab context.
///
/// `notes` is accepted for forward compatibility and currently has no
/// effect on the output.
pub fn generate_procedure(
    plan: &NormalizedPlan,
    lab: &LabContext,
    _notes: Option<&str>,
) -> Vec<ProcedureStep> {
    let source_note = source_note(plan.source);

    vec![
        step(
            1,
            "Prepare workspace and review safety requirements",
            [
                ("location", "appropriate_workspace".into()),
                ("ppe", ppe_list(lab).into()),
                ("review", (&["sds_sheets", "institutional_protocols"][..]).into()),
            ],
            format!("Ensure proper safety setup before beginning{source_note}"),
        ),
        step(
            2,
            "Gather and verify all materials",
            [
                ("verification", "check_labels_and_purity".into()),
                ("scale", format_scale_mg(lab.scale_mg).into()),
            ],
            "Confirm all materials are available and appropriate",
        ),
        step(
            3,
            "Set up reaction apparatus",
            [
                ("equipment", apparatus_list(lab).into()),
                ("verification", "check_integrity".into()),
            ],
            "Proper equipment setup ensures reproducibility",
        ),
        step(
            4,
            "Weigh starting materials accurately",
            [
                ("balance_type", balance_type(lab.scale_mg).into()),
                ("record", "laboratory_notebook".into()),
            ],
            "Accurate measurement is essential for stoichiometry",
        ),
        step(
            5,
            "Combine reagents according to protocol",
            [
                ("order", "as_specified".into()),
                ("mixing", "appropriate_method".into()),
                ("atmosphere", atmosphere(lab).into()),
            ],
            "Order and conditions of addition affect outcome",
        ),
        step(
            6,
            "Monitor reaction progress",
            [
                (
                    "methods",
                    (&["visual_observation", "analytical_if_available"][..]).into(),
                ),
                ("interval", "periodic".into()),
                ("documentation", "record_observations".into()),
            ],
            "Monitoring ensures reaction proceeds as expected",
        ),
        step(
            7,
            "Confirm reaction completion and quench if needed",
            [
                ("confirmation", "appropriate_analytical_method".into()),
                ("quench", "as_required_by_reaction_type".into()),
            ],
            "Proper quenching ensures safety and product stability",
        ),
        step(
            8,
            "Perform workup procedure",
            [
                (
                    "steps",
                    (&["cool_if_needed", "transfer", "separate_phases_if_applicable"][..]).into(),
                ),
                ("waste_handling", "follow_institutional_guidelines".into()),
            ],
            "Workup isolates crude product from reaction mixture",
        ),
        step(
            9,
            "Purify product",
            [
                (
                    "primary_method",
                    lab.primary_purification().unwrap_or("appropriate_method").into(),
                ),
                ("alternatives", purification_alternatives(lab).into()),
            ],
            "Purification removes impurities to obtain clean product",
        ),
        step(
            10,
            "Characterize and store product",
            [
                ("characterization", "available_analytical_methods".into()),
                ("storage", "appropriate_container_and_conditions".into()),
                ("labeling", "complete_information".into()),
            ],
            "Proper characterization confirms identity; proper storage ensures stability",
        ),
    ]
}

fn step<const N: usize>(
    step_number: u32,
    action: &str,
    parameters: [(&str, ParamValue); N],
    rationale: impl Into<String>,
) -> ProcedureStep {
    ProcedureStep {
        step_number,
        action: action.to_string(),
        parameters: parameters
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect::<BTreeMap<_, _>>(),
        rationale: Some(rationale.into()),
    }
}

fn source_note(source: PlanSource) -> &'static str {
    match source {
        PlanSource::IbmRxn => " (Derived from IBM RXN plan - requires verification)",
        PlanSource::Placeholder => " (Placeholder procedure - requires full development)",
        PlanSource::UserProvided => "",
    }
}

fn ppe_list(lab: &LabContext) -> Vec<String> {
    let mut ppe: Vec<String> = BASE_PPE.iter().map(|s| s.to_string()).collect();
    if lab.experience_level.is_supervised() {
        ppe.push("supervisor_notification".to_string());
    }
    ppe
}

fn apparatus_list(lab: &LabContext) -> Vec<String> {
    if lab.equipment.is_empty() {
        return vec!["standard_glassware".to_string()];
    }
    lab.equipment.iter().take(MAX_APPARATUS_ITEMS).cloned().collect()
}

fn balance_type(scale_mg: f64) -> &'static str {
    if scale_mg < ANALYTICAL_BALANCE_BELOW_MG {
        "analytical"
    } else {
        "standard"
    }
}

/// First matching rule wins.
fn atmosphere(lab: &LabContext) -> &'static str {
    if lab.has_constraint("inert_atmosphere_required") {
        "inert_gas"
    } else if lab.has_constraint("no_glovebox") {
        "ambient_with_caution"
    } else {
        "as_specified_in_protocol"
    }
}

fn purification_alternatives(lab: &LabContext) -> Vec<String> {
    lab.purification_methods
        .iter()
        .skip(1)
        .take(MAX_PURIFICATION_ALTERNATIVES)
        .cloned()
        .collect()
}

/// Whole numbers keep one decimal (`500.0mg`); anything else prints its
/// shortest round-trip form (`12.5mg`). Magnitudes below 1e-4 or from 1e16
/// up switch to exponent form with a signed two-digit exponent (`1e-05mg`).
fn format_scale_mg(scale_mg: f64) -> String {
    let magnitude = scale_mg.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return format!("{}mg", exponent_form(scale_mg));
    }
    if scale_mg.fract() == 0.0 {
        format!("{scale_mg:.1}mg")
    } else {
        format!("{scale_mg}mg")
    }
}

fn exponent_form(value: f64) -> String {
    let lower = format!("{value:e}");
    match lower.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => lower,
    }
}
