//! Rule-based risk annotation for generated procedures.
//!
//! Six rule categories run in a fixed order and append human-readable
//! flags: safety constraints, equipment, experience, time, scale, and a
//! trailing verification reminder. Flags keep append order; nothing is
//! sorted or deduplicated. Fallback options are an independent list.

use serde::Serialize;

use crate::models::{ExperienceLevel, LabContext, ProcedureStep};

/// Always the last risk flag.
pub const VERIFICATION_REMINDER: &str =
    "All procedures require verification by qualified personnel before execution";

/// Known safety-constraint tokens and the flag each one raises.
const SAFETY_CONSTRAINT_FLAGS: &[(&str, &str)] = &[
    (
        "no_glovebox",
        "No glovebox available - verify air/moisture sensitivity requirements",
    ),
    (
        "no_fume_hood",
        "No fume hood noted - ensure adequate ventilation for all operations",
    ),
    (
        "no_open_flame",
        "Open flame restricted - use alternative heating methods",
    ),
    (
        "limited_ventilation",
        "Limited ventilation - restrict use of volatile materials",
    ),
];

const ANALYTICAL_EQUIPMENT: &[&str] = &["nmr", "hplc", "gc", "mass_spec", "ir"];
const CHROMATOGRAPHY_METHODS: &[&str] = &["column_chromatography", "hplc"];
const ROTARY_EVAPORATORS: &[&str] = &["rotovap", "rotary_evaporator"];

pub const LIMITED_ANALYTICAL_FLAG: &str =
    "Limited analytical equipment - product verification may be constrained";
pub const NO_CHROMATOGRAPHY_FLAG: &str =
    "No chromatography available - ensure alternative purification is suitable";
pub const NO_ROTOVAP_FLAG: &str =
    "No rotary evaporator - solvent removal may require alternative approach";

pub const LIMITED_TIME_FLAG: &str =
    "Limited time budget - ensure procedure can be safely paused if needed";
pub const VERY_SHORT_TIME_FLAG: &str =
    "Very short time window - consider breaking into multiple sessions";

/// Hours.
const LIMITED_TIME_BELOW: f64 = 4.0;
const VERY_SHORT_TIME_BELOW: f64 = 2.0;

/// Milligrams.
const LARGE_SCALE_ABOVE: f64 = 10_000.0;
const SMALL_SCALE_BELOW: f64 = 10.0;

const SOLVENT_FALLBACK: &str =
    "Alternative solvent systems may be considered if primary choice unavailable";
const TEMPERATURE_FALLBACK: &str =
    "Temperature profile can be adjusted based on reaction monitoring";
const GENERIC_PURIFICATION_FALLBACK: &str =
    "Consider alternative purification approach if primary method insufficient";

/// Methods listed in the purification fallback.
const MAX_LISTED_PURIFICATION_METHODS: usize = 3;

/// Warnings and alternatives for one generated procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiskAnnotation {
    pub risk_flags: Vec<String>,
    pub fallback_options: Vec<String>,
}

/// Annotate risks for a procedure run under `lab`.
///
/// The current rules only read the lab context; the procedure is part of
/// the contract so step-aware rules can be added without changing callers.
pub fn annotate_risks(_procedure: &[ProcedureStep], lab: &LabContext) -> RiskAnnotation {
    let mut risk_flags = Vec::new();

    safety_constraint_flags(lab, &mut risk_flags);
    equipment_flags(lab, &mut risk_flags);
    experience_flags(lab.experience_level, &mut risk_flags);
    time_flags(lab.time_budget_hours, &mut risk_flags);
    scale_flags(lab.scale_mg, &mut risk_flags);
    risk_flags.push(VERIFICATION_REMINDER.to_string());

    RiskAnnotation {
        risk_flags,
        fallback_options: fallback_options(lab),
    }
}

/// Unknown tokens are ignored.
fn safety_constraint_flags(lab: &LabContext, flags: &mut Vec<String>) {
    for (token, flag) in SAFETY_CONSTRAINT_FLAGS {
        if lab.has_constraint(token) {
            flags.push(flag.to_string());
        }
    }
}

fn equipment_flags(lab: &LabContext, flags: &mut Vec<String>) {
    if !ANALYTICAL_EQUIPMENT.iter().any(|eq| lab.has_equipment(eq)) {
        flags.push(LIMITED_ANALYTICAL_FLAG.to_string());
    }
    if !CHROMATOGRAPHY_METHODS.iter().any(|m| lab.has_purification(m)) {
        flags.push(NO_CHROMATOGRAPHY_FLAG.to_string());
    }
    if !ROTARY_EVAPORATORS.iter().any(|eq| lab.has_equipment(eq)) {
        flags.push(NO_ROTOVAP_FLAG.to_string());
    }
}

fn experience_flags(level: ExperienceLevel, flags: &mut Vec<String>) {
    if level == ExperienceLevel::Undergrad {
        flags.push("Undergraduate level - ensure appropriate supervision is arranged".to_string());
        flags.push("Review all steps with supervisor before beginning".to_string());
    }
    if level.is_supervised() {
        flags.push("Ensure emergency procedures are reviewed and understood".to_string());
    }
}

/// Both thresholds are checked independently; a sub-2h budget raises both flags.
fn time_flags(hours: f64, flags: &mut Vec<String>) {
    if hours < LIMITED_TIME_BELOW {
        flags.push(LIMITED_TIME_FLAG.to_string());
    }
    if hours < VERY_SHORT_TIME_BELOW {
        flags.push(VERY_SHORT_TIME_FLAG.to_string());
    }
}

fn scale_flags(scale_mg: f64, flags: &mut Vec<String>) {
    if scale_mg > LARGE_SCALE_ABOVE {
        flags.push(
            "Large scale operation - review heat dissipation and mixing efficiency".to_string(),
        );
    }
    if scale_mg < SMALL_SCALE_BELOW {
        flags.push(
            "Small scale operation - ensure appropriate precision in measurements".to_string(),
        );
    }
}

fn fallback_options(lab: &LabContext) -> Vec<String> {
    let purification = if lab.purification_methods.len() > 1 {
        let methods: Vec<&str> = lab
            .purification_methods
            .iter()
            .take(MAX_LISTED_PURIFICATION_METHODS)
            .map(String::as_str)
            .collect();
        format!("Alternative purification methods available: {}", methods.join(", "))
    } else {
        GENERIC_PURIFICATION_FALLBACK.to_string()
    };

    vec![
        SOLVENT_FALLBACK.to_string(),
        TEMPERATURE_FALLBACK.to_string(),
        purification,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lab::tests::sample_lab;
    use crate::models::NormalizedPlan;
    use crate::procedure_generator::generate_procedure;

    fn annotate(lab: &LabContext) -> RiskAnnotation {
        let procedure = generate_procedure(&NormalizedPlan::placeholder("CCO"), lab, None);
        annotate_risks(&procedure, lab)
    }

    fn has_flag(annotation: &RiskAnnotation, needle: &str) -> bool {
        annotation.risk_flags.iter().any(|f| f.contains(needle))
    }

    /// A lab that trips no conditional rule at all.
    fn well_equipped_lab() -> LabContext {
        LabContext {
            scale_mg: 500.0,
            equipment: vec!["nmr".into(), "rotary_evaporator".into()],
            purification_methods: vec!["hplc".into()],
            safety_constraints: vec![],
            experience_level: ExperienceLevel::Industry,
            time_budget_hours: 8.0,
        }
    }

    #[test]
    fn verification_reminder_is_always_last() {
        for lab in [sample_lab(), well_equipped_lab()] {
            let annotation = annotate(&lab);
            assert_eq!(
                annotation.risk_flags.last().map(String::as_str),
                Some(VERIFICATION_REMINDER)
            );
        }
    }

    #[test]
    fn clean_lab_only_gets_reminder() {
        let annotation = annotate(&well_equipped_lab());
        assert_eq!(annotation.risk_flags, vec![VERIFICATION_REMINDER.to_string()]);
    }

    #[test]
    fn each_known_constraint_adds_its_flag_in_order() {
        let mut lab = well_equipped_lab();
        lab.safety_constraints = vec![
            "limited_ventilation".into(),
            "no_glovebox".into(),
            "teleporter_offline".into(),
            "no_fume_hood".into(),
            "no_open_flame".into(),
        ];
        let annotation = annotate(&lab);
        assert_eq!(annotation.risk_flags.len(), 5);
        assert!(annotation.risk_flags[0].starts_with("No glovebox"));
        assert!(annotation.risk_flags[1].starts_with("No fume hood"));
        assert!(annotation.risk_flags[2].starts_with("Open flame restricted"));
        assert!(annotation.risk_flags[3].starts_with("Limited ventilation"));
    }

    #[test]
    fn equipment_gaps_raise_flags() {
        let mut lab = well_equipped_lab();
        lab.equipment = vec!["heating_mantle".into()];
        lab.purification_methods = vec!["recrystallization".into()];
        let annotation = annotate(&lab);
        assert_eq!(
            &annotation.risk_flags[..3],
            [LIMITED_ANALYTICAL_FLAG, NO_CHROMATOGRAPHY_FLAG, NO_ROTOVAP_FLAG]
        );
    }

    #[test]
    fn column_chromatography_counts_as_chromatography() {
        let mut lab = well_equipped_lab();
        lab.purification_methods = vec!["column_chromatography".into()];
        assert!(!has_flag(&annotate(&lab), "No chromatography"));
    }

    #[test]
    fn experience_flags_by_level() {
        let mut lab = well_equipped_lab();

        lab.experience_level = ExperienceLevel::Undergrad;
        let undergrad = annotate(&lab);
        assert!(has_flag(&undergrad, "Undergraduate level"));
        assert!(has_flag(&undergrad, "Review all steps with supervisor"));
        assert!(has_flag(&undergrad, "emergency procedures"));

        lab.experience_level = ExperienceLevel::Grad;
        let grad = annotate(&lab);
        assert!(!has_flag(&grad, "Undergraduate level"));
        assert!(has_flag(&grad, "emergency procedures"));

        lab.experience_level = ExperienceLevel::Postdoc;
        assert!(!has_flag(&annotate(&lab), "emergency procedures"));
    }

    #[test]
    fn time_flags_by_budget() {
        let mut lab = well_equipped_lab();

        lab.time_budget_hours = 1.5;
        let short = annotate(&lab);
        assert!(has_flag(&short, LIMITED_TIME_FLAG));
        assert!(has_flag(&short, VERY_SHORT_TIME_FLAG));

        lab.time_budget_hours = 3.0;
        let limited = annotate(&lab);
        assert!(has_flag(&limited, LIMITED_TIME_FLAG));
        assert!(!has_flag(&limited, VERY_SHORT_TIME_FLAG));

        lab.time_budget_hours = 5.0;
        let ample = annotate(&lab);
        assert!(!has_flag(&ample, LIMITED_TIME_FLAG));
        assert!(!has_flag(&ample, VERY_SHORT_TIME_FLAG));
    }

    #[test]
    fn scale_flags_by_size() {
        let mut lab = well_equipped_lab();

        lab.scale_mg = 20_000.0;
        assert!(has_flag(&annotate(&lab), "Large scale operation"));

        lab.scale_mg = 5.0;
        assert!(has_flag(&annotate(&lab), "Small scale operation"));

        lab.scale_mg = 10_000.0;
        let boundary = annotate(&lab);
        assert!(!has_flag(&boundary, "Large scale"));
        assert!(!has_flag(&boundary, "Small scale"));
    }

    #[test]
    fn large_fast_run_raises_scale_and_time_flags_together() {
        let mut lab = well_equipped_lab();
        lab.scale_mg = 50_000.0;
        lab.time_budget_hours = 1.0;
        let annotation = annotate(&lab);
        assert!(has_flag(&annotation, "Large scale operation"));
        assert!(has_flag(&annotation, VERY_SHORT_TIME_FLAG));
    }

    #[test]
    fn fallbacks_list_first_three_methods() {
        let mut lab = well_equipped_lab();
        lab.purification_methods = vec![
            "recrystallization".into(),
            "filtration".into(),
            "column_chromatography".into(),
        ];
        let annotation = annotate(&lab);
        assert_eq!(annotation.fallback_options.len(), 3);
        assert_eq!(annotation.fallback_options[0], SOLVENT_FALLBACK);
        assert_eq!(annotation.fallback_options[1], TEMPERATURE_FALLBACK);
        assert_eq!(
            annotation.fallback_options[2],
            "Alternative purification methods available: recrystallization, filtration, column_chromatography"
        );

        lab.purification_methods.push("distillation".into());
        let annotation = annotate(&lab);
        assert!(!annotation.fallback_options[2].contains("distillation"));
    }

    #[test]
    fn single_method_gets_generic_fallback() {
        let annotation = annotate(&sample_lab());
        let generic: Vec<&String> = annotation
            .fallback_options
            .iter()
            .filter(|f| f.contains("alternative purification approach"))
            .collect();
        assert_eq!(generic.len(), 1);
    }

    #[test]
    fn grad_bench_scenario() {
        let annotation = annotate(&sample_lab());
        assert!(has_flag(&annotation, NO_CHROMATOGRAPHY_FLAG));
        assert!(has_flag(&annotation, "Open flame restricted"));
        assert!(!has_flag(&annotation, NO_ROTOVAP_FLAG));
    }
}
