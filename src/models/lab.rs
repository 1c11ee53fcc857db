use serde::{Deserialize, Serialize};

use super::enums::ExperienceLevel;
use super::ValidationError;

/// Laboratory constraints a procedure has to fit.
///
/// `equipment` and `purification_methods` are ordered: the generator
/// truncates equipment from the front and treats the first purification
/// method as the primary one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabContext {
    /// Target scale in milligrams.
    pub scale_mg: f64,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub purification_methods: Vec<String>,
    /// Open vocabulary, e.g. `no_glovebox` or `inert_atmosphere_required`.
    #[serde(default)]
    pub safety_constraints: Vec<String>,
    pub experience_level: ExperienceLevel,
    pub time_budget_hours: f64,
}

impl LabContext {
    pub fn has_constraint(&self, token: &str) -> bool {
        self.safety_constraints.iter().any(|c| c == token)
    }

    pub fn has_equipment(&self, name: &str) -> bool {
        self.equipment.iter().any(|e| e == name)
    }

    pub fn has_purification(&self, method: &str) -> bool {
        self.purification_methods.iter().any(|m| m == method)
    }

    pub fn primary_purification(&self) -> Option<&str> {
        self.purification_methods.first().map(String::as_str)
    }

    /// Both numeric fields must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("lab_context.scale_mg", self.scale_mg)?;
        check_positive("lab_context.time_budget_hours", self.time_budget_hours)?;
        Ok(())
    }
}

fn check_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }
    if value <= 0.0 {
        return Err(ValidationError::new(field, "must be greater than 0"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// The grad-student bench used throughout the crate's tests.
    pub(crate) fn sample_lab() -> LabContext {
        LabContext {
            scale_mg: 500.0,
            equipment: vec!["rotovap".into(), "heating_mantle".into()],
            purification_methods: vec!["recrystallization".into()],
            safety_constraints: vec!["no_open_flame".into()],
            experience_level: ExperienceLevel::Grad,
            time_budget_hours: 8.0,
        }
    }

    #[test]
    fn list_fields_default_to_empty() {
        let lab: LabContext = serde_json::from_str(
            r#"{"scale_mg": 50, "experience_level": "postdoc", "time_budget_hours": 3}"#,
        )
        .unwrap();
        assert!(lab.equipment.is_empty());
        assert!(lab.purification_methods.is_empty());
        assert!(lab.safety_constraints.is_empty());
        assert_eq!(lab.primary_purification(), None);
    }

    #[test]
    fn missing_experience_level_fails_to_deserialize() {
        let res = serde_json::from_str::<LabContext>(r#"{"scale_mg": 50, "time_budget_hours": 3}"#);
        assert!(res.is_err());
    }

    #[test]
    fn validate_accepts_sample() {
        assert!(sample_lab().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_scale() {
        let mut lab = sample_lab();
        lab.scale_mg = 0.0;
        let err = lab.validate().unwrap_err();
        assert_eq!(err.field, "lab_context.scale_mg");
    }

    #[test]
    fn validate_rejects_negative_time_budget() {
        let mut lab = sample_lab();
        lab.time_budget_hours = -1.0;
        let err = lab.validate().unwrap_err();
        assert_eq!(err.field, "lab_context.time_budget_hours");
    }

    #[test]
    fn validate_rejects_nan() {
        let mut lab = sample_lab();
        lab.scale_mg = f64::NAN;
        assert!(lab.validate().is_err());
    }

    #[test]
    fn lookups_are_exact_matches() {
        let lab = sample_lab();
        assert!(lab.has_constraint("no_open_flame"));
        assert!(!lab.has_constraint("no_open"));
        assert!(lab.has_equipment("rotovap"));
        assert!(lab.has_purification("recrystallization"));
        assert_eq!(lab.primary_purification(), Some("recrystallization"));
    }
}
