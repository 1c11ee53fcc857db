use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The wire name doubles as the serde name.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(
    /// Experience level of the person running the procedure.
    ExperienceLevel {
        Undergrad => "undergrad",
        Grad => "grad",
        Postdoc => "postdoc",
        Industry => "industry",
    }
);

impl ExperienceLevel {
    /// Undergrads and grad students work under a supervisor.
    pub fn is_supervised(&self) -> bool {
        matches!(self, Self::Undergrad | Self::Grad)
    }
}

str_enum!(
    /// Where a normalized retrosynthesis plan came from.
    PlanSource {
        UserProvided => "user_provided",
        IbmRxn => "ibm_rxn",
        Placeholder => "placeholder",
    }
);

str_enum!(
    /// Reported outcome of running a generated procedure.
    FeedbackOutcome {
        Success => "success",
        Failure => "failure",
        Partial => "partial",
        Unknown => "unknown",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_level_round_trips_through_str() {
        for level in [
            ExperienceLevel::Undergrad,
            ExperienceLevel::Grad,
            ExperienceLevel::Postdoc,
            ExperienceLevel::Industry,
        ] {
            assert_eq!(level.as_str().parse::<ExperienceLevel>().unwrap(), level);
        }
    }

    #[test]
    fn unknown_value_is_rejected() {
        let err = "professor".parse::<ExperienceLevel>().unwrap_err();
        assert_eq!(err.field, "ExperienceLevel");
        assert_eq!(err.value, "professor");
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&PlanSource::IbmRxn).unwrap();
        assert_eq!(json, "\"ibm_rxn\"");
        let outcome: FeedbackOutcome = serde_json::from_str("\"partial\"").unwrap();
        assert_eq!(outcome, FeedbackOutcome::Partial);
        assert!(serde_json::from_str::<FeedbackOutcome>("\"invalid_outcome\"").is_err());
    }

    #[test]
    fn only_undergrad_and_grad_are_supervised() {
        assert!(ExperienceLevel::Undergrad.is_supervised());
        assert!(ExperienceLevel::Grad.is_supervised());
        assert!(!ExperienceLevel::Postdoc.is_supervised());
        assert!(!ExperienceLevel::Industry.is_supervised());
    }
}
