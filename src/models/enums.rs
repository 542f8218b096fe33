//! Closed vocabularies shared across the wire and the controllers.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde uses the same lower-case wire strings the clinic service stores.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ValidationError::InvalidEnum {
                        name: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(ChatRole {
    User => "user",
    Assistant => "assistant",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn gender_round_trips_through_str() {
        for s in ["male", "female", "other"] {
            assert_eq!(Gender::from_str(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn unknown_gender_is_rejected() {
        let err = Gender::from_str("robot").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidEnum {
                name: "Gender",
                value: "robot".into(),
            }
        );
    }

    #[test]
    fn status_serializes_to_wire_string() {
        let json = serde_json::to_string(&AppointmentStatus::Scheduled).unwrap();
        assert_eq!(json, "\"scheduled\"");
        let back: AppointmentStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, AppointmentStatus::Cancelled);
    }

    #[test]
    fn chat_roles_match_transcript_wire_format() {
        assert_eq!(ChatRole::User.as_str(), "user");
        assert_eq!(ChatRole::Assistant.as_str(), "assistant");
    }
}
