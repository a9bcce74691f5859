//! Entity state: the value an entity currently reports.

use serde::{Deserialize, Serialize};

/// Reported state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum EntityState {
    /// A numeric reading, in the unit given by the `unit_of_measurement`
    /// attribute.
    Measurement(i64),
    #[default]
    Unknown,
    Unavailable,
}

impl EntityState {
    /// Whether the entity is reachable (anything but [`Unavailable`](Self::Unavailable)).
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    /// The numeric reading, if any.
    #[must_use]
    pub fn measurement(&self) -> Option<i64> {
        match self {
            Self::Measurement(value) => Some(*value),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Measurement(value) => write!(f, "{value}"),
            Self::Unknown => f.write_str("unknown"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_available_when_state_is_a_measurement() {
        assert!(EntityState::Measurement(22).is_available());
    }

    #[test]
    fn should_report_available_when_state_is_unknown() {
        assert!(EntityState::Unknown.is_available());
    }

    #[test]
    fn should_report_unavailable_when_state_is_unavailable() {
        assert!(!EntityState::Unavailable.is_available());
    }

    #[test]
    fn should_default_to_unknown() {
        assert_eq!(EntityState::default(), EntityState::Unknown);
    }

    #[test]
    fn should_expose_measurement_value() {
        assert_eq!(EntityState::Measurement(18).measurement(), Some(18));
        assert_eq!(EntityState::Unavailable.measurement(), None);
    }

    #[test]
    fn should_display_measurement_as_number() {
        assert_eq!(EntityState::Measurement(-3).to_string(), "-3");
        assert_eq!(EntityState::Unavailable.to_string(), "unavailable");
    }

    #[test]
    fn should_serialize_with_kind_tag() {
        let json = serde_json::to_value(EntityState::Measurement(21)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "measurement", "value": 21}));
    }
}
