//! Core domain types for the dosing evaluator.
//!
//! This module defines the value types shared by the guideline tables and
//! the rule functions:
//! - Categorical inputs (formulation, diabetes status, insulin type)
//! - Medication profiles for the agent lookup table
//! - Threshold bands used for titration decisions

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowercase a user-supplied key and fold `_` and spaces into `-`
fn normalize_key(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .collect()
}

// ============================================================================
// Categorical Inputs
// ============================================================================

/// Metformin release formulation
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Formulation {
    #[default]
    ImmediateRelease,
    ExtendedRelease,
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formulation::ImmediateRelease => write!(f, "immediate-release"),
            Formulation::ExtendedRelease => write!(f, "extended-release"),
        }
    }
}

impl FromStr for Formulation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "immediate-release" | "ir" => Ok(Formulation::ImmediateRelease),
            "extended-release" | "er" | "xr" => Ok(Formulation::ExtendedRelease),
            _ => Err(Error::InvalidCategory(format!("unknown formulation '{}'", s))),
        }
    }
}

/// Type 1 diabetes status used to pick the weight-based TDD multipliers
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DiabetesStatus {
    NewOnset,
    Established,
}

impl fmt::Display for DiabetesStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiabetesStatus::NewOnset => write!(f, "new-onset"),
            DiabetesStatus::Established => write!(f, "established"),
        }
    }
}

impl FromStr for DiabetesStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "new-onset" => Ok(DiabetesStatus::NewOnset),
            "established" => Ok(DiabetesStatus::Established),
            _ => Err(Error::InvalidCategory(format!(
                "unknown diabetes status '{}' (expected new-onset or established)",
                s
            ))),
        }
    }
}

/// Insulin acting-time category for the ICR and CF rules
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsulinType {
    #[default]
    RapidActing,
    Regular,
}

impl fmt::Display for InsulinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsulinType::RapidActing => write!(f, "rapid-acting"),
            InsulinType::Regular => write!(f, "regular"),
        }
    }
}

impl FromStr for InsulinType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "rapid-acting" | "rapid" => Ok(InsulinType::RapidActing),
            "regular" => Ok(InsulinType::Regular),
            _ => Err(Error::InvalidCategory(format!(
                "unknown insulin type '{}' (expected rapid-acting or regular)",
                s
            ))),
        }
    }
}

// ============================================================================
// Medication Profiles
// ============================================================================

/// Drug class of a non-insulin agent
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrugClass {
    Sglt2Inhibitor,
    Glp1ReceptorAgonist,
}

/// Starting-dose entry for a non-insulin agent
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AgentProfile {
    pub class: DrugClass,
    pub starting_dose: &'static str,
    pub frequency: &'static str,
    /// Marketed strengths, when the guideline lists them
    pub available_doses: &'static [&'static str],
}

// ============================================================================
// Threshold Bands
// ============================================================================

/// Dose adjustment attached to a titration band
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BandAction {
    Decrease(i32),
    Hold,
    Increase(i32),
}

/// A glucose band with inclusive bounds; `None` means unbounded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdBand {
    pub lower: Option<i32>,
    pub upper: Option<i32>,
    pub action: BandAction,
}

impl ThresholdBand {
    pub fn contains(&self, value: i32) -> bool {
        self.lower.map_or(true, |lo| value >= lo) && self.upper.map_or(true, |hi| value <= hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!("Established".parse::<DiabetesStatus>().unwrap(), DiabetesStatus::Established);
        assert_eq!("NEW_ONSET".parse::<DiabetesStatus>().unwrap(), DiabetesStatus::NewOnset);
        assert_eq!(" new-onset ".parse::<DiabetesStatus>().unwrap(), DiabetesStatus::NewOnset);
    }

    #[test]
    fn test_unknown_status_is_invalid_category() {
        let err = "honeymoon".parse::<DiabetesStatus>().unwrap_err();
        assert!(matches!(err, Error::InvalidCategory(_)));
    }

    #[test]
    fn test_status_display_roundtrips() {
        for status in [DiabetesStatus::NewOnset, DiabetesStatus::Established] {
            assert_eq!(status.to_string().parse::<DiabetesStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_insulin_type_default_is_rapid() {
        assert_eq!(InsulinType::default(), InsulinType::RapidActing);
        assert_eq!("regular".parse::<InsulinType>().unwrap(), InsulinType::Regular);
        assert!("ultra-long".parse::<InsulinType>().is_err());
    }

    #[test]
    fn test_formulation_aliases() {
        assert_eq!("ER".parse::<Formulation>().unwrap(), Formulation::ExtendedRelease);
        assert_eq!("immediate_release".parse::<Formulation>().unwrap(), Formulation::ImmediateRelease);
    }

    #[test]
    fn test_band_bounds_are_inclusive() {
        let band = ThresholdBand {
            lower: Some(80),
            upper: Some(180),
            action: BandAction::Hold,
        };
        assert!(band.contains(80));
        assert!(band.contains(180));
        assert!(!band.contains(79));
        assert!(!band.contains(181));

        let open = ThresholdBand {
            lower: Some(181),
            upper: None,
            action: BandAction::Increase(4),
        };
        assert!(open.contains(i32::MAX));
    }
}
