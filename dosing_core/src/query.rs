//! Scenario queries.
//!
//! A [`DoseQuery`] bundles a scenario with its parameters so that callers
//! which receive requests as data (batch files, services) can evaluate them
//! without matching on the scenario themselves.

use crate::contraindication::check_contraindications;
use crate::dosing;
use crate::{Formulation, InsulinType, Result};
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// One dosing question, tagged by scenario name
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum DoseQuery {
    /// Missing formulation means immediate release
    Metformin {
        current_dose_mg: i32,
        #[serde(default)]
        formulation: Option<String>,
    },
    AgentStartingDose {
        medication: String,
    },
    BasalInitiation {
        weight_kg: f64,
    },
    BasalTitration {
        fasting_blood_glucose: i32,
        current_dose: i32,
    },
    PrandialInitiation {
        basal_dose: i32,
    },
    /// Categorical fields stay textual so a bad value surfaces as InvalidCategory
    T1dTotalDailyDose {
        weight_kg: f64,
        status: String,
    },
    BasalBolusSplit {
        total_daily_dose: f64,
    },
    InsulinToCarbRatio {
        total_daily_dose: f64,
        #[serde(default)]
        insulin_type: Option<String>,
    },
    CorrectionFactor {
        total_daily_dose: f64,
        #[serde(default)]
        insulin_type: Option<String>,
    },
    ContraindicationCheck {
        egfr: i32,
        medication: String,
    },
}

/// Parse an optional categorical field, falling back to the type's default
fn parse_or_default<T>(value: Option<&str>) -> Result<T>
where
    T: FromStr<Err = crate::Error> + Default,
{
    value.map_or_else(|| Ok(T::default()), |s| s.parse())
}

impl DoseQuery {
    /// Scenario name as it appears in the `scenario` tag
    pub fn scenario(&self) -> &'static str {
        match self {
            DoseQuery::Metformin { .. } => "metformin",
            DoseQuery::AgentStartingDose { .. } => "agent_starting_dose",
            DoseQuery::BasalInitiation { .. } => "basal_initiation",
            DoseQuery::BasalTitration { .. } => "basal_titration",
            DoseQuery::PrandialInitiation { .. } => "prandial_initiation",
            DoseQuery::T1dTotalDailyDose { .. } => "t1d_total_daily_dose",
            DoseQuery::BasalBolusSplit { .. } => "basal_bolus_split",
            DoseQuery::InsulinToCarbRatio { .. } => "insulin_to_carb_ratio",
            DoseQuery::CorrectionFactor { .. } => "correction_factor",
            DoseQuery::ContraindicationCheck { .. } => "contraindication_check",
        }
    }

    /// Evaluate the query and return the recommendation text
    pub fn evaluate(&self) -> Result<String> {
        match self {
            DoseQuery::Metformin {
                current_dose_mg,
                formulation,
            } => dosing::metformin_dose(
                *current_dose_mg,
                parse_or_default::<Formulation>(formulation.as_deref())?,
            ),
            DoseQuery::AgentStartingDose { medication } => dosing::agent_starting_dose(medication),
            DoseQuery::BasalInitiation { weight_kg } => dosing::basal_insulin_initiation(*weight_kg),
            DoseQuery::BasalTitration {
                fasting_blood_glucose,
                current_dose,
            } => dosing::basal_insulin_titration(*fasting_blood_glucose, *current_dose),
            DoseQuery::PrandialInitiation { basal_dose } => {
                dosing::prandial_insulin_initiation(*basal_dose)
            }
            DoseQuery::T1dTotalDailyDose { weight_kg, status } => {
                dosing::t1d_total_daily_dose_str(*weight_kg, status)
            }
            DoseQuery::BasalBolusSplit { total_daily_dose } => {
                dosing::basal_bolus_split(*total_daily_dose)
            }
            DoseQuery::InsulinToCarbRatio {
                total_daily_dose,
                insulin_type,
            } => dosing::insulin_to_carb_ratio(
                *total_daily_dose,
                parse_or_default::<InsulinType>(insulin_type.as_deref())?,
            ),
            DoseQuery::CorrectionFactor {
                total_daily_dose,
                insulin_type,
            } => dosing::correction_factor(
                *total_daily_dose,
                parse_or_default::<InsulinType>(insulin_type.as_deref())?,
            ),
            DoseQuery::ContraindicationCheck { egfr, medication } => {
                check_contraindications(*egfr, medication).map(|report| report.summary())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_parse_titration_query() {
        let query: DoseQuery = serde_json::from_str(
            r#"{"scenario":"basal_titration","fasting_blood_glucose":195,"current_dose":20}"#,
        )
        .unwrap();
        assert_eq!(query.scenario(), "basal_titration");
        assert_eq!(
            query.evaluate().unwrap(),
            "FBG > 180 mg/dL. Increase dose by 4 units to 24 units."
        );
    }

    #[test]
    fn test_defaults_apply_when_omitted() {
        let query: DoseQuery =
            serde_json::from_str(r#"{"scenario":"correction_factor","total_daily_dose":40}"#)
                .unwrap();
        assert_eq!(
            query,
            DoseQuery::CorrectionFactor {
                total_daily_dose: 40.0,
                insulin_type: None,
            }
        );
        assert_eq!(
            query.evaluate().unwrap(),
            "CF: 1 unit lowers blood glucose by ~45 mg/dL."
        );

        let query: DoseQuery =
            serde_json::from_str(r#"{"scenario":"metformin","current_dose_mg":0}"#).unwrap();
        assert_eq!(
            query.evaluate().unwrap(),
            "Starting dose: 500mg daily or BID with meals."
        );
    }

    #[test]
    fn test_bad_status_is_invalid_category() {
        let query = DoseQuery::T1dTotalDailyDose {
            weight_kg: 65.0,
            status: "unknown".into(),
        };
        assert!(matches!(query.evaluate(), Err(Error::InvalidCategory(_))));
    }

    #[test]
    fn test_categorical_aliases_accepted() {
        let query: DoseQuery = serde_json::from_str(
            r#"{"scenario":"metformin","current_dose_mg":1000,"formulation":"er"}"#,
        )
        .unwrap();
        assert_eq!(
            query.evaluate().unwrap(),
            "Recommended next titration: Increase dose to 1500mg."
        );

        let query: DoseQuery = serde_json::from_str(
            r#"{"scenario":"correction_factor","total_daily_dose":50,"insulin_type":"regular"}"#,
        )
        .unwrap();
        assert_eq!(
            query.evaluate().unwrap(),
            "CF: 1 unit lowers blood glucose by ~30 mg/dL."
        );
    }

    #[test]
    fn test_bad_insulin_type_is_invalid_category() {
        let query: DoseQuery = serde_json::from_str(
            r#"{"scenario":"insulin_to_carb_ratio","total_daily_dose":50,"insulin_type":"ultra"}"#,
        )
        .unwrap();
        assert!(matches!(query.evaluate(), Err(Error::InvalidCategory(_))));

        let query = DoseQuery::Metformin {
            current_dose_mg: 500,
            formulation: Some("chewable".into()),
        };
        assert!(matches!(query.evaluate(), Err(Error::InvalidCategory(_))));
    }

    #[test]
    fn test_tag_matches_scenario_name() {
        let queries = vec![
            DoseQuery::AgentStartingDose {
                medication: "dulaglutide".into(),
            },
            DoseQuery::T1dTotalDailyDose {
                weight_kg: 65.0,
                status: "established".into(),
            },
            DoseQuery::ContraindicationCheck {
                egfr: 25,
                medication: "metformin".into(),
            },
        ];
        for query in queries {
            let json = serde_json::to_value(&query).unwrap();
            assert_eq!(json["scenario"], query.scenario());
        }
    }

    #[test]
    fn test_contraindication_summary() {
        let query = DoseQuery::ContraindicationCheck {
            egfr: 25,
            medication: "Metformin".into(),
        };
        assert!(query.evaluate().unwrap().contains("contraindicated"));
    }
}
