//! Dosing rule evaluator.
//!
//! Each function maps scalar patient inputs to a recommendation string
//! using the constants in [`crate::guideline`]. The functions are pure:
//! they only read immutable tables and never touch the filesystem.
//!
//! Rules covered:
//! - Metformin start and weekly titration
//! - Starting doses for SGLT2 inhibitors and GLP-1 receptor agonists
//! - Type 2 basal insulin initiation and titration, prandial initiation
//! - Type 1 total daily dose, basal/bolus split, ICR and correction factor

use crate::guideline::{self, BASAL_TITRATION_BANDS};
use crate::{BandAction, DiabetesStatus, DrugClass, Error, Formulation, InsulinType, Result};

fn require_positive(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be a positive number, got {}",
            what, value
        )))
    }
}

fn require_non_negative(value: i32, what: &str) -> Result<i32> {
    if value >= 0 {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!(
            "{} must not be negative, got {}",
            what, value
        )))
    }
}

/// Apply a "rule of N" and reject results that cannot be a usable ratio
fn rule_ratio(numerator: f64, total_daily_dose: f64, what: &str) -> Result<f64> {
    let tdd = require_positive(total_daily_dose, "total daily dose")?;
    let ratio = (numerator / tdd).round();
    if ratio.is_finite() && ratio >= 1.0 {
        Ok(ratio)
    } else {
        Err(Error::InvalidInput(format!(
            "total daily dose {} gives an unusable {} of {}",
            total_daily_dose, what, ratio
        )))
    }
}

/// Metformin starting dose or next titration step
///
/// A current dose of zero yields the starting recommendation. Otherwise the
/// dose goes up by one 500mg step. The formulation maximum is not enforced
/// here; a recommendation past it is logged at warn level.
pub fn metformin_dose(current_dose_mg: i32, formulation: Formulation) -> Result<String> {
    require_non_negative(current_dose_mg, "current metformin dose")?;

    if current_dose_mg == 0 {
        return Ok(format!(
            "Starting dose: {}mg daily or BID with meals.",
            guideline::METFORMIN_STARTING_DOSE_MG
        ));
    }

    let next_dose = current_dose_mg.saturating_add(guideline::METFORMIN_TITRATION_STEP_MG);
    let max_dose = guideline::metformin_max_dose_mg(formulation);
    if next_dose > max_dose {
        tracing::warn!(
            "Metformin titration to {}mg exceeds the {} maximum of {}mg",
            next_dose,
            formulation,
            max_dose
        );
    }

    tracing::debug!("Metformin {} -> {}mg ({})", current_dose_mg, next_dose, formulation);
    Ok(format!(
        "Recommended next titration: Increase dose to {}mg.",
        next_dose
    ))
}

/// Starting dose for an SGLT2 inhibitor or GLP-1 receptor agonist
///
/// The lookup ignores case; the caller's spelling is echoed back.
pub fn agent_starting_dose(medication_name: &str) -> Result<String> {
    let profile = guideline::find_agent(medication_name).ok_or_else(|| {
        tracing::warn!("No starting dose on file for {:?}", medication_name);
        Error::UnknownMedication(medication_name.trim().to_string())
    })?;

    let name = medication_name.trim();
    Ok(match profile.class {
        DrugClass::Sglt2Inhibitor => {
            format!("Starting dose for {}: {} daily.", name, profile.starting_dose)
        }
        DrugClass::Glp1ReceptorAgonist => format!(
            "Starting dose for {}: {} {}.",
            name, profile.starting_dose, profile.frequency
        ),
    })
}

/// Initial daily basal insulin dose for type 2 diabetes
///
/// Reports the fixed start alongside the 0.1-0.2 units/kg range.
pub fn basal_insulin_initiation(weight_kg: f64) -> Result<String> {
    let weight = require_positive(weight_kg, "weight_kg")?;
    let low = guideline::BASAL_LOW_UNITS_PER_KG * weight;
    let high = guideline::BASAL_HIGH_UNITS_PER_KG * weight;

    Ok(format!(
        "Starting dose: {} units OR {:.1}-{:.1} units daily.",
        guideline::BASAL_FIXED_START_UNITS,
        low,
        high
    ))
}

/// Basal insulin adjustment from a fasting blood glucose reading
///
/// Bands: below 80 mg/dL decrease by 2 units (never below zero),
/// 80-180 inclusive hold, above 180 increase by 4 units.
pub fn basal_insulin_titration(fasting_blood_glucose: i32, current_dose: i32) -> Result<String> {
    require_non_negative(fasting_blood_glucose, "fasting blood glucose")?;
    require_non_negative(current_dose, "current basal dose")?;

    let action = BASAL_TITRATION_BANDS
        .iter()
        .find(|band| band.contains(fasting_blood_glucose))
        .map(|band| band.action)
        .unwrap_or(BandAction::Hold);

    tracing::debug!(
        "FBG {} mg/dL on {} units -> {:?}",
        fasting_blood_glucose,
        current_dose,
        action
    );

    Ok(match action {
        BandAction::Increase(step) => format!(
            "FBG > {} mg/dL. Increase dose by {} units to {} units.",
            guideline::FBG_HIGH_THRESHOLD,
            step,
            current_dose.saturating_add(step)
        ),
        BandAction::Decrease(step) => format!(
            "FBG < {} mg/dL. Decrease dose by {} units to {} units.",
            guideline::FBG_LOW_THRESHOLD,
            step,
            (current_dose - step).max(guideline::BASAL_MIN_DOSE_UNITS)
        ),
        BandAction::Hold => format!(
            "FBG is within target range ({}-{} mg/dL). No change in dose.",
            guideline::FBG_LOW_THRESHOLD,
            guideline::FBG_HIGH_THRESHOLD
        ),
    })
}

/// Starting prandial dose when adding mealtime insulin to basal
pub fn prandial_insulin_initiation(basal_dose: i32) -> Result<String> {
    require_non_negative(basal_dose, "basal dose")?;
    let from_basal = guideline::PRANDIAL_FRACTION_OF_BASAL * f64::from(basal_dose);

    Ok(format!(
        "Starting dose: {} units OR {:.1} units with the largest meal.",
        guideline::PRANDIAL_FIXED_START_UNITS,
        from_basal
    ))
}

/// Weight-based total daily dose range for type 1 diabetes
pub fn t1d_total_daily_dose(weight_kg: f64, status: DiabetesStatus) -> Result<String> {
    let weight = require_positive(weight_kg, "weight_kg")?;
    let (low_per_kg, high_per_kg) = guideline::t1d_tdd_multipliers(status);

    Ok(format!(
        "Estimated TDD for '{}' status: {:.1}-{:.1} units/day.",
        status,
        low_per_kg * weight,
        high_per_kg * weight
    ))
}

/// Same as [`t1d_total_daily_dose`] with the status given as text
pub fn t1d_total_daily_dose_str(weight_kg: f64, status: &str) -> Result<String> {
    t1d_total_daily_dose(weight_kg, status.parse()?)
}

/// Split a chosen TDD into basal and bolus portions
pub fn basal_bolus_split(total_daily_dose: f64) -> Result<String> {
    let tdd = require_positive(total_daily_dose, "total daily dose")?;
    let basal = tdd * guideline::BASAL_FRACTION_OF_TDD;
    let bolus = tdd * (1.0 - guideline::BASAL_FRACTION_OF_TDD);

    Ok(format!(
        "Basal: {:.1} units/day; Bolus: {:.1} units/day divided across meals.",
        basal, bolus
    ))
}

/// Grams of carbohydrate covered by one unit (500 rule)
pub fn insulin_to_carb_ratio(total_daily_dose: f64, insulin_type: InsulinType) -> Result<String> {
    let grams = rule_ratio(guideline::icr_rule(insulin_type), total_daily_dose, "ICR")?;

    Ok(format!("ICR: 1 unit per {} g carbohydrate.", grams))
}

/// Expected glucose drop per unit of insulin (1800 rule)
pub fn correction_factor(total_daily_dose: f64, insulin_type: InsulinType) -> Result<String> {
    let drop = rule_ratio(guideline::cf_rule(insulin_type), total_daily_dose, "correction factor")?;

    Ok(format!("CF: 1 unit lowers blood glucose by ~{} mg/dL.", drop))
}
