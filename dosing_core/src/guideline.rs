//! Guideline constants and lookup tables.
//!
//! Every literal the rule functions depend on lives here: metformin
//! titration limits, the non-insulin agent starting-dose table, insulin
//! initiation multipliers, titration bands and the ICR/CF rule numerators.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

// ============================================================================
// Metformin
// ============================================================================

pub const METFORMIN_STARTING_DOSE_MG: i32 = 500;
pub const METFORMIN_TITRATION_STEP_MG: i32 = 500;
pub const METFORMIN_MAX_IR_MG: i32 = 2550;
pub const METFORMIN_MAX_ER_MG: i32 = 2000;

/// Documented maximum daily dose for a formulation
pub fn metformin_max_dose_mg(formulation: Formulation) -> i32 {
    match formulation {
        Formulation::ImmediateRelease => METFORMIN_MAX_IR_MG,
        Formulation::ExtendedRelease => METFORMIN_MAX_ER_MG,
    }
}

// ============================================================================
// Basal / Prandial Insulin (type 2)
// ============================================================================

pub const BASAL_FIXED_START_UNITS: i32 = 10;
pub const BASAL_LOW_UNITS_PER_KG: f64 = 0.1;
pub const BASAL_HIGH_UNITS_PER_KG: f64 = 0.2;

pub const BASAL_MIN_DOSE_UNITS: i32 = 0;
pub const FBG_LOW_THRESHOLD: i32 = 80;
pub const FBG_HIGH_THRESHOLD: i32 = 180;

/// Fasting glucose bands, checked in order
pub static BASAL_TITRATION_BANDS: [ThresholdBand; 3] = [
    ThresholdBand {
        lower: None,
        upper: Some(FBG_LOW_THRESHOLD - 1),
        action: BandAction::Decrease(2),
    },
    ThresholdBand {
        lower: Some(FBG_LOW_THRESHOLD),
        upper: Some(FBG_HIGH_THRESHOLD),
        action: BandAction::Hold,
    },
    ThresholdBand {
        lower: Some(FBG_HIGH_THRESHOLD + 1),
        upper: None,
        action: BandAction::Increase(4),
    },
];

pub const PRANDIAL_FIXED_START_UNITS: i32 = 4;
pub const PRANDIAL_FRACTION_OF_BASAL: f64 = 0.10;

// ============================================================================
// Type 1 Insulin
// ============================================================================

/// Weight-based TDD range (units/kg/day) for a status
pub fn t1d_tdd_multipliers(status: DiabetesStatus) -> (f64, f64) {
    match status {
        DiabetesStatus::NewOnset => (0.2, 0.6),
        DiabetesStatus::Established => (0.5, 1.0),
    }
}

pub const BASAL_FRACTION_OF_TDD: f64 = 0.5;

/// Numerator of the ICR rule (500 rule for rapid-acting analogues)
pub fn icr_rule(insulin_type: InsulinType) -> f64 {
    match insulin_type {
        InsulinType::RapidActing => 500.0,
        InsulinType::Regular => 450.0,
    }
}

/// Numerator of the correction-factor rule (1800 rule for rapid-acting)
pub fn cf_rule(insulin_type: InsulinType) -> f64 {
    match insulin_type {
        InsulinType::RapidActing => 1800.0,
        InsulinType::Regular => 1500.0,
    }
}

// ============================================================================
// Non-insulin Agents
// ============================================================================

/// Agent starting-dose table keyed by lowercase name - built once
static AGENT_TABLE: Lazy<HashMap<&'static str, AgentProfile>> = Lazy::new(build_agent_table);

fn sglt2i(starting_dose: &'static str, available_doses: &'static [&'static str]) -> AgentProfile {
    AgentProfile {
        class: DrugClass::Sglt2Inhibitor,
        starting_dose,
        frequency: "daily",
        available_doses,
    }
}

fn glp1ra(starting_dose: &'static str, frequency: &'static str) -> AgentProfile {
    AgentProfile {
        class: DrugClass::Glp1ReceptorAgonist,
        starting_dose,
        frequency,
        available_doses: &[],
    }
}

fn build_agent_table() -> HashMap<&'static str, AgentProfile> {
    let mut table = HashMap::new();

    // SGLT2 inhibitors
    table.insert("empagliflozin", sglt2i("10mg", &["10mg", "25mg"]));
    table.insert("dapagliflozin", sglt2i("5mg", &["5mg", "10mg"]));
    table.insert("canagliflozin", sglt2i("100mg", &["100mg", "300mg"]));
    table.insert("ertugliflozin", sglt2i("5mg", &["5mg", "15mg"]));

    // GLP-1 receptor agonists
    table.insert("semaglutide (ozempic)", glp1ra("0.25mg", "weekly"));
    table.insert("semaglutide (rybelsus)", glp1ra("3mg", "daily oral"));
    table.insert("dulaglutide", glp1ra("0.75mg", "weekly"));
    table.insert("liraglutide", glp1ra("0.6mg", "daily"));
    table.insert("tirzepatide", glp1ra("2.5mg", "weekly"));

    table
}

/// Look up an agent by name, ignoring case and surrounding whitespace
pub fn find_agent(name: &str) -> Option<&'static AgentProfile> {
    AGENT_TABLE.get(name.trim().to_lowercase().as_str())
}

/// All known agent names, sorted
pub fn agent_names() -> Vec<&'static str> {
    let mut names: Vec<_> = AGENT_TABLE.keys().copied().collect();
    names.sort_unstable();
    names
}
