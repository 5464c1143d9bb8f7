//! Absolute contraindication checks for proposed medications.
//!
//! Rules are keyed by lowercase medication name. A medication with no rule
//! on file is reported as safe.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of a contraindication check
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContraindicationReport {
    pub is_safe: bool,
    pub messages: Vec<String>,
}

impl ContraindicationReport {
    fn safe() -> Self {
        Self {
            is_safe: true,
            messages: Vec::new(),
        }
    }

    /// One-line summary suitable for a recommendation column
    pub fn summary(&self) -> String {
        if self.is_safe {
            "Safe: no contraindications found.".to_string()
        } else {
            self.messages.join(" ")
        }
    }
}

/// Renal threshold below which a medication must not be started
#[derive(Clone, Debug)]
struct RenalRule {
    egfr_threshold: i32,
    message: &'static str,
}

static RENAL_RULES: Lazy<HashMap<&'static str, RenalRule>> = Lazy::new(|| {
    let mut rules = HashMap::new();
    rules.insert(
        "metformin",
        RenalRule {
            egfr_threshold: 30,
            message: "Metformin is contraindicated in patients with an eGFR < 30 mL/min/1.73m² (severe CKD).",
        },
    );
    rules
});

/// Check a proposed medication against the patient's eGFR
pub fn check_contraindications(egfr: i32, proposed_medication: &str) -> Result<ContraindicationReport> {
    if egfr < 0 {
        return Err(Error::InvalidInput(format!(
            "eGFR must not be negative, got {}",
            egfr
        )));
    }

    let med = proposed_medication.trim().to_lowercase();
    let mut report = ContraindicationReport::safe();

    if let Some(rule) = RENAL_RULES.get(med.as_str()) {
        if egfr < rule.egfr_threshold {
            report.is_safe = false;
            report.messages.push(rule.message.to_string());
        }
    }

    tracing::debug!(
        "Contraindication check for {} at eGFR {}: safe={}",
        med,
        egfr,
        report.is_safe
    );
    Ok(report)
}
