#![forbid(unsafe_code)]

//! Deterministic dosing recommendations for diabetes care.
//!
//! This crate provides:
//! - Guideline constant tables (agents, bands, multipliers)
//! - Pure rule functions that turn patient inputs into recommendation text
//! - Renal contraindication checks
//! - Scenario queries and JSONL-to-CSV batch evaluation
//! - Configuration and logging setup for front ends

pub mod types;
pub mod error;
pub mod guideline;
pub mod dosing;
pub mod contraindication;
pub mod query;
pub mod batch;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use dosing::{
    agent_starting_dose, basal_bolus_split, basal_insulin_initiation, basal_insulin_titration,
    correction_factor, insulin_to_carb_ratio, metformin_dose, prandial_insulin_initiation,
    t1d_total_daily_dose, t1d_total_daily_dose_str,
};
pub use contraindication::{check_contraindications, ContraindicationReport};
pub use query::DoseQuery;
pub use batch::{run_batch, BatchResult, BatchSummary};
