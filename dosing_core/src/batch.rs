//! Batch evaluation of dosing queries.
//!
//! Queries are read from a JSONL (JSON Lines) file, evaluated one by one,
//! and written to CSV. A bad line or a failed evaluation is recorded and
//! never aborts the rest of the batch.

use crate::{DoseQuery, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A query together with its 1-based line number in the input file
#[derive(Clone, Debug)]
pub struct NumberedQuery {
    pub line: usize,
    pub query: DoseQuery,
}

/// Result of evaluating one query
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BatchResult {
    pub line: usize,
    pub scenario: String,
    pub recommendation: Option<String>,
    pub error: Option<String>,
}

/// Counts reported after a batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub evaluated: usize,
    pub failed: usize,
    pub skipped_lines: usize,
}

/// Read all queries from a JSONL file
///
/// Blank lines are ignored; lines that do not parse are logged and skipped.
/// Returns the parsed queries and the number of skipped lines.
pub fn read_queries(path: &Path) -> Result<(Vec<NumberedQuery>, usize)> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut queries = Vec::new();
    let mut skipped = 0;

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<DoseQuery>(&line) {
            Ok(query) => queries.push(NumberedQuery {
                line: line_num + 1,
                query,
            }),
            Err(e) => {
                tracing::warn!("Failed to parse query at line {}: {}", line_num + 1, e);
                skipped += 1;
            }
        }
    }

    tracing::debug!("Read {} queries from {:?}", queries.len(), path);
    Ok((queries, skipped))
}

/// Evaluate every query independently
pub fn evaluate_batch(queries: &[NumberedQuery]) -> Vec<BatchResult> {
    queries
        .iter()
        .map(|numbered| {
            let (recommendation, error) = match numbered.query.evaluate() {
                Ok(text) => (Some(text), None),
                Err(e) => (None, Some(e.to_string())),
            };
            BatchResult {
                line: numbered.line,
                scenario: numbered.query.scenario().to_string(),
                recommendation,
                error,
            }
        })
        .collect()
}

/// Write results to a CSV file, replacing any existing file
pub fn write_results_csv(results: &[BatchResult], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    if results.is_empty() {
        writer.write_record(["line", "scenario", "recommendation", "error"])?;
    }
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} results to {:?}", results.len(), path);
    Ok(())
}

/// Read, evaluate and write a whole batch
pub fn run_batch(input: &Path, output: &Path) -> Result<BatchSummary> {
    let (queries, skipped_lines) = read_queries(input)?;
    let results = evaluate_batch(&queries);
    write_results_csv(&results, output)?;

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let summary = BatchSummary {
        evaluated: results.len(),
        failed,
        skipped_lines,
    };
    tracing::info!(
        "Batch complete: {} evaluated, {} failed, {} lines skipped",
        summary.evaluated,
        summary.failed,
        summary.skipped_lines
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = r#"{"scenario":"metformin","current_dose_mg":0}
{"scenario":"basal_titration","fasting_blood_glucose":75,"current_dose":15}

{"scenario":"agent_starting_dose","medication":"glipizide"}
{ not json }
{"scenario":"t1d_total_daily_dose","weight_kg":65,"status":"established"}
"#;

    #[test]
    fn test_read_queries_skips_bad_lines() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("queries.jsonl");
        fs::write(&input, SAMPLE).unwrap();

        let (queries, skipped) = read_queries(&input).unwrap();
        assert_eq!(queries.len(), 4);
        assert_eq!(skipped, 1);
        // Line numbers count blank lines
        assert_eq!(queries[2].line, 4);
        assert_eq!(queries[3].line, 6);
    }

    #[test]
    fn test_failures_are_per_row() {
        let queries = vec![
            NumberedQuery {
                line: 1,
                query: DoseQuery::AgentStartingDose {
                    medication: "glipizide".into(),
                },
            },
            NumberedQuery {
                line: 2,
                query: DoseQuery::BasalInitiation { weight_kg: 100.0 },
            },
        ];
        let results = evaluate_batch(&queries);
        assert_eq!(results[0].error.as_deref(), Some("Unknown medication: glipizide"));
        assert!(results[0].recommendation.is_none());
        assert_eq!(
            results[1].recommendation.as_deref(),
            Some("Starting dose: 10 units OR 10.0-20.0 units daily.")
        );
    }

    #[test]
    fn test_bad_categories_become_error_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("queries.jsonl");
        let output = temp_dir.path().join("results.csv");
        fs::write(
            &input,
            concat!(
                r#"{"scenario":"insulin_to_carb_ratio","total_daily_dose":50,"insulin_type":"ultra"}"#,
                "\n",
                r#"{"scenario":"metformin","current_dose_mg":1000,"formulation":"er"}"#,
                "\n",
                r#"{"scenario":"t1d_total_daily_dose","weight_kg":65,"status":"ultra"}"#,
                "\n",
            ),
        )
        .unwrap();

        let summary = run_batch(&input, &output).unwrap();
        assert_eq!(
            summary,
            BatchSummary {
                evaluated: 3,
                failed: 2,
                skipped_lines: 0,
            }
        );

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][1], "insulin_to_carb_ratio");
        assert!(rows[0][3].starts_with("Invalid category"));
        assert_eq!(&rows[1][2], "Recommended next titration: Increase dose to 1500mg.");
        assert!(rows[2][3].starts_with("Invalid category"));
    }

    #[test]
    fn test_run_batch_writes_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("queries.jsonl");
        let output = temp_dir.path().join("out").join("results.csv");
        fs::write(&input, SAMPLE).unwrap();

        let summary = run_batch(&input, &output).unwrap();
        assert_eq!(
            summary,
            BatchSummary {
                evaluated: 4,
                failed: 1,
                skipped_lines: 1,
            }
        );

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["line", "scenario", "recommendation", "error"]
        );
        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(
            &rows[3][2],
            "Estimated TDD for 'established' status: 32.5-65.0 units/day."
        );
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = read_queries(&temp_dir.path().join("missing.jsonl")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
