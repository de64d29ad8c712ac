//! Helpers around batch conversion: reading pasted input and summarising
//! results.

use std::collections::HashSet;

use serde::Serialize;

use super::converter::BatchResult;

/// Split pasted text into trimmed, non-empty lines. With `dedupe`, only the
/// first occurrence of each line is kept.
pub fn split_input(text: &str, dedupe: bool) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !dedupe || seen.insert(*line))
        .map(str::to_string)
        .collect()
}

/// Success and failure counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub successful: usize,
    pub failed: usize,
    pub total: usize,
}

impl BatchSummary {
    pub fn of(results: &[BatchResult]) -> Self {
        let successful = results.iter().filter(|r| r.converted.is_some()).count();
        Self {
            successful,
            failed: results.len() - successful,
            total: results.len(),
        }
    }
}

/// Converted URLs only, one per line.
pub fn successful_lines(results: &[BatchResult]) -> String {
    results
        .iter()
        .filter_map(|r| r.converted.as_deref())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every result, failures marked next to their input.
pub fn report_lines(results: &[BatchResult]) -> String {
    results
        .iter()
        .map(|r| match &r.converted {
            Some(url) => url.clone(),
            None => format!("{} (failed)", r.original),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
