//! JSON reporter for comparison results

use anyhow::Result;
use code_model::ComparisonReport;

/// JSON format reporter.
pub struct JsonReporter;

impl JsonReporter {
    /// Format a comparison report as JSON.
    ///
    /// # Arguments
    ///
    /// * `report` - The comparison report to format
    /// * `pretty` - Whether to pretty-print the JSON
    pub fn format(report: &ComparisonReport, pretty: bool) -> Result<String> {
        let output = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(output)
    }
}
