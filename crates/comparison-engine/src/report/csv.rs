//! CSV section inventory
//!
//! Flat `location, section` listing of every parsed section identifier in
//! the base and each supplemental document, suitable for loading into a
//! spreadsheet or dataframe.

use code_model::ComparisonReport;

/// CSV inventory writer.
pub struct CsvInventory;

impl CsvInventory {
    /// Render the section inventory of a comparison report.
    ///
    /// Failed supplementals contribute no rows; their absence is visible in
    /// the main report.
    pub fn format(report: &ComparisonReport) -> String {
        let mut output = String::from("location, section\n");
        for number in &report.base_section_numbers {
            output.push_str(&format!("{}, {}\n", report.base_label, number));
        }
        for group in &report.supplementals {
            for number in &group.section_numbers {
                output.push_str(&format!("{}, {}\n", group.label, number));
            }
        }
        output
    }
}
