//! Report rendering
//!
//! Three output formats for a [`code_model::ComparisonReport`]: a
//! human-readable console report with additions listed first, machine
//! readable JSON, and the CSV section inventory.

pub mod console;
pub mod csv;
pub mod json;

pub use console::ConsoleReporter;
pub use csv::CsvInventory;
pub use json::JsonReporter;
