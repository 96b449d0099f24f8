//! Console reporter for comparison results
//!
//! Human-readable text output grouped by supplemental document. Additions
//! lead each group, since surfacing supplemental-only requirements is the
//! tool's stated purpose; unchanged sections are only tallied.

use anyhow::Result;
use std::fmt::Write;

use code_model::{
    ChangeKind, ComparisonOutcome, ComparisonReport, DiffResult, SectionRef, SpanKind,
    SummaryCounts,
};

// Longest span excerpt shown in the text report.
const SNIPPET_CHARS: usize = 200;

/// Console format reporter.
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Format a comparison report for console output.
    pub fn format(report: &ComparisonReport) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Building Code Comparison: {}", report.base_label)?;
        writeln!(output, "Generated on: {}", report.generated_at.to_rfc3339())?;
        writeln!(
            output,
            "Base document: {} ({} sections)",
            report.base_source,
            report.base_section_numbers.len()
        )?;

        for group in &report.supplementals {
            writeln!(output)?;
            writeln!(output, "{}", "=".repeat(64))?;
            writeln!(output, "Supplemental: {} ({})", group.label, group.source_file)?;
            writeln!(output, "{}", "=".repeat(64))?;

            match &group.outcome {
                ComparisonOutcome::Failed { error } => {
                    writeln!(output, "FAILED: {}", error)?;
                }
                ComparisonOutcome::Compared { results, summary } => {
                    Self::format_summary_line(&mut output, summary)?;
                    Self::format_group(&mut output, results)?;
                }
            }
        }

        writeln!(output)?;
        writeln!(output, "{}", "-".repeat(64))?;
        writeln!(
            output,
            "Overall: {} added, {} removed, {} modified, {} unchanged across {} supplemental(s)",
            report.summary.added,
            report.summary.removed,
            report.summary.modified,
            report.summary.unchanged,
            report.supplementals.len()
        )?;
        let failures = report.failure_count();
        if failures > 0 {
            writeln!(output, "Failures: {} document(s) could not be read", failures)?;
        }

        Ok(output)
    }

    fn format_summary_line(output: &mut String, summary: &SummaryCounts) -> Result<()> {
        writeln!(
            output,
            "Summary: {} added, {} removed, {} modified, {} unchanged",
            summary.added, summary.removed, summary.modified, summary.unchanged
        )?;
        Ok(())
    }

    fn format_group(output: &mut String, results: &[DiffResult]) -> Result<()> {
        let added: Vec<&DiffResult> = results
            .iter()
            .filter(|r| r.kind == ChangeKind::Added)
            .collect();
        if !added.is_empty() {
            writeln!(output)?;
            writeln!(output, "Additions:")?;
            for result in added {
                if let Some(section) = &result.supplemental {
                    writeln!(output, "  + {}", heading(section))?;
                    for span in &result.delta {
                        if span.kind == SpanKind::Inserted {
                            writeln!(output, "      {}", truncate(&span.text))?;
                        }
                    }
                }
            }
        }

        let modified: Vec<&DiffResult> = results
            .iter()
            .filter(|r| r.kind == ChangeKind::Modified)
            .collect();
        if !modified.is_empty() {
            writeln!(output)?;
            writeln!(output, "Modified:")?;
            for result in modified {
                if let Some(section) = &result.base {
                    writeln!(
                        output,
                        "  ~ {} (similarity {:.1}%)",
                        heading(section),
                        result.score * 100.0
                    )?;
                }
                for span in &result.delta {
                    match span.kind {
                        SpanKind::Deleted => {
                            writeln!(output, "      - {}", truncate(&span.text))?
                        }
                        SpanKind::Inserted => {
                            writeln!(output, "      + {}", truncate(&span.text))?
                        }
                        SpanKind::Equal => {}
                    }
                }
            }
        }

        let removed: Vec<&DiffResult> = results
            .iter()
            .filter(|r| r.kind == ChangeKind::Removed)
            .collect();
        if !removed.is_empty() {
            writeln!(output)?;
            writeln!(output, "Removed:")?;
            for result in removed {
                if let Some(section) = &result.base {
                    writeln!(output, "  - {}", heading(section))?;
                }
            }
        }

        Ok(())
    }
}

fn heading(section: &SectionRef) -> String {
    let mut text = section.number.clone();
    if !section.title.is_empty() {
        text.push(' ');
        text.push_str(&section.title);
    }
    text.push_str(&format!(" (page {})", section.page));
    if section.ambiguous_numbering {
        text.push_str(" [ambiguous numbering]");
    }
    text
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= SNIPPET_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(SNIPPET_CHARS).collect();
        format!("{}...", cut.trim_end())
    }
}
