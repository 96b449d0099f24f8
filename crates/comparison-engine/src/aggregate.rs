//! Report aggregation
//!
//! Runs the extract → segment → match → diff pipeline for every
//! supplemental document against one shared base document and folds the
//! results into a single [`ComparisonReport`]. Comparisons are independent,
//! so they fan out across rayon workers; results land in order-keyed slots,
//! which keeps the merge lock-free and the output deterministic.

use std::path::{Path, PathBuf};

use chrono::Utc;
use code_model::{
    ComparisonOutcome, ComparisonReport, DiffResult, Document, SummaryCounts, SupplementalReport,
};
use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::diff::diff_correspondence;
use crate::extract::PdfExtractor;
use crate::matcher::match_documents;
use crate::segment::SectionSegmenter;
use crate::EngineError;

/// One supplemental document to compare against the base.
#[derive(Debug, Clone)]
pub struct SupplementalInput {
    /// Grouping label, e.g. "City 1".
    pub label: String,
    pub path: PathBuf,
}

impl SupplementalInput {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// Extract and segment one input document.
pub fn parse_document(
    path: &Path,
    label: &str,
    jurisdiction: &str,
    config: &EngineConfig,
) -> Result<Document, EngineError> {
    tracing::info!("Parsing {} building code from {}", label, path.display());
    let fragments = PdfExtractor::extract_with_timeout(path, &config.extraction)?;
    let document = SectionSegmenter::segment(
        &fragments,
        label,
        jurisdiction,
        &path.display().to_string(),
    );
    tracing::debug!(
        "{}: {} fragments, {} sections",
        label,
        fragments.len(),
        document.section_count()
    );
    Ok(document)
}

/// Match and diff one supplemental document against the base.
///
/// Results follow base pre-order, then supplemental-only additions.
pub fn compare_documents(
    base: &Document,
    supplemental: &Document,
    config: &EngineConfig,
) -> Vec<DiffResult> {
    let correspondences = match_documents(base, supplemental, &config.matching);
    let base_index = base.index();
    let supplemental_index = supplemental.index();
    correspondences
        .iter()
        .map(|c| diff_correspondence(c, &base_index, &supplemental_index))
        .collect()
}

/// Compare every supplemental against the base and assemble the report.
///
/// Every supplemental is processed even when others fail: a parse failure
/// becomes a [`ComparisonOutcome::Failed`] entry in its group instead of
/// aborting the run.
pub fn aggregate(
    base: &Document,
    supplementals: &[SupplementalInput],
    config: &EngineConfig,
) -> ComparisonReport {
    let groups: Vec<SupplementalReport> = supplementals
        .par_iter()
        .map(|input| {
            let parsed = parse_document(&input.path, &input.label, &input.label, config);
            group_report(input, parsed, base, config)
        })
        .collect();

    let mut summary = SummaryCounts::default();
    for group in &groups {
        summary.merge(&group.summary());
    }

    ComparisonReport {
        base_label: base.label.clone(),
        base_source: base.source_file.clone(),
        base_section_numbers: base.sections().map(|s| s.number.clone()).collect(),
        generated_at: Utc::now(),
        supplementals: groups,
        summary,
    }
}

/// Full pipeline front door: parse the base (fatal on failure), then
/// aggregate all supplementals against it.
pub fn run_comparison(
    base_path: &Path,
    base_label: &str,
    supplementals: &[SupplementalInput],
    config: &EngineConfig,
) -> Result<ComparisonReport, EngineError> {
    let base = parse_document(base_path, base_label, base_label, config)?;
    Ok(aggregate(&base, supplementals, config))
}

/// Fold one supplemental's parse result into its report group.
fn group_report(
    input: &SupplementalInput,
    parsed: Result<Document, EngineError>,
    base: &Document,
    config: &EngineConfig,
) -> SupplementalReport {
    match parsed {
        Ok(document) => {
            let results = compare_documents(base, &document, config);
            let summary = SummaryCounts::from_results(&results);
            SupplementalReport {
                label: input.label.clone(),
                source_file: input.path.display().to_string(),
                section_numbers: document.sections().map(|s| s.number.clone()).collect(),
                outcome: ComparisonOutcome::Compared { results, summary },
            }
        }
        Err(error) => {
            tracing::warn!("Skipping {}: {}", input.label, error);
            SupplementalReport {
                label: input.label.clone(),
                source_file: input.path.display().to_string(),
                section_numbers: Vec::new(),
                outcome: ComparisonOutcome::Failed {
                    error: error.to_string(),
                },
            }
        }
    }
}
