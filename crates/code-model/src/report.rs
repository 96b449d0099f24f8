//! Comparison result types
//!
//! Correspondences come out of the matcher, diff results out of the diff
//! engine, and the aggregator folds everything into one immutable
//! [`ComparisonReport`] per run.

use crate::document::Section;

/// How a base/supplemental section pair was aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMethod {
    /// Identical normalized identifier on both sides.
    ExactIdentifier,
    /// Equal normalized title under the same parent.
    FuzzyTitle,
    /// Token-set overlap above the configured threshold.
    ContentSimilarity,
    /// Base section with no supplemental counterpart.
    UnmatchedBase,
    /// Supplemental section with no base counterpart.
    UnmatchedSupplemental,
}

/// Lightweight reference to a section, detached from the owning tree.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SectionRef {
    pub number: String,
    pub title: String,
    pub page: usize,
    /// Carried over from the section so reporting can show degraded
    /// confidence without walking back to the document.
    pub ambiguous_numbering: bool,
}

impl SectionRef {
    pub fn from_section(section: &Section) -> Self {
        Self {
            number: section.number.clone(),
            title: section.title.clone(),
            page: section.page_start,
            ambiguous_numbering: section.ambiguous_numbering,
        }
    }
}

/// Alignment between a base section and zero-or-one supplemental section.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Correspondence {
    pub base: Option<SectionRef>,
    pub supplemental: Option<SectionRef>,
    /// Similarity score in [0, 1]; 0 for unmatched entries.
    pub score: f64,
    pub method: MatchMethod,
}

/// Classification of a compared section pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
    Unchanged,
}

/// Role of a span within a text delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    /// Present in both texts.
    Equal,
    /// Present only in the supplemental text.
    Inserted,
    /// Present only in the base text.
    Deleted,
}

/// A run of whitespace-normalized tokens sharing one [`SpanKind`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DiffSpan {
    pub kind: SpanKind,
    pub text: String,
}

impl DiffSpan {
    pub fn equal(text: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Equal,
            text: text.into(),
        }
    }

    pub fn inserted(text: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Inserted,
            text: text.into(),
        }
    }

    pub fn deleted(text: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Deleted,
            text: text.into(),
        }
    }
}

/// Outcome of diffing one correspondence.
///
/// The delta reconstructs both sides: concatenating Equal+Inserted spans
/// yields the normalized supplemental body, Equal+Deleted the base body.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DiffResult {
    pub kind: ChangeKind,
    pub base: Option<SectionRef>,
    pub supplemental: Option<SectionRef>,
    pub score: f64,
    pub method: MatchMethod,
    pub delta: Vec<DiffSpan>,
}

/// Per-classification tallies for a report group or a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SummaryCounts {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl SummaryCounts {
    /// Tally one diff result.
    pub fn record(&mut self, kind: ChangeKind) {
        match kind {
            ChangeKind::Added => self.added += 1,
            ChangeKind::Removed => self.removed += 1,
            ChangeKind::Modified => self.modified += 1,
            ChangeKind::Unchanged => self.unchanged += 1,
        }
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: &SummaryCounts) {
        self.added += other.added;
        self.removed += other.removed;
        self.modified += other.modified;
        self.unchanged += other.unchanged;
    }

    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified + self.unchanged
    }

    /// Tally a whole result sequence.
    pub fn from_results(results: &[DiffResult]) -> Self {
        let mut counts = Self::default();
        for result in results {
            counts.record(result.kind);
        }
        counts
    }
}

/// What happened when one supplemental document was compared to the base.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    /// The supplemental parsed and was compared section-by-section.
    Compared {
        results: Vec<DiffResult>,
        summary: SummaryCounts,
    },
    /// The supplemental could not be read; the run continued without it.
    Failed { error: String },
}

/// One report group: a supplemental document compared against the base.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SupplementalReport {
    pub label: String,
    pub source_file: String,
    /// Identifiers of every parsed section, in document order. Empty when
    /// the document failed to parse. Feeds the CSV inventory output.
    pub section_numbers: Vec<String>,
    pub outcome: ComparisonOutcome,
}

impl SupplementalReport {
    /// Summary counts for this group, zero if the document failed.
    pub fn summary(&self) -> SummaryCounts {
        match &self.outcome {
            ComparisonOutcome::Compared { summary, .. } => *summary,
            ComparisonOutcome::Failed { .. } => SummaryCounts::default(),
        }
    }
}

/// Terminal artifact of a comparison run. Immutable once produced.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComparisonReport {
    pub base_label: String,
    pub base_source: String,
    /// Identifiers of every base section, in document order.
    pub base_section_numbers: Vec<String>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub supplementals: Vec<SupplementalReport>,
    /// Tallies across all successfully compared supplementals.
    pub summary: SummaryCounts,
}

impl ComparisonReport {
    /// Number of supplemental documents that could not be read.
    pub fn failure_count(&self) -> usize {
        self.supplementals
            .iter()
            .filter(|s| matches!(s.outcome, ComparisonOutcome::Failed { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary_record_and_total() {
        let mut counts = SummaryCounts::default();
        counts.record(ChangeKind::Added);
        counts.record(ChangeKind::Added);
        counts.record(ChangeKind::Modified);
        counts.record(ChangeKind::Unchanged);
        assert_eq!(counts.added, 2);
        assert_eq!(counts.modified, 1);
        assert_eq!(counts.unchanged, 1);
        assert_eq!(counts.removed, 0);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_summary_merge() {
        let mut a = SummaryCounts {
            added: 1,
            removed: 2,
            modified: 3,
            unchanged: 4,
        };
        let b = SummaryCounts {
            added: 10,
            removed: 20,
            modified: 30,
            unchanged: 40,
        };
        a.merge(&b);
        assert_eq!(a.added, 11);
        assert_eq!(a.removed, 22);
        assert_eq!(a.modified, 33);
        assert_eq!(a.unchanged, 44);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = ComparisonOutcome::Failed {
            error: "unreadable document".to_string(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        assert!(json.contains("unreadable document"));

        let parsed: ComparisonOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, outcome);
    }

    #[test]
    fn test_match_method_kebab_case() {
        let json = serde_json::to_string(&MatchMethod::ExactIdentifier).unwrap();
        assert_eq!(json, "\"exact-identifier\"");
        let json = serde_json::to_string(&MatchMethod::UnmatchedSupplemental).unwrap();
        assert_eq!(json, "\"unmatched-supplemental\"");
    }
}
