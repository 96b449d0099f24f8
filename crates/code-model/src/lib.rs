//! Shared data model for building-code comparison
//!
//! This crate provides the document model (extracted text fragments, the
//! section hierarchy) and the report types produced when a base building
//! code is compared against supplemental jurisdiction codes.

pub mod document;
pub mod report;
pub mod types;

pub use document::{Document, Section, SectionIndex};
pub use report::{
    ChangeKind, ComparisonOutcome, ComparisonReport, Correspondence, DiffResult, DiffSpan,
    MatchMethod, SectionRef, SpanKind, SummaryCounts, SupplementalReport,
};
pub use types::{BoundingBox, Fragment};
