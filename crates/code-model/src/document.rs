//! Hierarchical document model
//!
//! A building code is an ordered tree of numbered sections. The tree owns
//! its children; parent lookups go through a [`SectionIndex`] instead of
//! back-pointers. Sections are built once by the segmenter and read-only
//! afterwards.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Identifier used for the synthetic section holding text that appears
/// before the first detected heading.
pub const PREAMBLE_NUMBER: &str = "preamble";

/// A numbered clause in a code document, with nested sub-clauses.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Section {
    /// Section identifier, e.g. "604.3.2". Dot-separated components encode
    /// the nesting path: "604.3.2" is a child of "604.3".
    pub number: String,
    /// Heading text following the identifier, possibly empty.
    pub title: String,
    /// Accumulated body text (lines joined with newlines).
    pub body: String,
    /// First source page this section appears on (1-indexed).
    pub page_start: usize,
    /// Last source page covered by this section or its children.
    pub page_end: usize,
    /// Set when the identifier duplicates or runs backwards relative to an
    /// earlier heading. Degrades match confidence, never an error.
    pub ambiguous_numbering: bool,
    /// Set on placeholder levels invented to bridge a heading that jumped
    /// more than one level deeper than its predecessor.
    pub synthesized: bool,
    /// Owned child sections in document order.
    pub children: Vec<Section>,
}

impl Section {
    /// Section with the given identifier and title, no content yet.
    pub fn new(number: impl Into<String>, title: impl Into<String>, page: usize) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            body: String::new(),
            page_start: page,
            page_end: page,
            ambiguous_numbering: false,
            synthesized: false,
            children: Vec::new(),
        }
    }

    /// Dot-separated identifier components.
    pub fn components(&self) -> Vec<&str> {
        if self.number.is_empty() {
            Vec::new()
        } else {
            self.number.split('.').collect()
        }
    }

    /// Nesting depth implied by the identifier (root is 0).
    pub fn depth(&self) -> usize {
        self.components().len()
    }

    /// Identifier of the implied parent section, if any.
    /// "604.3.2" → Some("604.3"); top-level identifiers have no parent.
    pub fn parent_number(&self) -> Option<String> {
        let components = self.components();
        if components.len() < 2 {
            None
        } else {
            Some(components[..components.len() - 1].join("."))
        }
    }

    /// Identifier normalized for matching: case-folded, whitespace trimmed.
    pub fn normalized_number(&self) -> String {
        self.number.trim().to_lowercase()
    }

    /// Pre-order traversal of this section and all descendants.
    pub fn iter_preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    /// Number of sections in this subtree, including self.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Section::subtree_len)
            .sum::<usize>()
    }
}

/// Depth-first, document-order iterator over a section subtree.
pub struct Preorder<'a> {
    stack: Vec<&'a Section>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Section;

    fn next(&mut self) -> Option<&'a Section> {
        let section = self.stack.pop()?;
        // Push children reversed so the first child is visited next.
        for child in section.children.iter().rev() {
            self.stack.push(child);
        }
        Some(section)
    }
}

/// A parsed code document: a labeled root section plus source metadata.
///
/// Immutable after segmentation, which makes it safe to share read-only
/// across comparison workers.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Document {
    /// Grouping key used in reports, e.g. "State" or "City 1".
    pub label: String,
    /// Human-readable jurisdiction name.
    pub jurisdiction: String,
    /// Path of the PDF this document was parsed from.
    pub source_file: String,
    /// When segmentation completed.
    pub parsed_at: DateTime<Utc>,
    /// Root of the section tree. The root itself carries no identifier;
    /// its children are the top-level sections.
    pub root: Section,
}

impl Document {
    /// Pre-order traversal of all sections, excluding the root itself.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.root.iter_preorder().skip(1)
    }

    /// Total number of sections, excluding the root.
    pub fn section_count(&self) -> usize {
        self.root.subtree_len() - 1
    }

    /// Build the identifier lookup index for this document.
    pub fn index(&self) -> SectionIndex<'_> {
        SectionIndex::build(self)
    }
}

/// Lookup table from normalized identifier to section node.
///
/// Duplicate identifiers (flagged `ambiguous_numbering` by the segmenter)
/// keep the first occurrence in document order.
pub struct SectionIndex<'a> {
    map: HashMap<String, &'a Section>,
}

impl<'a> SectionIndex<'a> {
    /// Index every section of a document by normalized identifier.
    pub fn build(document: &'a Document) -> Self {
        let mut map = HashMap::new();
        for section in document.sections() {
            map.entry(section.normalized_number()).or_insert(section);
        }
        Self { map }
    }

    /// Look up a section by identifier (normalization applied).
    pub fn get(&self, number: &str) -> Option<&'a Section> {
        self.map.get(&number.trim().to_lowercase()).copied()
    }

    /// Look up the parent of a section through the index.
    pub fn parent_of(&self, section: &Section) -> Option<&'a Section> {
        section.parent_number().and_then(|n| self.get(&n))
    }

    /// Number of indexed identifiers.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
