//! Section segmentation
//!
//! Reconstructs the hierarchical section tree of a building code from the
//! flat fragment sequence. Lines matching the numbering grammar open a new
//! section at the depth implied by their dot-separated identifier; all other
//! lines accumulate into the body of the deepest open section.
//!
//! Segmentation never fails outright: malformed numbering is tolerated and
//! flagged, because partial structure is more useful than none.

use std::collections::HashSet;

use chrono::Utc;
use code_model::document::PREAMBLE_NUMBER;
use code_model::{Document, Fragment, Section};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "Section 604.3 Pressure" / "SECTION 604.3: Pressure"
    static ref SECTION_PREFIX: Regex =
        Regex::new(r"(?i)^section\s+(\d+[A-Za-z]?(?:\.\d+)*)\s*[:.\-—–]?\s*(.*)$").unwrap();
    // "604.3 — Pressure" (dash-separated heading)
    static ref NUMBER_DASH_TITLE: Regex =
        Regex::new(r"^(\d+[A-Za-z]?(?:\.\d+)*)\s*[—–-]\s*([A-Z].*)$").unwrap();
    // "604.3 Pressure" (identifier followed by a capitalized title)
    static ref NUMBER_TITLE: Regex =
        Regex::new(r"^(\d+[A-Za-z]?(?:\.\d+)*)\s+([A-Z].*)$").unwrap();
    // California-style chapter identifier standing alone, e.g. "1910A.2.3"
    static ref CA_BARE_NUMBER: Regex =
        Regex::new(r"^(\d{4}[A-Za-z](?:\.\d+)*)\s*$").unwrap();
}

/// Section segmenter entry point.
pub struct SectionSegmenter;

impl SectionSegmenter {
    /// Build a [`Document`] from extracted fragments.
    ///
    /// Infallible by contract: unrecognized structure degrades into body
    /// text or flagged sections, never an error.
    pub fn segment(
        fragments: &[Fragment],
        label: &str,
        jurisdiction: &str,
        source_file: &str,
    ) -> Document {
        let mut builder = TreeBuilder::new(label);

        for fragment in fragments {
            let line = normalize_line(&fragment.text);
            if line.is_empty() {
                continue;
            }
            match detect_heading(&line) {
                Some((number, title)) => builder.open_section(number, title, fragment.page),
                None => builder.append_body(&line, fragment.page),
            }
        }

        Document {
            label: label.to_string(),
            jurisdiction: jurisdiction.to_string(),
            source_file: source_file.to_string(),
            parsed_at: Utc::now(),
            root: builder.finish(),
        }
    }
}

/// Collapse runs of whitespace and trim.
fn normalize_line(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Match a line against the numbering grammar.
///
/// Returns the identifier and the (possibly empty) title when the line is a
/// section heading.
fn detect_heading(line: &str) -> Option<(String, String)> {
    for pattern in [&*SECTION_PREFIX, &*NUMBER_DASH_TITLE, &*NUMBER_TITLE] {
        if let Some(captures) = pattern.captures(line) {
            let number = captures.get(1).map(|m| m.as_str().to_string())?;
            let title = captures
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            return Some((number, title));
        }
    }
    if let Some(captures) = CA_BARE_NUMBER.captures(line) {
        let number = captures.get(1).map(|m| m.as_str().to_string())?;
        return Some((number, String::new()));
    }
    None
}

/// One identifier component, split into numeric value and letter suffix so
/// "1910A" orders numerically before "1911".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct NumberComponent {
    value: u64,
    suffix: String,
}

/// Parse an identifier into comparable components.
fn number_key(number: &str) -> Vec<NumberComponent> {
    number
        .split('.')
        .map(|component| {
            let digits: String = component.chars().take_while(|c| c.is_ascii_digit()).collect();
            let suffix: String = component
                .chars()
                .skip_while(|c| c.is_ascii_digit())
                .collect::<String>()
                .to_lowercase();
            NumberComponent {
                value: digits.parse().unwrap_or(0),
                suffix,
            }
        })
        .collect()
}

/// A section still collecting body lines.
struct Pending {
    section: Section,
    body: Vec<String>,
}

impl Pending {
    fn close(mut self) -> Section {
        self.section.body = self.body.join("\n");
        self.section
    }
}

/// Incremental tree builder driven by the fragment scan.
struct TreeBuilder {
    root: Section,
    /// Open sections, outermost first. Each entry's identifier components
    /// are a strict prefix of the next entry's.
    stack: Vec<Pending>,
    seen: HashSet<String>,
    prev_key: Option<Vec<NumberComponent>>,
}

impl TreeBuilder {
    fn new(label: &str) -> Self {
        Self {
            root: Section::new("", label, 1),
            stack: Vec::new(),
            seen: HashSet::new(),
            prev_key: None,
        }
    }

    /// Open a section for a detected heading, closing and synthesizing
    /// levels as required to keep identifier paths strictly deepening.
    fn open_section(&mut self, number: String, title: String, page: usize) {
        let normalized = number.trim().to_lowercase();
        let components: Vec<String> = normalized.split('.').map(str::to_string).collect();
        let depth = components.len();
        let key = number_key(&normalized);

        let duplicate = self.seen.contains(&normalized);
        let backwards = self
            .prev_key
            .as_ref()
            .map(|prev| &key < prev)
            .unwrap_or(false);

        // Close open sections that are not ancestors of the new one.
        while let Some(top) = self.stack.last() {
            let top_components = top.section.components();
            let is_ancestor = top_components.len() < depth
                && top_components
                    .iter()
                    .zip(&components)
                    .all(|(a, b)| a.eq_ignore_ascii_case(b));
            if is_ancestor {
                break;
            }
            self.close_top();
        }

        // A heading that jumps more than one level deeper leaves gaps;
        // bridge them with empty placeholder sections.
        for level in self.stack.len() + 1..depth {
            let placeholder_number = components[..level].join(".");
            let mut placeholder = Section::new(&placeholder_number, "", page);
            placeholder.synthesized = true;
            self.seen.insert(placeholder_number);
            self.stack.push(Pending {
                section: placeholder,
                body: Vec::new(),
            });
        }

        let mut section = Section::new(number, title, page);
        section.ambiguous_numbering = duplicate || backwards;
        self.seen.insert(normalized);
        self.prev_key = Some(key);
        self.stack.push(Pending {
            section,
            body: Vec::new(),
        });
    }

    /// Append a body line to the deepest open section, creating the
    /// synthetic preamble when text precedes the first heading.
    fn append_body(&mut self, line: &str, page: usize) {
        if self.stack.is_empty() {
            let preamble = Section::new(PREAMBLE_NUMBER, "Preamble", page);
            self.seen.insert(PREAMBLE_NUMBER.to_string());
            self.stack.push(Pending {
                section: preamble,
                body: Vec::new(),
            });
        }
        let top = self.stack.last_mut().unwrap();
        top.body.push(line.to_string());
        top.section.page_end = top.section.page_end.max(page);
    }

    /// Close the deepest open section and attach it to its parent.
    fn close_top(&mut self) {
        if let Some(pending) = self.stack.pop() {
            let section = pending.close();
            let parent = match self.stack.last_mut() {
                Some(top) => &mut top.section,
                None => &mut self.root,
            };
            parent.page_end = parent.page_end.max(section.page_end);
            parent.children.push(section);
        }
    }

    fn finish(mut self) -> Section {
        while !self.stack.is_empty() {
            self.close_top();
        }
        self.root
    }
}
