//! Cross-document section matching
//!
//! Aligns the sections of a supplemental code against the base code.
//! Matching precedence, highest first: identical normalized identifier,
//! equal normalized title under the same parent, token-set content
//! similarity above the configured threshold. Greedy and one-to-one:
//! a matched section leaves the candidate pool. Base sections are processed
//! in pre-order, so results are deterministic for identical inputs.

use std::collections::{HashMap, HashSet};

use code_model::{Correspondence, Document, MatchMethod, Section, SectionRef};

use crate::config::MatchingConfig;

/// Align two documents section-by-section.
///
/// The result lists every base section in pre-order (matched or not),
/// followed by supplemental-only sections in pre-order.
pub fn match_documents(
    base: &Document,
    supplemental: &Document,
    config: &MatchingConfig,
) -> Vec<Correspondence> {
    let base_sections: Vec<&Section> = base.sections().collect();
    let supp_sections: Vec<&Section> = supplemental.sections().collect();

    let mut supp_taken = vec![false; supp_sections.len()];
    let mut assigned: Vec<Option<(usize, f64, MatchMethod)>> = vec![None; base_sections.len()];

    // First occurrence wins for duplicated identifiers.
    let mut supp_by_number: HashMap<String, usize> = HashMap::new();
    for (i, section) in supp_sections.iter().enumerate() {
        supp_by_number
            .entry(section.normalized_number())
            .or_insert(i);
    }

    // Pass 1: identical normalized identifier.
    for (bi, section) in base_sections.iter().enumerate() {
        if let Some(&si) = supp_by_number.get(&section.normalized_number()) {
            if !supp_taken[si] {
                supp_taken[si] = true;
                let score = 1.0 - penalty(section, supp_sections[si], config);
                assigned[bi] = Some((si, score, MatchMethod::ExactIdentifier));
            }
        }
    }

    // Pass 2: equal normalized title among the same parent's children.
    let mut supp_by_title: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for (i, section) in supp_sections.iter().enumerate() {
        if supp_taken[i] {
            continue;
        }
        let title = normalize_title(&section.title);
        if title.is_empty() {
            continue;
        }
        let parent = section.parent_number().unwrap_or_default().to_lowercase();
        supp_by_title.entry((parent, title)).or_default().push(i);
    }
    for (bi, section) in base_sections.iter().enumerate() {
        if assigned[bi].is_some() {
            continue;
        }
        let title = normalize_title(&section.title);
        if title.is_empty() {
            continue;
        }
        let parent = section.parent_number().unwrap_or_default().to_lowercase();
        if let Some(candidates) = supp_by_title.get(&(parent, title)) {
            if let Some(&si) = candidates.iter().find(|&&si| !supp_taken[si]) {
                supp_taken[si] = true;
                let score = config.fuzzy_title_score - penalty(section, supp_sections[si], config);
                assigned[bi] = Some((si, score, MatchMethod::FuzzyTitle));
            }
        }
    }

    // Pass 3: content similarity at the same or adjacent depth.
    for (bi, section) in base_sections.iter().enumerate() {
        if assigned[bi].is_some() {
            continue;
        }
        let base_tokens = token_set(&section.body);
        if base_tokens.is_empty() {
            continue;
        }
        let depth = section.depth();
        let mut best: Option<(usize, f64)> = None;
        for (si, candidate) in supp_sections.iter().enumerate() {
            if supp_taken[si] {
                continue;
            }
            if candidate.depth().abs_diff(depth) > 1 {
                continue;
            }
            let candidate_tokens = token_set(&candidate.body);
            if candidate_tokens.is_empty() {
                continue;
            }
            let similarity = jaccard(&base_tokens, &candidate_tokens);
            if similarity < config.similarity_threshold {
                continue;
            }
            // Strict greater keeps the earliest candidate on ties.
            if best.map(|(_, s)| similarity > s).unwrap_or(true) {
                best = Some((si, similarity));
            }
        }
        if let Some((si, similarity)) = best {
            supp_taken[si] = true;
            let score = (similarity - penalty(section, supp_sections[si], config)).max(0.0);
            assigned[bi] = Some((si, score, MatchMethod::ContentSimilarity));
        }
    }

    // Emit base-anchored entries in pre-order, then supplemental-only ones.
    let mut correspondences = Vec::with_capacity(base_sections.len());
    for (bi, section) in base_sections.iter().enumerate() {
        match assigned[bi] {
            Some((si, score, method)) => correspondences.push(Correspondence {
                base: Some(SectionRef::from_section(section)),
                supplemental: Some(SectionRef::from_section(supp_sections[si])),
                score,
                method,
            }),
            None => correspondences.push(Correspondence {
                base: Some(SectionRef::from_section(section)),
                supplemental: None,
                score: 0.0,
                method: MatchMethod::UnmatchedBase,
            }),
        }
    }
    for (si, section) in supp_sections.iter().enumerate() {
        if !supp_taken[si] {
            correspondences.push(Correspondence {
                base: None,
                supplemental: Some(SectionRef::from_section(section)),
                score: 0.0,
                method: MatchMethod::UnmatchedSupplemental,
            });
        }
    }
    correspondences
}

/// Ambiguous numbering on either side degrades confidence.
fn penalty(base: &Section, supplemental: &Section, config: &MatchingConfig) -> f64 {
    if base.ambiguous_numbering || supplemental.ambiguous_numbering {
        config.ambiguity_penalty
    } else {
        0.0
    }
}

/// Case-fold, strip punctuation, collapse whitespace.
fn normalize_title(title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Word tokens of a body text, case-folded with punctuation margins removed.
fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|token| {
            token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Token-set overlap ratio in [0, 1].
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use code_model::Fragment;
    use pretty_assertions::assert_eq;

    use crate::segment::SectionSegmenter;

    fn document(label: &str, lines: &[&str]) -> Document {
        let fragments: Vec<Fragment> = lines
            .iter()
            .enumerate()
            .map(|(i, text)| Fragment::plain(*text, 1, i + 1))
            .collect();
        SectionSegmenter::segment(&fragments, label, label, "test.pdf")
    }

    fn config() -> MatchingConfig {
        MatchingConfig::default()
    }

    #[test]
    fn test_exact_identifier_match() {
        let base = document("base", &["101 Scope", "Applies to buildings."]);
        let supp = document("supp", &["101 Scope", "Applies to all buildings."]);

        let matches = match_documents(&base, &supp, &config());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].method, MatchMethod::ExactIdentifier);
        assert_eq!(matches[0].score, 1.0);
        assert_eq!(matches[0].base.as_ref().unwrap().number, "101");
        assert_eq!(matches[0].supplemental.as_ref().unwrap().number, "101");
    }

    #[test]
    fn test_fuzzy_title_match_for_renumbered_section() {
        let base = document(
            "base",
            &["101 Scope", "text a", "102 Definitions", "words defined here"],
        );
        let supp = document(
            "supp",
            &["101 Scope", "text a", "103 Definitions", "completely new wording"],
        );

        let matches = match_documents(&base, &supp, &config());
        let defs = matches
            .iter()
            .find(|c| c.base.as_ref().map(|b| b.number.as_str()) == Some("102"))
            .unwrap();
        assert_eq!(defs.method, MatchMethod::FuzzyTitle);
        assert_eq!(defs.score, 0.9);
        assert_eq!(defs.supplemental.as_ref().unwrap().number, "103");
    }

    #[test]
    fn test_content_similarity_match() {
        let base = document(
            "base",
            &[
                "101 Scope",
                "water heaters shall be installed per manufacturer instructions",
            ],
        );
        let supp = document(
            "supp",
            &[
                "201 Requirements",
                "water heaters shall be installed per approved instructions",
            ],
        );

        let matches = match_documents(&base, &supp, &config());
        let m = &matches[0];
        assert_eq!(m.method, MatchMethod::ContentSimilarity);
        assert!(m.score >= 0.5, "score was {}", m.score);
        assert_eq!(m.supplemental.as_ref().unwrap().number, "201");
    }

    #[test]
    fn test_unmatched_sections_reported_on_both_sides() {
        let base = document("base", &["101 Scope", "alpha beta gamma"]);
        let supp = document("supp", &["999 Novel", "delta epsilon zeta"]);

        let matches = match_documents(&base, &supp, &config());
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].method, MatchMethod::UnmatchedBase);
        assert!(matches[0].supplemental.is_none());
        assert_eq!(matches[1].method, MatchMethod::UnmatchedSupplemental);
        assert!(matches[1].base.is_none());
    }

    #[test]
    fn test_matching_is_one_to_one() {
        let base = document("base", &["101 Scope", "shared text here"]);
        let supp = document(
            "supp",
            &["101 Scope", "shared text here", "101 Scope", "shared text here"],
        );

        let matches = match_documents(&base, &supp, &config());
        let matched_supp: Vec<_> = matches
            .iter()
            .filter(|c| c.base.is_some() && c.supplemental.is_some())
            .collect();
        assert_eq!(matched_supp.len(), 1);
        // The duplicate supplemental section stays unmatched.
        assert!(matches
            .iter()
            .any(|c| c.method == MatchMethod::UnmatchedSupplemental));
    }

    #[test]
    fn test_ambiguous_numbering_degrades_score() {
        // Backwards numbering flags base section 101 as ambiguous.
        let base = document("base", &["102 Definitions", "text", "101 Scope", "text"]);
        let supp = document("supp", &["101 Scope", "text"]);

        let matches = match_documents(&base, &supp, &config());
        let m = matches
            .iter()
            .find(|c| c.base.as_ref().map(|b| b.number.as_str()) == Some("101"))
            .unwrap();
        assert_eq!(m.method, MatchMethod::ExactIdentifier);
        assert!((m.score - 0.9).abs() < 1e-9, "score was {}", m.score);
    }

    #[test]
    fn test_matching_is_deterministic() {
        let lines_base = &[
            "101 Scope",
            "alpha beta gamma delta",
            "102 Definitions",
            "epsilon zeta eta theta",
            "103 Permits",
            "iota kappa lambda mu",
        ];
        let lines_supp = &[
            "101 Scope",
            "alpha beta gamma delta",
            "202 Definitions",
            "epsilon zeta eta theta iota",
            "303 Fees",
            "nu xi omicron pi",
        ];
        let base = document("base", lines_base);
        let supp = document("supp", lines_supp);

        let first = match_documents(&base, &supp, &config());
        let second = match_documents(&base, &supp, &config());
        assert_eq!(first, second);
    }

    #[test]
    fn test_normalize_title_strips_punctuation_and_case() {
        assert_eq!(normalize_title("General  Provisions."), "general provisions");
        assert_eq!(normalize_title("Water—Heaters"), "water heaters");
        assert_eq!(normalize_title(""), "");
    }

    #[test]
    fn test_jaccard_bounds() {
        let a = token_set("one two three");
        let b = token_set("one two three");
        let c = token_set("four five six");
        assert_eq!(jaccard(&a, &b), 1.0);
        assert_eq!(jaccard(&a, &c), 0.0);
        let d = token_set("one two four five");
        let overlap = jaccard(&a, &d);
        assert!(overlap > 0.0 && overlap < 1.0);
    }
}
