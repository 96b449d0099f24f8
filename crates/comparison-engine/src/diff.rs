//! Section text diffing
//!
//! Classifies a matched section pair and, for modified sections, computes a
//! word-level delta: a longest-common-subsequence alignment over
//! whitespace-normalized tokens, emitting minimal equal/inserted/deleted
//! spans with deletions ordered before insertions. Deterministic for
//! identical inputs; ties prefer the earliest matching subsequence.

use code_model::{
    ChangeKind, Correspondence, DiffResult, DiffSpan, SectionIndex, SectionRef, SpanKind,
};

// Quadratic LCS table bound. Beyond this the delta degrades to a whole-body
// replacement, which still satisfies the reconstruction laws.
const MAX_LCS_CELLS: usize = 25_000_000;

/// Classify a correspondence and compute its text delta.
pub fn diff_correspondence(
    correspondence: &Correspondence,
    base_index: &SectionIndex<'_>,
    supplemental_index: &SectionIndex<'_>,
) -> DiffResult {
    let base_body = body_of(correspondence.base.as_ref(), base_index);
    let supplemental_body = body_of(correspondence.supplemental.as_ref(), supplemental_index);

    let base_tokens = tokens(&base_body);
    let supplemental_tokens = tokens(&supplemental_body);

    let (kind, delta) = match (&correspondence.base, &correspondence.supplemental) {
        (None, Some(_)) => (
            ChangeKind::Added,
            whole_span(SpanKind::Inserted, &supplemental_tokens),
        ),
        (Some(_), None) => (
            ChangeKind::Removed,
            whole_span(SpanKind::Deleted, &base_tokens),
        ),
        _ if base_tokens == supplemental_tokens => (
            ChangeKind::Unchanged,
            whole_span(SpanKind::Equal, &base_tokens),
        ),
        _ => (
            ChangeKind::Modified,
            lcs_diff(&base_tokens, &supplemental_tokens),
        ),
    };

    DiffResult {
        kind,
        base: correspondence.base.clone(),
        supplemental: correspondence.supplemental.clone(),
        score: correspondence.score,
        method: correspondence.method,
        delta,
    }
}

/// Resolve a referenced section's body through the document index.
fn body_of(reference: Option<&SectionRef>, index: &SectionIndex<'_>) -> String {
    reference
        .and_then(|r| index.get(&r.number))
        .map(|section| section.body.clone())
        .unwrap_or_default()
}

/// Whitespace-normalized word tokens.
fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

fn whole_span(kind: SpanKind, tokens: &[String]) -> Vec<DiffSpan> {
    if tokens.is_empty() {
        Vec::new()
    } else {
        vec![DiffSpan {
            kind,
            text: tokens.join(" "),
        }]
    }
}

/// LCS alignment over token slices, merged into spans.
fn lcs_diff(base: &[String], supplemental: &[String]) -> Vec<DiffSpan> {
    // Common prefix/suffix carry no information for the DP table; trimming
    // them keeps the quadratic part proportional to the changed region.
    let prefix = base
        .iter()
        .zip(supplemental)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = base[prefix..]
        .iter()
        .rev()
        .zip(supplemental[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let middle_base = &base[prefix..base.len() - suffix];
    let middle_supp = &supplemental[prefix..supplemental.len() - suffix];

    let mut builder = SpanBuilder::default();
    for token in &base[..prefix] {
        builder.push(SpanKind::Equal, token);
    }

    if middle_base.len().saturating_mul(middle_supp.len()) > MAX_LCS_CELLS {
        for token in middle_base {
            builder.push(SpanKind::Deleted, token);
        }
        for token in middle_supp {
            builder.push(SpanKind::Inserted, token);
        }
    } else {
        align(middle_base, middle_supp, &mut builder);
    }

    for token in &base[base.len() - suffix..] {
        builder.push(SpanKind::Equal, token);
    }
    builder.finish()
}

/// Classic dynamic-programming LCS walk.
///
/// `table[i * (n + 1) + j]` holds the LCS length of `base[i..]` and
/// `supplemental[j..]`; the forward walk then matches equal tokens as early
/// as possible and emits deletions before insertions.
fn align(base: &[String], supplemental: &[String], builder: &mut SpanBuilder) {
    let m = base.len();
    let n = supplemental.len();
    let mut table = vec![0u32; (m + 1) * (n + 1)];
    let at = |i: usize, j: usize| i * (n + 1) + j;

    for i in (0..m).rev() {
        for j in (0..n).rev() {
            table[at(i, j)] = if base[i] == supplemental[j] {
                table[at(i + 1, j + 1)] + 1
            } else {
                table[at(i + 1, j)].max(table[at(i, j + 1)])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < m && j < n {
        if base[i] == supplemental[j] {
            builder.push(SpanKind::Equal, &base[i]);
            i += 1;
            j += 1;
        } else if table[at(i + 1, j)] >= table[at(i, j + 1)] {
            builder.push(SpanKind::Deleted, &base[i]);
            i += 1;
        } else {
            builder.push(SpanKind::Inserted, &supplemental[j]);
            j += 1;
        }
    }
    while i < m {
        builder.push(SpanKind::Deleted, &base[i]);
        i += 1;
    }
    while j < n {
        builder.push(SpanKind::Inserted, &supplemental[j]);
        j += 1;
    }
}

/// Accumulates tokens into spans, merging consecutive tokens of one kind.
#[derive(Default)]
struct SpanBuilder {
    spans: Vec<DiffSpan>,
    current: Option<(SpanKind, String)>,
}

impl SpanBuilder {
    fn push(&mut self, kind: SpanKind, token: &str) {
        match &mut self.current {
            Some((current_kind, text)) if *current_kind == kind => {
                text.push(' ');
                text.push_str(token);
            }
            _ => {
                self.flush();
                self.current = Some((kind, token.to_string()));
            }
        }
    }

    fn flush(&mut self) {
        if let Some((kind, text)) = self.current.take() {
            self.spans.push(DiffSpan { kind, text });
        }
    }

    fn finish(mut self) -> Vec<DiffSpan> {
        self.flush();
        self.spans
    }
}
