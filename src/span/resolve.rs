//! Overlap resolution: merge the per-family match lists into one disjoint,
//! ordered sequence and hand out placeholder ids.

use super::matcher::{MatchSpan, SpanKind};

/// A span that survived overlap resolution. Resolved spans are pairwise
/// disjoint and ordered by `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    pub span: MatchSpan,
    pub placeholder_id: usize,
    /// Whether the span is typeset in display mode. Seeded from the
    /// delimiter kind; inline spans may be promoted later by the
    /// classification heuristic.
    pub display: bool,
}

/// Greedy first-wins filtering. The input arrives concatenated in family
/// scan order (block families first); a stable sort by start offset keeps
/// that priority for spans starting at the same position, and the
/// documented tie-break prefers the longer span when starts coincide.
pub fn resolve_spans(mut matches: Vec<MatchSpan>) -> Vec<ResolvedSpan> {
    matches.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut resolved: Vec<ResolvedSpan> = Vec::with_capacity(matches.len());
    let mut frontier = 0usize;
    for span in matches {
        if span.start < frontier {
            continue;
        }
        frontier = span.end;
        let display = span.kind == SpanKind::Block;
        resolved.push(ResolvedSpan {
            span,
            placeholder_id: resolved.len(),
            display,
        });
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::matcher::find_spans;

    fn resolve(text: &str) -> Vec<ResolvedSpan> {
        resolve_spans(find_spans(text, true))
    }

    #[test]
    fn block_wins_over_inline_inside_it() {
        // The single-`$` span's start falls inside the `$$…$$` range.
        let resolved = resolve("$$a $b$ c$$");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].span.kind, SpanKind::Block);
        assert_eq!(resolved[0].span.content, "a $b$ c");
    }

    #[test]
    fn disjoint_spans_all_survive_in_order() {
        let resolved = resolve("$a$ then $$b$$ then \\(c\\)");
        assert_eq!(resolved.len(), 3);
        assert!(resolved.windows(2).all(|w| w[0].span.end <= w[1].span.start));
        let ids: Vec<_> = resolved.iter().map(|r| r.placeholder_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn outer_span_wins_over_nested_environment() {
        let resolved = resolve("\\[\\begin{aligned}x\\end{aligned}\\]");
        assert_eq!(resolved.len(), 1);
        assert_eq!(
            resolved[0].span.family,
            crate::span::matcher::DelimiterFamily::BracketDisplay
        );
    }

    #[test]
    fn chemistry_inside_dollars_resolves_to_the_dollar_span() {
        let resolved = resolve("$\\ce{H2O}$");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].span.content, "\\ce{H2O}");
        assert_eq!(resolved[0].span.kind, SpanKind::Inline);
    }

    #[test]
    fn display_seeded_from_kind() {
        let resolved = resolve("$$x$$ and $y$");
        assert!(resolved[0].display);
        assert!(!resolved[1].display);
    }
}
