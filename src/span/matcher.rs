//! Delimiter matching: a single explicit scan per delimiter family over the
//! normalised buffer. The matcher is total — malformed input produces fewer
//! matches, never an error — and overlap between families is left for the
//! resolver to sort out.

/// Final typesetting category of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Block,
    Inline,
    Chemistry,
}

/// One start/end token pair recognised as marking a math or chemistry span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelimiterFamily {
    DoubleDollar,
    BracketDisplay,
    Environment,
    ParenInline,
    SingleDollar,
    ChemistryMacro,
}

impl DelimiterFamily {
    /// Scan order. Block families run first so the resolver's greedy pass
    /// prefers them over inline matches covering the same text.
    pub const SCAN_ORDER: [DelimiterFamily; 6] = [
        DelimiterFamily::DoubleDollar,
        DelimiterFamily::BracketDisplay,
        DelimiterFamily::Environment,
        DelimiterFamily::ParenInline,
        DelimiterFamily::SingleDollar,
        DelimiterFamily::ChemistryMacro,
    ];

    pub fn kind(self) -> SpanKind {
        match self {
            DelimiterFamily::DoubleDollar
            | DelimiterFamily::BracketDisplay
            | DelimiterFamily::Environment => SpanKind::Block,
            DelimiterFamily::ParenInline | DelimiterFamily::SingleDollar => SpanKind::Inline,
            DelimiterFamily::ChemistryMacro => SpanKind::Chemistry,
        }
    }
}

/// A matched span. Offsets are byte positions of the full delimited range in
/// the normalised source; `content` is the inner text, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub content: String,
    pub kind: SpanKind,
    pub start: usize,
    pub end: usize,
    pub family: DelimiterFamily,
}

/// Find all candidate spans, family by family in [`DelimiterFamily::SCAN_ORDER`].
/// The result may contain cross-family overlaps.
pub fn find_spans(text: &str, chemistry_enabled: bool) -> Vec<MatchSpan> {
    let mut spans = Vec::new();
    for family in DelimiterFamily::SCAN_ORDER {
        match family {
            DelimiterFamily::DoubleDollar => scan_paired(text, "$$", "$$", family, true, &mut spans),
            DelimiterFamily::BracketDisplay => {
                scan_paired(text, "\\[", "\\]", family, true, &mut spans)
            }
            DelimiterFamily::Environment => scan_environments(text, &mut spans),
            DelimiterFamily::ParenInline => {
                scan_paired(text, "\\(", "\\)", family, false, &mut spans)
            }
            DelimiterFamily::SingleDollar => scan_paired(text, "$", "$", family, false, &mut spans),
            DelimiterFamily::ChemistryMacro => {
                if chemistry_enabled {
                    scan_chemistry(text, &mut spans);
                }
            }
        }
    }
    spans
}

/// Scan one start/end token family. Unterminated starts resume one character
/// past the start token so the scan always advances.
fn scan_paired(
    text: &str,
    start_tok: &str,
    end_tok: &str,
    family: DelimiterFamily,
    allow_newlines: bool,
    out: &mut Vec<MatchSpan>,
) {
    let single_dollar = start_tok == "$";
    let mut pos = 0;
    while let Some(rel) = text[pos..].find(start_tok) {
        let start = pos + rel;
        if is_escaped_dollar(text, start, start_tok) {
            pos = start + 1;
            continue;
        }
        // A literal `$$` is never two adjacent single-`$` tokens.
        if single_dollar && text[start..].starts_with("$$") {
            pos = start + 2;
            continue;
        }
        let content_start = start + start_tok.len();
        let Some(end_at) = find_end_token(text, content_start, end_tok) else {
            pos = start + 1;
            continue;
        };
        let content = &text[content_start..end_at];
        if !allow_newlines && content.contains('\n') {
            pos = start + 1;
            continue;
        }
        let trimmed = content.trim();
        let end = end_at + end_tok.len();
        if trimmed.is_empty() {
            pos = end;
            continue;
        }
        out.push(MatchSpan {
            content: trimmed.to_string(),
            kind: family.kind(),
            start,
            end,
            family,
        });
        pos = end;
    }
}

/// Locate the next unescaped occurrence of `end_tok` at or after `from`.
fn find_end_token(text: &str, from: usize, end_tok: &str) -> Option<usize> {
    let mut pos = from;
    while let Some(rel) = text[pos..].find(end_tok) {
        let at = pos + rel;
        if is_escaped_dollar(text, at, end_tok) {
            pos = at + 1;
            continue;
        }
        return Some(at);
    }
    None
}

/// `\$` is a literal dollar, not a delimiter. Only dollar tokens can be
/// escaped this way; backslash-led tokens carry their own escape.
fn is_escaped_dollar(text: &str, at: usize, token: &str) -> bool {
    token.starts_with('$') && at > 0 && text.as_bytes()[at - 1] == b'\\'
}

/// Match `\begin{env} … \end{env}` pairs. The span content keeps both
/// wrappers because KaTeX needs the environment intact.
fn scan_environments(text: &str, out: &mut Vec<MatchSpan>) {
    const BEGIN: &str = "\\begin{";
    let mut pos = 0;
    while let Some(rel) = text[pos..].find(BEGIN) {
        let start = pos + rel;
        let name_start = start + BEGIN.len();
        let Some(name) = environment_name(&text[name_start..]) else {
            pos = start + 1;
            continue;
        };
        let end_tok = format!("\\end{{{name}}}");
        let search_from = name_start + name.len() + 1;
        let Some(rel_end) = text[search_from..].find(&end_tok) else {
            pos = start + 1;
            continue;
        };
        let end = search_from + rel_end + end_tok.len();
        out.push(MatchSpan {
            content: text[start..end].trim().to_string(),
            kind: SpanKind::Block,
            start,
            end,
            family: DelimiterFamily::Environment,
        });
        pos = end;
    }
}

fn environment_name(after_brace: &str) -> Option<&str> {
    let close = after_brace.find('}')?;
    let name = &after_brace[..close];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic() || c == '*') {
        return None;
    }
    Some(name)
}

/// Match bare `\ce{…}` calls outside math delimiters. Content is the whole
/// call; nested unescaped braces are tracked so `\ce{Ca(OH)2}` style input
/// with grouped arguments still closes where it should.
fn scan_chemistry(text: &str, out: &mut Vec<MatchSpan>) {
    const CE: &str = "\\ce{";
    let mut pos = 0;
    while let Some(rel) = text[pos..].find(CE) {
        let start = pos + rel;
        let inner_start = start + CE.len();
        let Some(close) = matching_close_brace(text, inner_start) else {
            pos = start + 1;
            continue;
        };
        let inner = &text[inner_start..close];
        if inner.trim().is_empty() || inner.contains('\n') {
            pos = close + 1;
            continue;
        }
        let end = close + 1;
        out.push(MatchSpan {
            content: text[start..end].to_string(),
            kind: SpanKind::Chemistry,
            start,
            end,
            family: DelimiterFamily::ChemistryMacro,
        });
        pos = end;
    }
}

/// Byte offset of the `}` closing the brace opened just before `from`,
/// honouring `\{`/`\}` escapes.
pub(crate) fn matching_close_brace(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_of(text: &str) -> Vec<MatchSpan> {
        find_spans(text, true)
    }

    #[test]
    fn single_dollar_inline() {
        let spans = spans_of("$E=mc^2$ and more text");
        let inline: Vec<_> = spans
            .iter()
            .filter(|s| s.family == DelimiterFamily::SingleDollar)
            .collect();
        assert_eq!(inline.len(), 1);
        assert_eq!(inline[0].content, "E=mc^2");
        assert_eq!((inline[0].start, inline[0].end), (0, 8));
    }

    #[test]
    fn double_dollar_is_not_two_singles() {
        let spans = spans_of("$$x$$");
        assert!(
            spans
                .iter()
                .all(|s| s.family != DelimiterFamily::SingleDollar)
        );
        let block: Vec<_> = spans
            .iter()
            .filter(|s| s.family == DelimiterFamily::DoubleDollar)
            .collect();
        assert_eq!(block.len(), 1);
        assert_eq!(block[0].content, "x");
    }

    #[test]
    fn block_content_is_trimmed() {
        let spans = spans_of("$$\n\\frac{a+b}{2}\n$$");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "\\frac{a+b}{2}");
        assert_eq!(spans[0].kind, SpanKind::Block);
    }

    #[test]
    fn unterminated_display_bracket_matches_nothing() {
        assert!(spans_of("some text \\[x^2 continues").is_empty());
    }

    #[test]
    fn empty_content_is_skipped() {
        assert!(spans_of("$$$$ and $ $ here").is_empty());
    }

    #[test]
    fn escaped_dollars_are_literal() {
        assert!(spans_of("costs \\$5 and \\$10 total").is_empty());
    }

    #[test]
    fn inline_rejects_embedded_newline() {
        let spans = spans_of("$a\nb$");
        assert!(
            spans
                .iter()
                .all(|s| s.family != DelimiterFamily::SingleDollar)
        );
    }

    #[test]
    fn environment_span_keeps_wrappers() {
        let text = "\\begin{pmatrix}1 & 2\\\\3 & 4\\end{pmatrix}";
        let spans = spans_of(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, text);
        assert_eq!(spans[0].kind, SpanKind::Block);
    }

    #[test]
    fn unmatched_environment_is_skipped() {
        assert!(spans_of("\\begin{align}x=1").is_empty());
    }

    #[test]
    fn bare_chemistry_macro_matches() {
        let spans = spans_of("formula: \\ce{H2O} here");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "\\ce{H2O}");
        assert_eq!(spans[0].kind, SpanKind::Chemistry);
    }

    #[test]
    fn chemistry_tracks_nested_braces() {
        let spans = spans_of("\\ce{Ca(OH)2}");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "\\ce{Ca(OH)2}");
    }

    #[test]
    fn chemistry_family_can_be_disabled() {
        assert!(find_spans("\\ce{H2O}", false).is_empty());
    }

    #[test]
    fn paren_inline_family() {
        let spans = spans_of("see \\(a+b\\) here");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "a+b");
        assert_eq!(spans[0].kind, SpanKind::Inline);
    }
}
