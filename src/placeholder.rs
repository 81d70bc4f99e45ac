//! Placeholder substitution: resolved spans are swapped for opaque tokens
//! before the Markdown pass so CommonMark emphasis, escapes, and code-span
//! rules cannot mangle math source. Tokens are purely alphanumeric — no
//! character in them is special to the Markdown grammar — and carry the
//! span's id so restoration can find its render result again.

use crate::span::ResolvedSpan;

const TOKEN_HEAD: &str = "GESSOMATH";
const TOKEN_TAIL: &str = "XENDSPAN";

/// Per-call token vocabulary. The head is extended until it occurs nowhere
/// in the source text, so a token a user happens to type literally can never
/// alias a real span's stand-in and get spliced over during restoration.
pub(crate) struct TokenScheme {
    head: String,
}

impl TokenScheme {
    pub fn for_text(text: &str) -> Self {
        let mut head = String::from(TOKEN_HEAD);
        while text.contains(head.as_str()) {
            head.push('Q');
        }
        Self { head }
    }

    /// The opaque token standing in for span `id`.
    pub fn token_for(&self, id: usize) -> String {
        format!("{}{id}{TOKEN_TAIL}", self.head)
    }

    /// Replace each resolved span's delimited range with its token. Text
    /// outside spans is preserved verbatim; display spans get blank lines
    /// around their token so comrak parses them as their own paragraph.
    pub fn substitute(&self, text: &str, spans: &[ResolvedSpan]) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for resolved in spans {
            out.push_str(&text[cursor..resolved.span.start]);
            if resolved.display {
                if !out.is_empty() && !out.ends_with("\n\n") {
                    out.push_str(if out.ends_with('\n') { "\n" } else { "\n\n" });
                }
                out.push_str(&self.token_for(resolved.placeholder_id));
                out.push_str("\n\n");
            } else {
                out.push_str(&self.token_for(resolved.placeholder_id));
            }
            cursor = resolved.span.end;
        }
        // Skip the newline a display span already consumed visually.
        let tail = &text[cursor..];
        if out.ends_with("\n\n") {
            out.push_str(tail.trim_start_matches('\n'));
        } else {
            out.push_str(tail);
        }
        out
    }

    /// Split literal text around any embedded placeholder tokens. Text that
    /// merely resembles a token (bad id digits, missing tail) stays literal.
    pub fn split_text<'a>(&self, text: &'a str) -> Vec<TextPiece<'a>> {
        let mut pieces = Vec::new();
        let mut cursor = 0;
        while let Some(rel) = text[cursor..].find(self.head.as_str()) {
            let head_at = cursor + rel;
            match self.parse_token(&text[head_at..]) {
                Some((id, token_len)) => {
                    if head_at > cursor {
                        pieces.push(TextPiece::Literal(&text[cursor..head_at]));
                    }
                    pieces.push(TextPiece::Token(id));
                    cursor = head_at + token_len;
                }
                None => {
                    pieces.push(TextPiece::Literal(&text[cursor..head_at + self.head.len()]));
                    cursor = head_at + self.head.len();
                }
            }
        }
        if cursor < text.len() {
            pieces.push(TextPiece::Literal(&text[cursor..]));
        }
        pieces
    }

    /// Parse a token at the start of `text`, returning `(id, token_len)`.
    fn parse_token(&self, text: &str) -> Option<(usize, usize)> {
        let rest = text.strip_prefix(self.head.as_str())?;
        let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 {
            return None;
        }
        let id: usize = rest[..digits_len].parse().ok()?;
        let after = &rest[digits_len..];
        after
            .starts_with(TOKEN_TAIL)
            .then(|| (id, self.head.len() + digits_len + TOKEN_TAIL.len()))
    }
}

/// One piece of a text node after token splitting.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TextPiece<'a> {
    Literal(&'a str),
    Token(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{find_spans, resolve_spans};

    fn substituted(text: &str) -> (TokenScheme, String) {
        let resolved = resolve_spans(find_spans(text, true));
        let tokens = TokenScheme::for_text(text);
        let out = tokens.substitute(text, &resolved);
        (tokens, out)
    }

    #[test]
    fn inline_token_sits_in_the_sentence() {
        let (tokens, out) = substituted("$E=mc^2$ and more text");
        assert_eq!(out, format!("{} and more text", tokens.token_for(0)));
    }

    #[test]
    fn display_token_gets_its_own_paragraph() {
        let (tokens, out) = substituted("before\n$$x+y$$\nafter");
        assert!(out.contains(&format!("\n\n{}\n\n", tokens.token_for(0))));
        assert!(out.starts_with("before"));
        assert!(out.ends_with("after"));
    }

    #[test]
    fn text_without_spans_is_verbatim() {
        let text = "# heading\n\nplain *markdown* here";
        assert_eq!(substituted(text).1, text);
    }

    #[test]
    fn head_extends_past_literal_token_text() {
        let text = "typed GESSOMATH0XENDSPAN literally, plus $x^2$";
        let tokens = TokenScheme::for_text(text);
        assert!(!text.contains(&tokens.token_for(0)));

        let resolved = resolve_spans(find_spans(text, true));
        let out = tokens.substitute(text, &resolved);
        assert!(out.contains("typed GESSOMATH0XENDSPAN literally"));

        let pieces = tokens.split_text(&out);
        let spliced: Vec<_> = pieces
            .iter()
            .filter(|p| matches!(p, TextPiece::Token(_)))
            .collect();
        assert_eq!(spliced, vec![&TextPiece::Token(0)]);
    }

    #[test]
    fn split_finds_embedded_tokens() {
        let tokens = TokenScheme::for_text("");
        let text = format!("pre {} post", tokens.token_for(7));
        let pieces = tokens.split_text(&text);
        assert_eq!(
            pieces,
            vec![
                TextPiece::Literal("pre "),
                TextPiece::Token(7),
                TextPiece::Literal(" post"),
            ]
        );
    }

    #[test]
    fn near_miss_stays_literal() {
        let tokens = TokenScheme::for_text("");
        let text = "GESSOMATHnotanumberXENDSPAN";
        let pieces = tokens.split_text(text);
        assert!(pieces.iter().all(|p| matches!(p, TextPiece::Literal(_))));
    }

    #[test]
    fn tokens_round_trip_through_parse() {
        let tokens = TokenScheme::for_text("");
        for id in [0usize, 3, 12, 907] {
            let token = tokens.token_for(id);
            assert_eq!(tokens.parse_token(&token), Some((id, token.len())));
        }
    }
}
