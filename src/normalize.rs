//! Input normalisation ahead of delimiter matching.
//!
//! Japanese keyboards produce `¥` where `\` is intended, so tutoring
//! messages routinely arrive with `¥frac{1}{2}` style commands. The yen
//! sign has no other role in math or chemistry input here, so it is mapped
//! unconditionally. Line endings are normalised to LF so the matcher and
//! the classification heuristic only ever see `\n`.

pub(crate) fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '¥' => out.push('\\'),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yen_becomes_backslash() {
        assert_eq!(normalize("¥frac{a}{b}"), "\\frac{a}{b}");
    }

    #[test]
    fn crlf_and_bare_cr_become_lf() {
        assert_eq!(normalize("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(normalize("x + y = z"), "x + y = z");
    }
}
