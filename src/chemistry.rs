//! Lightweight chemistry typesetting for `\ce{…}` spans.
//!
//! The bundled KaTeX has no mhchem extension, so simple formula notation is
//! rendered by direct substitution: digits after an element symbol become
//! subscripts, `^…` becomes a superscript (charges included), and reaction
//! arrows are replaced with the arrow glyph. Anything outside that subset
//! is an error and the caller falls back to the general math renderer.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub(crate) enum ChemistryError {
    #[error("not a \\ce{{…}} call")]
    NotAFormula,
    #[error("unsupported chemistry construct: {token:?}")]
    Unsupported { token: char },
}

/// Render the inner HTML for a `\ce{…}` span. `source` is the full call
/// including the macro wrapper.
pub(crate) fn render_chemistry_html(source: &str) -> Result<String, ChemistryError> {
    let inner = source
        .trim()
        .strip_prefix("\\ce{")
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or(ChemistryError::NotAFormula)?;

    let mut out = String::with_capacity(inner.len() * 2);
    let chars: Vec<char> = inner.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        match ch {
            'A'..='Z' | 'a'..='z' | '(' | ')' | '[' | ']' | ' ' | '+' | '.' | '*' => {
                push_escaped(&mut out, ch);
                i += 1;
            }
            '0'..='9' => {
                let run = digit_run(&chars, i);
                if follows_symbol(&chars, i) {
                    out.push_str("<sub>");
                    out.push_str(&run);
                    out.push_str("</sub>");
                } else {
                    // Leading stoichiometric coefficient.
                    out.push_str(&run);
                }
                i += run.len();
            }
            '^' => {
                let start = i + 1;
                let mut j = start;
                while j < chars.len() && matches!(chars[j], '0'..='9' | '+' | '-') {
                    j += 1;
                }
                if j == start {
                    return Err(ChemistryError::Unsupported { token: '^' });
                }
                out.push_str("<sup>");
                for &c in &chars[start..j] {
                    push_escaped(&mut out, c);
                }
                out.push_str("</sup>");
                i = j;
            }
            '_' => {
                let run = digit_run(&chars, i + 1);
                if run.is_empty() {
                    return Err(ChemistryError::Unsupported { token: '_' });
                }
                out.push_str("<sub>");
                out.push_str(&run);
                out.push_str("</sub>");
                i += 1 + run.len();
            }
            '-' if chars.get(i + 1) == Some(&'>') => {
                out.push('\u{2192}');
                i += 2;
            }
            '=' => {
                out.push('=');
                i += 1;
            }
            other => return Err(ChemistryError::Unsupported { token: other }),
        }
    }
    Ok(out)
}

fn digit_run(chars: &[char], from: usize) -> String {
    chars[from..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .collect()
}

/// A digit subscripts only when it follows an element symbol or a closing
/// group; `2H2O`'s leading `2` is a coefficient.
fn follows_symbol(chars: &[char], at: usize) -> bool {
    at > 0 && matches!(chars[at - 1], 'A'..='Z' | 'a'..='z' | ')' | ']')
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        _ => out.push(ch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_subscripts_the_two() {
        assert_eq!(render_chemistry_html("\\ce{H2O}").unwrap(), "H<sub>2</sub>O");
    }

    #[test]
    fn coefficient_stays_on_the_line() {
        assert_eq!(
            render_chemistry_html("\\ce{2H2O}").unwrap(),
            "2H<sub>2</sub>O"
        );
    }

    #[test]
    fn grouped_formula_subscripts_after_paren() {
        assert_eq!(
            render_chemistry_html("\\ce{Ca(OH)2}").unwrap(),
            "Ca(OH)<sub>2</sub>"
        );
    }

    #[test]
    fn ion_charge_superscripts() {
        assert_eq!(
            render_chemistry_html("\\ce{SO4^2-}").unwrap(),
            "SO<sub>4</sub><sup>2-</sup>"
        );
    }

    #[test]
    fn reaction_arrow() {
        let html = render_chemistry_html("\\ce{2H2 + O2 -> 2H2O}").unwrap();
        assert_eq!(
            html,
            "2H<sub>2</sub> + O<sub>2</sub> \u{2192} 2H<sub>2</sub>O"
        );
    }

    #[test]
    fn nested_macro_is_unsupported() {
        assert!(render_chemistry_html("\\ce{\\frac{1}{2}O2}").is_err());
    }

    #[test]
    fn non_ce_input_is_rejected() {
        assert!(matches!(
            render_chemistry_html("x^2"),
            Err(ChemistryError::NotAFormula)
        ));
    }
}
