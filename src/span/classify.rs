//! Display-promotion heuristic for inline math.
//!
//! Tutoring content is full of vector and matrix formulas typed as inline
//! math that render unreadably at inline scale. This is a pragmatic
//! width-overflow guard, not a LaTeX-correctness rule: long spans, spans
//! with structural multi-line constructs, and spans dense in geometry
//! symbols are promoted to display mode.

/// Any one of these promotes on presence: they imply vertical layout or
/// tall glyphs that cannot work inline.
const STRONG_INDICATORS: &[&str] = &[
    "\\begin{",
    "\\end{",
    "\\\\",
    "\n",
    "\r",
    "\\frac{",
    "\\sum",
    "\\int",
    "\\prod",
    "pmatrix",
    "bmatrix",
    "vmatrix",
    "Bmatrix",
    "Vmatrix",
    "smallmatrix",
    "cases",
];

/// Counted by occurrence; three or more together promote even though any
/// single one is fine inline.
const WEAK_INDICATORS: &[&str] = &[
    "\\times",
    "\\vec{",
    "\\cdot",
    "\\bullet",
    "\\sin",
    "\\cos",
    "\\tan",
    "\\alpha",
    "\\beta",
    "\\gamma",
    "\\theta",
    "\\lambda",
    "\\pi",
    "\\sigma",
    "\\omega",
    "\\phi",
    "\\mu",
];

const LENGTH_LIMIT: usize = 50;
const DENSITY_LIMIT: usize = 3;

/// Decide whether an inline math span should be retagged as display math
/// before rendering. Deterministic; never errors.
pub fn should_force_block(content: &str) -> bool {
    if content.chars().count() > LENGTH_LIMIT {
        return true;
    }
    if STRONG_INDICATORS.iter().any(|tok| content.contains(tok)) {
        return true;
    }
    let density: usize = WEAK_INDICATORS
        .iter()
        .map(|tok| content.matches(tok).count())
        .sum();
    density >= DENSITY_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_simple_math_stays_inline() {
        assert!(!should_force_block("x^2"));
        assert!(!should_force_block("E=mc^2"));
    }

    #[test]
    fn cross_product_density_promotes() {
        assert!(should_force_block("\\vec{a} \\times \\vec{b}"));
    }

    #[test]
    fn single_weak_indicator_stays_inline() {
        assert!(!should_force_block("a \\times b"));
        assert!(!should_force_block("\\pi r^2"));
    }

    #[test]
    fn fraction_promotes_on_presence() {
        assert!(should_force_block("\\frac{a+b}{2}"));
    }

    #[test]
    fn line_break_token_promotes() {
        assert!(should_force_block("x = 1 \\\\ y = 2"));
    }

    #[test]
    fn matrix_environment_promotes() {
        assert!(should_force_block("\\begin{pmatrix}1\\end{pmatrix}"));
    }

    #[test]
    fn long_content_promotes() {
        let long = "a + b + c + d + e + f + g + h + i + j + k + l + m + n";
        assert!(long.chars().count() > LENGTH_LIMIT);
        assert!(should_force_block(long));
    }

    #[test]
    fn length_rule_counts_characters_not_bytes() {
        let japanese = "ベクトルの外積は行列式で計算できます";
        assert!(japanese.len() > LENGTH_LIMIT);
        assert!(japanese.chars().count() <= LENGTH_LIMIT);
        assert!(!should_force_block(japanese));
    }
}
