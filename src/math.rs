//! Math and chemistry render adapter.
//!
//! Every resolved span becomes exactly one [`RenderResult`]; KaTeX syntax
//! errors are caught here and converted into a visually flagged error
//! fragment carrying the raw source, so one broken formula never blocks the
//! rest of the document.

use katex::{OptsBuilder, OutputType};
use tracing::warn;

use crate::chemistry::render_chemistry_html;
use crate::span::{ResolvedSpan, SpanKind};

/// Terminal render output for one span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub placeholder_id: usize,
    pub html: String,
    pub is_error: bool,
    pub error_message: Option<String>,
}

/// Cheap well-formedness check run before handing content to KaTeX:
/// balanced unescaped braces and pairwise matched `\begin`/`\end`. Catches
/// the common truncated-formula case without a KaTeX round trip.
pub fn is_valid_latex(content: &str) -> bool {
    let bytes = content.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
        i += 1;
    }
    if depth != 0 {
        return false;
    }
    content.matches("\\begin{").count() == content.matches("\\end{").count()
}

/// Render one resolved span to its final HTML fragment.
pub(crate) fn render_span(resolved: &ResolvedSpan) -> RenderResult {
    let content = resolved.span.content.as_str();
    if resolved.span.kind == SpanKind::Chemistry {
        match render_chemistry_html(content) {
            Ok(inner) => {
                return ok_result(
                    resolved.placeholder_id,
                    wrap(&inner, "chemistry-inline", false),
                );
            }
            Err(err) => {
                warn!(
                    target: "gesso::chemistry",
                    source = content,
                    error = %err,
                    "chemistry renderer fell back to KaTeX"
                );
            }
        }
    }

    if !is_valid_latex(content) {
        return error_result(resolved, "unbalanced braces or environments");
    }

    match katex_html(content, resolved.display) {
        Ok(html) => {
            let role = if resolved.display {
                "math-block"
            } else {
                "math-inline"
            };
            ok_result(resolved.placeholder_id, wrap(&html, role, resolved.display))
        }
        Err(message) => {
            warn!(
                target: "gesso::math",
                source = content,
                error = %message,
                "KaTeX rejected span"
            );
            error_result(resolved, &message)
        }
    }
}

fn katex_html(content: &str, display_mode: bool) -> Result<String, String> {
    let mut builder = OptsBuilder::default();
    builder.display_mode(display_mode);
    builder.output_type(OutputType::Html);

    let opts = builder
        .build()
        .map_err(|err| format!("failed to build KaTeX options: {err}"))?;

    katex::render_with_opts(content, opts).map_err(|err| err.to_string())
}

fn ok_result(placeholder_id: usize, html: String) -> RenderResult {
    RenderResult {
        placeholder_id,
        html,
        is_error: false,
        error_message: None,
    }
}

/// The error fragment shows the raw source in a tinted element; the message
/// travels in a title attribute for hover inspection.
fn error_result(resolved: &ResolvedSpan, message: &str) -> RenderResult {
    let escaped_source = ammonia::clean_text(&resolved.span.content);
    let escaped_message = ammonia::clean_text(message);
    let tag = if resolved.display { "div" } else { "span" };
    let html = format!(
        "<{tag} data-role=\"math-error\" title=\"{escaped_message}\"><code>{escaped_source}</code></{tag}>"
    );
    RenderResult {
        placeholder_id: resolved.placeholder_id,
        html,
        is_error: true,
        error_message: Some(message.to_string()),
    }
}

fn wrap(inner: &str, role: &str, display: bool) -> String {
    let tag = if display { "div" } else { "span" };
    format!("<{tag} data-role=\"{role}\">{inner}</{tag}>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{find_spans, resolve_spans};

    fn one_span(text: &str) -> ResolvedSpan {
        let mut resolved = resolve_spans(find_spans(text, true));
        assert_eq!(resolved.len(), 1);
        resolved.remove(0)
    }

    #[test]
    fn balanced_latex_is_valid() {
        assert!(is_valid_latex("\\frac{a+b}{2}"));
        assert!(is_valid_latex("x^2"));
        assert!(is_valid_latex("\\begin{aligned}x\\end{aligned}"));
    }

    #[test]
    fn unbalanced_braces_are_invalid() {
        assert!(!is_valid_latex("\\frac{1}{"));
        assert!(!is_valid_latex("a}b{"));
    }

    #[test]
    fn escaped_braces_do_not_count() {
        assert!(is_valid_latex("\\{a\\}"));
    }

    #[test]
    fn dangling_environment_is_invalid() {
        assert!(!is_valid_latex("\\begin{aligned}x"));
    }

    #[test]
    fn malformed_span_yields_error_result_not_panic() {
        let result = render_span(&one_span("$\\frac{1}{$"));
        assert!(result.is_error);
        assert!(result.html.contains("math-error"));
        assert!(result.html.contains("\\frac{1}{"));
    }

    #[test]
    fn chemistry_span_renders_subscripts() {
        let result = render_span(&one_span("\\ce{H2O}"));
        assert!(!result.is_error);
        assert!(result.html.contains("chemistry-inline"));
        assert!(result.html.contains("H<sub>2</sub>O"));
    }

    #[test]
    fn simple_math_renders() {
        let result = render_span(&one_span("$x^2$"));
        assert!(!result.is_error);
        assert!(result.html.contains("math-inline"));
        assert!(result.html.contains("katex"));
    }

    #[test]
    fn display_span_wraps_in_div() {
        let result = render_span(&one_span("$$x+y$$"));
        assert!(!result.is_error);
        assert!(result.html.starts_with("<div data-role=\"math-block\""));
    }
}
