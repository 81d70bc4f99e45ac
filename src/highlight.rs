//! Fenced-code highlighting with syntect's classed HTML generator. Output
//! carries CSS classes only; themes are the embedding UI's concern.

use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use crate::types::RenderError;

pub(crate) fn highlight_code(
    language: Option<&str>,
    code: &str,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
) -> Result<String, RenderError> {
    let lang_token = language.unwrap_or("text");
    let syntax =
        find_syntax(syntax_set, lang_token).unwrap_or_else(|| syntax_set.find_syntax_plain_text());

    let mut code_with_newline = code.to_string();
    if !code_with_newline.ends_with('\n') {
        code_with_newline.push('\n');
    }

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, *class_style);

    for line in LinesWithEndings::from(code_with_newline.as_str()) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|err| RenderError::Highlighting {
                language: lang_token.to_string(),
                message: err.to_string(),
            })?;
    }

    // The fence info token is untrusted chat input and lands in attribute
    // position, so it gets the same escaping the plain fallback applies.
    let lang_attr = ammonia::clean_text(lang_token);
    let lang_class = ammonia::clean_text(&lang_token.to_ascii_lowercase());
    Ok(format!(
        "<pre class=\"code-highlight code-lang-{lang_class}\" data-language=\"{lang_attr}\"><code class=\"language-{lang_class}\">{}</code></pre>",
        generator.finalize()
    ))
}

/// Escaped `<pre>` fallback used when highlighting fails; the literal is
/// never dropped.
pub(crate) fn plain_code_block(language: Option<&str>, code: &str) -> String {
    let escaped = ammonia::clean_text(code);
    let mut html = String::from("<pre class=\"code-highlight\"");
    if let Some(lang) = language.filter(|l| !l.is_empty()) {
        html.push_str(" data-language=\"");
        html.push_str(&ammonia::clean_text(lang));
        html.push('"');
    }
    html.push_str("><code>");
    html.push_str(&escaped);
    if !escaped.ends_with('\n') {
        html.push('\n');
    }
    html.push_str("</code></pre>");
    html
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let lowercase = token.to_ascii_lowercase();
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_name(&lowercase))
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}
