//! Pipeline assembly: normalise → match → resolve → classify → substitute →
//! markdown pass → splice rendered math → account for restorations.
//!
//! The pipeline is pure and deterministic per call. The only shared state is
//! the lazily built [`MessageRenderer`] holding the syntect syntax set and
//! comrak options, which are expensive to construct and never mutated.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use syntect::{html::ClassStyle, parsing::SyntaxSet};
use tracing::debug;

use crate::document::{MathKind, MathNode};
use crate::markdown::to_document;
use crate::math::render_span;
use crate::normalize::normalize;
use crate::placeholder::TokenScheme;
use crate::span::matcher::matching_close_brace;
use crate::span::{SpanKind, find_spans, resolve_spans, should_force_block};
use crate::types::{
    ChemistryDetection, Diagnostic, RenderError, RenderOptions, RenderedMessage,
};

/// Renders chat messages. One instance can serve any number of calls; all
/// per-call state lives on the stack.
pub struct MessageRenderer {
    comrak_options: comrak::Options<'static>,
    syntax_set: SyntaxSet,
    class_style: ClassStyle,
}

/// Trait seam for callers that inject the renderer. Implementations must be
/// pure: the same input yields structurally identical output.
pub trait RenderPipeline: Send + Sync {
    fn render(&self, text: &str, options: &RenderOptions)
    -> Result<RenderedMessage, RenderError>;
}

impl MessageRenderer {
    fn new() -> Self {
        Self {
            comrak_options: default_comrak_options(),
            syntax_set: SyntaxSet::load_defaults_newlines(),
            class_style: ClassStyle::SpacedPrefixed { prefix: "hl-" },
        }
    }

    pub fn render(
        &self,
        text: &str,
        options: &RenderOptions,
    ) -> Result<RenderedMessage, RenderError> {
        let normalized = normalize(text);

        let chemistry_enabled = options.chemistry == ChemistryDetection::Sniff;
        let matches = find_spans(&normalized, chemistry_enabled);
        let mut resolved = resolve_spans(matches);

        if chemistry_enabled {
            for span in &mut resolved {
                if span.span.kind == SpanKind::Inline && is_lone_ce_call(&span.span.content) {
                    span.span.kind = SpanKind::Chemistry;
                }
            }
        }

        for span in &mut resolved {
            if span.span.kind == SpanKind::Inline && !span.display {
                span.display = should_force_block(&span.span.content);
            }
        }

        let tokens = TokenScheme::for_text(&normalized);
        let substituted = tokens.substitute(&normalized, &resolved);

        let mut diagnostics = Vec::new();
        let mut prepared = BTreeMap::new();
        let mut contains_chemistry = false;
        for span in &resolved {
            let result = render_span(span);
            if result.is_error {
                diagnostics.push(Diagnostic::MathError {
                    source: span.span.content.clone(),
                    message: result.error_message.clone().unwrap_or_default(),
                });
            }
            let kind = match span.span.kind {
                SpanKind::Chemistry => {
                    contains_chemistry = true;
                    MathKind::Chemistry
                }
                _ if span.display => MathKind::Display,
                _ => MathKind::Inline,
            };
            prepared.insert(
                span.placeholder_id,
                MathNode {
                    source: span.span.content.clone(),
                    html: result.html,
                    kind,
                    is_error: result.is_error,
                    error_message: result.error_message,
                },
            );
        }

        let outcome = to_document(
            &substituted,
            &self.comrak_options,
            &prepared,
            &tokens,
            &self.syntax_set,
            &self.class_style,
        );

        for span in &resolved {
            if !outcome.restored.contains(&span.placeholder_id) {
                let token = tokens.token_for(span.placeholder_id);
                if options.debug_mode {
                    debug!(
                        target: "gesso::restore",
                        placeholder_id = span.placeholder_id,
                        token = token.as_str(),
                        "placeholder not found after markdown pass"
                    );
                }
                diagnostics.push(Diagnostic::RestorationMiss {
                    placeholder_id: span.placeholder_id,
                    token,
                });
            }
        }

        Ok(RenderedMessage {
            document: outcome.document,
            contains_math: !resolved.is_empty(),
            contains_chemistry,
            contains_code: outcome.contains_code,
            diagnostics,
        })
    }
}

impl RenderPipeline for MessageRenderer {
    fn render(
        &self,
        text: &str,
        options: &RenderOptions,
    ) -> Result<RenderedMessage, RenderError> {
        MessageRenderer::render(self, text, options)
    }
}

impl Default for MessageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A math span whose entire content is one balanced `\ce{…}` call is
/// chemistry notation typed inside math delimiters.
fn is_lone_ce_call(content: &str) -> bool {
    content.starts_with("\\ce{")
        && content.len() > 5
        && matching_close_brace(content, 4) == Some(content.len() - 1)
}

pub(crate) fn default_comrak_options() -> comrak::Options<'static> {
    let mut options = comrak::Options::default();
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    options
}

static RENDERER: Lazy<Arc<MessageRenderer>> = Lazy::new(|| Arc::new(MessageRenderer::new()));

/// Access the shared renderer instance, initialised on first use.
pub fn renderer() -> Arc<MessageRenderer> {
    Arc::clone(&RENDERER)
}

/// Render one message with the shared renderer.
pub fn render(text: &str, options: &RenderOptions) -> Result<RenderedMessage, RenderError> {
    RENDERER.render(text, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_ce_call_is_detected() {
        assert!(is_lone_ce_call("\\ce{H2O}"));
        assert!(is_lone_ce_call("\\ce{Ca(OH)2}"));
        assert!(!is_lone_ce_call("\\ce{H2O} + x"));
        assert!(!is_lone_ce_call("x^2"));
        assert!(!is_lone_ce_call("\\ce{}"));
    }
}
