use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;

/// Selects the style variant applied when serialising the document tree.
/// Structure is identical for both schemes; only CSS classes differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    User,
    #[default]
    Assistant,
}

/// How chemistry formulas are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChemistryDetection {
    /// Recognise bare `\ce{…}` calls and retag math spans whose entire
    /// content is a single `\ce{…}` call.
    #[default]
    Sniff,
    /// Treat `\ce{…}` as ordinary math. KaTeX without mhchem will reject it,
    /// so such spans degrade to the error element.
    Disabled,
}

/// Per-call rendering options. There is no ambient state: debug mode and
/// chemistry detection travel with the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderOptions {
    pub color_scheme: ColorScheme,
    #[serde(default)]
    pub debug_mode: bool,
    #[serde(default)]
    pub chemistry: ChemistryDetection,
}

impl RenderOptions {
    pub fn new(color_scheme: ColorScheme) -> Self {
        Self {
            color_scheme,
            ..Self::default()
        }
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_chemistry(mut self, chemistry: ChemistryDetection) -> Self {
        self.chemistry = chemistry;
        self
    }
}

/// Non-fatal conditions observed while rendering. These never abort the
/// pipeline; callers may surface them in a debug overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A placeholder survived substitution but never surfaced in the parsed
    /// tree, so its literal token remains visible as text.
    RestorationMiss { placeholder_id: usize, token: String },
    /// KaTeX rejected a formula; the raw source is shown in an error element.
    MathError { source: String, message: String },
}

/// Deterministic result of rendering one chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMessage {
    /// The final document tree, math already rendered in place.
    pub document: Document,
    /// Whether any math span (including chemistry) was resolved.
    pub contains_math: bool,
    /// Whether any resolved span was chemistry notation.
    pub contains_chemistry: bool,
    /// Whether the message contains fenced code blocks.
    pub contains_code: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Pipeline-internal failures. Recoverable conditions (unterminated
/// delimiters, KaTeX rejections, restoration misses) never surface here;
/// they degrade locally per the error taxonomy.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("syntax highlighting failed: {language}: {message}")]
    Highlighting { language: String, message: String },
}
