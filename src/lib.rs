//! gesso — a rendering pipeline for AI-tutoring chat messages.
//!
//! One call turns a raw message string (Markdown freely mixed with LaTeX
//! math and chemistry notation) into a structured [`Document`] tree:
//! math/chemistry spans are located with an explicit delimiter state
//! machine, protected from the Markdown parser behind opaque placeholders,
//! rendered with KaTeX (or a lightweight chemistry substitution renderer),
//! and spliced back into the parsed tree. Broken formulas degrade to a
//! visible error element carrying their raw source; the rest of the
//! document always renders.
//!
//! The pipeline is pure: no ambient flags, no cross-call state. Options
//! (color scheme, debug mode, chemistry detection) travel with each call.
//!
//! ```no_run
//! use gesso::{ColorScheme, RenderOptions, StyleMap, render};
//!
//! let options = RenderOptions::new(ColorScheme::Assistant);
//! let message = render("The area is $\\pi r^2$.", &options)?;
//! let html = message.document.to_html(StyleMap::for_scheme(options.color_scheme));
//! # Ok::<(), gesso::RenderError>(())
//! ```

mod chemistry;
pub mod document;
mod highlight;
mod markdown;
pub mod math;
mod normalize;
mod placeholder;
mod service;
pub mod span;
mod style;
mod types;

pub use document::{Block, Document, Inline, MathKind, MathNode, TableAlignment};
pub use math::{RenderResult, is_valid_latex};
pub use service::{MessageRenderer, RenderPipeline, render, renderer};
pub use span::{
    DelimiterFamily, MatchSpan, ResolvedSpan, SpanKind, find_spans, resolve_spans,
    should_force_block,
};
pub use style::StyleMap;
pub use types::{
    ChemistryDetection, ColorScheme, Diagnostic, RenderError, RenderOptions, RenderedMessage,
};
