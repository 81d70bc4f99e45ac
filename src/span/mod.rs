//! Span identification: delimiter matching, overlap resolution, and the
//! inline-to-display classification heuristic.

pub mod classify;
pub mod matcher;
pub mod resolve;

pub use classify::should_force_block;
pub use matcher::{DelimiterFamily, MatchSpan, SpanKind, find_spans};
pub use resolve::{ResolvedSpan, resolve_spans};
