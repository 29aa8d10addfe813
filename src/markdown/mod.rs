//! Markdown reading and writing.
//!
//! The reading side is a line-oriented pipeline:
//!
//! - [`classify`]: one raw line -> one [`Token`], with a small carried
//!   [`LineState`]
//! - [`blocks`]: tokens -> [`Block`]s, aggregating tables and code blocks
//! - [`inline`]: block text -> non-nested formatted [`Span`]s
//!
//! The writing side turns extracted document paragraphs back into Markdown
//! ([`paragraphs_to_markdown`]) and splits pandoc output on bold chapter
//! labels ([`split_pandoc_markdown`]).
//!
//! This is deliberately not a CommonMark parser. Each line is classified on its
//! own, lists do not nest, and nothing nests inside a list item, which is what
//! the manuscript format uses.

mod blocks;
mod classify;
mod inline;
mod pandoc;
mod serialize;

pub use blocks::{Block, BlockAssembler, Table, assemble, parse};
pub use classify::{LineState, Token, classify, tokenize};
pub use inline::{Span, SpanFormat, split_spans};
pub use pandoc::{label_paragraphs, normalize_headings, split_pandoc_markdown};
pub use serialize::paragraphs_to_markdown;
