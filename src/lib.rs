//! # folio
//!
//! Manuscript conversion between a DOCX document, Markdown, and a directory of
//! per-chapter Markdown files.
//!
//! ## Features
//!
//! - Split a `.docx` manuscript into `NN-<title>.md` chapter files
//! - Assemble chapter files back into one `.docx` with page breaks and images
//! - Split a single pandoc-produced Markdown file on bold chapter labels
//!
//! ## Quick Start
//!
//! ```no_run
//! use folio::{DocxConfig, SplitConfig, discover_chapters, export_docx, split_docx};
//!
//! // DOCX -> chapter files
//! let written = split_docx("book.docx", "manuscript", &SplitConfig::default())?;
//! println!("{} chapters", written.len());
//!
//! // chapter files -> DOCX
//! let files = discover_chapters("manuscript")?;
//! let config = DocxConfig::default().with_images_dir("manuscript/images");
//! export_docx(&files, "book-out.docx", &config)?;
//! # Ok::<(), folio::Error>(())
//! ```
//!
//! ## Working with the pieces
//!
//! Each stage is usable on its own:
//!
//! ```
//! use folio::markdown::{Block, parse};
//!
//! let blocks = parse("## Chapter Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
//! assert!(matches!(blocks[0], Block::Heading { level: 2, .. }));
//! ```

pub mod chapter;
pub mod docx;
mod error;
pub mod manuscript;
pub mod markdown;
pub(crate) mod util;

pub use chapter::{
    ChapterBlock, ChapterFile, ChapterTitle, Labels, Paragraph, assign_files, segment,
};
pub use docx::{DocxBuilder, DocxConfig, read_paragraphs, write_docx};
pub use error::{Error, Result};
pub use manuscript::{
    ExportReport, SplitConfig, discover_chapters, export_docx, split_docx, split_markdown,
};
