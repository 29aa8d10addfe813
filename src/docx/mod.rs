//! DOCX reading and writing.
//!
//! Reading extracts the flat paragraph stream a chapter splitter needs: text
//! and outline level per body paragraph. Writing goes through an explicit
//! [`model::Document`] built from Markdown blocks by [`DocxBuilder`] and
//! serialized by [`write_docx`].

pub mod model;
mod reader;
mod render;
mod writer;

pub use reader::{
    StyleOutlines, parse_document, parse_style_outlines, read_paragraphs,
    read_paragraphs_from_reader,
};
pub use render::{DocxBuilder, DocxConfig, resolve_image};
pub use writer::{write_docx, write_docx_to_writer};
