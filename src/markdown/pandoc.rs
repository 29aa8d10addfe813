//! Splitting a single pandoc-converted manuscript.
//!
//! Pandoc renders the manuscript's chapter titles as lines that are entirely
//! bold (`**第1章 概述**`). Those lines are treated as top-level headings, the
//! stream is segmented like a DOCX paragraph stream, and each chunk is written
//! back with its first label as `#` and the remaining labels as `##`.
//!
//! Pandoc keeps the document's combined title (`**前言+第1章+第2章**`) as a
//! label line too; those are dropped wherever they occur.

use crate::chapter::{ChapterFile, HeadingKind, Labels, Paragraph, assign_files, segment};

/// Inner text of a line that is entirely `**...**`.
fn bold_label(line: &str) -> Option<&str> {
    let inner = line.trim_end().strip_prefix("**")?.strip_suffix("**")?;
    let inner = inner.trim();
    (!inner.is_empty()).then_some(inner)
}

/// Turn pandoc Markdown into a paragraph stream, one entry per line.
///
/// Compound label lines produce no entry.
pub fn label_paragraphs(markdown: &str) -> Vec<Paragraph> {
    markdown
        .lines()
        .filter_map(|line| match bold_label(line) {
            Some(label) if HeadingKind::of(label) == HeadingKind::Compound => {
                log::debug!("dropping compound label {label:?}");
                None
            }
            Some(label) => Some(Paragraph::heading(label, 0)),
            None => Some(Paragraph::body(line)),
        })
        .collect()
}

/// Serialize one chunk: first label `#`, later labels `##`, body verbatim.
pub fn normalize_headings(paragraphs: &[Paragraph]) -> String {
    let mut seen_title = false;
    let lines: Vec<String> = paragraphs
        .iter()
        .map(|paragraph| match paragraph.outline_level {
            Some(_) if !seen_title => {
                seen_title = true;
                format!("# {}", paragraph.text)
            }
            Some(_) => format!("## {}", paragraph.text),
            None => paragraph.text.clone(),
        })
        .collect();
    lines.join("\n")
}

/// Split pandoc Markdown into chapter files with normalized headings.
///
/// Returns each file together with its rendered Markdown.
pub fn split_pandoc_markdown(markdown: &str, labels: Labels) -> Vec<(ChapterFile, String)> {
    let blocks = segment(label_paragraphs(markdown));
    assign_files(blocks, labels)
        .into_iter()
        .map(|file| {
            let content = normalize_headings(&file.paragraphs);
            (file, content)
        })
        .collect()
}
