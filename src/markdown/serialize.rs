//! Paragraph stream -> Markdown text.

use crate::chapter::Paragraph;

/// Heading prefix for an outline level. Levels past 2 share `####`.
fn heading_prefix(level: u8) -> &'static str {
    match level {
        0 => "# ",
        1 => "## ",
        2 => "### ",
        _ => "#### ",
    }
}

/// Render paragraphs as Markdown, one blank line between entries.
///
/// Empty paragraphs become empty lines so vertical spacing in the source
/// document survives.
pub fn paragraphs_to_markdown(paragraphs: &[Paragraph]) -> String {
    let lines: Vec<String> = paragraphs
        .iter()
        .map(|paragraph| {
            if paragraph.text.is_empty() {
                return String::new();
            }
            match paragraph.outline_level {
                Some(level) => format!("{}{}", heading_prefix(level), paragraph.text),
                None => paragraph.text.clone(),
            }
        })
        .collect();
    lines.join("\n\n")
}
