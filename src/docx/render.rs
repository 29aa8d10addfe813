//! Markdown blocks -> document model.

use std::fs;
use std::path::{Path, PathBuf};

use crate::markdown::{Block, SpanFormat, Table as MdTable, parse, split_spans};
use crate::util::{detect_media_format, extract_image_dimensions};

use super::model::{
    Document, EMU_PER_INCH, Element, Para, ParaStyle, Picture, Run, RunContent, RunFormat,
    TWIPS_PER_CM, Table, heading_size_pt,
};

const CODE_FONT: &str = "Consolas";
const INLINE_CODE_SIZE_PT: u32 = 10;
const CODE_BLOCK_SIZE_PT: u32 = 9;
const CAPTION_SIZE_PT: u32 = 9;
const RULE: &str = "──────────────────────────────────────────────────";
/// Deepest heading style; source levels past it share this style.
const DEEPEST_HEADING: u8 = 4;

/// Configuration for DOCX rendering.
#[derive(Debug, Clone)]
pub struct DocxConfig {
    /// Searched first for images, by file name only.
    pub images_dir: Option<PathBuf>,
    pub body_font: String,
    pub body_size_pt: u32,
    pub image_width_inches: f64,
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            images_dir: None,
            body_font: "Microsoft YaHei".to_string(),
            body_size_pt: 11,
            image_width_inches: 5.5,
        }
    }
}

impl DocxConfig {
    pub fn with_images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images_dir = Some(dir.into());
        self
    }

    pub fn with_body_font(mut self, font: impl Into<String>) -> Self {
        self.body_font = font.into();
        self
    }
}

/// Accumulates chapters into one [`Document`].
///
/// Chapters added after the first are preceded by a page break, so the
/// finished document never ends with one.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use folio::DocxBuilder;
///
/// let mut builder = DocxBuilder::new();
/// builder.add_markdown("# One\n\nText", Path::new("."));
/// builder.add_markdown("# Two", Path::new("."));
/// let document = builder.finish();
/// assert_eq!(document.page_breaks(), 1);
/// ```
pub struct DocxBuilder {
    config: DocxConfig,
    document: Document,
    chapters: usize,
    unresolved_images: Vec<String>,
}

impl Default for DocxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::with_config(DocxConfig::default())
    }

    pub fn with_config(config: DocxConfig) -> Self {
        let document = Document::new(config.body_font.clone(), config.body_size_pt);
        Self {
            config,
            document,
            chapters: 0,
            unresolved_images: Vec::new(),
        }
    }

    /// Parse and render one chapter of Markdown.
    ///
    /// `source_dir` is the directory of the Markdown file, used as the
    /// fallback base for relative image paths.
    pub fn add_markdown(&mut self, markdown: &str, source_dir: &Path) {
        let blocks = parse(markdown);
        self.add_chapter(&blocks, source_dir);
    }

    pub fn add_chapter(&mut self, blocks: &[Block], source_dir: &Path) {
        if self.chapters > 0 {
            self.document.push(Element::PageBreak);
        }
        self.chapters += 1;
        log::debug!("rendering chapter {} ({} blocks)", self.chapters, blocks.len());

        for block in blocks {
            self.render_block(block, source_dir);
        }
    }

    /// Image references that fell back to a placeholder, in order.
    pub fn unresolved_images(&self) -> &[String] {
        &self.unresolved_images
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters
    }

    pub fn finish(self) -> Document {
        self.document
    }

    fn body_format(&self) -> RunFormat {
        RunFormat::font(&self.config.body_font, self.config.body_size_pt)
    }

    fn render_block(&mut self, block: &Block, source_dir: &Path) {
        match block {
            Block::Heading { level, text } => self.render_heading(*level, text),
            Block::Image { alt, path } => self.render_image(alt, path, source_dir),
            Block::Table(table) => self.render_table(table),
            Block::CodeBlock { lines } => self.render_code(lines),
            Block::Bullet(text) => {
                let para = Para::new()
                    .with_style(ParaStyle::ListBullet)
                    .with_runs(self.inline_runs(text));
                self.document.push_para(para);
            }
            Block::Numbered(text) => {
                let para = Para::new()
                    .with_style(ParaStyle::ListNumber)
                    .with_runs(self.inline_runs(text));
                self.document.push_para(para);
            }
            Block::Quote(text) => {
                let mut runs = self.inline_runs(text);
                for run in &mut runs {
                    run.format.italic = true;
                }
                let para = Para::new().with_indent(TWIPS_PER_CM).with_runs(runs);
                self.document.push_para(para);
            }
            Block::Rule => {
                let para = Para::new()
                    .centered()
                    .with_runs(vec![Run::text(RULE, self.body_format())]);
                self.document.push_para(para);
            }
            Block::Blank => self.document.push_para(Para::new()),
            Block::Paragraph(text) => {
                let para = Para::new().with_runs(self.inline_runs(text));
                self.document.push_para(para);
            }
        }
    }

    /// Level 1 is the document title; 2 and deeper map to heading styles,
    /// clamped at the deepest one. Outline levels count from the title.
    fn render_heading(&mut self, level: u8, text: &str) {
        let (style, outline) = match level {
            0 | 1 => (ParaStyle::Title, 0),
            _ => {
                let clamped = level.min(DEEPEST_HEADING);
                (ParaStyle::Heading(clamped), clamped - 1)
            }
        };
        let size_pt = heading_size_pt(level, self.config.body_size_pt);
        let run = Run::text(text, RunFormat::font(&self.config.body_font, size_pt));
        let para = Para::new()
            .with_style(style)
            .with_outline_level(outline)
            .with_runs(vec![run]);
        self.document.push_para(para);
    }

    fn render_image(&mut self, alt: &str, path: &str, source_dir: &Path) {
        let loaded = resolve_image(path, self.config.images_dir.as_deref(), source_dir)
            .and_then(|found| match fs::read(&found) {
                Ok(data) => Some((found, data)),
                Err(e) => {
                    log::warn!("cannot read image {}: {e}", found.display());
                    None
                }
            });

        let Some((found, data)) = loaded else {
            log::warn!("image not found: {path}");
            self.unresolved_images.push(path.to_string());
            let placeholder = Run::text(format!("[image: {path}]"), self.body_format());
            self.document
                .push_para(Para::new().centered().with_runs(vec![placeholder]));
            return;
        };

        let width_emu = (self.config.image_width_inches * EMU_PER_INCH as f64) as u64;
        let height_emu = match extract_image_dimensions(&data) {
            Some((w, h)) if w > 0 => width_emu * u64::from(h) / u64::from(w),
            _ => width_emu * 3 / 4,
        };
        let format = detect_media_format(&found.to_string_lossy(), &data);
        let rel_id = self.document.add_media(format, data);
        let id = self.document.media.len() as u32;
        let picture = Picture {
            rel_id,
            id,
            name: format!("Picture {id}"),
            width_emu,
            height_emu,
        };
        log::debug!("embedded image {} as picture {id}", found.display());

        let run = Run {
            content: RunContent::Picture(picture),
            format: RunFormat::default(),
        };
        self.document
            .push_para(Para::new().centered().with_runs(vec![run]));

        if !alt.is_empty() {
            let caption = Run::text(
                alt,
                RunFormat::font(&self.config.body_font, CAPTION_SIZE_PT).italic(),
            );
            self.document
                .push_para(Para::new().centered().with_runs(vec![caption]));
        }
    }

    fn render_table(&mut self, table: &MdTable) {
        let rows: Vec<Vec<Para>> = table
            .rows()
            .map(|row| {
                row.into_iter()
                    .map(|cell| Para::new().with_runs(self.inline_runs(cell)))
                    .collect::<Vec<_>>()
            })
            .collect();
        self.document.push(Element::Table(Table {
            columns: table.columns(),
            rows,
        }));
        self.document.push_para(Para::new());
    }

    fn render_code(&mut self, lines: &[String]) {
        let format = RunFormat::font(CODE_FONT, CODE_BLOCK_SIZE_PT);
        let mut runs = Vec::with_capacity(lines.len() * 2);
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                runs.push(Run::line_break());
            }
            runs.push(Run::text(line.as_str(), format.clone()));
        }
        self.document
            .push_para(Para::new().with_indent(TWIPS_PER_CM).with_runs(runs));
    }

    /// Runs for a line of text with inline emphasis resolved.
    fn inline_runs(&self, text: &str) -> Vec<Run> {
        let base = self.body_format();
        split_spans(text)
            .into_iter()
            .map(|span| {
                let format = match span.format {
                    SpanFormat::Plain => base.clone(),
                    SpanFormat::Bold => base.clone().bold(),
                    SpanFormat::Italic | SpanFormat::Math => base.clone().italic(),
                    SpanFormat::Code => RunFormat::font(CODE_FONT, INLINE_CODE_SIZE_PT),
                };
                Run::text(span.text, format)
            })
            .collect()
    }
}

/// Find an image: `<images_dir>/<file name>` first, then `<source_dir>/<path>`.
pub fn resolve_image(path: &str, images_dir: Option<&Path>, source_dir: &Path) -> Option<PathBuf> {
    let relative = Path::new(path);

    if let (Some(dir), Some(name)) = (images_dir, relative.file_name()) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    let candidate = source_dir.join(relative);
    candidate.is_file().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> Document {
        let mut builder = DocxBuilder::new();
        builder.add_markdown(markdown, Path::new("/nonexistent"));
        builder.finish()
    }

    fn first_para(document: &Document) -> &Para {
        document.paragraphs().next().expect("a paragraph")
    }

    #[test]
    fn test_heading_styles_and_outline_levels() {
        let document = render("# Book\n## Part\n### Section\n#### Deep\n###### Deeper");
        let styled: Vec<_> = document
            .paragraphs()
            .map(|p| (p.style, p.outline_level))
            .collect();
        assert_eq!(
            styled,
            vec![
                (Some(ParaStyle::Title), Some(0)),
                (Some(ParaStyle::Heading(2)), Some(1)),
                (Some(ParaStyle::Heading(3)), Some(2)),
                (Some(ParaStyle::Heading(4)), Some(3)),
                (Some(ParaStyle::Heading(4)), Some(3)),
            ]
        );
    }

    #[test]
    fn test_inline_formatting_runs() {
        let document = render("plain **bold** *it* `code`");
        let runs = &first_para(&document).runs;
        assert_eq!(runs.len(), 6);
        assert!(runs[1].format.bold);
        assert!(runs[3].format.italic);
        assert_eq!(runs[5].format.font.as_deref(), Some(CODE_FONT));
    }

    #[test]
    fn test_missing_image_renders_placeholder() {
        let mut builder = DocxBuilder::new();
        builder.add_markdown("![cap](fig.png)", Path::new("/nonexistent"));
        assert_eq!(builder.unresolved_images(), ["fig.png"]);

        let document = builder.finish();
        assert!(document.media.is_empty());
        assert_eq!(first_para(&document).text(), "[image: fig.png]");
        assert!(first_para(&document).centered);
    }

    #[test]
    fn test_table_dimensions() {
        let document = render("| a | b |\n|---|---|\n| 1 | 2 | 3 |\n| x |");
        let Some(Element::Table(table)) = document.body.first() else {
            panic!("expected a table first");
        };
        assert_eq!(table.columns, 2);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows.iter().all(|row| row.len() == 2));
        assert_eq!(table.rows[2][1].text(), "");
    }

    #[test]
    fn test_code_block_single_paragraph_with_breaks() {
        let document = render("```\nfn main() {\n    **not bold**\n}\n```");
        let para = first_para(&document);
        assert_eq!(para.indent_left, Some(TWIPS_PER_CM));
        let breaks = para
            .runs
            .iter()
            .filter(|r| r.content == RunContent::Break)
            .count();
        assert_eq!(breaks, 2);
        assert_eq!(para.text(), "fn main() {    **not bold**}");
        assert!(para.runs.iter().all(|r| !r.format.bold));
    }

    #[test]
    fn test_quote_is_indented_and_italic() {
        let document = render("> quoted **text**");
        let para = first_para(&document);
        assert_eq!(para.indent_left, Some(TWIPS_PER_CM));
        assert!(para.runs.iter().all(|r| r.format.italic));
        assert!(para.runs[1].format.bold);
    }

    #[test]
    fn test_lists_use_list_styles() {
        let document = render("- one\n1. two");
        let styles: Vec<_> = document.paragraphs().map(|p| p.style).collect();
        assert_eq!(
            styles,
            vec![Some(ParaStyle::ListBullet), Some(ParaStyle::ListNumber)]
        );
    }

    #[test]
    fn test_page_breaks_only_between_chapters() {
        let mut builder = DocxBuilder::new();
        for chapter in ["# A", "# B", "# C"] {
            builder.add_markdown(chapter, Path::new("."));
        }
        let document = builder.finish();
        assert_eq!(document.page_breaks(), 2);
        assert!(!matches!(document.body.last(), Some(Element::PageBreak)));
    }
}
