//! In-memory WordprocessingML document model.
//!
//! The builder fills this model and the writer serializes it. It covers only
//! what manuscripts use: styled paragraphs, formatted runs, inline pictures,
//! grid tables, and page breaks.

pub use crate::util::MediaFormat;

/// English Metric Units per inch.
pub const EMU_PER_INCH: u64 = 914_400;
/// Twentieths of a point per centimetre, rounded.
pub const TWIPS_PER_CM: u32 = 567;

/// Point size of a heading at `level`, where level 1 is the title.
///
/// Sizes shrink by two points per level; from level 4 on headings use the
/// body size.
pub fn heading_size_pt(level: u8, body_size_pt: u32) -> u32 {
    if level < 4 {
        16 - 2 * u32::from(level.max(1))
    } else {
        body_size_pt
    }
}

/// A complete document body plus the media parts it references.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub body: Vec<Element>,
    pub media: Vec<Media>,
    /// Font and size applied through the document defaults and `Normal`.
    pub body_font: String,
    pub body_size_pt: u32,
}

/// A top-level body element.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Para(Para),
    Table(Table),
    PageBreak,
}

/// Paragraph styles defined in the generated `styles.xml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParaStyle {
    Title,
    /// `Heading2` through `Heading4`.
    Heading(u8),
    ListBullet,
    ListNumber,
}

impl ParaStyle {
    pub fn style_id(self) -> String {
        match self {
            ParaStyle::Title => "Title".to_string(),
            ParaStyle::Heading(level) => format!("Heading{level}"),
            ParaStyle::ListBullet => "ListBullet".to_string(),
            ParaStyle::ListNumber => "ListNumber".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Para {
    pub style: Option<ParaStyle>,
    pub centered: bool,
    /// Left indent in twips.
    pub indent_left: Option<u32>,
    pub outline_level: Option<u8>,
    pub runs: Vec<Run>,
}

impl Para {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: ParaStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    pub fn with_indent(mut self, twips: u32) -> Self {
        self.indent_left = Some(twips);
        self
    }

    pub fn with_outline_level(mut self, level: u8) -> Self {
        self.outline_level = Some(level);
        self
    }

    pub fn with_runs(mut self, runs: Vec<Run>) -> Self {
        self.runs = runs;
        self
    }

    /// Concatenated text of all text runs.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .filter_map(|run| match &run.content {
                RunContent::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Character formatting of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFormat {
    pub bold: bool,
    pub italic: bool,
    /// Applied to the ASCII, high-ANSI and East Asian font slots.
    pub font: Option<String>,
    pub size_pt: Option<u32>,
}

impl RunFormat {
    pub fn font(name: impl Into<String>, size_pt: u32) -> Self {
        Self {
            font: Some(name.into()),
            size_pt: Some(size_pt),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    Text(String),
    /// A line break inside the paragraph.
    Break,
    Picture(Picture),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub content: RunContent,
    pub format: RunFormat,
}

impl Run {
    pub fn text(text: impl Into<String>, format: RunFormat) -> Self {
        Self {
            content: RunContent::Text(text.into()),
            format,
        }
    }

    pub fn line_break() -> Self {
        Self {
            content: RunContent::Break,
            format: RunFormat::default(),
        }
    }
}

/// An inline picture referencing a media part by relationship id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub rel_id: String,
    /// Unique drawing object id within the document.
    pub id: u32,
    pub name: String,
    pub width_emu: u64,
    pub height_emu: u64,
}

/// A grid table. Every row has exactly `columns` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: usize,
    pub rows: Vec<Vec<Para>>,
}

/// An embedded binary part stored under `word/media/`.
#[derive(Debug, Clone)]
pub struct Media {
    pub rel_id: String,
    /// Part name relative to `word/`, e.g. `media/image1.png`.
    pub target: String,
    pub format: MediaFormat,
    pub data: Vec<u8>,
}

impl Document {
    pub fn new(body_font: impl Into<String>, body_size_pt: u32) -> Self {
        Self {
            body: Vec::new(),
            media: Vec::new(),
            body_font: body_font.into(),
            body_size_pt,
        }
    }

    pub fn push(&mut self, element: Element) {
        self.body.push(element);
    }

    pub fn push_para(&mut self, para: Para) {
        self.body.push(Element::Para(para));
    }

    /// Store an image part and return its relationship id.
    pub fn add_media(&mut self, format: MediaFormat, data: Vec<u8>) -> String {
        let index = self.media.len() + 1;
        let rel_id = format!("rIdImage{index}");
        self.media.push(Media {
            rel_id: rel_id.clone(),
            target: format!("media/image{index}.{}", format.extension()),
            format,
            data,
        });
        rel_id
    }

    /// Paragraphs at body level, skipping tables and page breaks.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Para> {
        self.body.iter().filter_map(|element| match element {
            Element::Para(para) => Some(para),
            _ => None,
        })
    }

    pub fn page_breaks(&self) -> usize {
        self.body
            .iter()
            .filter(|element| matches!(element, Element::PageBreak))
            .count()
    }
}
