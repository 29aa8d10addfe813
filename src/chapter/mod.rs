//! Chapter segmentation.
//!
//! A manuscript arrives as one flat stream of [`Paragraph`]s. [`segment`]
//! splits it into [`ChapterBlock`]s at front-matter and chapter headings, and
//! [`assign_files`] gives each block its output ordinal and file name.
//!
//! Ordinals are positional. Front matter is always `00`; every other distinct
//! title takes the next number in order of first appearance, whatever number
//! the heading itself carries. A manuscript whose first chapter heading reads
//! `Chapter 3` still produces `01-Chapter 03.md`.

mod labels;

pub use labels::{HeadingKind, Labels};

/// One paragraph of extracted document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    /// Outline level: 0 is a top-level heading, `None` is body text.
    pub outline_level: Option<u8>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, outline_level: Option<u8>) -> Self {
        Self {
            text: text.into(),
            outline_level,
        }
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Self::new(text, Some(level))
    }
}

/// Title of a chapter block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChapterTitle {
    FrontMatter,
    /// Chapter number as written in the heading; `7` and `007` are distinct.
    Chapter(String),
}

impl ChapterTitle {
    pub fn render(&self, labels: Labels) -> String {
        match self {
            ChapterTitle::FrontMatter => labels.front_matter().to_string(),
            ChapterTitle::Chapter(number) => labels.chapter(number),
        }
    }
}

/// A titled, ordered group of paragraphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterBlock {
    pub title: ChapterTitle,
    pub paragraphs: Vec<Paragraph>,
}

/// Incremental segmenter.
///
/// The current title plus the accumulator form the state; a block is
/// finalized when the next boundary heading arrives or on
/// [`finish`](Self::finish).
#[derive(Debug)]
pub struct Segmenter {
    title: ChapterTitle,
    current: Vec<Paragraph>,
    blocks: Vec<ChapterBlock>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter {
    pub fn new() -> Self {
        Self {
            title: ChapterTitle::FrontMatter,
            current: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, paragraph: Paragraph) {
        match HeadingKind::of(&paragraph.text) {
            HeadingKind::Compound if self.current.is_empty() => {
                log::debug!("discarding compound heading {:?}", paragraph.text);
            }
            HeadingKind::FrontMatter => self.start(ChapterTitle::FrontMatter, paragraph),
            HeadingKind::Chapter(number) if paragraph.outline_level == Some(0) => {
                self.start(ChapterTitle::Chapter(number), paragraph);
            }
            _ => self.current.push(paragraph),
        }
    }

    pub fn finish(mut self) -> Vec<ChapterBlock> {
        self.finalize();
        self.blocks
    }

    fn start(&mut self, title: ChapterTitle, heading: Paragraph) {
        self.finalize();
        self.title = title;
        self.current.push(heading);
    }

    fn finalize(&mut self) {
        if self.current.is_empty() {
            return;
        }
        self.blocks.push(ChapterBlock {
            title: self.title.clone(),
            paragraphs: std::mem::take(&mut self.current),
        });
    }
}

/// Split a paragraph stream into chapter blocks.
///
/// An empty stream yields no blocks; callers treat that as a failed
/// conversion.
pub fn segment(paragraphs: impl IntoIterator<Item = Paragraph>) -> Vec<ChapterBlock> {
    let mut segmenter = Segmenter::new();
    for paragraph in paragraphs {
        segmenter.push(paragraph);
    }
    segmenter.finish()
}

/// One output unit: an ordinal, a rendered title, and its paragraphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterFile {
    pub ordinal: u32,
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
}

impl ChapterFile {
    /// `NN-<title>.md`
    pub fn file_name(&self) -> String {
        format!("{:02}-{}.md", self.ordinal, self.title)
    }
}

/// Assign output ordinals by first appearance.
///
/// Blocks that share a title are merged into one file in stream order. The
/// result is sorted by ordinal.
pub fn assign_files(blocks: Vec<ChapterBlock>, labels: Labels) -> Vec<ChapterFile> {
    let mut order: Vec<(ChapterTitle, ChapterFile)> = Vec::new();
    let mut next_ordinal = 1;

    for block in blocks {
        if let Some((_, file)) = order.iter_mut().find(|(title, _)| *title == block.title) {
            log::debug!("merging repeated block {:?} into {}", block.title, file.file_name());
            file.paragraphs.extend(block.paragraphs);
            continue;
        }

        let ordinal = match block.title {
            ChapterTitle::FrontMatter => 0,
            ChapterTitle::Chapter(_) => {
                let ordinal = next_ordinal;
                next_ordinal += 1;
                ordinal
            }
        };
        let file = ChapterFile {
            ordinal,
            title: block.title.render(labels),
            paragraphs: block.paragraphs,
        };
        order.push((block.title, file));
    }

    let mut files: Vec<ChapterFile> = order.into_iter().map(|(_, file)| file).collect();
    files.sort_by_key(|file| file.ordinal);
    files
}

/// Flatten blocks back into the paragraph stream they were built from.
pub fn flatten(blocks: &[ChapterBlock]) -> Vec<Paragraph> {
    blocks
        .iter()
        .flat_map(|block| block.paragraphs.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(blocks: &[ChapterBlock]) -> Vec<ChapterTitle> {
        blocks.iter().map(|b| b.title.clone()).collect()
    }

    fn chapter(number: &str) -> ChapterTitle {
        ChapterTitle::Chapter(number.to_string())
    }

    #[test]
    fn test_front_matter_only() {
        let blocks = segment([Paragraph::heading("前言", 0), Paragraph::body("text")]);
        assert_eq!(titles(&blocks), vec![ChapterTitle::FrontMatter]);
        assert_eq!(blocks[0].paragraphs.len(), 2);
    }

    #[test]
    fn test_compound_heading_discarded_at_start() {
        let blocks = segment([
            Paragraph::heading("前言+第1章+第2章", 0),
            Paragraph::heading("前言", 0),
            Paragraph::body("preface text"),
        ]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].title, ChapterTitle::FrontMatter);
        assert_eq!(blocks[0].paragraphs[0].text, "前言");
    }

    #[test]
    fn test_compound_heading_kept_once_content_started() {
        let blocks = segment([
            Paragraph::body("intro"),
            Paragraph::heading("前言+第1章", 0),
        ]);
        assert_eq!(blocks[0].paragraphs.len(), 2);
    }

    #[test]
    fn test_chapter_requires_outline_level_zero() {
        let blocks = segment([
            Paragraph::heading("前言", 0),
            Paragraph::body("Chapter 2 discusses agents"),
            Paragraph::heading("Chapter 2 Agents", 1),
            Paragraph::heading("Chapter 1 Basics", 0),
            Paragraph::body("body"),
        ]);
        assert_eq!(
            titles(&blocks),
            vec![ChapterTitle::FrontMatter, chapter("1")]
        );
        assert_eq!(blocks[0].paragraphs.len(), 3);
        assert_eq!(blocks[1].paragraphs[0].text, "Chapter 1 Basics");
    }

    #[test]
    fn test_content_before_any_heading_is_front_matter() {
        let blocks = segment([
            Paragraph::body("untitled opening"),
            Paragraph::heading("第1章 开始", 0),
        ]);
        assert_eq!(titles(&blocks), vec![ChapterTitle::FrontMatter, chapter("1")]);
    }

    #[test]
    fn test_empty_stream_yields_no_blocks() {
        assert!(segment(Vec::new()).is_empty());
    }

    #[test]
    fn test_ordinals_follow_appearance_not_heading_number() {
        let blocks = segment([
            Paragraph::heading("front matter", 0),
            Paragraph::heading("Chapter 3 Overview", 0),
            Paragraph::heading("Chapter 7 Later", 0),
        ]);
        let files = assign_files(blocks, Labels::English);
        let names: Vec<_> = files.iter().map(ChapterFile::file_name).collect();
        assert_eq!(
            names,
            vec![
                "00-front matter.md",
                "01-Chapter 03.md",
                "02-Chapter 07.md"
            ]
        );
    }

    #[test]
    fn test_chapter_without_front_matter_starts_at_one() {
        let files = assign_files(
            segment([Paragraph::heading("第2章", 0)]),
            Labels::Chinese,
        );
        assert_eq!(files[0].file_name(), "01-第02章.md");
    }

    #[test]
    fn test_chapter_digits_kept_as_written() {
        let blocks = segment([
            Paragraph::heading("第7章", 0),
            Paragraph::heading("第007章", 0),
            Paragraph::heading("Chapter 123456789012345678901", 0),
        ]);
        assert_eq!(
            titles(&blocks),
            vec![chapter("7"), chapter("007"), chapter("123456789012345678901")]
        );

        let files = assign_files(blocks, Labels::Chinese);
        let names: Vec<_> = files.iter().map(ChapterFile::file_name).collect();
        assert_eq!(
            names,
            vec!["01-第07章.md", "02-第007章.md", "03-第123456789012345678901章.md"]
        );
    }

    #[test]
    fn test_repeated_titles_merge() {
        let blocks = segment([
            Paragraph::heading("前言", 0),
            Paragraph::body("a"),
            Paragraph::heading("第1章", 0),
            Paragraph::heading("前言", 0),
            Paragraph::body("b"),
        ]);
        assert_eq!(blocks.len(), 3);
        let files = assign_files(blocks, Labels::Chinese);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].ordinal, 0);
        assert_eq!(files[0].paragraphs.len(), 4);
        assert_eq!(files[1].title, "第01章");
    }

    #[test]
    fn test_segment_is_idempotent_on_flattened_output() {
        let blocks = segment([
            Paragraph::heading("前言+第1章+第2章", 0),
            Paragraph::heading("前言", 0),
            Paragraph::body("p"),
            Paragraph::heading("第1章 起点", 0),
            Paragraph::heading("第2章 终点", 0),
            Paragraph::body("q"),
        ]);
        assert_eq!(segment(flatten(&blocks)), blocks);
    }
}
