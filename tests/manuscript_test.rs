//! End-to-end manuscript conversion tests.
//!
//! Source documents are generated with the crate's own writer so the tests
//! need no binary fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use folio::docx::DocxBuilder;
use folio::{
    DocxConfig, Error, Labels, SplitConfig, discover_chapters, export_docx, read_paragraphs,
    split_docx, split_markdown, write_docx,
};
use tempfile::TempDir;

fn write_manuscript(path: &Path, chapters: &[&str]) {
    let mut builder = DocxBuilder::new();
    for chapter in chapters {
        builder.add_markdown(chapter, Path::new("/nonexistent"));
    }
    write_docx(&builder.finish(), path).unwrap();
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

const CHINESE_MANUSCRIPT: &[&str] = &[
    "# 前言\n\n写在前面的话。",
    "# 第1章 起点\n\n## 1.1 背景\n\n第一章正文。",
    "# 第2章 方法\n\n第二章正文。",
];

// ============================================================================
// split
// ============================================================================

#[test]
fn test_split_docx_writes_chapter_files() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("book.docx");
    write_manuscript(&input, CHINESE_MANUSCRIPT);

    let out = dir.path().join("manuscript");
    let config = SplitConfig::default().with_labels(Labels::Chinese);
    let written = split_docx(&input, &out, &config).unwrap();

    assert_eq!(
        file_names(&written),
        vec!["00-前言.md", "01-第01章.md", "02-第02章.md"]
    );

    let front = fs::read_to_string(out.join("00-前言.md")).unwrap();
    assert!(front.starts_with("# 前言\n"));
    assert!(front.contains("\n写在前面的话。"));

    let first = fs::read_to_string(out.join("01-第01章.md")).unwrap();
    assert!(first.starts_with("# 第1章 起点\n"));
    assert!(first.contains("\n## 1.1 背景\n"));
    assert!(first.contains("\n第一章正文。"));
    assert!(!first.contains("第二章"));
}

#[test]
fn test_split_docx_english_labels_are_positional() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("book.docx");
    write_manuscript(
        &input,
        &["# Chapter 3 Overview\n\ntext", "# Chapter 7 Details\n\nmore"],
    );

    let out = dir.path().join("out");
    let written = split_docx(&input, &out, &SplitConfig::default()).unwrap();
    assert_eq!(
        file_names(&written),
        vec!["01-Chapter 03.md", "02-Chapter 07.md"]
    );
}

#[test]
fn test_split_docx_discards_leading_compound_heading() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("book.docx");
    write_manuscript(&input, &["# 前言+第1章+第2章\n# 前言\n\n序", "# 第1章 开始\n\n正文"]);

    let out = dir.path().join("out");
    let config = SplitConfig::default().with_labels(Labels::Chinese);
    let written = split_docx(&input, &out, &config).unwrap();
    assert_eq!(file_names(&written), vec!["00-前言.md", "01-第01章.md"]);

    let front = fs::read_to_string(&written[0]).unwrap();
    assert!(!front.contains('+'));
}

#[test]
fn test_split_missing_input_is_not_found() {
    let dir = TempDir::new().unwrap();
    let result = split_docx(
        dir.path().join("missing.docx"),
        dir.path().join("out"),
        &SplitConfig::default(),
    );
    assert!(matches!(result, Err(Error::NotFound(_))));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_split_empty_document_has_no_chapters() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("empty.docx");
    write_manuscript(&input, &[]);

    let result = split_docx(&input, dir.path().join("out"), &SplitConfig::default());
    assert!(matches!(result, Err(Error::NoChapters(_))));
}

// ============================================================================
// export
// ============================================================================

#[test]
fn test_export_discovered_chapters() {
    let dir = TempDir::new().unwrap();
    let chapters = dir.path().join("manuscript");
    fs::create_dir(&chapters).unwrap();
    fs::write(chapters.join("01-第01章.md"), "# 第1章 起点\n\n正文").unwrap();
    fs::write(chapters.join("00-前言.md"), "# 前言\n\n序").unwrap();
    fs::write(chapters.join("notes.md"), "# not a chapter").unwrap();

    let files = discover_chapters(&chapters).unwrap();
    assert_eq!(file_names(&files), vec!["00-前言.md", "01-第01章.md"]);

    let output = dir.path().join("book.docx");
    let report = export_docx(&files, &output, &DocxConfig::default()).unwrap();
    assert_eq!(report.chapters, files);
    assert!(report.skipped.is_empty());

    let headings: Vec<_> = read_paragraphs(&output)
        .unwrap()
        .into_iter()
        .filter(|p| p.outline_level == Some(0))
        .map(|p| p.text)
        .collect();
    assert_eq!(headings, vec!["前言", "第1章 起点"]);
}

#[test]
fn test_export_skips_missing_files() {
    let dir = TempDir::new().unwrap();
    let present = dir.path().join("01-one.md");
    fs::write(&present, "# One\n\n![cap](nowhere.png)").unwrap();
    let missing = dir.path().join("02-two.md");

    let output = dir.path().join("book.docx");
    let report = export_docx(&[&present, &missing], &output, &DocxConfig::default()).unwrap();

    assert_eq!(report.chapters, vec![present]);
    assert_eq!(report.skipped, vec![missing]);
    assert_eq!(report.unresolved_images, vec!["nowhere.png".to_string()]);
    assert!(output.is_file());
}

#[test]
fn test_export_nothing_rendered_is_an_error() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("book.docx");
    let result = export_docx(&[dir.path().join("missing.md")], &output, &DocxConfig::default());

    assert!(matches!(result, Err(Error::NoChapters(_))));
    assert!(!output.exists());
}

#[test]
fn test_export_decodes_bom_and_windows_1252() {
    let dir = TempDir::new().unwrap();
    let bom = dir.path().join("01-bom.md");
    fs::write(&bom, b"\xEF\xBB\xBF# Heading").unwrap();
    let legacy = dir.path().join("02-legacy.md");
    fs::write(&legacy, b"# Caf\xE9").unwrap();

    let output = dir.path().join("book.docx");
    export_docx(&[&bom, &legacy], &output, &DocxConfig::default()).unwrap();

    let headings: Vec<_> = read_paragraphs(&output)
        .unwrap()
        .into_iter()
        .filter(|p| p.outline_level.is_some())
        .map(|p| p.text)
        .collect();
    assert_eq!(headings, vec!["Heading", "Café"]);
}

#[test]
fn test_split_then_export_preserves_headings() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("book.docx");
    write_manuscript(&input, CHINESE_MANUSCRIPT);

    let out = dir.path().join("manuscript");
    let config = SplitConfig::default().with_labels(Labels::Chinese);
    split_docx(&input, &out, &config).unwrap();

    let rebuilt = dir.path().join("rebuilt.docx");
    let files = discover_chapters(&out).unwrap();
    export_docx(&files, &rebuilt, &DocxConfig::default()).unwrap();

    let headings = |path: &Path| -> Vec<(String, Option<u8>)> {
        read_paragraphs(path)
            .unwrap()
            .into_iter()
            .filter(|p| p.outline_level.is_some())
            .map(|p| (p.text, p.outline_level))
            .collect()
    };
    assert_eq!(headings(&input), headings(&rebuilt));
}

// ============================================================================
// split-md
// ============================================================================

#[test]
fn test_split_markdown_on_bold_labels() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("pandoc.md");
    fs::write(
        &input,
        "**前言**\n\n序言\n\n**第1章 起点**\n\n**1.1 小节**\n\n内容\n",
    )
    .unwrap();

    let out = dir.path().join("out");
    let config = SplitConfig::default().with_labels(Labels::Chinese);
    let written = split_markdown(&input, &out, &config).unwrap();
    assert_eq!(file_names(&written), vec!["00-前言.md", "01-第01章.md"]);

    let chapter = fs::read_to_string(out.join("01-第01章.md")).unwrap();
    assert_eq!(chapter, "# 第1章 起点\n\n## 1.1 小节\n\n内容");
}

#[test]
fn test_split_markdown_missing_input() {
    let dir = TempDir::new().unwrap();
    let result = split_markdown(
        dir.path().join("missing.md"),
        dir.path().join("out"),
        &SplitConfig::default(),
    );
    assert!(matches!(result, Err(Error::NotFound(_))));
}
