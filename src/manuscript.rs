//! End-to-end manuscript conversions.
//!
//! These tie the readers, the segmenter and the writers to the file system:
//! one `.docx` to a directory of chapter files, a directory of chapter files
//! back to one `.docx`, and a pandoc Markdown file to chapter files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::chapter::{Labels, assign_files, segment};
use crate::docx::{DocxBuilder, DocxConfig, read_paragraphs, write_docx};
use crate::error::{Error, Result};
use crate::markdown::{paragraphs_to_markdown, split_pandoc_markdown};
use crate::util::decode_text;

/// `NN-<title>.md`
static CHAPTER_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-.+\.md$").expect("valid chapter file pattern"));

/// Configuration for splitting a manuscript into chapter files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitConfig {
    /// Label convention used to title the output files.
    pub labels: Labels,
}

impl SplitConfig {
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }
}

/// Outcome of [`export_docx`].
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Chapter files rendered into the document, in order.
    pub chapters: Vec<PathBuf>,
    /// Requested files that did not exist.
    pub skipped: Vec<PathBuf>,
    /// Image references rendered as placeholders.
    pub unresolved_images: Vec<String>,
}

/// Split a `.docx` manuscript into `NN-<title>.md` files under `out_dir`.
///
/// Returns the written paths in ordinal order.
pub fn split_docx<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    out_dir: Q,
    config: &SplitConfig,
) -> Result<Vec<PathBuf>> {
    let input = input.as_ref();
    let paragraphs = read_paragraphs(input)?;
    log::debug!("{}: {} paragraphs", input.display(), paragraphs.len());

    let blocks = segment(paragraphs);
    if blocks.is_empty() {
        return Err(Error::NoChapters(input.display().to_string()));
    }

    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    for file in assign_files(blocks, config.labels) {
        let path = out_dir.join(file.file_name());
        fs::write(&path, paragraphs_to_markdown(&file.paragraphs))?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Render Markdown chapter files into one `.docx`.
///
/// Files that do not exist are skipped with a warning. Each rendered file
/// after the first starts on a new page.
pub fn export_docx<P: AsRef<Path>, Q: AsRef<Path>>(
    files: &[P],
    output: Q,
    config: &DocxConfig,
) -> Result<ExportReport> {
    let mut builder = DocxBuilder::with_config(config.clone());
    let mut report = ExportReport::default();

    for file in files {
        let file = file.as_ref();
        if !file.is_file() {
            log::warn!("skipping missing file {}", file.display());
            report.skipped.push(file.to_path_buf());
            continue;
        }

        let bytes = fs::read(file)?;
        let markdown = decode_text(&bytes);
        let source_dir = file.parent().unwrap_or(Path::new("."));
        builder.add_markdown(&markdown, source_dir);
        log::debug!("rendered {}", file.display());
        report.chapters.push(file.to_path_buf());
    }

    let output = output.as_ref();
    if builder.chapter_count() == 0 {
        return Err(Error::NoChapters(output.display().to_string()));
    }

    report.unresolved_images = builder.unresolved_images().to_vec();
    write_docx(&builder.finish(), output)?;
    log::info!(
        "wrote {} ({} chapters)",
        output.display(),
        report.chapters.len()
    );
    Ok(report)
}

/// Chapter files in `dir` (`NN-<title>.md`), sorted by name.
pub fn discover_chapters<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::NotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let matches = name.to_str().is_some_and(|name| CHAPTER_FILE.is_match(name));
        if matches && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Split a pandoc-produced Markdown file on bold chapter labels.
pub fn split_markdown<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    out_dir: Q,
    config: &SplitConfig,
) -> Result<Vec<PathBuf>> {
    let input = input.as_ref();
    if !input.is_file() {
        return Err(Error::NotFound(input.to_path_buf()));
    }
    let bytes = fs::read(input)?;
    let files = split_pandoc_markdown(&decode_text(&bytes), config.labels);
    if files.is_empty() {
        return Err(Error::NoChapters(input.display().to_string()));
    }

    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    for (file, content) in files {
        let path = out_dir.join(file.file_name());
        fs::write(&path, content)?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
