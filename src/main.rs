//! folio - manuscript converter

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use folio::{
    DocxConfig, Labels, SplitConfig, assign_files, discover_chapters, export_docx,
    read_paragraphs, segment, split_docx, split_markdown,
};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Manuscript converter between DOCX and chapter Markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    folio split book.docx -o manuscript       Split into NN-<title>.md files
    folio export manuscript -o book.docx      Assemble chapter files into DOCX
    folio split-md pandoc.md --locale zh      Split pandoc output on bold labels
    folio inspect book.docx --json            Show detected chapters")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Print per-file and per-block detail
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Split a DOCX manuscript into per-chapter Markdown files
    Split {
        #[arg(value_name = "DOCX")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "manuscript")]
        output: PathBuf,

        /// Label convention for chapter titles
        #[arg(long, value_enum, default_value_t = Locale::En)]
        locale: Locale,
    },

    /// Assemble chapter Markdown files into one DOCX
    Export {
        /// Directory holding NN-<title>.md files
        #[arg(value_name = "DIR", default_value = "manuscript")]
        dir: PathBuf,

        /// Output DOCX file
        #[arg(short, long, default_value = "manuscript.docx")]
        output: PathBuf,

        /// Directory searched first for images
        #[arg(long, value_name = "DIR")]
        images: Option<PathBuf>,

        /// Explicit chapter files, in order (skips directory discovery)
        #[arg(long, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Body font
        #[arg(long, value_name = "NAME")]
        font: Option<String>,
    },

    /// Split a pandoc-converted Markdown file on bold chapter labels
    SplitMd {
        #[arg(value_name = "MD")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "manuscript")]
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = Locale::En)]
        locale: Locale,
    },

    /// Show the paragraphs and chapters detected in a DOCX
    Inspect {
        #[arg(value_name = "DOCX")]
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        #[arg(long, value_enum, default_value_t = Locale::En)]
        locale: Locale,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Locale {
    En,
    Zh,
}

impl From<Locale> for Labels {
    fn from(locale: Locale) -> Self {
        match locale {
            Locale::En => Labels::English,
            Locale::Zh => Labels::Chinese,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        log::LevelFilter::Warn
    } else if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> folio::Result<()> {
    match command {
        Command::Split {
            input,
            output,
            locale,
        } => {
            let config = SplitConfig::default().with_labels(locale.into());
            let written = split_docx(&input, &output, &config)?;
            println!("{} chapters written to {}", written.len(), output.display());
        }
        Command::Export {
            dir,
            output,
            images,
            files,
            font,
        } => {
            let files = if files.is_empty() {
                discover_chapters(&dir)?
            } else {
                files
            };

            let mut config = DocxConfig::default();
            if let Some(images) = images.or_else(|| default_images_dir(&dir)) {
                config = config.with_images_dir(images);
            }
            if let Some(font) = font {
                config = config.with_body_font(font);
            }

            let report = export_docx(&files, &output, &config)?;
            println!(
                "{} chapters written to {}",
                report.chapters.len(),
                output.display()
            );
            for path in &report.skipped {
                println!("  skipped: {}", path.display());
            }
            for image in &report.unresolved_images {
                println!("  missing image: {image}");
            }
        }
        Command::SplitMd {
            input,
            output,
            locale,
        } => {
            let config = SplitConfig::default().with_labels(locale.into());
            let written = split_markdown(&input, &output, &config)?;
            println!("{} chapters written to {}", written.len(), output.display());
        }
        Command::Inspect {
            input,
            json,
            locale,
        } => inspect(&input, json, locale.into())?,
    }
    Ok(())
}

/// `<dir>/images`, when it exists.
fn default_images_dir(dir: &Path) -> Option<PathBuf> {
    let images = dir.join("images");
    images.is_dir().then_some(images)
}

#[derive(Serialize)]
struct InspectView {
    file: String,
    paragraphs: usize,
    headings: Vec<HeadingView>,
    chapters: Vec<ChapterView>,
}

#[derive(Serialize)]
struct HeadingView {
    outline_level: u8,
    text: String,
}

#[derive(Serialize)]
struct ChapterView {
    file_name: String,
    title: String,
    paragraphs: usize,
}

fn inspect(path: &Path, json: bool, labels: Labels) -> folio::Result<()> {
    let paragraphs = read_paragraphs(path)?;

    let headings: Vec<HeadingView> = paragraphs
        .iter()
        .filter_map(|p| {
            p.outline_level.map(|level| HeadingView {
                outline_level: level,
                text: p.text.clone(),
            })
        })
        .collect();
    let total = paragraphs.len();
    let chapters: Vec<ChapterView> = assign_files(segment(paragraphs), labels)
        .into_iter()
        .map(|file| ChapterView {
            file_name: file.file_name(),
            title: file.title,
            paragraphs: file.paragraphs.len(),
        })
        .collect();

    let view = InspectView {
        file: path.display().to_string(),
        paragraphs: total,
        headings,
        chapters,
    };

    if json {
        let out = serde_json::to_string_pretty(&view)
            .map_err(|e| folio::Error::Io(std::io::Error::other(e)))?;
        println!("{out}");
        return Ok(());
    }

    println!("File: {}", view.file);
    println!("Paragraphs: {}", view.paragraphs);
    println!("Headings:");
    for heading in &view.headings {
        let indent = "  ".repeat(usize::from(heading.outline_level) + 1);
        println!("{indent}[{}] {}", heading.outline_level, heading.text);
    }
    println!("Chapters:");
    for chapter in &view.chapters {
        println!("  {} ({} paragraphs)", chapter.file_name, chapter.paragraphs);
    }
    Ok(())
}
