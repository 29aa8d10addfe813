//! Benchmarks for the manuscript conversion pipeline.
//!
//! Run with: cargo bench

use std::io::Cursor;
use std::path::Path;

use criterion::{Criterion, criterion_group, criterion_main};

use folio::docx::{DocxBuilder, read_paragraphs_from_reader, write_docx_to_writer};
use folio::markdown::{parse, paragraphs_to_markdown, split_spans};
use folio::{Labels, assign_files, segment};

/// A synthetic manuscript: front matter plus a dozen chapters mixing every
/// block kind.
fn sample_chapters() -> Vec<String> {
    let mut chapters = vec!["# 前言\n\n这是一本关于**写作**的书。\n".to_string()];
    for n in 1..=12 {
        let mut md = format!("# 第{n}章 标题\n\n");
        for s in 1..=4 {
            md.push_str(&format!("## {n}.{s} 小节\n\n"));
            md.push_str("正文包含 **粗体**、*斜体*、`code` 与 $x^2$。\n\n");
            md.push_str("- 列表一\n- 列表二\n1. 第一\n2. 第二\n\n");
            md.push_str("> 引用的文字\n\n");
            md.push_str("| 列 | 值 |\n|---|---|\n| a | 1 |\n| b | 2 |\n\n");
            md.push_str("```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n\n---\n\n");
        }
        chapters.push(md);
    }
    chapters
}

fn build_docx(chapters: &[String]) -> Vec<u8> {
    let mut builder = DocxBuilder::new();
    for chapter in chapters {
        builder.add_markdown(chapter, Path::new("."));
    }
    let mut cursor = Cursor::new(Vec::new());
    write_docx_to_writer(&builder.finish(), &mut cursor).unwrap();
    cursor.into_inner()
}

// ============================================================================
// Markdown Benchmarks
// ============================================================================

fn bench_parse_markdown(c: &mut Criterion) {
    let chapters = sample_chapters();
    c.bench_function("parse_markdown", |b| {
        b.iter(|| {
            chapters
                .iter()
                .map(|md| parse(md).len())
                .sum::<usize>()
        });
    });
}

fn bench_split_spans(c: &mut Criterion) {
    let line = "正文包含 **粗体**、*斜体*、`code` 与 $x^2$。".repeat(8);
    c.bench_function("split_spans", |b| {
        b.iter(|| split_spans(&line).len());
    });
}

// ============================================================================
// DOCX Benchmarks
// ============================================================================

fn bench_write_docx(c: &mut Criterion) {
    let chapters = sample_chapters();
    c.bench_function("write_docx", |b| {
        b.iter(|| build_docx(&chapters));
    });
}

fn bench_read_docx(c: &mut Criterion) {
    let bytes = build_docx(&sample_chapters());
    c.bench_function("read_docx", |b| {
        b.iter(|| read_paragraphs_from_reader(Cursor::new(&bytes)).unwrap());
    });
}

fn bench_split(c: &mut Criterion) {
    let bytes = build_docx(&sample_chapters());
    let paragraphs = read_paragraphs_from_reader(Cursor::new(&bytes)).unwrap();
    c.bench_function("segment_and_serialize", |b| {
        b.iter(|| {
            assign_files(segment(paragraphs.clone()), Labels::Chinese)
                .iter()
                .map(|file| paragraphs_to_markdown(&file.paragraphs).len())
                .sum::<usize>()
        });
    });
}

criterion_group!(
    benches,
    bench_parse_markdown,
    bench_split_spans,
    bench_write_docx,
    bench_read_docx,
    bench_split,
);
criterion_main!(benches);
