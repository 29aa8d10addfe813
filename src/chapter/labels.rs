//! Recognition of front-matter and chapter headings.
//!
//! Both the English (`front matter`, `Chapter 3 Overview`) and the Chinese
//! (`前言`, `第3章 概述`) forms are recognized regardless of which [`Labels`]
//! style is used to title the output.

use std::sync::LazyLock;

use regex_lite::Regex;

static COMPOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:前言|(?i:front\s+matter))\s*\+\s*(?:第\s*[0-9]+\s*章|(?i:chapter)\s*[0-9]+)")
        .expect("valid compound heading pattern")
});

static FRONT_MATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:前言|(?i:front\s+matter))\s*$").expect("valid front matter pattern")
});

static CHAPTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:第\s*([0-9]+)\s*章|(?i:chapter)\s+([0-9]+))")
        .expect("valid chapter heading pattern")
});

/// What a paragraph's text announces, independent of its outline level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadingKind {
    /// A merged `front matter + Chapter 1 + Chapter 2` title line.
    Compound,
    FrontMatter,
    /// `Chapter N` with the digits as written, leading zeros included.
    Chapter(String),
    Body,
}

impl HeadingKind {
    pub fn of(text: &str) -> Self {
        if COMPOUND.is_match(text) {
            return HeadingKind::Compound;
        }
        if FRONT_MATTER.is_match(text) {
            return HeadingKind::FrontMatter;
        }
        CHAPTER
            .captures(text)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map_or(HeadingKind::Body, |number| {
                HeadingKind::Chapter(number.as_str().to_string())
            })
    }
}

/// Naming convention used for chapter titles and output file names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Labels {
    /// `front matter`, `Chapter 03`
    #[default]
    English,
    /// `前言`, `第03章`
    Chinese,
}

impl Labels {
    pub fn front_matter(self) -> &'static str {
        match self {
            Labels::English => "front matter",
            Labels::Chinese => "前言",
        }
    }

    /// Title for a chapter number, zero-padded to at least two digits.
    pub fn chapter(self, number: &str) -> String {
        match self {
            Labels::English => format!("Chapter {number:0>2}"),
            Labels::Chinese => format!("第{number:0>2}章"),
        }
    }
}
