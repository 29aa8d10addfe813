//! Block assembly: aggregate the token stream into renderable blocks.
//!
//! Tables and fenced code blocks span several lines and are accumulated here;
//! every other token maps onto exactly one [`Block`].

use super::classify::{Token, tokenize};

/// A fully aggregated unit ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Image { alt: String, path: String },
    Table(Table),
    CodeBlock { lines: Vec<String> },
    Bullet(String),
    Numbered(String),
    Quote(String),
    Rule,
    Blank,
    Paragraph(String),
}

/// A closed table. The first row is the header and fixes the column count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, or `None` when there is no row or the header is empty.
    pub fn new(rows: Vec<Vec<String>>) -> Option<Self> {
        if rows.first().is_none_or(|header| header.is_empty()) {
            return None;
        }
        Some(Self { rows })
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    pub fn columns(&self) -> usize {
        self.rows[0].len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows as written in the source, before column normalization.
    pub fn raw_rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Rows cut or padded to exactly [`columns`](Self::columns) cells.
    ///
    /// Cells past the header width are dropped; short rows yield `""` for the
    /// missing trailing cells.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        let columns = self.columns();
        self.rows.iter().map(move |row| {
            (0..columns)
                .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
                .collect()
        })
    }
}

/// Incremental token consumer.
///
/// Feed tokens with [`push`](Self::push) and collect the result with
/// [`finish`](Self::finish), which closes anything still open.
#[derive(Debug, Default)]
pub struct BlockAssembler {
    blocks: Vec<Block>,
    table_rows: Vec<Vec<String>>,
    code_lines: Option<Vec<String>>,
}

impl BlockAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        let block = match token {
            Token::TableRow(cells) => {
                self.table_rows.push(cells);
                return;
            }
            Token::TableSeparator => return,
            Token::CodeFence => {
                self.close_table();
                match self.code_lines.take() {
                    Some(lines) => self.emit_code(lines),
                    None => self.code_lines = Some(Vec::new()),
                }
                return;
            }
            Token::CodeLine(line) => {
                self.close_table();
                self.code_lines.get_or_insert_with(Vec::new).push(line);
                return;
            }
            Token::Heading { level, text } => Block::Heading { level, text },
            Token::Image { alt, path } => Block::Image { alt, path },
            Token::Bullet(text) => Block::Bullet(text),
            Token::Numbered(text) => Block::Numbered(text),
            Token::Quote(text) => Block::Quote(text),
            Token::HorizontalRule => Block::Rule,
            Token::Blank => Block::Blank,
            Token::Paragraph(text) => Block::Paragraph(text),
        };
        self.close_table();
        self.blocks.push(block);
    }

    pub fn finish(mut self) -> Vec<Block> {
        self.close_table();
        if let Some(lines) = self.code_lines.take() {
            log::debug!("code block left open at end of input ({} lines)", lines.len());
            self.emit_code(lines);
        }
        self.blocks
    }

    fn close_table(&mut self) {
        if self.table_rows.is_empty() {
            return;
        }
        let rows = std::mem::take(&mut self.table_rows);
        match Table::new(rows) {
            Some(table) => self.blocks.push(Block::Table(table)),
            None => log::debug!("dropping table with an empty header row"),
        }
    }

    fn emit_code(&mut self, lines: Vec<String>) {
        if !lines.is_empty() {
            self.blocks.push(Block::CodeBlock { lines });
        }
    }
}

/// Assemble an already classified token stream.
pub fn assemble(tokens: impl IntoIterator<Item = Token>) -> Vec<Block> {
    let mut assembler = BlockAssembler::new();
    for token in tokens {
        assembler.push(token);
    }
    assembler.finish()
}

/// Classify and assemble a whole Markdown document.
pub fn parse(markdown: &str) -> Vec<Block> {
    assemble(tokenize(markdown))
}
