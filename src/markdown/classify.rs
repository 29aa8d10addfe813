//! Line classification: one raw Markdown line in, one [`Token`] out.
//!
//! Classification is total. A line that matches no construct becomes a
//! [`Token::Paragraph`], so there is no error path.

/// Semantic meaning of a single input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `#` through `######` followed by whitespace and text.
    Heading { level: u8, text: String },
    /// `![alt](path)` at the start of the line.
    Image { alt: String, path: String },
    /// `| a | b |` with the boundary pipes removed and cells trimmed.
    TableRow(Vec<String>),
    /// `|---|:--:|` alignment row; carries no content.
    TableSeparator,
    Bullet(String),
    Numbered(String),
    Quote(String),
    HorizontalRule,
    /// A verbatim line inside a fenced code block.
    CodeLine(String),
    /// A fence line that opens or closes a code block.
    CodeFence,
    Blank,
    Paragraph(String),
}

/// State carried from one line to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineState {
    pub in_table: bool,
    pub in_code_block: bool,
}

/// Classify one line given the state left by the previous line.
///
/// Rules are tried in a fixed order and the first match wins: fence, code
/// line, blank, heading, image, table, bullet, numbered, quote, rule,
/// paragraph.
pub fn classify(line: &str, state: LineState) -> (Token, LineState) {
    let trimmed = line.trim();

    if is_fence(trimmed) {
        let next = LineState {
            in_code_block: !state.in_code_block,
            ..state
        };
        return (Token::CodeFence, next);
    }

    if state.in_code_block {
        return (Token::CodeLine(line.trim_end().to_string()), state);
    }

    if trimmed.is_empty() {
        return (Token::Blank, LineState::default());
    }

    let leaves_table = LineState {
        in_table: false,
        ..state
    };

    if let Some((level, text)) = parse_heading(trimmed) {
        let token = Token::Heading {
            level,
            text: text.to_string(),
        };
        return (token, leaves_table);
    }

    if let Some((alt, path)) = parse_image(trimmed) {
        let token = Token::Image {
            alt: alt.to_string(),
            path: path.to_string(),
        };
        return (token, state);
    }

    if let Some(token) = parse_table_row(trimmed) {
        let next = LineState {
            in_table: true,
            ..state
        };
        return (token, next);
    }

    if let Some(text) = strip_bullet(trimmed) {
        return (Token::Bullet(text.to_string()), leaves_table);
    }

    if let Some(text) = strip_number(trimmed) {
        return (Token::Numbered(text.to_string()), leaves_table);
    }

    if let Some(rest) = trimmed.strip_prefix('>') {
        return (Token::Quote(rest.trim().to_string()), state);
    }

    if is_rule(trimmed) {
        return (Token::HorizontalRule, state);
    }

    (Token::Paragraph(trimmed.to_string()), leaves_table)
}

/// Classify every line of `markdown`, threading the state through.
pub fn tokenize(markdown: &str) -> Vec<Token> {
    let mut state = LineState::default();
    markdown
        .lines()
        .map(|line| {
            let (token, next) = classify(line, state);
            state = next;
            token
        })
        .collect()
}

/// A triple-backtick fence, optionally followed by an info string.
fn is_fence(trimmed: &str) -> bool {
    trimmed
        .strip_prefix("```")
        .is_some_and(|info| !info.contains('`'))
}

fn parse_heading(trimmed: &str) -> Option<(u8, &str)> {
    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim_start();
    if text.is_empty() {
        return None;
    }
    Some((hashes as u8, text))
}

fn parse_image(trimmed: &str) -> Option<(&str, &str)> {
    let rest = trimmed.strip_prefix("![")?;
    let alt_end = rest.find(']')?;
    let alt = &rest[..alt_end];
    let rest = rest[alt_end + 1..].strip_prefix('(')?;
    let path_end = rest.find(')')?;
    if path_end == 0 {
        return None;
    }
    Some((alt, &rest[..path_end]))
}

fn parse_table_row(trimmed: &str) -> Option<Token> {
    if !trimmed.starts_with('|') || !trimmed.ends_with('|') {
        return None;
    }

    // A lone "|" starts and ends with a pipe but has no interior.
    let inner = trimmed.get(1..trimmed.len() - 1).unwrap_or("");

    if !inner.is_empty()
        && inner
            .chars()
            .all(|c| c == '-' || c == ':' || c == '|' || c.is_whitespace())
    {
        return Some(Token::TableSeparator);
    }

    if trimmed.len() < 2 {
        return Some(Token::TableRow(Vec::new()));
    }

    let cells = inner.split('|').map(|cell| cell.trim().to_string()).collect();
    Some(Token::TableRow(cells))
}

fn strip_bullet(trimmed: &str) -> Option<&str> {
    let rest = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('*'))?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}

fn strip_number(trimmed: &str) -> Option<&str> {
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = trimmed[digits..].strip_prefix('.')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}

fn is_rule(trimmed: &str) -> bool {
    trimmed.len() >= 3 && trimmed.bytes().all(|b| matches!(b, b'-' | b'*' | b'_'))
}
