//! Inline span scanning.
//!
//! Text is split left to right against an ordered list of delimiter
//! matchers. At each position the first matcher that closes wins; when none
//! does, one character is emitted as plain text and the scan moves on. Spans
//! never nest, and an unmatched delimiter is ordinary text.

use memchr::memchr;

/// Formatting applied to a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanFormat {
    Plain,
    Bold,
    Italic,
    Code,
    Math,
}

/// A contiguous run of text with one format, borrowed from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub format: SpanFormat,
    pub text: &'a str,
}

impl<'a> Span<'a> {
    fn new(format: SpanFormat, text: &'a str) -> Self {
        Self { format, text }
    }
}

/// Matchers in precedence order. `**` precedes `*` and `$$` precedes `$`, so
/// the longer delimiter always gets the first chance at a position.
const MATCHERS: &[(&str, SpanFormat)] = &[
    ("**", SpanFormat::Bold),
    ("*", SpanFormat::Italic),
    ("`", SpanFormat::Code),
    ("$$", SpanFormat::Math),
    ("$", SpanFormat::Math),
];

/// Split `text` into formatted spans.
///
/// ```
/// use folio::markdown::{SpanFormat, split_spans};
///
/// let spans = split_spans("a **b** `c`");
/// let formats: Vec<_> = spans.iter().map(|s| s.format).collect();
/// assert_eq!(
///     formats,
///     [SpanFormat::Plain, SpanFormat::Bold, SpanFormat::Plain, SpanFormat::Code]
/// );
/// ```
pub fn split_spans(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let matched = MATCHERS.iter().find_map(|&(delim, format)| {
            match_delimited(rest, delim).map(|(inner, consumed)| (format, inner, consumed))
        });

        match matched {
            Some((format, inner, consumed)) => {
                if plain_start < pos {
                    spans.push(Span::new(SpanFormat::Plain, &text[plain_start..pos]));
                }
                spans.push(Span::new(format, inner));
                pos += consumed;
                plain_start = pos;
            }
            None => {
                let step = rest.chars().next().map_or(1, char::len_utf8);
                pos += step;
            }
        }
    }

    if plain_start < text.len() {
        spans.push(Span::new(SpanFormat::Plain, &text[plain_start..]));
    }
    spans
}

/// Match `delim inner delim` at the start of `rest`, where `inner` is
/// non-empty and free of the delimiter character.
///
/// Returns the inner text and the total number of bytes consumed.
fn match_delimited<'a>(rest: &'a str, delim: &str) -> Option<(&'a str, usize)> {
    let after = rest.strip_prefix(delim)?;
    let close_char = delim.as_bytes()[0];
    let idx = memchr(close_char, after.as_bytes())?;
    if idx == 0 || !after[idx..].starts_with(delim) {
        return None;
    }
    Some((&after[..idx], delim.len() * 2 + idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use SpanFormat::*;

    fn pairs(text: &str) -> Vec<(SpanFormat, &str)> {
        split_spans(text)
            .into_iter()
            .map(|s| (s.format, s.text))
            .collect()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(pairs("just text"), vec![(Plain, "just text")]);
        assert!(pairs("").is_empty());
    }

    #[test]
    fn test_each_format() {
        assert_eq!(
            pairs("a **b** *c* `d` $$e$$ $f$"),
            vec![
                (Plain, "a "),
                (Bold, "b"),
                (Plain, " "),
                (Italic, "c"),
                (Plain, " "),
                (Code, "d"),
                (Plain, " "),
                (Math, "e"),
                (Plain, " "),
                (Math, "f"),
            ]
        );
    }

    #[test]
    fn test_bold_wins_over_italic() {
        assert_eq!(pairs("**strong**"), vec![(Bold, "strong")]);
    }

    #[test]
    fn test_unbalanced_bold_falls_back_to_italic() {
        // "**x*" cannot close as bold; the second star opens an italic span.
        assert_eq!(pairs("**x*"), vec![(Plain, "*"), (Italic, "x")]);
    }

    #[test]
    fn test_unmatched_delimiters_are_plain() {
        assert_eq!(pairs("2 * 3 = 6"), vec![(Plain, "2 * 3 = 6")]);
        assert_eq!(pairs("costs $5"), vec![(Plain, "costs $5")]);
        assert_eq!(pairs("``"), vec![(Plain, "``")]);
    }

    #[test]
    fn test_no_nesting() {
        assert_eq!(pairs("**a `b` c**"), vec![(Bold, "a `b` c")]);
        assert_eq!(pairs("`**x**`"), vec![(Code, "**x**")]);
        // Italic content may not contain '*': the first closing star wins.
        assert_eq!(
            pairs("*a **b** c*"),
            vec![(Italic, "a "), (Italic, "b"), (Italic, " c")]
        );
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            pairs("智能体**工作流**与$x^2$"),
            vec![
                (Plain, "智能体"),
                (Bold, "工作流"),
                (Plain, "与"),
                (Math, "x^2")
            ]
        );
    }
}
