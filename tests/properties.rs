//! Property tests for the line classifier, inline splitter and segmenter.

use proptest::prelude::*;

use folio::chapter::flatten;
use folio::markdown::{split_spans, tokenize};
use folio::{Paragraph, segment};

fn paragraph() -> impl Strategy<Value = Paragraph> {
    let text = prop_oneof![
        Just("前言".to_string()),
        Just("Front Matter".to_string()),
        Just("前言+第1章+第2章".to_string()),
        Just("第2章 方法".to_string()),
        Just("Chapter 4 Results".to_string()),
        Just(String::new()),
        "[a-z 。，]{1,12}",
    ];
    let level = prop_oneof![Just(None), (0u8..4).prop_map(Some)];
    (text, level).prop_map(|(text, level)| Paragraph::new(text, level))
}

proptest! {
    #[test]
    fn classification_is_total(source in "(?s).{0,400}") {
        let tokens = tokenize(&source);
        prop_assert_eq!(tokens.len(), source.lines().count());
    }

    #[test]
    fn inline_split_never_grows_text(text in "\\PC{0,120}") {
        let spans = split_spans(&text);
        let total: usize = spans.iter().map(|span| span.text.len()).sum();
        prop_assert!(total <= text.len());
        prop_assert!(spans.iter().all(|span| !span.text.is_empty()));
    }

    #[test]
    fn segmentation_is_idempotent(paragraphs in prop::collection::vec(paragraph(), 0..30)) {
        let blocks = segment(paragraphs);
        prop_assert!(blocks.iter().all(|block| !block.paragraphs.is_empty()));

        let again = segment(flatten(&blocks));
        prop_assert_eq!(again, blocks);
    }
}
