//! Property-based coverage of the universal invariants in `spec.md` §8:
//! token coverage has no gaps or overlap, token order is strictly
//! non-decreasing, and concatenating every token's raw text reconstructs
//! the original input exactly.

use htmlcore::patterns::PatternLibrary;
use htmlcore::token::TokenKind;
use htmlcore::tokenizer::Tokenizer;
use proptest::prelude::*;

fn tag_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("div".to_string()),
        Just("span".to_string()),
        Just("p".to_string()),
        Just("li".to_string()),
        Just("b".to_string()),
        Just("section".to_string()),
    ]
}

fn html_fragment() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            tag_name().prop_map(|n| format!("<{}>", n)),
            tag_name().prop_map(|n| format!("</{}>", n)),
            tag_name().prop_map(|n| format!("<{}/>", n)),
            "[a-zA-Z0-9 ]{0,12}".prop_map(|s| s),
            Just("<!-- note -->".to_string()),
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn tokens_cover_input_with_no_gaps_or_overlap(input in html_fragment()) {
        let patterns = PatternLibrary::new();
        let tokenizer = Tokenizer::new(&input, &patterns);
        let (tokens, _errors) = tokenizer.tokenize_with_attributes();

        let mut expected_offset = 0usize;
        for token in &tokens {
            prop_assert_eq!(token.offset, expected_offset);
            expected_offset += token.length;
        }
        prop_assert_eq!(expected_offset, input.len());
    }

    #[test]
    fn token_offsets_are_strictly_non_decreasing(input in html_fragment()) {
        let patterns = PatternLibrary::new();
        let tokenizer = Tokenizer::new(&input, &patterns);
        let (tokens, _errors) = tokenizer.tokenize_with_attributes();

        for pair in tokens.windows(2) {
            prop_assert!(pair[0].offset <= pair[1].offset);
        }
    }

    #[test]
    fn raw_text_concatenation_reconstructs_input(input in html_fragment()) {
        let patterns = PatternLibrary::new();
        let tokenizer = Tokenizer::new(&input, &patterns);
        let (tokens, _errors) = tokenizer.tokenize_with_attributes();

        let rebuilt: String = tokens.iter().map(|t| t.raw_text.as_str()).collect();
        prop_assert_eq!(rebuilt, input);
    }

    #[test]
    fn every_open_or_selfclose_token_has_a_lowercase_name(input in html_fragment()) {
        let patterns = PatternLibrary::new();
        let tokenizer = Tokenizer::new(&input, &patterns);
        let (tokens, _errors) = tokenizer.tokenize_with_attributes();

        for token in &tokens {
            if matches!(token.kind, TokenKind::OpenTag | TokenKind::SelfCloseTag | TokenKind::CloseTag) {
                let name = token.name_lower.as_ref().expect("tag token must carry a name");
                prop_assert_eq!(name, &name.to_ascii_lowercase());
            }
        }
    }
}
