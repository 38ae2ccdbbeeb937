//! Parser Facade (`spec.md` §4.5)
//!
//! The single entry point collaborators are expected to call: builds a
//! fresh [`PatternLibrary`], tokenizes, builds the tree, and (when enabled)
//! rebuilds the `id` index. Everything else in this crate is reachable
//! individually, but `parse` is the documented front door.

use crate::builder::TreeBuilder;
use crate::config::ParserOptions;
use crate::dom::Document;
use crate::error::PreconditionError;
use crate::patterns::PatternLibrary;
use crate::tokenizer::Tokenizer;

/// Parse `input` into a fresh [`Document`].
///
/// `input` being `None` is the only precondition failure this core
/// recognizes (`spec.md`'s "null input" case, the Rust analogue of which is
/// simply not holding a reference); every other malformed-markup case is
/// recovered from silently or recorded on [`Document::parse_errors`].
pub fn parse(input: Option<&str>, options: ParserOptions) -> Result<Document, PreconditionError> {
    let input = input.ok_or(PreconditionError::MissingInput)?;

    let patterns = PatternLibrary::new();
    let tokenizer = Tokenizer::new(input, &patterns);
    let (tokens, errors) = tokenizer.tokenize_with_attributes();

    let mut document = Document::new(input.to_string(), options);
    document.parse_errors.extend(errors);

    let mut builder = TreeBuilder::new(&patterns);
    builder.build(&mut document, &tokens, input);

    if options.use_id_attribute {
        document.rebuild_id_index();
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    #[test]
    fn missing_input_is_a_precondition_error() {
        let result = parse(None, ParserOptions::default());
        assert_eq!(result.unwrap_err(), PreconditionError::MissingInput);
    }

    #[test]
    fn empty_input_parses_to_an_empty_document() {
        let doc = parse(Some(""), ParserOptions::default()).unwrap();
        assert!(doc.descendant_elements().is_empty());
    }

    #[test]
    fn id_index_is_built_when_requested() {
        let mut options = ParserOptions::default();
        options.use_id_attribute = true;
        let doc = parse(Some(r#"<div id="main"><span id="MAIN">dup</span></div>"#), options).unwrap();
        assert!(doc.id_index.contains_key("main"));
        let elements = doc.descendant_elements();
        assert_eq!(doc.id_index["main"], elements[0]);
    }

    #[test]
    fn id_index_absent_when_not_requested() {
        let doc = parse(Some(r#"<div id="main"></div>"#), ParserOptions::default()).unwrap();
        assert!(doc.id_index.is_empty());
    }

    #[test]
    fn full_facade_matches_scenario_s1() {
        let doc = parse(Some("<div><div>Inner</div></div>"), ParserOptions::default()).unwrap();
        let elements = doc.descendant_elements();
        assert_eq!(elements.len(), 2);
        assert_eq!(doc.inner_text(elements[1]), "Inner");
    }

    #[test]
    fn check_syntax_reports_tag_not_opened() {
        let mut options = ParserOptions::default();
        options.check_syntax = true;
        let doc = parse(Some("<div>a</span>b</div>"), options).unwrap();
        assert_eq!(doc.parse_errors.len(), 1);
        assert_eq!(doc.parse_errors[0].kind, ParseErrorKind::TagNotOpened);
    }
}
