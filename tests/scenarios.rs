//! Table-driven coverage of the named scenarios in `spec.md` §8, exercised
//! through the full [`htmlcore::parse`] facade rather than at the
//! tokenizer/builder unit level.

use htmlcore::{parse, ParserOptions};
use rstest::rstest;

#[rstest]
#[case::s1_nested_same_tag("<div><div>Inner</div></div>", &["div", "div"])]
#[case::s3_li_chain("<ul><li>A<li>B<li>C</ul>", &["ul", "li", "li", "li"])]
#[case::s6_void_without_self_close("<p>Line1<br>Line2</p>", &["p", "br"])]
fn element_shape_matches_expectation(#[case] input: &str, #[case] expected_names: &[&str]) {
    let doc = parse(Some(input), ParserOptions::default()).unwrap();
    let names: Vec<String> = doc
        .descendant_elements()
        .into_iter()
        .map(|id| doc.get(id).name_lower.clone().unwrap_or_default())
        .collect();
    assert_eq!(names, expected_names);
}

#[test]
fn s2_implicit_close_of_p_before_block() {
    let doc = parse(Some("<p>A<p>B<p>C"), ParserOptions::default()).unwrap();
    let elements = doc.descendant_elements();
    assert_eq!(elements.len(), 3);
    for (el, expected) in elements.iter().zip(["A", "B", "C"]) {
        assert_eq!(doc.get(*el).name_lower.as_deref(), Some("p"));
        assert_eq!(doc.inner_text(*el), expected);
    }
}

#[test]
fn s4_raw_text_opacity_keeps_fake_markup_as_text() {
    let doc = parse(
        Some("<script>var x = '<div>fake</div>';</script><div>Real</div>"),
        ParserOptions::default(),
    )
    .unwrap();
    let elements = doc.descendant_elements();
    let divs: Vec<_> = elements
        .iter()
        .filter(|e| doc.get(**e).name_lower.as_deref() == Some("div"))
        .collect();
    assert_eq!(divs.len(), 1);
    assert_eq!(doc.inner_text(*divs[0]), "Real");
}

#[test]
fn s5_mixed_attribute_quoting() {
    let doc = parse(
        Some(r#"<input single='v1' double="v2" unq=v3 flag>"#),
        ParserOptions::default(),
    )
    .unwrap();
    let elements = doc.descendant_elements();
    let input = doc.get(elements[0]);
    assert_eq!(input.attributes.len(), 4);
    assert_eq!(input.attributes[0].value.as_deref(), Some("v1"));
    assert_eq!(input.attributes[1].value.as_deref(), Some("v2"));
    assert_eq!(input.attributes[2].value.as_deref(), Some("v3"));
    assert_eq!(input.attributes[3].value, None);
}

#[test]
fn s7a_unmatched_open_tag_closes_implicitly_at_eof() {
    let doc = parse(Some("<div>content"), ParserOptions::default()).unwrap();
    assert!(doc.parse_errors.is_empty());
    let elements = doc.descendant_elements();
    assert_eq!(elements.len(), 1);
    assert_eq!(doc.get(elements[0]).end_node, Some(elements[0]));
}

#[test]
fn s7b_stray_close_tag_is_dropped_silently_by_default() {
    let doc = parse(Some("<div>a</span>b</div>"), ParserOptions::default()).unwrap();
    assert!(doc.parse_errors.is_empty());
    let elements = doc.descendant_elements();
    assert_eq!(elements.len(), 1);
    assert_eq!(doc.inner_text(elements[0]), "ab");
}

#[test]
fn s7b_stray_close_tag_reports_under_check_syntax() {
    let mut options = ParserOptions::default();
    options.check_syntax = true;
    let doc = parse(Some("<div>a</span>b</div>"), options).unwrap();
    assert_eq!(doc.parse_errors.len(), 1);
}

#[test]
fn doctype_is_recorded_with_its_sentinel_name() {
    let doc = parse(
        Some("<!DOCTYPE html><html><body>hi</body></html>"),
        ParserOptions::default(),
    )
    .unwrap();
    let root_children: Vec<_> = doc.children(doc.root()).collect();
    let doctype = doc.get(root_children[0]);
    assert!(doctype.name_lower.as_deref().unwrap().ends_with("html"));
}

#[test]
fn id_index_is_case_insensitive_and_first_wins() {
    let mut options = ParserOptions::default();
    options.use_id_attribute = true;
    let doc = parse(
        Some(r#"<div id="Main">first</div><span id="main">second</span>"#),
        options,
    )
    .unwrap();
    let elements = doc.descendant_elements();
    assert_eq!(doc.id_index["main"], elements[0]);
    assert_eq!(doc.inner_text(doc.id_index["main"]), "first");
}
