//! Integration tests for the markup tokenizer.

use arbor_html::{Attribute, HTMLTokenizer, TreeEvent};

fn tokenize(input: &str) -> Vec<TreeEvent> {
    let mut tokenizer = HTMLTokenizer::new(input);
    tokenizer.run();
    tokenizer.into_events()
}

#[test]
fn test_start_end_and_text() {
    assert_eq!(
        tokenize("<p>Hello</p>"),
        vec![
            TreeEvent::start("p", &[]),
            TreeEvent::text("Hello"),
            TreeEvent::end("p"),
        ]
    );
}

#[test]
fn test_names_are_lowercased() {
    assert_eq!(
        tokenize(r#"<DIV Class="Big">x</Div>"#),
        vec![
            TreeEvent::start("div", &[("class", "Big")]),
            TreeEvent::text("x"),
            TreeEvent::end("div"),
        ]
    );
}

#[test]
fn test_attribute_value_forms() {
    assert_eq!(
        tokenize(r#"<input type="text" name='q' size=10 disabled>"#),
        vec![TreeEvent::start(
            "input",
            &[
                ("type", "text"),
                ("name", "q"),
                ("size", "10"),
                ("disabled", ""),
            ]
        )]
    );
}

#[test]
fn test_duplicate_attributes_are_passed_through() {
    let events = tokenize(r#"<li name="a" name="b">"#);
    let TreeEvent::StartTag { attributes, .. } = &events[0] else {
        panic!("expected a start tag, got {:?}", events[0]);
    };
    assert_eq!(
        attributes,
        &vec![Attribute::new("name", "a"), Attribute::new("name", "b")]
    );
}

#[test]
fn test_self_closing_tag() {
    assert_eq!(
        tokenize(r#"<br/><img src="a.png" />"#),
        vec![
            TreeEvent::start_end("br", &[]),
            TreeEvent::start_end("img", &[("src", "a.png")]),
        ]
    );
}

#[test]
fn test_slash_inside_unquoted_value_is_kept() {
    assert_eq!(
        tokenize("<a href=/x/y>"),
        vec![TreeEvent::start("a", &[("href", "/x/y")])]
    );
}

#[test]
fn test_comments_doctype_and_processing_instructions_vanish() {
    assert_eq!(
        tokenize("<!DOCTYPE html><?xml version=\"1.0\"?>a<!-- <p>not a tag</p> -->b"),
        vec![TreeEvent::text("ab")]
    );
}

#[test]
fn test_unterminated_comment_swallows_the_rest() {
    assert_eq!(tokenize("a<!-- never closed <p>"), vec![TreeEvent::text("a")]);
}

#[test]
fn test_script_content_is_raw_text() {
    assert_eq!(
        tokenize("<script>if (a < b && c) { x = '</p>'; }</script><p>"),
        vec![
            TreeEvent::start("script", &[]),
            TreeEvent::text("if (a < b && c) { x = '</p>'; }"),
            TreeEvent::end("script"),
            TreeEvent::start("p", &[]),
        ]
    );
}

#[test]
fn test_style_end_tag_is_case_insensitive() {
    assert_eq!(
        tokenize("<style>p > a {}</STYLE>"),
        vec![
            TreeEvent::start("style", &[]),
            TreeEvent::text("p > a {}"),
            TreeEvent::end("style"),
        ]
    );
}

#[test]
fn test_empty_script_has_no_text() {
    assert_eq!(
        tokenize(r#"<script src="tree.js"></script>"#),
        vec![
            TreeEvent::start("script", &[("src", "tree.js")]),
            TreeEvent::end("script"),
        ]
    );
}

#[test]
fn test_character_references_in_text() {
    assert_eq!(
        tokenize("a &amp; b &lt;c&gt; &#65;&#x42; &copy; &bogus; & &amp"),
        vec![TreeEvent::text("a & b <c> AB \u{00A9} &bogus; & &amp")]
    );
}

#[test]
fn test_character_references_in_attribute_values() {
    assert_eq!(
        tokenize(r#"<a title="Tom &amp; Jerry" alt=x&quot;y>"#),
        vec![TreeEvent::start(
            "a",
            &[("title", "Tom & Jerry"), ("alt", "x\"y")]
        )]
    );
}

#[test]
fn test_text_is_not_trimmed_by_tokenizer() {
    assert_eq!(
        tokenize("<li>Animals\n  <ul>"),
        vec![
            TreeEvent::start("li", &[]),
            TreeEvent::text("Animals\n  "),
            TreeEvent::start("ul", &[]),
        ]
    );
}

#[test]
fn test_stray_end_tag_markup() {
    assert_eq!(tokenize("a</>b"), vec![TreeEvent::text("ab")]);
    assert_eq!(tokenize("a</"), vec![TreeEvent::text("a</")]);
}

#[test]
fn test_non_ascii_text_survives() {
    assert_eq!(
        tokenize("<p>naïve café 🌳</p>"),
        vec![
            TreeEvent::start("p", &[]),
            TreeEvent::text("naïve café 🌳"),
            TreeEvent::end("p"),
        ]
    );
}

#[test]
fn test_carriage_returns_become_line_feeds() {
    assert_eq!(
        tokenize("<li>Animals\r\n  <ul>\r</ul>"),
        tokenize("<li>Animals\n  <ul>\n</ul>")
    );
    assert_eq!(
        tokenize("<p title=\"a\r\nb\">x\ry</p>"),
        vec![
            TreeEvent::start("p", &[("title", "a\nb")]),
            TreeEvent::text("x\ny"),
            TreeEvent::end("p"),
        ]
    );
}
