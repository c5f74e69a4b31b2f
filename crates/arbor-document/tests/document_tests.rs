//! Integration tests for loading and querying documents.

use std::path::PathBuf;

use arbor_css::SelectorError;
use arbor_document::{Document, DocumentConfig, LoadError, NodeId, Source};
use arbor_html::BuildError;

const ANIMALS: &str = include_str!("../../arbor-html/tests/fixtures/animals.html");

fn texts(document: &Document, nodes: &[NodeId]) -> Vec<String> {
    let tree = document.tree();
    nodes
        .iter()
        .filter_map(|&id| tree.first_child(id))
        .map(|child| tree.text(child).to_string())
        .collect()
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("arbor-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_lookup_counts() {
    let document = Document::parse(ANIMALS).unwrap();
    assert_eq!(document.get_elements_by_tag_name("ul").len(), 7);
    assert_eq!(document.get_elements_by_tag_name("li").len(), 16);
    assert_eq!(document.get_elements_by_tag_name("body").len(), 1);
    assert!(document.get_elements_by_tag_name("div").is_empty());
    assert_eq!(document.get_elements_by_class_name("list").len(), 3);
    assert_eq!(document.get_elements_by_class_name("fishes_list").len(), 1);
    assert!(document.get_elements_by_class_name("neko").is_empty());
}

#[test]
fn test_get_element_by_id() {
    let document = Document::parse(ANIMALS).unwrap();
    let tree = document.tree();

    let ul = document.get_element_by_id("tree").unwrap();
    assert_eq!(tree.tag_name(ul), "ul");
    assert_eq!(tree.get_attribute(ul, "class"), Some("tree"));

    let donkeys = document.get_element_by_id("donkeys").unwrap();
    assert_eq!(tree.get_attribute(donkeys, "name"), Some("Saru"));
    assert_eq!(document.get_element_by_id("zebras"), None);
}

#[test]
fn test_selector_queries() {
    let document = Document::parse(ANIMALS).unwrap();
    assert_eq!(document.query_selector_all("li[class~='list']").unwrap().len(), 2);
    assert!(document.query_selector_all("li[class~='ani']").unwrap().is_empty());
    assert!(document.query_selector_all("li + ul").unwrap().is_empty());
    assert_eq!(document.query_selector_all("li ul").unwrap().len(), 6);

    let first = document.query_selector("li").unwrap().unwrap();
    assert_eq!(document.tree().get_attribute(first, "class"), Some("list animals_list"));
    assert_eq!(document.query_selector("table").unwrap(), None);
}

#[test]
fn test_scoped_query() {
    let document = Document::parse(ANIMALS).unwrap();
    let fishes = document.get_elements_by_class_name("fishes_list")[0];
    let leaves = document
        .query_selector_all_from(fishes, "ul > li > ul > li")
        .unwrap();
    assert_eq!(texts(&document, &leaves), ["Guppy", "Angelfish", "Sea trout"]);
}

#[test]
fn test_invalid_selector() {
    let document = Document::parse(ANIMALS).unwrap();
    assert_eq!(
        document.query_selector_all("#"),
        Err(SelectorError::MissingIdentifier {
            prefix: '#',
            position: 0,
        })
    );
}

#[test]
fn test_unbalanced_markup_is_a_build_error() {
    let error = Document::parse("<p>x</p></div>").unwrap_err();
    assert!(matches!(
        error,
        LoadError::Build(BuildError::UnbalancedEndTag { ref name, .. }) if name == "div"
    ));
    assert!(error.to_string().contains("</div>"));
}

#[test]
fn test_load_raw_has_no_source_path() {
    let document = Document::load(Source::Raw("<p>hi</p>".to_string())).unwrap();
    assert_eq!(document.source_path(), None);
    assert_eq!(document.get_elements_by_tag_name("p").len(), 1);
}

#[test]
fn test_load_file() {
    let path = temp_file("animals.html", ANIMALS);
    let document = Document::load(Source::File(path.clone())).unwrap();
    assert_eq!(document.source_path(), Some(path.display().to_string().as_str()));
    assert_eq!(document.get_elements_by_tag_name("li").len(), 16);
    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_load_missing_file() {
    let path = std::env::temp_dir().join("arbor-does-not-exist.html");
    let error = Document::load(Source::File(path.clone())).unwrap_err();
    match error {
        LoadError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn test_load_unreachable_url() {
    // Nothing listens on port 1
    let error = Document::load(Source::Url("http://127.0.0.1:1/".to_string())).unwrap_err();
    assert!(matches!(error, LoadError::Network(_)));
}

#[test]
fn test_source_from_location() {
    assert_eq!(
        Source::from_location("https://example.com/a.html"),
        Source::Url("https://example.com/a.html".to_string())
    );
    assert_eq!(
        Source::from_location("pages/a.html"),
        Source::File(PathBuf::from("pages/a.html"))
    );
    assert_eq!(Source::from_location("pages/a.html").to_string(), "pages/a.html");
}

#[test]
fn test_cache_capacity_is_configurable() {
    let config = DocumentConfig { cache_capacity: 0 };
    let document = Document::parse_with_config(ANIMALS, config).unwrap();
    assert_eq!(document.query_selector_all("ul > li").unwrap().len(), 16);
    assert!(document.tree().query_cache().is_empty());

    let document = Document::parse(ANIMALS).unwrap();
    assert_eq!(document.tree().query_cache().capacity(), 128);
}

#[test]
fn test_duplicate_ids_are_diagnosed() {
    let document = Document::parse(r#"<p id="x">a</p><p id="x">b</p>"#).unwrap();
    let first = document.get_elements_by_tag_name("p")[0];
    assert_eq!(document.get_element_by_id("x"), Some(first));
    assert_eq!(document.tree().diagnostics().len(), 1);
}

#[test]
fn test_class_list_edits_are_visible_to_queries() {
    let mut document = Document::parse(ANIMALS).unwrap();
    assert_eq!(document.query_selector_all(".list").unwrap().len(), 3);

    let donkeys = document.get_element_by_id("donkeys").unwrap();
    let _ = document
        .tree_mut()
        .class_list_mut(donkeys)
        .unwrap()
        .add("list");
    assert_eq!(document.query_selector_all(".list").unwrap().len(), 4);
    assert_eq!(document.get_elements_by_class_name("list").len(), 4);
}
