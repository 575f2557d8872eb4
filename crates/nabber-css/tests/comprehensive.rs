//! Comprehensive selector matching tests against real trees

use nabber_css::{matches, parse_selector_list, query_selector, query_selector_all};
use nabber_dom::{DomTree, NodeId};

/// Builds:
/// ```text
/// body
/// ├── article.post
/// │   ├── div.recipe-summary.wide#summary
/// │   │   └── p "Mix"
/// │   └── div[itemtype=http://schema.org/Recipe]
/// │       └── section
/// │           └── p "Bake"
/// └── div.recipe-summary
/// ```
struct Page {
    tree: DomTree,
    article: NodeId,
    summary: NodeId,
    summary_p: NodeId,
    schema: NodeId,
    schema_p: NodeId,
    narrow: NodeId,
}

fn page() -> Page {
    let mut tree = DomTree::new();
    let body = tree.create_element("body");
    let article = tree.create_element_with_attrs("article", &[("class", "post")]);
    let summary = tree.create_element_with_attrs("div", &[("class", "recipe-summary wide"), ("id", "summary")]);
    let summary_p = tree.create_element("p");
    let mix = tree.create_text("Mix");
    let schema = tree.create_element_with_attrs("div", &[("itemtype", "http://schema.org/Recipe")]);
    let section = tree.create_element("section");
    let schema_p = tree.create_element("p");
    let bake = tree.create_text("Bake");
    let narrow = tree.create_element_with_attrs("div", &[("class", "recipe-summary")]);

    let root = tree.root();
    tree.append_child(root, body).unwrap();
    tree.append_child(body, article).unwrap();
    tree.append_child(article, summary).unwrap();
    tree.append_child(summary, summary_p).unwrap();
    tree.append_child(summary_p, mix).unwrap();
    tree.append_child(article, schema).unwrap();
    tree.append_child(schema, section).unwrap();
    tree.append_child(section, schema_p).unwrap();
    tree.append_child(schema_p, bake).unwrap();
    tree.append_child(body, narrow).unwrap();

    Page { tree, article, summary, summary_p, schema, schema_p, narrow }
}

#[test]
fn test_compound_class_excludes_partial_match() {
    let page = page();
    let list = parse_selector_list(".recipe-summary.wide").unwrap();
    assert_eq!(query_selector_all(&page.tree, page.tree.root(), &list), vec![page.summary]);
    assert!(!matches(&page.tree, page.narrow, &list));
}

#[test]
fn test_selector_list_returns_document_order() {
    let page = page();
    // List order is irrelevant to result order
    let list = parse_selector_list(
        r#".recipe-summary, div[itemtype="http://schema.org/Recipe"], #summary"#,
    )
    .unwrap();
    assert_eq!(
        query_selector_all(&page.tree, page.tree.root(), &list),
        vec![page.summary, page.schema, page.narrow]
    );
}

#[test]
fn test_schema_https_variant_does_not_match_http() {
    let page = page();
    let list = parse_selector_list(r#"div[itemtype="https://schema.org/Recipe"]"#).unwrap();
    assert!(query_selector_all(&page.tree, page.tree.root(), &list).is_empty());
}

#[test]
fn test_descendant_combinator_backtracks() {
    let page = page();
    let list = parse_selector_list("article p").unwrap();
    assert_eq!(
        query_selector_all(&page.tree, page.tree.root(), &list),
        vec![page.summary_p, page.schema_p]
    );

    // `div > p` must not match the p nested in a section
    let list = parse_selector_list("div > p").unwrap();
    assert_eq!(query_selector_all(&page.tree, page.tree.root(), &list), vec![page.summary_p]);

    let list = parse_selector_list(".post > div section > p").unwrap();
    assert_eq!(query_selector(&page.tree, page.tree.root(), &list), Some(page.schema_p));
}

#[test]
fn test_query_scoped_to_root_excludes_root() {
    let page = page();
    let list = parse_selector_list("article, div").unwrap();
    let found = query_selector_all(&page.tree, page.article, &list);
    assert_eq!(found, vec![page.summary, page.schema]);
}

#[test]
fn test_text_nodes_never_match() {
    let page = page();
    let list = parse_selector_list("*").unwrap();
    for node in query_selector_all(&page.tree, page.tree.root(), &list) {
        assert!(page.tree.is_element(node));
    }
    let text = page.tree.first_child(page.summary_p).unwrap();
    assert!(!matches(&page.tree, text, &list));
}
