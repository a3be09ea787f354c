//! Corpus tests over the fixture templates: valid fixtures must parse and
//! satisfy the span invariants, invalid ones must fail without panicking.

use std::fs;
use std::path::{Path, PathBuf};
use zvelte_parser::{parse, Attribute, ElseBranch, Fragment, IfBlock, Node, Root, Span};

fn get_fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

fn collect_zvelte_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "zvelte") {
                files.push(path);
            } else if path.is_dir() {
                files.extend(collect_zvelte_files(&path));
            }
        }
    }
    files.sort();
    files
}

/// Asserts that every node lies within its parent, siblings don't overlap, and
/// text nodes hold exactly the source they span.
fn check_root(root: &Root, source: &str) {
    assert_eq!(root.span, Span::from_offsets(0, source.len()));
    check_fragment(&root.fragment, source);

    if let Some(js) = &root.js {
        assert!(js.span.contains_span(js.content_span));
        assert_eq!(js.content_span.text(source), js.content);
        for import in &root.imports {
            assert!(js.content_span.contains_span(import.span));
            assert!(import.span.contains_span(import.source.span));
        }
    }
    if let Some(css) = &root.css {
        assert!(css.span.contains_span(css.content_span));
        assert_eq!(css.content_span.text(source), css.content);
    }
}

fn check_fragment(fragment: &Fragment, source: &str) {
    let mut previous_end = fragment.span.start_offset();
    for node in &fragment.nodes {
        let span = node.span();
        assert!(
            fragment.span.contains_span(span),
            "{span:?} escapes its fragment {:?}",
            fragment.span
        );
        assert!(span.start_offset() >= previous_end, "{span:?} overlaps its sibling");
        previous_end = span.end_offset();
        check_node(node, source);
    }
}

fn check_node(node: &Node, source: &str) {
    let span = node.span();
    for fragment in node.fragments() {
        assert!(span.contains_span(fragment.span), "{fragment:?} escapes {span:?}");
        check_fragment(fragment, source);
    }

    for attribute in attributes(node) {
        assert!(span.contains_span(attribute.span()));
    }

    match node {
        Node::Text(text) => assert_eq!(text.span.text(source), text.data),
        Node::ExpressionTag(tag) => assert!(tag.span.contains_span(tag.expression.span())),
        Node::IfBlock(block) => check_else_if(block, source),
        _ => {}
    }
}

fn check_else_if(block: &IfBlock, source: &str) {
    if let Some(ElseBranch::ElseIf(inner)) = &block.alternate {
        assert!(block.span.contains_span(inner.span));
        assert!(inner.elseif);
        check_fragment(&inner.consequent, source);
        if let Some(ElseBranch::Else(alternate)) = &inner.alternate {
            check_fragment(alternate, source);
        }
        check_else_if(inner, source);
    }
}

fn attributes(node: &Node) -> &[Attribute] {
    match node {
        Node::RegularElement(n) => &n.attributes,
        Node::Component(n) => &n.attributes,
        Node::TitleElement(n) => &n.attributes,
        Node::ZvelteComponent(n) => &n.attributes,
        Node::ZvelteSelf(n) => &n.attributes,
        Node::ZvelteHead(n) => &n.attributes,
        _ => &[],
    }
}

#[test]
fn test_parse_all_valid_fixtures() {
    let files = collect_zvelte_files(&get_fixtures_dir().join("valid"));
    assert!(!files.is_empty(), "No valid fixtures found");

    for path in &files {
        let source = fs::read_to_string(path).expect("Failed to read file");
        let filename = path.file_name().unwrap().to_string_lossy();

        let root = parse(&source).unwrap_or_else(|err| {
            panic!("Valid fixture {filename} failed: {err}\n{}", err.preview)
        });
        assert!(
            !root.fragment.nodes.is_empty(),
            "Valid fixture {filename} should produce some content"
        );
        check_root(&root, &source);
    }
}

#[test]
fn test_parse_all_invalid_fixtures() {
    let files = collect_zvelte_files(&get_fixtures_dir().join("invalid"));
    assert!(!files.is_empty(), "No invalid fixtures found");

    for path in &files {
        let source = fs::read_to_string(path).expect("Failed to read file");
        let filename = path.file_name().unwrap().to_string_lossy();

        let Err(err) = parse(&source) else {
            panic!("Invalid fixture {filename} parsed without error");
        };
        assert!(err.span.end_offset() <= source.len(), "{filename}: span out of range");
        assert!(!err.to_string().is_empty());
        assert!(err.preview.contains('^'), "{filename}: preview has no marker");
    }
}

#[test]
fn test_page_fixture_hoists_script_and_style() {
    let source = fs::read_to_string(get_fixtures_dir().join("valid/Page.zvelte")).unwrap();
    let root = parse(&source).unwrap();

    let js = root.js.expect("script should be hoisted");
    assert!(js.content.contains("debounce"));
    assert_eq!(root.imports.len(), 3);
    assert!(root.css.is_some_and(|css| css.content.contains(".top--dark")));
}

#[test]
fn test_blocks_fixture_shape() {
    let source = fs::read_to_string(get_fixtures_dir().join("valid/Blocks.zvelte")).unwrap();
    let root = parse(&source).unwrap();

    let kinds: Vec<&str> = root
        .fragment
        .nodes
        .iter()
        .filter_map(|node| match node {
            Node::Text(_) => None,
            Node::Variable(_) => Some("set"),
            Node::IfBlock(_) => Some("if"),
            Node::RegularElement(_) => Some("element"),
            Node::ForBlock(_) => Some("for"),
            Node::SnippetBlock(_) => Some("snippet"),
            Node::KeyBlock(_) => Some("key"),
            Node::AwaitBlock(_) => Some("await"),
            other => panic!("unexpected root node {other:?}"),
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            "set", "set", "if", "element", "for", "for", "snippet", "element", "key", "await",
            "await"
        ]
    );
}
