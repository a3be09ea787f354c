//! Behavioural properties of the parser, checked through the public API.

use pretty_assertions::assert_eq;
use zvelte_parser::{
    parse, AttributeChunk, AttributeValue, BinaryOperator, Expression, Node, Root, Span,
};

fn expression(source: &str) -> Expression {
    let root = parse(&format!("{{{{ {source} }}}}")).unwrap();
    match root.fragment.nodes.into_iter().next() {
        Some(Node::ExpressionTag(tag)) => tag.expression,
        other => panic!("expected an expression tag, got {other:?}"),
    }
}

fn only_node(root: Root) -> Node {
    let mut nodes = root.fragment.nodes;
    assert_eq!(nodes.len(), 1, "{nodes:?}");
    nodes.remove(0)
}

#[test]
fn test_empty_element() {
    let Node::RegularElement(div) = only_node(parse("<div></div>").unwrap()) else {
        panic!("expected a regular element");
    };
    assert_eq!(div.name, "div");
    assert_eq!(div.span, Span::from_offsets(0, 11));
    assert!(div.fragment.is_empty());
    assert!(div.fragment.transparent);
    assert_eq!(div.fragment.span, Span::from_offsets(5, 5));
}

#[test]
fn test_auto_closing() {
    let Node::RegularElement(div) =
        only_node(parse("<div>hello <span>world</div>").unwrap())
    else {
        panic!("expected a regular element");
    };
    assert_eq!(div.span.end_offset(), 28);

    let Some(Node::RegularElement(span)) = div.fragment.nodes.last() else {
        panic!("expected the span element last");
    };
    assert_eq!(span.name, "span");
    assert_eq!(span.span, Span::from_offsets(11, 22));
}

#[test]
fn test_binding_hosts() {
    for host in ["<input bind:value />", "<textarea bind:value />", "<select bind:value />"] {
        assert!(parse(host).is_ok(), "{host}");
    }
    assert!(parse("<div bind:value />").is_err());

    assert!(parse("<input type=\"checkbox\" bind:checked />").is_ok());
    assert!(parse("<input bind:checked />").is_err());
    assert!(parse("<input type=\"text\" bind:checked />").is_err());
}

#[test]
fn test_precedence() {
    assert!(matches!(expression("a or b"), Expression::LogicalExpression(_)));
    assert!(matches!(
        expression("a == b"),
        Expression::BinaryExpression(ref binary) if binary.operator == BinaryOperator::Equal
    ));
    assert!(matches!(expression("a is not b"), Expression::IsExpression(ref is) if is.not));
    assert!(matches!(expression("0..10"), Expression::RangeExpression(ref range) if range.step == 1));
    assert!(matches!(expression("10..0"), Expression::RangeExpression(ref range) if range.step == -1));
}

#[test]
fn test_fail_fast() {
    for source in ["</div>", "<@foo />", "{% unknown %}", "{% else %}"] {
        assert!(parse(source).is_err(), "{source} should fail");
    }
}

#[test]
fn test_component_key() {
    let Node::Component(component) = only_node(parse("<zvelte key=\"foo\" />").unwrap()) else {
        panic!("expected a component");
    };
    assert_eq!(component.key.data, "foo");
    assert!(component.attributes.is_empty());

    assert!(parse("<zvelte />").is_err());
    assert!(parse("<zvelte key=\"{{ foo }}\" />").is_err());
}

#[test]
fn test_mixed_attribute_value() {
    let Node::RegularElement(a) =
        only_node(parse("<a href=\"/users/{{ id }}/edit\"></a>").unwrap())
    else {
        panic!("expected a regular element");
    };
    let zvelte_parser::Attribute::Normal(href) = &a.attributes[0] else {
        panic!("expected a plain attribute");
    };
    let AttributeValue::Chunks(chunks) = &href.value else {
        panic!("expected chunks");
    };
    let shapes: Vec<_> = chunks
        .iter()
        .map(|chunk| match chunk {
            AttributeChunk::Text(text) => text.data.clone(),
            AttributeChunk::ExpressionTag(_) => "{{}}".to_string(),
        })
        .collect();
    assert_eq!(shapes, vec!["/users/", "{{}}", "/edit"]);
}

#[test]
fn test_parser_and_tree_are_send() {
    fn assert_send<T: Send>() {}
    assert_send::<zvelte_parser::Parser<'static>>();
    assert_send::<Root>();
}

#[test]
fn test_multibyte_offsets_are_bytes() {
    let source = "<p>héllo {{ name }}</p>";
    let Node::RegularElement(p) = only_node(parse(source).unwrap()) else {
        panic!("expected a regular element");
    };
    let Some(Node::ExpressionTag(tag)) = p.fragment.nodes.last() else {
        panic!("expected the expression last");
    };
    assert_eq!(tag.span.text(source), "{{ name }}");
    assert_eq!(tag.expression.span().text(source), "name");
}
