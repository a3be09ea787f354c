//! JSON output of the AST.
#![cfg(feature = "serde")]

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use zvelte_parser::parse;

fn to_json(source: &str) -> Value {
    serde_json::to_value(parse(source).unwrap()).unwrap()
}

#[test]
fn test_root_shape() {
    let value = to_json("<p>hi</p>");
    assert_eq!(value["type"], "Root");
    assert_eq!(value["start"], 0);
    assert_eq!(value["end"], 9);
    assert_eq!(value["css"], Value::Null);
    assert_eq!(value["imports"], json!([]));
    assert_eq!(value["fragment"]["type"], "Fragment");
    assert_eq!(value["fragment"]["transparent"], false);
}

#[test]
fn test_element_with_attributes() {
    let value = to_json("<input disabled value=\"a{{ b }}\" bind:checked type=\"checkbox\">");
    let input = &value["fragment"]["nodes"][0];
    assert_eq!(input["type"], "RegularElement");
    assert_eq!(input["name"], "input");

    let attributes = input["attributes"].as_array().unwrap();
    assert_eq!(
        attributes[0],
        json!({ "type": "Attribute", "start": 7, "end": 15, "name": "disabled", "value": true })
    );
    assert_eq!(attributes[1]["value"][0], json!({ "type": "Text", "start": 23, "end": 24, "data": "a" }));
    assert_eq!(attributes[1]["value"][1]["type"], "ExpressionTag");
    assert_eq!(attributes[2]["type"], "BindDirective");
}

#[test]
fn test_expression_shape() {
    let value = to_json("{{ count + 1 }}");
    let expression = &value["fragment"]["nodes"][0]["expression"];
    assert_eq!(expression["type"], "BinaryExpression");
    assert_eq!(expression["left"], json!({ "type": "Identifier", "start": 3, "end": 8, "name": "count" }));
    assert_eq!(expression["right"]["type"], "NumericLiteral");
    assert_eq!(expression["right"]["raw"], "1");
}

#[test]
fn test_imports_shape() {
    let value = to_json("<script>import A, { b as c } from 'x';</script>");
    let import = &value["imports"][0];
    assert_eq!(import["type"], "Import");
    assert_eq!(import["source"]["value"], "x");
    assert_eq!(import["specifiers"][0]["type"], "Default");
    assert_eq!(import["specifiers"][1]["type"], "Named");
    assert_eq!(import["specifiers"][1]["imported"]["name"], "b");
    assert_eq!(import["specifiers"][1]["local"]["name"], "c");
    assert_eq!(value["js"]["content"], "import A, { b as c } from 'x';");
}
