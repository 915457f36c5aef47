use stache::{json_template, render_json, Compiler, Options, Value};

use serde::Serialize;


#[derive(Serialize)]
struct User {
    name: &'static str,
    age: u32,
    tags: Vec<&'static str>,
}

#[test]
fn json_output() {
    let user = User { name: "Ann \"the\" admin", age: 41, tags: vec!["a", "b"] };
    let output = render_json(r#"{"who": {{name}}, "age": {{age}}, "tags": {{tags}}}"#, &user).unwrap();
    assert_eq!(output, r#"{"who": "Ann \"the\" admin", "age": 41, "tags": ["a","b"]}"#);
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["who"], "Ann \"the\" admin");
}

#[test]
fn json_output_fails_on_missing() {
    let user = User { name: "Ann", age: 41, tags: vec![] };
    let err = render_json("{{nickname}}", &user).unwrap_err();
    assert_eq!(err.to_string(), r#"missing variable "nickname""#);
}

#[test]
fn json_template_iterates() {
    let template = json_template(r#"[{{#items}}{{.}},{{/items}}null]"#).unwrap();
    let context = Value::map([("items", Value::seq(["x", "y"]))]);
    assert_eq!(template.render(&[context]).unwrap(), r#"["x","y",null]"#);
}

#[test]
fn compiler_from_yaml_options() {
    let options: Options = serde_yaml::from_str("escape_mode: json\n").unwrap();
    let template = Compiler::from_options(&options).compile_str(r#"{"s": "{{s}}"}"#).unwrap();
    let output = template.render(&[Value::map([("s", "a\"b\n")])]).unwrap();
    assert_eq!(output, r#"{"s": "a\"b\n"}"#);
}
