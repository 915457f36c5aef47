//! Mustache templates, compiled once and rendered against host data.
//!
//! A [Compiler] holds the configuration: partial provider, escaping,
//! stringification and strictness. It compiles source text into a
//! [Template], which renders against a list of context values searched
//! in order. Any [serde::Serialize] value, JSON or YAML document can be
//! turned into a [Value]; host objects with methods implement [Object].
//!
//! Sections handle sequences, records, mappings and lambdas. Lambdas
//! receive the unrendered source of their section together with a
//! callback rendering text against the current context.
//!
//!
//! # Samples
//!
//! ## Hello world
//!
//! ```
//! use stache::{Template, JsonValue, Value};
//!
//! let text = "hello, {{you}}!";
//! let data = r#"{
//!     "you": "world"
//! }"#;
//!
//! let template = Template::from(text).unwrap();
//! let context = Value::from(serde_json::from_str::<JsonValue>(data).unwrap());
//!
//! let result = template.render(&[context]).unwrap();
//!
//! assert_eq!(result, "hello, world!")
//! ```
//!
//! ## Hello team
//!
//! ```
//! use stache::{Template, YamlValue, Value};
//! let text = r#"
//!   {{#team}}
//!   hello, {{address}} {{name}}!
//!   {{/team}}
//! "#;
//! let data = r#"
//!   team:
//!     - name: john
//!       address: little
//!     - name: 42
//!       address: citizen
//! "#;
//!
//! let template = Template::from(text).unwrap();
//! let context = Value::from(serde_yaml::from_str::<YamlValue>(data).unwrap());
//!
//! let result = template.render(&[context]).unwrap();
//! assert_eq!(result, r#"
//!   hello, little john!
//!   hello, citizen 42!
//! "#);
//! ```
//!
//! ## Partials and lambdas
//!
//! ```
//! use stache::{Compiler, StaticProvider, Value};
//!
//! let compiler = Compiler::new()
//!     .with_partials(StaticProvider::new([("user", "<b>{{name}}</b>")]));
//! let template = compiler.compile_str("{{#users}}{{#shout}}{{>user}}{{/shout}} {{/users}}").unwrap();
//!
//! let data = Value::map([
//!     ("users", Value::seq([Value::map([("name", "ann")]), Value::map([("name", "bob")])])),
//!     ("shout", Value::lambda(|text, render| Ok(render(text)?.to_uppercase()))),
//! ]);
//!
//! assert_eq!(template.render(&[data]).unwrap(), "<B>ANN</B> <B>BOB</B> ");
//! ```
mod compiler;
mod context;
mod error;
mod escape;
mod json;
mod parser;
mod partials;
mod reader;
mod serialize;
mod tag;
mod template;
mod value;
mod yaml;

pub use self::compiler::{json_template, render_json, Compiler, Options, Stringifier};
pub use self::error::{BoxError, Error, Result, SyntaxError};
pub use self::escape::{html_escape, json_escape, json_stringer, EscapeMode, ValueStringer};
pub use self::json::JsonValue;
pub use self::partials::{FileProvider, PartialProvider, StaticProvider, UnsafePartialName};
pub use self::serialize::SerializeError;
pub use self::tag::{Tag, TagType};
pub use self::template::Template;
pub use self::value::{Lambda, Object, ObjectRepr, Record, RenderFn, Value};
pub use self::yaml::YamlValue;
