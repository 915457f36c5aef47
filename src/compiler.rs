use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::escape::{json_stringer, EscapeMode, ValueStringer};
use crate::parser::Parser;
use crate::partials::PartialProvider;
use crate::template::Template;
use crate::value::Value;


/// Compiles templates with a given configuration.
///
/// Every template compiled at render time, for partials and lambdas,
/// inherits the configuration of the template that triggered it.
#[derive(Clone, Default)]
pub struct Compiler {
    pub(crate) partials: Option<Arc<dyn PartialProvider>>,
    pub(crate) escape_mode: EscapeMode,
    pub(crate) value_stringer: Option<ValueStringer>,
    pub(crate) error_on_missing: bool,
}


/// Stringifiers that can be named in [Options].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stringifier {
    #[default]
    Default,
    Json,
}

/// Serializable compiler configuration.
///
/// ```
/// use stache::{Compiler, EscapeMode, Options};
///
/// let options: Options = serde_yaml::from_str("escape_mode: json\nerror_on_missing: true").unwrap();
/// assert_eq!(options.escape_mode, EscapeMode::Json);
/// let compiler = Compiler::from_options(&options);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub escape_mode: EscapeMode,
    pub stringifier: Stringifier,
    pub error_on_missing: bool,
}


impl Compiler {
    pub fn new() -> Self {
        Compiler::default()
    }

    pub fn from_options(options: &Options) -> Self {
        let compiler = Compiler::new()
            .with_escape_mode(options.escape_mode)
            .with_errors(options.error_on_missing);
        match options.stringifier {
            Stringifier::Default => compiler,
            Stringifier::Json => compiler.with_value_stringer(json_stringer())
        }
    }

    /// Enables partials, fetched from `provider` every time they are rendered.
    pub fn with_partials<P: PartialProvider + 'static>(mut self, provider: P) -> Self {
        self.partials = Some(Arc::new(provider));
        self
    }

    pub fn with_value_stringer(mut self, stringer: ValueStringer) -> Self {
        self.value_stringer = Some(stringer);
        self
    }

    /// Defaults to [EscapeMode::Html].
    pub fn with_escape_mode(mut self, mode: EscapeMode) -> Self {
        self.escape_mode = mode;
        self
    }

    /// Makes missing variables, missing or failing partials, and a missing
    /// partial provider errors. Otherwise they render as nothing.
    pub fn with_errors(mut self, enabled: bool) -> Self {
        self.error_on_missing = enabled;
        self
    }

    pub fn compile_str(&self, text: &str) -> Result<Template> {
        let parsed = Parser::new(text, self.escape_mode == EscapeMode::Raw).parse()?;
        log::debug!(
            "compiled template: {} elements, delimiters {} {}",
            parsed.elements.len(), parsed.open_delimiter, parsed.close_delimiter
        );
        Ok(Template::new(parsed, self.clone()))
    }

    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<Template> {
        let text = fs::read_to_string(path)?;
        self.compile_str(&text)
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("partials", &self.partials.is_some())
            .field("escape_mode", &self.escape_mode)
            .field("value_stringer", &self.value_stringer.is_some())
            .field("error_on_missing", &self.error_on_missing)
            .finish()
    }
}


/// Compiles a template producing JSON: values are written as JSON and
/// nothing is escaped.
pub fn json_template(text: &str) -> Result<Template> {
    Compiler::new()
        .with_escape_mode(EscapeMode::Raw)
        .with_value_stringer(json_stringer())
        .compile_str(text)
}

/// Renders a JSON template against `data`, failing on missing variables.
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: &'static str, age: u32 }
///
/// let json = stache::render_json(r#"{"name": {{name}}, "age": {{age}}}"#, &User { name: "Alice", age: 25 });
/// assert_eq!(json.unwrap(), r#"{"name": "Alice", "age": 25}"#);
/// ```
pub fn render_json<T: Serialize + ?Sized>(text: &str, data: &T) -> Result<String> {
    let template = Compiler::new()
        .with_escape_mode(EscapeMode::Raw)
        .with_value_stringer(json_stringer())
        .with_errors(true)
        .compile_str(text)?;
    template.render(&[Value::from_serialize(data)?])
}
