use std::fmt::{self, Write};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::error::BoxError;
use crate::value::Value;


/// Escaping applied to interpolated values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    /// Markup escaping, assumes the template produces HTML.
    #[default]
    Html,
    /// String-literal escaping, for templates producing JSON.
    Json,
    /// No escaping at all.
    Raw,
}

impl EscapeMode {
    pub fn escape(&self, out: &mut dyn Write, text: &str) -> fmt::Result {
        match self {
            EscapeMode::Html => html_escape(out, text),
            EscapeMode::Json => json_escape(out, text),
            EscapeMode::Raw => out.write_str(text)
        }
    }
}


/// Converts values to text before they are escaped.
pub type ValueStringer = Arc<dyn Fn(&Value) -> Result<String, BoxError> + Send + Sync>;

/// Stringifier writing values as JSON, so that `{{name}}` yields `"Mike"`.
pub fn json_stringer() -> ValueStringer {
    Arc::new(|value: &Value| -> Result<String, BoxError> {
        Ok(serde_json::to_string(value)?)
    })
}


pub fn html_escape(out: &mut dyn Write, text: &str) -> fmt::Result {
    let mut last = 0;
    for (i, c) in text.char_indices() {
        let entity = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&#39;",
            _ => continue
        };
        out.write_str(&text[last..i])?;
        out.write_str(entity)?;
        last = i + 1;
    }
    out.write_str(&text[last..])
}

/// Escapes `text` for the inside of a JSON string literal. Non-ASCII
/// characters other than controls are kept as they are.
pub fn json_escape(out: &mut dyn Write, text: &str) -> fmt::Result {
    for c in text.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\u{8}' => out.write_str("\\b")?,
            '\u{c}' => out.write_str("\\f")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if c.is_control() => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(mode: EscapeMode, text: &str) -> String {
        let mut out = String::new();
        mode.escape(&mut out, text).unwrap();
        out
    }

    #[test]
    fn html() {
        assert_eq!(escaped(EscapeMode::Html, "5 > 2"), "5 &gt; 2");
        assert_eq!(
            escaped(EscapeMode::Html, "& \" < > 'x'"),
            "&amp; &quot; &lt; &gt; &#39;x&#39;"
        );
        assert_eq!(escaped(EscapeMode::Html, "héllo 🦜"), "héllo 🦜");
    }

    #[test]
    fn json() {
        let cases = [
            ("'single quotes'", "'single quotes'"),
            ("\"double quotes\"", "\\\"double quotes\\\""),
            ("\\backslash\\", "\\\\backslash\\\\"),
            ("some\tcontrol\ncharacters\u{1c}\u{8}\u{c}\r", "some\\tcontrol\\ncharacters\\u001c\\b\\f\\r"),
            ("\u{7f}\u{85}", "\\u007f\\u0085"),
            ("🦜", "🦜"),
        ];
        for (before, after) in cases {
            assert_eq!(escaped(EscapeMode::Json, before), after);
        }
    }

    #[test]
    fn raw() {
        assert_eq!(escaped(EscapeMode::Raw, "<a href=\"\"> }o&o{"), "<a href=\"\"> }o&o{");
    }

    #[test]
    fn modes_from_config() {
        let mode: EscapeMode = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(mode, EscapeMode::Json);
        assert_eq!(serde_json::to_string(&EscapeMode::Raw).unwrap(), "\"raw\"");
    }

    #[test]
    fn json_stringer_quotes_strings() {
        let stringer = json_stringer();
        assert_eq!(stringer(&Value::from("hello")).unwrap(), "\"hello\"");
        assert_eq!(stringer(&Value::seq(["hello", "world"])).unwrap(), r#"["hello","world"]"#);
        assert_eq!(stringer(&Value::Null).unwrap(), "null");
        assert!(stringer(&Value::lambda(|_, _| Ok(String::new()))).is_err());
    }
}
