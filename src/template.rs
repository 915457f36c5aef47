use std::fmt::{self, Write};
use std::io;
use crate::compiler::Compiler;
use crate::context::{indirect, is_empty, lookup, Chain};
use crate::error::{Error, Result};
use crate::parser::{Element, Parsed};
use crate::tag::{extract_tags, Tag};
use crate::value::{Lambda, ObjectRepr, Value};


/// A compiled template, rendered any number of times against host data.
///
/// Templates are immutable and can be shared between threads.
#[derive(Debug)]
pub struct Template {
    elements: Vec<Element>,
    open_delimiter: String,
    close_delimiter: String,
    compiler: Compiler,
}

impl Template {
    pub(crate) fn new(parsed: Parsed, compiler: Compiler) -> Self {
        Template {
            elements: parsed.elements,
            open_delimiter: parsed.open_delimiter,
            close_delimiter: parsed.close_delimiter,
            compiler
        }
    }

    /// Compiles `text` with the default configuration.
    pub fn from(text: &str) -> Result<Self> {
        Compiler::new().compile_str(text)
    }

    /// Top-level tags, in template order.
    pub fn tags(&self) -> Vec<Tag<'_>> {
        extract_tags(&self.elements)
    }

    /// Delimiters in effect at the end of the template.
    pub fn delimiters(&self) -> (&str, &str) {
        (&self.open_delimiter, &self.close_delimiter)
    }

    /// Renders against `contexts`, searched in order for every name.
    pub fn render(&self, contexts: &[Value]) -> Result<String> {
        let mut out = String::new();
        self.render_elements(&self.elements, &Chain::new(contexts), &mut out)?;
        Ok(out)
    }

    /// Renders into `out`. On error, whatever was rendered before the
    /// failure has already been written.
    pub fn render_to<W: io::Write>(&self, out: W, contexts: &[Value]) -> Result<()> {
        let mut writer = IoWriter { inner: out, error: None };
        let result = self.render_elements(&self.elements, &Chain::new(contexts), &mut writer);
        match writer.error.take() {
            Some(err) => Err(Error::Io(err)),
            None => result
        }
    }

    /// Renders this template, then `layout` with the result available as
    /// `content` in front of `contexts`.
    pub fn render_in_layout(&self, layout: &Template, contexts: &[Value]) -> Result<String> {
        layout.render(&self.layout_contexts(contexts)?)
    }

    pub fn render_in_layout_to<W: io::Write>(
        &self, out: W, layout: &Template, contexts: &[Value]
    ) -> Result<()> {
        layout.render_to(out, &self.layout_contexts(contexts)?)
    }

    fn layout_contexts(&self, contexts: &[Value]) -> Result<Vec<Value>> {
        let content = self.render(contexts)?;
        let mut all = Vec::with_capacity(contexts.len() + 1);
        all.push(Value::map([("content", content)]));
        all.extend_from_slice(contexts);
        Ok(all)
    }

    fn render_elements(
        &self, elements: &[Element], chain: &Chain, out: &mut dyn Write
    ) -> Result<()> {
        for element in elements {
            match element {
                Element::Text(text) => out.write_str(text)?,
                Element::Variable { name, raw } => {
                    self.render_variable(name, *raw, chain, out)?
                },
                Element::Section { name, inverted, children, .. } => {
                    self.render_section(name, *inverted, children, chain, out)?
                },
                Element::Partial { name, indent, .. } => {
                    self.render_partial(name, indent, chain, out)?
                }
            }
        }
        Ok(())
    }

    fn render_variable(
        &self, name: &str, raw: bool, chain: &Chain, out: &mut dyn Write
    ) -> Result<()> {
        let Some(value) = lookup(chain, name, self.compiler.error_on_missing)? else {
            return Ok(());
        };
        let text = self.stringify(&value)?;
        if raw {
            out.write_str(&text)?;
        } else {
            self.compiler.escape_mode.escape(out, &text)?;
        }
        Ok(())
    }

    fn stringify(&self, value: &Value) -> Result<String> {
        match &self.compiler.value_stringer {
            Some(stringer) => stringer(value).map_err(Error::Stringify),
            None => {
                let mut text = String::new();
                write!(text, "{value}")?;
                Ok(text)
            }
        }
    }

    fn render_section(
        &self, name: &str, inverted: bool, children: &[Element], chain: &Chain, out: &mut dyn Write
    ) -> Result<()> {
        let value = lookup(chain, name, self.compiler.error_on_missing)?;
        if is_empty(value.as_ref()) != inverted {
            return Ok(());
        }
        if inverted {
            return match chain.front() {
                Some(front) => self.render_elements(children, &chain.push(front), out),
                None => self.render_elements(children, chain, out)
            };
        }

        let value = value.unwrap_or_default();
        match indirect(&value) {
            Value::Seq(items) => {
                for item in items.iter() {
                    self.render_elements(children, &chain.push(item), out)?;
                }
                Ok(())
            },
            Value::Object(object) if object.repr() == ObjectRepr::Seq => {
                for item in &object.items() {
                    self.render_elements(children, &chain.push(item), out)?;
                }
                Ok(())
            },
            Value::Lambda(lambda) => self.render_lambda(name, &lambda, children, chain, out),
            _ => self.render_elements(children, &chain.push(&value), out)
        }
    }

    fn render_lambda(
        &self, name: &str, lambda: &Lambda, children: &[Element], chain: &Chain, out: &mut dyn Write
    ) -> Result<()> {
        let mut source = String::new();
        write_source(children, &mut source);
        let render = |text: &str| -> Result<String> {
            let template = self.compiler.compile_str(text)?;
            let mut rendered = String::new();
            template.render_elements(&template.elements, chain, &mut rendered)?;
            Ok(rendered)
        };
        log::trace!("calling lambda {name:?}");
        let result = lambda.call(&source, &render).map_err(Error::Lambda)?;
        out.write_str(&result)?;
        Ok(())
    }

    fn render_partial(
        &self, name: &str, indent: &str, chain: &Chain, out: &mut dyn Write
    ) -> Result<()> {
        let Some(provider) = &self.compiler.partials else {
            if self.compiler.error_on_missing {
                return Err(Error::NoPartialProvider(name.to_owned()));
            }
            log::warn!("no partial provider, skipping partial {name:?}");
            return Ok(());
        };

        log::trace!("fetching partial {name:?}");
        let template = provider.get(name)
            .map_err(|source| Error::Partial { name: name.to_owned(), source })
            .and_then(|text| self.compiler.compile_str(&indent_lines(&text, indent)));
        match template {
            Ok(template) => template.render_elements(&template.elements, chain, out),
            Err(err) if self.compiler.error_on_missing => Err(err),
            Err(err) => {
                log::warn!("skipping partial {name:?}: {err}");
                Ok(())
            }
        }
    }
}


// Prefixes every non-empty line
fn indent_lines(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_owned();
    }
    let mut result = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line != "\n" {
            result.push_str(indent);
        }
        result.push_str(line);
    }
    result
}

/// Writes back the template source of `elements`, as handed to lambdas.
fn write_source(elements: &[Element], out: &mut String) {
    for element in elements {
        match element {
            Element::Text(text) => out.push_str(text),
            Element::Variable { name, raw: true } => {
                out.push_str("{{&");
                out.push_str(name);
                out.push_str("}}");
            },
            Element::Variable { name, raw: false } => {
                out.push_str("{{");
                out.push_str(name);
                out.push_str("}}");
            },
            Element::Section { name, inverted, children, .. } => {
                out.push_str(if *inverted { "{{^" } else { "{{#" });
                out.push_str(name);
                out.push_str("}}");
                write_source(children, out);
                out.push_str("{{/");
                out.push_str(name);
                out.push_str("}}");
            },
            Element::Partial { name, indent, line_end } => {
                if line_end.is_some() {
                    out.push_str(indent);
                }
                out.push_str("{{>");
                out.push_str(name);
                out.push_str("}}");
                if let Some(line_end) = line_end {
                    out.push_str(line_end);
                }
            }
        }
    }
}


struct IoWriter<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> fmt::Write for IoWriter<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}
