use crate::error::{Error, Result, SyntaxError};
use crate::reader::{Reader, ReaderStringOps};


/// Node of a compiled template.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Element {
    Text(String),
    Variable {
        name: String,
        raw: bool
    },
    Section {
        name: String,
        inverted: bool,
        start_line: usize,
        children: Vec<Element>
    },
    /// `line_end` is the text a standalone partial tag consumed after
    /// itself, `None` for an inline partial.
    Partial {
        name: String,
        indent: String,
        line_end: Option<String>
    },
}


/// Result of a successful parse.
#[derive(Debug)]
pub(crate) struct Parsed {
    pub(crate) elements: Vec<Element>,
    pub(crate) open_delimiter: String,
    pub(crate) close_delimiter: String,
}


pub(crate) struct Parser<'a> {
    reader: Reader<'a>,
    force_raw: bool,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a str, force_raw: bool) -> Self {
        Parser {
            reader: Reader::new(input),
            force_raw
        }
    }

    pub(crate) fn parse(mut self) -> Result<Parsed> {
        let elements = self.parse_elements(None)?;
        let (od, cd) = self.reader.delimiters();
        Ok(Parsed {
            elements,
            open_delimiter: od.to_owned(),
            close_delimiter: cd.to_owned()
        })
    }

    /// Parses until end of input, or until the close tag of `section`
    /// (name and opening line) when one is open.
    fn parse_elements(&mut self, section: Option<(&str, usize)>) -> Result<Vec<Element>> {
        let mut elements = Vec::new();
        loop {
            let (text, found) = self.reader.read_text();
            push_text(&mut elements, text.text);
            if !found {
                return match section {
                    Some((name, line)) => Err(Error::parse(
                        line, SyntaxError::UnclosedSection(name.to_owned())
                    )),
                    None => Ok(elements)
                };
            }

            let tag = self.reader.read_tag(text.may_standalone)?;
            if !tag.standalone {
                push_text(&mut elements, text.padding);
            }

            let body = tag.body;
            match body.chars().next() {
                Some('!') => {},
                Some(c @ ('#' | '^')) => {
                    let name = body.trim_sigil();
                    let children = self.parse_elements(Some((name, tag.line)))?;
                    elements.push(Element::Section {
                        name: name.to_owned(),
                        inverted: c == '^',
                        start_line: tag.line,
                        children
                    });
                },
                Some('/') => {
                    let name = body.trim_sigil();
                    return match section {
                        Some((open, _)) if open == name => Ok(elements),
                        Some(_) => Err(Error::parse(
                            tag.line, SyntaxError::InterleavedClosingTag(name.to_owned())
                        )),
                        None => Err(Error::parse(tag.line, SyntaxError::UnmatchedCloseTag))
                    };
                },
                Some('>') => {
                    let indent = if tag.standalone { text.padding } else { "" };
                    elements.push(Element::Partial {
                        name: body.trim_sigil().to_owned(),
                        indent: indent.to_owned(),
                        line_end: tag.standalone.then(|| tag.line_end.to_owned())
                    });
                },
                Some('=') => {
                    let (od, cd) = parse_delimiters(body)
                        .ok_or_else(|| Error::parse(tag.line, SyntaxError::InvalidMetaTag))?;
                    self.reader.set_delimiters(od, cd);
                },
                Some('{') if body.len() > 1 && body.ends_with('}') => {
                    elements.push(Element::Variable {
                        name: body[1..body.len() - 1].trim().to_owned(),
                        raw: true
                    });
                },
                Some('&') => {
                    elements.push(Element::Variable {
                        name: body.trim_sigil().to_owned(),
                        raw: true
                    });
                },
                _ => {
                    elements.push(Element::Variable {
                        name: body.to_owned(),
                        raw: self.force_raw
                    });
                }
            }
        }
    }
}


fn push_text(elements: &mut Vec<Element>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Element::Text(last)) = elements.last_mut() {
        last.push_str(text);
    } else {
        elements.push(Element::Text(text.to_owned()));
    }
}

// `=NEWOPEN NEWCLOSE=`
fn parse_delimiters(body: &str) -> Option<(&str, &str)> {
    let inner = body.strip_prefix('=')?.strip_suffix('=')?;
    let words = inner.split_ascii_whitespace().collect::<Vec<_>>();
    match words[..] {
        [od, cd] if !od.contains('=') && !cd.contains('=') => Some((od, cd)),
        _ => None
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Vec<Element>> {
        Parser::new(input, false).parse().map(|parsed| parsed.elements)
    }

    fn text(t: &str) -> Element {
        Element::Text(t.to_owned())
    }

    fn var(name: &str, raw: bool) -> Element {
        Element::Variable { name: name.to_owned(), raw }
    }

    #[test]
    fn text_and_variables() {
        assert_eq!(
            parse("hello {{name}}, {{{raw}}} {{& amp }}!").unwrap(),
            vec![
                text("hello "),
                var("name", false),
                text(", "),
                var("raw", true),
                text(" "),
                var("amp", true),
                text("!")
            ]
        );
    }

    #[test]
    fn comment_is_dropped() {
        assert_eq!(
            parse("hello {{! comment }}world").unwrap(),
            vec![text("hello world")]
        );
    }

    #[test]
    fn nested_sections() {
        assert_eq!(
            parse("{{#a}}\n{{^b}}x{{/b}}\n{{/a}}\n").unwrap(),
            vec![
                Element::Section {
                    name: "a".to_owned(),
                    inverted: false,
                    start_line: 1,
                    children: vec![
                        Element::Section {
                            name: "b".to_owned(),
                            inverted: true,
                            start_line: 2,
                            children: vec![text("x")]
                        },
                        text("\n")
                    ]
                }
            ]
        );
    }

    #[test]
    fn standalone_partial_keeps_indent() {
        assert_eq!(
            parse("a\n  {{> item }}\nb").unwrap(),
            vec![
                text("a\n"),
                Element::Partial {
                    name: "item".to_owned(),
                    indent: "  ".to_owned(),
                    line_end: Some("\n".to_owned())
                },
                text("b")
            ]
        );
    }

    #[test]
    fn inline_partial_has_no_indent() {
        assert_eq!(
            parse("  {{>item}} x").unwrap(),
            vec![
                text("  "),
                Element::Partial { name: "item".to_owned(), indent: String::new(), line_end: None },
                text(" x")
            ]
        );
    }

    #[test]
    fn delimiters_change() {
        let parsed = Parser::new("{{ a }}{{=<% %>=}}<%b %><%={{ }}=%>{{ c }}{{=| |=}}", false)
            .parse()
            .unwrap();
        assert_eq!(parsed.elements, vec![var("a", false), var("b", false), var("c", false)]);
        assert_eq!((parsed.open_delimiter.as_str(), parsed.close_delimiter.as_str()), ("|", "|"));
    }

    #[test]
    fn delimiters_change_inside_section_is_not_restored() {
        assert_eq!(
            parse("{{#a}}{{=<% %>=}}<%x%><%/a%><%y%>").unwrap(),
            vec![
                Element::Section {
                    name: "a".to_owned(),
                    inverted: false,
                    start_line: 1,
                    children: vec![var("x", false)]
                },
                var("y", false)
            ]
        );
    }

    #[test]
    fn force_raw() {
        let parsed = Parser::new("{{a}}", true).parse().unwrap();
        assert_eq!(parsed.elements, vec![var("a", true)]);
    }

    #[test]
    fn errors() {
        let cases = [
            ("{{/}}", "line 1: unmatched close tag"),
            ("{{#A}}", "line 1: section A has no closing tag"),
            ("x\n{{#a}}{{}}{{/a}}", "line 2: empty tag"),
            ("{{}", "line 1: unmatched open tag"),
            ("{{", "line 1: unmatched open tag"),
            ("{{#a}}{{#b}}{{/a}}{{/b}}}", "line 1: interleaved closing tag: a"),
            ("{{=}}", "line 1: invalid meta tag"),
            ("{{= <% =}}", "line 1: invalid meta tag"),
            ("{{= |=   | =}}", "line 1: invalid meta tag"),
            ("{{#}}{{#}}{{#}}{{#}}{{#}}{{=}}", "line 1: invalid meta tag"),
            ("\n\n{{#s}}\n\n", "line 3: section s has no closing tag"),
        ];
        for (input, message) in cases {
            let err = parse(input).unwrap_err();
            assert_eq!(err.to_string(), message, "template {input:?}");
        }
    }
}
