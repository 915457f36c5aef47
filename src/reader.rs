use crate::error::{Error, Result, SyntaxError};


pub(crate) const DEFAULT_OPEN: &str = "{{";
pub(crate) const DEFAULT_CLOSE: &str = "}}";

/// Sigils of the tags allowed to stand alone on a line.
static STANDALONE_SIGILS: &str = "!#^/>=";


/// Cursor over template source.
///
/// The delimiters borrow from the input itself once a delimiter-change tag
/// has been read, so the reader never allocates.
#[derive(Clone, Debug)]
pub(crate) struct Reader<'a> {
    input: &'a str,
    open_delimiter: &'a str,
    close_delimiter: &'a str,
    pos: usize,
    line: usize,
}


/// Text read up to the next open delimiter.
///
/// When the open delimiter is preceded only by spaces and tabs since the
/// start of its line, that run is split off as `padding` and the tag
/// may be standalone.
#[derive(PartialEq, Debug)]
pub(crate) struct Text<'a> {
    pub(crate) text: &'a str,
    pub(crate) padding: &'a str,
    pub(crate) may_standalone: bool,
}

#[derive(PartialEq, Debug)]
pub(crate) struct RawTag<'a> {
    pub(crate) body: &'a str,
    pub(crate) standalone: bool,
    pub(crate) line: usize,
    /// Trailing spaces and line break consumed by a standalone tag.
    pub(crate) line_end: &'a str,
}


impl<'a> Reader<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Reader {
            input,
            open_delimiter: DEFAULT_OPEN,
            close_delimiter: DEFAULT_CLOSE,
            pos: 0,
            line: 1,
        }
    }

    pub(crate) fn delimiters(&self) -> (&'a str, &'a str) {
        (self.open_delimiter, self.close_delimiter)
    }

    pub(crate) fn set_delimiters(&mut self, od: &'a str, cd: &'a str) {
        self.open_delimiter = od;
        self.close_delimiter = cd;
    }

    /// Consumes input up to and including `delimiter`, returning the text
    /// in front of it. When the delimiter is missing the rest of the input
    /// is consumed and `false` is returned.
    pub(crate) fn read_until(&mut self, delimiter: &str) -> (&'a str, bool) {
        let tail = &self.input[self.pos..];
        match tail.find(delimiter) {
            Some(p) => {
                self.advance(p + delimiter.len());
                (&tail[..p], true)
            },
            None => {
                self.advance(tail.len());
                (tail, false)
            }
        }
    }

    /// Reads text up to the next open delimiter. The flag is `false` once
    /// the input is exhausted, in which case `text` holds the remainder.
    pub(crate) fn read_text(&mut self) -> (Text<'a>, bool) {
        let start = self.pos;
        let (text, found) = self.read_until(self.open_delimiter);
        if !found {
            return (Text { text, padding: "", may_standalone: false }, false);
        }
        let trimmed = text.trim_end_matches([' ', '\t']);
        let line_start = start + trimmed.len();
        let may_standalone = line_start == 0
            || self.input[..line_start].ends_with('\n');
        let text = if may_standalone {
            Text {
                text: trimmed,
                padding: &text[trimmed.len()..],
                may_standalone
            }
        } else {
            Text { text, padding: "", may_standalone }
        };
        (text, true)
    }

    /// Reads a tag body after its open delimiter has been consumed.
    ///
    /// A standalone tag also consumes the trailing spaces and line break.
    pub(crate) fn read_tag(&mut self, may_standalone: bool) -> Result<RawTag<'a>> {
        let open_line = self.line;
        let start = self.pos;
        let (raw, found) = if self.input[start..].starts_with('{') {
            let close = format!("}}{}", self.close_delimiter);
            let (text, found) = self.read_until(&close);
            // keep the closing brace so the parser sees `{name}`
            let end = if found { start + text.len() + 1 } else { start + text.len() };
            (&self.input[start..end], found)
        } else {
            self.read_until(self.close_delimiter)
        };
        if !found {
            return Err(Error::parse(open_line, SyntaxError::UnmatchedOpenTag));
        }

        let body = raw.trim();
        if body.is_empty() {
            return Err(Error::parse(self.line, SyntaxError::EmptyTag));
        }

        let line = self.line;
        let trailing = if may_standalone && body.is_standalone_sigil() {
            self.input[self.pos..].line_end()
        } else {
            None
        };
        let line_end = match trailing {
            Some(len) => {
                let input = self.input;
                let consumed = &input[self.pos..self.pos + len];
                self.advance(len);
                consumed
            },
            None => ""
        };
        Ok(RawTag { body, standalone: trailing.is_some(), line, line_end })
    }

    fn advance(&mut self, len: usize) {
        let consumed = &self.input[self.pos..self.pos + len];
        self.line += consumed.matches('\n').count();
        self.pos += len;
    }
}


pub(crate) trait ReaderStringOps {
    fn is_standalone_sigil(&self) -> bool;
    fn trim_sigil(&self) -> &str;
    fn line_end(&self) -> Option<usize>;
}

impl ReaderStringOps for str {
    fn is_standalone_sigil(&self) -> bool {
        self.chars().next().is_some_and(|c| STANDALONE_SIGILS.contains(c))
    }

    fn trim_sigil(&self) -> &str {
        let mut chars = self.chars();
        chars.next();
        chars.as_str().trim()
    }

    // length of the spaces and tabs leading to end of input, `\n` or `\r\n`
    fn line_end(&self) -> Option<usize> {
        let rest = self.trim_start_matches([' ', '\t']);
        let spaces = self.len() - rest.len();
        if rest.is_empty() {
            Some(spaces)
        } else if rest.starts_with('\n') {
            Some(spaces + 1)
        } else if rest.starts_with("\r\n") {
            Some(spaces + 2)
        } else {
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_only() {
        let mut reader = Reader::new(" 123456 ");
        let (text, found) = reader.read_text();
        assert!(!found);
        assert_eq!(text.text, " 123456 ");
        assert_eq!(text.padding, "");
    }

    #[test]
    fn read_until_counts_lines() {
        let mut reader = Reader::new("a\nb\nc{{x}}");
        assert_eq!(reader.read_until("{{"), ("a\nb\nc", true));
        assert_eq!(reader.line, 3);
        assert_eq!(reader.read_until("??"), ("x}}", false));
    }

    #[test]
    fn standalone_single_is_trimed() {
        let mut reader = Reader::new("x\n   {{/a}}  \ny");
        let (text, found) = reader.read_text();
        assert!(found);
        assert_eq!(text, Text { text: "x\n", padding: "   ", may_standalone: true });
        let tag = reader.read_tag(text.may_standalone).unwrap();
        assert_eq!(tag, RawTag { body: "/a", standalone: true, line: 2, line_end: "  \n" });
        assert_eq!(reader.line, 3);
        assert_eq!(reader.read_text().0.text, "y");
    }

    #[test]
    fn standalone_crlf_is_trimed() {
        let mut reader = Reader::new("{{! note }}\r\nrest");
        let (text, _) = reader.read_text();
        let tag = reader.read_tag(text.may_standalone).unwrap();
        assert!(tag.standalone);
        assert_eq!(tag.line_end, "\r\n");
        assert_eq!(reader.read_text().0.text, "rest");
    }

    #[test]
    fn standalone_at_end_of_input() {
        let mut reader = Reader::new("a\n  {{#s}}  ");
        let (text, _) = reader.read_text();
        let tag = reader.read_tag(text.may_standalone).unwrap();
        assert!(tag.standalone);
        assert_eq!(reader.read_text(), (Text { text: "", padding: "", may_standalone: false }, false));
    }

    #[test]
    fn variable_is_never_standalone() {
        let mut reader = Reader::new("  {{name}}\n");
        let (text, _) = reader.read_text();
        assert!(text.may_standalone);
        let tag = reader.read_tag(text.may_standalone).unwrap();
        assert!(!tag.standalone);
        assert_eq!(reader.read_text().0.text, "\n");
    }

    #[test]
    fn tags_on_same_line_are_not_standalone() {
        let mut reader = Reader::new("{{#a}}{{/a}}\n");
        let (text, _) = reader.read_text();
        assert!(text.may_standalone);
        assert!(!reader.read_tag(text.may_standalone).unwrap().standalone);
        let (text, _) = reader.read_text();
        assert!(!text.may_standalone);
        assert!(!reader.read_tag(text.may_standalone).unwrap().standalone);
    }

    #[test]
    fn text_before_tag_prevents_standalone() {
        let mut reader = Reader::new("x {{#a}}\n");
        let (text, _) = reader.read_text();
        assert_eq!(text, Text { text: "x ", padding: "", may_standalone: false });
    }

    #[test]
    fn triple_mustache_keeps_braces() {
        let mut reader = Reader::new("{{{ v }}}");
        reader.read_text();
        assert_eq!(reader.read_tag(false).unwrap().body, "{ v }");
    }

    #[test]
    fn body_is_trimed() {
        let mut reader = Reader::new("{{ # a }}");
        reader.read_text();
        let tag = reader.read_tag(false).unwrap();
        assert_eq!(tag.body, "# a");
        assert_eq!(tag.body.trim_sigil(), "a");
    }

    #[test]
    fn alternate_delimiters() {
        let mut reader = Reader::new("{{x}}<%y%>");
        reader.set_delimiters("<%", "%>");
        let (text, _) = reader.read_text();
        assert_eq!(text.text, "{{x}}");
        assert_eq!(reader.read_tag(false).unwrap().body, "y");
        assert_eq!(reader.delimiters(), ("<%", "%>"));
    }

    #[test]
    fn missing_close_delimiter() {
        let mut reader = Reader::new("line\n{{ name ");
        reader.read_text();
        let err = reader.read_tag(false).unwrap_err();
        assert_eq!(err.to_string(), "line 2: unmatched open tag");
    }

    #[test]
    fn empty_tag() {
        let mut reader = Reader::new("{{  }}");
        reader.read_text();
        let err = reader.read_tag(false).unwrap_err();
        assert_eq!(err.syntax(), Some(&SyntaxError::EmptyTag));
    }

    #[test]
    fn line_end() {
        assert_eq!("  \n".line_end(), Some(3));
        assert_eq!("\t\r\nx".line_end(), Some(3));
        assert_eq!("   ".line_end(), Some(3));
        assert_eq!(" x\n".line_end(), None);
        assert_eq!(" \r".line_end(), None);
    }
}
