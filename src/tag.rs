use std::fmt;
use crate::parser::Element;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
    Variable,
    Section,
    InvertedSection,
    Partial,
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TagType::Variable => "Variable",
            TagType::Section => "Section",
            TagType::InvertedSection => "InvertedSection",
            TagType::Partial => "Partial"
        })
    }
}


/// Read-only view of a tag of a compiled template.
#[derive(Clone, Copy)]
pub struct Tag<'t> {
    element: &'t Element,
}

impl<'t> Tag<'t> {
    pub fn kind(&self) -> TagType {
        match self.element {
            Element::Variable { .. } => TagType::Variable,
            Element::Section { inverted: false, .. } => TagType::Section,
            Element::Section { inverted: true, .. } => TagType::InvertedSection,
            _ => TagType::Partial
        }
    }

    pub fn name(&self) -> &'t str {
        match self.element {
            Element::Variable { name, .. }
            | Element::Section { name, .. }
            | Element::Partial { name, .. } => name,
            Element::Text(_) => ""
        }
    }

    /// Line of the open tag, for sections.
    pub fn line(&self) -> Option<usize> {
        match self.element {
            Element::Section { start_line, .. } => Some(*start_line),
            _ => None
        }
    }

    /// Tags directly nested in a section, none for other kinds.
    pub fn tags(&self) -> Vec<Tag<'t>> {
        match self.element {
            Element::Section { children, .. } => extract_tags(children),
            _ => Vec::new()
        }
    }
}

impl fmt::Debug for Tag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

pub(crate) fn extract_tags(elements: &[Element]) -> Vec<Tag<'_>> {
    elements.iter()
        .filter(|element| !matches!(element, Element::Text(_)))
        .map(|element| Tag { element })
        .collect()
}
