//! Markup tree produced by field renders
//!
//! Fields render into a small element tree rather than writing strings
//! directly, so hosts can post-process the result and tests can assert on
//! structure instead of scraping HTML. `Display` serializes the tree with
//! attribute and text escaping.

use std::fmt::{self, Display, Write as _};

/// A node of rendered field markup.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// Escaped text content.
    Text(String),
}

/// An element node.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Tag name, e.g. `"input"`.
    pub tag: String,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Node {
    /// Create an element node.
    pub fn element(tag: impl Into<String>) -> Self {
        Node::Element(Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    /// Set an attribute. No-op on text nodes.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Node::Element(el) = &mut self {
            el.attrs.push((name.into(), value.into()));
        }
        self
    }

    /// Set an attribute only when `value` is `Some`.
    pub fn attr_if(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    /// Shorthand for the `class` attribute.
    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    /// Append a child. No-op on text nodes.
    pub fn child(mut self, node: Node) -> Self {
        if let Node::Element(el) = &mut self {
            el.children.push(node);
        }
        self
    }

    /// Append children from an iterator.
    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        if let Node::Element(el) = &mut self {
            el.children.extend(nodes);
        }
        self
    }

    /// Depth-first collection of every element with the given tag.
    pub fn find_all(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_into(tag, &mut found);
        found
    }

    fn collect_into<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        if let Node::Element(el) = self {
            if el.tag == tag {
                found.push(el);
            }
            for child in &el.children {
                child.collect_into(tag, found);
            }
        }
    }
}

impl Element {
    /// Look up an attribute value by name.
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the element carries the attribute at all.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(attr, _)| attr == name)
    }
}

/// Elements serialized without a closing tag.
fn is_void(tag: &str) -> bool {
    matches!(tag, "input" | "br" | "hr" | "img" | "meta" | "link")
}

fn escape_into(out: &mut fmt::Formatter<'_>, raw: &str, escape_quotes: bool) -> fmt::Result {
    for c in raw.chars() {
        match c {
            '&' => out.write_str("&amp;")?,
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            '"' if escape_quotes => out.write_str("&quot;")?,
            '\'' if escape_quotes => out.write_str("&#39;")?,
            _ => out.write_char(c)?,
        }
    }
    Ok(())
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => escape_into(f, text, false),
            Node::Element(el) => {
                write!(f, "<{}", el.tag)?;
                for (name, value) in &el.attrs {
                    write!(f, " {}=\"", name)?;
                    escape_into(f, value, true)?;
                    f.write_char('"')?;
                }
                if is_void(&el.tag) {
                    return f.write_str(" />");
                }
                f.write_char('>')?;
                for child in &el.children {
                    child.fmt(f)?;
                }
                write!(f, "</{}>", el.tag)
            }
        }
    }
}
