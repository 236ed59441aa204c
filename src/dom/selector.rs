//! Selectors - A small CSS selector subset for `query_selector`.
//!
//! Supported: type (`li`), universal (`*`), `#id`, `.class`, `[attr]`,
//! `[attr=value]`, the descendant and child (`>`) combinators and
//! comma-separated groups.

use super::document::{self, Document};
use super::node::Node;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

/// A compound selector with the combinator linking it to the previous one.
#[derive(Debug, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SelectorList {
    selectors: Vec<Complex>,
}

// =============================================================================
// Parsing
// =============================================================================

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, chars: input.chars().collect(), pos: 0 }
    }

    fn error(&self) -> Error {
        Error::InvalidSelector(self.input.to_string())
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Skip whitespace; true if any was skipped.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.peek() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn ident(&mut self) -> Result<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.bump();
        }
        if self.pos == start {
            return Err(self.error());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attr_value(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.bump();
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.expect(quote)?;
                Ok(value)
            }
            _ => self.ident(),
        }
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let mut any = false;

        match self.peek() {
            Some('*') => {
                self.bump();
                any = true;
            }
            Some(c) if c.is_alphabetic() => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
                any = true;
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.bump();
                    self.skip_ws();
                    let name = self.ident()?;
                    self.skip_ws();
                    let value = if self.peek() == Some('=') {
                        self.bump();
                        self.skip_ws();
                        Some(self.attr_value()?)
                    } else {
                        None
                    };
                    self.skip_ws();
                    self.expect(']')?;
                    compound.attrs.push((name, value));
                }
                _ => break,
            }
            any = true;
        }

        if any { Ok(compound) } else { Err(self.error()) }
    }

    fn complex(&mut self) -> Result<Complex> {
        let mut parts = vec![(Combinator::Descendant, self.compound()?)];
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    parts.push((Combinator::Child, self.compound()?));
                }
                Some(_) if had_ws => parts.push((Combinator::Descendant, self.compound()?)),
                Some(_) => return Err(self.error()),
            }
        }
        Ok(Complex { parts })
    }
}

impl SelectorList {
    pub(crate) fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser::new(input);
        let mut selectors = Vec::new();
        loop {
            parser.skip_ws();
            selectors.push(parser.complex()?);
            match parser.peek() {
                None => break,
                Some(',') => parser.bump(),
                Some(_) => return Err(parser.error()),
            }
        }
        Ok(Self { selectors })
    }

    fn matches(&self, doc: &Document, node: Node) -> bool {
        self.selectors.iter().any(|selector| selector.matches(doc, node))
    }
}

// =============================================================================
// Matching
// =============================================================================

impl Compound {
    fn matches(&self, doc: &Document, node: Node) -> bool {
        let Some(data) = doc.get(node) else { return false };
        let Some(tag) = data.tag() else { return false };

        if self.tag.as_deref().is_some_and(|wanted| wanted != tag) {
            return false;
        }
        if let Some(id) = &self.id {
            if data.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class = data.attribute("class").unwrap_or_default();
            let tokens = class.split_ascii_whitespace();
            if !self.classes.iter().all(|wanted| tokens.clone().any(|t| t == wanted)) {
                return false;
            }
        }
        self.attrs.iter().all(|(name, value)| match (data.attribute(name), value) {
            (Some(_), None) => true,
            (Some(actual), Some(wanted)) => actual == wanted,
            (None, _) => false,
        })
    }
}

impl Complex {
    fn matches(&self, doc: &Document, node: Node) -> bool {
        self.matches_from(doc, node, self.parts.len() - 1)
    }

    fn matches_from(&self, doc: &Document, node: Node, index: usize) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(doc, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        let parent_of = |n: Node| doc.get(n).and_then(|data| data.parent);
        match combinator {
            Combinator::Child => {
                parent_of(node).is_some_and(|parent| self.matches_from(doc, parent, index - 1))
            }
            Combinator::Descendant => {
                let mut current = parent_of(node);
                while let Some(ancestor) = current {
                    if self.matches_from(doc, ancestor, index - 1) {
                        return true;
                    }
                    current = parent_of(ancestor);
                }
                false
            }
        }
    }
}

impl Node {
    /// Whether this element matches `selector`.
    pub fn matches(&self, selector: &str) -> Result<bool> {
        let selectors = SelectorList::parse(selector)?;
        Ok(document::with(|doc| selectors.matches(doc, *self)))
    }

    /// First descendant element matching `selector`, in document order.
    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// Every descendant element matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        let selectors = SelectorList::parse(selector)?;
        let candidates = self.descendants();
        Ok(document::with(|doc| {
            candidates
                .into_iter()
                .filter(|node| selectors.matches(doc, *node))
                .collect()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::document::{create_element, reset_document};

    fn tree() -> (Node, Node, Node, Node) {
        let div = create_element("div").unwrap();
        let ol = create_element("ol").unwrap();
        let first = create_element("li").unwrap();
        let second = create_element("li").unwrap();
        first.set_attribute("class", "todo-item done").unwrap();
        second.set_attribute("class", "todo-item").unwrap();
        second.set_id("eggs");
        second.set_attribute("data-kind", "food").unwrap();
        ol.append(first).unwrap();
        ol.append(second).unwrap();
        div.append(ol).unwrap();
        (div, ol, first, second)
    }

    #[test]
    fn test_simple_selectors() {
        reset_document();
        let (div, ol, first, second) = tree();

        assert_eq!(div.query_selector("ol").unwrap(), Some(ol));
        assert_eq!(div.query_selector_all("li").unwrap(), vec![first, second]);
        assert_eq!(div.query_selector_all(".done").unwrap(), vec![first]);
        assert_eq!(div.query_selector("#eggs").unwrap(), Some(second));
        assert_eq!(div.query_selector("[data-kind]").unwrap(), Some(second));
        assert_eq!(div.query_selector("[data-kind='food']").unwrap(), Some(second));
        assert_eq!(div.query_selector("[data-kind=drink]").unwrap(), None);
        assert_eq!(div.query_selector_all("*").unwrap().len(), 3);
    }

    #[test]
    fn test_compound_and_combinators() {
        reset_document();
        let (div, _ol, first, second) = tree();

        assert_eq!(div.query_selector_all("li.todo-item.done").unwrap(), vec![first]);
        assert_eq!(div.query_selector_all("div li").unwrap(), vec![first, second]);
        assert_eq!(div.query_selector_all("div > li").unwrap(), Vec::<Node>::new());
        assert_eq!(div.query_selector_all("ol > li#eggs").unwrap(), vec![second]);
        assert_eq!(div.query_selector_all(".done, #eggs").unwrap(), vec![first, second]);
        assert!(first.matches("ol .todo-item").unwrap());
    }

    #[test]
    fn test_invalid_selectors() {
        reset_document();
        let (div, ..) = tree();

        for bad in ["", ".", "li >", "[x", "li,,", "#"] {
            assert!(
                matches!(div.query_selector(bad), Err(Error::InvalidSelector(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
