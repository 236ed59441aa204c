//! Class list - Token set view over an element's `class` attribute.

use super::node::Node;
use crate::error::{Error, Result};

/// Live view of the class tokens of one element. Reads and writes go straight
/// to the `class` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassList {
    node: Node,
}

fn validate(token: &str) -> Result<()> {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(Error::InvalidToken(token.to_string()));
    }
    Ok(())
}

impl ClassList {
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        for token in self.node.class_name().split_ascii_whitespace() {
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }
        tokens
    }

    fn store(&self, tokens: &[String]) {
        self.node.set_class_name(&tokens.join(" "));
    }

    pub fn len(&self) -> usize {
        self.tokens().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens().is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.node
            .class_name()
            .split_ascii_whitespace()
            .any(|t| t == token)
    }

    pub fn add(&self, token: &str) -> Result<()> {
        validate(token)?;
        let mut tokens = self.tokens();
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
            self.store(&tokens);
        }
        Ok(())
    }

    pub fn remove(&self, token: &str) -> Result<()> {
        validate(token)?;
        let mut tokens = self.tokens();
        let before = tokens.len();
        tokens.retain(|t| t != token);
        if tokens.len() != before {
            self.store(&tokens);
        }
        Ok(())
    }

    /// Flip `token`; returns whether it is present afterwards.
    pub fn toggle(&self, token: &str) -> Result<bool> {
        let present = !self.contains(token);
        self.toggle_force(token, present)
    }

    /// Add `token` when `force` is true, remove it otherwise. Returns `force`.
    pub fn toggle_force(&self, token: &str, force: bool) -> Result<bool> {
        if force {
            self.add(token)?;
        } else {
            self.remove(token)?;
        }
        Ok(force)
    }
}

impl Node {
    pub fn class_list(&self) -> ClassList {
        ClassList { node: *self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::document::{create_element, reset_document};

    #[test]
    fn test_add_remove_contains() {
        reset_document();

        let li = create_element("li").unwrap();
        let classes = li.class_list();
        assert!(classes.is_empty());

        classes.add("todo-item").unwrap();
        classes.add("done").unwrap();
        classes.add("done").unwrap();
        assert_eq!(li.class_name(), "todo-item done");
        assert!(classes.contains("done"));
        assert_eq!(classes.len(), 2);

        classes.remove("todo-item").unwrap();
        assert_eq!(li.class_name(), "done");
    }

    #[test]
    fn test_toggle() {
        reset_document();

        let li = create_element("li").unwrap();
        let classes = li.class_list();

        assert!(classes.toggle("done").unwrap());
        assert!(!classes.toggle("done").unwrap());
        assert!(classes.toggle_force("done", true).unwrap());
        assert!(classes.toggle_force("done", true).unwrap());
        assert_eq!(classes.tokens(), vec!["done".to_string()]);
        assert!(!classes.toggle_force("done", false).unwrap());
        assert!(!classes.contains("done"));
    }

    #[test]
    fn test_reads_existing_attribute() {
        reset_document();

        let li = create_element("li").unwrap();
        li.set_attribute("class", "  a   b a ").unwrap();
        assert_eq!(li.class_list().tokens(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_invalid_tokens() {
        reset_document();

        let li = create_element("li").unwrap();
        assert!(matches!(li.class_list().add(""), Err(Error::InvalidToken(_))));
        assert!(matches!(li.class_list().toggle("two words"), Err(Error::InvalidToken(_))));
    }
}
