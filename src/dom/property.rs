//! Live properties an element exposes beside its attributes.

use super::node::Node;
use super::traits::ElementTraits;
use super::value::Value;
use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Property {
    Hidden,
    Value,
    Id,
    Title,
    ClassName,
    TabIndex,
    ContentEditable,
    Spellcheck,
    Disabled,
    InnerText,
    TextContent,
    /// `on<event>` handler slot; holds the event type.
    Handler(String),
}

impl Property {
    pub(crate) fn resolve(name: &str, traits: ElementTraits) -> Option<Self> {
        let form_control = traits.contains(ElementTraits::FORM_CONTROL);
        let property = match name {
            "hidden" => Self::Hidden,
            "value" if form_control => Self::Value,
            "id" => Self::Id,
            "title" => Self::Title,
            "className" => Self::ClassName,
            "tabIndex" => Self::TabIndex,
            "contentEditable" => Self::ContentEditable,
            "spellcheck" => Self::Spellcheck,
            "disabled" if form_control => Self::Disabled,
            "innerText" => Self::InnerText,
            "textContent" => Self::TextContent,
            _ => {
                let event = name.strip_prefix("on")?;
                if event.is_empty() || !event.chars().all(|c| c.is_ascii_lowercase()) {
                    return None;
                }
                Self::Handler(event.to_string())
            }
        };
        Some(property)
    }

    pub(crate) fn check(&self, name: &str, value: &Value) -> Result<()> {
        let mismatch = |expected| Error::PropertyType { name: name.to_string(), expected };
        match (self, value) {
            (Self::Hidden | Self::Spellcheck | Self::Disabled, Value::Bool(_)) => Ok(()),
            (Self::Hidden | Self::Spellcheck | Self::Disabled, _) => Err(mismatch("a boolean")),
            (
                Self::Value | Self::Id | Self::Title | Self::ClassName | Self::InnerText | Self::TextContent,
                Value::Str(_) | Value::Int(_),
            ) => Ok(()),
            (Self::Value | Self::Id | Self::Title | Self::ClassName | Self::InnerText | Self::TextContent, _) => {
                Err(mismatch("a string"))
            }
            (Self::TabIndex, Value::Int(i)) if i32::try_from(*i).is_ok() => Ok(()),
            (Self::TabIndex, _) => Err(mismatch("a 32-bit integer")),
            (Self::ContentEditable, Value::Bool(_) | Value::Str(_)) => Ok(()),
            (Self::ContentEditable, _) => Err(mismatch("a boolean or string")),
            (Self::Handler(_), Value::Handler(_)) => Ok(()),
            (Self::Handler(_), _) => Err(mismatch("an event handler")),
        }
    }

    /// Assign an already checked value.
    pub(crate) fn apply(&self, node: Node, value: Value) {
        let text = || value.to_attribute_string().unwrap_or_default();
        match self {
            Self::Hidden => node.set_hidden(value.as_bool().unwrap_or_default()),
            Self::Value => node.set_value(&text()),
            Self::Id => node.set_id(&text()),
            Self::Title => node.set_title(&text()),
            Self::ClassName => node.set_class_name(&text()),
            Self::TabIndex => {
                let index = value.as_int().and_then(|i| i32::try_from(i).ok()).unwrap_or(-1);
                node.set_tab_index(index);
            }
            Self::ContentEditable => match &value {
                Value::Bool(editable) => node.set_content_editable(*editable),
                other => {
                    let raw = other.to_attribute_string().unwrap_or_default();
                    node.write(|data| data.set_attribute("contenteditable", &raw));
                }
            },
            Self::Spellcheck => node.set_spellcheck(value.as_bool().unwrap_or(true)),
            Self::Disabled => node.set_disabled(value.as_bool().unwrap_or_default()),
            Self::InnerText | Self::TextContent => node.set_inner_text(&text()),
            Self::Handler(event) => {
                if let Some(handler) = value.as_handler().cloned() {
                    node.write(|data| {
                        match data.handler_props.iter_mut().find(|(name, _)| name == event) {
                            Some((_, slot)) => *slot = handler,
                            None => data.handler_props.push((event.clone(), handler)),
                        }
                    });
                }
            }
        }
    }

    pub(crate) fn read(&self, node: Node) -> Option<Value> {
        let value = match self {
            Self::Hidden => Value::Bool(node.hidden()),
            Self::Value => Value::Str(node.value()),
            Self::Id => Value::Str(node.id()),
            Self::Title => Value::Str(node.title()),
            Self::ClassName => Value::Str(node.class_name()),
            Self::TabIndex => Value::Int(node.tab_index().into()),
            Self::ContentEditable => Value::Bool(node.content_editable()),
            Self::Spellcheck => Value::Bool(node.spellcheck()),
            Self::Disabled => Value::Bool(node.disabled()),
            Self::InnerText | Self::TextContent => Value::Str(node.text_content()),
            Self::Handler(event) => {
                let handler = node.read(|data| {
                    data.handler_props
                        .iter()
                        .find(|(name, _)| name == event)
                        .map(|(_, handler)| handler.clone())
                })?;
                Value::Handler(handler)
            }
        };
        Some(value)
    }
}
