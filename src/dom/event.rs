use std::cell::Cell;
use std::rc::Rc;

use super::node::{VNode, selector_matches};
use super::scope::Namespace;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EventKind {
    Input,
    Change,
    Focus,
    Blur,
    KeyDown,
    Submit,
    Click,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyboardEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyboardEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

/// The element an event was dispatched on, with the isolation namespace the
/// host resolved for it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EventTarget {
    pub namespace: Namespace,
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl EventTarget {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn for_node(node: &VNode, namespace: Namespace) -> Self {
        Self {
            namespace,
            tag: node.tag.clone(),
            id: node.id.clone(),
            classes: node.classes.clone(),
        }
    }

    pub fn namespace(mut self, value: impl Into<Namespace>) -> Self {
        self.namespace = value.into();
        self
    }

    pub fn class(mut self, value: impl Into<String>) -> Self {
        self.classes.push(value.into());
        self
    }

    pub fn id(mut self, value: impl Into<String>) -> Self {
        self.id = Some(value.into());
        self
    }

    pub fn matches(&self, selector: &str) -> bool {
        selector_matches(selector, &self.tag, self.id.as_deref(), &self.classes)
    }
}

#[derive(Clone, Debug)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: EventTarget,
    pub value: Option<String>,
    pub keyboard: Option<KeyboardEvent>,
    default_prevented: Rc<Cell<bool>>,
}

impl DomEvent {
    pub fn new(kind: EventKind, target: EventTarget) -> Self {
        Self {
            kind,
            target,
            value: None,
            keyboard: None,
            default_prevented: Rc::new(Cell::new(false)),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn key_down(target: EventTarget, keyboard: KeyboardEvent) -> Self {
        let mut event = Self::new(EventKind::KeyDown, target);
        event.keyboard = Some(keyboard);
        event
    }

    /// Shared by every clone, so the host sees a prevent issued downstream.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}
