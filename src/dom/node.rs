use std::collections::BTreeMap;

use super::event::EventTarget;
use super::scope::Namespace;

/// A rendered element. `isolate` is the isolation descriptor stamped by the
/// form; the host renderer routes events from this subtree under it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VNode {
    pub tag: String,
    pub key: Option<String>,
    pub isolate: Option<Namespace>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<VNode>,
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn key(mut self, value: impl Into<String>) -> Self {
        self.key = Some(value.into());
        self
    }

    pub fn id(mut self, value: impl Into<String>) -> Self {
        self.id = Some(value.into());
        self
    }

    pub fn class(mut self, value: impl Into<String>) -> Self {
        self.classes.push(value.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.text = Some(value.into());
        self
    }

    pub fn child(mut self, node: VNode) -> Self {
        self.children.push(node);
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = VNode>) -> Self {
        self.children.extend(nodes);
        self
    }

    /// Supports `*`, `tag`, `.class` and `#id`.
    pub fn matches(&self, selector: &str) -> bool {
        selector_matches(selector, &self.tag, self.id.as_deref(), &self.classes)
    }

    pub fn find(&self, selector: &str) -> Option<&VNode> {
        if self.matches(selector) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(selector))
    }

    /// Isolation namespace in effect at the first element matching
    /// `selector`: the deepest descriptor on the path from this node to it.
    pub fn namespace_of(&self, selector: &str) -> Option<Namespace> {
        self.locate(selector, &Namespace::root())
            .map(|(_, namespace)| namespace)
    }

    /// Event target for the first element matching `selector`, carrying the
    /// namespace the host would route its events under.
    pub fn target_for(&self, selector: &str) -> Option<EventTarget> {
        self.locate(selector, &Namespace::root())
            .map(|(node, namespace)| EventTarget::for_node(node, namespace))
    }

    pub fn text_content(&self) -> String {
        let mut out = self.text.clone().unwrap_or_default();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    fn locate(&self, selector: &str, inherited: &Namespace) -> Option<(&VNode, Namespace)> {
        let namespace = match &self.isolate {
            Some(isolate) if isolate.depth() >= inherited.depth() => isolate.clone(),
            _ => inherited.clone(),
        };
        if self.matches(selector) {
            return Some((self, namespace));
        }
        self.children
            .iter()
            .find_map(|child| child.locate(selector, &namespace))
    }
}

pub(super) fn selector_matches(
    selector: &str,
    tag: &str,
    id: Option<&str>,
    classes: &[String],
) -> bool {
    if selector == "*" {
        return true;
    }
    if let Some(class) = selector.strip_prefix('.') {
        return classes.iter().any(|candidate| candidate == class);
    }
    if let Some(expected) = selector.strip_prefix('#') {
        return id == Some(expected);
    }
    tag == selector
}
