//! The rendering substrate the form talks to: a minimal element tree, scoped
//! namespaces, and an event source that can be narrowed by scope and selector.

mod event;
mod node;
mod scope;
mod source;

pub use event::{DomEvent, EventKind, EventTarget, KeyboardEvent};
pub use node::VNode;
pub use scope::{LensId, Namespace, Scope};
pub use source::DomSource;
