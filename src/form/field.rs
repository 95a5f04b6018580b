//! Field modules and their normalization into one instance shape.

use std::rc::Rc;

use crate::dom::{DomSource, VNode};
use crate::state::StateSource;
use crate::stream::{MemoryStream, Stream};

use super::channel::{ExtraSinks, ExtraSources};
use super::endo::Endo;

/// Form-wide metadata every field can read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormMeta {
    pub valid: bool,
}

/// What a simple field's view renders from.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldProps<V, E> {
    pub value: V,
    pub error: Option<E>,
    pub touched: bool,
}

pub struct FieldSources<V, E> {
    /// Input source, isolated to this field unless it shares the form's.
    pub dom: DomSource,
    pub meta: MemoryStream<FormMeta>,
    pub state: StateSource<V>,
    pub error: MemoryStream<Option<E>>,
    pub touched: MemoryStream<bool>,
    pub extra: ExtraSources,
}

impl<V, E> Clone for FieldSources<V, E> {
    fn clone(&self) -> Self {
        Self {
            dom: self.dom.clone(),
            meta: self.meta.clone(),
            state: self.state.clone(),
            error: self.error.clone(),
            touched: self.touched.clone(),
            extra: self.extra.clone(),
        }
    }
}

pub struct FieldSinks<V> {
    pub state: Stream<Endo<V>>,
    pub view: Stream<Option<VNode>>,
    pub extra: ExtraSinks,
}

impl<V: 'static> FieldSinks<V> {
    pub fn new(state: Stream<Endo<V>>, view: Stream<Option<VNode>>) -> Self {
        Self {
            state,
            view,
            extra: ExtraSinks::new(),
        }
    }

    pub fn with_sink<T: Clone + 'static>(mut self, name: impl Into<String>, stream: Stream<T>) -> Self {
        self.extra.insert(name, stream);
        self
    }
}

pub type Intent<V> = Rc<dyn Fn(&DomSource) -> Stream<Endo<V>>>;
pub type View<V, E> = Rc<dyn Fn(&FieldProps<V, E>, &FormMeta) -> VNode>;
pub type Effect<V, E> = Rc<dyn Fn(FieldSources<V, E>) -> FieldSinks<V>>;

/// An intent/view pair.
pub struct SimpleField<V, E> {
    intent: Intent<V>,
    view: View<V, E>,
}

impl<V, E> Clone for SimpleField<V, E> {
    fn clone(&self) -> Self {
        Self {
            intent: self.intent.clone(),
            view: self.view.clone(),
        }
    }
}

impl<V: Clone + 'static, E: Clone + 'static> SimpleField<V, E> {
    pub fn new(
        intent: impl Fn(&DomSource) -> Stream<Endo<V>> + 'static,
        view: impl Fn(&FieldProps<V, E>, &FormMeta) -> VNode + 'static,
    ) -> Self {
        Self {
            intent: Rc::new(intent),
            view: Rc::new(view),
        }
    }

    fn into_effect(self) -> Effect<V, E> {
        Rc::new(move |sources: FieldSources<V, E>| {
            let updates = (self.intent)(&sources.dom);
            let view = self.view.clone();
            let rendered = sources
                .meta
                .combine(sources.state.stream())
                .combine(&sources.error)
                .combine(&sources.touched)
                .map(move |(((meta, value), error), touched)| {
                    let props = FieldProps {
                        value: value.clone(),
                        error: error.clone(),
                        touched: *touched,
                    };
                    Some(view(&props, meta))
                });
            FieldSinks::new(updates, rendered)
        })
    }
}

enum FieldShape<V, E> {
    Simple(SimpleField<V, E>),
    AnyEffect(Effect<V, E>),
}

/// A field as supplied by the caller.
pub struct FieldModule<V, E> {
    shape: FieldShape<V, E>,
    shares_source: bool,
}

impl<V: Clone + 'static, E: Clone + 'static> FieldModule<V, E> {
    pub fn simple(
        intent: impl Fn(&DomSource) -> Stream<Endo<V>> + 'static,
        view: impl Fn(&FieldProps<V, E>, &FormMeta) -> VNode + 'static,
    ) -> Self {
        SimpleField::new(intent, view).into()
    }

    /// A field written directly against the full source/sink records.
    pub fn any_effect(run: impl Fn(FieldSources<V, E>) -> FieldSinks<V> + 'static) -> Self {
        Self {
            shape: FieldShape::AnyEffect(Rc::new(run)),
            shares_source: false,
        }
    }

    /// Receive the form's input source instead of an isolated one.
    pub fn shares_source(mut self) -> Self {
        self.shares_source = true;
        self
    }

    pub fn is_simple(&self) -> bool {
        matches!(self.shape, FieldShape::Simple(_))
    }

    pub fn normalize(self) -> FieldInstance<V, E> {
        let run = match self.shape {
            FieldShape::Simple(field) => field.into_effect(),
            FieldShape::AnyEffect(run) => run,
        };
        FieldInstance {
            run,
            shares_source: self.shares_source,
        }
    }
}

impl<V: Clone + 'static, E: Clone + 'static> From<SimpleField<V, E>> for FieldModule<V, E> {
    fn from(field: SimpleField<V, E>) -> Self {
        Self {
            shape: FieldShape::Simple(field),
            shares_source: false,
        }
    }
}

/// A normalized field: one run function over full sources and sinks.
pub struct FieldInstance<V, E> {
    run: Effect<V, E>,
    shares_source: bool,
}

impl<V, E> Clone for FieldInstance<V, E> {
    fn clone(&self) -> Self {
        Self {
            run: self.run.clone(),
            shares_source: self.shares_source,
        }
    }
}

impl<V, E> FieldInstance<V, E> {
    pub fn shares_source(&self) -> bool {
        self.shares_source
    }

    pub fn run(&self, sources: FieldSources<V, E>) -> FieldSinks<V> {
        (self.run)(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomEvent, EventKind, EventTarget};
    use crate::form::endo::replace;
    use crate::stream::{memory_channel, of};
    use std::cell::RefCell;

    fn label_field() -> FieldModule<String, String> {
        FieldModule::simple(
            |dom| {
                dom.events(EventKind::Input)
                    .filter_map(|event| event.value.clone())
                    .map(|value| replace(value.clone()))
            },
            |props, meta| {
                VNode::element("input")
                    .attr("value", props.value.clone())
                    .attr("data-touched", props.touched.to_string())
                    .attr("data-form-valid", meta.valid.to_string())
                    .text(props.error.clone().unwrap_or_default())
            },
        )
    }

    fn sources(dom: DomSource) -> FieldSources<String, String> {
        let (_tx, state) = memory_channel(Some("Alice".to_string()));
        FieldSources {
            dom,
            meta: of(FormMeta { valid: false }),
            state: StateSource::new(state),
            error: of(Some("too short".to_string())),
            touched: of(true),
            extra: ExtraSources::new(),
        }
    }

    #[test]
    fn simple_field_view_combines_meta_value_error_and_touched() {
        let (_tx, dom) = DomSource::channel();
        let instance = label_field().normalize();
        let sinks = instance.run(sources(dom));

        let rendered = Rc::new(RefCell::new(None));
        let slot = rendered.clone();
        let _subscription = sinks
            .view
            .subscribe(move |node| *slot.borrow_mut() = node.clone());

        let node = rendered.borrow().clone().expect("simple views always render");
        assert_eq!(node.attrs.get("value").map(String::as_str), Some("Alice"));
        assert_eq!(node.attrs.get("data-touched").map(String::as_str), Some("true"));
        assert_eq!(node.attrs.get("data-form-valid").map(String::as_str), Some("false"));
        assert_eq!(node.text.as_deref(), Some("too short"));
    }

    #[test]
    fn simple_field_intent_reads_the_given_source() {
        let (tx, dom) = DomSource::channel();
        let sinks = label_field().normalize().run(sources(dom));
        let updates = Rc::new(RefCell::new(Vec::new()));
        let sink = updates.clone();
        let _subscription = sinks
            .state
            .subscribe(move |update| sink.borrow_mut().push(update(String::new())));

        tx.emit(DomEvent::new(EventKind::Input, EventTarget::new("input")).with_value("Bob"));
        assert_eq!(*updates.borrow(), vec!["Bob".to_string()]);
    }

    #[test]
    fn share_flag_survives_normalization() {
        assert!(!label_field().normalize().shares_source());
        assert!(label_field().shares_source().normalize().shares_source());
        let effect = FieldModule::<String, String>::any_effect(|sources| {
            FieldSinks::new(crate::stream::never(), sources.touched.map(|_| None))
        })
        .shares_source();
        assert!(!effect.is_simple());
        assert!(effect.normalize().shares_source());
    }
}
