use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::dom::{DomEvent, DomSource, EventKind, KeyboardEvent, Scope, VNode};
use crate::state::StateSource;
use crate::stream::{MemoryStream, Stream, combine_all, merge, never, of};

use super::channel::{ExtraSinks, ExtraSources};
use super::endo::{Endo, RecordTransform};
use super::field::{FieldInstance, FieldModule, FieldSources, FormMeta};
use super::model::{FieldKey, FieldLens, FormError, FormModel, FormResult};
use super::tagger::tag_scoped;
use super::touched::{TouchTracker, Untouch};
use super::validation::{Validation, Validators, validate};

/// Latest rendered node of every registered field, `None` for fields that
/// rendered nothing. Iteration follows the model's declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldViews {
    nodes: Vec<(FieldKey, Option<VNode>)>,
}

impl FieldViews {
    pub fn get(&self, key: FieldKey) -> Option<&VNode> {
        self.nodes
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .and_then(|(_, node)| node.as_ref())
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.nodes.iter().any(|(candidate, _)| *candidate == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, Option<&VNode>)> + '_ {
        self.nodes.iter().map(|(key, node)| (*key, node.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Arranges the field nodes into the form's rendered output.
pub type Layout = Rc<dyn Fn(&FieldViews) -> VNode>;

pub fn layout(f: impl Fn(&FieldViews) -> VNode + 'static) -> Layout {
    Rc::new(f)
}

pub type KeyPredicate = Rc<dyn Fn(&KeyboardEvent) -> bool>;

pub fn ctrl_or_meta_enter(event: &KeyboardEvent) -> bool {
    event.key == "Enter" && (event.ctrl || event.meta)
}

/// Keyboard-triggered submission from selected fields.
#[derive(Clone)]
pub struct CustomSubmission {
    pub fields: BTreeSet<FieldKey>,
    pub predicate: KeyPredicate,
}

impl Default for CustomSubmission {
    fn default() -> Self {
        Self {
            fields: BTreeSet::new(),
            predicate: Rc::new(ctrl_or_meta_enter),
        }
    }
}

impl CustomSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: FieldKey) -> Self {
        self.fields.insert(key);
        self
    }

    pub fn predicate(mut self, predicate: impl Fn(&KeyboardEvent) -> bool + 'static) -> Self {
        self.predicate = Rc::new(predicate);
        self
    }
}

#[derive(Clone, Default)]
pub struct FormOptions {
    pub custom_submission: CustomSubmission,
}

impl FormOptions {
    pub fn custom_submission(mut self, value: CustomSubmission) -> Self {
        self.custom_submission = value;
        self
    }
}

#[derive(Clone, Debug)]
pub enum Submission {
    /// The rendered `form` element's own submit; its default is prevented.
    Native(DomEvent),
    Keybind { field: FieldKey, event: DomEvent },
}

/// Inputs of one form session. `S` is the state shape the session reads; it
/// is the model itself unless the form is mounted through an isolation scope.
pub struct FormSources<M, E, S = M> {
    pub dom: DomSource,
    pub state: StateSource<S>,
    pub layout: MemoryStream<Layout>,
    pub untouch: Stream<Untouch>,
    pub validators: MemoryStream<Validators<M, E>>,
    pub extra: ExtraSources,
}

impl<M, E, S> FormSources<M, E, S>
where
    M: FormModel,
    E: Clone + 'static,
    S: Clone + 'static,
{
    pub fn new(dom: DomSource, state: StateSource<S>, layout: MemoryStream<Layout>) -> Self {
        Self {
            dom,
            state,
            layout,
            untouch: never(),
            validators: of(Validators::new()),
            extra: ExtraSources::new(),
        }
    }

    pub fn untouch(mut self, untouch: Stream<Untouch>) -> Self {
        self.untouch = untouch;
        self
    }

    pub fn validators(mut self, validators: MemoryStream<Validators<M, E>>) -> Self {
        self.validators = validators;
        self
    }

    pub fn with_source<T: Clone + 'static>(
        mut self,
        name: impl Into<String>,
        stream: Stream<T>,
    ) -> Self {
        self.extra = self.extra.with(name, stream);
        self
    }
}

/// Outputs of one form session. Dropping it (together with any
/// subscriptions taken on its streams) tears the session down.
pub struct FormSinks<S, E> {
    pub view: MemoryStream<VNode>,
    pub state: Stream<Endo<S>>,
    pub submit: Stream<Submission>,
    pub validation: MemoryStream<Validation<E>>,
    pub touched: TouchTracker,
    pub extra: ExtraSinks,
}

pub(super) struct FieldContext<M, E> {
    pub(super) dom: DomSource,
    pub(super) state: StateSource<M>,
    pub(super) meta: MemoryStream<FormMeta>,
    pub(super) error: MemoryStream<Option<E>>,
    pub(super) touched: MemoryStream<bool>,
    pub(super) extra: ExtraSources,
}

pub(super) struct LiftedSinks<M> {
    pub(super) state: Stream<Endo<M>>,
    pub(super) view: Stream<Option<VNode>>,
    pub(super) extra: ExtraSinks,
}

/// A field instance bound to its slot in `M`, with the value type erased.
pub(super) trait BoundField<M, E> {
    fn key(&self) -> FieldKey;
    fn shares_source(&self) -> bool;
    fn instantiate(&self, context: FieldContext<M, E>) -> LiftedSinks<M>;
}

struct LensedField<L, M, E>
where
    L: FieldLens<M>,
{
    lens: L,
    instance: FieldInstance<L::Value, E>,
    _model: PhantomData<fn(M)>,
}

impl<L, M, E> BoundField<M, E> for LensedField<L, M, E>
where
    M: FormModel,
    E: Clone + 'static,
    L: FieldLens<M>,
{
    fn key(&self) -> FieldKey {
        self.lens.key()
    }

    fn shares_source(&self) -> bool {
        self.instance.shares_source()
    }

    fn instantiate(&self, context: FieldContext<M, E>) -> LiftedSinks<M> {
        let lens = self.lens;
        let sinks = self.instance.run(FieldSources {
            dom: context.dom,
            meta: context.meta,
            state: context.state.select(lens),
            error: context.error,
            touched: context.touched,
            extra: context.extra,
        });
        let state = sinks
            .state
            .map(move |update| RecordTransform::new().with(lens, update.clone()).into_endo());
        LiftedSinks {
            state,
            view: sinks.view,
            extra: sinks.extra,
        }
    }
}

/// A form over model `M` whose fields report errors of type `E`.
pub struct Form<M, E> {
    fields: Vec<Rc<dyn BoundField<M, E>>>,
    options: FormOptions,
}

impl<M, E> Clone for Form<M, E> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            options: self.options.clone(),
        }
    }
}

pub struct FormBuilder<M, E> {
    fields: Vec<Rc<dyn BoundField<M, E>>>,
    options: FormOptions,
    error: Option<FormError>,
}

impl<M, E> FormBuilder<M, E>
where
    M: FormModel,
    E: Clone + 'static,
{
    /// Registers the module for the field behind `lens`. Undeclared and
    /// duplicate fields are reported by [`FormBuilder::build`].
    pub fn field<L>(mut self, lens: L, module: impl Into<FieldModule<L::Value, E>>) -> Self
    where
        L: FieldLens<M>,
    {
        if self.error.is_some() {
            return self;
        }
        let key = lens.key();
        if !M::declares(key) {
            self.error = Some(FormError::UndeclaredField { field: key });
            return self;
        }
        if self.fields.iter().any(|field| field.key() == key) {
            self.error = Some(FormError::DuplicateField { field: key });
            return self;
        }
        self.fields.push(Rc::new(LensedField {
            lens,
            instance: module.into().normalize(),
            _model: PhantomData,
        }));
        self
    }

    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn custom_submission(mut self, custom_submission: CustomSubmission) -> Self {
        self.options.custom_submission = custom_submission;
        self
    }

    pub fn build(self) -> FormResult<Form<M, E>> {
        if let Some(error) = self.error {
            return Err(error);
        }
        for key in &self.options.custom_submission.fields {
            let Some(field) = self.fields.iter().find(|field| field.key() == *key) else {
                return Err(FormError::UnknownSubmissionField { field: *key });
            };
            if field.shares_source() {
                warn!(
                    field = %key,
                    "custom submission field shares its input source; key presses on sibling fields will submit too"
                );
            }
        }
        debug!(fields = self.fields.len(), "form constructed");
        Ok(Form {
            fields: self.fields,
            options: self.options,
        })
    }
}

impl<M, E> Form<M, E>
where
    M: FormModel,
    E: Clone + 'static,
{
    pub fn builder() -> FormBuilder<M, E> {
        FormBuilder {
            fields: Vec::new(),
            options: FormOptions::default(),
            error: None,
        }
    }

    pub fn field_keys(&self) -> Vec<FieldKey> {
        self.fields.iter().map(|field| field.key()).collect()
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    /// Wires one session: isolated field sources, touched tracking,
    /// validation, merged updates, the laid-out view, submissions, and the
    /// merged extra sinks.
    pub fn run(&self, sources: FormSources<M, E>) -> FormResult<FormSinks<M, E>> {
        let namespace = sources.dom.namespace().clone();
        debug!(fields = self.fields.len(), namespace = %namespace, "instantiating form");

        let field_sources = self
            .fields
            .iter()
            .map(|field| {
                let dom = if field.shares_source() {
                    sources.dom.clone()
                } else {
                    sources.dom.isolate(Scope::named(field.key().as_str()))
                };
                (field.key(), dom)
            })
            .collect::<Vec<_>>();

        let touched = TouchTracker::new(&field_sources, &sources.untouch);

        let registered = self.field_keys().into_iter().collect::<BTreeSet<_>>();
        let validation = sources
            .state
            .stream()
            .combine(&sources.validators)
            .map(move |(values, validators)| validate(values, validators, &registered))
            .remember();
        let meta = validation
            .map(|validation| FormMeta {
                valid: validation.valid,
            })
            .drop_repeats()
            .remember();

        let mut updates = Vec::with_capacity(self.fields.len());
        let mut views = Vec::with_capacity(self.fields.len());
        let mut extras = Vec::with_capacity(self.fields.len());
        for (field, (key, dom)) in self.fields.iter().zip(&field_sources) {
            let key = *key;
            let error = validation
                .map(move |validation| validation.error(key).cloned())
                .remember();
            let sinks = field.instantiate(FieldContext {
                dom: dom.clone(),
                state: sources.state.clone(),
                meta: meta.clone(),
                error,
                touched: touched.field(key),
                extra: sources.extra.clone(),
            });

            let namespace = namespace.clone();
            let scope = Scope::named(key.as_str());
            views.push(
                sinks
                    .view
                    .map(move |node| tag_scoped(node.clone(), &namespace, &scope))
                    .start_with(None)
                    .into_stream(),
            );
            updates.push(sinks.state);
            extras.push(sinks.extra);
        }

        let slots = self.declaration_slots();
        let view = combine_all(views)
            .combine(&sources.layout)
            .settled()
            .map(move |(nodes, layout)| {
                let views = FieldViews {
                    nodes: slots
                        .iter()
                        .map(|(key, index)| (*key, nodes[*index].clone()))
                        .collect(),
                };
                layout(&views)
            })
            .remember();

        let submit = self.submissions(&sources.dom, &field_sources);

        Ok(FormSinks {
            view,
            state: merge(updates),
            submit,
            validation,
            touched,
            extra: ExtraSinks::merge_all(extras)?,
        })
    }

    /// Registered keys in declaration order, each with its registration index.
    fn declaration_slots(&self) -> Vec<(FieldKey, usize)> {
        let declared = M::field_keys();
        let mut slots = self
            .field_keys()
            .into_iter()
            .enumerate()
            .map(|(index, key)| (key, index))
            .collect::<Vec<_>>();
        slots.sort_by_key(|(key, _)| declared.iter().position(|candidate| candidate == key));
        slots
    }

    fn submissions(
        &self,
        dom: &DomSource,
        field_sources: &[(FieldKey, DomSource)],
    ) -> Stream<Submission> {
        let native = dom.select("form").own_events(EventKind::Submit).map(|event| {
            event.prevent_default();
            trace!("native form submission");
            Submission::Native(event.clone())
        });

        let custom = &self.options.custom_submission;
        let keybinds = field_sources
            .iter()
            .filter(|(key, _)| custom.fields.contains(key))
            .map(|(key, dom)| {
                let key = *key;
                let predicate = custom.predicate.clone();
                dom.events(EventKind::KeyDown)
                    .filter(move |event| event.keyboard.as_ref().is_some_and(|keys| predicate(keys)))
                    .map(move |event| {
                        trace!(field = %key, "keybind submission");
                        Submission::Keybind {
                            field: key,
                            event: event.clone(),
                        }
                    })
            });

        merge(std::iter::once(native).chain(keybinds))
    }
}
