//! Mounting a form inside a larger parent state.

use std::rc::Rc;

use tracing::debug;

use crate::dom::{LensId, Scope};
use crate::stream::Stream;

use super::compose::{Form, FormSinks, FormSources};
use super::endo::Endo;
use super::model::{FieldLens, FormModel, FormResult};
use super::tagger::tag_node;

/// A getter/setter pair from a parent `P` to a child `C`.
pub struct Lens<P, C> {
    id: LensId,
    get: Rc<dyn Fn(&P) -> C>,
    set: Rc<dyn Fn(&P, C) -> P>,
}

impl<P, C> Clone for Lens<P, C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            get: self.get.clone(),
            set: self.set.clone(),
        }
    }
}

impl<P: 'static, C: 'static> Lens<P, C> {
    pub fn new(
        get: impl Fn(&P) -> C + 'static,
        set: impl Fn(&P, C) -> P + 'static,
    ) -> Self {
        Self {
            id: LensId::next(),
            get: Rc::new(get),
            set: Rc::new(set),
        }
    }

    pub fn id(&self) -> LensId {
        self.id
    }

    pub fn get(&self, parent: &P) -> C {
        (self.get)(parent)
    }

    pub fn set(&self, parent: &P, child: C) -> P {
        (self.set)(parent, child)
    }

    pub fn over(&self, update: Endo<C>) -> Endo<P> {
        let lens = self.clone();
        Rc::new(move |parent: P| {
            let child = lens.get(&parent);
            lens.set(&parent, update(child))
        })
    }
}

impl<P: Clone + 'static, C: Clone + 'static> Lens<P, C> {
    pub fn from_field<L>(lens: L) -> Self
    where
        L: FieldLens<P, Value = C>,
    {
        Self::new(
            move |parent: &P| lens.get(parent).clone(),
            move |parent: &P, child: C| {
                let mut next = parent.clone();
                lens.set(&mut next, child);
                next
            },
        )
    }
}

/// Where a child form lives inside its parent: the scope segment its view
/// and events are isolated under, and the lens its state goes through.
pub struct IsolationScope<P, C> {
    pub scope: Scope,
    pub lens: Lens<P, C>,
}

impl<P, C> Clone for IsolationScope<P, C> {
    fn clone(&self) -> Self {
        Self {
            scope: self.scope.clone(),
            lens: self.lens.clone(),
        }
    }
}

impl<P: Clone + 'static, C: Clone + 'static> IsolationScope<P, C> {
    /// Named scope for a plain parent key.
    pub fn key<L>(lens: L) -> Self
    where
        L: FieldLens<P, Value = C>,
    {
        Self {
            scope: Scope::named(lens.key().as_str()),
            lens: Lens::from_field(lens),
        }
    }

    /// Scope tagged with the lens itself.
    pub fn lens(lens: Lens<P, C>) -> Self {
        Self {
            scope: Scope::Lens(lens.id()),
            lens,
        }
    }
}

/// A form operating on `M`, adapted to run against parent state `P`.
pub struct IsolatedForm<P, M, E> {
    form: Form<M, E>,
    scope: IsolationScope<P, M>,
}

impl<P, M, E> Clone for IsolatedForm<P, M, E> {
    fn clone(&self) -> Self {
        Self {
            form: self.form.clone(),
            scope: self.scope.clone(),
        }
    }
}

impl<M, E> Form<M, E>
where
    M: FormModel,
    E: Clone + 'static,
{
    pub fn isolate<P: Clone + 'static>(&self, scope: IsolationScope<P, M>) -> IsolatedForm<P, M, E> {
        IsolatedForm {
            form: self.clone(),
            scope,
        }
    }
}

impl<P, M, E> IsolatedForm<P, M, E>
where
    P: Clone + 'static,
    M: FormModel,
    E: Clone + 'static,
{
    pub fn scope(&self) -> &IsolationScope<P, M> {
        &self.scope
    }

    pub fn run(&self, sources: FormSources<M, E, P>) -> FormResult<FormSinks<P, E>> {
        let parent_namespace = sources.dom.namespace().clone();
        let scope = self.scope.scope.clone();
        let lens = self.scope.lens.clone();
        debug!(scope = %scope, namespace = %parent_namespace, "mounting isolated form");

        let child = FormSources {
            dom: sources.dom.isolate(scope.clone()),
            state: sources.state.through(&lens),
            layout: sources.layout,
            untouch: sources.untouch,
            validators: sources.validators,
            extra: sources.extra,
        };
        let sinks = self.form.run(child)?;

        let view = sinks
            .view
            .map(move |node| tag_node(node.clone(), &parent_namespace, &scope))
            .remember();
        let state: Stream<Endo<P>> = sinks.state.map(move |update| lens.over(update.clone()));

        Ok(FormSinks {
            view,
            state,
            submit: sinks.submit,
            validation: sinks.validation,
            touched: sinks.touched,
            extra: sinks.extra,
        })
    }
}
