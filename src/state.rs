//! State access for components: a replayed stream of the current value that
//! can be narrowed to a field slice, plus a small loop for hosts without a
//! state container of their own.

use crate::form::{Endo, FieldLens, Lens};
use crate::stream::{Emitter, MemoryStream, Stream, Subscription, memory_channel};

pub struct StateSource<T> {
    stream: MemoryStream<T>,
}

impl<T> Clone for StateSource<T> {
    fn clone(&self) -> Self {
        Self {
            stream: self.stream.clone(),
        }
    }
}

impl<T: Clone + 'static> StateSource<T> {
    pub fn new(stream: MemoryStream<T>) -> Self {
        Self { stream }
    }

    pub fn stream(&self) -> &MemoryStream<T> {
        &self.stream
    }

    pub fn current(&self) -> Option<T> {
        self.stream.value()
    }

    /// Narrows to the slice `lens` points at.
    pub fn select<L>(&self, lens: L) -> StateSource<L::Value>
    where
        L: FieldLens<T>,
    {
        StateSource::new(self.stream.map(move |model| lens.get(model).clone()).remember())
    }

    pub fn through<C: Clone + 'static>(&self, lens: &Lens<T, C>) -> StateSource<C> {
        let lens = lens.clone();
        StateSource::new(self.stream.map(move |model| lens.get(model)).remember())
    }
}

/// Folds updates into a current value and publishes it through a
/// [`StateSource`].
pub struct StateLoop<T> {
    emitter: Emitter<T>,
    source: StateSource<T>,
}

impl<T> Clone for StateLoop<T> {
    fn clone(&self) -> Self {
        Self {
            emitter: self.emitter.clone(),
            source: self.source.clone(),
        }
    }
}

impl<T: Clone + 'static> StateLoop<T> {
    pub fn new(initial: T) -> Self {
        let (emitter, stream) = memory_channel(Some(initial));
        Self {
            emitter,
            source: StateSource::new(stream),
        }
    }

    pub fn source(&self) -> StateSource<T> {
        self.source.clone()
    }

    pub fn current(&self) -> Option<T> {
        self.source.current()
    }

    pub fn apply(&self, update: &Endo<T>) {
        if let Some(current) = self.source.current() {
            self.emitter.emit(update(current));
        }
    }

    /// Applies every update emitted by `updates` in emission order.
    pub fn drive(&self, updates: &Stream<Endo<T>>) -> Subscription {
        let state = self.clone();
        updates.subscribe(move |update| state.apply(update))
    }
}
