//! Single-threaded push streams.
//!
//! [`Stream`] is a hot multicast event stream. Streams built by operators are
//! lazy: the producer starts when the first listener subscribes and is torn
//! down (together with everything upstream of it) when the last listener
//! leaves. [`MemoryStream`] additionally keeps its latest value and replays it
//! to every new listener.
//!
//! Every dispatch and every producer start runs inside a propagation. Work
//! deferred with [`Stream::settled`] runs once the outermost propagation has
//! finished, so it only ever sees the final value of a synchronous cascade.

mod async_bridge;
mod operators;

#[cfg(test)]
mod tests;

use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::rc::{Rc, Weak};

pub use async_bridge::AsyncStream;
pub use operators::{combine_all, merge};

thread_local! {
    static PROPAGATION_DEPTH: Cell<usize> = const { Cell::new(0) };
    static SETTLE_QUEUE: RefCell<Vec<Box<dyn FnOnce()>>> = const { RefCell::new(Vec::new()) };
}

struct Propagation;

impl Propagation {
    fn enter() -> Self {
        PROPAGATION_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Propagation
    }
}

impl Drop for Propagation {
    fn drop(&mut self) {
        PROPAGATION_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

fn propagate<R>(f: impl FnOnce() -> R) -> R {
    let result = {
        let _propagation = Propagation::enter();
        f()
    };
    if PROPAGATION_DEPTH.with(Cell::get) == 0 {
        run_settled();
    }
    result
}

fn run_settled() {
    loop {
        let pending = SETTLE_QUEUE.with(|queue| std::mem::take(&mut *queue.borrow_mut()));
        if pending.is_empty() {
            return;
        }
        for task in pending {
            propagate(task);
        }
    }
}

/// Runs `task` after the current propagation, or right away outside one.
fn after_propagation(task: impl FnOnce() + 'static) {
    if PROPAGATION_DEPTH.with(Cell::get) == 0 {
        propagate(task);
    } else {
        SETTLE_QUEUE.with(|queue| queue.borrow_mut().push(Box::new(task)));
    }
}

type Listener<T> = Rc<dyn Fn(&T)>;
type Producer<T> = Box<dyn Fn(Emitter<T>) -> Subscription>;

struct Inner<T> {
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
    next_listener: Cell<u64>,
    producer: Option<Producer<T>>,
    active: Cell<bool>,
    running: RefCell<Option<Subscription>>,
    memory: Option<RefCell<Option<T>>>,
}

impl<T: Clone + 'static> Inner<T> {
    fn new(producer: Option<Producer<T>>, memory: Option<Option<T>>) -> Rc<Self> {
        Rc::new(Self {
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            producer,
            active: Cell::new(false),
            running: RefCell::new(None),
            memory: memory.map(RefCell::new),
        })
    }

    fn dispatch(&self, value: T) {
        if let Some(memory) = &self.memory {
            *memory.borrow_mut() = Some(value.clone());
        }
        let listeners = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect::<Vec<_>>();
        propagate(|| {
            for listener in listeners {
                listener(&value);
            }
        });
    }

    fn remove_listener(&self, id: u64) {
        let now_empty = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|(listener_id, _)| *listener_id != id);
            listeners.is_empty()
        };
        if !now_empty || self.producer.is_none() {
            return;
        }
        self.active.set(false);
        if let Some(memory) = &self.memory {
            memory.borrow_mut().take();
        }
        let running = self.running.borrow_mut().take();
        drop(running);
    }
}

/// Hot multicast stream of `T`.
pub struct Stream<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// Builds a lazy stream. `producer` runs each time the stream goes from
    /// zero to one listener; the returned subscription is dropped when the
    /// stream goes back to zero listeners.
    pub fn create(producer: impl Fn(Emitter<T>) -> Subscription + 'static) -> Self {
        Self {
            inner: Inner::new(Some(Box::new(producer)), None),
        }
    }

    fn with_memory(producer: impl Fn(Emitter<T>) -> Subscription + 'static) -> MemoryStream<T> {
        MemoryStream(Self {
            inner: Inner::new(Some(Box::new(producer)), Some(None)),
        })
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        propagate(|| self.attach(Rc::new(listener)))
    }

    fn attach(&self, listener: Listener<T>) -> Subscription {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, listener.clone()));

        let inner = self.inner.clone();
        let subscription = Subscription::new(move || inner.remove_listener(id));

        if let Some(producer) = &self.inner.producer {
            if !self.inner.active.get() {
                self.inner.active.set(true);
                let running = producer(Emitter {
                    target: Rc::downgrade(&self.inner),
                });
                // The last listener may already have left while the producer
                // was starting; in that case `running` is dropped here.
                if self.inner.active.get() {
                    *self.inner.running.borrow_mut() = Some(running);
                }
                return subscription;
            }
        }

        let replay = self
            .inner
            .memory
            .as_ref()
            .and_then(|memory| memory.borrow().clone());
        if let Some(value) = replay {
            listener(&value);
        }
        subscription
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Whether both handles point at the same stream.
    pub fn same_stream(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A stream that remembers its latest value and replays it to new listeners.
pub struct MemoryStream<T>(Stream<T>);

impl<T> Clone for MemoryStream<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for MemoryStream<T> {
    type Target = Stream<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Clone + 'static> MemoryStream<T> {
    /// Latest value seen by the stream, if any.
    pub fn value(&self) -> Option<T> {
        self.0
            .inner
            .memory
            .as_ref()
            .and_then(|memory| memory.borrow().clone())
    }

    pub fn into_stream(self) -> Stream<T> {
        self.0
    }
}

/// Write handle for a stream. Holds the stream weakly, so emitting into a
/// stream nobody references any more is a no-op.
pub struct Emitter<T> {
    target: Weak<Inner<T>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}

impl<T: Clone + 'static> Emitter<T> {
    pub fn emit(&self, value: T) {
        if let Some(target) = self.target.upgrade() {
            target.dispatch(value);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.target.strong_count() == 0
    }
}

/// Keeps a listener attached. Dropping it detaches the listener and, when it
/// was the last one, tears the upstream graph down.
#[must_use = "dropping a subscription detaches its listener immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn empty() -> Self {
        Self { teardown: None }
    }

    pub fn join(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        let subscriptions = subscriptions.into_iter().collect::<Vec<_>>();
        Self::new(move || drop(subscriptions))
    }

    /// Leaves the listener attached for as long as the stream lives.
    pub fn forget(mut self) {
        self.teardown.take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

/// A producer-less stream fed through the returned emitter.
pub fn channel<T: Clone + 'static>() -> (Emitter<T>, Stream<T>) {
    let stream = Stream {
        inner: Inner::new(None, None),
    };
    let emitter = Emitter {
        target: Rc::downgrade(&stream.inner),
    };
    (emitter, stream)
}

/// Like [`channel`], but the stream replays its latest value. The seeded or
/// last emitted value survives listeners coming and going.
pub fn memory_channel<T: Clone + 'static>(initial: Option<T>) -> (Emitter<T>, MemoryStream<T>) {
    let stream = Stream {
        inner: Inner::new(None, Some(initial)),
    };
    let emitter = Emitter {
        target: Rc::downgrade(&stream.inner),
    };
    (emitter, MemoryStream(stream))
}

/// A stream that never emits.
pub fn never<T: Clone + 'static>() -> Stream<T> {
    Stream {
        inner: Inner::new(None, None),
    }
}

/// A memory stream holding `value` forever.
pub fn of<T: Clone + 'static>(value: T) -> MemoryStream<T> {
    MemoryStream(Stream {
        inner: Inner::new(None, Some(Some(value))),
    })
}
