use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{MemoryStream, Stream, Subscription, after_propagation};

impl<T: Clone + 'static> Stream<T> {
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Stream<U> {
        let source = self.clone();
        let f = Rc::new(f);
        Stream::create(move |emitter| {
            let f = f.clone();
            source.subscribe(move |value| emitter.emit(f(value)))
        })
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Stream<T> {
        let source = self.clone();
        let predicate = Rc::new(predicate);
        Stream::create(move |emitter| {
            let predicate = predicate.clone();
            source.subscribe(move |value| {
                if predicate(value) {
                    emitter.emit(value.clone());
                }
            })
        })
    }

    pub fn filter_map<U: Clone + 'static>(
        &self,
        f: impl Fn(&T) -> Option<U> + 'static,
    ) -> Stream<U> {
        let source = self.clone();
        let f = Rc::new(f);
        Stream::create(move |emitter| {
            let f = f.clone();
            source.subscribe(move |value| {
                if let Some(mapped) = f(value) {
                    emitter.emit(mapped);
                }
            })
        })
    }

    /// Forwards the first `count` values, then detaches from upstream.
    pub fn take(&self, count: usize) -> Stream<T> {
        let source = self.clone();
        Stream::create(move |emitter| {
            if count == 0 {
                return Subscription::empty();
            }
            let remaining = Rc::new(Cell::new(count));
            let upstream: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
            let gate = upstream.clone();
            let left = remaining.clone();
            let subscription = source.subscribe(move |value| {
                let budget = left.get();
                if budget == 0 {
                    return;
                }
                left.set(budget - 1);
                emitter.emit(value.clone());
                if budget == 1 {
                    let finished = gate.borrow_mut().take();
                    drop(finished);
                }
            });
            // A replaying upstream can exhaust the budget during `subscribe`.
            if remaining.get() > 0 {
                *upstream.borrow_mut() = Some(subscription);
            }
            Subscription::new(move || {
                let finished = upstream.borrow_mut().take();
                drop(finished);
            })
        })
    }

    /// Pairs the latest values of both streams once each has emitted.
    pub fn combine<U: Clone + 'static>(&self, other: &Stream<U>) -> Stream<(T, U)> {
        let left = self.clone();
        let right = other.clone();
        Stream::create(move |emitter| {
            let latest: Rc<RefCell<(Option<T>, Option<U>)>> = Rc::new(RefCell::new((None, None)));

            let left_latest = latest.clone();
            let left_emitter = emitter.clone();
            let left_subscription = left.subscribe(move |value| {
                let pair = {
                    let mut latest = left_latest.borrow_mut();
                    latest.0 = Some(value.clone());
                    latest.1.clone().map(|other| (value.clone(), other))
                };
                if let Some(pair) = pair {
                    left_emitter.emit(pair);
                }
            });

            let right_subscription = right.subscribe(move |value| {
                let pair = {
                    let mut latest = latest.borrow_mut();
                    latest.1 = Some(value.clone());
                    latest.0.clone().map(|other| (other, value.clone()))
                };
                if let Some(pair) = pair {
                    emitter.emit(pair);
                }
            });

            Subscription::join([left_subscription, right_subscription])
        })
    }

    /// Forwards only the last value of each propagation, after it finishes.
    /// Intermediate values of a synchronous cascade (one input of a
    /// `combine` updated, its sibling not yet) never reach listeners.
    pub fn settled(&self) -> Stream<T> {
        let source = self.clone();
        Stream::create(move |emitter| {
            let latest: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
            source.subscribe(move |value| {
                let pending = latest.borrow_mut().replace(value.clone()).is_some();
                if pending {
                    return;
                }
                let latest = latest.clone();
                let emitter = emitter.clone();
                after_propagation(move || {
                    let value = latest.borrow_mut().take();
                    if let Some(value) = value {
                        emitter.emit(value);
                    }
                });
            })
        })
    }

    pub fn start_with(&self, initial: T) -> MemoryStream<T> {
        let source = self.clone();
        Stream::with_memory(move |emitter| {
            emitter.emit(initial.clone());
            source.subscribe(move |value| emitter.emit(value.clone()))
        })
    }

    pub fn remember(&self) -> MemoryStream<T> {
        let source = self.clone();
        Stream::with_memory(move |emitter| {
            source.subscribe(move |value| emitter.emit(value.clone()))
        })
    }

    /// Running accumulation, starting with `seed`.
    pub fn fold<S: Clone + 'static>(
        &self,
        seed: S,
        f: impl Fn(&S, &T) -> S + 'static,
    ) -> MemoryStream<S> {
        let source = self.clone();
        let f = Rc::new(f);
        Stream::with_memory(move |emitter| {
            let accumulator = Rc::new(RefCell::new(seed.clone()));
            emitter.emit(seed.clone());
            let f = f.clone();
            source.subscribe(move |value| {
                let next = f(&accumulator.borrow(), value);
                *accumulator.borrow_mut() = next.clone();
                emitter.emit(next);
            })
        })
    }
}

impl<T: Clone + PartialEq + 'static> Stream<T> {
    pub fn drop_repeats(&self) -> Stream<T> {
        let source = self.clone();
        Stream::create(move |emitter| {
            let last: RefCell<Option<T>> = RefCell::new(None);
            source.subscribe(move |value| {
                if last.borrow().as_ref() == Some(value) {
                    return;
                }
                *last.borrow_mut() = Some(value.clone());
                emitter.emit(value.clone());
            })
        })
    }
}

impl<T: Clone + 'static> Stream<Stream<T>> {
    /// Follows the most recent inner stream, detaching from the previous one.
    pub fn flatten(&self) -> Stream<T> {
        let outer = self.clone();
        Stream::create(move |emitter| {
            let current: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
            let slot = current.clone();
            let outer_subscription = outer.subscribe(move |inner| {
                let previous = slot.borrow_mut().take();
                drop(previous);
                let emitter = emitter.clone();
                let next = inner.subscribe(move |value| emitter.emit(value.clone()));
                *slot.borrow_mut() = Some(next);
            });
            Subscription::join([
                outer_subscription,
                Subscription::new(move || {
                    let previous = current.borrow_mut().take();
                    drop(previous);
                }),
            ])
        })
    }
}

/// Interleaves every value of every input stream, in emission order.
pub fn merge<T: Clone + 'static>(streams: impl IntoIterator<Item = Stream<T>>) -> Stream<T> {
    let streams = streams.into_iter().collect::<Vec<_>>();
    Stream::create(move |emitter| {
        Subscription::join(streams.iter().map(|stream| {
            let emitter = emitter.clone();
            stream.subscribe(move |value| emitter.emit(value.clone()))
        }))
    })
}

/// Latest value of every input, emitted once all of them have emitted.
/// With no inputs the empty vector is emitted as soon as a listener attaches.
pub fn combine_all<T: Clone + 'static>(
    streams: impl IntoIterator<Item = Stream<T>>,
) -> Stream<Vec<T>> {
    let streams = streams.into_iter().collect::<Vec<_>>();
    Stream::create(move |emitter| {
        if streams.is_empty() {
            emitter.emit(Vec::new());
            return Subscription::empty();
        }
        let latest: Rc<RefCell<Vec<Option<T>>>> = Rc::new(RefCell::new(vec![None; streams.len()]));
        Subscription::join(streams.iter().enumerate().map(|(index, stream)| {
            let latest = latest.clone();
            let emitter = emitter.clone();
            stream.subscribe(move |value| {
                let snapshot = {
                    let mut latest = latest.borrow_mut();
                    latest[index] = Some(value.clone());
                    latest.iter().cloned().collect::<Option<Vec<_>>>()
                };
                if let Some(values) = snapshot {
                    emitter.emit(values);
                }
            })
        }))
    })
}
