//! Open records of named, heterogeneously typed streams. Fields use them for
//! sources and sinks beyond state and view; the form merges same-named sinks
//! across fields.

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::stream::{Stream, merge};

use super::model::{FormError, FormResult};

type MergeFn = fn(&str, &[Channel]) -> FormResult<Channel>;

/// A type-erased `Stream<T>` that remembers how to merge with its own kind.
#[derive(Clone)]
pub struct Channel {
    stream: Rc<dyn Any>,
    type_name: &'static str,
    merge: MergeFn,
}

impl Channel {
    pub fn new<T: Clone + 'static>(stream: Stream<T>) -> Self {
        Self {
            stream: Rc::new(stream),
            type_name: type_name::<T>(),
            merge: merge_typed::<T>,
        }
    }

    pub fn downcast<T: Clone + 'static>(&self) -> Option<Stream<T>> {
        self.stream.downcast_ref::<Stream<T>>().cloned()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

fn merge_typed<T: Clone + 'static>(name: &str, channels: &[Channel]) -> FormResult<Channel> {
    let mut streams = Vec::with_capacity(channels.len());
    for channel in channels {
        let stream = channel
            .downcast::<T>()
            .ok_or_else(|| FormError::SinkTypeMismatch {
                sink: name.to_string(),
                expected: type_name::<T>(),
                found: channel.type_name,
            })?;
        streams.push(stream);
    }
    Ok(Channel::new(merge(streams)))
}

/// Extra sinks contributed by a field or exposed by a form.
#[derive(Clone, Default)]
pub struct ExtraSinks {
    channels: BTreeMap<String, Channel>,
}

impl ExtraSinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Clone + 'static>(mut self, name: impl Into<String>, stream: Stream<T>) -> Self {
        self.insert(name, stream);
        self
    }

    pub fn insert<T: Clone + 'static>(&mut self, name: impl Into<String>, stream: Stream<T>) {
        self.channels.insert(name.into(), Channel::new(stream));
    }

    pub fn get<T: Clone + 'static>(&self, name: &str) -> Option<Stream<T>> {
        self.channels.get(name).and_then(Channel::downcast::<T>)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Groups sinks by name and merges every group into one stream. All
    /// members of a group must carry the same item type.
    pub fn merge_all(groups: impl IntoIterator<Item = ExtraSinks>) -> FormResult<Self> {
        let mut grouped: BTreeMap<String, Vec<Channel>> = BTreeMap::new();
        for sinks in groups {
            for (name, channel) in sinks.channels {
                grouped.entry(name).or_default().push(channel);
            }
        }

        let mut channels = BTreeMap::new();
        for (name, members) in grouped {
            let merged = match members.as_slice() {
                [single] => single.clone(),
                [first, ..] => (first.merge)(&name, &members)?,
                [] => continue,
            };
            channels.insert(name, merged);
        }
        Ok(Self { channels })
    }
}

/// Extra sources handed down from the form to every field.
#[derive(Clone, Default)]
pub struct ExtraSources {
    channels: BTreeMap<String, Channel>,
}

impl ExtraSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Clone + 'static>(mut self, name: impl Into<String>, stream: Stream<T>) -> Self {
        self.channels.insert(name.into(), Channel::new(stream));
        self
    }

    pub fn get<T: Clone + 'static>(&self, name: &str) -> Option<Stream<T>> {
        self.channels.get(name).and_then(Channel::downcast::<T>)
    }

    pub fn require<T: Clone + 'static>(&self, name: &str) -> FormResult<Stream<T>> {
        let channel = self
            .channels
            .get(name)
            .ok_or_else(|| FormError::MissingSource {
                source_name: name.to_string(),
            })?;
        channel
            .downcast()
            .ok_or_else(|| FormError::SourceTypeMismatch {
                source_name: name.to_string(),
                expected: type_name::<T>(),
                found: channel.type_name,
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels.keys().map(String::as_str)
    }
}
