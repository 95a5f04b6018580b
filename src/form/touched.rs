use std::collections::BTreeSet;

use tracing::trace;

use crate::dom::{DomSource, EventKind};
use crate::stream::{MemoryStream, Stream, merge};

use super::model::FieldKey;

/// Clears the touched flag of one field, or of every field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Untouch {
    Field(FieldKey),
    All,
}

impl Untouch {
    pub fn covers(self, key: FieldKey) -> bool {
        match self {
            Untouch::Field(field) => field == key,
            Untouch::All => true,
        }
    }
}

impl From<FieldKey> for Untouch {
    fn from(key: FieldKey) -> Self {
        Untouch::Field(key)
    }
}

impl From<Option<FieldKey>> for Untouch {
    fn from(key: Option<FieldKey>) -> Self {
        key.map_or(Untouch::All, Untouch::Field)
    }
}

#[derive(Clone, Copy, Debug)]
enum Transition {
    Touch(FieldKey),
    Untouch(Untouch),
}

/// Touched state of one form session.
///
/// A field becomes touched on the first `change`, `focus` or `input` event on
/// its source. Each field listens through a one-shot gate that closes after
/// that first event and re-opens only when the field is untouched again.
///
/// The tracker listens only while something subscribes to it, directly or
/// through a field view; with no subscriber every field reads as untouched.
#[derive(Clone)]
pub struct TouchTracker {
    touched: MemoryStream<BTreeSet<FieldKey>>,
}

impl TouchTracker {
    pub fn new(fields: &[(FieldKey, DomSource)], untouch: &Stream<Untouch>) -> Self {
        let mut transitions = fields
            .iter()
            .map(|(key, dom)| touches(*key, dom, untouch))
            .collect::<Vec<_>>();
        transitions.push(untouch.map(|signal| Transition::Untouch(*signal)));

        let touched = merge(transitions).fold(BTreeSet::new(), |touched, transition| {
            let mut next = touched.clone();
            match *transition {
                Transition::Touch(key) => {
                    trace!(field = %key, "field touched");
                    next.insert(key);
                }
                Transition::Untouch(Untouch::Field(key)) => {
                    trace!(field = %key, "field untouched");
                    next.remove(&key);
                }
                Transition::Untouch(Untouch::All) => {
                    trace!("all fields untouched");
                    next.clear();
                }
            }
            next
        });
        Self { touched }
    }

    pub fn snapshot(&self) -> BTreeSet<FieldKey> {
        self.touched.value().unwrap_or_default()
    }

    pub fn is_touched(&self, key: FieldKey) -> bool {
        self.snapshot().contains(&key)
    }

    pub fn stream(&self) -> MemoryStream<BTreeSet<FieldKey>> {
        self.touched.clone()
    }

    pub fn field(&self, key: FieldKey) -> MemoryStream<bool> {
        self.touched
            .map(move |touched| touched.contains(&key))
            .drop_repeats()
            .remember()
    }
}

fn interactions(dom: &DomSource) -> Stream<()> {
    merge([
        dom.events(EventKind::Change),
        dom.events(EventKind::Focus),
        dom.events(EventKind::Input),
    ])
    .map(|_| ())
}

fn touches(key: FieldKey, dom: &DomSource, untouch: &Stream<Untouch>) -> Stream<Transition> {
    let interactions = interactions(dom);
    untouch
        .filter(move |signal| signal.covers(key))
        .map(|_| ())
        .start_with(())
        .map(move |_| interactions.take(1))
        .flatten()
        .map(move |_| Transition::Touch(key))
}
