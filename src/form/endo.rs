//! Value-transforming functions and the record transform that applies a
//! field-local one to a whole form model.

use std::collections::BTreeMap;
use std::rc::Rc;

use super::model::{FieldKey, FieldLens};

/// A function from a value to a new value of the same type.
pub type Endo<T> = Rc<dyn Fn(T) -> T>;

pub fn identity<T: 'static>() -> Endo<T> {
    Rc::new(|value| value)
}

pub fn endo<T>(f: impl Fn(T) -> T + 'static) -> Endo<T> {
    Rc::new(f)
}

/// Ignores the current value and yields `value`.
pub fn replace<T: Clone + 'static>(value: T) -> Endo<T> {
    Rc::new(move |_| value.clone())
}

type FieldUpdate<M> = Rc<dyn Fn(&mut M)>;

/// A partial mapping from field keys to per-field endomorphisms. Applying it
/// copies the model and transforms only the mapped fields.
pub struct RecordTransform<M> {
    entries: BTreeMap<FieldKey, FieldUpdate<M>>,
}

impl<M> Clone for RecordTransform<M> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<M> Default for RecordTransform<M> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<M: Clone + 'static> RecordTransform<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps the field behind `lens` through `update`. A later entry for the
    /// same key replaces the earlier one.
    pub fn with<L>(mut self, lens: L, update: Endo<L::Value>) -> Self
    where
        L: FieldLens<M>,
    {
        let apply: FieldUpdate<M> = Rc::new(move |model: &mut M| {
            let current = lens.get(model).clone();
            lens.set(model, update(current));
        });
        self.entries.insert(lens.key(), apply);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn apply(&self, model: &M) -> M {
        let mut next = model.clone();
        for update in self.entries.values() {
            update(&mut next);
        }
        next
    }

    pub fn into_endo(self) -> Endo<M> {
        Rc::new(move |model: M| self.apply(&model))
    }
}

/// Lifts a field-local update to the whole model.
pub fn lift<M, L>(lens: L, update: Endo<L::Value>) -> Endo<M>
where
    M: Clone + 'static,
    L: FieldLens<M>,
{
    RecordTransform::new().with(lens, update).into_endo()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormModel;

    #[derive(Clone, Debug, PartialEq, calmform_derive::FormModel)]
    struct Profile {
        name: String,
        age: i64,
        subscribed: bool,
    }

    fn alice() -> Profile {
        Profile {
            name: "Alice".into(),
            age: 30,
            subscribed: false,
        }
    }

    #[test]
    fn empty_transform_copies_model() {
        let model = alice();
        assert_eq!(RecordTransform::new().apply(&model), model);
    }

    #[test]
    fn mapped_fields_change_and_others_are_copied() {
        let fields = Profile::fields();
        let model = alice();
        let transform = RecordTransform::new()
            .with(fields.age(), endo(|age: i64| age + 1))
            .with(fields.subscribed(), endo(|flag: bool| !flag));

        let next = transform.apply(&model);
        assert_eq!(next.age, 31);
        assert!(next.subscribed);
        assert_eq!(next.name, "Alice");
        assert_eq!(model, alice());
        assert_eq!(
            transform.keys().collect::<Vec<_>>(),
            vec![fields.age().key(), fields.subscribed().key()]
        );
    }

    #[test]
    fn identity_and_replace() {
        assert_eq!(identity::<i64>()(4), 4);
        assert_eq!(replace(9)(4), 9);
    }

    #[test]
    fn lift_targets_one_field() {
        let fields = Profile::fields();
        let rename = lift(fields.name(), replace("Bob".to_string()));
        let next = rename(alice());
        assert_eq!(next.name, "Bob");
        assert_eq!(next.age, 30);
    }
}
