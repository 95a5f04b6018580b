use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use super::model::{FieldKey, FieldLens, FormError, FormModel, FormResult};

pub type ValidatorFn<M, E> = Rc<dyn Fn(&M) -> Option<E>>;

/// Per-field validators. `None` from a validator means the value is valid.
pub struct Validators<M, E> {
    entries: BTreeMap<FieldKey, ValidatorFn<M, E>>,
}

impl<M, E> Clone for Validators<M, E> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<M, E> Default for Validators<M, E> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<M, E> Validators<M, E>
where
    M: FormModel,
    E: Clone + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `validator` for the field behind `lens`, replacing any
    /// earlier one. Fails when the model does not declare that field.
    pub fn with<L, F>(mut self, lens: L, validator: F) -> FormResult<Self>
    where
        L: FieldLens<M>,
        F: Fn(&L::Value) -> Option<E> + 'static,
    {
        let key = lens.key();
        if !M::declares(key) {
            return Err(FormError::UndeclaredField { field: key });
        }
        let wrapped: ValidatorFn<M, E> = Rc::new(move |model: &M| validator(lens.get(model)));
        self.entries.insert(key, wrapped);
        Ok(self)
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn error_for(&self, key: FieldKey, values: &M) -> Option<E> {
        self.entries.get(&key).and_then(|validator| validator(values))
    }
}

/// One full validation pass over every declared field.
#[derive(Clone, Debug, PartialEq)]
pub struct Validation<E> {
    pub errors: BTreeMap<FieldKey, Option<E>>,
    pub valid: bool,
    order: Vec<FieldKey>,
}

impl<E> Validation<E> {
    pub fn error(&self, key: FieldKey) -> Option<&E> {
        self.errors.get(&key).and_then(Option::as_ref)
    }

    /// First invalid field in declaration order.
    pub fn first_error(&self) -> Option<FieldKey> {
        self.order
            .iter()
            .copied()
            .find(|key| self.error(*key).is_some())
    }
}

/// Recomputes every declared field's error from scratch. A field without a
/// registered module or without a validator is never in error.
///
/// Panics raised by a validator propagate to the caller.
pub fn validate<M, E>(
    values: &M,
    validators: &Validators<M, E>,
    registered: &BTreeSet<FieldKey>,
) -> Validation<E>
where
    M: FormModel,
    E: Clone + 'static,
{
    let order = M::field_keys().to_vec();
    let errors = order
        .iter()
        .map(|key| {
            let error = if registered.contains(key) {
                validators.error_for(*key, values)
            } else {
                None
            };
            (*key, error)
        })
        .collect::<BTreeMap<_, _>>();
    let valid = errors.values().all(Option::is_none);
    Validation {
        errors,
        valid,
        order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, calmform_derive::FormModel)]
    struct Person {
        name: String,
        age: i64,
    }

    #[derive(Clone, Copy)]
    struct StrayLens;

    impl FieldLens<Person> for StrayLens {
        type Value = String;

        fn key(self) -> FieldKey {
            FieldKey::new("nickname")
        }

        fn get<'a>(self, model: &'a Person) -> &'a Self::Value {
            &model.name
        }

        fn set(self, model: &mut Person, value: Self::Value) {
            model.name = value;
        }
    }

    fn both_registered() -> BTreeSet<FieldKey> {
        Person::field_keys().iter().copied().collect()
    }

    fn non_negative_age() -> Validators<Person, String> {
        Validators::new()
            .with(Person::fields().age(), |age: &i64| {
                (*age < 0).then(|| "age must be non-negative".to_string())
            })
            .expect("age is declared")
    }

    #[test]
    fn negative_age_makes_form_invalid() {
        let person = Person {
            name: "Alice".into(),
            age: -1,
        };
        let validation = validate(&person, &non_negative_age(), &both_registered());
        assert_eq!(validation.error(FieldKey::new("name")), None);
        assert_eq!(
            validation.error(FieldKey::new("age")).map(String::as_str),
            Some("age must be non-negative")
        );
        assert!(!validation.valid);
        assert_eq!(validation.first_error(), Some(FieldKey::new("age")));
    }

    #[test]
    fn valid_values_clear_every_error() {
        let person = Person {
            name: "Alice".into(),
            age: 30,
        };
        let validation = validate(&person, &non_negative_age(), &both_registered());
        assert!(validation.errors.values().all(Option::is_none));
        assert_eq!(validation.errors.len(), 2);
        assert!(validation.valid);
        assert_eq!(validation.first_error(), None);
    }

    #[test]
    fn fields_without_module_are_never_in_error() {
        let person = Person {
            name: "Alice".into(),
            age: -5,
        };
        let registered = BTreeSet::from([FieldKey::new("name")]);
        let validation = validate(&person, &non_negative_age(), &registered);
        assert!(validation.valid);
    }

    #[test]
    fn undeclared_validator_key_is_rejected() {
        let result = Validators::<Person, String>::new().with(StrayLens, |_: &String| None);
        assert!(matches!(
            result.err(),
            Some(FormError::UndeclaredField { field }) if field.as_str() == "nickname"
        ));
    }
}
