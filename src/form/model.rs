use std::fmt::{Display, Formatter};

use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Typed access to one field of a form model.
pub trait FieldLens<T>: Copy + 'static {
    type Value: Clone + 'static;

    fn key(self) -> FieldKey;
    fn get<'a>(self, model: &'a T) -> &'a Self::Value;
    fn set(self, model: &mut T, value: Self::Value);
}

/// The declared shape of a form: its accessor struct and the full list of
/// field keys, in declaration order.
pub trait FormModel: Clone + 'static {
    type Fields;

    fn fields() -> Self::Fields;
    fn field_keys() -> &'static [FieldKey];

    fn declares(key: FieldKey) -> bool {
        Self::field_keys().contains(&key)
    }
}

/// Validator output that knows how to present itself to a user.
pub trait ValidationError: Clone + 'static {
    fn message(&self) -> String;
}

impl ValidationError for String {
    fn message(&self) -> String {
        self.clone()
    }
}

impl ValidationError for &'static str {
    fn message(&self) -> String {
        (*self).to_string()
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FormError {
    #[error("field `{field}` is not declared by the form model")]
    UndeclaredField { field: FieldKey },
    #[error("field `{field}` is registered more than once")]
    DuplicateField { field: FieldKey },
    #[error("custom submission names `{field}`, which has no registered field module")]
    UnknownSubmissionField { field: FieldKey },
    #[error("sink `{sink}` carries `{found}` from one field but `{expected}` from another")]
    SinkTypeMismatch {
        sink: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("source `{source_name}` was not provided")]
    MissingSource { source_name: String },
    #[error("source `{source_name}` carries `{found}`, not `{expected}`")]
    SourceTypeMismatch {
        source_name: String,
        expected: &'static str,
        found: &'static str,
    },
}

pub type FormResult<T> = Result<T, FormError>;
