mod channel;
mod compose;
pub mod endo;
mod field;
mod isolate;
mod model;
mod tagger;
mod touched;
mod validation;


pub use calmform_derive::FormModel;
pub use channel::{Channel, ExtraSinks, ExtraSources};
pub use compose::{
    CustomSubmission, FieldViews, Form, FormBuilder, FormOptions, FormSinks, FormSources,
    KeyPredicate, Layout, Submission, ctrl_or_meta_enter, layout,
};
pub use endo::{Endo, RecordTransform, endo, identity, lift, replace};
pub use field::{
    Effect, FieldInstance, FieldModule, FieldProps, FieldSinks, FieldSources, FormMeta, Intent,
    SimpleField, View,
};
pub use isolate::{IsolatedForm, IsolationScope, Lens};
pub use model::{FieldKey, FieldLens, FormError, FormModel, FormResult, ValidationError};
pub use tagger::{tag_node, tag_scoped};
pub use touched::{TouchTracker, Untouch};
pub use validation::{Validation, ValidatorFn, Validators, validate};
