pub use crate::dom::{DomEvent, DomSource, EventKind, EventTarget, KeyboardEvent, Scope, VNode};
pub use crate::fields::{checkbox, number_input, text_input, textarea};
pub use crate::form::{
    CustomSubmission, FieldKey, FieldLens, FieldModule, FieldSinks, FieldSources, FieldViews, Form,
    FormModel, FormOptions, FormSinks, FormSources, IsolationScope, Lens, SimpleField, Submission,
    Untouch, Validators, layout,
};
pub use crate::state::{StateLoop, StateSource};
pub use crate::stream::{MemoryStream, Stream, Subscription};
