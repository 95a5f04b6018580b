pub mod dom;
pub mod fields;
pub mod form;
pub mod prelude;
pub mod state;
pub mod stream;

pub use form::{Form, FormError, FormResult, FormSinks, FormSources};
