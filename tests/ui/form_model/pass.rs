use calmform::form::{FieldKey, FieldLens, FormModel};

#[derive(Clone, calmform::form::FormModel)]
struct SignupForm {
    email: String,
    accept_terms: bool,
}

fn main() {
    let fields = SignupForm::fields();
    let email = fields.email();
    let mut model = SignupForm {
        email: "a@calm.form".to_string(),
        accept_terms: false,
    };
    email.set(&mut model, "b@calm.form".to_string());
    fields.accept_terms().set(&mut model, true);

    assert_eq!(email.key().as_str(), "email");
    assert_eq!(email.get(&model), "b@calm.form");
    assert!(*fields.accept_terms().get(&model));
    assert_eq!(
        SignupForm::field_keys(),
        &[FieldKey::new("email"), FieldKey::new("accept_terms")]
    );
    assert!(SignupForm::declares(FieldKey::new("accept_terms")));
    assert!(!SignupForm::declares(FieldKey::new("nickname")));
}
