//! Ready-made simple field modules.
//!
//! Every field renders a `div.calm-field` holding a label, its control and,
//! once the field is touched and invalid, a `.calm-field-error` node.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::dom::{DomEvent, DomSource, EventKind, VNode};
use crate::form::{Endo, FieldProps, FormMeta, SimpleField, ValidationError, endo, replace};
use crate::stream::{Stream, merge};

pub fn text_input<E: ValidationError>(label: impl Into<String>) -> SimpleField<String, E> {
    let label = label.into();
    SimpleField::new(
        |dom| text_updates(dom, "input"),
        move |props, meta| {
            let control = VNode::element("input")
                .attr("type", "text")
                .attr("value", props.value.clone());
            field_shell(&label, control, props, meta)
        },
    )
}

pub fn textarea<E: ValidationError>(label: impl Into<String>) -> SimpleField<String, E> {
    let label = label.into();
    SimpleField::new(
        |dom| text_updates(dom, "textarea"),
        move |props, meta| {
            let control = VNode::element("textarea").text(props.value.clone());
            field_shell(&label, control, props, meta)
        },
    )
}

/// Parses the control's text as a decimal. Input that does not parse leaves
/// the value unchanged.
pub fn number_input<E: ValidationError>(label: impl Into<String>) -> SimpleField<Decimal, E> {
    let label = label.into();
    SimpleField::new(
        |dom| {
            value_events(dom, "input").filter_map(|event| {
                let raw = event.value.as_deref()?;
                let parsed = Decimal::from_str(raw.trim()).ok()?;
                Some(replace(parsed))
            })
        },
        move |props, meta| {
            let control = VNode::element("input")
                .attr("type", "number")
                .attr("value", props.value.to_string());
            field_shell(&label, control, props, meta)
        },
    )
}

/// Flips its value on every `change` of the box.
pub fn checkbox<E: ValidationError>(label: impl Into<String>) -> SimpleField<bool, E> {
    let label = label.into();
    SimpleField::new(
        |dom| {
            dom.select("input")
                .events(EventKind::Change)
                .map(|_| -> Endo<bool> { endo(|checked: bool| !checked) })
        },
        move |props, meta| {
            let mut control = VNode::element("input").attr("type", "checkbox");
            if props.value {
                control = control.attr("checked", "checked");
            }
            field_shell(&label, control, props, meta)
        },
    )
}

fn value_events(dom: &DomSource, selector: &str) -> Stream<DomEvent> {
    let control = dom.select(selector);
    merge([
        control.events(EventKind::Input),
        control.events(EventKind::Change),
    ])
}

fn text_updates(dom: &DomSource, selector: &str) -> Stream<Endo<String>> {
    value_events(dom, selector).filter_map(|event| event.value.clone().map(replace))
}

fn field_shell<V, E: ValidationError>(
    label: &str,
    control: VNode,
    props: &FieldProps<V, E>,
    meta: &FormMeta,
) -> VNode {
    let mut shell = VNode::element("div")
        .class("calm-field")
        .attr("data-touched", props.touched.to_string())
        .attr("data-form-valid", meta.valid.to_string())
        .child(VNode::element("label").text(label))
        .child(control);
    if props.touched {
        if let Some(error) = &props.error {
            shell = shell.child(
                VNode::element("span")
                    .class("calm-field-error")
                    .text(error.message()),
            );
        }
    }
    shell
}
