use std::rc::Rc;

use crate::stream::{Emitter, Stream, channel};

use super::event::{DomEvent, EventKind};
use super::scope::{Namespace, Scope};

/// Event source handed to components. Narrowing is structural: an isolated
/// source only sees events whose target namespace lies under its own.
#[derive(Clone)]
pub struct DomSource {
    events: Stream<DomEvent>,
    namespace: Namespace,
    selectors: Rc<[String]>,
}

impl DomSource {
    pub fn new(events: Stream<DomEvent>) -> Self {
        Self {
            events,
            namespace: Namespace::root(),
            selectors: Rc::from(Vec::new()),
        }
    }

    /// A root source plus the emitter a host dispatches events through.
    pub fn channel() -> (Emitter<DomEvent>, Self) {
        let (emitter, events) = channel();
        (emitter, Self::new(events))
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn isolate(&self, scope: Scope) -> Self {
        Self {
            events: self.events.clone(),
            namespace: self.namespace.child(scope),
            selectors: self.selectors.clone(),
        }
    }

    /// Every selector added must match the event target.
    pub fn select(&self, selector: impl Into<String>) -> Self {
        let mut selectors = self.selectors.to_vec();
        selectors.push(selector.into());
        Self {
            events: self.events.clone(),
            namespace: self.namespace.clone(),
            selectors: Rc::from(selectors),
        }
    }

    pub fn events(&self, kind: EventKind) -> Stream<DomEvent> {
        let namespace = self.namespace.clone();
        let selectors = self.selectors.clone();
        self.events.filter(move |event| {
            event.kind == kind
                && event.target.namespace.starts_with(&namespace)
                && selectors
                    .iter()
                    .all(|selector| event.target.matches(selector))
        })
    }

    /// Like [`DomSource::events`], but only for targets sitting directly in
    /// this source's scope. Events raised inside a nested isolated scope are
    /// left to that scope.
    pub fn own_events(&self, kind: EventKind) -> Stream<DomEvent> {
        let namespace = self.namespace.clone();
        self.events(kind)
            .filter(move |event| event.target.namespace == namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::EventTarget;
    use std::cell::RefCell;

    #[test]
    fn isolated_sources_do_not_see_sibling_events() {
        let (tx, root) = DomSource::channel();
        let name = root.isolate(Scope::named("name"));
        let age = root.isolate(Scope::named("age"));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let name_seen = seen.clone();
        let _name = name
            .events(EventKind::Input)
            .subscribe(move |_| name_seen.borrow_mut().push("name"));
        let age_seen = seen.clone();
        let _age = age
            .events(EventKind::Input)
            .subscribe(move |_| age_seen.borrow_mut().push("age"));

        tx.emit(DomEvent::new(
            EventKind::Input,
            EventTarget::new("input").namespace(["age"]),
        ));
        assert_eq!(*seen.borrow(), vec!["age"]);
    }

    #[test]
    fn select_filters_on_target_and_kind() {
        let (tx, root) = DomSource::channel();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        let _subscription = root
            .select("form")
            .events(EventKind::Submit)
            .subscribe(move |_| *counter.borrow_mut() += 1);

        tx.emit(DomEvent::new(EventKind::Submit, EventTarget::new("form")));
        tx.emit(DomEvent::new(EventKind::Submit, EventTarget::new("div")));
        tx.emit(DomEvent::new(EventKind::Click, EventTarget::new("form")));
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn own_events_skip_nested_scopes() {
        let (tx, root) = DomSource::channel();
        let profile = root.isolate(Scope::named("profile"));
        let hits = Rc::new(RefCell::new(Vec::new()));
        let sink = hits.clone();
        let _subscription = profile
            .select("form")
            .own_events(EventKind::Submit)
            .subscribe(move |event| sink.borrow_mut().push(event.target.namespace.to_string()));

        for path in [vec!["profile"], vec!["profile", "description"], vec![]] {
            let namespace = Namespace::from(
                path.into_iter().map(Scope::named).collect::<Vec<_>>(),
            );
            tx.emit(DomEvent::new(
                EventKind::Submit,
                EventTarget::new("form").namespace(namespace),
            ));
        }
        assert_eq!(*hits.borrow(), vec!["/profile".to_string()]);
    }
}
