use crate::dom::{Namespace, Scope, VNode};

/// Stamps `node` with the isolation descriptor `namespace / scope` and, when
/// it has none, a key derived from the effective descriptor.
///
/// A node that already carries a deeper descriptor keeps it: a field that
/// isolated its own subtree is never pulled back up to the field scope.
pub fn tag_scoped(node: Option<VNode>, namespace: &Namespace, scope: &Scope) -> Option<VNode> {
    node.map(|node| tag_node(node, namespace, scope))
}

pub fn tag_node(mut node: VNode, namespace: &Namespace, scope: &Scope) -> VNode {
    let descriptor = namespace.child(scope.clone());
    let keep_existing = node
        .isolate
        .as_ref()
        .is_some_and(|existing| existing.depth() > descriptor.depth());
    if !keep_existing {
        node.isolate = Some(descriptor);
    }
    if node.key.is_none() {
        node.key = node
            .isolate
            .as_ref()
            .map(|isolate| format!("isolate:{isolate}"));
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_node_stays_absent() {
        assert_eq!(
            tag_scoped(None, &Namespace::root(), &Scope::named("name")),
            None
        );
    }

    #[test]
    fn tags_with_namespace_and_derives_key() {
        let tagged = tag_node(
            VNode::element("div"),
            &Namespace::from(["profile"]),
            &Scope::named("name"),
        );
        assert_eq!(tagged.isolate, Some(Namespace::from(["profile", "name"])));
        assert_eq!(tagged.key.as_deref(), Some("isolate:/profile/name"));
    }

    #[test]
    fn existing_key_is_preserved() {
        let tagged = tag_node(
            VNode::element("div").key("mine"),
            &Namespace::root(),
            &Scope::named("name"),
        );
        assert_eq!(tagged.key.as_deref(), Some("mine"));
    }

    #[test]
    fn deeper_descriptor_wins_over_shallower_scope() {
        let mut inner = VNode::element("div");
        inner.isolate = Some(Namespace::from(["profile", "name", "inner"]));

        let tagged = tag_node(inner.clone(), &Namespace::from(["profile"]), &Scope::named("name"));
        assert_eq!(tagged.isolate, inner.isolate);

        let again = tag_node(tagged.clone(), &Namespace::root(), &Scope::named("profile"));
        assert_eq!(again, tagged);
    }

    #[test]
    fn retagging_with_same_scope_is_idempotent() {
        let namespace = Namespace::from(["profile"]);
        let scope = Scope::named("age");
        let once = tag_node(VNode::element("input"), &namespace, &scope);
        let twice = tag_node(once.clone(), &namespace, &scope);
        assert_eq!(once, twice);
    }
}
