//! Positional child reconciliation.
//!
//! Old and new children are matched purely by position and kind. There is no keyed matching: a
//! kind change at a position always replaces, even if a later old sibling would have matched.

use tracing::trace;

use crate::{
    element::Element,
    fiber::{Effect, Fiber, NodeId},
    host::HostAdapter,
    scheduler::Reconciler,
};

impl<A: HostAdapter> Reconciler<A> {
    /// Builds the new child list of `parent` from `elements`, diffing against the children of
    /// `parent`'s previous version.
    ///
    /// Reused positions become `Update` fibers sharing the old host node, new positions become
    /// `Create` fibers, and unmatched old fibers are tagged `Delete` and queued in the deletion
    /// set. The host surface is not touched.
    pub(crate) fn reconcile_children(&mut self, parent: NodeId, elements: &[Element]) {
        let mut old = self.arena[parent]
            .alternate
            .and_then(|alternate| self.arena[alternate].child);
        let mut previous: Option<NodeId> = None;
        let mut index = 0;

        while index < elements.len() || old.is_some() {
            let element = elements.get(index);
            let reused = match (old, element) {
                (Some(old_id), Some(element)) if self.arena[old_id].kind.matches(element.kind()) => {
                    Some(self.reuse(old_id, element, parent))
                }
                _ => None,
            };

            let fiber = reused.or_else(|| {
                if let Some(old_id) = old {
                    self.arena[old_id].effect = Some(Effect::Delete);
                    self.deletions.push(old_id);
                }
                element.map(|element| self.arena.insert(Fiber::from_element(element, parent)))
            });

            if let Some(old_id) = old {
                old = self.arena[old_id].sibling;
            }

            if let Some(id) = fiber {
                match previous {
                    None => self.arena[parent].child = Some(id),
                    Some(prev) => self.arena[prev].sibling = Some(id),
                }
                previous = Some(id);
            }
            index += 1;
        }

        trace!(
            parent = parent.index(),
            children = elements.len(),
            pending_deletions = self.deletions.len(),
            "children reconciled"
        );
    }

    fn reuse(&mut self, old_id: NodeId, element: &Element, parent: NodeId) -> NodeId {
        let mut fiber = Fiber::from_element(element, parent);
        fiber.host = self.arena[old_id].host.clone();
        fiber.alternate = Some(old_id);
        fiber.effect = Some(Effect::Update);
        self.arena.insert(fiber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        element::{Component, text},
        fiber::FiberKind,
        tests::{NullAdapter, children_of, committed},
    };

    fn list(kinds: &[&str]) -> Element {
        kinds
            .iter()
            .fold(Element::new("ul"), |list, kind| list.child(Element::new(*kind)))
    }

    /// Commits `old`, then seeds `new` and reconciles down to the `ul` children.
    fn reconcile_list(old: &[&str], new: &[&str]) -> (Reconciler<NullAdapter>, NodeId) {
        let mut reconciler = committed(list(old));
        reconciler.begin_work(list(new), 0);
        let root = reconciler.next_unit_of_work().expect("seeded");
        let ul = reconciler
            .perform_unit_of_work(root)
            .expect("root expands")
            .expect("ul fiber");
        reconciler.perform_unit_of_work(ul).expect("ul expands");
        (reconciler, ul)
    }

    fn effects(reconciler: &Reconciler<NullAdapter>, parent: NodeId) -> Vec<Option<Effect>> {
        children_of(reconciler, parent)
            .into_iter()
            .map(|id| reconciler.fiber(id).expect("live").effect())
            .collect()
    }

    #[test]
    fn first_render_creates_everything() {
        let mut reconciler = Reconciler::new(NullAdapter::default());
        reconciler.begin_work(list(&["li", "li"]), 0);
        let root = reconciler.next_unit_of_work().expect("seeded");
        let ul = reconciler
            .perform_unit_of_work(root)
            .expect("root expands")
            .expect("ul fiber");
        reconciler.perform_unit_of_work(ul).expect("ul expands");

        assert_eq!(
            effects(&reconciler, ul),
            [Some(Effect::Create), Some(Effect::Create)]
        );
        assert!(reconciler.deletions().is_empty());
    }

    #[test]
    fn kind_change_replaces_instead_of_updating() {
        let (reconciler, ul) = reconcile_list(&["div"], &["span"]);

        assert_eq!(effects(&reconciler, ul), [Some(Effect::Create)]);
        assert_eq!(reconciler.deletions().len(), 1);
        let deleted = reconciler.fiber(reconciler.deletions()[0]).expect("live");
        assert_eq!(deleted.kind().tag(), Some("div"));
        assert_eq!(deleted.effect(), Some(Effect::Delete));
    }

    #[test]
    fn shrinking_list_deletes_the_tail() {
        let (reconciler, ul) = reconcile_list(&["a", "b", "c"], &["a", "b"]);

        assert_eq!(
            effects(&reconciler, ul),
            [Some(Effect::Update), Some(Effect::Update)]
        );
        let tags: Vec<_> = children_of(&reconciler, ul)
            .into_iter()
            .map(|id| reconciler.fiber(id).expect("live").kind().tag().map(str::to_owned))
            .collect();
        assert_eq!(tags, [Some("a".to_owned()), Some("b".to_owned())]);
        assert_eq!(reconciler.deletions().len(), 1);
        let deleted = reconciler.fiber(reconciler.deletions()[0]).expect("live");
        assert_eq!(deleted.kind().tag(), Some("c"));
    }

    #[test]
    fn growing_list_creates_the_tail() {
        let (reconciler, ul) = reconcile_list(&["a"], &["a", "b"]);

        assert_eq!(
            effects(&reconciler, ul),
            [Some(Effect::Update), Some(Effect::Create)]
        );
        assert!(reconciler.deletions().is_empty());
    }

    #[test]
    fn no_keyed_matching_after_a_mismatch() {
        let (reconciler, ul) = reconcile_list(&["a", "b"], &["b", "a"]);

        assert_eq!(
            effects(&reconciler, ul),
            [Some(Effect::Create), Some(Effect::Create)]
        );
        assert_eq!(reconciler.deletions().len(), 2);
    }

    #[test]
    fn update_links_previous_version_and_host() {
        let (reconciler, ul) = reconcile_list(&["a"], &["a"]);
        let child = children_of(&reconciler, ul)[0];
        let fiber = reconciler.fiber(child).expect("live");
        let previous = reconciler
            .fiber(fiber.alternate().expect("reused"))
            .expect("old fiber is still alive");

        assert_eq!(fiber.host(), previous.host());
        assert!(fiber.host().is_some());
    }

    #[test]
    fn components_match_by_identity() {
        let card = Component::new("Card", |_| text("card"));
        let other = Component::new("Card", |_| text("card"));

        let mut reconciler = committed(Element::new(card.clone()));
        reconciler.begin_work(Element::new(card), 0);
        let root = reconciler.next_unit_of_work().expect("seeded");
        reconciler.perform_unit_of_work(root).expect("root expands");
        let child = children_of(&reconciler, root)[0];
        assert_eq!(
            reconciler.fiber(child).expect("live").effect(),
            Some(Effect::Update)
        );

        reconciler.begin_work(Element::new(other), 0);
        let root = reconciler.next_unit_of_work().expect("seeded");
        reconciler.perform_unit_of_work(root).expect("root expands");
        let child = children_of(&reconciler, root)[0];
        let fiber = reconciler.fiber(child).expect("live");
        assert!(matches!(fiber.kind(), FiberKind::Component(_)));
        assert_eq!(fiber.effect(), Some(Effect::Create));
        assert_eq!(reconciler.deletions().len(), 1);
    }
}
