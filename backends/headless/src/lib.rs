//! Headless backend for `WaterFiber`.
//!
//! [`HeadlessSurface`] is an in-memory [`HostAdapter`](waterfiber_core::HostAdapter): it keeps a
//! plain tree of nodes, records every mutation the commit phase applies, and can dispatch events to
//! bound listeners. [`HeadlessRoot`] pairs it with a [`Reconciler`] and a container node so a tree
//! can be rendered synchronously or slice by slice.

mod error;
mod snapshot;
mod surface;

pub use error::HeadlessError;
pub use snapshot::HostSnapshot;
pub use surface::{HeadlessSurface, HostId, Mutation};

use waterfiber_core::{
    CommitSummary, Deadline, Element, Event, Reconciler, Result, SchedulerConfig, WorkStatus,
};

/// Kind of the container node created by [`HeadlessRoot`].
pub const CONTAINER_KIND: &str = "root";

/// A reconciler bound to a container on a fresh [`HeadlessSurface`].
#[derive(Debug)]
pub struct HeadlessRoot {
    reconciler: Reconciler<HeadlessSurface>,
    container: HostId,
}

impl Default for HeadlessRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessRoot {
    /// Creates a root with the default scheduler configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Creates a root with an explicit scheduler configuration.
    #[must_use]
    pub fn with_config(config: SchedulerConfig) -> Self {
        let mut surface = HeadlessSurface::new();
        let container = surface.create_container(CONTAINER_KIND);
        Self {
            reconciler: Reconciler::with_config(surface, config),
            container,
        }
    }

    /// Renders `element` synchronously and returns what the commit did.
    ///
    /// # Errors
    ///
    /// Propagates any reconciliation or commit failure.
    pub fn render(&mut self, element: Element) -> Result<Option<CommitSummary>> {
        self.schedule(element);
        self.reconciler.flush()
    }

    /// Seeds a render pass without doing any work.
    pub fn schedule(&mut self, element: Element) {
        self.reconciler.render(element, self.container);
    }

    /// Runs one slice of the work loop.
    ///
    /// # Errors
    ///
    /// Propagates any reconciliation or commit failure.
    pub fn work(&mut self, deadline: &impl Deadline) -> Result<WorkStatus> {
        self.reconciler.work_loop(deadline)
    }

    /// The container node everything is rendered into.
    #[must_use]
    pub const fn container(&self) -> HostId {
        self.container
    }

    /// The underlying surface.
    #[must_use]
    pub const fn surface(&self) -> &HeadlessSurface {
        self.reconciler.adapter()
    }

    /// Mutable access to the surface, e.g. to drain its mutation log.
    pub const fn surface_mut(&mut self) -> &mut HeadlessSurface {
        self.reconciler.adapter_mut()
    }

    /// The underlying reconciler.
    #[must_use]
    pub const fn reconciler(&self) -> &Reconciler<HeadlessSurface> {
        &self.reconciler
    }

    /// Markup of everything rendered into the container.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.surface().to_html(self.container)
    }

    /// Snapshot of the container subtree.
    #[must_use]
    pub fn snapshot(&self) -> HostSnapshot {
        self.surface().snapshot(self.container)
    }

    /// Dispatches `event` to the first attached node of `kind` in document order.
    pub fn dispatch_to_first(&self, kind: &str, event: &Event) -> bool {
        self.surface()
            .find_all(self.container, kind)
            .first()
            .is_some_and(|node| self.surface().dispatch(*node, event))
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use waterfiber_core::Listener;

    use super::*;

    #[test]
    fn render_mounts_into_the_container() {
        let mut root = HeadlessRoot::new();
        let summary = root
            .render(Element::new("p").attr("class", "lead").child("hello"))
            .expect("render succeeds")
            .expect("commit happened");

        assert_eq!(summary.created, 2);
        assert_eq!(root.to_html(), "<p class=\"lead\">hello</p>");
    }

    #[test]
    fn listeners_receive_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let on_input = Listener::new(move |event: &Event| {
            sink.borrow_mut().push(event.value.clone().unwrap_or_default());
        });

        let mut root = HeadlessRoot::new();
        root.render(Element::new("input").attr("onInput", on_input))
            .expect("render succeeds");

        assert!(root.dispatch_to_first("input", &Event::new("input").with_value("water")));
        assert!(!root.dispatch_to_first("input", &Event::new("click")));
        assert_eq!(*seen.borrow(), ["water"]);
    }

    #[test]
    fn reordering_keeps_host_order() {
        let mut root = HeadlessRoot::new();
        root.render(
            Element::new("div")
                .child(Element::new("span").child("first"))
                .child(Element::new("b").child("second")),
        )
        .expect("first render");

        root.render(
            Element::new("div")
                .child(Element::new("em").child("replaced"))
                .child(Element::new("b").child("second")),
        )
        .expect("second render");

        assert_eq!(
            root.to_html(),
            "<div><em>replaced</em><b>second</b></div>"
        );
        assert!(
            root.surface()
                .mutations()
                .iter()
                .any(|mutation| matches!(mutation, Mutation::InsertBefore { .. }))
        );
    }
}
