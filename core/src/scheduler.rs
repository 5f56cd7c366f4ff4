//! The reconciler context and its cooperative work loop.
//!
//! A [`Reconciler`] owns every piece of mutable render state: the fiber arena, the `current` and
//! work-in-progress roots, the deletion set and the next-unit-of-work pointer. It is the only
//! writer of that state, and it is meant to be driven from a single thread by whatever owns the
//! host's idle/yield primitive.
//!
//! ```text
//! begin_work ──► perform_unit_of_work ──► ... ──► commit_root
//!                 (one fiber per call,             (uninterruptible,
//!                  may yield in between)            swaps `current`)
//! ```

use alloc::{rc::Rc, vec::Vec};

use tracing::{debug, error, trace, warn};

use crate::{
    config::SchedulerConfig,
    deadline::{Deadline, Unbounded},
    element::{Element, TEXT},
    error::{ReconcileError, Result},
    fiber::{Effect, Fiber, FiberArena, FiberKind, NodeId},
    host::HostAdapter,
};

/// Number of effects applied by one commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Fibers tagged `Create`.
    pub created: usize,
    /// Fibers tagged `Update`.
    pub updated: usize,
    /// Fibers tagged `Delete`.
    pub deleted: usize,
}

/// Outcome of one call to [`Reconciler::work_loop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing was scheduled.
    Idle,
    /// The slice ran out; call again with a fresh deadline.
    Pending,
    /// The pass finished and was committed.
    Committed(CommitSummary),
}

/// Owner of all render state for one host container.
#[derive(Debug)]
pub struct Reconciler<A: HostAdapter> {
    pub(crate) adapter: A,
    pub(crate) config: SchedulerConfig,
    pub(crate) arena: FiberArena<A::Handle>,
    pub(crate) current: Option<NodeId>,
    pub(crate) work_in_progress: Option<NodeId>,
    pub(crate) next_unit_of_work: Option<NodeId>,
    pub(crate) deletions: Vec<NodeId>,
}

impl<A: HostAdapter> Reconciler<A> {
    /// Creates a reconciler with the default configuration.
    pub fn new(adapter: A) -> Self {
        Self::with_config(adapter, SchedulerConfig::default())
    }

    /// Creates a reconciler with an explicit configuration.
    pub fn with_config(adapter: A, config: SchedulerConfig) -> Self {
        Self {
            adapter,
            config,
            arena: FiberArena::new(),
            current: None,
            work_in_progress: None,
            next_unit_of_work: None,
            deletions: Vec::new(),
        }
    }

    /// Schedules `root` to be rendered into `container`.
    ///
    /// Returns immediately; the work happens in [`work_loop`](Self::work_loop). A pass that has not
    /// been committed yet is thrown away. If `container` differs from the one `current` is mounted
    /// in, nothing is reused: the old tree is removed from its container and the new one is built
    /// from scratch.
    pub fn begin_work(&mut self, root: Element, container: A::Handle) {
        if let Some(in_flight) = self.work_in_progress.take() {
            warn!(root = in_flight.index(), "replacing an uncommitted render pass");
            self.discard(in_flight);
        }

        let alternate = self.current.filter(|current| {
            self.arena[*current].host.as_ref() == Some(&container)
        });
        if alternate.is_none() {
            self.unmount_current();
        }

        let root = self.arena.insert(Fiber::root(container, root, alternate));
        self.work_in_progress = Some(root);
        self.next_unit_of_work = Some(root);
        debug!(root = root.index(), "render pass seeded");
    }

    /// Entry point used by host drivers. Equivalent to [`begin_work`](Self::begin_work).
    pub fn render(&mut self, root: Element, container: A::Handle) {
        self.begin_work(root, container);
    }

    /// Processes exactly one fiber, advances [`next_unit_of_work`](Self::next_unit_of_work) and
    /// returns the new value, the next fiber in depth-first pre-order.
    ///
    /// `id` must be the pending next unit; units cannot be skipped or replayed.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::NotNextUnit`] without touching any state when `id` is not the
    /// pending unit. Fails on malformed elements and component errors, in which case the in-flight
    /// pass is discarded and `current` is left untouched.
    pub fn perform_unit_of_work(&mut self, id: NodeId) -> Result<Option<NodeId>> {
        if self.next_unit_of_work != Some(id) || self.arena.get(id).is_none() {
            return Err(ReconcileError::NotNextUnit(id));
        }
        trace!(fiber = id.index(), kind = ?self.arena[id].kind, "unit of work");
        match self.expand(id) {
            Ok(children) => {
                self.reconcile_children(id, &children);
                self.next_unit_of_work = self.next_after(id);
                Ok(self.next_unit_of_work)
            }
            Err(err) => {
                error!(fiber = id.index(), error = %err, "render pass aborted");
                if let Some(in_flight) = self.work_in_progress.take() {
                    self.discard(in_flight);
                }
                Err(err)
            }
        }
    }

    /// Runs units of work while the deadline leaves more than the yield floor, committing once
    /// the tree is finished.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`perform_unit_of_work`](Self::perform_unit_of_work) and
    /// [`commit_root`](Self::commit_root).
    pub fn work_loop(&mut self, deadline: &impl Deadline) -> Result<WorkStatus> {
        let mut performed = 0_usize;
        while let Some(unit) = self.next_unit_of_work {
            if deadline.time_remaining() <= self.config.yield_floor {
                break;
            }
            self.perform_unit_of_work(unit)?;
            performed += 1;
        }
        trace!(performed, "slice finished");

        if self.next_unit_of_work.is_some() {
            return Ok(WorkStatus::Pending);
        }
        if self.work_in_progress.is_some() {
            return self.commit_root().map(WorkStatus::Committed);
        }
        Ok(WorkStatus::Idle)
    }

    /// Drives the scheduled pass to completion without yielding.
    ///
    /// # Errors
    ///
    /// See [`work_loop`](Self::work_loop).
    pub fn flush(&mut self) -> Result<Option<CommitSummary>> {
        match self.work_loop(&Unbounded)? {
            WorkStatus::Committed(summary) => Ok(Some(summary)),
            WorkStatus::Idle | WorkStatus::Pending => Ok(None),
        }
    }

    /// Root of the committed tree.
    #[must_use]
    pub const fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Root of the tree under construction.
    #[must_use]
    pub const fn work_in_progress(&self) -> Option<NodeId> {
        self.work_in_progress
    }

    /// The fiber the next slice will start from.
    #[must_use]
    pub const fn next_unit_of_work(&self) -> Option<NodeId> {
        self.next_unit_of_work
    }

    /// Fibers scheduled for removal by the in-flight pass, in decision order.
    #[must_use]
    pub fn deletions(&self) -> &[NodeId] {
        &self.deletions
    }

    /// Looks up a fiber.
    #[must_use]
    pub fn fiber(&self, id: NodeId) -> Option<&Fiber<A::Handle>> {
        self.arena.get(id)
    }

    /// Number of live fibers across both trees.
    #[must_use]
    pub fn fiber_count(&self) -> usize {
        self.arena.len()
    }

    /// The scheduler configuration.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The host adapter.
    #[must_use]
    pub const fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Mutable access to the host adapter, for host-side event dispatch.
    pub const fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    fn expand(&self, id: NodeId) -> Result<Rc<[Element]>> {
        let fiber = &self.arena[id];
        match &fiber.kind {
            FiberKind::Root => Ok(fiber.props.children_rc()),
            FiberKind::Component(component) => {
                let child = component
                    .render(&fiber.props)
                    .map_err(|source| ReconcileError::Component {
                        name: component.name(),
                        source,
                    })?;
                Ok(Rc::from([child]))
            }
            FiberKind::Primitive(tag) => {
                if tag.is_empty() {
                    return Err(ReconcileError::malformed("primitive element with an empty tag"));
                }
                if &**tag == TEXT && !fiber.props.children().is_empty() {
                    return Err(ReconcileError::malformed("TEXT element with children"));
                }
                Ok(fiber.props.children_rc())
            }
        }
    }

    fn next_after(&self, id: NodeId) -> Option<NodeId> {
        if let Some(child) = self.arena[id].child {
            return Some(child);
        }
        let mut next = Some(id);
        while let Some(fiber) = next {
            if let Some(sibling) = self.arena[fiber].sibling {
                return Some(sibling);
            }
            next = self.arena[fiber].parent;
        }
        None
    }

    /// Queues every top-level child of `current` for deletion. Used when the container changes,
    /// since nothing mounted in the old container can be reused.
    fn unmount_current(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        warn!(root = current.index(), "container changed, remounting the whole tree");
        let mut next = self.arena[current].child;
        while let Some(id) = next {
            self.arena[id].effect = Some(Effect::Delete);
            self.deletions.push(id);
            next = self.arena[id].sibling;
        }
    }

    /// Drops an uncommitted tree and removes the `Delete` tags it left on `current`.
    pub(crate) fn discard(&mut self, root: NodeId) {
        self.arena.release_subtree(root);
        for id in self.deletions.drain(..) {
            if let Some(fiber) = self.arena.get_mut(id) {
                fiber.effect = None;
            }
        }
        self.next_unit_of_work = None;
        debug!(root = root.index(), "render pass discarded");
    }
}
