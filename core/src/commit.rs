//! The commit phase: the only code that mutates the host surface.

use tracing::{error, info};

use crate::{
    element::Props,
    error::{ReconcileError, Result},
    fiber::{Effect, FiberKind, NodeId},
    host::HostAdapter,
    scheduler::{CommitSummary, Reconciler},
};

impl<A: HostAdapter> Reconciler<A> {
    /// Applies the finished work-in-progress tree to the host surface and makes it `current`.
    ///
    /// Deletions run first, in the order they were decided. Then every fiber below the root is
    /// visited in pre-order: `Create` fibers get a fresh host node, `Update` fibers get an
    /// attribute diff. Components contribute nothing themselves; their descendants attach to the
    /// nearest host ancestor.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::NoWorkInProgress`] if no finished tree is waiting. A host adapter
    /// failure aborts the commit midway: the in-flight tree is dropped, `current` keeps pointing at
    /// the previous tree and the host surface may be partially updated. There is no rollback.
    pub fn commit_root(&mut self) -> Result<CommitSummary> {
        let root = match (self.work_in_progress, self.next_unit_of_work) {
            (Some(root), None) => root,
            _ => return Err(ReconcileError::NoWorkInProgress),
        };

        match self.apply_effects(root) {
            Ok(summary) => {
                self.retire(root);
                info!(
                    created = summary.created,
                    updated = summary.updated,
                    deleted = summary.deleted,
                    "commit finished"
                );
                Ok(summary)
            }
            Err(err) => {
                error!(error = %err, "commit failed, host surface may be partially updated");
                self.work_in_progress = None;
                self.discard(root);
                Err(err)
            }
        }
    }

    fn apply_effects(&mut self, root: NodeId) -> Result<CommitSummary> {
        let mut summary = CommitSummary::default();

        for id in self.deletions.clone() {
            self.commit_deletion(id)?;
            summary.deleted += 1;
        }

        for id in self.arena.subtree(root).into_iter().skip(1) {
            match self.arena[id].effect {
                Some(Effect::Create) => {
                    self.commit_placement(id)?;
                    summary.created += 1;
                }
                Some(Effect::Update) => {
                    self.commit_update(id)?;
                    summary.updated += 1;
                }
                Some(Effect::Delete) | None => {}
            }
        }
        Ok(summary)
    }

    /// Makes `root` current and releases the tree it replaces.
    fn retire(&mut self, root: NodeId) {
        if let Some(previous) = self.current.replace(root) {
            self.arena.release_subtree(previous);
        }
        for id in self.arena.subtree(root) {
            let fiber = &mut self.arena[id];
            fiber.alternate = None;
            fiber.effect = None;
        }
        self.deletions.clear();
        self.work_in_progress = None;
    }

    fn commit_deletion(&mut self, id: NodeId) -> Result<()> {
        let parent = self.host_parent(id)?;
        let mut node = Some(id);
        while let Some(current) = node {
            if let Some(host) = &self.arena[current].host {
                return self
                    .adapter
                    .detach_child(&parent, host)
                    .map_err(ReconcileError::host);
            }
            node = self.arena[current].child;
        }
        Ok(())
    }

    fn commit_placement(&mut self, id: NodeId) -> Result<()> {
        let Some(tag) = self.arena[id].kind.tag() else {
            return Ok(());
        };
        let parent = self.host_parent(id)?;
        let anchor = self.host_sibling(id);

        let host = self.adapter.create_node(tag).map_err(ReconcileError::host)?;
        for (name, value) in self.arena[id].props.attributes() {
            self.adapter
                .set_attribute(&host, name, value)
                .map_err(ReconcileError::host)?;
        }
        match anchor {
            Some(anchor) => self.adapter.insert_before(&parent, &host, &anchor),
            None => self.adapter.attach_child(&parent, &host),
        }
        .map_err(ReconcileError::host)?;

        self.arena[id].host = Some(host);
        Ok(())
    }

    fn commit_update(&mut self, id: NodeId) -> Result<()> {
        let fiber = &self.arena[id];
        let (Some(host), Some(previous)) = (&fiber.host, fiber.alternate) else {
            return Ok(());
        };
        let old: &Props = &self.arena[previous].props;
        let new = &fiber.props;

        for (name, value) in old.attributes() {
            if new.get(name).is_none() {
                self.adapter
                    .clear_attribute(host, name, value)
                    .map_err(ReconcileError::host)?;
            }
        }
        for (name, value) in new.attributes() {
            match old.get(name) {
                Some(previous) if previous == value => {}
                // Switching between a listener and a plain value goes through the other branch of
                // the adapter, so the old value has to be removed explicitly.
                Some(previous)
                    if previous.as_listener().is_some() || value.as_listener().is_some() =>
                {
                    self.adapter
                        .clear_attribute(host, name, previous)
                        .map_err(ReconcileError::host)?;
                    self.adapter
                        .set_attribute(host, name, value)
                        .map_err(ReconcileError::host)?;
                }
                _ => self
                    .adapter
                    .set_attribute(host, name, value)
                    .map_err(ReconcileError::host)?,
            }
        }
        Ok(())
    }

    /// Host node of the nearest ancestor that owns one.
    fn host_parent(&self, id: NodeId) -> Result<A::Handle> {
        let mut next = self.arena[id].parent;
        while let Some(parent) = next {
            if let Some(host) = &self.arena[parent].host {
                return Ok(host.clone());
            }
            next = self.arena[parent].parent;
        }
        Err(ReconcileError::malformed("fiber has no host ancestor"))
    }

    /// The first host node after `id` in sibling order that is already mounted.
    ///
    /// Walks forward through siblings, descending through components and climbing out of them,
    /// skipping anything placed by this same commit. `None` means append.
    fn host_sibling(&self, id: NodeId) -> Option<A::Handle> {
        let is_component = |node: NodeId| matches!(self.arena[node].kind, FiberKind::Component(_));
        let mut node = id;
        'siblings: loop {
            while self.arena[node].sibling.is_none() {
                let parent = self.arena[node].parent?;
                if !is_component(parent) {
                    return None;
                }
                node = parent;
            }
            node = self.arena[node].sibling?;

            while is_component(node) {
                if self.arena[node].effect == Some(Effect::Create) {
                    continue 'siblings;
                }
                match self.arena[node].child {
                    Some(child) => node = child,
                    None => continue 'siblings,
                }
            }
            if self.arena[node].effect != Some(Effect::Create) {
                return self.arena[node].host.clone();
            }
        }
    }
}
