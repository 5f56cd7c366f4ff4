//! Shared fixtures for the reconciler's unit tests.

use core::convert::Infallible;

use crate::{
    element::{Element, PropValue},
    fiber::NodeId,
    host::HostAdapter,
    scheduler::Reconciler,
};

/// Adapter that hands out numbered handles and counts calls without keeping a tree.
#[derive(Debug, Default)]
pub struct NullAdapter {
    pub calls: usize,
    pub created: u32,
}

impl HostAdapter for NullAdapter {
    type Handle = u32;
    type Error = Infallible;

    fn create_node(&mut self, _kind: &str) -> Result<u32, Infallible> {
        self.calls += 1;
        self.created += 1;
        Ok(self.created)
    }

    fn set_attribute(&mut self, _: &u32, _: &str, _: &PropValue) -> Result<(), Infallible> {
        self.calls += 1;
        Ok(())
    }

    fn clear_attribute(&mut self, _: &u32, _: &str, _: &PropValue) -> Result<(), Infallible> {
        self.calls += 1;
        Ok(())
    }

    fn attach_child(&mut self, _: &u32, _: &u32) -> Result<(), Infallible> {
        self.calls += 1;
        Ok(())
    }

    fn insert_before(&mut self, _: &u32, _: &u32, _: &u32) -> Result<(), Infallible> {
        self.calls += 1;
        Ok(())
    }

    fn detach_child(&mut self, _: &u32, _: &u32) -> Result<(), Infallible> {
        self.calls += 1;
        Ok(())
    }
}

/// Kind that [`RefusingAdapter`] will not create.
pub const REFUSED_KIND: &str = "refused";

#[derive(Debug, thiserror::Error)]
#[error("cannot create a `{0}` node")]
pub struct Refused(String);

/// Adapter that fails to create [`REFUSED_KIND`] nodes and records detaches and cleared
/// attribute names.
#[derive(Debug, Default)]
pub struct RefusingAdapter {
    pub created: u32,
    pub detached: usize,
    pub cleared: Vec<String>,
}

impl HostAdapter for RefusingAdapter {
    type Handle = u32;
    type Error = Refused;

    fn create_node(&mut self, kind: &str) -> Result<u32, Refused> {
        if kind == REFUSED_KIND {
            return Err(Refused(kind.to_owned()));
        }
        self.created += 1;
        Ok(self.created)
    }

    fn set_attribute(&mut self, _: &u32, _: &str, _: &PropValue) -> Result<(), Refused> {
        Ok(())
    }

    fn clear_attribute(&mut self, _: &u32, name: &str, _: &PropValue) -> Result<(), Refused> {
        self.cleared.push(name.to_owned());
        Ok(())
    }

    fn attach_child(&mut self, _: &u32, _: &u32) -> Result<(), Refused> {
        Ok(())
    }

    fn insert_before(&mut self, _: &u32, _: &u32, _: &u32) -> Result<(), Refused> {
        Ok(())
    }

    fn detach_child(&mut self, _: &u32, _: &u32) -> Result<(), Refused> {
        self.detached += 1;
        Ok(())
    }
}

/// A reconciler with `root` already committed into container `0`.
pub fn committed(root: Element) -> Reconciler<NullAdapter> {
    let mut reconciler = Reconciler::new(NullAdapter::default());
    reconciler.begin_work(root, 0);
    reconciler.flush().expect("initial render commits");
    reconciler
}

pub fn children_of(reconciler: &Reconciler<NullAdapter>, parent: NodeId) -> Vec<NodeId> {
    let mut children = Vec::new();
    let mut next = reconciler.fiber(parent).and_then(|fiber| fiber.child());
    while let Some(id) = next {
        children.push(id);
        next = reconciler.fiber(id).and_then(|fiber| fiber.sibling());
    }
    children
}
