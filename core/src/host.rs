//! The contract between the reconciler and a host surface.
//!
//! The reconciler never touches a host surface directly. Everything it needs, from creating a node to
//! rebinding a listener, goes through a [`HostAdapter`], and only the commit phase calls it.

use core::fmt::Debug;

use crate::element::PropValue;

/// Primitive node operations offered by a host surface (a DOM, an in-memory tree, ...).
///
/// Attribute names starting with `on` followed by an event name (see
/// [`event_name`](crate::event_name)) bind or unbind listeners instead of setting plain
/// properties. Handling that convention is the adapter's job.
pub trait HostAdapter {
    /// Handle to one host node. Cloning a handle must not clone the node, and two handles
    /// compare equal exactly when they refer to the same node.
    type Handle: Clone + Debug + PartialEq;
    /// Failure raised by the surface.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates a detached node. `kind == TEXT` produces a text node.
    fn create_node(&mut self, kind: &str) -> Result<Self::Handle, Self::Error>;

    /// Sets a property or binds a listener.
    fn set_attribute(
        &mut self,
        node: &Self::Handle,
        name: &str,
        value: &PropValue,
    ) -> Result<(), Self::Error>;

    /// Clears a property or unbinds a listener. `previous` is the value being removed.
    fn clear_attribute(
        &mut self,
        node: &Self::Handle,
        name: &str,
        previous: &PropValue,
    ) -> Result<(), Self::Error>;

    /// Appends `child` as the last child of `parent`.
    fn attach_child(&mut self, parent: &Self::Handle, child: &Self::Handle)
    -> Result<(), Self::Error>;

    /// Inserts `child` into `parent` right before `anchor`.
    fn insert_before(
        &mut self,
        parent: &Self::Handle,
        child: &Self::Handle,
        anchor: &Self::Handle,
    ) -> Result<(), Self::Error>;

    /// Removes `child` (and its whole subtree) from `parent`.
    fn detach_child(&mut self, parent: &Self::Handle, child: &Self::Handle)
    -> Result<(), Self::Error>;
}
