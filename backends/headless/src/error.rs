use thiserror::Error;

use crate::surface::HostId;

/// Errors raised by the in-memory surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeadlessError {
    /// The handle does not belong to this surface.
    #[error("unknown host node {0}")]
    UnknownNode(HostId),
    /// `detach_child` or `insert_before` referenced a node that is not a child of `parent`.
    #[error("host node {child} is not a child of {parent}")]
    NotAChild {
        /// The would-be parent.
        parent: HostId,
        /// The node that was expected under it.
        child: HostId,
    },
    /// The node already has a parent.
    #[error("host node {0} is already attached")]
    AlreadyAttached(HostId),
    /// Text nodes are leaves.
    #[error("text node {0} cannot have children")]
    TextParent(HostId),
}
