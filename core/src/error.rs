use alloc::{boxed::Box, string::String};

use thiserror::Error;

use crate::fiber::NodeId;

/// Convenience alias used throughout the reconciler.
pub type Result<T, E = ReconcileError> = core::result::Result<T, E>;

/// Everything that can go wrong while reconciling or committing a tree.
///
/// None of these are recoverable: a failed render pass is discarded and the error is handed to
/// whoever drives the work loop.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// An element could not be interpreted.
    #[error("malformed element: {reason}")]
    Malformed {
        /// What was wrong with it.
        reason: String,
    },
    /// A component's render function failed.
    #[error("component `{name}` failed to render")]
    Component {
        /// Diagnostic name of the component.
        name: &'static str,
        /// The error it raised.
        #[source]
        source: anyhow::Error,
    },
    /// The host adapter failed while committing. The host surface may be partially updated.
    #[error("host adapter failed during commit: {0}")]
    Host(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// [`perform_unit_of_work`](crate::Reconciler::perform_unit_of_work) was handed a fiber other
    /// than the pending next unit.
    #[error("fiber {0:?} is not the next unit of work")]
    NotNextUnit(NodeId),
    /// `commit_root` was called while no finished tree was waiting.
    #[error("no finished work-in-progress tree to commit")]
    NoWorkInProgress,
}

impl ReconcileError {
    pub(crate) fn host(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Host(Box::new(error))
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}
