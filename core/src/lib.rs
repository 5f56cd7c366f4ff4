//! Core of `WaterFiber`: element descriptors, the fiber arena, the incremental reconciler and
//! the commit phase.
//!
//! Rendering happens in two phases. The *render* phase walks the new element tree one fiber at a
//! time ([`Reconciler::perform_unit_of_work`]), diffing against the last committed tree and tagging
//! each fiber with an [`Effect`]. It never touches the host surface, so it can stop between any two
//! units and resume later. The *commit* phase ([`Reconciler::commit_root`]) then applies all effects
//! through a [`HostAdapter`] in one uninterruptible pass.
//!
//! ```
//! use waterfiber_core::{Element, Reconciler};
//! # use waterfiber_core::{HostAdapter, PropValue};
//! # #[derive(Default)]
//! # struct Noop;
//! # impl HostAdapter for Noop {
//! #     type Handle = ();
//! #     type Error = std::convert::Infallible;
//! #     fn create_node(&mut self, _: &str) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_attribute(&mut self, _: &(), _: &str, _: &PropValue) -> Result<(), Self::Error> { Ok(()) }
//! #     fn clear_attribute(&mut self, _: &(), _: &str, _: &PropValue) -> Result<(), Self::Error> { Ok(()) }
//! #     fn attach_child(&mut self, _: &(), _: &()) -> Result<(), Self::Error> { Ok(()) }
//! #     fn insert_before(&mut self, _: &(), _: &(), _: &()) -> Result<(), Self::Error> { Ok(()) }
//! #     fn detach_child(&mut self, _: &(), _: &()) -> Result<(), Self::Error> { Ok(()) }
//! # }
//!
//! let mut reconciler = Reconciler::new(Noop);
//! reconciler.render(Element::new("h1").child("Hello"), ());
//! let summary = reconciler.flush()?.expect("the pass commits");
//! assert_eq!(summary.created, 2);
//! # Ok::<(), waterfiber_core::ReconcileError>(())
//! ```

extern crate alloc;

mod commit;
pub mod config;
pub mod deadline;
pub mod element;
mod error;
pub mod fiber;
pub mod host;
mod reconcile;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use config::SchedulerConfig;
pub use deadline::{Deadline, SliceDeadline, Unbounded};
pub use element::{
    Child, Component, Element, ElementKind, Event, Listener, NODE_VALUE, PropValue, Props, TEXT,
    create_element, event_name, text,
};
pub use error::{ReconcileError, Result};
pub use fiber::{Effect, Fiber, FiberKind, NodeId};
pub use host::HostAdapter;
pub use scheduler::{CommitSummary, Reconciler, WorkStatus};
