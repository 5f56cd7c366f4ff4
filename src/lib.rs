#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod logging;


#[doc(inline)]
pub use waterfiber_core::*;

/// In-memory backend, re-exported for tests and tooling.
pub use waterfiber_headless as headless;

pub mod prelude {
    //! Everything needed to describe and render a tree.
    //!
    //! ```rust
    //! use waterfiber::prelude::*;
    //!
    //! let mut root = HeadlessRoot::new();
    //! root.render(Element::new("h1").child("Hello")).unwrap();
    //! assert_eq!(root.to_html(), "<h1>Hello</h1>");
    //! ```
    pub use waterfiber_core::{
        Child, CommitSummary, Component, Deadline, Element, Event, Listener, PropValue, Props,
        Reconciler, SchedulerConfig, SliceDeadline, Unbounded, WorkStatus, create_element, text,
    };
    pub use waterfiber_headless::{HeadlessRoot, HeadlessSurface, HostSnapshot, Mutation};
}
