//! Web/WASM backend for `WaterFiber`.
//!
//! [`DomAdapter`] implements [`HostAdapter`](waterfiber_core::HostAdapter) over `web-sys`, and
//! [`WebRoot`] drives the reconciler from `requestIdleCallback`: every idle period runs units of
//! work until the browser's deadline drops to the configured yield floor, then asks for another
//! idle period until the tree is committed.
//!
//! ```no_run
//! use waterfiber_core::Element;
//! use waterfiber_web::WebRootBuilder;
//!
//! # fn main() -> Result<(), waterfiber_web::WebError> {
//! let root = WebRootBuilder::new().with_root_id("app").build()?;
//! root.render(Element::new("h1").child("Hello from the idle loop"))?;
//! # Ok(())
//! # }
//! ```

mod adapter;
mod app;
mod dom;
mod error;

pub use adapter::DomAdapter;
pub use app::{WebRoot, WebRootBuilder};
pub use dom::{DEFAULT_ROOT_ID, DomRoot};
pub use error::WebError;
