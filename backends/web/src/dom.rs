use web_sys::{Document, Element, Node, Window};

use crate::error::WebError;

/// Id given to the mounting element when none is requested.
pub const DEFAULT_ROOT_ID: &str = "waterfiber-root";

/// The document plus the element everything is mounted under.
#[derive(Debug, Clone)]
pub struct DomRoot {
    document: Document,
    element: Element,
}

impl DomRoot {
    /// Creates a [`DomRoot`] pointing at the provided element id, or at a fresh `div` appended to
    /// `<body>` when no id is given.
    ///
    /// # Errors
    ///
    /// Fails outside a browser or when the element does not exist.
    pub fn new(root_id: Option<&str>) -> Result<Self, WebError> {
        let window: Window = web_sys::window().ok_or(WebError::DomUnavailable)?;
        let document: Document = window.document().ok_or(WebError::DomUnavailable)?;

        let element = if let Some(id) = root_id {
            document
                .get_element_by_id(id)
                .ok_or_else(|| WebError::RootNotFound(id.to_string()))?
        } else {
            let body = document.body().ok_or(WebError::DomUnavailable)?;
            let host = document.create_element("div")?;
            host.set_id(DEFAULT_ROOT_ID);
            body.append_child(&host)?;
            host
        };

        Ok(Self { document, element })
    }

    /// Returns the DOM element representing the mounting point.
    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.element
    }

    /// Returns the owning document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// The mounting element as a plain node handle.
    #[must_use]
    pub fn container(&self) -> Node {
        self.element.clone().into()
    }

    /// Removes everything currently under the mounting element.
    ///
    /// # Errors
    ///
    /// Propagates DOM exceptions.
    pub fn clear(&self) -> Result<(), WebError> {
        while let Some(child) = self.element.first_child() {
            self.element.remove_child(&child)?;
        }
        Ok(())
    }
}
