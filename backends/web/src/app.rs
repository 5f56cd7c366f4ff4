use core::{fmt, time::Duration};
use std::{cell::RefCell, rc::Rc};

use tracing::{debug, error};
use wasm_bindgen::{JsCast, closure::Closure};
use waterfiber_core::{Deadline, Element, Reconciler, SchedulerConfig, WorkStatus};
use web_sys::{IdleDeadline, Node};

use crate::{adapter::DomAdapter, dom::DomRoot, error::WebError};

/// Builder for [`WebRoot`].
#[derive(Debug, Clone)]
pub struct WebRootBuilder {
    root_id: Option<String>,
    config: SchedulerConfig,
    clear_existing: bool,
}

impl Default for WebRootBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WebRootBuilder {
    /// Creates a new builder with default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root_id: None,
            config: SchedulerConfig::new(),
            clear_existing: true,
        }
    }

    /// Sets the DOM element identifier that should host the tree.
    #[must_use]
    pub fn with_root_id(mut self, id: impl Into<String>) -> Self {
        self.root_id = Some(id.into());
        self
    }

    /// Overrides the scheduler configuration.
    #[must_use]
    pub const fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Controls whether pre-existing children of the mounting element are removed.
    #[must_use]
    pub const fn clear_existing(mut self, clear: bool) -> Self {
        self.clear_existing = clear;
        self
    }

    /// Finalises the builder and creates a [`WebRoot`].
    ///
    /// # Errors
    ///
    /// Returns an error if the DOM root element cannot be found or initialized.
    pub fn build(self) -> Result<WebRoot, WebError> {
        let dom = DomRoot::new(self.root_id.as_deref())?;
        if self.clear_existing {
            dom.clear()?;
        }
        Ok(WebRoot::new(&dom, self.config))
    }
}

struct RootState {
    reconciler: Reconciler<DomAdapter>,
    container: Node,
    scheduled: bool,
}

/// Renders element trees into a DOM container, doing the work in `requestIdleCallback` slices.
#[derive(Clone)]
pub struct WebRoot {
    state: Rc<RefCell<RootState>>,
}

impl fmt::Debug for WebRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("WebRoot")
            .field("fibers", &state.reconciler.fiber_count())
            .field("scheduled", &state.scheduled)
            .finish()
    }
}

impl WebRoot {
    /// Creates a root mounting into `dom`'s element.
    #[must_use]
    pub fn new(dom: &DomRoot, config: SchedulerConfig) -> Self {
        let adapter = DomAdapter::new(dom.document().clone());
        Self {
            state: Rc::new(RefCell::new(RootState {
                reconciler: Reconciler::with_config(adapter, config),
                container: dom.container(),
                scheduled: false,
            })),
        }
    }

    /// Schedules `element` to replace whatever is rendered. Work starts on the next idle period
    /// and continues across idle periods until the tree is committed.
    ///
    /// # Errors
    ///
    /// Fails if the idle callback cannot be requested.
    pub fn render(&self, element: Element) -> Result<(), WebError> {
        {
            let mut state = self.state.borrow_mut();
            let container = state.container.clone();
            state.reconciler.render(element, container);
        }
        schedule(&self.state)
    }
}

fn schedule(state: &Rc<RefCell<RootState>>) -> Result<(), WebError> {
    if state.borrow().scheduled {
        return Ok(());
    }
    let window = web_sys::window().ok_or(WebError::DomUnavailable)?;
    let slice_state = state.clone();
    let callback = Closure::once_into_js(move |deadline: IdleDeadline| {
        run_slice(&slice_state, &deadline);
    });
    window.request_idle_callback(callback.unchecked_ref())?;
    state.borrow_mut().scheduled = true;
    Ok(())
}

fn run_slice(state: &Rc<RefCell<RootState>>, deadline: &IdleDeadline) {
    let status = {
        let mut state = state.borrow_mut();
        state.scheduled = false;
        state.reconciler.work_loop(&IdleSlice(deadline))
    };
    match status {
        Ok(WorkStatus::Pending) => {
            if let Err(err) = schedule(state) {
                error!(error = %err, "failed to request another idle period");
            }
        }
        Ok(WorkStatus::Committed(summary)) => {
            debug!(?summary, "tree committed to the DOM");
        }
        Ok(WorkStatus::Idle) => {}
        Err(err) => error!(error = %err, "render failed"),
    }
}

/// Adapts the browser's idle deadline to the reconciler's [`Deadline`].
struct IdleSlice<'a>(&'a IdleDeadline);

impl Deadline for IdleSlice<'_> {
    fn time_remaining(&self) -> Duration {
        millis_to_duration(self.0.time_remaining())
    }
}

fn millis_to_duration(millis: f64) -> Duration {
    if millis.is_finite() && millis > 0.0 {
        Duration::from_secs_f64(millis / 1000.0)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let builder = WebRootBuilder::new();
        assert!(builder.root_id.is_none());
        assert!(builder.clear_existing);
        assert_eq!(builder.config, SchedulerConfig::default());

        let builder = builder.with_root_id("app").clear_existing(false);
        assert_eq!(builder.root_id.as_deref(), Some("app"));
        assert!(!builder.clear_existing);
    }

    #[test]
    fn idle_time_converts_to_durations() {
        assert_eq!(millis_to_duration(250.0), Duration::from_millis(250));
        assert_eq!(millis_to_duration(-3.0), Duration::ZERO);
        assert_eq!(millis_to_duration(f64::NAN), Duration::ZERO);
    }
}
