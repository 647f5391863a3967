//! Thread-safe coordinator handle.

use std::sync::Arc;

use parking_lot::Mutex;
use twyg_core::{ControllerId, NodeId};

use crate::controller::ControllerState;
use crate::dispatch::ClickOutcome;
use crate::error::Result;
use crate::options::ControllerOptions;
use crate::twyg::Twyg;

/// A cloneable, thread-safe handle to a [`Twyg`].
///
/// Every call locks the coordinator for its whole duration, so registry and
/// controller-tree mutations stay single-writer even when clicks arrive from
/// several threads.
#[derive(Clone)]
pub struct SharedTwyg {
    inner: Arc<Mutex<Twyg>>,
}

impl SharedTwyg {
    /// Wrap a coordinator.
    pub fn new(twyg: Twyg) -> Self {
        Self {
            inner: Arc::new(Mutex::new(twyg)),
        }
    }

    /// Run `f` with exclusive access to the coordinator.
    pub fn with<R>(&self, f: impl FnOnce(&mut Twyg) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Dispatch a click.
    pub fn click(&self, target: NodeId) -> Result<ClickOutcome> {
        self.inner.lock().click(target)
    }

    /// Attach a controller to `node`.
    pub fn attach(&self, node: NodeId, options: &ControllerOptions) -> Result<Option<ControllerId>> {
        self.inner.lock().attach(node, options)
    }

    /// Attach every node carrying the init attribute.
    pub fn auto_init(&self) -> Result<Vec<ControllerId>> {
        self.inner.lock().auto_init()
    }

    /// Current state of a controller.
    pub fn state(&self, id: ControllerId) -> Result<ControllerState> {
        self.inner.lock().state(id)
    }

    /// The controller bound to `node`, if any.
    pub fn controller_for(&self, node: NodeId) -> Option<ControllerId> {
        self.inner.lock().controller_for(node)
    }

    /// Unwrap the coordinator if this is the last handle.
    pub fn try_unwrap(self) -> std::result::Result<Twyg, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl std::fmt::Debug for SharedTwyg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTwyg").finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(SharedTwyg: Send, Sync);
