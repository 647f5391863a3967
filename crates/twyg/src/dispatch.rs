//! Click dispatch.
//!
//! A click bubbles from its target to the document. On each element the
//! click-to-edit handler and the outside-click self-click flag run; editing
//! stops the bubble. A click that reaches the document runs the
//! outside-click listeners, and each one that fires raises a click-off that
//! bubbles from its node until an exit handles it.

use twyg_core::logging::{span_names, targets};
use twyg_core::{ControllerId, NodeId};

use crate::controller::{EditOutcome, ExitOutcome};
use crate::error::Result;
use crate::twyg::Twyg;

/// What a dispatched click did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    /// Element on which bubbling stopped, if it did.
    pub stopped_at: Option<NodeId>,
    /// Controller that entered editing.
    pub edited: Option<ControllerId>,
    /// Controllers that left editing because of a click-off, in order.
    pub exited: Vec<ControllerId>,
}

impl ClickOutcome {
    /// Whether the click reached the document.
    pub fn reached_document(&self) -> bool {
        self.stopped_at.is_none()
    }
}

impl Twyg {
    /// Dispatch a click at `target`.
    ///
    /// Controllers whose nodes were removed are pruned first.
    pub fn click(&mut self, target: NodeId) -> Result<ClickOutcome> {
        self.check_node(target)?;
        self.prune();
        let _span = tracing::debug_span!(target: targets::DISPATCH, span_names::CLICK, ?target).entered();

        let root = self.document.root();
        let mut path = vec![target];
        path.extend(self.document.ancestors(target)?);

        let mut outcome = ClickOutcome::default();
        for node in path.into_iter().filter(|&node| node != root) {
            // listeners added while this element runs wait for the next click
            let self_bound = self.outside_click.is_bound(node);
            let mut stopped = false;

            if let Some(id) = self.controller_for(node)
                && self.controller(id)?.accepts_click()
            {
                if self.edit(id)? == EditOutcome::Editing {
                    outcome.edited = Some(id);
                }
                stopped = true;
            }
            if self_bound {
                self.outside_click.note_self_click(node);
            }

            if stopped {
                tracing::trace!(target: targets::DISPATCH, ?node, "propagation stopped");
                outcome.stopped_at = Some(node);
                return Ok(outcome);
            }
        }

        for listener in self.outside_click.snapshot() {
            if let Some((node, _)) = self.outside_click.fire(listener)
                && let Some(exited) = self.click_off(node)?
            {
                outcome.exited.push(exited);
            }
        }
        Ok(outcome)
    }

    /// Raise a click-off on `node`. Bubbles through `node` and its ancestors
    /// until a bound exit handler reports it handled.
    fn click_off(&mut self, node: NodeId) -> Result<Option<ControllerId>> {
        let mut path = vec![node];
        path.extend(self.document.ancestors(node)?);
        for current in path {
            let Some(handler) = self.outside_click.handler(current) else {
                continue;
            };
            if self.exit(handler)? == ExitOutcome::Handled {
                tracing::debug!(target: targets::DISPATCH, ?node, controller = ?handler, "click off handled");
                return Ok(Some(handler));
            }
        }
        Ok(None)
    }
}
