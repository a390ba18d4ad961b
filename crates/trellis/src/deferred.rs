//! The deferred queue.
//!
//! Deferred blocks run after the outermost context of a build closes, each
//! inside the context it was scheduled for. The queue drains in passes: work
//! scheduled while a pass runs is collected into the next pass, so every
//! entry runs exactly once and generations never interleave.

use std::collections::VecDeque;
use std::fmt;

use trellis_core::logging::{PerfSpan, TargetDebug, span_names, targets};
use trellis_core::{Error, Result, TargetRef};

use crate::context::ContextTarget;
use crate::session::{Block, Session};

/// A block waiting to run against a target.
pub struct DeferredEntry {
    target: TargetRef,
    block: Block,
}

impl DeferredEntry {
    /// The target the block runs against.
    pub fn target(&self) -> &TargetRef {
        &self.target
    }
}

impl fmt::Debug for DeferredEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredEntry")
            .field("target", &TargetDebug(&self.target))
            .finish_non_exhaustive()
    }
}

/// FIFO queue of deferred entries owned by a root session.
#[derive(Debug, Default)]
pub(crate) struct DeferredQueue {
    entries: VecDeque<DeferredEntry>,
}

impl DeferredQueue {
    pub(crate) fn push(&mut self, entry: DeferredEntry) {
        self.entries.push_back(entry);
    }

    /// Take every queued entry, leaving the queue empty.
    pub(crate) fn take(&mut self) -> VecDeque<DeferredEntry> {
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Session {
    /// Queue `block` to run after the outermost context closes.
    ///
    /// The block runs inside `context` when given, otherwise inside the
    /// current target, otherwise inside the root target.
    ///
    /// # Errors
    ///
    /// - [`Error::BlockRequired`] when `block` is `None`
    /// - [`Error::InvalidDeferred`] when no context can be determined
    pub fn schedule_deferred(&self, context: Option<ContextTarget>, block: Option<Block>) -> Result<()> {
        let block = block.ok_or(Error::BlockRequired)?;
        let root = self.root()?;

        let target = match context {
            Some(context) => root.resolve_context(context)?,
            None => {
                let current = root.state().borrow().frame.target.clone();
                match current {
                    Some(target) => target,
                    None => root.root_target().ok_or(Error::InvalidDeferred)?,
                }
            }
        };

        tracing::trace!(
            target: targets::DEFERRED,
            session = %root.id(),
            on = %TargetDebug(&target),
            "scheduled deferred block"
        );
        root.state().borrow_mut().deferred.push(DeferredEntry { target, block });
        Ok(())
    }

    /// Queue `f` against the current context.
    pub fn deferred<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&Session) -> Result<()> + 'static,
    {
        self.schedule_deferred(None, Some(Box::new(f)))
    }

    /// Queue `f` against `context`.
    pub fn deferred_on<F>(&self, context: impl Into<ContextTarget>, f: F) -> Result<()>
    where
        F: FnOnce(&Session) -> Result<()> + 'static,
    {
        self.schedule_deferred(Some(context.into()), Some(Box::new(f)))
    }

    /// Number of deferred entries waiting on the root.
    pub fn pending_deferred(&self) -> usize {
        self.root()
            .map(|root| root.state().borrow().deferred.len())
            .unwrap_or(0)
    }

    /// Discard every queued entry, returning how many were dropped.
    pub(crate) fn clear_deferred(&self) -> usize {
        let dropped = self.state().borrow_mut().deferred.take();
        dropped.len()
    }

    /// Run queued work until no more is scheduled.
    ///
    /// Called on the root once the outermost context closed. `origin` is the
    /// target of that context and only appears in diagnostics. A failing
    /// entry stops the drain and discards what is left.
    pub(crate) fn drain(&self, origin: &TargetRef) -> Result<()> {
        let _span = PerfSpan::new(span_names::DRAIN);
        let limit = self.config().max_deferred_passes;
        let mut passes = 0;

        loop {
            let batch = self.state().borrow_mut().deferred.take();
            if batch.is_empty() {
                break;
            }
            if limit.is_some_and(|limit| passes >= limit) {
                let dropped = batch.len() + self.clear_deferred();
                trellis_core::trellis_warn!(passes, dropped, "deferred queue did not settle");
                return Err(Error::DeferredOverflow { passes });
            }
            passes += 1;

            tracing::debug!(
                target: targets::DEFERRED,
                pass = passes,
                entries = batch.len(),
                origin = %TargetDebug(origin),
                "draining deferred pass"
            );
            for entry in batch {
                if let Err(err) = self.enter_context(entry.target, entry.block) {
                    self.clear_deferred();
                    return Err(err);
                }
            }
        }

        if passes > 0 {
            tracing::debug!(target: targets::DEFERRED, passes, "deferred queue settled");
        }
        Ok(())
    }
}
