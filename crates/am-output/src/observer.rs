//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use am_core::Tick;
use am_sim::{AgentView, SimObserver};

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes agent snapshots and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  Check for them with [`take_error`][Self::take_error]
/// or [`finish`][Self::finish].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error, if any.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Close the writer, reporting the first stored error ahead of any
    /// error from closing.
    pub fn finish(&mut self) -> OutputResult<()> {
        let closed = self.writer.finish();
        match self.last_error.take() {
            Some(e) => Err(e),
            None => closed,
        }
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            log::warn!("output write failed: {e}");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, time: f64, moving: usize) {
        let row = TickSummaryRow {
            tick:          tick.0,
            time,
            moving_agents: moving as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &[AgentView]) {
        if agents.is_empty() {
            return;
        }
        let rows: Vec<AgentSnapshotRow> =
            agents.iter().map(|view| AgentSnapshotRow::new(tick.0, view)).collect();
        let result = self.writer.write_snapshots(&rows);
        self.store_err(result);
    }

    fn on_clear(&mut self) {
        let result = self.writer.flush();
        self.store_err(result);
    }
}
