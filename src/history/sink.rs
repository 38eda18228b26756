use tokio_util::sync::CancellationToken;

use crate::foundation::error::MapleResult;
use crate::history::walker::HistorySnapshot;

/// Receives snapshots from a walk, newest date first, one at a time.
///
/// Returning an error aborts the walk and propagates to the walk's caller.
pub trait SnapshotSink: Send {
    fn push(&mut self, snapshot: HistorySnapshot) -> MapleResult<()>;
}

/// Collects snapshots in memory.
///
/// When built with [`InMemorySnapshotSink::cancel_aware`], pushes arriving after the token is
/// cancelled are dropped.
#[derive(Debug, Default)]
pub struct InMemorySnapshotSink {
    snapshots: Vec<HistorySnapshot>,
    cancel: Option<CancellationToken>,
}

impl InMemorySnapshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_aware(cancel: CancellationToken) -> Self {
        Self {
            snapshots: Vec::new(),
            cancel: Some(cancel),
        }
    }

    pub fn snapshots(&self) -> &[HistorySnapshot] {
        &self.snapshots
    }

    pub fn into_inner(self) -> Vec<HistorySnapshot> {
        self.snapshots
    }
}

impl SnapshotSink for InMemorySnapshotSink {
    fn push(&mut self, snapshot: HistorySnapshot) -> MapleResult<()> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            tracing::debug!(date = %snapshot.date, "sink cancelled; dropping snapshot");
            return Ok(());
        }
        self.snapshots.push(snapshot);
        Ok(())
    }
}

/// Adapts a closure into a [`SnapshotSink`].
pub struct FnSink<F>(pub F);

impl<F> SnapshotSink for FnSink<F>
where
    F: FnMut(HistorySnapshot) -> MapleResult<()> + Send,
{
    fn push(&mut self, snapshot: HistorySnapshot) -> MapleResult<()> {
        (self.0)(snapshot)
    }
}
