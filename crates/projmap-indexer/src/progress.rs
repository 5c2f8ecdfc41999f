//! Progress events emitted during scans and updates.

/// A stage boundary or batch completion. Purely observational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Discovery finished with this many member files
    DiscoveryComplete { files: usize },
    /// Extraction finished another batch
    Parsed { done: usize, total: usize },
    /// Resolution produced this many edges
    ResolutionComplete { edges: usize },
    /// Tree rebuilt over this many nodes
    TreeBuilt { nodes: usize },
    /// An incremental update was applied to `path`
    UpdateApplied { path: String },
}

/// Receiver of progress events.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

pub(crate) fn emit(sink: Option<&dyn ProgressSink>, event: ProgressEvent) {
    if let Some(sink) = sink {
        sink.report(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_closure_sink() {
        let events = Mutex::new(Vec::new());
        let sink = |event: ProgressEvent| events.lock().push(event);

        emit(Some(&sink), ProgressEvent::TreeBuilt { nodes: 3 });
        emit(None, ProgressEvent::TreeBuilt { nodes: 4 });

        assert_eq!(events.lock().as_slice(), &[ProgressEvent::TreeBuilt { nodes: 3 }]);
    }
}
